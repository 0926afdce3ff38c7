//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - installs the tracing subscriber
//! - runs fits, replicate studies, and image display
//! - prints reports/plots and writes optional exports

use clap::Parser;

use crate::cli::{Command, FitArgs, PlotArgs, ReplicateArgs, ShowArgs};
use crate::domain::ExperimentConfig;
use crate::error::AppError;
use crate::image::{DisplayOptions, Titles};

pub mod pipeline;

/// Entry point for the `mle` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();

    // `mle` and `mle -m oscillating` behave like `mle tui ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Fit(args) => handle_fit(args),
        Command::Replicate(args) => handle_replicate(args),
        Command::Plot(args) => handle_plot(args),
        Command::Show(args) => handle_show(args),
        Command::Tui(args) => handle_tui(args),
    }
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let config = experiment_config_from_args(&args);
    let run = pipeline::run_fit(&config)?;

    println!(
        "{}",
        crate::report::format_run_summary(
            &config,
            &run.sample,
            &run.fit,
            &run.standard_errors,
            run.true_objective,
        )
    );
    println!("{}", crate::report::format_residuals(&run.residuals, config.residual_rows));

    if config.plot {
        let plot = crate::plot::render_ascii_plot(&run.residuals, config.plot_width, config.plot_height);
        println!("{plot}");
    }

    // Optional exports.
    if let Some(path) = &config.export_results {
        crate::io::write_results_csv(path, &run.residuals, &config)?;
    }
    if let Some(path) = &config.export_fit {
        let file = crate::io::build_fit_file(&config, &run.fit, &run.standard_errors, &run.residuals);
        crate::io::write_fit_json(path, &file)?;
    }
    if config.debug_bundle {
        let path = crate::debug::write_debug_bundle(&config, &run)?;
        println!("Debug bundle: {}", path.display());
    }

    Ok(())
}

fn handle_replicate(args: ReplicateArgs) -> Result<(), AppError> {
    let config = experiment_config_from_args(&args.fit);
    let summary = crate::fit::run_replicates(&config, args.count)?;
    println!("{}", crate::report::format_replicates(&config, &summary));
    Ok(())
}

fn handle_tui(args: FitArgs) -> Result<(), AppError> {
    crate::tui::run(args)
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let fit_file = crate::io::read_fit_json(&args.fit)?;
    let plot = crate::plot::render_ascii_plot_from_fit_file(&fit_file, args.width, args.height);

    println!("{plot}");
    Ok(())
}

fn handle_show(args: ShowArgs) -> Result<(), AppError> {
    let paths = if args.files.is_empty() {
        vec![crate::cli::picker::prompt_for_image_path()?]
    } else {
        args.files.clone()
    };

    let images = paths
        .iter()
        .map(|p| crate::image::load_image(p))
        .collect::<Result<Vec<_>, _>>()?;

    let opts = display_options_from_args(&args);
    print!("{}", crate::image::show_images(&images, &opts)?);
    Ok(())
}

pub fn display_options_from_args(args: &ShowArgs) -> DisplayOptions {
    let titles = match args.titles.as_slice() {
        [] => None,
        [one] => Some(Titles::Single(one.clone())),
        many => Some(Titles::PerPanel(many.to_vec())),
    };

    DisplayOptions {
        colormap: args.cmap,
        vmin: args.vmin,
        vmax: args.vmax,
        size: (args.width, args.height),
        titles,
        show_hist: args.hist,
        nbins: args.nbins,
        bin_width: args.bin_width,
        color: args.color,
    }
}

pub fn experiment_config_from_args(args: &FitArgs) -> ExperimentConfig {
    let model = args.model;
    ExperimentConfig {
        model,
        true_params: args
            .true_params
            .clone()
            .unwrap_or_else(|| model.default_true_params()),
        sample_count: args.sample_count.unwrap_or_else(|| model.default_sample_count()),
        seed: args.seed,
        initial_guess: args.guess.clone(),
        max_evals: args.max_evals,
        plot: args.plot && !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        residual_rows: args.rows,
        export_results: args.export.clone(),
        export_fit: args.export_fit.clone(),
        debug_bundle: args.debug,
    }
}

/// Rewrite argv so `mle` defaults to `mle tui`.
///
/// Rules:
/// - `mle`                      -> `mle tui`
/// - `mle -m oscillating ...`   -> `mle tui -m oscillating ...`
/// - `mle --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(
        arg1.as_str(),
        "fit" | "replicate" | "plot" | "show" | "tui"
    );
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    argv
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ModelKind;

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_opens_tui() {
        assert_eq!(rewrite_args(argv(&["mle"])), argv(&["mle", "tui"]));
        assert_eq!(
            rewrite_args(argv(&["mle", "-m", "constant"])),
            argv(&["mle", "tui", "-m", "constant"])
        );
        assert_eq!(rewrite_args(argv(&["mle", "--help"])), argv(&["mle", "--help"]));
        assert_eq!(rewrite_args(argv(&["mle", "show", "x.txt"])), argv(&["mle", "show", "x.txt"]));
    }

    #[test]
    fn config_defaults_to_the_worked_example() {
        let cli = crate::cli::Cli::parse_from(["mle", "fit", "-m", "oscillating", "--no-plot"]);
        let Command::Fit(args) = cli.command else {
            panic!("expected fit");
        };
        let config = experiment_config_from_args(&args);
        assert_eq!(config.model, ModelKind::Oscillating);
        assert_eq!(config.true_params, vec![800.0, 0.07]);
        assert!(!config.plot);
        assert!(config.initial_guess.is_none());
    }

    #[test]
    fn titles_broadcast_or_per_panel() {
        let cli = crate::cli::Cli::parse_from(["mle", "show", "a", "--title", "only"]);
        let Command::Show(args) = cli.command else {
            panic!("expected show");
        };
        assert_eq!(
            display_options_from_args(&args).titles,
            Some(Titles::Single("only".to_string()))
        );
    }
}
