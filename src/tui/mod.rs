//! Ratatui-based terminal UI.
//!
//! The TUI provides a settings panel for choosing the model, sample count, and
//! seed, then renders observations, fitted rate, and true rate on one chart.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
};

use crate::app::pipeline::RunOutput;
use crate::cli::FitArgs;
use crate::domain::ExperimentConfig;
use crate::error::AppError;
use crate::report::fmt_num;

mod plotters_chart;

use plotters_chart::MlePlottersChart;

const FIELD_COUNT: usize = 3;

/// Start the TUI.
pub fn run(args: FitArgs) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(crate::app::experiment_config_from_args(&args));
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct App {
    config: ExperimentConfig,
    selected_field: usize,
    status: String,
    run: Option<RunOutput>,
}

impl App {
    fn new(config: ExperimentConfig) -> Self {
        let mut app = Self {
            config,
            selected_field: 0,
            status: String::new(),
            run: None,
        };
        app.refit();
        app
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the user asked to quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up => {
                self.selected_field = self.selected_field.saturating_sub(1);
            }
            KeyCode::Down => {
                if self.selected_field + 1 < FIELD_COUNT {
                    self.selected_field += 1;
                }
            }
            KeyCode::Left => self.adjust_field(-1),
            KeyCode::Right => self.adjust_field(1),
            KeyCode::Char('r') => {
                self.config.seed = self.config.seed.wrapping_add(1);
                self.refit();
            }
            KeyCode::Char('m') => {
                self.set_model(self.config.model.next());
            }
            KeyCode::Char('d') => self.write_debug(),
            _ => {}
        }
        false
    }

    fn adjust_field(&mut self, delta: i32) {
        match self.selected_field {
            0 => {
                let model = if delta >= 0 {
                    self.config.model.next()
                } else {
                    self.config.model.prev()
                };
                self.set_model(model);
            }
            1 => {
                self.config.sample_count = step_count(self.config.sample_count, delta);
                self.refit();
            }
            2 => {
                self.config.seed = if delta >= 0 {
                    self.config.seed.wrapping_add(1)
                } else {
                    self.config.seed.wrapping_sub(1)
                };
                self.refit();
            }
            _ => {}
        }
    }

    /// Switch model and load its worked-example parameters.
    fn set_model(&mut self, model: crate::domain::ModelKind) {
        self.config.model = model;
        self.config.true_params = model.default_true_params();
        self.config.sample_count = model.default_sample_count();
        self.config.initial_guess = None;
        self.refit();
    }

    fn refit(&mut self) {
        match crate::app::pipeline::run_fit(&self.config) {
            Ok(run) => {
                self.status = format!("{} ({} evals)", run.fit.status, run.fit.evaluations);
                self.run = Some(run);
            }
            Err(err) => {
                tracing::warn!(error = %err, "fit failed");
                self.status = format!("Fit failed: {err}");
                self.run = None;
            }
        }
    }

    fn write_debug(&mut self) {
        let Some(run) = &self.run else {
            self.status = "No fit to write.".to_string();
            return;
        };
        self.status = match crate::debug::write_debug_bundle(&self.config, run) {
            Ok(path) => format!("Wrote debug bundle: {}", path.display()),
            Err(err) => format!("Debug write failed: {err}"),
        };
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("mle", Style::default().fg(Color::Cyan)),
            Span::raw(" - Poisson maximum likelihood"),
        ]));

        lines.push(Line::from(Span::styled(
            format!(
                "model: {} | n={} | seed={}",
                self.config.model.display_name(),
                self.config.sample_count,
                self.config.seed,
            ),
            Style::default().fg(Color::Gray),
        )));

        if let Some(run) = &self.run {
            lines.push(Line::from(Span::styled(
                param_line(&self.config, run),
                Style::default().fg(Color::Gray),
            )));
        }

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(6)])
            .split(area);

        self.draw_chart(frame, chunks[0]);
        self.draw_settings(frame, chunks[1]);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default()
            .title("Counts: observed (white) | fitted (cyan) | true (yellow)")
            .borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(run) = &self.run else {
            let msg = Paragraph::new("No fit available.")
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default());
            frame.render_widget(msg, inner);
            return;
        };

        let series = chart_series(run);
        let (chart_rect, insets) = chart_layout(inner);
        let widget = MlePlottersChart {
            fitted: &series.fitted,
            truth: &series.truth,
            points: &series.points,
            x_bounds: series.x_bounds,
            y_bounds: series.y_bounds,
            x_label: "n",
            y_label: "count",
            fmt_x: fmt_axis_x,
            fmt_y: fmt_axis_y,
        };

        frame.render_widget(widget, chart_rect);
        if let Some(insets) = insets {
            draw_axis_ticks(frame, inner, chart_rect, insets, series.x_bounds, series.y_bounds);
        }
    }

    fn draw_settings(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let items = vec![
            ListItem::new(format!("Model: {}", self.config.model.display_name())),
            ListItem::new(format!("Count: {}", self.config.sample_count)),
            ListItem::new(format!("Seed: {}", self.config.seed)),
        ];

        let list = List::new(items)
            .block(Block::default().title("Settings").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ratatui::widgets::ListState::default();
        state.select(Some(self.selected_field));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  ←/→ adjust  r reseed  m model  d debug  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// `True A: 5 -> fit 4.87 (± 0.7) | ...` for the header.
fn param_line(config: &ExperimentConfig, run: &RunOutput) -> String {
    let parts: Vec<String> = config
        .model
        .param_names()
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let truth = config.true_params.get(i).copied().unwrap_or(f64::NAN);
            let est = run.fit.params.get(i).copied().unwrap_or(f64::NAN);
            match run.standard_errors.get(i).copied().flatten() {
                Some(se) => format!("{name}: true {} fit {} (± {})", fmt_num(truth), fmt_num(est), fmt_num(se)),
                None => format!("{name}: true {} fit {}", fmt_num(truth), fmt_num(est)),
            }
        })
        .collect();
    format!("{} | NLL={:.4}", parts.join(" | "), run.fit.objective)
}

/// Sample-count step: roughly 10% of the current count, at least 1.
fn step_count(count: usize, delta: i32) -> usize {
    let step = (count / 10).max(1);
    let next = if delta >= 0 {
        count.saturating_add(step)
    } else {
        count.saturating_sub(step)
    };
    next.max(1)
}

struct ChartSeries {
    fitted: Vec<(f64, f64)>,
    truth: Vec<(f64, f64)>,
    points: Vec<(f64, f64)>,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
}

/// Build chart series for Plotters.
fn chart_series(run: &RunOutput) -> ChartSeries {
    let fitted: Vec<(f64, f64)> = run.residuals.iter().map(|r| (r.index as f64, r.fitted_rate)).collect();
    let truth: Vec<(f64, f64)> = run.residuals.iter().map(|r| (r.index as f64, r.true_rate)).collect();
    let points: Vec<(f64, f64)> = run.residuals.iter().map(|r| (r.index as f64, r.observed as f64)).collect();

    let n_max = run.residuals.len().saturating_sub(1) as f64;
    let x_bounds = if n_max > 0.0 { [0.0, n_max] } else { [-0.5, 0.5] };

    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(_, y) in fitted.iter().chain(truth.iter()).chain(points.iter()) {
        if y.is_finite() {
            y_min = y_min.min(y);
            y_max = y_max.max(y);
        }
    }
    if !y_min.is_finite() || !y_max.is_finite() || y_max <= y_min {
        y_min = 0.0;
        y_max = 1.0;
    }

    let pad = ((y_max - y_min).abs() * 0.05).max(1e-12);
    let y_bounds = [y_min - pad, y_max + pad];

    ChartSeries {
        fitted,
        truth,
        points,
        x_bounds,
        y_bounds,
    }
}

fn fmt_axis_x(v: f64) -> String {
    format!("{v:.0}")
}

fn fmt_axis_y(v: f64) -> String {
    format!("{v:.1}")
}

#[derive(Debug, Clone, Copy)]
struct AxisInsets {
    left: u16,
    right: u16,
    top: u16,
    bottom: u16,
}

fn chart_layout(inner: Rect) -> (Rect, Option<AxisInsets>) {
    let insets = AxisInsets {
        left: 8,
        right: 2,
        top: 1,
        bottom: 2,
    };

    if inner.width <= insets.left + insets.right + 10 || inner.height <= insets.top + insets.bottom + 5 {
        return (inner, None);
    }

    let rect = Rect {
        x: inner.x + insets.left,
        y: inner.y + insets.top,
        width: inner.width - insets.left - insets.right,
        height: inner.height - insets.top - insets.bottom,
    };

    (rect, Some(insets))
}

fn draw_axis_ticks(
    frame: &mut ratatui::Frame<'_>,
    inner: Rect,
    chart: Rect,
    insets: AxisInsets,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
) {
    let ticks = 5usize;
    let style = Style::default().fg(Color::Gray);

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let x_val = x_bounds[0] + u * (x_bounds[1] - x_bounds[0]);
        let x = chart.x + ((chart.width - 1) as f64 * u).round() as u16;
        let label = fmt_axis_x(x_val);
        let label_len = label.len() as u16;
        let start = x.saturating_sub((label.len() / 2) as u16);
        let y = chart.y + chart.height;
        if y >= inner.y + inner.height - 1 {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let y_val = y_bounds[0] + u * (y_bounds[1] - y_bounds[0]);
        let y = chart.y + (chart.height - 1) - ((chart.height - 1) as f64 * u).round() as u16;
        let label = format!("{y_val:.0}");
        let label_len = label.len() as u16;
        let x = inner.x + insets.left.saturating_sub(1);
        let start = x.saturating_sub(label.len() as u16);
        if start < inner.x {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    let x_label = Paragraph::new("sample index n")
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Gray));
    let x_rect = Rect {
        x: chart.x,
        y: chart.y + chart.height + 1,
        width: chart.width,
        height: 1,
    };
    if x_rect.y < inner.y + inner.height {
        frame.render_widget(x_label, x_rect);
    }

    let y_label = Paragraph::new("count").style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD));
    let y_rect = Rect {
        x: inner.x,
        y: inner.y,
        width: insets.left.saturating_sub(1),
        height: 1,
    };
    frame.render_widget(y_label, y_rect);
}
