//! Compose image panels (and an optional histogram) into terminal text.
//!
//! Layout rules:
//! - several images: one panel each, side by side, never a histogram
//! - one image with `show_hist`: the image panel plus a histogram panel

use crossterm::style::{Color, Stylize};

use crate::error::ImageError;
use crate::image::array::Image;
use crate::image::colormap::{Colormap, normalize};
use crate::image::histogram::{histogram, render_histogram};

const HIST_TITLE: &str = "Image Intensity Histogram";
const HIST_X_LABEL: &str = "Intensity Value";
const HIST_Y_LABEL: &str = "Frequency";
const PANEL_GAP: &str = "   ";

/// Panel titles.
#[derive(Debug, Clone, PartialEq)]
pub enum Titles {
    /// Same title on every panel.
    Single(String),
    /// One title per panel; ignored unless the count matches the images.
    PerPanel(Vec<String>),
}

#[derive(Debug, Clone)]
pub struct DisplayOptions {
    pub colormap: Colormap,
    /// Shared lower limit; each image's own minimum when unset.
    pub vmin: Option<f64>,
    pub vmax: Option<f64>,
    /// Panel size in terminal cells (width, height).
    pub size: (usize, usize),
    pub titles: Option<Titles>,
    pub show_hist: bool,
    pub nbins: Option<usize>,
    pub bin_width: Option<f64>,
    /// Emit 24-bit ANSI colour blocks instead of the ASCII ramp.
    pub color: bool,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            colormap: Colormap::Gray,
            vmin: None,
            vmax: None,
            size: (32, 16),
            titles: None,
            show_hist: false,
            nbins: None,
            bin_width: None,
            color: false,
        }
    }
}

/// A rendered block of lines, each `width` visible cells wide.
struct Panel {
    width: usize,
    lines: Vec<String>,
}

pub fn show_images(images: &[Image], opts: &DisplayOptions) -> Result<String, ImageError> {
    if images.is_empty() {
        return Err(ImageError::NoImages);
    }

    let mut panels: Vec<Panel> = images
        .iter()
        .enumerate()
        .map(|(i, img)| image_panel(img, panel_title(opts.titles.as_ref(), i, images.len()), opts))
        .collect();

    if images.len() == 1 && opts.show_hist {
        panels.push(histogram_panel(&images[0], opts)?);
    }

    Ok(join_panels(&panels))
}

/// Title for panel `index` of `count`.
pub fn panel_title(titles: Option<&Titles>, index: usize, count: usize) -> Option<&str> {
    match titles? {
        Titles::Single(t) => Some(t.as_str()),
        Titles::PerPanel(ts) if ts.len() == count => ts.get(index).map(String::as_str),
        Titles::PerPanel(_) => None,
    }
}

fn image_panel(img: &Image, title: Option<&str>, opts: &DisplayOptions) -> Panel {
    let (width, height) = (opts.size.0.max(1), opts.size.1.max(1));
    let (data_min, data_max) = img.min_max().unwrap_or((0.0, 0.0));
    let vmin = opts.vmin.unwrap_or(data_min);
    let vmax = opts.vmax.unwrap_or(data_max);

    let cells = img.resample(height, width);
    let mut lines = Vec::with_capacity(height + 1);
    if let Some(t) = title {
        lines.push(center(t, width));
    }
    for r in 0..height {
        let mut line = String::new();
        for c in 0..width {
            let t = normalize(cells.get(r, c), vmin, vmax);
            if opts.color {
                let (red, green, blue) = opts.colormap.rgb(t);
                let block = ' '.on(Color::Rgb {
                    r: red,
                    g: green,
                    b: blue,
                });
                line.push_str(&block.to_string());
            } else {
                line.push(opts.colormap.glyph(t));
            }
        }
        lines.push(line);
    }

    Panel { width, lines }
}

fn histogram_panel(img: &Image, opts: &DisplayOptions) -> Result<Panel, ImageError> {
    let hist = histogram(img.data(), opts.nbins, opts.bin_width)?;
    let width = opts.size.0.max(HIST_TITLE.len());
    let bar_rows = opts.size.1.saturating_sub(3).max(3);

    let mut lines = vec![
        center(HIST_TITLE, width),
        pad(&format!("{HIST_Y_LABEL} (max {})", hist.max_count()), width),
    ];
    lines.extend(render_histogram(&hist, width, bar_rows));
    lines.push(center(HIST_X_LABEL, width));

    Ok(Panel { width, lines })
}

fn join_panels(panels: &[Panel]) -> String {
    let height = panels.iter().map(|p| p.lines.len()).max().unwrap_or(0);
    let mut out = String::new();
    for row in 0..height {
        let parts: Vec<String> = panels
            .iter()
            .map(|p| match p.lines.get(row) {
                Some(l) => l.clone(),
                None => " ".repeat(p.width),
            })
            .collect();
        out.push_str(parts.join(PANEL_GAP).trim_end());
        out.push('\n');
    }
    out
}

fn pad(s: &str, width: usize) -> String {
    let t: String = s.chars().take(width).collect();
    format!("{t:<width$}")
}

fn center(s: &str, width: usize) -> String {
    let t: String = s.chars().take(width).collect();
    format!("{t:^width$}")
}
