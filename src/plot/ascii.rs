//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - observed counts: `o`
//! - fitted rate curve: `-` line
//! - generating (true) rate curve: `.` line

use crate::domain::{FitFile, ResidualRow};

/// Render a plot for an in-memory fit.
pub fn render_ascii_plot(rows: &[ResidualRow], width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (n_min, n_max) = index_range(rows).unwrap_or((0.0, 1.0));
    let fitted: Vec<(f64, f64)> = rows.iter().map(|r| (r.index as f64, r.fitted_rate)).collect();
    let truth: Vec<(f64, f64)> = rows.iter().map(|r| (r.index as f64, r.true_rate)).collect();

    let (y_min, y_max) = y_range(rows).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Curves first so points overlay; the fitted curve wins where they overlap.
    draw_curve(&mut grid, &fitted, n_min, n_max, y_min, y_max, '-');
    draw_curve(&mut grid, &truth, n_min, n_max, y_min, y_max, '.');

    for r in rows {
        let x = map_x(r.index as f64, n_min, n_max, width);
        let y = map_y(r.observed as f64, y_min, y_max, height);
        grid[y][x] = 'o';
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: n=[{}, {}] | x=[{y_min:.2}, {y_max:.2}]\n",
        n_min as usize, n_max as usize
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

/// Render a plot from a saved fit JSON file.
pub fn render_ascii_plot_from_fit_file(file: &FitFile, width: usize, height: usize) -> String {
    let rows: Vec<ResidualRow> = file
        .grid
        .index
        .iter()
        .zip(file.grid.fitted.iter())
        .zip(file.grid.truth.iter())
        .filter_map(|((&index, &fitted_rate), &true_rate)| {
            let observed = *file.observations.get(index)?;
            Some(ResidualRow {
                index,
                observed,
                true_rate,
                fitted_rate,
                residual: observed as f64 - fitted_rate,
            })
        })
        .collect();

    render_ascii_plot(&rows, width, height)
}

fn index_range(rows: &[ResidualRow]) -> Option<(f64, f64)> {
    let min = rows.iter().map(|r| r.index).min()? as f64;
    let max = rows.iter().map(|r| r.index).max()? as f64;
    if max > min { Some((min, max)) } else { None }
}

fn y_range(rows: &[ResidualRow]) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;

    for r in rows {
        for v in [r.observed as f64, r.fitted_rate, r.true_rate] {
            if v.is_finite() {
                min_y = min_y.min(v);
                max_y = max_y.max(v);
            }
        }
    }

    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(t: f64, t_min: f64, t_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((t - t_min) / (t_max - t_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(
    grid: &mut [Vec<char>],
    curve: &[(f64, f64)],
    t_min: f64,
    t_max: f64,
    y_min: f64,
    y_max: f64,
    ch: char,
) {
    if curve.is_empty() {
        return;
    }
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(t, y) in curve {
        if !y.is_finite() {
            prev = None;
            continue;
        }
        let x = map_x(t, t_min, t_max, width);
        let yy = map_y(y, y_min, y_max, height);
        match prev {
            Some((x0, y0)) => draw_line(grid, x0, y0, x, yy, ch),
            None if grid[yy][x] == ' ' => grid[yy][x] = ch,
            None => {}
        }
        prev = Some((x, yy));
    }
}

/// Integer line drawing (Bresenham-ish). Only fills empty cells.
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
