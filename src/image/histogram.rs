//! Intensity histograms.
//!
//! Bin selection:
//! - `bin_width = w`: edges `floor(min), floor(min)+w, ...` strictly below `ceil(max)+w`
//! - else `nbins` equal bins over the data range
//! - else one bin per integer step, `ceil(max) - floor(min)` bins (at least 1)
//!
//! Every bin is half-open except the last, which includes its right edge.
//!
//! Explicit `nbins`/`bin_width` requests above [`MAX_BINS`] are rejected; the
//! integer-step default is capped at [`MAX_BINS`] equal bins instead.

use crate::error::ImageError;

/// Upper limit on the number of histogram bins.
pub const MAX_BINS: usize = 10_000;

#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    /// `counts.len() + 1` ascending edges.
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl Histogram {
    pub fn max_count(&self) -> usize {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

pub fn histogram(
    values: &[f64],
    nbins: Option<usize>,
    bin_width: Option<f64>,
) -> Result<Histogram, ImageError> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let (data_min, data_max) = finite
        .iter()
        .fold(None, |acc: Option<(f64, f64)>, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
        .ok_or(ImageError::Empty)?;

    let lo = data_min.floor();
    let hi = data_max.ceil();

    let edges = match (bin_width, nbins) {
        (Some(w), _) => width_edges(lo, hi, w)?,
        (None, Some(n)) => {
            if n > MAX_BINS {
                return Err(ImageError::TooManyBins { requested: n as f64, max: MAX_BINS });
            }
            even_edges(data_min, data_max, n.max(1))
        }
        (None, None) => {
            let steps = (hi - lo).min(MAX_BINS as f64) as usize;
            even_edges(data_min, data_max, steps.max(1))
        }
    };

    let bins = edges.len() - 1;
    let first = edges[0];
    let last = edges[bins];
    let mut counts = vec![0usize; bins];
    for v in finite {
        if v < first || v > last {
            continue;
        }
        let idx = edges.partition_point(|e| *e <= v).saturating_sub(1);
        counts[idx.min(bins - 1)] += 1;
    }

    Ok(Histogram { edges, counts })
}

fn width_edges(lo: f64, hi: f64, w: f64) -> Result<Vec<f64>, ImageError> {
    if !(w.is_finite() && w > 0.0) {
        return Err(ImageError::InvalidBinWidth(w));
    }
    let requested = ((hi - lo) / w).floor().max(1.0);
    if !(requested <= MAX_BINS as f64) {
        return Err(ImageError::TooManyBins { requested, max: MAX_BINS });
    }
    let stop = hi + w;
    let mut edges = Vec::new();
    let mut k = 0usize;
    loop {
        let e = lo + w * k as f64;
        if e >= stop {
            break;
        }
        edges.push(e);
        k += 1;
    }
    if edges.len() < 2 {
        edges.push(lo + w);
    }
    Ok(edges)
}

fn even_edges(min: f64, max: f64, n: usize) -> Vec<f64> {
    let (min, max) = if max > min { (min, max) } else { (min - 0.5, max + 0.5) };
    let step = (max - min) / n as f64;
    let mut edges: Vec<f64> = (0..n).map(|i| min + step * i as f64).collect();
    edges.push(max);
    edges
}

/// Render as a vertical bar chart, `width` columns by `height` bar rows.
///
/// Returns lines of exactly `width` characters.
pub fn render_histogram(hist: &Histogram, width: usize, height: usize) -> Vec<String> {
    let width = width.max(4);
    let height = height.max(1);
    let columns = column_counts(&hist.counts, width);
    let max = columns.iter().copied().max().unwrap_or(0).max(1);

    let mut lines = Vec::with_capacity(height + 2);
    for level in (1..=height).rev() {
        let line: String = columns
            .iter()
            .map(|&c| {
                let bar = (c as f64 / max as f64 * height as f64).ceil() as usize;
                if c > 0 && bar >= level { '#' } else { ' ' }
            })
            .collect();
        lines.push(line);
    }
    lines.push("-".repeat(width));

    let left = fmt_edge(hist.edges.first().copied().unwrap_or(0.0));
    let right = fmt_edge(hist.edges.last().copied().unwrap_or(0.0));
    let gap = width.saturating_sub(left.len() + right.len()).max(1);
    let mut ticks = format!("{left}{}{right}", " ".repeat(gap));
    ticks.truncate(width);
    lines.push(format!("{ticks:<width$}"));

    lines
}

/// Map bins onto display columns: wide bins repeat, narrow bins are summed.
fn column_counts(counts: &[usize], width: usize) -> Vec<usize> {
    let bins = counts.len();
    if bins == 0 {
        return vec![0; width];
    }
    (0..width)
        .map(|c| {
            let start = c * bins / width;
            let end = ((c + 1) * bins / width).max(start + 1).min(bins);
            if bins <= width {
                counts[start]
            } else {
                counts[start..end].iter().sum()
            }
        })
        .collect()
}

fn fmt_edge(v: f64) -> String {
    if v.fract() == 0.0 { format!("{v:.0}") } else { format!("{v:.2}") }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bins_are_unit_steps() {
        let h = histogram(&[0.0, 1.0, 1.0, 2.0, 3.0], None, None).unwrap();
        assert_eq!(h.counts.len(), 3);
        assert_eq!(h.edges, vec![0.0, 1.0, 2.0, 3.0]);
        // last bin is closed: 2.0 and 3.0 both land in [2, 3]
        assert_eq!(h.counts, vec![1, 2, 2]);
        assert_eq!(h.total(), 5);
    }

    #[test]
    fn bin_width_edges_run_past_the_ceiling() {
        let h = histogram(&[0.2, 1.7, 3.9], None, Some(2.0)).unwrap();
        // floor(min)=0, ceil(max)=4, edges 0,2,4 (6 excluded)
        assert_eq!(h.edges, vec![0.0, 2.0, 4.0]);
        assert_eq!(h.counts, vec![2, 1]);
    }

    #[test]
    fn nbins_splits_the_data_range() {
        let h = histogram(&[0.0, 0.5, 1.0, 10.0], Some(2), None).unwrap();
        assert_eq!(h.edges, vec![0.0, 5.0, 10.0]);
        assert_eq!(h.counts, vec![3, 1]);
    }

    #[test]
    fn constant_image_gets_one_bin() {
        let h = histogram(&[4.0; 6], None, None).unwrap();
        assert_eq!(h.counts, vec![6]);
    }

    #[test]
    fn invalid_width_and_empty_input() {
        assert_eq!(
            histogram(&[1.0], None, Some(0.0)).unwrap_err(),
            ImageError::InvalidBinWidth(0.0)
        );
        assert_eq!(histogram(&[f64::NAN], None, None).unwrap_err(), ImageError::Empty);
    }

    #[test]
    fn huge_range_caps_default_bins() {
        let h = histogram(&[0.0, 1e20], None, None).unwrap();
        assert_eq!(h.counts.len(), MAX_BINS);
        assert_eq!(h.edges.len(), MAX_BINS + 1);
        assert_eq!(h.counts[0], 1);
        assert_eq!(h.counts[MAX_BINS - 1], 1);
        assert_eq!(h.total(), 2);
    }

    #[test]
    fn explicit_bin_requests_over_the_cap_are_rejected() {
        assert!(matches!(
            histogram(&[0.0, 1e20], None, Some(1.0)).unwrap_err(),
            ImageError::TooManyBins { max: MAX_BINS, .. }
        ));
        assert!(matches!(
            histogram(&[0.0, 1.0], Some(MAX_BINS + 1), None).unwrap_err(),
            ImageError::TooManyBins { max: MAX_BINS, .. }
        ));
        // exactly at the cap is fine
        let h = histogram(&[0.0, 1.0], Some(MAX_BINS), None).unwrap();
        assert_eq!(h.counts.len(), MAX_BINS);
    }

    #[test]
    fn rendered_lines_have_fixed_width() {
        let h = histogram(&[0.0, 1.0, 1.0, 2.0, 3.0], None, None).unwrap();
        let lines = render_histogram(&h, 12, 4);
        assert_eq!(lines.len(), 6);
        assert!(lines.iter().all(|l| l.chars().count() == 12));
        // tallest bars reach the top row
        assert!(lines[0].contains('#'));
        assert!(lines[5].starts_with('0'));
        assert!(lines[5].trim_end().ends_with('3'));
    }
}
