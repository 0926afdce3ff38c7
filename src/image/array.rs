//! Dense row-major 2D arrays.

use crate::error::ImageError;

#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Image {
    pub fn new(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self, ImageError> {
        if rows == 0 || cols == 0 {
            return Err(ImageError::Empty);
        }
        if data.len() != rows * cols {
            return Err(ImageError::Shape {
                rows,
                cols,
                got: data.len(),
            });
        }
        Ok(Self { rows, cols, data })
    }

    /// Build from nested rows; every row must have the same length.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, ImageError> {
        let expected = rows.first().map(Vec::len).ok_or(ImageError::Empty)?;
        let n_rows = rows.len();
        let mut data = Vec::with_capacity(n_rows * expected);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != expected {
                return Err(ImageError::Ragged {
                    line: i + 1,
                    expected,
                    got: row.len(),
                });
            }
            data.extend(row);
        }
        Self::new(n_rows, expected, data)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    /// Min and max over finite values, `None` if there are none.
    pub fn min_max(&self) -> Option<(f64, f64)> {
        let mut finite = self.data.iter().copied().filter(|v| v.is_finite());
        let first = finite.next()?;
        Some(finite.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
    }

    /// Nearest-neighbour resample to `rows x cols` cells.
    pub fn resample(&self, rows: usize, cols: usize) -> Image {
        let rows = rows.max(1);
        let cols = cols.max(1);
        let mut data = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            let src_r = (r * self.rows) / rows;
            for c in 0..cols {
                let src_c = (c * self.cols) / cols;
                data.push(self.get(src_r, src_c));
            }
        }
        Image { rows, cols, data }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rows_rejects_ragged_input() {
        let err = Image::from_rows(vec![vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert_eq!(
            err,
            ImageError::Ragged {
                line: 2,
                expected: 2,
                got: 1
            }
        );
    }

    #[test]
    fn min_max_skips_nan() {
        let img = Image::from_rows(vec![vec![f64::NAN, 2.0], vec![-1.0, 7.5]]).unwrap();
        assert_eq!(img.min_max(), Some((-1.0, 7.5)));
    }

    #[test]
    fn resample_upscales_by_repetition() {
        let img = Image::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        let big = img.resample(4, 4);
        assert_eq!(big.get(0, 0), 1.0);
        assert_eq!(big.get(1, 1), 1.0);
        assert_eq!(big.get(0, 3), 2.0);
        assert_eq!(big.get(3, 0), 3.0);
        assert_eq!(big.get(3, 3), 4.0);
    }

    #[test]
    fn shape_mismatch_is_rejected() {
        assert!(matches!(
            Image::new(2, 2, vec![0.0; 3]),
            Err(ImageError::Shape { .. })
        ));
    }
}
