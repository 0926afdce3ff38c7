//! Load numeric matrices from text files.
//!
//! One image row per line; values separated by whitespace and/or commas.
//! Blank lines and lines starting with `#` are skipped.

use std::fs;
use std::path::Path;

use crate::error::ImageError;
use crate::image::array::Image;

pub fn load_image(path: &Path) -> Result<Image, ImageError> {
    let text = fs::read_to_string(path).map_err(|e| ImageError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    let image = parse_image(&text)?;
    tracing::debug!(path = %path.display(), rows = image.rows(), cols = image.cols(), "loaded image");
    Ok(image)
}

pub fn parse_image(text: &str) -> Result<Image, ImageError> {
    let mut rows: Vec<Vec<f64>> = Vec::new();
    let mut expected: Option<usize> = None;

    for (i, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let row = line
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|tok| !tok.is_empty())
            .map(|tok| {
                tok.parse::<f64>().map_err(|_| ImageError::Parse {
                    line: i + 1,
                    token: tok.to_string(),
                })
            })
            .collect::<Result<Vec<f64>, _>>()?;

        match expected {
            None => expected = Some(row.len()),
            Some(n) if n != row.len() => {
                return Err(ImageError::Ragged {
                    line: i + 1,
                    expected: n,
                    got: row.len(),
                });
            }
            Some(_) => {}
        }
        rows.push(row);
    }

    Image::from_rows(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mixed_separators_and_comments() {
        let img = parse_image("# header\n1, 2 3\n\n4,5,6\n").unwrap();
        assert_eq!(img.rows(), 2);
        assert_eq!(img.cols(), 3);
        assert_eq!(img.get(1, 2), 6.0);
    }

    #[test]
    fn ragged_rows_report_their_line() {
        let err = parse_image("1 2\n3\n").unwrap_err();
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
    fn bad_token_is_reported() {
        let err = parse_image("1 x\n").unwrap_err();
        assert_eq!(
            err,
            ImageError::Parse {
                line: 1,
                token: "x".to_string()
            }
        );
    }

    #[test]
    fn empty_text_is_empty_image() {
        assert_eq!(parse_image("\n# only a comment\n").unwrap_err(), ImageError::Empty);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_image(Path::new("/nonexistent/mle-image.txt")).unwrap_err();
        assert!(matches!(err, ImageError::Io { .. }));
    }
}
