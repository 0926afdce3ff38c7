//! Interactive image-file picker.
//!
//! This is intentionally kept separate from clap parsing:
//! - clap handles structured flags/subcommands
//! - the picker provides the "run `mle show` and choose a file" UX
//!
//! The picker searches for numeric matrix files (`*.txt`, `*.csv`, `*.dat`)
//! under the current working directory.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::AppError;

/// Default directory recursion depth for finding image files.
const DEFAULT_SEARCH_DEPTH: usize = 4;

const IMAGE_EXTENSIONS: [&str; 3] = ["txt", "csv", "dat"];

/// Prompt the user to select an image file from the current directory tree.
///
/// Behavior:
/// - list discovered matrix files
/// - accept either a number (from the list) or an explicit path
/// - `q` cancels
pub fn prompt_for_image_path() -> Result<PathBuf, AppError> {
    let files = discover_image_files();
    if files.is_empty() {
        return Err(AppError::new(
            2,
            "No image files (.txt/.csv/.dat) found. Provide one with `mle show <file>`.",
        ));
    }

    println!("Found {} image file(s):", files.len());
    for (idx, path) in files.iter().enumerate() {
        println!("{:>3}) {}", idx + 1, pretty_path(path));
    }

    loop {
        print!("Select a file by number (1-{}) or type a path (q to quit): ", files.len());
        io::stdout()
            .flush()
            .map_err(|e| AppError::new(2, format!("Failed to write prompt: {e}")))?;

        let mut input = String::new();
        let bytes = io::stdin()
            .read_line(&mut input)
            .map_err(|e| AppError::new(2, format!("Failed to read input: {e}")))?;

        if bytes == 0 {
            return Err(AppError::new(
                2,
                "No input received. Provide an image path with `mle show <file>`.",
            ));
        }

        let input = input.trim();
        if input.eq_ignore_ascii_case("q") {
            return Err(AppError::new(2, "Canceled."));
        }

        if let Ok(choice) = input.parse::<usize>() {
            if (1..=files.len()).contains(&choice) {
                return validate_image_path(&files[choice - 1]);
            }
            println!("Invalid choice: {choice}. Enter a number between 1 and {}.", files.len());
            continue;
        }

        match validate_image_path(Path::new(input)) {
            Ok(path) => return Ok(path),
            Err(err) => println!("{err}"),
        }
    }
}

/// Validate the provided path points to an existing regular file.
pub fn validate_image_path(path: &Path) -> Result<PathBuf, AppError> {
    if !path.exists() {
        return Err(AppError::new(2, format!("Image file not found: {}", path.display())));
    }
    if path.is_dir() {
        return Err(AppError::new(
            2,
            format!("Expected a file, got a directory: {}", path.display()),
        ));
    }
    Ok(path.to_path_buf())
}

/// Discover matrix files under the current directory (deterministic order).
pub fn discover_image_files() -> Vec<PathBuf> {
    find_image_files(Path::new("."), DEFAULT_SEARCH_DEPTH)
}

fn find_image_files(root: &Path, max_depth: usize) -> Vec<PathBuf> {
    let mut out = Vec::new();
    find_image_files_inner(root, 0, max_depth, &mut out);
    out.sort_by_key(|p| pretty_path(p));
    out
}

fn find_image_files_inner(root: &Path, depth: usize, max_depth: usize, out: &mut Vec<PathBuf>) {
    if depth > max_depth {
        return;
    }

    let Ok(entries) = fs::read_dir(root) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let Ok(file_type) = entry.file_type() else {
            continue;
        };

        if file_type.is_dir() {
            if !should_skip_dir(&path) {
                find_image_files_inner(&path, depth + 1, max_depth, out);
            }
            continue;
        }

        if file_type.is_file() && has_image_extension(&path) {
            out.push(path);
        }
    }
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.iter().any(|e| ext.eq_ignore_ascii_case(e)))
}

fn should_skip_dir(path: &Path) -> bool {
    let name = path.file_name().and_then(|s| s.to_str()).unwrap_or("");
    matches!(name, ".git" | "target" | "node_modules")
}

fn pretty_path(path: &Path) -> String {
    let stripped = path.strip_prefix("./").unwrap_or(path);
    stripped.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extensions_are_case_insensitive() {
        assert!(has_image_extension(Path::new("a/b.TXT")));
        assert!(has_image_extension(Path::new("frame.csv")));
        assert!(!has_image_extension(Path::new("notes.md")));
        assert!(!has_image_extension(Path::new("noext")));
    }

    #[test]
    fn build_dirs_are_skipped() {
        assert!(should_skip_dir(Path::new("./target")));
        assert!(!should_skip_dir(Path::new("./data")));
    }

    #[test]
    fn pretty_path_drops_dot_prefix() {
        assert_eq!(pretty_path(Path::new("./x/y.txt")), "x/y.txt");
    }
}
