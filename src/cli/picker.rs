//! Interactive CSV picker.
//!
//! This stands in for the "upload a file" step when `-f` is not given:
//! - clap handles structured flags/subcommands
//! - the picker lists `*.csv` files under the current directory and lets the
//!   user choose one by number or type a path

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use crate::error::AppError;

/// Default directory recursion depth for finding CSV files.
const DEFAULT_SEARCH_DEPTH: usize = 4;

/// Use the given path, or prompt for one when absent.
pub fn resolve_csv_path(file: Option<&Path>) -> Result<PathBuf, AppError> {
    match file {
        Some(path) => validate_csv_path(path),
        None => prompt_for_csv_path(),
    }
}

/// Prompt the user to select a CSV file from the current directory tree.
pub fn prompt_for_csv_path() -> Result<PathBuf, AppError> {
    let files = discover_csv_files(Path::new("."));
    if files.is_empty() {
        return Err(AppError::input(
            "No .csv files found. Provide one with `sales report -f <file.csv>`.",
        ));
    }

    let stdin = io::stdin();
    let stdout = io::stdout();
    pick_from(&files, &mut stdin.lock(), &mut stdout.lock())
}

/// Selection loop over an arbitrary input/output pair.
///
/// Accepts a number from the list or an explicit path; `q` cancels.
fn pick_from<R: BufRead, W: Write>(files: &[PathBuf], input: &mut R, output: &mut W) -> Result<PathBuf, AppError> {
    let write_err = |e: io::Error| AppError::io(format!("Failed to write prompt: {e}"));

    writeln!(output, "Found {} CSV file(s):", files.len()).map_err(write_err)?;
    for (idx, path) in files.iter().enumerate() {
        writeln!(output, "{:>3}) {}", idx + 1, pretty_path(path)).map_err(write_err)?;
    }

    loop {
        write!(
            output,
            "Select a file by number (1-{}) or type a path (q to quit): ",
            files.len()
        )
        .map_err(write_err)?;
        output.flush().map_err(write_err)?;

        let mut line = String::new();
        let bytes = input
            .read_line(&mut line)
            .map_err(|e| AppError::io(format!("Failed to read input: {e}")))?;
        if bytes == 0 {
            return Err(AppError::input(
                "No input received. Provide a CSV path with `sales report -f <file.csv>`.",
            ));
        }

        let line = line.trim();
        if line.eq_ignore_ascii_case("q") {
            return Err(AppError::input("Canceled."));
        }

        if let Ok(choice) = line.parse::<usize>() {
            if (1..=files.len()).contains(&choice) {
                return validate_csv_path(&files[choice - 1]);
            }
            writeln!(output, "Invalid choice: {choice}. Enter a number between 1 and {}.", files.len())
                .map_err(write_err)?;
            continue;
        }

        match validate_csv_path(Path::new(line)) {
            Ok(path) => return Ok(path),
            Err(err) => writeln!(output, "{err}").map_err(write_err)?,
        }
    }
}

/// Validate the provided path points to a `.csv` file.
pub fn validate_csv_path(path: &Path) -> Result<PathBuf, AppError> {
    if !path.exists() {
        return Err(AppError::input(format!("CSV file not found: {}", path.display())));
    }
    if path.is_dir() {
        return Err(AppError::input(format!(
            "Expected a file, got a directory: {}",
            path.display()
        )));
    }
    if !has_csv_extension(path) {
        return Err(AppError::input(format!(
            "Expected a .csv file (got: {}). Use -f to pass a CSV path.",
            path.display()
        )));
    }

    Ok(path.to_path_buf())
}

/// Discover `*.csv` files under `root` (deterministic order).
pub fn discover_csv_files(root: &Path) -> Vec<PathBuf> {
    let mut out = Vec::new();
    find_csv_files_inner(root, 0, DEFAULT_SEARCH_DEPTH, &mut out);
    out.sort_by_key(|p| pretty_path(p));
    out
}

fn find_csv_files_inner(root: &Path, depth: usize, max_depth: usize, out: &mut Vec<PathBuf>) {
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
                find_csv_files_inner(&path, depth + 1, max_depth, out);
            }
        } else if file_type.is_file() && has_csv_extension(&path) {
            out.push(path);
        }
    }
}

fn has_csv_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
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

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("sales-picker-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(dir.join("nested")).unwrap();
        fs::create_dir_all(dir.join("target")).unwrap();
        fs::write(dir.join("b.csv"), "x").unwrap();
        fs::write(dir.join("nested").join("a.CSV"), "x").unwrap();
        fs::write(dir.join("target").join("skip.csv"), "x").unwrap();
        fs::write(dir.join("notes.txt"), "x").unwrap();
        dir
    }

    #[test]
    fn discovers_csv_files_and_skips_build_dirs() {
        let dir = scratch_dir("discover");
        let files = discover_csv_files(&dir);
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|p| !p.to_string_lossy().contains("skip")));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn validate_rejects_missing_dirs_and_other_extensions() {
        let dir = scratch_dir("validate");
        assert!(validate_csv_path(&dir.join("b.csv")).is_ok());
        assert!(validate_csv_path(&dir.join("missing.csv")).is_err());
        assert!(validate_csv_path(&dir.join("nested")).is_err());
        assert!(validate_csv_path(&dir.join("notes.txt")).is_err());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn pick_accepts_number_after_invalid_choice() {
        let dir = scratch_dir("pick");
        let files = discover_csv_files(&dir);
        let mut input = io::Cursor::new("9\n1\n");
        let mut output = Vec::new();
        let chosen = pick_from(&files, &mut input, &mut output).unwrap();
        assert_eq!(chosen, files[0]);
        assert!(String::from_utf8(output).unwrap().contains("Invalid choice: 9"));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn pick_can_be_canceled() {
        let files = vec![PathBuf::from("x.csv")];
        let mut input = io::Cursor::new("q\n");
        let mut output = Vec::new();
        let err = pick_from(&files, &mut input, &mut output).unwrap_err();
        assert_eq!(err.message(), "Canceled.");
    }
}
