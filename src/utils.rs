//! Utility functions for file naming and output directories.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fs as stdfs;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Longest file stem we produce, in bytes. Leaves room for `.html` under
/// the common 255-byte file name limit.
const MAX_FILE_STEM: usize = 200;

static UNSAFE_FILE_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[<>:"/\\|?*\x00-\x1f\x7f]"#).unwrap());

/// Map an article title to a file stem that is safe on common filesystems.
///
/// Path separators, characters Windows reserves, and control characters
/// become `_`. Leading and trailing dots and whitespace are trimmed so the
/// result can never be `.`, `..` or a hidden file. An empty result becomes
/// `untitled`.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(sanitize_file_name("OpenCV: Part 1/2"), "OpenCV_ Part 1_2");
/// assert_eq!(sanitize_file_name(".."), "untitled");
/// ```
pub fn sanitize_file_name(name: &str) -> String {
    let replaced = UNSAFE_FILE_CHARS.replace_all(name, "_");
    let trimmed = replaced.trim_matches(|c: char| c == '.' || c.is_whitespace());

    let mut end = trimmed.len().min(MAX_FILE_STEM);
    while !trimmed.is_char_boundary(end) {
        end -= 1;
    }
    let stem = trimmed[..end].trim_end_matches(|c: char| c == '.' || c.is_whitespace());

    if stem.is_empty() {
        "untitled".to_string()
    } else {
        stem.to_string()
    }
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if it doesn't exist, then writes and removes a
/// scratch file.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or is not writable.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(path).await?;
    let check_path = path.join("..__write_check__");
    match stdfs::File::create(&check_path) {
        Ok(_) => {
            let _ = stdfs::remove_file(&check_path);
            info!("Output directory is writable");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}
