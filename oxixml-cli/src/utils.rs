//! Utility functions for the CLI.

use indicatif::{ProgressBar, ProgressStyle};
use std::ffi::OsString;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

/// Extension of compressed files.
pub const COMPRESSED_EXTENSION: &str = "oxx";

/// Create a progress bar with standard styling.
pub fn create_progress_bar(len: u64, enable: bool) -> ProgressBar {
    if !enable {
        return ProgressBar::hidden();
    }

    let style = ProgressStyle::default_bar()
        .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▓▒░ ");
    let pb = ProgressBar::new(len);
    pb.set_style(style);
    pb
}

/// Check if `path` means standard input/output.
pub fn is_stdio(path: &Path) -> bool {
    path.as_os_str() == "-"
}

/// Read a whole file, or standard input for `-`.
pub fn read_input(path: &Path) -> io::Result<Vec<u8>> {
    if is_stdio(path) {
        let mut data = Vec::new();
        io::stdin().lock().read_to_end(&mut data)?;
        Ok(data)
    } else {
        std::fs::read(path)
    }
}

/// Write a whole file, or standard output for `-`.
pub fn write_output(path: &Path, data: &[u8]) -> io::Result<()> {
    if is_stdio(path) {
        let mut stdout = io::stdout().lock();
        stdout.write_all(data)?;
        stdout.flush()
    } else {
        std::fs::write(path, data)
    }
}

/// `file.xml` -> `file.xml.oxx`
pub fn compressed_path(input: &Path) -> PathBuf {
    if is_stdio(input) {
        return input.to_path_buf();
    }
    let mut name = OsString::from(input.as_os_str());
    name.push(".");
    name.push(COMPRESSED_EXTENSION);
    PathBuf::from(name)
}

/// `file.xml.oxx` -> `file.xml`, anything else gets `.xml` appended.
pub fn decompressed_path(input: &Path) -> PathBuf {
    if is_stdio(input) {
        return input.to_path_buf();
    }
    if input.extension().is_some_and(|ext| ext == COMPRESSED_EXTENSION) {
        return input.with_extension("");
    }
    let mut name = OsString::from(input.as_os_str());
    name.push(".xml");
    PathBuf::from(name)
}

/// Percentage saved going from `original` to `compressed` bytes.
pub fn savings(original: usize, compressed: usize) -> f64 {
    if original == 0 {
        0.0
    } else {
        (1.0 - compressed as f64 / original as f64) * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compressed_path() {
        assert_eq!(
            compressed_path(Path::new("data/feed.xml")),
            PathBuf::from("data/feed.xml.oxx")
        );
        assert_eq!(compressed_path(Path::new("-")), PathBuf::from("-"));
    }

    #[test]
    fn test_decompressed_path() {
        assert_eq!(
            decompressed_path(Path::new("feed.xml.oxx")),
            PathBuf::from("feed.xml")
        );
        assert_eq!(
            decompressed_path(Path::new("feed.bin")),
            PathBuf::from("feed.bin.xml")
        );
    }

    #[test]
    fn test_savings() {
        assert_eq!(savings(0, 10), 0.0);
        assert!((savings(200, 50) - 75.0).abs() < 1e-9);
    }
}
