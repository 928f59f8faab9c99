//! Version file reading.

use std::path::Path;

/// Read the version string: the whole file content, trimmed.
///
/// No semantic-version validation is performed.
pub fn read_version(path: &Path) -> std::io::Result<String> {
  Ok(std::fs::read_to_string(path)?.trim().to_string())
}
