//! Platforms file enumeration.
//!
//! The platforms file lists one `<os>/<arch>` pair per line. Lines whose first
//! non-space character is `#` and blank lines are ignored; lines with fewer than
//! two `/`-separated parts are skipped.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use super::Platform;

/// Errors that can occur while reading a platforms file.
#[derive(Debug, Error)]
pub enum PlatformsError {
  /// The file could not be opened.
  #[error("failed to open platforms file {path}")]
  SourceUnreadable {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// A read failed part way through the file.
  #[error("failed to read platforms file {path} at line {line}")]
  Scan {
    path: PathBuf,
    line: usize,
    #[source]
    source: std::io::Error,
  },
}

/// Parse a single line of a platforms file.
///
/// Returns `None` for comments, blank lines and malformed lines.
pub fn parse_line(line: &str) -> Option<Platform> {
  let line = line.trim();
  if line.is_empty() || line.starts_with('#') {
    return None;
  }

  let mut parts = line.split('/');
  match (parts.next(), parts.next()) {
    (Some(os), Some(arch)) => Some(Platform::new(os, arch)),
    _ => {
      debug!(line = %line, "skipping malformed platform line");
      None
    }
  }
}

/// A platforms file on disk.
///
/// Each call to [`PlatformList::iter`] reopens the file, so the sequence can be
/// restarted and always reflects the file's order.
#[derive(Debug, Clone)]
pub struct PlatformList {
  path: PathBuf,
}

impl PlatformList {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  /// Open the file and return a lazy iterator over its platforms.
  pub fn iter(&self) -> Result<Platforms<BufReader<File>>, PlatformsError> {
    let file = File::open(&self.path).map_err(|source| PlatformsError::SourceUnreadable {
      path: self.path.clone(),
      source,
    })?;
    Ok(Platforms::new(BufReader::new(file), self.path.clone()))
  }

  /// Read every platform eagerly.
  pub fn read_all(&self) -> Result<Vec<Platform>, PlatformsError> {
    self.iter()?.collect()
  }
}

/// Lazy iterator over the platforms of a line-oriented source.
pub struct Platforms<R> {
  lines: std::io::Lines<R>,
  path: PathBuf,
  line_no: usize,
  failed: bool,
}

impl<R: BufRead> Platforms<R> {
  /// Wrap any buffered reader. `path` is only used for error messages.
  pub fn new(reader: R, path: impl Into<PathBuf>) -> Self {
    Self {
      lines: reader.lines(),
      path: path.into(),
      line_no: 0,
      failed: false,
    }
  }
}

impl<R: BufRead> Iterator for Platforms<R> {
  type Item = Result<Platform, PlatformsError>;

  fn next(&mut self) -> Option<Self::Item> {
    if self.failed {
      return None;
    }

    loop {
      let line = self.lines.next()?;
      self.line_no += 1;

      match line {
        Ok(line) => {
          if let Some(platform) = parse_line(&line) {
            return Some(Ok(platform));
          }
        }
        Err(source) => {
          self.failed = true;
          return Some(Err(PlatformsError::Scan {
            path: self.path.clone(),
            line: self.line_no,
            source,
          }));
        }
      }
    }
  }
}
