//! Per-target checksum manifest.
//!
//! One line per archive, `<sha256-hex>  <archive-file-name>`, appended as each
//! archive lands in the output directory.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use super::PackageError;
use crate::util::hash::{ContentHash, hash_file, is_sha256_hex};

/// A parsed manifest line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
  pub hash: String,
  pub file_name: String,
}

/// The checksum manifest of one target.
#[derive(Debug, Clone)]
pub struct ChecksumManifest {
  path: PathBuf,
}

impl ChecksumManifest {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  /// Delete a manifest left over from a previous run.
  ///
  /// Returns whether a file was removed.
  pub fn remove_stale(&self) -> Result<bool, PackageError> {
    match fs::remove_file(&self.path) {
      Ok(()) => {
        debug!(path = %self.path.display(), "removed stale checksum manifest");
        Ok(true)
      }
      Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
      Err(source) => Err(PackageError::Checksum {
        path: self.path.clone(),
        source,
      }),
    }
  }

  /// Hash `archive` and append its line, creating the manifest if needed.
  pub fn append(&self, archive: &Path) -> Result<ContentHash, PackageError> {
    let hash = hash_file(archive).map_err(|source| PackageError::Checksum {
      path: archive.to_path_buf(),
      source,
    })?;
    let file_name = archive
      .file_name()
      .map(|n| n.to_string_lossy().into_owned())
      .unwrap_or_default();

    let write = || -> io::Result<()> {
      let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
      writeln!(file, "{}  {}", hash, file_name)
    };
    write().map_err(|source| PackageError::Checksum {
      path: self.path.clone(),
      source,
    })?;

    debug!(archive = %file_name, hash = %hash, "recorded checksum");
    Ok(hash)
  }

  /// Read the manifest back.
  pub fn entries(&self) -> Result<Vec<ManifestEntry>, PackageError> {
    let content = fs::read_to_string(&self.path).map_err(|source| PackageError::Checksum {
      path: self.path.clone(),
      source,
    })?;

    parse_manifest(&content).map_err(|line| PackageError::MalformedManifest {
      path: self.path.clone(),
      line,
    })
  }
}

/// Parse manifest content, reporting the 1-based number of the first bad line.
pub fn parse_manifest(content: &str) -> Result<Vec<ManifestEntry>, usize> {
  let mut entries = Vec::new();

  for (index, line) in content.lines().enumerate() {
    if line.trim().is_empty() {
      continue;
    }
    let Some((hash, name)) = line.split_once("  ") else {
      return Err(index + 1);
    };
    if !is_sha256_hex(hash) || name.trim().is_empty() {
      return Err(index + 1);
    }
    entries.push(ManifestEntry {
      hash: hash.to_string(),
      file_name: name.trim().to_string(),
    });
  }

  Ok(entries)
}
