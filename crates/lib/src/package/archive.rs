//! Archive writers.
//!
//! Both formats use the same entry naming: paths relative to the parent of the
//! staged directory with `/` separators, so the archive's single top-level entry
//! is the staged directory itself. Entries are written in sorted order.

use std::fs::File;
use std::io;
use std::path::{Component, Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;
use walkdir::WalkDir;
use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

use super::PackageError;
use crate::platform::BuildPlatform;

/// Archive container, chosen by target OS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
  /// gzip-compressed tar, for everything but Windows.
  TarGz,
  /// zip with deflated entries, for Windows.
  Zip,
}

impl ArchiveFormat {
  pub fn for_platform(platform: &BuildPlatform) -> Self {
    if platform.is_windows() { Self::Zip } else { Self::TarGz }
  }

  pub fn extension(&self) -> &'static str {
    match self {
      Self::TarGz => ".tar.gz",
      Self::Zip => ".zip",
    }
  }

  /// Write `src_dir` as an archive at `dest`.
  pub fn write(&self, src_dir: &Path, dest: &Path) -> Result<(), PackageError> {
    match self {
      Self::TarGz => tar_gz_dir(src_dir, dest),
      Self::Zip => zip_dir(src_dir, dest),
    }
  }
}

/// An entry to archive: its path on disk and its name inside the archive.
struct Entry {
  path: PathBuf,
  name: String,
  is_dir: bool,
}

/// Collect `src_dir` and everything below it, sorted, with archive names.
fn collect_entries(src_dir: &Path) -> Result<Vec<Entry>, PackageError> {
  let base = src_dir.parent().unwrap_or_else(|| Path::new(""));
  let mut entries = Vec::new();

  for entry in WalkDir::new(src_dir).sort_by_file_name() {
    let entry = entry.map_err(|source| PackageError::Walk {
      path: src_dir.to_path_buf(),
      source,
    })?;
    let path = entry.path();
    let relative = path.strip_prefix(base).unwrap_or(path);

    entries.push(Entry {
      path: path.to_path_buf(),
      name: archive_name(relative),
      is_dir: entry.file_type().is_dir(),
    });
  }

  Ok(entries)
}

/// Join path components with `/` regardless of the host separator.
fn archive_name(relative: &Path) -> String {
  relative
    .components()
    .filter_map(|c| match c {
      Component::Normal(part) => Some(part.to_string_lossy()),
      _ => None,
    })
    .collect::<Vec<_>>()
    .join("/")
}

fn io_err(dest: &Path) -> impl FnOnce(io::Error) -> PackageError + '_ {
  move |source| PackageError::Archive {
    path: dest.to_path_buf(),
    source,
  }
}

/// Write `src_dir` as a gzip-compressed tar archive.
///
/// Directories get a header only; regular files a header followed by their bytes.
pub fn tar_gz_dir(src_dir: &Path, dest: &Path) -> Result<(), PackageError> {
  let entries = collect_entries(src_dir)?;

  let file = File::create(dest).map_err(io_err(dest))?;
  let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));

  for entry in &entries {
    if entry.is_dir {
      builder.append_dir(&entry.name, &entry.path).map_err(io_err(dest))?;
    } else {
      builder
        .append_path_with_name(&entry.path, &entry.name)
        .map_err(io_err(dest))?;
    }
  }

  let encoder = builder.into_inner().map_err(io_err(dest))?;
  encoder.finish().map_err(io_err(dest))?;
  Ok(())
}

/// Write `src_dir` as a zip archive.
///
/// Files are deflated; directories are stored as entries with a trailing `/`.
pub fn zip_dir(src_dir: &Path, dest: &Path) -> Result<(), PackageError> {
  let entries = collect_entries(src_dir)?;

  let file = File::create(dest).map_err(io_err(dest))?;
  let mut writer = zip::ZipWriter::new(file);
  let zip_err = |source| PackageError::Zip {
    path: dest.to_path_buf(),
    source,
  };

  for entry in &entries {
    let options = SimpleFileOptions::default()
      .compression_method(CompressionMethod::Deflated)
      .unix_permissions(unix_mode(&entry.path).map_err(io_err(dest))?);

    if entry.is_dir {
      writer.add_directory(format!("{}/", entry.name), options).map_err(zip_err)?;
    } else {
      writer.start_file(entry.name.as_str(), options).map_err(zip_err)?;
      let mut source = File::open(&entry.path).map_err(io_err(dest))?;
      io::copy(&mut source, &mut writer).map_err(io_err(dest))?;
    }
  }

  writer.finish().map_err(zip_err)?;
  Ok(())
}

#[cfg(unix)]
fn unix_mode(path: &Path) -> io::Result<u32> {
  use std::os::unix::fs::PermissionsExt;
  Ok(std::fs::metadata(path)?.permissions().mode() & 0o7777)
}

#[cfg(not(unix))]
fn unix_mode(path: &Path) -> io::Result<u32> {
  Ok(if std::fs::metadata(path)?.is_dir() { 0o755 } else { 0o644 })
}
