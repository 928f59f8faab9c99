//! Packaging engine.
//!
//! Turns one compiled binary into a distributable archive:
//!
//! 1. Stage the binary, the documentation files, and any additional files in
//!    `<stem>.d` under the project root.
//! 2. Archive the staged directory (zip for Windows, tar.gz otherwise).
//! 3. Move the archive into the output directory and record its checksum.
//! 4. Remove the staging directory and the raw binary.
//!
//! A failure leaves the staging directory in place for inspection.

mod archive;
mod checksum;

pub use archive::{ArchiveFormat, tar_gz_dir, zip_dir};
pub use checksum::{ChecksumManifest, ManifestEntry, parse_manifest};

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::ResolvedBuildConfig;
use crate::consts::{DOC_FILES, MAN_PAGE_DIR};
use crate::platform::BuildPlatform;
use crate::util::hash::ContentHash;

#[derive(Debug, Error)]
pub enum PackageError {
  #[error("failed to create staging directory {path}")]
  CreateStaging {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to copy {from} to {to}")]
  CopyFile {
    from: PathBuf,
    to: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to walk {path}")]
  Walk {
    path: PathBuf,
    #[source]
    source: walkdir::Error,
  },

  #[error("failed to write archive {path}")]
  Archive {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to write zip archive {path}")]
  Zip {
    path: PathBuf,
    #[source]
    source: zip::result::ZipError,
  },

  #[error("failed to move archive {from} to {to}")]
  MoveArchive {
    from: PathBuf,
    to: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("checksum manifest error at {path}")]
  Checksum {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("malformed checksum manifest {path} at line {line}")]
  MalformedManifest { path: PathBuf, line: usize },

  #[error("failed to clean up {path}")]
  Cleanup {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

/// A finished archive in the output directory.
#[derive(Debug, Clone)]
pub struct PackagedArchive {
  pub path: PathBuf,
  pub hash: ContentHash,
  pub size: u64,
}

/// Packages binaries for one resolved target.
pub struct Packager<'a> {
  config: &'a ResolvedBuildConfig,
  manifest: ChecksumManifest,
}

impl<'a> Packager<'a> {
  pub fn new(config: &'a ResolvedBuildConfig) -> Self {
    Self {
      config,
      manifest: ChecksumManifest::new(config.checksum_path()),
    }
  }

  pub fn manifest(&self) -> &ChecksumManifest {
    &self.manifest
  }

  /// Package `binary`, built for `platform`, into the output directory.
  pub fn package(&self, binary: &Path, platform: &BuildPlatform) -> Result<PackagedArchive, PackageError> {
    let staging_name = self.config.staging_dir_name(platform);
    let staging = self.config.project_root.join(&staging_name);

    self.stage(binary, &staging)?;

    let format = ArchiveFormat::for_platform(platform);
    let archive_name = format!("{}{}", staging_name, format.extension());
    let built = self.config.project_root.join(&archive_name);
    format.write(&staging, &built)?;

    let archive = self.config.out_dir.join(&archive_name);
    move_file(&built, &archive)?;

    let hash = self.manifest.append(&archive)?;
    let size = fs::metadata(&archive)
      .map_err(|source| PackageError::Archive {
        path: archive.clone(),
        source,
      })?
      .len();

    remove_dir(&staging)?;
    fs::remove_file(binary).map_err(|source| PackageError::Cleanup {
      path: binary.to_path_buf(),
      source,
    })?;

    info!(
      platform = %platform,
      archive = %archive_name,
      hash = %hash,
      "packaged"
    );

    Ok(PackagedArchive {
      path: archive,
      hash,
      size,
    })
  }

  fn stage(&self, binary: &Path, staging: &Path) -> Result<(), PackageError> {
    fs::create_dir_all(staging).map_err(|source| PackageError::CreateStaging {
      path: staging.to_path_buf(),
      source,
    })?;

    copy_into(binary, staging)?;

    for doc in self.doc_files() {
      if doc.is_file() {
        copy_into(&doc, staging)?;
      } else {
        debug!(path = %doc.display(), "documentation file not present, skipping");
      }
    }

    for file in &self.config.additional_files {
      if file.is_dir() {
        copy_dir_into(file, staging)?;
        info!(path = %file.display(), "added additional directory");
      } else if file.exists() {
        copy_into(file, staging)?;
        info!(path = %file.display(), "added additional file");
      } else {
        warn!(path = %file.display(), "additional file not found");
      }
    }

    Ok(())
  }

  /// Documentation copied into every archive when present.
  fn doc_files(&self) -> Vec<PathBuf> {
    let root = &self.config.project_root;
    let mut docs: Vec<PathBuf> = DOC_FILES.iter().map(|name| root.join(name)).collect();
    docs.push(self.config.platforms_file.clone());
    docs.push(root.join(MAN_PAGE_DIR).join(format!("{}.1", self.config.name)));
    docs
  }
}

/// Copy `file` into `dir`, keeping its base name and permissions.
fn copy_into(file: &Path, dir: &Path) -> Result<PathBuf, PackageError> {
  let dest = match file.file_name() {
    Some(name) => dir.join(name),
    None => dir.to_path_buf(),
  };
  fs::copy(file, &dest).map_err(|source| PackageError::CopyFile {
    from: file.to_path_buf(),
    to: dest.clone(),
    source,
  })?;
  Ok(dest)
}

/// Copy the tree rooted at `src` into `dir/<basename of src>`.
fn copy_dir_into(src: &Path, dir: &Path) -> Result<(), PackageError> {
  let root = match src.file_name() {
    Some(name) => dir.join(name),
    None => dir.to_path_buf(),
  };

  for entry in WalkDir::new(src).sort_by_file_name() {
    let entry = entry.map_err(|source| PackageError::Walk {
      path: src.to_path_buf(),
      source,
    })?;
    let relative = entry.path().strip_prefix(src).unwrap_or(entry.path());
    let dest = root.join(relative);

    if entry.file_type().is_dir() {
      fs::create_dir_all(&dest).map_err(|source| PackageError::CopyFile {
        from: entry.path().to_path_buf(),
        to: dest.clone(),
        source,
      })?;
    } else {
      fs::copy(entry.path(), &dest).map_err(|source| PackageError::CopyFile {
        from: entry.path().to_path_buf(),
        to: dest.clone(),
        source,
      })?;
    }
  }

  Ok(())
}

/// Rename, falling back to copy and remove across filesystems.
fn move_file(from: &Path, to: &Path) -> Result<(), PackageError> {
  let err = |source| PackageError::MoveArchive {
    from: from.to_path_buf(),
    to: to.to_path_buf(),
    source,
  };

  if fs::rename(from, to).is_ok() {
    return Ok(());
  }
  fs::copy(from, to).map_err(err)?;
  fs::remove_file(from).map_err(err)?;
  Ok(())
}

fn remove_dir(path: &Path) -> Result<(), PackageError> {
  fs::remove_dir_all(path).map_err(|source| PackageError::Cleanup {
    path: path.to_path_buf(),
    source,
  })
}
