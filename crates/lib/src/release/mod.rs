//! Release publishing.
//!
//! Publishes the contents of the output directory as a tagged release through
//! the GitHub CLI: one `release create` call, then `release upload` calls of at
//! most [`UPLOAD_BATCH_SIZE`] files each. Any failing call aborts the rest.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::consts::{DEFAULT_RELEASE_NOTES, HOSTING_CLI_ENV, TOKEN_ENV, UPLOAD_BATCH_SIZE};
use crate::exec::{CommandOutcome, CommandRunner, CommandSpec};

#[derive(Debug, Error)]
pub enum ReleaseError {
  #[error("GitHub CLI ({program}) is not installed or not in PATH")]
  MissingCli {
    program: String,
    #[source]
    source: which::Error,
  },

  #[error("GITHUB_TOKEN environment variable is not set")]
  MissingToken,

  #[error("output directory {path} does not exist")]
  OutputDirMissing { path: PathBuf },

  #[error("output directory {path} is empty")]
  OutputDirEmpty { path: PathBuf },

  #[error("release notes file {path} not found")]
  NotesFileMissing { path: PathBuf },

  #[error("failed to read output directory {path}")]
  ReadOutputDir {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to run {program}")]
  Spawn {
    program: String,
    #[source]
    source: io::Error,
  },

  #[error("failed to create release {tag}: {}", describe(.outcome))]
  CreateFailed { tag: String, outcome: CommandOutcome },

  #[error("no assets to upload in {path}")]
  NoAssets { path: PathBuf },

  #[error("failed to upload batch {batch}/{total}: {}", describe(.outcome))]
  UploadFailed {
    batch: usize,
    total: usize,
    outcome: CommandOutcome,
  },
}

impl ReleaseError {
  /// Whether the error was raised before any hosting CLI call was made.
  pub fn is_precondition(&self) -> bool {
    matches!(
      self,
      Self::MissingCli { .. }
        | Self::MissingToken
        | Self::OutputDirMissing { .. }
        | Self::OutputDirEmpty { .. }
        | Self::NotesFileMissing { .. }
    )
  }
}

fn describe(outcome: &CommandOutcome) -> String {
  let status = match outcome.code {
    Some(code) => format!("exit code {}", code),
    None => "terminated by signal".to_string(),
  };
  match outcome.stderr_tail.last() {
    Some(line) => format!("{} ({})", status, line),
    None => status,
  }
}

/// The hosting CLI executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostingCli {
  pub program: PathBuf,
}

impl HostingCli {
  pub fn new(program: impl Into<PathBuf>) -> Self {
    Self { program: program.into() }
  }

  /// The program name to look up: `GH_CLI_PATH` if set, else the platform default.
  pub fn program_name() -> String {
    match std::env::var(HOSTING_CLI_ENV) {
      Ok(program) if !program.is_empty() => program,
      _ if cfg!(windows) => "gh.exe".to_string(),
      _ => "gh".to_string(),
    }
  }

  /// Resolve the hosting CLI on `PATH`.
  pub fn locate() -> Result<Self, ReleaseError> {
    let program = Self::program_name();
    let path = which::which(&program).map_err(|source| ReleaseError::MissingCli { program, source })?;
    Ok(Self::new(path))
  }

  fn command(&self) -> CommandSpec {
    CommandSpec::new(self.program.to_string_lossy()).arg("release")
  }
}

/// Fail unless the authentication token is present in the environment.
pub fn require_token() -> Result<(), ReleaseError> {
  match std::env::var(TOKEN_ENV) {
    Ok(token) if !token.is_empty() => Ok(()),
    _ => Err(ReleaseError::MissingToken),
  }
}

/// Where the release notes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseNotes {
  Text(String),
  File(PathBuf),
  /// `release_notes.md` in the project root.
  Default,
}

impl ReleaseNotes {
  /// Literal text wins over a notes file; neither means the default file.
  pub fn from_options(text: Option<String>, file: Option<PathBuf>) -> Self {
    match (text.filter(|t| !t.is_empty()), file) {
      (Some(text), _) => Self::Text(text),
      (None, Some(file)) => Self::File(file),
      (None, None) => Self::Default,
    }
  }

  /// Arguments for `release create`, checking that a notes file exists.
  fn args(&self, project_root: &Path) -> Result<Vec<String>, ReleaseError> {
    let path = match self {
      Self::Text(text) => return Ok(vec!["--notes".to_string(), text.clone()]),
      Self::File(file) => project_root.join(file),
      Self::Default => project_root.join(DEFAULT_RELEASE_NOTES),
    };

    if !path.is_file() {
      return Err(ReleaseError::NotesFileMissing { path });
    }
    Ok(vec!["--notes-file".to_string(), path.to_string_lossy().to_string()])
  }
}

/// What to publish.
#[derive(Debug, Clone)]
pub struct ReleaseRequest {
  /// Release tag; the trimmed version.
  pub tag: String,
  pub project_root: PathBuf,
  pub out_dir: PathBuf,
  pub notes: ReleaseNotes,
}

/// Outcome of a successful release.
#[derive(Debug, Clone)]
pub struct ReleaseReport {
  pub tag: String,
  pub assets: Vec<PathBuf>,
  pub batches: usize,
}

/// Non-directory entries of `out_dir`, sorted by file name.
pub fn collect_assets(out_dir: &Path) -> Result<Vec<PathBuf>, ReleaseError> {
  let read_err = |source| ReleaseError::ReadOutputDir {
    path: out_dir.to_path_buf(),
    source,
  };

  let mut assets = Vec::new();
  for entry in fs::read_dir(out_dir).map_err(read_err)? {
    let entry = entry.map_err(read_err)?;
    if !entry.file_type().map_err(read_err)?.is_dir() {
      assets.push(entry.path());
    }
  }
  assets.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
  Ok(assets)
}

/// Creates releases and uploads assets.
pub struct Publisher<'a> {
  runner: &'a dyn CommandRunner,
  cli: HostingCli,
}

impl<'a> Publisher<'a> {
  pub fn new(runner: &'a dyn CommandRunner, cli: HostingCli) -> Self {
    Self { runner, cli }
  }

  /// Locate the hosting CLI and check the token.
  pub fn from_env(runner: &'a dyn CommandRunner) -> Result<Self, ReleaseError> {
    let cli = HostingCli::locate()?;
    require_token()?;
    Ok(Self::new(runner, cli))
  }

  /// Create the release and upload every asset.
  pub fn publish(&self, request: &ReleaseRequest) -> Result<ReleaseReport, ReleaseError> {
    let out_dir = &request.out_dir;
    if !out_dir.is_dir() {
      return Err(ReleaseError::OutputDirMissing { path: out_dir.clone() });
    }
    let is_empty = fs::read_dir(out_dir)
      .map_err(|source| ReleaseError::ReadOutputDir {
        path: out_dir.clone(),
        source,
      })?
      .next()
      .is_none();
    if is_empty {
      return Err(ReleaseError::OutputDirEmpty { path: out_dir.clone() });
    }

    let notes = request.notes.args(&request.project_root)?;

    info!(tag = %request.tag, "creating release");
    let create = self
      .cli
      .command()
      .arg("create")
      .arg(&request.tag)
      .args(notes)
      .current_dir(&request.project_root);
    let outcome = self.run(&create)?;
    if !outcome.is_success() {
      return Err(ReleaseError::CreateFailed {
        tag: request.tag.clone(),
        outcome,
      });
    }

    let assets = collect_assets(out_dir)?;
    if assets.is_empty() {
      return Err(ReleaseError::NoAssets { path: out_dir.clone() });
    }

    let total = assets.len().div_ceil(UPLOAD_BATCH_SIZE);
    for (index, batch) in assets.chunks(UPLOAD_BATCH_SIZE).enumerate() {
      info!(batch = index + 1, total, files = batch.len(), "uploading assets");

      let upload = self
        .cli
        .command()
        .arg("upload")
        .arg(&request.tag)
        .args(batch.iter().map(|p| p.to_string_lossy().to_string()))
        .current_dir(&request.project_root);
      let outcome = self.run(&upload)?;
      if !outcome.is_success() {
        return Err(ReleaseError::UploadFailed {
          batch: index + 1,
          total,
          outcome,
        });
      }
    }

    info!(tag = %request.tag, assets = assets.len(), "release published");

    Ok(ReleaseReport {
      tag: request.tag.clone(),
      assets,
      batches: total,
    })
  }

  fn run(&self, spec: &CommandSpec) -> Result<CommandOutcome, ReleaseError> {
    self.runner.run(spec).map_err(|source| ReleaseError::Spawn {
      program: spec.program.clone(),
      source,
    })
  }
}
