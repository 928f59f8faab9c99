//! Project configuration.
//!
//! Configuration comes from three layers:
//! - built-in defaults for a single-target project rooted at the working directory
//! - an optional JSON project file describing one or more named targets
//! - command line overrides (platforms file, additional files, extra build args)
//!
//! [`ProjectSetup`] combines the layers once at startup. Each target is then
//! resolved into an independently owned [`ResolvedBuildConfig`].
//!
//! # Submodules
//!
//! - [`project`] - the JSON project file
//! - [`resolve`] - base configuration and per-target resolution
//! - [`plan`] - startup loading, validation and the resolved build plan

pub mod plan;
pub mod project;
pub mod resolve;

use std::path::PathBuf;

use thiserror::Error;

pub use plan::{BuildMode, BuildOptions, BuildPlan, ProjectSetup, TargetSummary};
pub use project::{BuildTarget, ProjectConfig};
pub use resolve::{BuildConfig, ResolvedBuildConfig, resolve_legacy, resolve_target};

/// Errors that can occur while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
  /// The project file could not be read.
  #[error("failed to read config file {path}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// The project file is not valid JSON or has the wrong shape.
  #[error("failed to parse config file {path}")]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },

  /// The project file lists no targets.
  #[error("no build targets specified in config")]
  NoTargets,

  /// A target has an empty or missing `name`.
  #[error("target {index} is missing a name")]
  MissingTargetName { index: usize },

  /// A target has an empty or missing `path`.
  #[error("target {name} is missing a path")]
  MissingTargetPath { name: String },

  /// A file required before building is absent.
  #[error("{kind} file not found: {path}")]
  MissingFile { kind: &'static str, path: PathBuf },

  /// The version file exists but could not be read.
  #[error("failed to read version file {path}")]
  ReadVersion {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// The version string is empty.
  #[error("version file {path} is empty")]
  EmptyVersion { path: PathBuf },

  /// The output directory could not be created.
  #[error("could not create output directory {path}")]
  CreateOutDir {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}
