//! The JSON project file describing named build targets.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// A single binary to build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildTarget {
  /// Target name, e.g. `cli` or `server`.
  pub name: String,
  /// Source path handed to the toolchain, e.g. `./cmd/cli`.
  pub path: String,
  /// Overrides `name` in artifact names.
  pub output_name: Option<String>,
  /// Overrides the project's default linker flags.
  pub ldflags: Option<String>,
  /// Overrides the project's default build flags.
  pub build_flags: Option<String>,
  /// Files packaged with this target only.
  pub additional_files: Vec<PathBuf>,
}

impl BuildTarget {
  /// Name used in binary, archive and manifest names.
  pub fn effective_name(&self) -> &str {
    non_empty(&self.output_name).unwrap_or(&self.name)
  }
}

/// A multi-target project description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
  pub project_name: String,
  /// Literal version; takes precedence over `version_file` when non-empty.
  pub version: Option<String>,
  pub version_file: Option<PathBuf>,
  pub platforms_file: Option<PathBuf>,
  pub default_ldflags: String,
  pub default_build_flags: String,
  pub global_additional_files: Vec<PathBuf>,
  pub targets: Vec<BuildTarget>,
}

impl ProjectConfig {
  /// Load and validate a project file.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    Self::from_json(&content, path)
  }

  /// Parse and validate a project file's content. `path` is used in errors.
  pub fn from_json(content: &str, path: &Path) -> Result<Self, ConfigError> {
    let config: ProjectConfig = serde_json::from_str(content).map_err(|source| ConfigError::Parse {
      path: path.to_path_buf(),
      source,
    })?;
    config.validate()?;
    Ok(config)
  }

  /// Reject configurations without targets or with incomplete targets.
  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.targets.is_empty() {
      return Err(ConfigError::NoTargets);
    }

    for (index, target) in self.targets.iter().enumerate() {
      if target.name.trim().is_empty() {
        return Err(ConfigError::MissingTargetName { index });
      }
      if target.path.trim().is_empty() {
        return Err(ConfigError::MissingTargetPath {
          name: target.name.clone(),
        });
      }
    }

    Ok(())
  }
}

/// Treat `Some("")` like `None`.
pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
  value.as_deref().filter(|s| !s.is_empty())
}
