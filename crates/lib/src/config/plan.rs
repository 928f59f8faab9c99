//! Startup loading and the resolved build plan.

use std::path::{Path, PathBuf};

use tracing::debug;

use super::ConfigError;
use super::project::{ProjectConfig, non_empty};
use super::resolve::{BuildConfig, ResolvedBuildConfig, resolve_legacy, resolve_target};
use crate::consts::CURRENT_DIR;
use crate::version::read_version;

/// Inputs collected from the command line.
#[derive(Debug, Clone)]
pub struct BuildOptions {
  pub project_root: PathBuf,
  /// JSON project file; enables multi-target mode.
  pub config_file: Option<PathBuf>,
  /// Replaces the platforms file in both modes.
  pub platforms_file: Option<PathBuf>,
  pub additional_files: Vec<PathBuf>,
  pub extra_build_args: Vec<String>,
  pub build_pi: bool,
}

impl BuildOptions {
  pub fn new(project_root: impl Into<PathBuf>) -> Self {
    Self {
      project_root: project_root.into(),
      config_file: None,
      platforms_file: None,
      additional_files: Vec::new(),
      extra_build_args: Vec::new(),
      build_pi: true,
    }
  }
}

/// Whether a run builds the implicit single target or the targets of a project file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildMode {
  Legacy,
  MultiTarget,
}

/// A target as shown by `--list-targets`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSummary {
  pub name: String,
  pub source_path: String,
  pub output_name: String,
}

/// Base configuration plus the optional project file, loaded once at startup.
#[derive(Debug, Clone)]
pub struct ProjectSetup {
  pub base: BuildConfig,
  pub project: Option<ProjectConfig>,
}

impl ProjectSetup {
  /// Combine defaults, the project file (if any) and command line overrides.
  pub fn load(options: &BuildOptions) -> Result<Self, ConfigError> {
    let mut base = BuildConfig::for_project_root(&options.project_root);

    let project = match &options.config_file {
      Some(file) => {
        let path = base.resolve_path(file);
        debug!(path = %path.display(), "loading project config");
        let project = ProjectConfig::load(&path)?;
        base.apply_project(&project);
        Some(project)
      }
      None => None,
    };

    if let Some(file) = &options.platforms_file {
      base.platforms_file = base.resolve_path(file);
    }
    base.additional_files = options.additional_files.clone();
    base.extra_build_args = options.extra_build_args.clone();
    base.build_pi = options.build_pi;

    Ok(Self { base, project })
  }

  pub fn mode(&self) -> BuildMode {
    if self.project.is_some() {
      BuildMode::MultiTarget
    } else {
      BuildMode::Legacy
    }
  }

  /// Targets this setup would build.
  pub fn targets(&self) -> Vec<TargetSummary> {
    match &self.project {
      Some(project) => project
        .targets
        .iter()
        .map(|t| TargetSummary {
          name: t.name.clone(),
          source_path: t.path.clone(),
          output_name: t.effective_name().to_string(),
        })
        .collect(),
      None => vec![TargetSummary {
        name: self.base.project_name.clone(),
        source_path: CURRENT_DIR.to_string(),
        output_name: self.base.project_name.clone(),
      }],
    }
  }

  /// The version for this run: the project's literal version, else the trimmed
  /// version file.
  pub fn version(&self) -> Result<String, ConfigError> {
    if let Some(version) = self.project.as_ref().and_then(|p| non_empty(&p.version)) {
      return Ok(version.trim().to_string());
    }

    let path = &self.base.version_file;
    if !path.exists() {
      return Err(ConfigError::MissingFile {
        kind: "version",
        path: path.clone(),
      });
    }

    let version = read_version(path).map_err(|source| ConfigError::ReadVersion {
      path: path.clone(),
      source,
    })?;
    if version.is_empty() {
      return Err(ConfigError::EmptyVersion { path: path.clone() });
    }
    Ok(version)
  }

  /// Verify required files, create the output directory and resolve every target.
  pub fn plan(&self) -> Result<BuildPlan, ConfigError> {
    let version = self.version()?;

    if !self.base.platforms_file.exists() {
      return Err(ConfigError::MissingFile {
        kind: "platforms",
        path: self.base.platforms_file.clone(),
      });
    }

    create_out_dir(&self.base.out_dir)?;

    let targets = match &self.project {
      Some(project) => project
        .targets
        .iter()
        .map(|target| resolve_target(&self.base, project, target, &version))
        .collect(),
      None => vec![resolve_legacy(&self.base, &version)],
    };

    Ok(BuildPlan {
      mode: self.mode(),
      project_name: self.base.project_name.clone(),
      version,
      out_dir: self.base.out_dir.clone(),
      targets,
    })
  }
}

fn create_out_dir(path: &Path) -> Result<(), ConfigError> {
  std::fs::create_dir_all(path).map_err(|source| ConfigError::CreateOutDir {
    path: path.to_path_buf(),
    source,
  })
}

/// The immutable result of startup: one resolved configuration per target.
#[derive(Debug, Clone)]
pub struct BuildPlan {
  pub mode: BuildMode,
  pub project_name: String,
  pub version: String,
  pub out_dir: PathBuf,
  pub targets: Vec<ResolvedBuildConfig>,
}
