//! Build pipeline.
//!
//! For every target of a [`BuildPlan`], in order:
//!
//! 1. Remove the target's stale checksum manifest.
//! 2. For each platform of the platforms file, run the toolchain and package
//!    the binary.
//! 3. Unless disabled, do the same for the Raspberry Pi variants.
//!
//! Execution is strictly sequential. The first failure aborts the run; nothing
//! already produced is rolled back.

use std::path::PathBuf;

use thiserror::Error;
use tracing::info;

use crate::config::{BuildPlan, ResolvedBuildConfig};
use crate::exec::CommandRunner;
use crate::package::{PackageError, PackagedArchive, Packager};
use crate::platform::{BuildPlatform, PiVariant, PlatformList, PlatformsError};
use crate::toolchain::{Toolchain, ToolchainError};

/// A pipeline failure, tagged with the target (and platform) it happened on.
#[derive(Debug, Error)]
pub enum BuildError {
  #[error("target {target}: could not load platforms")]
  Platforms {
    target: String,
    #[source]
    source: PlatformsError,
  },

  #[error("target {target}: build for {platform} failed")]
  Toolchain {
    target: String,
    platform: String,
    #[source]
    source: ToolchainError,
  },

  #[error("target {target}: packaging for {platform} failed")]
  Package {
    target: String,
    platform: String,
    #[source]
    source: PackageError,
  },

  #[error("target {target}: checksum manifest failed")]
  Manifest {
    target: String,
    #[source]
    source: PackageError,
  },
}

/// Everything one target produced.
#[derive(Debug, Clone)]
pub struct TargetReport {
  pub name: String,
  pub manifest: PathBuf,
  pub archives: Vec<PackagedArchive>,
}

/// Outcome of a successful run.
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
  pub targets: Vec<TargetReport>,
}

impl BuildReport {
  pub fn archive_count(&self) -> usize {
    self.targets.iter().map(|t| t.archives.len()).sum()
  }
}

/// Drives toolchain and packager over a plan.
pub struct Pipeline<'a> {
  runner: &'a dyn CommandRunner,
  toolchain: Toolchain,
}

impl<'a> Pipeline<'a> {
  pub fn new(runner: &'a dyn CommandRunner) -> Self {
    Self {
      runner,
      toolchain: Toolchain::default(),
    }
  }

  /// Build and package every target of `plan`.
  pub fn run(&self, plan: &BuildPlan) -> Result<BuildReport, BuildError> {
    info!(
      project = %plan.project_name,
      version = %plan.version,
      targets = plan.targets.len(),
      "starting build"
    );

    let mut report = BuildReport::default();
    for config in &plan.targets {
      report.targets.push(self.build_target(config)?);
    }
    Ok(report)
  }

  /// Build and package one target for every platform.
  pub fn build_target(&self, config: &ResolvedBuildConfig) -> Result<TargetReport, BuildError> {
    let packager = Packager::new(config);
    packager.manifest().remove_stale().map_err(|source| BuildError::Manifest {
      target: config.name.clone(),
      source,
    })?;

    info!(name = %config.name, source = %config.source_path, "building target");

    let platforms = PlatformList::new(&config.platforms_file);
    let platforms = platforms.iter().map_err(|source| BuildError::Platforms {
      target: config.name.clone(),
      source,
    })?;

    let mut archives = Vec::new();
    for platform in platforms {
      let platform = platform.map_err(|source| BuildError::Platforms {
        target: config.name.clone(),
        source,
      })?;
      archives.push(self.build_platform(config, &packager, &BuildPlatform::Standard(platform))?);
    }

    if config.build_pi {
      for variant in PiVariant::ALL {
        archives.push(self.build_platform(config, &packager, &BuildPlatform::RaspberryPi(variant))?);
      }
    }

    info!(name = %config.name, archives = archives.len(), "target complete");

    Ok(TargetReport {
      name: config.name.clone(),
      manifest: packager.manifest().path().to_path_buf(),
      archives,
    })
  }

  fn build_platform(
    &self,
    config: &ResolvedBuildConfig,
    packager: &Packager<'_>,
    platform: &BuildPlatform,
  ) -> Result<PackagedArchive, BuildError> {
    let output = config.binary_name(platform);

    let binary = self
      .toolchain
      .build(self.runner, config, platform, &output)
      .map_err(|source| BuildError::Toolchain {
        target: config.name.clone(),
        platform: platform.label(),
        source,
      })?;

    packager.package(&binary, platform).map_err(|source| BuildError::Package {
      target: config.name.clone(),
      platform: platform.label(),
      source,
    })
  }
}
