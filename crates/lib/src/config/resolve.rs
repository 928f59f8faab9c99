//! Base configuration and per-target resolution.
//!
//! Every target receives its own [`ResolvedBuildConfig`]. List fields are always
//! freshly allocated so that nothing done to one target's configuration can be
//! observed through another's.

use std::path::{Path, PathBuf};

use super::project::{BuildTarget, ProjectConfig, non_empty};
use crate::consts::{
  CHECKSUMS_SUFFIX, CURRENT_DIR, DEFAULT_BUILD_FLAGS, DEFAULT_LD_FLAGS, OUT_DIR_NAME, PLATFORMS_FILE_NAME,
  STAGING_SUFFIX, VERSION_FILE_NAME,
};
use crate::platform::BuildPlatform;

/// Settings shared by every target of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
  pub project_name: String,
  /// Directory the toolchain runs in; relative paths resolve against it.
  pub project_root: PathBuf,
  /// Receives finished archives and checksum manifests.
  pub out_dir: PathBuf,
  pub version_file: PathBuf,
  pub platforms_file: PathBuf,
  /// Manifest names are `<name>-<version>-<suffix>`.
  pub checksums_suffix: String,
  pub ld_flags: String,
  pub build_flags: String,
  /// Files given on the command line; packaged with every target.
  pub additional_files: Vec<PathBuf>,
  /// Raw arguments appended to every toolchain invocation.
  pub extra_build_args: Vec<String>,
  /// Whether the Raspberry Pi variants are built after the listed platforms.
  pub build_pi: bool,
}

impl BuildConfig {
  /// Single-target defaults for a project rooted at `root`.
  ///
  /// The project name is the root directory's base name.
  pub fn for_project_root(root: &Path) -> Self {
    let project_name = root
      .file_name()
      .map(|n| n.to_string_lossy().to_string())
      .unwrap_or_else(|| "project".to_string());

    Self {
      project_name,
      project_root: root.to_path_buf(),
      out_dir: root.join(OUT_DIR_NAME),
      version_file: root.join(VERSION_FILE_NAME),
      platforms_file: root.join(PLATFORMS_FILE_NAME),
      checksums_suffix: CHECKSUMS_SUFFIX.to_string(),
      ld_flags: DEFAULT_LD_FLAGS.to_string(),
      build_flags: DEFAULT_BUILD_FLAGS.to_string(),
      additional_files: Vec::new(),
      extra_build_args: Vec::new(),
      build_pi: true,
    }
  }

  /// Apply the project-level settings of a project file.
  pub fn apply_project(&mut self, project: &ProjectConfig) {
    if !project.project_name.is_empty() {
      self.project_name = project.project_name.clone();
    }
    if let Some(file) = &project.version_file {
      self.version_file = self.resolve_path(file);
    }
    if let Some(file) = &project.platforms_file {
      self.platforms_file = self.resolve_path(file);
    }
  }

  /// Resolve `path` against the project root (absolute paths are kept).
  pub fn resolve_path(&self, path: &Path) -> PathBuf {
    self.project_root.join(path)
  }
}

/// Everything needed to build, package and checksum one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBuildConfig {
  /// Name used in artifact names.
  pub name: String,
  /// Source path handed to the toolchain; `.` means the project root.
  pub source_path: String,
  pub version: String,
  pub project_root: PathBuf,
  pub out_dir: PathBuf,
  pub version_file: PathBuf,
  pub platforms_file: PathBuf,
  /// File name of this target's checksum manifest inside `out_dir`.
  pub checksums_file: String,
  pub ld_flags: String,
  pub build_flags: String,
  /// Global, then target-specific, then command line files. Not de-duplicated.
  pub additional_files: Vec<PathBuf>,
  pub extra_build_args: Vec<String>,
  pub build_pi: bool,
}

impl ResolvedBuildConfig {
  /// `<name>-<version>-<label>`, shared by binary, staging directory and archive.
  pub fn artifact_stem(&self, platform: &BuildPlatform) -> String {
    format!("{}-{}-{}", self.name, self.version, platform.label())
  }

  /// File name of the binary the toolchain produces.
  pub fn binary_name(&self, platform: &BuildPlatform) -> String {
    format!("{}{}", self.artifact_stem(platform), platform.binary_suffix())
  }

  /// Directory name used to stage files before archiving.
  pub fn staging_dir_name(&self, platform: &BuildPlatform) -> String {
    format!("{}{}", self.artifact_stem(platform), STAGING_SUFFIX)
  }

  pub fn checksum_path(&self) -> PathBuf {
    self.out_dir.join(&self.checksums_file)
  }

  /// Source path to pass to the toolchain, if any.
  pub fn source_arg(&self) -> Option<&str> {
    let path = self.source_path.as_str();
    (!path.is_empty() && path != CURRENT_DIR).then_some(path)
  }
}

fn checksums_file(name: &str, version: &str, suffix: &str) -> String {
  format!("{}-{}-{}", name, version, suffix)
}

/// Resolve the single implicit target of legacy mode.
pub fn resolve_legacy(base: &BuildConfig, version: &str) -> ResolvedBuildConfig {
  ResolvedBuildConfig {
    name: base.project_name.clone(),
    source_path: CURRENT_DIR.to_string(),
    version: version.to_string(),
    project_root: base.project_root.clone(),
    out_dir: base.out_dir.clone(),
    version_file: base.version_file.clone(),
    platforms_file: base.platforms_file.clone(),
    checksums_file: checksums_file(&base.project_name, version, &base.checksums_suffix),
    ld_flags: base.ld_flags.clone(),
    build_flags: base.build_flags.clone(),
    additional_files: base.additional_files.iter().map(|f| base.resolve_path(f)).collect(),
    extra_build_args: base.extra_build_args.clone(),
    build_pi: base.build_pi,
  }
}

/// Resolve one target of a project file against the shared base.
///
/// Flags fall back to the project's defaults when the target leaves them empty.
/// Additional files are the project's global files, then the target's own, then
/// the command line's, collected into a new vector.
pub fn resolve_target(
  base: &BuildConfig,
  project: &ProjectConfig,
  target: &BuildTarget,
  version: &str,
) -> ResolvedBuildConfig {
  let name = target.effective_name().to_string();

  let ld_flags = non_empty(&target.ldflags)
    .unwrap_or(project.default_ldflags.as_str())
    .to_string();
  let build_flags = non_empty(&target.build_flags)
    .unwrap_or(project.default_build_flags.as_str())
    .to_string();

  let mut additional_files = Vec::with_capacity(
    project.global_additional_files.len() + target.additional_files.len() + base.additional_files.len(),
  );
  additional_files.extend(
    project
      .global_additional_files
      .iter()
      .chain(&target.additional_files)
      .chain(&base.additional_files)
      .map(|f| base.resolve_path(f)),
  );

  ResolvedBuildConfig {
    checksums_file: checksums_file(&name, version, &base.checksums_suffix),
    name,
    source_path: target.path.clone(),
    version: version.to_string(),
    project_root: base.project_root.clone(),
    out_dir: base.out_dir.clone(),
    version_file: base.version_file.clone(),
    platforms_file: base.platforms_file.clone(),
    ld_flags,
    build_flags,
    additional_files,
    extra_build_args: base.extra_build_args.clone(),
    build_pi: base.build_pi,
  }
}
