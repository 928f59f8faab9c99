//! Release mode: publish the output directory.

use std::path::PathBuf;

use anyhow::Result;

use xbuild_lib::config::{BuildOptions, ProjectSetup};
use xbuild_lib::exec::SystemRunner;
use xbuild_lib::release::{Publisher, ReleaseNotes, ReleaseRequest};

use crate::output::{print_info, print_success};

/// Execute a release.
///
/// Requires the GitHub CLI and `GITHUB_TOKEN`. The tag is the project version.
pub fn cmd_release(options: &BuildOptions, note: Option<String>, note_file: Option<PathBuf>) -> Result<()> {
  let runner = SystemRunner::new();
  let publisher = Publisher::from_env(&runner)?;

  let setup = ProjectSetup::load(options)?;
  let request = ReleaseRequest {
    tag: setup.version()?,
    project_root: setup.base.project_root.clone(),
    out_dir: setup.base.out_dir.clone(),
    notes: ReleaseNotes::from_options(note, note_file),
  };

  print_info(&format!("Creating release {}", request.tag));
  let report = publisher.publish(&request)?;

  print_success(&format!(
    "Release {} created with {} asset(s) in {} upload batch(es)",
    report.tag,
    report.assets.len(),
    report.batches
  ));
  Ok(())
}
