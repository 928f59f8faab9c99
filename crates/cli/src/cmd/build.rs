//! Default mode: build and package every target.

use std::time::Instant;

use anyhow::Result;

use xbuild_lib::build::{BuildReport, Pipeline};
use xbuild_lib::config::{BuildOptions, ProjectSetup};
use xbuild_lib::exec::SystemRunner;
use xbuild_lib::package::ChecksumManifest;

use crate::output::{archive_stat, format_duration, print_info, print_stat, print_success};

/// Execute a build.
///
/// Loads the configuration, verifies the version and platforms files, then runs
/// the toolchain and packager for every target and platform. Stops at the first
/// failure.
pub fn cmd_build(options: &BuildOptions) -> Result<()> {
  let start = Instant::now();

  let setup = ProjectSetup::load(options)?;
  let plan = setup.plan()?;

  print_info(&format!(
    "Building {} {} ({} target{})",
    plan.project_name,
    plan.version,
    plan.targets.len(),
    if plan.targets.len() == 1 { "" } else { "s" }
  ));

  let runner = SystemRunner::new();
  let report = Pipeline::new(&runner).run(&plan)?;

  print_summary(&report)?;
  print_success(&format!(
    "Built {} archive(s) in {}",
    report.archive_count(),
    format_duration(start.elapsed())
  ));

  Ok(())
}

/// List every archive recorded in the targets' manifests.
fn print_summary(report: &BuildReport) -> Result<()> {
  println!();
  for target in &report.targets {
    println!("{}", target.name);
    for entry in ChecksumManifest::new(&target.manifest).entries()? {
      let size = target
        .archives
        .iter()
        .find(|a| a.path.file_name().is_some_and(|n| n.to_string_lossy() == entry.file_name))
        .map(|a| a.size);
      print_stat(&entry.file_name, &archive_stat(size, &entry.hash));
    }
  }
  println!();
  Ok(())
}
