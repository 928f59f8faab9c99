//! `--list-targets`: show what a build would produce.

use anyhow::Result;
use owo_colors::{OwoColorize, Stream};

use xbuild_lib::config::{BuildMode, BuildOptions, ProjectSetup};

use crate::output::{print_info, symbols};

pub fn cmd_targets(options: &BuildOptions) -> Result<()> {
  let setup = ProjectSetup::load(options)?;
  let targets = setup.targets();

  let mode = match setup.mode() {
    BuildMode::Legacy => "single target",
    BuildMode::MultiTarget => "multi-target",
  };
  print_info(&format!("{} ({}, {} target(s))", setup.base.project_name, mode, targets.len()));

  for target in targets {
    println!(
      "  {} {} {} {}",
      target.name,
      target.source_path.if_supports_color(Stream::Stdout, |s| s.dimmed()),
      symbols::ARROW,
      target.output_name
    );
  }
  Ok(())
}
