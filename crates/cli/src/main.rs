//! xbuild: cross-compile a Go project for many platforms and package the results.

mod cmd;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use xbuild_lib::args;
use xbuild_lib::config::BuildOptions;

use crate::output::{print_error, render_error};

/// Cross-compile a Go project for every platform in platforms.txt, package each
/// binary into an archive with checksums, and optionally publish a GitHub release.
#[derive(Parser)]
#[command(name = "xbuild")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Also build the Raspberry Pi variants (ARMv7 and ARMv6)
  #[arg(long, value_name = "BOOL", default_value_t = true, action = ArgAction::Set)]
  pi: bool,

  /// Extra arguments for every toolchain invocation (quotes group words)
  #[arg(long, value_name = "ARGS", allow_hyphen_values = true)]
  build_args: Option<String>,

  /// Comma-separated files to include in every archive
  #[arg(long, value_name = "FILES", value_delimiter = ',')]
  additional_files: Vec<String>,

  /// JSON project file describing multiple targets
  #[arg(long, value_name = "PATH")]
  config: Option<PathBuf>,

  /// Platforms file to use instead of the configured one
  #[arg(long, value_name = "PATH")]
  platforms_file: Option<PathBuf>,

  /// List the targets that would be built and exit
  #[arg(long, conflicts_with = "release")]
  list_targets: bool,

  /// Publish the contents of ./bin as a GitHub release
  #[arg(long)]
  release: bool,

  /// Release notes text
  #[arg(long, value_name = "TEXT", requires = "release")]
  release_note: Option<String>,

  /// Release notes file
  #[arg(long, value_name = "PATH", requires = "release")]
  release_note_file: Option<PathBuf>,

  /// Enable debug logging
  #[arg(short, long)]
  verbose: bool,
}

impl Cli {
  fn build_options(&self) -> Result<BuildOptions> {
    let cwd = std::env::current_dir().context("failed to determine working directory")?;
    let mut options = BuildOptions::new(dunce::canonicalize(&cwd).unwrap_or(cwd));

    options.config_file = self.config.clone();
    options.platforms_file = self.platforms_file.clone();
    options.build_pi = self.pi;
    options.additional_files = self
      .additional_files
      .iter()
      .map(|f| f.trim())
      .filter(|f| !f.is_empty())
      .map(PathBuf::from)
      .collect();
    if let Some(build_args) = &self.build_args {
      options.extra_build_args = args::parse(build_args).context("invalid --build-args")?;
    }

    Ok(options)
  }
}

fn init_tracing(verbose: bool) {
  let default_level = if verbose { "debug" } else { "info" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_target(false)
    .without_time()
    .init();
}

fn run(cli: Cli) -> Result<()> {
  let options = cli.build_options()?;
  debug!(root = %options.project_root.display(), pi = options.build_pi, "resolved options");

  if cli.list_targets {
    cmd::cmd_targets(&options)
  } else if cli.release {
    cmd::cmd_release(&options, cli.release_note, cli.release_note_file)
  } else {
    cmd::cmd_build(&options)
  }
}

fn main() -> ExitCode {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  match run(cli) {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      print_error(&render_error(&err));
      ExitCode::FAILURE
    }
  }
}
