//! Toolchain invocation.
//!
//! Builds one binary per (target, platform) by running the Go toolchain with the
//! target OS and architecture in its environment. The argument order is fixed:
//!
//! `build [-ldflags=<ld>] [<build flags>...] [<extra args>...] -o <output> [<source>]`

use std::path::PathBuf;

use thiserror::Error;
use tracing::info;

use crate::args::{self, ParseError};
use crate::config::ResolvedBuildConfig;
use crate::consts::CURRENT_DIR;
use crate::exec::{CommandRunner, CommandSpec};
use crate::platform::BuildPlatform;

/// Environment variable selecting the target operating system.
pub const OS_ENV: &str = "GOOS";
/// Environment variable selecting the target architecture.
pub const ARCH_ENV: &str = "GOARCH";
/// Environment variable selecting the ARM ABI revision.
pub const ARM_ENV: &str = "GOARM";

/// Errors that can occur while running the toolchain.
#[derive(Debug, Error)]
pub enum ToolchainError {
  /// The configured build flags could not be tokenized.
  #[error("failed to parse build flags '{flags}'")]
  Flags {
    flags: String,
    #[source]
    source: ParseError,
  },

  /// The toolchain could not be started.
  #[error("failed to run {program}")]
  Spawn {
    program: String,
    #[source]
    source: std::io::Error,
  },

  /// The toolchain exited unsuccessfully.
  #[error("toolchain {}{}", describe_exit(.code), format_tail(.stderr_tail))]
  Failed { code: Option<i32>, stderr_tail: Vec<String> },
}

fn describe_exit(code: &Option<i32>) -> String {
  match code {
    Some(code) => format!("exited with code {}", code),
    None => "was terminated by a signal".to_string(),
  }
}

fn format_tail(tail: &[String]) -> String {
  if tail.is_empty() {
    String::new()
  } else {
    format!(":\n{}", tail.join("\n"))
  }
}

/// The external compiler driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
  pub program: String,
}

impl Default for Toolchain {
  fn default() -> Self {
    Self {
      program: "go".to_string(),
    }
  }
}

impl Toolchain {
  /// Construct the build command for one platform.
  ///
  /// `source` is omitted when empty or `.`.
  pub fn command(
    &self,
    config: &ResolvedBuildConfig,
    platform: &BuildPlatform,
    output: &str,
    source: Option<&str>,
  ) -> Result<CommandSpec, ToolchainError> {
    let mut spec = CommandSpec::new(&self.program)
      .arg("build")
      .current_dir(&config.project_root)
      .env(OS_ENV, platform.target_os())
      .env(ARCH_ENV, platform.target_arch());

    if let Some(revision) = platform.arm_revision() {
      spec = spec.env(ARM_ENV, revision);
    }

    if !config.ld_flags.is_empty() {
      spec = spec.arg(format!("-ldflags={}", config.ld_flags));
    }

    if !config.build_flags.is_empty() {
      let flags = args::parse(&config.build_flags).map_err(|source| ToolchainError::Flags {
        flags: config.build_flags.clone(),
        source,
      })?;
      spec = spec.args(flags);
    }

    spec = spec.args(config.extra_build_args.iter().cloned()).args(["-o", output]);

    if let Some(source) = source.filter(|s| !s.is_empty() && *s != CURRENT_DIR) {
      spec = spec.arg(source);
    }

    Ok(spec)
  }

  /// Build the binary for `platform` and return its path.
  ///
  /// Blocks until the toolchain exits. The binary is written to the project root.
  pub fn build(
    &self,
    runner: &dyn CommandRunner,
    config: &ResolvedBuildConfig,
    platform: &BuildPlatform,
    output: &str,
  ) -> Result<PathBuf, ToolchainError> {
    let spec = self.command(config, platform, output, config.source_arg())?;

    info!(platform = %platform, output = %output, "building");

    let outcome = runner.run(&spec).map_err(|source| ToolchainError::Spawn {
      program: self.program.clone(),
      source,
    })?;

    if !outcome.is_success() {
      return Err(ToolchainError::Failed {
        code: outcome.code,
        stderr_tail: outcome.stderr_tail,
      });
    }

    Ok(config.project_root.join(output))
  }
}
