//! External command execution.
//!
//! Every subprocess the pipeline starts (toolchain builds, hosting CLI calls)
//! goes through the [`CommandRunner`] capability. [`SystemRunner`] spawns real
//! processes; [`RecordingRunner`] records invocations instead, for tests.

mod recording;
mod system;

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

pub use recording::RecordingRunner;
pub use system::SystemRunner;

/// A fully specified external command.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandSpec {
  /// Executable name or path.
  pub program: String,
  /// Argument vector, excluding the program itself.
  pub args: Vec<String>,
  /// Variables layered on top of the inherited environment.
  pub env: BTreeMap<String, String>,
  /// Working directory; `None` inherits the caller's.
  pub cwd: Option<PathBuf>,
}

impl CommandSpec {
  pub fn new(program: impl Into<String>) -> Self {
    Self {
      program: program.into(),
      ..Default::default()
    }
  }

  pub fn arg(mut self, arg: impl Into<String>) -> Self {
    self.args.push(arg.into());
    self
  }

  pub fn args<I, S>(mut self, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.args.extend(args.into_iter().map(Into::into));
    self
  }

  pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
    self.env.insert(key.into(), value.into());
    self
  }

  pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
    self.cwd = Some(dir.into());
    self
  }

  /// Value of the argument following `flag`, if present.
  pub fn arg_after(&self, flag: &str) -> Option<&str> {
    let pos = self.args.iter().position(|a| a == flag)?;
    self.args.get(pos + 1).map(String::as_str)
  }
}

impl fmt::Display for CommandSpec {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.program)?;
    for arg in &self.args {
      if arg.is_empty() || arg.contains(char::is_whitespace) {
        write!(f, " {:?}", arg)?;
      } else {
        write!(f, " {}", arg)?;
      }
    }
    Ok(())
  }
}

/// How a command finished.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutcome {
  /// Exit code; `None` if the process was terminated by a signal.
  pub code: Option<i32>,
  /// Last lines the process wrote to stderr.
  pub stderr_tail: Vec<String>,
}

impl CommandOutcome {
  pub fn success() -> Self {
    Self {
      code: Some(0),
      stderr_tail: Vec::new(),
    }
  }

  pub fn failure(code: i32, stderr: &str) -> Self {
    Self {
      code: Some(code),
      stderr_tail: stderr.lines().map(str::to_string).collect(),
    }
  }

  pub fn is_success(&self) -> bool {
    self.code == Some(0)
  }
}

/// Runs external commands, passing their output through to the caller's streams.
pub trait CommandRunner {
  /// Run `spec` to completion.
  ///
  /// Returns `Err` only if the process could not be started or waited on; a
  /// non-zero exit is reported through [`CommandOutcome::code`].
  fn run(&self, spec: &CommandSpec) -> std::io::Result<CommandOutcome>;
}

impl<T: CommandRunner + ?Sized> CommandRunner for &T {
  fn run(&self, spec: &CommandSpec) -> std::io::Result<CommandOutcome> {
    (**self).run(spec)
  }
}
