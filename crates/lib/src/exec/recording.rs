//! Recording runner for tests and dry runs.

use std::sync::Mutex;

use super::{CommandOutcome, CommandRunner, CommandSpec};

type Handler = Box<dyn Fn(&CommandSpec) -> std::io::Result<CommandOutcome> + Send + Sync>;

/// Records every command instead of spawning it.
///
/// By default every command succeeds. A handler can be installed to simulate
/// side effects (e.g. writing the toolchain's output file) or failures.
pub struct RecordingRunner {
  calls: Mutex<Vec<CommandSpec>>,
  handler: Handler,
}

impl RecordingRunner {
  pub fn new() -> Self {
    Self::with_handler(|_| Ok(CommandOutcome::success()))
  }

  pub fn with_handler<F>(handler: F) -> Self
  where
    F: Fn(&CommandSpec) -> std::io::Result<CommandOutcome> + Send + Sync + 'static,
  {
    Self {
      calls: Mutex::new(Vec::new()),
      handler: Box::new(handler),
    }
  }

  /// Every command run so far, in order.
  pub fn calls(&self) -> Vec<CommandSpec> {
    match self.calls.lock() {
      Ok(calls) => calls.clone(),
      Err(poisoned) => poisoned.into_inner().clone(),
    }
  }
}

impl Default for RecordingRunner {
  fn default() -> Self {
    Self::new()
  }
}

impl std::fmt::Debug for RecordingRunner {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("RecordingRunner").field("calls", &self.calls()).finish()
  }
}

impl CommandRunner for RecordingRunner {
  fn run(&self, spec: &CommandSpec) -> std::io::Result<CommandOutcome> {
    match self.calls.lock() {
      Ok(mut calls) => calls.push(spec.clone()),
      Err(poisoned) => poisoned.into_inner().push(spec.clone()),
    }
    (self.handler)(spec)
  }
}
