//! Real process execution.

use std::collections::VecDeque;
use std::io::{BufRead, BufReader, Write};
use std::process::{Command, Stdio};

use tracing::debug;

use super::{CommandOutcome, CommandRunner, CommandSpec};
use crate::consts::STDERR_TAIL_LINES;

/// Spawns real processes.
///
/// The child inherits the caller's environment (plus [`CommandSpec::env`]) and
/// standard output. Standard error is forwarded line by line to the caller's
/// stderr while the last lines are kept for error reporting.
#[derive(Debug, Clone)]
pub struct SystemRunner {
  tail_lines: usize,
}

impl SystemRunner {
  pub fn new() -> Self {
    Self {
      tail_lines: STDERR_TAIL_LINES,
    }
  }
}

impl Default for SystemRunner {
  fn default() -> Self {
    Self::new()
  }
}

impl CommandRunner for SystemRunner {
  fn run(&self, spec: &CommandSpec) -> std::io::Result<CommandOutcome> {
    let mut command = Command::new(&spec.program);
    command
      .args(&spec.args)
      .envs(&spec.env)
      .stdin(Stdio::inherit())
      .stdout(Stdio::inherit())
      .stderr(Stdio::piped());

    if let Some(cwd) = &spec.cwd {
      command.current_dir(cwd);
    }

    debug!(command = %spec, cwd = ?spec.cwd, "spawning process");

    let mut child = command.spawn()?;

    let stderr_tail = match child.stderr.take() {
      Some(stderr) => match self.forward_stderr(BufReader::new(stderr), &mut std::io::stderr().lock()) {
        Ok(tail) => tail,
        Err(err) => {
          // Reap the child before bailing out.
          let _ = child.kill();
          let _ = child.wait();
          return Err(err);
        }
      },
      None => Vec::new(),
    };

    let status = child.wait()?;
    debug!(command = %spec.program, code = ?status.code(), "process exited");

    Ok(CommandOutcome {
      code: status.code(),
      stderr_tail,
    })
  }
}

impl SystemRunner {
  /// Copy `reader` to `sink` line by line, returning the last lines read.
  fn forward_stderr(&self, mut reader: impl BufRead, sink: &mut impl Write) -> std::io::Result<Vec<String>> {
    let mut tail = VecDeque::with_capacity(self.tail_lines);
    let mut line = Vec::new();
    loop {
      line.clear();
      if reader.read_until(b'\n', &mut line)? == 0 {
        break;
      }
      // Forwarding is best effort; the tail is what ends up in errors.
      let _ = sink.write_all(&line);
      if self.tail_lines > 0 {
        if tail.len() == self.tail_lines {
          tail.pop_front();
        }
        tail.push_back(String::from_utf8_lossy(&line).trim_end().to_string());
      }
    }
    let _ = sink.flush();
    Ok(tail.into())
  }
}
