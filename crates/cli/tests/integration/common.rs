//! Shared test helpers for CLI integration tests.

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// A `go` stand-in: writes a small file at the `-o` path and records its environment.
const FAKE_GO: &str = r#"#!/bin/sh
out=""
while [ $# -gt 0 ]; do
  if [ "$1" = "-o" ]; then
    shift
    out="$1"
  fi
  shift
done
printf 'binary for %s/%s arm=%s\n' "$GOOS" "$GOARCH" "$GOARM" > "$out"
"#;

/// A `go` stand-in that always fails with a compiler-style message.
const FAILING_GO: &str = r##"#!/bin/sh
echo "# example.com/app" >&2
echo "./main.go:3:2: undefined: missing" >&2
exit 2
"##;

/// A `gh` stand-in that appends each invocation to `gh.log` in its own directory.
const FAKE_GH: &str = r#"#!/bin/sh
echo "$@" >> "$(dirname "$0")/gh.log"
"#;

/// Isolated project directory plus a directory of fake tools.
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  pub fn new() -> Self {
    let env = Self {
      temp: TempDir::new().unwrap(),
    };
    std::fs::create_dir_all(env.project()).unwrap();
    std::fs::create_dir_all(env.tools()).unwrap();
    env
  }

  pub fn project(&self) -> PathBuf {
    self.temp.path().join("project")
  }

  pub fn tools(&self) -> PathBuf {
    self.temp.path().join("tools")
  }

  pub fn bin(&self) -> PathBuf {
    self.project().join("bin")
  }

  /// Write a file relative to the project directory.
  pub fn write_file(&self, relative_path: &str, content: &str) {
    let path = self.project().join(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
  }

  fn install_tool(&self, name: &str, script: &str) -> PathBuf {
    let path = self.tools().join(name);
    std::fs::write(&path, script).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
  }

  pub fn with_fake_go(self) -> Self {
    self.install_tool("go", FAKE_GO);
    self
  }

  pub fn with_failing_go(self) -> Self {
    self.install_tool("go", FAILING_GO);
    self
  }

  pub fn with_fake_gh(self) -> Self {
    self.install_tool("gh", FAKE_GH);
    self
  }

  /// Lines logged by the fake `gh`.
  pub fn gh_log(&self) -> Vec<String> {
    std::fs::read_to_string(self.tools().join("gh.log"))
      .unwrap_or_default()
      .lines()
      .map(str::to_string)
      .collect()
  }

  /// Files in the output directory, sorted.
  pub fn bin_files(&self) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(self.bin())
      .unwrap()
      .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
      .collect();
    names.sort();
    names
  }

  /// The xbuild binary, run in the project directory with the fake tools first on PATH.
  pub fn xbuild_cmd(&self) -> Command {
    let path = match std::env::var_os("PATH") {
      Some(existing) => {
        let mut paths = vec![self.tools()];
        paths.extend(std::env::split_paths(&existing));
        std::env::join_paths(paths).unwrap()
      }
      None => self.tools().into_os_string(),
    };

    let mut cmd = cargo_bin_cmd!("xbuild");
    cmd
      .current_dir(self.project())
      .env("PATH", path)
      .env_remove("GH_CLI_PATH")
      .env_remove("RUST_LOG");
    cmd
  }
}

/// Names of the entries in a tar.gz archive.
pub fn tar_gz_names(path: &Path) -> Vec<String> {
  let file = std::fs::File::open(path).unwrap();
  let mut archive = tar::Archive::new(flate2::read::GzDecoder::new(file));
  archive
    .entries()
    .unwrap()
    .map(|e| e.unwrap().path().unwrap().to_string_lossy().trim_end_matches('/').to_string())
    .collect()
}
