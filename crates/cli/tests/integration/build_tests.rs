//! Build mode integration tests.

use predicates::prelude::*;

use super::common::{TestEnv, tar_gz_names};

fn legacy_project(env: &TestEnv) {
  env.write_file("VERSION", "v0.3.1\n");
  env.write_file("platforms.txt", "# platforms\nlinux/amd64\nwindows/amd64\n");
  env.write_file("README.md", "# app\n");
  env.write_file("CHANGELOG.md", "## 0.3.1\n");
}

#[test]
fn build_packages_every_platform() {
  let env = TestEnv::new().with_fake_go();
  legacy_project(&env);

  env
    .xbuild_cmd()
    .args(["--pi=false", "--additional-files", "CHANGELOG.md"])
    .assert()
    .success()
    .stdout(
      predicate::str::contains("Built 2 archive(s)")
        .and(predicate::str::contains("project-v0.3.1-linux-amd64.d.tar.gz: "))
        .and(predicate::str::contains("B (")),
    );

  assert_eq!(
    env.bin_files(),
    vec![
      "project-v0.3.1-checksums.txt",
      "project-v0.3.1-linux-amd64.d.tar.gz",
      "project-v0.3.1-windows-amd64.d.zip",
    ]
  );

  let names = tar_gz_names(&env.bin().join("project-v0.3.1-linux-amd64.d.tar.gz"));
  assert!(names.contains(&"project-v0.3.1-linux-amd64.d/project-v0.3.1-linux-amd64".to_string()));
  assert!(names.contains(&"project-v0.3.1-linux-amd64.d/README.md".to_string()));
  assert!(names.contains(&"project-v0.3.1-linux-amd64.d/CHANGELOG.md".to_string()));

  let manifest = std::fs::read_to_string(env.bin().join("project-v0.3.1-checksums.txt")).unwrap();
  assert_eq!(manifest.lines().count(), 2);
  assert!(!env.project().join("project-v0.3.1-linux-amd64").exists());
}

#[test]
fn build_includes_raspberry_pi_by_default() {
  let env = TestEnv::new().with_fake_go();
  legacy_project(&env);

  env.xbuild_cmd().assert().success();

  let files = env.bin_files();
  assert!(files.contains(&"project-v0.3.1-raspberry-pi.d.tar.gz".to_string()));
  assert!(files.contains(&"project-v0.3.1-raspberry-pi-jessie.d.tar.gz".to_string()));
}

#[test]
fn missing_additional_file_is_only_a_warning() {
  let env = TestEnv::new().with_fake_go();
  legacy_project(&env);

  env
    .xbuild_cmd()
    .args(["--pi=false", "--additional-files", "NOPE.md"])
    .assert()
    .success()
    .stderr(predicate::str::contains("additional file not found"));
}

#[test]
fn toolchain_failure_exits_with_stderr_tail() {
  let env = TestEnv::new().with_failing_go();
  legacy_project(&env);

  env
    .xbuild_cmd()
    .arg("--pi=false")
    .assert()
    .code(1)
    .stderr(
      predicate::str::contains("exited with code 2")
        .and(predicate::str::contains("undefined: missing"))
        .and(predicate::str::contains("linux-amd64")),
    );

  assert!(env.bin_files().is_empty());
}

#[test]
fn multi_target_build() {
  let env = TestEnv::new().with_fake_go();
  env.write_file("VERSION", "1.0.0\n");
  env.write_file("ci/platforms.txt", "darwin/arm64\n");
  env.write_file(
    "xbuild.json",
    r#"{
      "project_name": "suite",
      "targets": [
        { "name": "server", "path": "./cmd/server" },
        { "name": "client", "path": "./cmd/client", "output_name": "suite-client" }
      ]
    }"#,
  );

  env
    .xbuild_cmd()
    .args(["--config", "xbuild.json", "--platforms-file", "ci/platforms.txt", "--pi=false"])
    .assert()
    .success();

  assert_eq!(
    env.bin_files(),
    vec![
      "server-1.0.0-checksums.txt",
      "server-1.0.0-darwin-arm64.d.tar.gz",
      "suite-client-1.0.0-checksums.txt",
      "suite-client-1.0.0-darwin-arm64.d.tar.gz",
    ]
  );
}
