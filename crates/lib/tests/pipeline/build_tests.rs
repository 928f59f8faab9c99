//! Build flow: configuration loading, planning, toolchain and packaging.

use std::path::PathBuf;

use xbuild_lib::build::Pipeline;
use xbuild_lib::config::{BuildMode, BuildOptions, ConfigError, ProjectSetup};
use xbuild_lib::package::ChecksumManifest;
use xbuild_lib::util::hash::hash_file;

use super::common::{TestProject, fake_toolchain, read_tar_gz, read_zip};

const MULTI_TARGET: &str = r#"{
  "project_name": "suite",
  "version_file": "VERSION",
  "platforms_file": "platforms.txt",
  "default_ldflags": "-s -w",
  "default_build_flags": "-trimpath",
  "global_additional_files": ["LICENSE"],
  "targets": [
    { "name": "server", "path": "./cmd/server", "additional_files": ["config.example.toml"] },
    { "name": "client", "path": "./cmd/client", "output_name": "suite-client", "ldflags": "-X main.mode=client" }
  ]
}"#;

fn legacy_project() -> TestProject {
  let project = TestProject::new();
  project.write("VERSION", "v1.0.0\n");
  project.write("platforms.txt", "# release platforms\nlinux/amd64\n\nwindows/amd64\nbadline\n");
  project.write("README.md", "# tool\n");
  project.write("main.go", "package main\n");
  project
}

fn multi_target_project() -> TestProject {
  let project = TestProject::new();
  project.write("VERSION", "2.1.0\n");
  project.write("platforms.txt", "linux/arm64\ndarwin/arm64\n");
  project.write("LICENSE", "MIT\n");
  project.write("config.example.toml", "port = 8080\n");
  project.write("xbuild.json", MULTI_TARGET);
  project
}

#[test]
fn legacy_build_produces_archives_and_manifest() {
  let project = legacy_project();
  let mut options = BuildOptions::new(project.root());
  options.build_pi = false;

  let setup = ProjectSetup::load(&options).unwrap();
  assert_eq!(setup.mode(), BuildMode::Legacy);
  let plan = setup.plan().unwrap();

  let runner = fake_toolchain();
  let report = Pipeline::new(&runner).run(&plan).unwrap();
  assert_eq!(report.archive_count(), 2);

  let name = setup.base.project_name.clone();
  let linux = format!("{name}-v1.0.0-linux-amd64");
  let windows = format!("{name}-v1.0.0-windows-amd64");
  assert_eq!(
    project.bin_files(),
    vec![
      format!("{name}-v1.0.0-checksums.txt"),
      format!("{linux}.d.tar.gz"),
      format!("{windows}.d.zip"),
    ]
  );

  let tar_entries = read_tar_gz(&project.bin().join(format!("{linux}.d.tar.gz")));
  let names: Vec<&str> = tar_entries.iter().map(|(n, _)| n.as_str()).collect();
  assert_eq!(names[0], format!("{linux}.d"));
  assert!(names.contains(&format!("{linux}.d/{linux}").as_str()));
  assert!(names.contains(&format!("{linux}.d/README.md").as_str()));
  assert!(names.contains(&format!("{linux}.d/platforms.txt").as_str()));

  let binary = tar_entries
    .iter()
    .find(|(n, _)| n == &format!("{linux}.d/{linux}"))
    .and_then(|(_, c)| c.clone())
    .unwrap();
  let command = String::from_utf8(binary).unwrap();
  assert_eq!(command, format!("go build \"-ldflags=-s -w\" -trimpath -o {linux}"));

  let zip_entries = read_zip(&project.bin().join(format!("{windows}.d.zip")));
  assert_eq!(zip_entries[0].0, format!("{windows}.d/"));
  assert!(zip_entries.iter().any(|(n, _)| n == &format!("{windows}.d/{windows}.exe")));

  let manifest = ChecksumManifest::new(project.bin().join(format!("{name}-v1.0.0-checksums.txt")));
  let entries = manifest.entries().unwrap();
  assert_eq!(entries.len(), 2);
  for entry in entries {
    let actual = hash_file(&project.bin().join(&entry.file_name)).unwrap();
    assert_eq!(entry.hash, actual.as_str());
  }

  assert!(!project.root().join(format!("{linux}.d")).exists());
  assert!(!project.root().join(&linux).exists());
  assert!(!project.root().join(format!("{windows}.exe")).exists());
}

#[test]
fn multi_target_build_resolves_each_target() {
  let project = multi_target_project();
  let mut options = BuildOptions::new(project.root());
  options.config_file = Some(PathBuf::from("xbuild.json"));
  options.build_pi = false;
  options.extra_build_args = vec!["-v".to_string()];

  let setup = ProjectSetup::load(&options).unwrap();
  assert_eq!(setup.mode(), BuildMode::MultiTarget);
  let plan = setup.plan().unwrap();
  assert_eq!(plan.version, "2.1.0");

  let runner = fake_toolchain();
  let report = Pipeline::new(&runner).run(&plan).unwrap();

  let names: Vec<&str> = report.targets.iter().map(|t| t.name.as_str()).collect();
  assert_eq!(names, vec!["server", "suite-client"]);

  let calls = runner.calls();
  assert_eq!(calls.len(), 4);
  assert_eq!(
    calls[0].args,
    vec!["build", "-ldflags=-s -w", "-trimpath", "-v", "-o", "server-2.1.0-linux-arm64", "./cmd/server"]
  );
  assert_eq!(
    calls[3].args,
    vec![
      "build",
      "-ldflags=-X main.mode=client",
      "-trimpath",
      "-v",
      "-o",
      "suite-client-2.1.0-darwin-arm64",
      "./cmd/client"
    ]
  );

  assert_eq!(
    project.bin_files(),
    vec![
      "server-2.1.0-checksums.txt",
      "server-2.1.0-darwin-arm64.d.tar.gz",
      "server-2.1.0-linux-arm64.d.tar.gz",
      "suite-client-2.1.0-checksums.txt",
      "suite-client-2.1.0-darwin-arm64.d.tar.gz",
      "suite-client-2.1.0-linux-arm64.d.tar.gz",
    ]
  );

  let server = read_tar_gz(&project.bin().join("server-2.1.0-linux-arm64.d.tar.gz"));
  assert!(server.iter().any(|(n, _)| n == "server-2.1.0-linux-arm64.d/LICENSE"));
  assert!(server.iter().any(|(n, _)| n == "server-2.1.0-linux-arm64.d/config.example.toml"));

  let client = read_tar_gz(&project.bin().join("suite-client-2.1.0-linux-arm64.d.tar.gz"));
  assert!(client.iter().any(|(n, _)| n == "suite-client-2.1.0-linux-arm64.d/LICENSE"));
  assert!(!client.iter().any(|(n, _)| n.ends_with("config.example.toml")));
}

#[test]
fn rebuild_replaces_manifest() {
  let project = legacy_project();
  let mut options = BuildOptions::new(project.root());
  options.build_pi = false;
  let plan = ProjectSetup::load(&options).unwrap().plan().unwrap();

  let runner = fake_toolchain();
  Pipeline::new(&runner).run(&plan).unwrap();
  let report = Pipeline::new(&runner).run(&plan).unwrap();

  let manifest = ChecksumManifest::new(report.targets[0].manifest.clone());
  assert_eq!(manifest.entries().unwrap().len(), 2);
}

#[test]
fn pi_variants_follow_listed_platforms() {
  let project = legacy_project();
  let plan = ProjectSetup::load(&BuildOptions::new(project.root()))
    .unwrap()
    .plan()
    .unwrap();

  let runner = fake_toolchain();
  let report = Pipeline::new(&runner).run(&plan).unwrap();
  assert_eq!(report.archive_count(), 4);

  let calls = runner.calls();
  let pi = &calls[2];
  assert_eq!(pi.env.get("GOOS").map(String::as_str), Some("linux"));
  assert_eq!(pi.env.get("GOARCH").map(String::as_str), Some("arm"));
  assert_eq!(pi.env.get("GOARM").map(String::as_str), Some("7"));
  assert!(pi.arg_after("-o").unwrap().ends_with("-v1.0.0-raspberry-pi"));
  assert!(calls[3].arg_after("-o").unwrap().ends_with("-v1.0.0-raspberry-pi-jessie"));
}

#[test]
fn missing_version_file_fails_before_any_build() {
  let project = TestProject::new();
  project.write("platforms.txt", "linux/amd64\n");

  let err = ProjectSetup::load(&BuildOptions::new(project.root()))
    .unwrap()
    .plan()
    .unwrap_err();

  assert!(matches!(err, ConfigError::MissingFile { kind: "version", .. }));
  assert!(!project.bin().exists());
}

#[test]
fn platforms_override_applies_in_both_modes() {
  let project = multi_target_project();
  project.write("ci/platforms.txt", "freebsd/amd64\n");

  let mut options = BuildOptions::new(project.root());
  options.config_file = Some(PathBuf::from("xbuild.json"));
  options.platforms_file = Some(PathBuf::from("ci/platforms.txt"));
  options.build_pi = false;

  let plan = ProjectSetup::load(&options).unwrap().plan().unwrap();
  let runner = fake_toolchain();
  Pipeline::new(&runner).run(&plan).unwrap();

  let calls = runner.calls();
  assert_eq!(calls.len(), 2);
  assert!(calls.iter().all(|c| c.env.get("GOOS").map(String::as_str) == Some("freebsd")));
}
