//! Release mode integration tests.

use predicates::prelude::*;

use super::common::TestEnv;

fn built(env: &TestEnv, assets: usize) {
  env.write_file("VERSION", "v2.0.0\n");
  for i in 0..assets {
    env.write_file(&format!("bin/app-{:02}.tar.gz", i), "archive");
  }
}

#[test]
fn release_uploads_in_batches() {
  let env = TestEnv::new().with_fake_gh();
  built(&env, 12);

  env
    .xbuild_cmd()
    .args(["--release", "--release-note", "first release"])
    .env("GITHUB_TOKEN", "test-token")
    .assert()
    .success()
    .stdout(predicate::str::contains("Release v2.0.0 created with 12 asset(s)"));

  let log = env.gh_log();
  assert_eq!(log.len(), 3);
  assert_eq!(log[0], "release create v2.0.0 --notes first release");
  assert!(log[1].starts_with("release upload v2.0.0 "));
  assert_eq!(log[1].split(' ').count(), 13);
  assert_eq!(log[2].split(' ').count(), 5);
}

#[test]
fn release_requires_token() {
  let env = TestEnv::new().with_fake_gh();
  built(&env, 1);

  env
    .xbuild_cmd()
    .arg("--release")
    .env_remove("GITHUB_TOKEN")
    .assert()
    .code(1)
    .stderr(predicate::str::contains("GITHUB_TOKEN"));

  assert!(env.gh_log().is_empty());
}

#[test]
fn release_requires_notes() {
  let env = TestEnv::new().with_fake_gh();
  built(&env, 1);

  env
    .xbuild_cmd()
    .arg("--release")
    .env("GITHUB_TOKEN", "test-token")
    .assert()
    .code(1)
    .stderr(predicate::str::contains("release_notes.md"));
}
