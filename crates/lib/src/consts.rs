//! Well-known file names, defaults and environment variable names.

/// Output directory (relative to the project root) that receives archives and manifests.
pub const OUT_DIR_NAME: &str = "bin";

/// Version file name in legacy single-target mode.
pub const VERSION_FILE_NAME: &str = "VERSION";

/// Platforms file name in legacy single-target mode.
pub const PLATFORMS_FILE_NAME: &str = "platforms.txt";

/// Suffix of the per-target checksum manifest: `<name>-<version>-checksums.txt`.
pub const CHECKSUMS_SUFFIX: &str = "checksums.txt";

/// Release notes picked up when neither literal notes nor a notes file are given.
pub const DEFAULT_RELEASE_NOTES: &str = "release_notes.md";

/// Default linker flags in legacy single-target mode.
pub const DEFAULT_LD_FLAGS: &str = "-s -w";

/// Default build flags in legacy single-target mode.
pub const DEFAULT_BUILD_FLAGS: &str = "-trimpath";

/// Source path sentinel meaning "the project root"; never passed to the toolchain.
pub const CURRENT_DIR: &str = ".";

/// Suffix of the transient staging directory.
pub const STAGING_SUFFIX: &str = ".d";

/// Documentation files copied into every archive when present in the project root.
pub const DOC_FILES: &[&str] = &["README.md", "LICENSE.txt", "LICENSE"];

/// Directory (relative to the project root) holding `<name>.1` manual pages.
pub const MAN_PAGE_DIR: &str = "docs";

/// Maximum number of files passed to a single upload invocation.
pub const UPLOAD_BATCH_SIZE: usize = 10;

/// Authentication token required by the hosting CLI.
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Optional override for the hosting CLI executable.
pub const HOSTING_CLI_ENV: &str = "GH_CLI_PATH";

/// Number of trailing stderr lines kept from a failed toolchain run.
pub const STDERR_TAIL_LINES: usize = 20;
