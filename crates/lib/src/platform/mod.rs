//! Build platforms.
//!
//! A [`Platform`] is an `os/arch` pair read from the platforms file. A
//! [`BuildPlatform`] is what a single pipeline step builds for: either one of
//! those pairs or a Raspberry Pi variant with a synthetic label.

pub mod list;

use std::fmt;

pub use list::{PlatformList, Platforms, PlatformsError, parse_line};

/// OS string identifying the Windows family.
pub const WINDOWS: &str = "windows";

/// An operating system / architecture pair the toolchain can cross-compile for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Platform {
  pub os: String,
  pub arch: String,
}

impl Platform {
  pub fn new(os: impl Into<String>, arch: impl Into<String>) -> Self {
    Self {
      os: os.into(),
      arch: arch.into(),
    }
  }

  /// Returns true for the Windows family (zip archives, `.exe` binaries).
  pub fn is_windows(&self) -> bool {
    self.os == WINDOWS
  }
}

impl fmt::Display for Platform {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}/{}", self.os, self.arch)
  }
}

/// Raspberry Pi build variants, each pinned to an ARM ABI revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PiVariant {
  /// Current Raspberry Pi OS, ARMv7.
  Modern,
  /// Raspbian Jessie and older boards, ARMv6.
  Jessie,
}

impl PiVariant {
  pub const ALL: [PiVariant; 2] = [PiVariant::Modern, PiVariant::Jessie];

  /// Suffix appended to the `raspberry-pi` label.
  pub fn suffix(&self) -> &'static str {
    match self {
      Self::Modern => "",
      Self::Jessie => "-jessie",
    }
  }

  /// ARM ABI revision passed to the toolchain.
  pub fn arm_revision(&self) -> &'static str {
    match self {
      Self::Modern => "7",
      Self::Jessie => "6",
    }
  }
}

/// The unit of work of one pipeline step.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BuildPlatform {
  Standard(Platform),
  RaspberryPi(PiVariant),
}

impl BuildPlatform {
  /// Label used in binary, staging directory and archive names,
  /// e.g. `linux-amd64` or `raspberry-pi-jessie`.
  pub fn label(&self) -> String {
    match self {
      Self::Standard(p) => format!("{}-{}", p.os, p.arch),
      Self::RaspberryPi(v) => format!("raspberry-pi{}", v.suffix()),
    }
  }

  pub fn target_os(&self) -> &str {
    match self {
      Self::Standard(p) => &p.os,
      Self::RaspberryPi(_) => "linux",
    }
  }

  pub fn target_arch(&self) -> &str {
    match self {
      Self::Standard(p) => &p.arch,
      Self::RaspberryPi(_) => "arm",
    }
  }

  /// ABI revision for the ARM family, if this platform pins one.
  pub fn arm_revision(&self) -> Option<&'static str> {
    match self {
      Self::Standard(_) => None,
      Self::RaspberryPi(v) => Some(v.arm_revision()),
    }
  }

  pub fn is_windows(&self) -> bool {
    self.target_os() == WINDOWS
  }

  /// Extension of the produced binary (`.exe` on Windows, empty otherwise).
  pub fn binary_suffix(&self) -> &'static str {
    if self.is_windows() { ".exe" } else { "" }
  }
}

impl fmt::Display for BuildPlatform {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Standard(p) => write!(f, "{}", p),
      Self::RaspberryPi(v) => write!(f, "{} (armv{})", self.label(), v.arm_revision()),
    }
  }
}
