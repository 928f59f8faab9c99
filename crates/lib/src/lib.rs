//! xbuild-lib: Core types and logic for xbuild
//!
//! This crate provides the build and release pipeline used by the `xbuild` binary:
//! - `args`: tokenizer for flag strings with quoted spans
//! - `config`: project configuration and per-target resolution
//! - `platform`: platform list parsing and build platform labels
//! - `toolchain`: construction and execution of toolchain commands
//! - `package`: staging, archiving and checksum manifests
//! - `build`: the sequential build/package pipeline
//! - `release`: publishing archives through the hosting CLI
//! - `exec`: the command runner seam (real processes or a recording fake)

pub mod args;
pub mod build;
pub mod config;
pub mod consts;
pub mod exec;
pub mod package;
pub mod platform;
pub mod release;
pub mod toolchain;
pub mod util;
pub mod version;
