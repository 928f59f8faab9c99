mod build;
mod release;
mod targets;

pub use build::cmd_build;
pub use release::cmd_release;
pub use targets::cmd_targets;
