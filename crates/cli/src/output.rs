//! Terminal output for the xbuild CLI.
//!
//! Status lines go to stdout except errors, which go to stderr. Colour is only
//! applied when the stream supports it.

use std::fmt::Display;
use std::time::Duration;

use owo_colors::{OwoColorize, Stream};

/// Leading hex digits of a SHA-256 shown in the build summary.
pub const SHORT_HASH_LEN: usize = 12;

const SIZE_UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

pub mod symbols {
  pub const SUCCESS: &str = "✓";
  pub const ERROR: &str = "✗";
  pub const INFO: &str = "•";
  pub const ARROW: &str = "→";
}

pub fn truncate_hash(hash: &str) -> &str {
  hash.get(..SHORT_HASH_LEN).unwrap_or(hash)
}

/// Binary-prefixed size, one decimal above bytes.
pub fn format_bytes(bytes: u64) -> String {
  let mut value = bytes as f64;
  let mut unit = 0;
  while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
    value /= 1024.0;
    unit += 1;
  }
  if unit == 0 {
    format!("{bytes} {}", SIZE_UNITS[0])
  } else {
    format!("{value:.1} {}", SIZE_UNITS[unit])
  }
}

pub fn format_duration(duration: Duration) -> String {
  let secs = duration.as_secs();
  match secs {
    0 => format!("{}ms", duration.subsec_millis()),
    1..60 => format!("{:.2}s", duration.as_secs_f64()),
    _ => format!("{}m {}s", secs / 60, secs % 60),
  }
}

/// One summary row for a packaged archive: size and shortened checksum.
pub fn archive_stat(size: Option<u64>, hash: &str) -> String {
  let size = size.map(format_bytes).unwrap_or_else(|| "-".to_string());
  format!("{size} ({})", truncate_hash(hash))
}

/// Join an error with each of its causes.
pub fn render_error(err: &anyhow::Error) -> String {
  err.chain().map(ToString::to_string).collect::<Vec<_>>().join(": ")
}

fn status_line(symbol: impl Display, message: impl Display) {
  println!("{symbol} {message}");
}

pub fn print_success(message: &str) {
  status_line(symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()), message);
}

pub fn print_info(message: &str) {
  status_line(symbols::INFO.if_supports_color(Stream::Stdout, |s| s.blue()), message);
}

pub fn print_error(message: &str) {
  eprintln!(
    "{} {}",
    symbols::ERROR.if_supports_color(Stream::Stderr, |s| s.red()),
    message.if_supports_color(Stream::Stderr, |s| s.red())
  );
}

pub fn print_stat(label: &str, value: &str) {
  println!("  {}: {value}", label.if_supports_color(Stream::Stdout, |s| s.dimmed()));
}
