//! Console and service logging for the campus chat workspace.
//!
//! Console output goes to stderr with a coloured level prefix, one prefixed
//! line per message line. The leveled macros accept `format!` arguments:
//!
//! ```
//! crier::info!("indexed {} events", 12);
//! crier::warn!("embedding endpoint slow");
//! ```
//!
//! Persistent JSONL logs for the HTTP service live in [`service_log`] behind the
//! `service-log` feature.

use colored::*;

#[cfg(feature = "service-log")]
pub mod service_log;

/// Log level understood by the console writer and the service log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
  Verbose,
  Debug,
  Info,
  Success,
  Warn,
  Error,
}

impl Level {
  /// Lowercase name used in JSONL entries and level filters
  pub fn as_str(&self) -> &'static str {
    match self {
      Level::Verbose => "verbose",
      Level::Debug => "debug",
      Level::Info => "info",
      Level::Success => "success",
      Level::Warn => "warn",
      Level::Error => "error",
    }
  }

  fn tag(&self) -> &'static str {
    match self {
      Level::Verbose => "verb",
      Level::Debug => "debug",
      Level::Info => "info",
      Level::Success => "sccs",
      Level::Warn => "warn",
      Level::Error => "error",
    }
  }

  fn color(&self) -> Color {
    match self {
      Level::Verbose => Color::Cyan,
      Level::Debug => Color::Magenta,
      Level::Info => Color::Blue,
      Level::Success => Color::Green,
      Level::Warn => Color::Yellow,
      Level::Error => Color::Red,
    }
  }
}

/// Write raw lines to stderr
pub fn log(message: &str) {
  for line in message.lines() {
    eprintln!("{line}");
  }
}

/// Build the padded `[level]` prefix shown before every console line
pub fn format_prefix(level: Level) -> String {
  let tag = level.tag();
  let pad = 7usize.saturating_sub(tag.len() + 2);
  format!("[{}]{:<pad$}", tag.color(level.color()).bold(), "")
}

/// Prefix every line of `message` and write it to stderr
pub fn emit(level: Level, message: &str) {
  let prefix = format_prefix(level);
  for line in message.lines() {
    log(&format!("{prefix} {line}"));
  }
}

pub fn verbose(message: &str) {
  emit(Level::Verbose, message);
}

/// Info level logging - general information
pub fn info(message: &str) {
  emit(Level::Info, message);
}

/// Warning level logging - something needs attention
pub fn warn(message: &str) {
  emit(Level::Warn, message);
}

/// Error level logging - something went wrong
pub fn error(message: &str) {
  emit(Level::Error, message);
}

pub fn debug(message: &str) {
  emit(Level::Debug, message);
}

/// Success level logging - something completed successfully
pub fn success(message: &str) {
  emit(Level::Success, message);
}

#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => {
    $crate::info(&format!($($arg)*)); // LCOV_EXCL_LINE
  };
}

#[macro_export]
macro_rules! warn {
  ($($arg:tt)*) => {
    $crate::warn(&format!($($arg)*)); // LCOV_EXCL_LINE
  };
}

#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => {
    $crate::error(&format!($($arg)*)); // LCOV_EXCL_LINE
  };
}

#[macro_export]
macro_rules! verbose {
  ($($arg:tt)*) => {
    $crate::verbose(&format!($($arg)*)); // LCOV_EXCL_LINE
  };
}

#[macro_export]
macro_rules! debug {
  ($($arg:tt)*) => {
    $crate::debug(&format!($($arg)*)); // LCOV_EXCL_LINE
  };
}

#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => {
    $crate::success(&format!($($arg)*)); // LCOV_EXCL_LINE
  };
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_level_names_match_service_log_levels() {
    assert_eq!(Level::Info.as_str(), "info");
    assert_eq!(Level::Success.as_str(), "success");
    assert_eq!(Level::Warn.as_str(), "warn");
    assert_eq!(Level::Error.as_str(), "error");
  }

  #[test]
  fn test_prefix_contains_tag() {
    colored::control::set_override(false);
    assert_eq!(format_prefix(Level::Info), "[info] ");
    assert_eq!(format_prefix(Level::Error), "[error]");
    colored::control::unset_override();
  }
}
