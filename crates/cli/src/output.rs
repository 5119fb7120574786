//! Terminal rendering for `depends`.
//!
//! Step results go to stdout and failures to stderr, each behind a colored
//! status mark. Colors are dropped when the stream is not a terminal.

use std::time::Duration;

use anyhow::Context;
use clap::ValueEnum;
use owo_colors::{OwoColorize, Stream};

/// How a command prints its result.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
  #[default]
  Text,
  Json,
}

impl OutputFormat {
  pub fn is_json(self) -> bool {
    matches!(self, Self::Json)
  }
}

/// Leading mark of a status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
  Done,
  Failed,
  Skipped,
  Note,
  Action,
}

impl Mark {
  fn glyph(self) -> &'static str {
    match self {
      Self::Done => "✓",
      Self::Failed => "✗",
      Self::Skipped => "⚠",
      Self::Note => "•",
      Self::Action => "→",
    }
  }

  fn stream(self) -> Stream {
    match self {
      Self::Failed | Self::Skipped => Stream::Stderr,
      _ => Stream::Stdout,
    }
  }

  fn paint(self) -> String {
    let glyph = self.glyph();
    let stream = self.stream();
    match self {
      Self::Done => glyph.if_supports_color(stream, |g| g.green()).to_string(),
      Self::Failed => glyph.if_supports_color(stream, |g| g.red()).to_string(),
      Self::Skipped => glyph.if_supports_color(stream, |g| g.yellow()).to_string(),
      Self::Note => glyph.if_supports_color(stream, |g| g.blue()).to_string(),
      Self::Action => glyph.if_supports_color(stream, |g| g.dimmed()).to_string(),
    }
  }
}

fn emit(mark: Mark, indent: usize, text: &str) {
  let line = format!("{:indent$}{} {}", "", mark.paint(), text, indent = indent);
  match mark.stream() {
    Stream::Stderr => eprintln!("{}", line),
    _ => println!("{}", line),
  }
}

pub fn print_success(message: &str) {
  emit(Mark::Done, 0, message);
}

pub fn print_error(message: &str) {
  emit(Mark::Failed, 0, &message.if_supports_color(Stream::Stderr, |m| m.red()).to_string());
}

pub fn print_warning(message: &str) {
  emit(Mark::Skipped, 0, &message.if_supports_color(Stream::Stderr, |m| m.yellow()).to_string());
}

pub fn print_info(message: &str) {
  emit(Mark::Note, 0, message);
}

/// One planned action, nested under its phase.
pub fn print_action(line: &str) {
  emit(Mark::Action, 4, line);
}

/// An indented `label: value` line.
pub fn print_stat(label: &str, value: &str) {
  println!("  {}: {}", label.if_supports_color(Stream::Stdout, |l| l.dimmed()), value);
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("Failed to serialize to JSON")?;
  println!("{}", json);
  Ok(())
}

/// Compact elapsed time for step summaries: `840ms`, `3.25s`, `4m 12s`, `1h 5m`.
pub fn format_duration(elapsed: Duration) -> String {
  let secs = elapsed.as_secs();
  match secs {
    0 => format!("{}ms", elapsed.subsec_millis()),
    1..=59 => format!("{}.{:02}s", secs, elapsed.subsec_millis() / 10),
    60..=3599 => format!("{}m {}s", secs / 60, secs % 60),
    _ => format!("{}h {}m", secs / 3600, secs % 3600 / 60),
  }
}
