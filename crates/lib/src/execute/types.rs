//! Types for step execution.
//!
//! This module defines the error type raised by individual actions and the
//! report produced by running a list of steps.

use std::io;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::platform::Platform;

/// Errors that can occur while performing a single action.
#[derive(Debug, Error)]
pub enum ExecuteError {
  /// The HTTP client could not be constructed.
  #[error("failed to create HTTP client: {0}")]
  Client(String),

  /// HTTP request failed during a Fetch action.
  #[error("fetch failed for {url}: {message}")]
  FetchFailed { url: String, message: String },

  /// SHA256 hash mismatch after download.
  #[error("hash mismatch for {url}: expected {expected}, got {actual}")]
  HashMismatch {
    url: String,
    expected: String,
    actual: String,
  },

  /// An archive could not be unpacked.
  #[error("failed to extract {archive}: {message}")]
  Extract { archive: PathBuf, message: String },

  /// The command could not be started at all.
  #[error("failed to spawn {program}: {source}")]
  Spawn {
    program: String,
    #[source]
    source: io::Error,
  },

  /// Command exited with a non-zero status.
  #[error("command failed with exit code {code:?}: {cmd}")]
  CmdFailed { cmd: String, code: Option<i32> },

  /// A filesystem operation failed.
  #[error("{op} {path}: {source}")]
  Fs {
    op: &'static str,
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  /// A required environment variable is not set.
  #[error("environment variable {0} is not set")]
  MissingEnv(String),
}

impl ExecuteError {
  /// Build a closure mapping an `io::Error` to [`ExecuteError::Fs`] for `path`.
  pub fn fs(op: &'static str, path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
    let path = path.into();
    move |source| Self::Fs { op, path, source }
  }
}

/// Final state of one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepStatus {
  /// The install marker already existed; nothing was done.
  AlreadyPresent,
  /// A path the step builds from does not exist; nothing was done.
  MissingPrerequisite { path: PathBuf },
  /// Every phase succeeded.
  Completed,
  /// At least one phase failed.
  Failed,
}

/// A phase that stopped on a failing action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseFailure {
  pub phase: String,
  /// The user-facing message of the phase, e.g. "Xerces debug build failed. ..."
  pub message: String,
  /// The underlying action error.
  pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
  pub name: String,
  pub title: String,
  pub marker: PathBuf,
  #[serde(flatten)]
  pub status: StepStatus,
  pub failures: Vec<PhaseFailure>,
  /// Phases that ran to completion.
  pub phases_completed: Vec<String>,
  pub elapsed_ms: u64,
}

impl StepReport {
  pub fn is_failed(&self) -> bool {
    matches!(self.status, StepStatus::Failed)
  }
}

/// Result of running every step.
#[derive(Debug, Clone, Serialize)]
pub struct InstallReport {
  pub platform: Platform,
  pub root: PathBuf,
  pub steps: Vec<StepReport>,
}

impl InstallReport {
  pub fn new(platform: Platform, root: PathBuf) -> Self {
    Self {
      platform,
      root,
      steps: Vec::new(),
    }
  }

  /// Returns true if no step failed.
  pub fn is_success(&self) -> bool {
    !self.steps.iter().any(StepReport::is_failed)
  }

  pub fn failed(&self) -> impl Iterator<Item = &StepReport> {
    self.steps.iter().filter(|s| s.is_failed())
  }

  pub fn count(&self, status: &StepStatus) -> usize {
    self
      .steps
      .iter()
      .filter(|s| std::mem::discriminant(&s.status) == std::mem::discriminant(status))
      .count()
  }

  pub fn step(&self, name: &str) -> Option<&StepReport> {
    self.steps.iter().find(|s| s.name == name)
  }
}
