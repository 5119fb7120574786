//! Step execution module.
//!
//! This module provides the entry points for turning recipe steps into side
//! effects. It handles:
//! - Skipping steps whose install marker already exists
//! - Skipping builds whose sources are missing
//! - Capturing the MSVC environment once on Windows
//! - Per-phase failure policies and the final [`InstallReport`]
//!
//! All side effects go through an [`Executor`]. [`SystemExecutor`] is the real
//! one; tests substitute a recording implementation.

pub mod actions;
pub mod install;
pub mod system;
pub mod types;

use crate::action::{Action, CommandSpec};

pub use install::Installer;
pub use system::SystemExecutor;
pub use types::{ExecuteError, InstallReport, PhaseFailure, StepReport, StepStatus};

/// Performs actions on behalf of the [`Installer`].
#[allow(async_fn_in_trait)]
pub trait Executor {
  /// Perform one action, returning once it has finished.
  async fn perform(&self, action: &Action) -> Result<(), ExecuteError>;

  /// Run a command to completion and return its stdout.
  async fn capture(&self, cmd: &CommandSpec) -> Result<String, ExecuteError>;
}
