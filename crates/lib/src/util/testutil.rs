//! Test utilities for depends-lib.
//!
//! Cross-platform helpers for tests that run shell commands, plus an
//! [`Executor`] that records actions instead of performing them.

use std::cell::RefCell;
use std::collections::BTreeMap;

use crate::action::{Action, CommandSpec};
use crate::execute::{ExecuteError, Executor};
use crate::platform::os::Os;

/// The OS the tests run on.
pub fn host_os() -> Os {
  if cfg!(windows) {
    Os::Windows
  } else if cfg!(target_os = "macos") {
    Os::MacOs
  } else {
    Os::Linux
  }
}

/// Returns the shell command and args to echo an environment variable.
///
/// Since environment variable expansion requires a shell, this returns
/// the shell binary and appropriate arguments.
#[cfg(unix)]
pub fn shell_echo_env(var: &str) -> (&'static str, Vec<String>) {
  ("/bin/sh", vec!["-c".to_string(), format!("echo \"${}\"", var)])
}

#[cfg(windows)]
pub fn shell_echo_env(var: &str) -> (&'static str, Vec<String>) {
  ("cmd.exe", vec!["/C".to_string(), format!("echo %{}%", var)])
}

/// Records every action and fails the ones matching a configured substring.
#[derive(Default)]
pub struct RecordingExecutor {
  pub performed: RefCell<Vec<Action>>,
  pub captured: RefCell<Vec<CommandSpec>>,
  /// Actions whose rendering contains any of these fail with `CmdFailed`.
  pub fail_on: Vec<String>,
  /// Stdout returned from `capture`.
  pub capture_output: String,
}

impl RecordingExecutor {
  pub fn failing_on(patterns: &[&str]) -> Self {
    Self {
      fail_on: patterns.iter().map(|p| p.to_string()).collect(),
      ..Self::default()
    }
  }

  pub fn performed(&self) -> Vec<Action> {
    self.performed.borrow().clone()
  }

  pub fn rendered(&self) -> Vec<String> {
    self.performed.borrow().iter().map(ToString::to_string).collect()
  }

  /// Environments of every Run action performed.
  pub fn run_envs(&self) -> Vec<BTreeMap<String, String>> {
    self
      .performed
      .borrow()
      .iter()
      .filter_map(Action::command)
      .map(|cmd| cmd.env.clone())
      .collect()
  }
}

impl Executor for RecordingExecutor {
  async fn perform(&self, action: &Action) -> Result<(), ExecuteError> {
    self.performed.borrow_mut().push(action.clone());
    let rendered = action.to_string();
    if self.fail_on.iter().any(|p| rendered.contains(p.as_str())) {
      return Err(ExecuteError::CmdFailed {
        cmd: rendered,
        code: Some(2),
      });
    }
    Ok(())
  }

  async fn capture(&self, cmd: &CommandSpec) -> Result<String, ExecuteError> {
    self.captured.borrow_mut().push(cmd.clone());
    Ok(self.capture_output.clone())
  }
}
