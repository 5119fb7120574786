//! Run action implementation.
//!
//! This module spawns native build tools described by a [`CommandSpec`],
//! routing their output to the terminal, a log file, or nowhere.

use std::fs::OpenOptions;
use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use crate::action::{CommandSpec, OutputTarget};
use crate::execute::types::ExecuteError;

/// Execute a Run action.
///
/// The command inherits the bootstrapper's environment plus the variables in
/// `cmd.env`, and runs in `cmd.cwd` when one is given.
///
/// A non-zero exit status is an error unless `cmd.allow_failure` is set.
pub async fn execute_cmd(cmd: &CommandSpec) -> Result<(), ExecuteError> {
  debug!(cmd = %cmd, "executing command");

  let mut command = build_command(cmd)?;
  match &cmd.output {
    OutputTarget::Inherit => {}
    OutputTarget::Discard => {
      command.stdout(Stdio::null()).stderr(Stdio::null());
    }
    OutputTarget::Log { path, append } => {
      let file = OpenOptions::new()
        .create(true)
        .write(true)
        .append(*append)
        .truncate(!*append)
        .open(path)
        .map_err(ExecuteError::fs("open log", path))?;
      let stderr = file.try_clone().map_err(ExecuteError::fs("open log", path))?;
      command.stdout(Stdio::from(file)).stderr(Stdio::from(stderr));
    }
  }

  let status = command.status().await.map_err(|source| ExecuteError::Spawn {
    program: cmd.program_name(),
    source,
  })?;

  if !status.success() {
    if cmd.allow_failure {
      debug!(cmd = %cmd.command_line(), code = ?status.code(), "ignoring command failure");
      return Ok(());
    }
    return Err(ExecuteError::CmdFailed {
      cmd: cmd.command_line(),
      code: status.code(),
    });
  }

  Ok(())
}

/// Run a command and return its stdout.
///
/// The output routing of `cmd` is ignored; stdout is always captured.
pub async fn capture_cmd(cmd: &CommandSpec) -> Result<String, ExecuteError> {
  debug!(cmd = %cmd.command_line(), "capturing command output");

  let output = build_command(cmd)?
    .stdout(Stdio::piped())
    .stderr(Stdio::piped())
    .output()
    .await
    .map_err(|source| ExecuteError::Spawn {
      program: cmd.program_name(),
      source,
    })?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.is_empty() {
      debug!(stderr = %stderr, "command stderr");
    }
    return Err(ExecuteError::CmdFailed {
      cmd: cmd.command_line(),
      code: output.status.code(),
    });
  }

  Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

fn build_command(cmd: &CommandSpec) -> Result<Command, ExecuteError> {
  let mut command = Command::new(&cmd.program);

  // cmd.exe does its own quote parsing, so its arguments go through untouched
  #[cfg(windows)]
  if cmd.is_cmd_shell() {
    for arg in &cmd.args {
      command.raw_arg(arg);
    }
  } else {
    command.args(&cmd.args);
  }
  #[cfg(not(windows))]
  command.args(&cmd.args);

  if let Some(cwd) = &cmd.cwd {
    if !cwd.is_dir() {
      return Err(ExecuteError::Fs {
        op: "enter directory",
        path: cwd.clone(),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, "directory does not exist"),
      });
    }
    command.current_dir(cwd);
  }

  command.envs(&cmd.env).stdin(Stdio::null());
  Ok(command)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::platform::os::Os;
  use crate::util::testutil::{host_os, shell_echo_env};
  use tempfile::TempDir;

  #[tokio::test]
  async fn execute_writes_log_file() {
    let temp_dir = TempDir::new().unwrap();
    let log = temp_dir.path().join("out.log");

    let cmd = CommandSpec::shell(host_os(), "echo hello").log(&log);
    execute_cmd(&cmd).await.unwrap();

    let content = std::fs::read_to_string(&log).unwrap();
    assert_eq!(content.trim(), "hello");
  }

  #[tokio::test]
  async fn append_log_keeps_previous_content() {
    let temp_dir = TempDir::new().unwrap();
    let log = temp_dir.path().join("out.log");

    execute_cmd(&CommandSpec::shell(host_os(), "echo first").log(&log))
      .await
      .unwrap();
    execute_cmd(&CommandSpec::shell(host_os(), "echo second").append_log(&log))
      .await
      .unwrap();

    let content = std::fs::read_to_string(&log).unwrap();
    let lines: Vec<_> = content.lines().map(str::trim).collect();
    assert_eq!(lines, vec!["first", "second"]);
  }

  #[tokio::test]
  async fn truncating_log_drops_previous_content() {
    let temp_dir = TempDir::new().unwrap();
    let log = temp_dir.path().join("out.log");
    std::fs::write(&log, "stale\n").unwrap();

    execute_cmd(&CommandSpec::shell(host_os(), "echo fresh").log(&log))
      .await
      .unwrap();

    assert_eq!(std::fs::read_to_string(&log).unwrap().trim(), "fresh");
  }

  #[tokio::test]
  async fn execute_command_failure() {
    let cmd = CommandSpec::shell(host_os(), "exit 3").discard_output();
    let result = execute_cmd(&cmd).await;
    assert!(matches!(result, Err(ExecuteError::CmdFailed { code: Some(3), .. })));
  }

  #[tokio::test]
  async fn allowed_failure_is_ok() {
    let cmd = CommandSpec::shell(host_os(), "exit 1").discard_output().allow_failure();
    execute_cmd(&cmd).await.unwrap();
  }

  #[tokio::test]
  async fn missing_program_is_spawn_error() {
    let cmd = CommandSpec::new("definitely-not-a-real-build-tool");
    let result = execute_cmd(&cmd).await;
    assert!(matches!(result, Err(ExecuteError::Spawn { .. })));
  }

  #[tokio::test]
  async fn missing_cwd_is_reported() {
    let temp_dir = TempDir::new().unwrap();
    let cmd = CommandSpec::shell(host_os(), "echo hi").cwd(temp_dir.path().join("gone"));
    let result = execute_cmd(&cmd).await;
    assert!(matches!(result, Err(ExecuteError::Fs { op: "enter directory", .. })));
  }

  #[tokio::test]
  async fn capture_sees_command_env() {
    let (shell, script) = shell_echo_env("TKCOMPILEARCH");
    let mut cmd = CommandSpec::new(shell).env("TKCOMPILEARCH", "-m64");
    cmd.args = script;

    let output = capture_cmd(&cmd).await.unwrap();
    assert_eq!(output.trim(), "-m64");
  }

  #[tokio::test]
  #[cfg(unix)]
  async fn execute_runs_in_cwd() {
    let temp_dir = TempDir::new().unwrap();
    let sub_dir = temp_dir.path().join("subdir");
    std::fs::create_dir(&sub_dir).unwrap();

    let cmd = CommandSpec::new("/usr/bin/touch").arg("cwd_marker").cwd(&sub_dir);
    execute_cmd(&cmd).await.unwrap();

    assert!(sub_dir.join("cwd_marker").exists());
  }

  #[test]
  fn host_os_matches_detection() {
    assert_eq!(Some(host_os()), Os::current());
  }
}
