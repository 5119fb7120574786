//! Action execution module.
//!
//! This module provides the dispatch logic for performing recipe actions.

pub mod cmd;
pub mod extract;
pub mod fetch;
pub mod fs;

use std::io;

use tracing::debug;

use crate::action::Action;
use crate::execute::types::ExecuteError;

pub use cmd::{capture_cmd, execute_cmd};
pub use extract::execute_extract;
pub use fetch::execute_fetch;

/// Perform a single action.
///
/// This dispatches to the appropriate handler based on the action type.
///
/// # Arguments
///
/// * `client` - HTTP client used by Fetch actions
/// * `action` - The action to perform
pub async fn execute_action(client: &reqwest::Client, action: &Action) -> Result<(), ExecuteError> {
  debug!(kind = action.kind(), action = %action, "performing action");

  match action {
    Action::CreateDir { path } => tokio::fs::create_dir_all(path)
      .await
      .map_err(ExecuteError::fs("create directory", path)),

    Action::Fetch { url, dest, sha256 } => execute_fetch(client, url, dest, sha256.as_deref()).await,

    Action::Extract { archive, dest, format } => execute_extract(archive, dest, *format).await,

    Action::Run(cmd) => execute_cmd(cmd).await,

    Action::Rename { from, to } => tokio::fs::rename(from, to)
      .await
      .map_err(ExecuteError::fs("rename", from)),

    Action::RemoveFile { path } => tokio::fs::remove_file(path)
      .await
      .map_err(ExecuteError::fs("remove", path)),

    // Like `rm -rf`, a directory that is already gone is fine
    Action::RemoveDir { path } => match tokio::fs::remove_dir_all(path).await {
      Err(e) if e.kind() != io::ErrorKind::NotFound => Err(ExecuteError::fs("remove directory", path)(e)),
      _ => Ok(()),
    },

    Action::RemoveMatching { dir, extension } => fs::remove_matching(dir, extension).await.map(|_| ()),

    Action::MakeExecutable { path } => fs::make_executable(path).await,

    Action::ReplaceInFile { path, from, to } => fs::replace_in_file(path, from, to).await,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::action::CommandSpec;
  use crate::util::testutil::host_os;
  use tempfile::TempDir;

  fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
  }

  #[tokio::test]
  async fn create_rename_and_remove() {
    let temp = TempDir::new().unwrap();
    let from = temp.path().join("xerces-c-3.1.4");
    let to = temp.path().join("xerces");

    execute_action(&client(), &Action::create_dir(from.join("src")))
      .await
      .unwrap();
    execute_action(&client(), &Action::rename(&from, &to)).await.unwrap();
    assert!(to.join("src").is_dir());
    assert!(!from.exists());

    execute_action(&client(), &Action::remove_dir(&to)).await.unwrap();
    assert!(!to.exists());
  }

  #[tokio::test]
  async fn remove_dir_of_missing_path_is_ok() {
    let temp = TempDir::new().unwrap();
    execute_action(&client(), &Action::remove_dir(temp.path().join("gone")))
      .await
      .unwrap();
  }

  #[tokio::test]
  async fn remove_missing_file_fails() {
    let temp = TempDir::new().unwrap();
    let result = execute_action(&client(), &Action::remove_file(temp.path().join("cspice.tar"))).await;
    assert!(matches!(result, Err(ExecuteError::Fs { op: "remove", .. })));
  }

  #[tokio::test]
  async fn run_dispatches_to_command() {
    let temp = TempDir::new().unwrap();
    let log = temp.path().join("run.log");
    let action = Action::Run(CommandSpec::shell(host_os(), "echo built").log(&log));

    execute_action(&client(), &action).await.unwrap();

    assert_eq!(std::fs::read_to_string(&log).unwrap().trim(), "built");
  }
}
