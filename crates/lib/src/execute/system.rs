use std::time::Duration;

use crate::action::{Action, CommandSpec};
use crate::consts::APP_NAME;

use super::actions::{capture_cmd, execute_action};
use super::{ExecuteError, Executor};

/// Connect timeout for upstream downloads. Transfers themselves are not limited.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Executor that touches the real network, filesystem and processes.
#[derive(Debug, Clone)]
pub struct SystemExecutor {
  client: reqwest::Client,
}

impl SystemExecutor {
  pub fn new() -> Result<Self, ExecuteError> {
    let client = reqwest::Client::builder()
      .user_agent(format!("{}/{}", APP_NAME, env!("CARGO_PKG_VERSION")))
      .connect_timeout(CONNECT_TIMEOUT)
      .build()
      .map_err(|e| ExecuteError::Client(e.to_string()))?;
    Ok(Self { client })
  }
}

impl Executor for SystemExecutor {
  async fn perform(&self, action: &Action) -> Result<(), ExecuteError> {
    execute_action(&self.client, action).await
  }

  async fn capture(&self, cmd: &CommandSpec) -> Result<String, ExecuteError> {
    capture_cmd(cmd).await
  }
}
