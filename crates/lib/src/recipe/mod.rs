//! Recipes: what to do for each dependency, as plain data.
//!
//! Every function here is pure. Given a [`Config`] and a [`Platform`] they
//! return [`Step`]s whose actions are performed later by the
//! [`Installer`](crate::execute::Installer). Nothing is read from or written to
//! the filesystem while planning.
//!
//! Steps, in the order [`plan`] returns them:
//!
//! 1. `xerces-download`
//! 2. `wxwidgets-download` (not on Windows, only when wxWidgets is enabled)
//! 3. `cspice-download`
//! 4. `xerces`
//! 5. `wxwidgets` (only when wxWidgets is enabled)
//! 6. `cspice`

pub mod cspice;
pub mod msvc;
pub mod wx;
pub mod xerces;

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::action::{Action, CommandSpec};
use crate::config::Config;
use crate::layout::Layout;
use crate::platform::Platform;

/// What happens to the rest of a step when one of its phases fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OnFailure {
  /// Skip the remaining phases of the step.
  Abort,
  /// Move on to the next phase anyway.
  Continue,
}

/// An ordered group of actions that succeeds or fails as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Phase {
  pub label: String,
  /// Progress line logged before the phase starts.
  pub announce: String,
  pub actions: Vec<Action>,
  pub on_failure: OnFailure,
  /// Logged and reported when an action of the phase fails.
  pub failure_message: String,
}

impl Phase {
  pub fn new(label: impl Into<String>, announce: impl Into<String>) -> Self {
    Self {
      label: label.into(),
      announce: announce.into(),
      actions: Vec::new(),
      on_failure: OnFailure::Abort,
      failure_message: String::new(),
    }
  }

  pub fn action(mut self, action: Action) -> Self {
    self.actions.push(action);
    self
  }

  pub fn run(self, cmd: CommandSpec) -> Self {
    self.action(Action::Run(cmd))
  }

  /// Abort the step with `message` if this phase fails.
  pub fn abort_with(mut self, message: impl Into<String>) -> Self {
    self.on_failure = OnFailure::Abort;
    self.failure_message = message.into();
    self
  }

  /// Report `message` and continue with the next phase if this phase fails.
  pub fn continue_with(mut self, message: impl Into<String>) -> Self {
    self.on_failure = OnFailure::Continue;
    self.failure_message = message.into();
    self
  }
}

/// One idempotent unit of work, gated by its install marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Step {
  pub name: String,
  pub title: String,
  /// The step is skipped when this path exists.
  pub marker: PathBuf,
  /// Paths that must exist before the step can run.
  pub requires: Vec<PathBuf>,
  /// Whether the commands need the Visual Studio environment.
  pub needs_msvc: bool,
  pub phases: Vec<Phase>,
}

impl Step {
  pub fn new(name: impl Into<String>, title: impl Into<String>, marker: impl Into<PathBuf>) -> Self {
    Self {
      name: name.into(),
      title: title.into(),
      marker: marker.into(),
      requires: Vec::new(),
      needs_msvc: false,
      phases: Vec::new(),
    }
  }

  pub fn requires(mut self, path: impl Into<PathBuf>) -> Self {
    self.requires.push(path.into());
    self
  }

  pub fn needs_msvc(mut self) -> Self {
    self.needs_msvc = true;
    self
  }

  pub fn phase(mut self, phase: Phase) -> Self {
    self.phases.push(phase);
    self
  }

  pub fn is_present(&self) -> bool {
    self.marker.exists()
  }

  /// The first required path that does not exist.
  pub fn missing_prerequisite(&self) -> Option<&Path> {
    self.requires.iter().map(PathBuf::as_path).find(|p| !p.exists())
  }

  pub fn actions(&self) -> impl Iterator<Item = &Action> {
    self.phases.iter().flat_map(|p| p.actions.iter())
  }
}

/// Every step for `platform`, in execution order.
pub fn plan(config: &Config, platform: Platform) -> Vec<Step> {
  let layout = Layout::new(config, platform);
  let windows = platform.os.is_windows();

  let mut steps = vec![xerces::download(config, &layout)];
  if config.build_wx && !windows {
    steps.push(wx::download(config, &layout));
  }
  steps.push(cspice::download(config, &layout));
  steps.push(xerces::build(config, &layout));
  if config.build_wx {
    steps.push(wx::build(config, &layout));
  }
  steps.push(cspice::build(config, &layout));
  steps
}

/// Fetch `url` to `dest`, verified when a checksum is configured for the
/// upstream file name.
fn fetch(config: &Config, url: String, dest: PathBuf) -> Action {
  let sha256 = url.rsplit('/').next().and_then(|name| config.checksum_for(name));
  Action::fetch(url, dest, sha256)
}

/// `make -jN` in `dir`, logged to `log`.
fn make(config: &Config, dir: &Path, log: PathBuf) -> CommandSpec {
  CommandSpec::new("make")
    .arg(format!("-j{}", config.make_jobs))
    .cwd(dir)
    .log(log)
}

fn make_install(dir: &Path, log: PathBuf) -> CommandSpec {
  CommandSpec::new("make").arg("install").cwd(dir).log(log)
}

/// Join compiler flags, dropping empty ones.
fn flags(parts: &[&str]) -> String {
  parts.iter().filter(|p| !p.is_empty()).copied().collect::<Vec<_>>().join(" ")
}
