//! Best-effort installation of recipe steps.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;

use tracing::{debug, error, info, warn};

use crate::action::Action;
use crate::config::Config;
use crate::layout::Layout;
use crate::recipe::{OnFailure, Phase, Step, msvc};

use super::types::{ExecuteError, InstallReport, PhaseFailure, StepReport, StepStatus};
use super::Executor;

/// Runs steps in order through an [`Executor`].
///
/// A failing step is recorded and logged; the following steps are still
/// attempted. The logs directory and, on Windows, the Visual Studio
/// environment are set up lazily before the first step that does any work.
pub struct Installer<'a, E> {
  executor: &'a E,
  config: &'a Config,
  layout: &'a Layout,
  logs_ready: bool,
  msvc_env: Option<BTreeMap<String, String>>,
}

impl<'a, E: Executor> Installer<'a, E> {
  pub fn new(executor: &'a E, config: &'a Config, layout: &'a Layout) -> Self {
    Self {
      executor,
      config,
      layout,
      logs_ready: false,
      msvc_env: None,
    }
  }

  pub async fn run(&mut self, steps: &[Step]) -> InstallReport {
    let mut report = InstallReport::new(self.layout.platform(), self.layout.root().to_path_buf());

    info!(
      platform = %self.layout.platform(),
      root = %self.layout.root().display(),
      steps = steps.len(),
      "installing dependencies"
    );

    for step in steps {
      let step_report = self.run_step(step).await;
      report.steps.push(step_report);
    }

    info!(
      completed = report.count(&StepStatus::Completed),
      present = report.count(&StepStatus::AlreadyPresent),
      failed = report.failed().count(),
      "install finished"
    );

    report
  }

  async fn run_step(&mut self, step: &Step) -> StepReport {
    let started = Instant::now();
    let mut report = StepReport {
      name: step.name.clone(),
      title: step.title.clone(),
      marker: step.marker.clone(),
      status: StepStatus::AlreadyPresent,
      failures: Vec::new(),
      phases_completed: Vec::new(),
      elapsed_ms: 0,
    };

    if step.is_present() {
      info!(step = %step.name, "{} already configured", step.title);
      return report;
    }

    if let Some(path) = step.missing_prerequisite() {
      warn!(step = %step.name, path = %path.display(), "{} skipped, required path is missing", step.title);
      report.status = StepStatus::MissingPrerequisite {
        path: path.to_path_buf(),
      };
      return report;
    }

    match self.prepare(step).await {
      Ok(env) => {
        for phase in &step.phases {
          info!("{}", phase.announce);

          match self.run_phase(phase, env.as_ref()).await {
            Ok(()) => report.phases_completed.push(phase.label.clone()),
            Err(e) => {
              error!(step = %step.name, phase = %phase.label, error = %e, "{}", phase.failure_message);
              report.failures.push(PhaseFailure {
                phase: phase.label.clone(),
                message: phase.failure_message.clone(),
                error: e.to_string(),
              });
              if phase.on_failure == OnFailure::Abort {
                break;
              }
            }
          }
        }
      }
      Err(e) => {
        let message = format!("{} could not be started.", step.title);
        error!(step = %step.name, error = %e, "{}", message);
        report.failures.push(PhaseFailure {
          phase: "prepare".to_string(),
          message,
          error: e.to_string(),
        });
      }
    }

    report.status = if report.failures.is_empty() {
      StepStatus::Completed
    } else {
      StepStatus::Failed
    };
    report.elapsed_ms = started.elapsed().as_millis() as u64;
    report
  }

  /// Create the logs directory and load the toolchain environment the step needs.
  async fn prepare(&mut self, step: &Step) -> Result<Option<BTreeMap<String, String>>, ExecuteError> {
    if !self.logs_ready {
      self
        .executor
        .perform(&Action::create_dir(self.layout.logs_dir()))
        .await?;
      self.logs_ready = true;
    }

    if !step.needs_msvc || !self.layout.platform().os.is_windows() {
      return Ok(None);
    }

    if self.msvc_env.is_none() {
      self.msvc_env = Some(self.capture_msvc_env().await?);
    }
    Ok(self.msvc_env.clone())
  }

  async fn capture_msvc_env(&self) -> Result<BTreeMap<String, String>, ExecuteError> {
    let var = msvc::tools_env_var(&self.config.vs_version);
    let tools = std::env::var_os(&var).ok_or_else(|| ExecuteError::MissingEnv(var.clone()))?;

    info!("Loading Visual Studio {} environment", self.config.vs_version);
    let cmd = msvc::environment_command(Path::new(&tools), self.layout.platform());
    let output = self.executor.capture(&cmd).await?;

    let env = msvc::parse_environment(&output);
    debug!(vars = env.len(), "captured toolchain environment");
    Ok(env)
  }

  /// Perform the actions of a phase, stopping at the first failure.
  async fn run_phase(&self, phase: &Phase, env: Option<&BTreeMap<String, String>>) -> Result<(), ExecuteError> {
    for action in &phase.actions {
      match (action, env) {
        (Action::Run(cmd), Some(env)) => {
          self
            .executor
            .perform(&Action::Run(cmd.clone().with_base_env(env)))
            .await?
        }
        _ => self.executor.perform(action).await?,
      }
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::action::CommandSpec;
  use crate::platform::Platform;
  use crate::platform::os::Os;
  use crate::platform::word::WordSize;
  use crate::util::testutil::RecordingExecutor;
  use serial_test::serial;
  use tempfile::TempDir;
  use tracing_test::traced_test;

  fn setup(os: Os) -> (TempDir, Config, Layout) {
    let temp = TempDir::new().unwrap();
    let config = Config {
      root: temp.path().to_path_buf(),
      ..Config::default()
    };
    let layout = Layout::new(&config, Platform::new(os, WordSize::Bits64));
    (temp, config, layout)
  }

  fn run_cmd(name: &str) -> CommandSpec {
    CommandSpec::new(name)
  }

  fn step(name: &str, marker: &Path) -> Step {
    Step::new(name, name.to_uppercase(), marker)
  }

  #[tokio::test]
  #[traced_test]
  async fn present_markers_skip_everything() {
    let (temp, config, layout) = setup(Os::Linux);
    let marker = temp.path().join("xerces");
    std::fs::create_dir(&marker).unwrap();

    let executor = RecordingExecutor::default();
    let steps = vec![step("xerces", &marker).phase(Phase::new("build", "Building").run(run_cmd("make")))];
    let report = Installer::new(&executor, &config, &layout).run(&steps).await;

    assert!(executor.performed().is_empty());
    assert_eq!(report.steps[0].status, StepStatus::AlreadyPresent);
    assert!(logs_contain("XERCES already configured"));
  }

  #[tokio::test]
  async fn missing_prerequisite_performs_nothing() {
    let (temp, config, layout) = setup(Os::Linux);
    let source = temp.path().join("wxWidgets").join("wxWidgets-3.0.4");

    let executor = RecordingExecutor::default();
    let steps = vec![
      step("wxwidgets", &temp.path().join("marker"))
        .requires(&source)
        .phase(Phase::new("build", "Building").run(run_cmd("make"))),
    ];
    let report = Installer::new(&executor, &config, &layout).run(&steps).await;

    assert!(executor.performed().is_empty());
    assert_eq!(report.steps[0].status, StepStatus::MissingPrerequisite { path: source });
    assert!(report.is_success());
  }

  #[tokio::test]
  async fn logs_dir_is_created_once_before_work() {
    let (temp, config, layout) = setup(Os::Linux);

    let executor = RecordingExecutor::default();
    let steps = vec![
      step("a", &temp.path().join("a")).phase(Phase::new("build", "A").run(run_cmd("make"))),
      step("b", &temp.path().join("b")).phase(Phase::new("build", "B").run(run_cmd("make"))),
    ];
    Installer::new(&executor, &config, &layout).run(&steps).await;

    let performed = executor.performed();
    assert_eq!(performed[0], Action::create_dir(layout.logs_dir()));
    assert_eq!(
      performed
        .iter()
        .filter(|a| matches!(a, Action::CreateDir { .. }))
        .count(),
      1
    );
    assert_eq!(performed.len(), 3);
  }

  #[tokio::test]
  async fn abort_skips_remaining_phases() {
    let (temp, config, layout) = setup(Os::Linux);

    let executor = RecordingExecutor::failing_on(&["debug-make"]);
    let steps = vec![
      step("xerces", &temp.path().join("xerces"))
        .phase(
          Phase::new("debug", "Debug")
            .run(run_cmd("debug-make"))
            .run(run_cmd("debug-install"))
            .abort_with("Xerces debug build failed. Fix errors and try again."),
        )
        .phase(Phase::new("release", "Release").run(run_cmd("release-make"))),
    ];
    let report = Installer::new(&executor, &config, &layout).run(&steps).await;

    let rendered = executor.rendered();
    assert!(rendered.iter().any(|r| r == "debug-make"));
    assert!(!rendered.iter().any(|r| r == "debug-install" || r == "release-make"));

    let xerces = report.step("xerces").unwrap();
    assert!(xerces.is_failed());
    assert_eq!(xerces.failures.len(), 1);
    assert_eq!(
      xerces.failures[0].message,
      "Xerces debug build failed. Fix errors and try again."
    );
    assert!(xerces.phases_completed.is_empty());
  }

  #[tokio::test]
  async fn continue_runs_next_phase() {
    let (temp, config, layout) = setup(Os::Linux);

    let executor = RecordingExecutor::failing_on(&["debug-mkprodct"]);
    let steps = vec![
      step("cspice", &temp.path().join("cspiced.a"))
        .phase(
          Phase::new("debug", "Debug")
            .run(run_cmd("debug-mkprodct"))
            .continue_with("CSPICE debug build failed. Fix errors and try again."),
        )
        .phase(Phase::new("release", "Release").run(run_cmd("release-mkprodct"))),
    ];
    let report = Installer::new(&executor, &config, &layout).run(&steps).await;

    assert!(executor.rendered().iter().any(|r| r == "release-mkprodct"));
    let cspice = report.step("cspice").unwrap();
    assert!(cspice.is_failed());
    assert_eq!(cspice.phases_completed, vec!["release"]);
  }

  #[tokio::test]
  async fn later_steps_run_after_failure() {
    let (temp, config, layout) = setup(Os::Linux);

    let executor = RecordingExecutor::failing_on(&["xerces-make"]);
    let steps = vec![
      step("xerces", &temp.path().join("xerces")).phase(Phase::new("build", "X").run(run_cmd("xerces-make"))),
      step("cspice", &temp.path().join("cspice")).phase(Phase::new("build", "C").run(run_cmd("cspice-make"))),
    ];
    let report = Installer::new(&executor, &config, &layout).run(&steps).await;

    assert!(report.step("xerces").unwrap().is_failed());
    assert_eq!(report.step("cspice").unwrap().status, StepStatus::Completed);
    assert!(!report.is_success());
    assert_eq!(report.failed().count(), 1);
  }

  #[test]
  #[serial]
  fn windows_toolchain_env_is_attached_to_commands() {
    let (temp, config, layout) = setup(Os::Windows);
    let executor = RecordingExecutor {
      capture_output: "PATH=C:\\VC\\bin\r\nINCLUDE=C:\\VC\\include\r\n".to_string(),
      ..RecordingExecutor::default()
    };
    let steps = vec![
      step("cspice", &temp.path().join("cspiced.lib"))
        .needs_msvc()
        .phase(Phase::new("debug", "Debug").run(run_cmd("cl").env("INCLUDE", "override"))),
      step("xerces", &temp.path().join("Win64"))
        .needs_msvc()
        .phase(Phase::new("debug", "Debug").run(run_cmd("msbuild"))),
    ];

    let report = temp_env::with_var("VS120COMNTOOLS", Some("C:\\VS12\\Common7\\Tools"), || {
      tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
        .block_on(Installer::new(&executor, &config, &layout).run(&steps))
    });

    assert!(report.is_success());
    assert_eq!(executor.captured.borrow().len(), 1);
    let script = executor.captured.borrow()[0].args.last().unwrap().clone();
    assert!(script.contains("vcvarsall.bat\" x86_amd64 & set"));

    let envs = executor.run_envs();
    assert_eq!(envs.len(), 2);
    assert_eq!(envs[0]["PATH"], "C:\\VC\\bin");
    assert_eq!(envs[0]["INCLUDE"], "override");
    assert_eq!(envs[1]["INCLUDE"], "C:\\VC\\include");
  }

  #[test]
  #[serial]
  fn missing_toolchain_fails_step_without_running_it() {
    let (temp, config, layout) = setup(Os::Windows);
    let executor = RecordingExecutor::default();
    let steps = vec![
      step("cspice", &temp.path().join("cspiced.lib"))
        .needs_msvc()
        .phase(Phase::new("debug", "Debug").run(run_cmd("cl"))),
    ];

    let report = temp_env::with_var_unset("VS120COMNTOOLS", || {
      tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
        .block_on(Installer::new(&executor, &config, &layout).run(&steps))
    });

    let cspice = report.step("cspice").unwrap();
    assert!(cspice.is_failed());
    assert_eq!(cspice.failures[0].phase, "prepare");
    assert!(cspice.failures[0].error.contains("VS120COMNTOOLS"));
    assert!(executor.run_envs().is_empty());
  }

  #[tokio::test]
  async fn non_windows_never_captures_toolchain() {
    let (temp, config, layout) = setup(Os::Linux);
    let executor = RecordingExecutor::default();
    let steps = vec![
      step("cspice", &temp.path().join("cspiced.a"))
        .needs_msvc()
        .phase(Phase::new("debug", "Debug").run(run_cmd("csh"))),
    ];

    Installer::new(&executor, &config, &layout).run(&steps).await;

    assert!(executor.captured.borrow().is_empty());
    assert!(executor.run_envs()[0].is_empty());
  }
}
