//! Implementation of the `depends install` command.
//!
//! Downloads and builds every dependency whose install marker is missing.
//! A failing dependency does not stop the others; `--strict` turns any
//! failure into a non-zero exit status.

use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};

use depends_lib::execute::{InstallReport, Installer, StepStatus, SystemExecutor};
use depends_lib::layout::Layout;
use depends_lib::platform::Platform;
use depends_lib::recipe;

use super::ConfigArgs;
use crate::output::{
  OutputFormat, format_duration, print_error, print_info, print_json, print_stat, print_success, print_warning,
};

pub fn cmd_install(args: &ConfigArgs, strict: bool, output: OutputFormat) -> Result<ExitCode> {
  let config = args.load_config()?;
  let platform = Platform::current().context("Unsupported platform")?;
  let layout = Layout::new(&config, platform);
  let steps = recipe::plan(&config, platform);

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let executor = SystemExecutor::new().context("Failed to create executor")?;
  let mut installer = Installer::new(&executor, &config, &layout);
  let report = rt.block_on(installer.run(&steps));

  if output.is_json() {
    print_json(&report)?;
  } else {
    print_report(&report);
  }

  if strict && !report.is_success() {
    return Ok(ExitCode::FAILURE);
  }
  Ok(ExitCode::SUCCESS)
}

fn print_report(report: &InstallReport) {
  for step in &report.steps {
    let elapsed = format_duration(Duration::from_millis(step.elapsed_ms));
    match &step.status {
      StepStatus::AlreadyPresent => print_info(&format!("{} already configured", step.title)),
      StepStatus::Completed => print_success(&format!("{} ({})", step.title, elapsed)),
      StepStatus::MissingPrerequisite { path } => {
        print_warning(&format!("{} skipped: {} does not exist", step.title, path.display()))
      }
      StepStatus::Failed => {
        print_error(&format!("{} failed ({})", step.title, elapsed));
        for failure in &step.failures {
          print_stat(&failure.phase, &failure.message);
          print_stat("error", &failure.error);
        }
      }
    }
  }

  println!();
  print_stat("Completed", &report.count(&StepStatus::Completed).to_string());
  print_stat("Already present", &report.count(&StepStatus::AlreadyPresent).to_string());
  print_stat("Failed", &report.failed().count().to_string());
  print_stat("Logs", &report.root.join("logs").display().to_string());
}
