//! Implementation of the `depends plan` command.
//!
//! Prints the steps `install` would run for a platform and whether each
//! one is already present. Nothing is downloaded or built.

use anyhow::{Context, Result, bail};
use serde::Serialize;

use depends_lib::platform::Platform;
use depends_lib::platform::word::WordSize;
use depends_lib::recipe::{self, Step};

use super::{ConfigArgs, OsArg};
use crate::output::{OutputFormat, print_action, print_info, print_json, print_stat};

#[derive(Serialize)]
struct PlanEntry<'a> {
  #[serde(flatten)]
  step: &'a Step,
  present: bool,
}

#[derive(Serialize)]
struct PlanOutput<'a> {
  platform: Platform,
  root: String,
  steps: Vec<PlanEntry<'a>>,
}

pub fn cmd_plan(args: &ConfigArgs, os: Option<OsArg>, bits: Option<u32>, output: OutputFormat) -> Result<()> {
  let config = args.load_config()?;
  let platform = resolve_platform(os, bits)?;
  let steps = recipe::plan(&config, platform);

  let plan = PlanOutput {
    platform,
    root: config.root.display().to_string(),
    steps: steps
      .iter()
      .map(|step| PlanEntry {
        step,
        present: step.is_present(),
      })
      .collect(),
  };

  if output.is_json() {
    return print_json(&plan);
  }

  print_stat("Platform", &plan.platform.to_string());
  print_stat("Root", &plan.root);
  for entry in &plan.steps {
    println!();
    let state = if entry.present { "present" } else { "pending" };
    print_info(&format!("{} [{}] ({})", entry.step.title, entry.step.name, state));
    print_stat("marker", &entry.step.marker.display().to_string());
    if entry.present {
      continue;
    }
    for phase in &entry.step.phases {
      println!("  {}:", phase.label);
      for action in &phase.actions {
        print_action(&action.to_string());
      }
    }
  }

  Ok(())
}

/// The host platform, with `--os` and `--bits` overriding either half.
fn resolve_platform(os: Option<OsArg>, bits: Option<u32>) -> Result<Platform> {
  let host = Platform::current();

  let os = match os {
    Some(os) => os.into(),
    None => host.map(|p| p.os).context("Unsupported host OS, pass --os")?,
  };
  let word_size = match bits {
    Some(bits) => match WordSize::from_bits(bits) {
      Some(word_size) => word_size,
      None => bail!("Unsupported word size: {} (expected 32 or 64)", bits),
    },
    None => host.map(|p| p.word_size).context("Unsupported host word size, pass --bits")?,
  };

  Ok(Platform::new(os, word_size))
}

#[cfg(test)]
mod tests {
  use super::*;
  use depends_lib::platform::os::Os;

  #[test]
  fn overrides_apply_to_each_half() {
    let platform = resolve_platform(Some(OsArg::Windows), Some(32)).unwrap();
    assert_eq!(platform, Platform::new(Os::Windows, WordSize::Bits32));
  }

  #[test]
  fn rejects_unknown_word_size() {
    let err = resolve_platform(Some(OsArg::Linux), Some(16)).unwrap_err();
    assert!(err.to_string().contains("16"));
  }
}
