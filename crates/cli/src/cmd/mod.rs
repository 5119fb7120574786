mod info;
mod install;
mod plan;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};

use depends_lib::config::Config;
use depends_lib::platform::os::Os;

pub use info::cmd_info;
pub use install::cmd_install;
pub use plan::cmd_plan;

/// Options shared by every command that reads the configuration.
#[derive(Debug, Default, Args)]
pub struct ConfigArgs {
  /// Dependencies root (defaults to $DEPENDS_ROOT, then ./depends)
  #[arg(long)]
  pub root: Option<PathBuf>,

  /// Configuration file (defaults to <root>/depends.toml when present)
  #[arg(short, long)]
  pub config: Option<PathBuf>,

  /// Skip downloading and building wxWidgets
  #[arg(long)]
  pub no_wx: bool,

  /// Parallel jobs passed to make
  #[arg(short, long)]
  pub jobs: Option<u32>,
}

impl ConfigArgs {
  pub fn load_config(&self) -> Result<Config> {
    let root = Config::resolve_root(self.root.as_deref()).context("Failed to resolve dependencies root")?;
    let mut config = Config::load(root, self.config.as_deref()).context("Failed to load configuration")?;

    if self.no_wx {
      config.build_wx = false;
    }
    if let Some(jobs) = self.jobs {
      config.make_jobs = jobs.max(1);
    }
    Ok(config)
  }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OsArg {
  Linux,
  Macos,
  Windows,
}

impl From<OsArg> for Os {
  fn from(os: OsArg) -> Self {
    match os {
      OsArg::Linux => Os::Linux,
      OsArg::Macos => Os::MacOs,
      OsArg::Windows => Os::Windows,
    }
  }
}
