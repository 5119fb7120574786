mod cmd;
mod output;

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cmd::{ConfigArgs, OsArg, cmd_info, cmd_install, cmd_plan};
use output::OutputFormat;

/// depends - download and build the third-party libraries the application links against
#[derive(Parser)]
#[command(name = "depends")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Download and build every dependency that is not present yet (the default)
  Install {
    #[command(flatten)]
    config: ConfigArgs,

    /// Exit with a failure status when any dependency failed
    #[arg(long)]
    strict: bool,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "text")]
    output: OutputFormat,
  },

  /// Show the steps install would run, without running them
  Plan {
    #[command(flatten)]
    config: ConfigArgs,

    /// Plan for this OS instead of the host's
    #[arg(long, value_enum)]
    os: Option<OsArg>,

    /// Plan for this word size (32 or 64) instead of the host's
    #[arg(long)]
    bits: Option<u32>,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "text")]
    output: OutputFormat,
  },

  /// Show the detected platform, dependencies root and versions
  Info {
    #[command(flatten)]
    config: ConfigArgs,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "text")]
    output: OutputFormat,
  },
}

fn main() -> Result<ExitCode> {
  let cli = Cli::parse();

  // -v wins over RUST_LOG
  let filter = if cli.verbose {
    EnvFilter::new("debug")
  } else {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
  };

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_target(false)
    .without_time()
    .init();

  let command = cli.command.unwrap_or(Commands::Install {
    config: ConfigArgs::default(),
    strict: false,
    output: OutputFormat::Text,
  });

  match command {
    Commands::Install { config, strict, output } => cmd_install(&config, strict, output),
    Commands::Plan {
      config,
      os,
      bits,
      output,
    } => cmd_plan(&config, os, bits, output).map(|_| ExitCode::SUCCESS),
    Commands::Info { config, output } => cmd_info(&config, output).map(|_| ExitCode::SUCCESS),
  }
}
