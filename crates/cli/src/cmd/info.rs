use anyhow::Result;
use serde::Serialize;

use depends_lib::config::{Config, Versions};
use depends_lib::consts::CONFIG_FILENAME;
use depends_lib::platform::Platform;

use super::ConfigArgs;
use crate::output::{OutputFormat, print_json, print_stat};

#[derive(Serialize)]
struct InfoOutput<'a> {
  platform: Option<Platform>,
  root: String,
  config_file: Option<String>,
  versions: &'a Versions,
  build_wx: bool,
  make_jobs: u32,
  vs_version: &'a str,
}

pub fn cmd_info(args: &ConfigArgs, output: OutputFormat) -> Result<()> {
  let config = args.load_config()?;
  let info = InfoOutput {
    platform: Platform::current(),
    root: config.root.display().to_string(),
    config_file: config_file(args, &config),
    versions: &config.versions,
    build_wx: config.build_wx,
    make_jobs: config.make_jobs,
    vs_version: &config.vs_version,
  };

  if output.is_json() {
    return print_json(&info);
  }

  println!("System:");
  match info.platform {
    Some(platform) => print_stat("Platform", &platform.to_string()),
    None => print_stat("Platform", "unsupported"),
  }
  print_stat("Root", &info.root);
  print_stat("Config", info.config_file.as_deref().unwrap_or("(defaults)"));
  println!();
  println!("Versions:");
  print_stat("Xerces-C", &info.versions.xerces);
  print_stat("wxWidgets", &info.versions.wx);
  print_stat("CSPICE", &info.versions.cspice);
  println!();
  println!("Build:");
  print_stat("wxWidgets", if info.build_wx { "enabled" } else { "disabled" });
  print_stat("Make jobs", &info.make_jobs.to_string());
  print_stat("Visual Studio", info.vs_version);

  Ok(())
}

/// The configuration file actually read, if any.
fn config_file(args: &ConfigArgs, config: &Config) -> Option<String> {
  let path = match &args.config {
    Some(path) => path.clone(),
    None => config.root.join(CONFIG_FILENAME),
  };
  path.exists().then(|| path.display().to_string())
}
