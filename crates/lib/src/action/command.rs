use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::quote;
use crate::platform::os::Os;

/// Where a command's stdout and stderr go.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutputTarget {
  /// Inherit the bootstrapper's stdout/stderr.
  #[default]
  Inherit,
  /// Drop all output.
  Discard,
  /// Write both streams to a log file.
  Log { path: PathBuf, append: bool },
}

/// An external command with its working directory, environment and output routing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandSpec {
  pub program: PathBuf,
  pub args: Vec<String>,
  pub cwd: Option<PathBuf>,
  /// Variables added to the inherited environment.
  pub env: BTreeMap<String, String>,
  pub output: OutputTarget,
  /// Treat a non-zero exit status as success.
  pub allow_failure: bool,
}

impl CommandSpec {
  pub fn new(program: impl Into<PathBuf>) -> Self {
    Self {
      program: program.into(),
      args: Vec::new(),
      cwd: None,
      env: BTreeMap::new(),
      output: OutputTarget::Inherit,
      allow_failure: false,
    }
  }

  /// Run `script` through the default shell of `os`.
  ///
  /// `/bin/sh -c` on Unix, `cmd.exe /S /C "<script>"` on Windows. Used where
  /// the tool relies on the shell for wildcard expansion or `&` chaining.
  pub fn shell(os: Os, script: impl Into<String>) -> Self {
    match os {
      Os::Windows => Self::new("cmd.exe")
        .arg("/S")
        .arg("/C")
        .arg(format!("\"{}\"", script.into())),
      _ => Self::new("/bin/sh").arg("-c").arg(script),
    }
  }

  /// Whether the program is `cmd.exe`, whose arguments must reach it verbatim.
  pub fn is_cmd_shell(&self) -> bool {
    self.program_name().eq_ignore_ascii_case("cmd.exe")
  }

  pub fn arg(mut self, arg: impl Into<String>) -> Self {
    self.args.push(arg.into());
    self
  }

  pub fn args<I, S>(mut self, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.args.extend(args.into_iter().map(Into::into));
    self
  }

  pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
    self.cwd = Some(cwd.into());
    self
  }

  pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
    self.env.insert(key.into(), value.into());
    self
  }

  /// Send stdout and stderr to `path`, truncating it first.
  pub fn log(mut self, path: impl Into<PathBuf>) -> Self {
    self.output = OutputTarget::Log {
      path: path.into(),
      append: false,
    };
    self
  }

  /// Send stdout and stderr to `path`, appending to existing content.
  pub fn append_log(mut self, path: impl Into<PathBuf>) -> Self {
    self.output = OutputTarget::Log {
      path: path.into(),
      append: true,
    };
    self
  }

  pub fn discard_output(mut self) -> Self {
    self.output = OutputTarget::Discard;
    self
  }

  pub fn allow_failure(mut self) -> Self {
    self.allow_failure = true;
    self
  }

  /// Fill in variables from `base` that the command does not set itself.
  pub fn with_base_env(mut self, base: &BTreeMap<String, String>) -> Self {
    for (key, value) in base {
      self.env.entry(key.clone()).or_insert_with(|| value.clone());
    }
    self
  }

  pub fn program_name(&self) -> String {
    self
      .program
      .file_name()
      .map(|n| n.to_string_lossy().into_owned())
      .unwrap_or_else(|| self.program.to_string_lossy().into_owned())
  }

  /// The command line without cwd, env or redirections.
  pub fn command_line(&self) -> String {
    let mut parts = vec![quote(&self.program.to_string_lossy()).into_owned()];
    parts.extend(self.args.iter().map(|a| quote(a).into_owned()));
    parts.join(" ")
  }
}

fn display_path(path: &Path) -> String {
  quote(&path.to_string_lossy()).into_owned()
}

impl fmt::Display for CommandSpec {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if let Some(cwd) = &self.cwd {
      write!(f, "cd {} && ", display_path(cwd))?;
    }
    for (key, value) in &self.env {
      write!(f, "{}={} ", key, quote(value))?;
    }
    write!(f, "{}", self.command_line())?;
    match &self.output {
      OutputTarget::Inherit => {}
      OutputTarget::Discard => write!(f, " >/dev/null 2>&1")?,
      OutputTarget::Log { path, append: false } => write!(f, " > {} 2>&1", display_path(path))?,
      OutputTarget::Log { path, append: true } => write!(f, " >> {} 2>&1", display_path(path))?,
    }
    if self.allow_failure {
      write!(f, " || true")?;
    }
    Ok(())
  }
}
