use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::command::CommandSpec;
use super::quote;

/// A single unit of work performed while installing a dependency.
///
/// Actions are produced by the recipes as plain data and handed to an
/// [`Executor`](crate::execute::Executor). Filesystem actions go through the
/// executor as well, so a recording executor sees every side effect.
///
/// # Variants
///
/// - [`Fetch`](Action::Fetch): Download a URL to a file, optionally verifying SHA-256
/// - [`Extract`](Action::Extract): Unpack an archive in-process
/// - [`Run`](Action::Run): Invoke an external tool (make, configure, msbuild, ...)
/// - The remaining variants are small filesystem operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
  /// Create a directory and its parents.
  CreateDir { path: PathBuf },
  /// Download `url` to `dest`.
  Fetch {
    url: String,
    dest: PathBuf,
    sha256: Option<String>,
  },
  /// Unpack `archive` into `dest`.
  Extract {
    archive: PathBuf,
    dest: PathBuf,
    format: ArchiveFormat,
  },
  /// Run an external command.
  Run(CommandSpec),
  Rename { from: PathBuf, to: PathBuf },
  RemoveFile { path: PathBuf },
  RemoveDir { path: PathBuf },
  /// Remove every file directly inside `dir` with the given extension.
  RemoveMatching { dir: PathBuf, extension: String },
  /// Add the user-executable bit to a file, or to every file directly inside a directory.
  MakeExecutable { path: PathBuf },
  /// Replace every occurrence of `from` with `to`, keeping a `.bk` copy of the original.
  ReplaceInFile { path: PathBuf, from: String, to: String },
}

impl Action {
  pub fn create_dir(path: impl Into<PathBuf>) -> Self {
    Self::CreateDir { path: path.into() }
  }

  pub fn fetch(url: impl Into<String>, dest: impl Into<PathBuf>, sha256: Option<String>) -> Self {
    Self::Fetch {
      url: url.into(),
      dest: dest.into(),
      sha256,
    }
  }

  pub fn extract(archive: impl Into<PathBuf>, dest: impl Into<PathBuf>, format: ArchiveFormat) -> Self {
    Self::Extract {
      archive: archive.into(),
      dest: dest.into(),
      format,
    }
  }

  pub fn rename(from: impl Into<PathBuf>, to: impl Into<PathBuf>) -> Self {
    Self::Rename {
      from: from.into(),
      to: to.into(),
    }
  }

  pub fn remove_file(path: impl Into<PathBuf>) -> Self {
    Self::RemoveFile { path: path.into() }
  }

  pub fn remove_dir(path: impl Into<PathBuf>) -> Self {
    Self::RemoveDir { path: path.into() }
  }

  pub fn remove_matching(dir: impl Into<PathBuf>, extension: &str) -> Self {
    Self::RemoveMatching {
      dir: dir.into(),
      extension: extension.to_string(),
    }
  }

  pub fn make_executable(path: impl Into<PathBuf>) -> Self {
    Self::MakeExecutable { path: path.into() }
  }

  pub fn replace_in_file(path: impl Into<PathBuf>, from: impl Into<String>, to: impl Into<String>) -> Self {
    Self::ReplaceInFile {
      path: path.into(),
      from: from.into(),
      to: to.into(),
    }
  }

  /// The command, when this is a [`Run`](Action::Run) action.
  pub fn command(&self) -> Option<&CommandSpec> {
    match self {
      Self::Run(cmd) => Some(cmd),
      _ => None,
    }
  }

  /// Short lowercase name of the variant, used in logs and reports.
  pub fn kind(&self) -> &'static str {
    match self {
      Self::CreateDir { .. } => "create_dir",
      Self::Fetch { .. } => "fetch",
      Self::Extract { .. } => "extract",
      Self::Run(_) => "run",
      Self::Rename { .. } => "rename",
      Self::RemoveFile { .. } => "remove_file",
      Self::RemoveDir { .. } => "remove_dir",
      Self::RemoveMatching { .. } => "remove_matching",
      Self::MakeExecutable { .. } => "make_executable",
      Self::ReplaceInFile { .. } => "replace_in_file",
    }
  }
}

fn path(p: &Path) -> String {
  quote(&p.to_string_lossy()).into_owned()
}

impl fmt::Display for Action {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::CreateDir { path: p } => write!(f, "mkdir -p {}", path(p)),
      Self::Fetch { url, dest, sha256 } => {
        write!(f, "fetch {} -> {}", url, path(dest))?;
        if let Some(hash) = sha256 {
          write!(f, " (sha256 {})", hash)?;
        }
        Ok(())
      }
      Self::Extract { archive, dest, format } => {
        write!(f, "extract {} {} -> {}", format, path(archive), path(dest))
      }
      Self::Run(cmd) => write!(f, "{}", cmd),
      Self::Rename { from, to } => write!(f, "mv {} {}", path(from), path(to)),
      Self::RemoveFile { path: p } => write!(f, "rm {}", path(p)),
      Self::RemoveDir { path: p } => write!(f, "rm -rf {}", path(p)),
      Self::RemoveMatching { dir, extension } => write!(f, "rm {}/*.{}", path(dir), extension),
      Self::MakeExecutable { path: p } => write!(f, "chmod u+x {}", path(p)),
      Self::ReplaceInFile { path: p, from, to } => {
        write!(f, "replace {} -> {} in {}", quote(from), quote(to), path(p))
      }
    }
  }
}

/// Archive formats unpacked in-process.
///
/// Each recipe names the format of the archive it fetched. `.tar.Z` and `.7z`
/// archives are not listed: recipes decompress those with the platform's own
/// tools and then extract the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchiveFormat {
  TarGz,
  TarBz2,
  Tar,
  Zip,
}

impl ArchiveFormat {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::TarGz => "tar.gz",
      Self::TarBz2 => "tar.bz2",
      Self::Tar => "tar",
      Self::Zip => "zip",
    }
  }
}

impl fmt::Display for ArchiveFormat {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}
