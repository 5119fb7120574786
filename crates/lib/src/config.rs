//! Bootstrapper configuration.
//!
//! The defaults reproduce the pinned dependency set. A `depends.toml` in the
//! dependencies root may override any field.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::consts::{
  CONFIG_FILENAME, CSPICE_VERSION, DEFAULT_ROOT, MAKE_JOBS, OSX_MIN_VERSION, ROOT_ENV_VAR, VS_VERSION, WX_VERSION,
  XERCES_VERSION,
};

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("config file not found: {0}")]
  NotFound(PathBuf),

  #[error("failed to read {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to parse {path}: {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: toml::de::Error,
  },

  #[error("failed to determine current directory: {0}")]
  CurrentDir(#[source] io::Error),
}

/// Upstream versions of each third-party library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Versions {
  pub xerces: String,
  pub wx: String,
  pub cspice: String,
}

impl Default for Versions {
  fn default() -> Self {
    Self {
      xerces: XERCES_VERSION.to_string(),
      wx: WX_VERSION.to_string(),
      cspice: CSPICE_VERSION.to_string(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
  /// The dependencies root. Never read from the file itself.
  #[serde(skip)]
  pub root: PathBuf,
  pub versions: Versions,
  /// Whether wxWidgets is downloaded and built at all.
  pub build_wx: bool,
  pub osx_min_version: String,
  /// Visual Studio toolset major version, e.g. "12" for VS 2013.
  pub vs_version: String,
  pub make_jobs: u32,
  /// Expected SHA-256 per archive file name. Archives without an entry are not verified.
  pub checksums: BTreeMap<String, String>,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      root: PathBuf::from(DEFAULT_ROOT),
      versions: Versions::default(),
      build_wx: true,
      osx_min_version: OSX_MIN_VERSION.to_string(),
      vs_version: VS_VERSION.to_string(),
      make_jobs: MAKE_JOBS,
      checksums: BTreeMap::new(),
    }
  }
}

impl Config {
  /// Resolve the dependencies root.
  ///
  /// Precedence: explicit path, then `DEPENDS_ROOT`, then `./depends`.
  /// Relative paths are made absolute against the current directory.
  pub fn resolve_root(explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
    let root = match explicit {
      Some(path) => path.to_path_buf(),
      None => std::env::var_os(ROOT_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_ROOT)),
    };

    let root = if root.is_absolute() {
      root
    } else {
      std::env::current_dir().map_err(ConfigError::CurrentDir)?.join(root)
    };

    Ok(dunce::canonicalize(&root).unwrap_or(root))
  }

  /// Load the configuration for `root`.
  ///
  /// An explicit `file` must exist. Without one, `<root>/depends.toml` is read
  /// when present and defaults are used otherwise.
  pub fn load(root: PathBuf, file: Option<&Path>) -> Result<Self, ConfigError> {
    let (path, required) = match file {
      Some(path) => (path.to_path_buf(), true),
      None => (root.join(CONFIG_FILENAME), false),
    };

    let mut config = if path.exists() {
      debug!(path = %path.display(), "loading config");
      let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
      })?;
      Self::parse(&content).map_err(|source| ConfigError::Parse { path, source })?
    } else if required {
      return Err(ConfigError::NotFound(path));
    } else {
      Self::default()
    };

    config.root = root;
    Ok(config)
  }

  pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
    toml::from_str(content)
  }

  /// Expected SHA-256 for an archive, if one is configured.
  pub fn checksum_for(&self, file_name: &str) -> Option<String> {
    self.checksums.get(file_name).map(|s| s.to_lowercase())
  }
}
