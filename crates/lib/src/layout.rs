//! Filesystem layout of the dependencies root.
//!
//! Every path is derived from the root, the platform and the version set.
//! Nothing here touches the filesystem.

use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::platform::Platform;
use crate::platform::os::Os;

#[derive(Debug, Clone)]
pub struct Layout {
  root: PathBuf,
  platform: Platform,
  xerces_version: String,
  wx_version: String,
  vs_version: String,
}

impl Layout {
  pub fn new(config: &Config, platform: Platform) -> Self {
    Self {
      root: config.root.clone(),
      platform,
      xerces_version: config.versions.xerces.clone(),
      wx_version: config.versions.wx.clone(),
      vs_version: config.vs_version.clone(),
    }
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  pub fn platform(&self) -> Platform {
    self.platform
  }

  pub fn logs_dir(&self) -> PathBuf {
    self.root.join("logs")
  }

  pub fn log_file(&self, name: &str) -> PathBuf {
    self.logs_dir().join(name)
  }

  pub fn bin_dir(&self) -> PathBuf {
    self.root.join("bin")
  }

  /// Vendored 7-zip used to unpack `.7z` archives on Windows.
  pub fn seven_zip(&self) -> PathBuf {
    self.bin_dir().join("7za").join("7za.exe")
  }

  // Xerces-C

  pub fn xerces_dir(&self) -> PathBuf {
    self.root.join("xerces")
  }

  /// Directory the upstream tarball unpacks to, before it is renamed.
  pub fn xerces_extracted_dir(&self) -> PathBuf {
    self.root.join(format!("xerces-c-{}", self.xerces_version))
  }

  fn unix_flavor(&self) -> &'static str {
    match self.platform.os {
      Os::MacOs => "cocoa",
      _ => "linux",
    }
  }

  pub fn xerces_build_dir(&self) -> PathBuf {
    self.xerces_dir().join(format!("{}-build", self.unix_flavor()))
  }

  pub fn xerces_install_dir(&self) -> PathBuf {
    self.xerces_dir().join(format!("{}-install", self.unix_flavor()))
  }

  pub fn xerces_release_lib(&self) -> PathBuf {
    self.xerces_install_dir().join("lib").join("libxerces-c.a")
  }

  pub fn xerces_debug_lib(&self) -> PathBuf {
    self.xerces_install_dir().join("lib").join("libxerces-cd.a")
  }

  /// msbuild platform name for the Xerces solution.
  pub fn xerces_msbuild_platform(&self) -> &'static str {
    if self.platform.is_64bit() { "x64" } else { "Win32" }
  }

  pub fn xerces_windows_out_dir(&self) -> PathBuf {
    let dir = if self.platform.is_64bit() { "Win64" } else { "Win32" };
    self.xerces_dir().join("Build").join(dir)
  }

  pub fn xerces_project_dir(&self) -> PathBuf {
    self
      .xerces_dir()
      .join("projects")
      .join("win32")
      .join(format!("VC{}", self.vs_version))
      .join("xerces-all")
      .join("XercesLib")
  }

  pub fn xerces_prop_override(&self) -> PathBuf {
    self.bin_dir().join("xerces").join("XercesLibOverride.prop")
  }

  /// The file whose presence means Xerces is built for this platform.
  pub fn xerces_marker(&self) -> PathBuf {
    match self.platform.os {
      Os::Windows => self.xerces_windows_out_dir(),
      _ => self.xerces_release_lib(),
    }
  }

  // wxWidgets

  pub fn wx_root(&self) -> PathBuf {
    self.root.join("wxWidgets")
  }

  pub fn wx_source_dir(&self) -> PathBuf {
    match self.platform.os {
      Os::Windows => self.wx_root().join(format!("wsMSW-{}", self.wx_version)),
      _ => self.wx_root().join(format!("wxWidgets-{}", self.wx_version)),
    }
  }

  fn wx_toolkit(&self) -> &'static str {
    match self.platform.os {
      Os::MacOs => "cocoa",
      _ => "gtk",
    }
  }

  pub fn wx_build_dir(&self) -> PathBuf {
    self.wx_source_dir().join(format!("{}-build", self.wx_toolkit()))
  }

  pub fn wx_install_dir(&self) -> PathBuf {
    self.wx_source_dir().join(format!("{}-install", self.wx_toolkit()))
  }

  /// `major.minor` of the wx version, as used in library file names.
  pub fn wx_lib_version(&self) -> String {
    self.wx_version.split('.').take(2).collect::<Vec<_>>().join(".")
  }

  /// Toolset suffix of the prebuilt MSW packages: `_` or `_x64_`.
  pub fn wx_msw_suffix(&self) -> &'static str {
    if self.platform.is_64bit() { "_x64_" } else { "_" }
  }

  /// Library directory name as shipped in the prebuilt MSW packages.
  pub fn wx_msw_vendor_lib_dir(&self) -> PathBuf {
    self
      .wx_source_dir()
      .join("lib")
      .join(format!("vc{}0{}dll", self.vs_version, self.wx_msw_suffix()))
  }

  /// Library directory name the application build expects.
  pub fn wx_msw_lib_dir(&self) -> PathBuf {
    self
      .wx_source_dir()
      .join("lib")
      .join(format!("vc{}dll", self.wx_msw_suffix()))
  }

  pub fn wx_marker(&self) -> PathBuf {
    let lib = self.wx_install_dir().join("lib");
    match self.platform.os {
      Os::Windows => self.wx_msw_lib_dir(),
      Os::MacOs => lib.join(format!("libwx_baseu-{}.dylib", self.wx_lib_version())),
      Os::Linux => lib.join(format!("libwx_baseu-{}.so", self.wx_lib_version())),
    }
  }

  // CSPICE

  pub fn cspice_root(&self) -> PathBuf {
    self.root.join("cspice")
  }

  pub fn cspice_platform_dir(&self) -> PathBuf {
    self.cspice_root().join(self.platform.os.dir_name())
  }

  pub fn cspice_dir(&self) -> PathBuf {
    self
      .cspice_platform_dir()
      .join(format!("cspice{}", self.platform.word_size.bits()))
  }

  pub fn cspice_src_dir(&self) -> PathBuf {
    self.cspice_dir().join("src").join("cspice")
  }

  pub fn cspice_lib_dir(&self) -> PathBuf {
    self.cspice_dir().join("lib")
  }

  pub fn cspice_debug_lib(&self) -> PathBuf {
    match self.platform.os {
      Os::Windows => self.cspice_lib_dir().join("cspiced.lib"),
      _ => self.cspice_lib_dir().join("cspiced.a"),
    }
  }

  pub fn cspice_release_lib(&self) -> PathBuf {
    match self.platform.os {
      Os::Windows => self.cspice_lib_dir().join("cspice.lib"),
      _ => self.cspice_lib_dir().join("cspice.a"),
    }
  }

  pub fn cspice_marker(&self) -> PathBuf {
    self.cspice_debug_lib()
  }
}
