//! wxWidgets GUI toolkit.
//!
//! Unix builds compile the release tarball with configure/make. wxWidgets
//! keeps its debugging support in release builds, so there is no separate
//! debug build. Windows uses the prebuilt MSW packages instead.

use crate::action::{Action, ArchiveFormat, CommandSpec};
use crate::config::Config;
use crate::consts::WX_RELEASE_URL;
use crate::layout::Layout;
use crate::platform::os::Os;

use super::{Phase, Step, fetch, make, make_install};

/// Only this release includes `WebKit.h`, which newer macOS SDKs renamed.
const WEBKIT_PATCH_VERSION: &str = "3.0.2";

fn release_url(version: &str, file: &str) -> String {
  format!("{}/v{}/{}", WX_RELEASE_URL, version, file)
}

/// Download and unpack the source tarball. Not used on Windows.
pub fn download(config: &Config, layout: &Layout) -> Step {
  let version = &config.versions.wx;
  let archive = layout.wx_root().join("wxWidgets.tar.bz2");
  let url = release_url(version, &format!("wxWidgets-{}.tar.bz2", version));

  Step::new(
    "wxwidgets-download",
    format!("wxWidgets {} sources", version),
    layout.wx_source_dir(),
  )
  .phase(
    Phase::new("download", format!("Downloading wxWidgets {}...", version))
      .action(Action::create_dir(layout.wx_root()))
      .action(fetch(config, url, archive.clone()))
      .action(Action::extract(&archive, layout.wx_root(), ArchiveFormat::TarBz2))
      .action(Action::remove_file(&archive))
      .abort_with(format!("Error in wxWidgets-{} download.", version)),
  )
}

pub fn build(config: &Config, layout: &Layout) -> Step {
  match layout.platform().os {
    Os::Windows => install_prebuilt(config, layout),
    _ => build_configure(config, layout),
  }
}

fn build_configure(config: &Config, layout: &Layout) -> Step {
  let version = &config.versions.wx;
  let source = layout.wx_source_dir();
  let build_dir = layout.wx_build_dir();
  let is_mac = layout.platform().os == Os::MacOs;

  let mut configure = CommandSpec::new(source.join("configure"));
  if is_mac {
    configure = configure
      .arg("--with-osx_cocoa")
      .arg(format!("--with-macosx-version-min={}", config.osx_min_version));
  }
  let configure = configure
    .arg("--enable-unicode")
    .arg("--with-opengl")
    .arg(format!("--prefix={}", layout.wx_install_dir().display()))
    .cwd(&build_dir)
    .log(layout.log_file("wxWidgets_configure.log"));

  let mut phase = Phase::new(
    "build",
    format!("Configuring wxWidgets {}. This could take a while...", version),
  )
  .action(Action::create_dir(&build_dir));

  if is_mac && version == WEBKIT_PATCH_VERSION {
    phase = phase.action(Action::replace_in_file(
      source.join("src").join("osx").join("webview_webkit.mm"),
      "WebKit.h",
      "WebKitLegacy.h",
    ));
  }

  let phase = phase
    .run(configure)
    .run(make(config, &build_dir, layout.log_file("wxWidgets_build.log")))
    .run(make_install(&build_dir, layout.log_file("wxWidgets_install.log")))
    .action(Action::remove_dir(&build_dir))
    .abort_with("wxWidgets build failed. Fix errors and try again.");

  Step::new("wxwidgets", format!("wxWidgets {}", version), layout.wx_marker())
    .requires(&source)
    .phase(phase)
}

fn install_prebuilt(config: &Config, layout: &Layout) -> Step {
  let version = &config.versions.wx;
  let dir = layout.wx_source_dir();
  let toolset = format!("vc{}0{}", config.vs_version, layout.wx_msw_suffix());

  // Headers, then the debug and release DLL packages
  let packages = [
    format!("wxWidgets-{}-headers.7z", version),
    format!("wxMSW-{}_{}Dev.7z", version, toolset),
    format!("wxMSW-{}_{}ReleaseDLL.7z", version, toolset),
  ];

  let mut download = Phase::new(
    "download",
    format!("Downloading wxWidgets {} headers and libraries...", version),
  )
  .action(Action::create_dir(&dir));
  let mut unpack = Phase::new("unpack", format!("Unpacking wxWidgets {}...", version));

  for file in &packages {
    download = download.action(fetch(config, release_url(version, file), dir.join(file)));
    unpack = unpack.run(
      CommandSpec::new(layout.seven_zip())
        .args(["x", "-y", file.as_str()])
        .cwd(&dir)
        .discard_output(),
    );
  }
  for file in &packages {
    unpack = unpack.action(Action::remove_file(dir.join(file)));
  }

  Step::new("wxwidgets", format!("wxWidgets {}", version), layout.wx_marker())
    .phase(download.abort_with(format!("Error in wxWidgets-{} download.", version)))
    .phase(
      unpack
        .action(Action::rename(layout.wx_msw_vendor_lib_dir(), layout.wx_msw_lib_dir()))
        .abort_with(format!("wxWidgets {} packages could not be unpacked.", version)),
    )
}
