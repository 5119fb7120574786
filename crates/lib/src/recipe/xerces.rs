//! Xerces-C XML parser.
//!
//! On Unix the source tree is configured out of tree twice, once per build
//! type, into a shared install prefix. The debug library is renamed before the
//! release build overwrites it. On Windows the bundled Visual Studio project is
//! built with msbuild.

use crate::action::{Action, ArchiveFormat, CommandSpec};
use crate::config::Config;
use crate::consts::XERCES_SOURCE_URL;
use crate::layout::Layout;
use crate::platform::os::Os;

use super::{Phase, Step, fetch, flags, make, make_install};

const CONFIGURE_FLAGS: [&str; 4] = [
  "--disable-shared",
  "--disable-netaccessor-curl",
  "--disable-transcoder-icu",
  "--disable-msgloader-icu",
];

pub fn download(config: &Config, layout: &Layout) -> Step {
  let version = &config.versions.xerces;
  let url = format!("{}/xerces-c-{}.tar.gz", XERCES_SOURCE_URL, version);
  let archive = layout.root().join("xerces.tar.gz");

  Step::new("xerces-download", format!("Xerces-C {} sources", version), layout.xerces_dir()).phase(
    Phase::new("download", format!("Downloading Xerces-C {}...", version))
      .action(Action::create_dir(layout.root()))
      .action(fetch(config, url, archive.clone()))
      .action(Action::extract(&archive, layout.root(), ArchiveFormat::TarGz))
      .action(Action::remove_file(&archive))
      .action(Action::rename(layout.xerces_extracted_dir(), layout.xerces_dir()))
      .abort_with(format!("Error in Xerces-C {} download.", version)),
  )
}

pub fn build(config: &Config, layout: &Layout) -> Step {
  match layout.platform().os {
    Os::Windows => build_msbuild(config, layout),
    _ => build_configure(config, layout),
  }
}

fn build_configure(config: &Config, layout: &Layout) -> Step {
  let version = &config.versions.xerces;
  let source = layout.xerces_dir();
  let build_dir = layout.xerces_build_dir();
  let lib_dir = layout.xerces_install_dir().join("lib");

  let osx_flag = match layout.platform().os {
    Os::MacOs => format!("-mmacosx-version-min={}", config.osx_min_version),
    _ => String::new(),
  };

  let configure = |cflags: &str, variant: &str| {
    CommandSpec::new(source.join("configure"))
      .args(CONFIGURE_FLAGS)
      .arg(format!("CFLAGS={}", cflags))
      .arg(format!("CXXFLAGS={}", cflags))
      .arg(format!("--prefix={}", layout.xerces_install_dir().display()))
      .cwd(&build_dir)
      .log(layout.log_file(&format!("xerces_configure_{}.log", variant)))
  };

  let debug_flags = flags(&["-O0 -g -fPIC", osx_flag.as_str()]);
  let release_flags = flags(&["-O2 -fPIC", osx_flag.as_str()]);

  Step::new("xerces", format!("Xerces {}", version), layout.xerces_marker())
    .requires(&source)
    .phase(
      // Building side by side with Windows checkouts can strip the exec bits
      Phase::new("prepare", format!("Preparing Xerces {} build directory", version))
        .action(Action::make_executable(source.join("configure")))
        .action(Action::make_executable(source.join("config")))
        .action(Action::create_dir(&build_dir))
        .abort_with("Xerces build directory could not be prepared."),
    )
    .phase(
      Phase::new(
        "debug",
        format!("Configuring Xerces {} debug library. This could take a while...", version),
      )
      .run(configure(&debug_flags, "debug"))
      .run(make(config, &build_dir, layout.log_file("xerces_build_debug.log")))
      .run(make_install(&build_dir, layout.log_file("xerces_install_debug.log")))
      .action(Action::rename(lib_dir.join("libxerces-c.a"), layout.xerces_debug_lib()))
      .run(
        CommandSpec::new("make")
          .arg("clean")
          .cwd(&build_dir)
          .discard_output()
          .allow_failure(),
      )
      .abort_with("Xerces debug build failed. Fix errors and try again."),
    )
    .phase(
      Phase::new(
        "release",
        format!("Configuring Xerces {} release library. This could take a while...", version),
      )
      .run(configure(&release_flags, "release"))
      .run(make(config, &build_dir, layout.log_file("xerces_build_release.log")))
      .run(make_install(&build_dir, layout.log_file("xerces_install_release.log")))
      .action(Action::remove_dir(&build_dir))
      .abort_with("Xerces release build failed. Fix errors and try again."),
    )
}

fn build_msbuild(config: &Config, layout: &Layout) -> Step {
  let version = &config.versions.xerces;
  let project_dir = layout.xerces_project_dir();

  let msbuild = |configuration: &str, target: &str, variant: &str| {
    CommandSpec::new("msbuild")
      .arg("/m")
      .arg(format!(
        "/property:Configuration={};Platform={}",
        configuration,
        layout.xerces_msbuild_platform()
      ))
      .arg(format!("/property:TargetName={}", target))
      .arg(format!(
        "/property:ForceImportBeforeCppTargets={}",
        layout.xerces_prop_override().display()
      ))
      .arg("XercesLib.vcxproj")
      .cwd(&project_dir)
      .log(layout.log_file(&format!("xerces_build_{}.log", variant)))
  };

  Step::new("xerces", format!("Xerces-C++ {}", version), layout.xerces_marker())
    .requires(&project_dir)
    .needs_msvc()
    .phase(
      Phase::new("debug", "Compiling debug Xerces. This could take a while...")
        .run(msbuild("Static Debug", "xerces-c_3D", "debug"))
        .abort_with("Xerces debug build failed. Fix errors and try again."),
    )
    .phase(
      Phase::new("release", "Compiling release Xerces. This could take a while...")
        .run(msbuild("Static Release", "xerces-c_3", "release"))
        .abort_with("Xerces release build failed. Fix errors and try again."),
    )
}
