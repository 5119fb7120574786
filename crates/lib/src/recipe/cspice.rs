//! NAIF CSPICE toolkit.
//!
//! NAIF ships prebuilt packages per platform. They are rebuilt here with
//! integer `uiolen` so the debug and release libraries match the rest of the
//! application's build flags.

use crate::action::{Action, ArchiveFormat, CommandSpec};
use crate::config::Config;
use crate::consts::NAIF_TOOLKIT_URL;
use crate::layout::Layout;
use crate::platform::os::Os;

use super::{Phase, Step, fetch, flags};

const CL_DEFINES: &str = "-D_COMPLEX_DEFINED -DMSDOS -DOMIT_BLANK_CC -DNON_ANSI_STDIO -DUIOLEN_int";

/// NAIF's name for the toolkit flavour of `os`.
fn toolkit_type(os: Os) -> &'static str {
  match os {
    Os::MacOs => "MacIntel_OSX_AppleC",
    Os::Linux => "PC_Linux_GCC",
    Os::Windows => "PC_Windows_VisualC",
  }
}

/// URL of the CSPICE package for the layout's platform.
pub fn package_url(config: &Config, layout: &Layout) -> String {
  let platform = layout.platform();
  let package = if platform.os.is_windows() { "cspice.zip" } else { "cspice.tar.Z" };
  format!(
    "{}/toolkit_{}/C/{}_{}/packages/{}",
    NAIF_TOOLKIT_URL,
    config.versions.cspice,
    toolkit_type(platform.os),
    platform.word_size,
    package
  )
}

pub fn download(config: &Config, layout: &Layout) -> Step {
  let platform = layout.platform();
  let version = &config.versions.cspice;
  let dir = layout.cspice_platform_dir();
  let unpacked = dir.join("cspice");

  let phase = Phase::new(
    "download",
    format!("Downloading {} CSPICE {}...", platform.word_size, version),
  )
  .action(Action::create_dir(&dir));

  let phase = if platform.os.is_windows() {
    let archive = dir.join("cspice.zip");
    phase
      .action(fetch(config, package_url(config, layout), archive.clone()))
      .action(Action::extract(&archive, &dir, ArchiveFormat::Zip))
      .action(Action::rename(&unpacked, layout.cspice_dir()))
      .action(Action::remove_file(&archive))
  } else {
    // The tarball is LZW compressed, which only gzip still reads
    let compressed = dir.join("cspice.tar.Z");
    let tarball = dir.join("cspice.tar");
    phase
      .action(fetch(config, package_url(config, layout), compressed))
      .run(CommandSpec::new("gzip").args(["-d", "-f", "cspice.tar.Z"]).cwd(&dir))
      .action(Action::extract(&tarball, &dir, ArchiveFormat::Tar))
      .action(Action::rename(&unpacked, layout.cspice_dir()))
      .action(Action::remove_file(&tarball))
  };

  Step::new(
    "cspice-download",
    format!("CSPICE {} ({})", version, platform.word_size),
    layout.cspice_dir(),
  )
  .phase(phase.abort_with(format!("Error in CSPICE {} download.", version)))
}

pub fn build(config: &Config, layout: &Layout) -> Step {
  match layout.platform().os {
    Os::Windows => build_msvc(layout),
    _ => build_mkprodct(config, layout),
  }
}

fn build_mkprodct(config: &Config, layout: &Layout) -> Step {
  let src = layout.cspice_src_dir();
  let arch = format!("-m{}", layout.platform().word_size.bits());
  let osx_flag = match layout.platform().os {
    Os::MacOs => format!("-mmacosx-version-min={}", config.osx_min_version),
    _ => String::new(),
  };

  let mkprodct = |optimization: &str, variant: &str| {
    let options = flags(&[
      arch.as_str(),
      "-c -ansi",
      osx_flag.as_str(),
      optimization,
      "-fPIC -DNON_UNIX_STDIO -DUIOLEN_int",
    ]);
    CommandSpec::new(src.join("mkprodct.csh"))
      .cwd(&src)
      .env("TKCOMPILEARCH", arch.as_str())
      .env("TKCOMPILEOPTIONS", options)
      .log(layout.log_file(&format!("cspice_build_{}.log", variant)))
  };

  Step::new("cspice", "CSPICE", layout.cspice_marker())
    .requires(&src)
    .phase(
      Phase::new("debug", "Compiling CSPICE debug library. This could take a while...")
        .run(mkprodct("-g", "debug"))
        .action(Action::rename(
          layout.cspice_release_lib(),
          layout.cspice_debug_lib(),
        ))
        .continue_with("CSPICE debug build failed. Fix errors and try again."),
    )
    .phase(
      Phase::new("release", "Compiling CSPICE release library. This could take a while...")
        .run(mkprodct("-O2", "release"))
        .abort_with("CSPICE release build failed. Fix errors and try again."),
    )
}

fn build_msvc(layout: &Layout) -> Step {
  let src = layout.cspice_src_dir();

  // cl and link need cmd.exe for the wildcard expansion
  let compile_and_link = |cl_flags: &str, lib: &str, variant: &str| {
    let log = layout.log_file(&format!("cspice_build_{}.log", variant));
    [
      CommandSpec::shell(Os::Windows, format!("cl /c {} /MP {} *.c", cl_flags, CL_DEFINES))
        .cwd(&src)
        .log(&log),
      CommandSpec::shell(Os::Windows, format!("link -lib /out:..\\..\\lib\\{} *.obj", lib))
        .cwd(&src)
        .append_log(&log),
    ]
  };

  let [debug_cl, debug_link] = compile_and_link("/DEBUG /Z7", "cspiced.lib", "debug");
  let [release_cl, release_link] = compile_and_link("/O2", "cspice.lib", "release");

  Step::new("cspice", "CSPICE", layout.cspice_marker())
    .requires(&src)
    .needs_msvc()
    .phase(
      Phase::new("debug", "Compiling debug CSPICE. This could take a while...")
        .run(debug_cl)
        .run(debug_link)
        .action(Action::remove_matching(&src, "obj"))
        .continue_with("CSPICE debug build failed. Fix errors and try again."),
    )
    .phase(
      Phase::new("release", "Compiling release CSPICE. This could take a while...")
        .run(release_cl)
        .run(release_link)
        .action(Action::remove_matching(&src, "obj"))
        .abort_with("CSPICE release build failed. Fix errors and try again."),
    )
}
