//! Visual Studio toolchain environment.
//!
//! `cl`, `link` and `msbuild` only work inside the environment that
//! `vcvarsall.bat` sets up. The batch file is run once with `& set` appended
//! and the printed variables are handed to every toolchain command.

use std::collections::BTreeMap;
use std::path::Path;

use crate::action::CommandSpec;
use crate::platform::Platform;
use crate::platform::os::Os;
use crate::platform::word::WordSize;

/// Environment variable pointing at `Common7\Tools` of the toolset, e.g. `VS120COMNTOOLS`.
pub fn tools_env_var(vs_version: &str) -> String {
  format!("VS{}0COMNTOOLS", vs_version)
}

/// Target architecture argument for `vcvarsall.bat`.
pub fn vcvars_arch(platform: Platform) -> &'static str {
  match platform.word_size {
    WordSize::Bits64 => "x86_amd64",
    WordSize::Bits32 => "x86",
  }
}

/// Command printing the toolchain environment, one `KEY=VALUE` per line.
pub fn environment_command(tools_dir: &Path, platform: Platform) -> CommandSpec {
  let vcvarsall = tools_dir.join("..").join("..").join("VC").join("vcvarsall.bat");
  CommandSpec::shell(
    Os::Windows,
    format!("\"{}\" {} & set", vcvarsall.display(), vcvars_arch(platform)),
  )
}

/// Parse the output of `set`.
///
/// Values may contain `=`; lines without one (banners, blank lines) are
/// skipped, as are cmd.exe's hidden per-drive entries such as `=C:=C:\`.
pub fn parse_environment(output: &str) -> BTreeMap<String, String> {
  output
    .lines()
    .filter_map(|line| line.trim_end_matches('\r').split_once('='))
    .filter(|(key, _)| !key.is_empty())
    .map(|(key, value)| (key.to_string(), value.to_string()))
    .collect()
}
