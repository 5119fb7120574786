//! Filesystem actions that recipes need between tool invocations.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::debug;

use crate::execute::types::ExecuteError;

/// Remove every regular file directly inside `dir` whose extension matches
/// `extension`, ignoring case.
///
/// Returns the number of files removed.
pub async fn remove_matching(dir: &Path, extension: &str) -> Result<usize, ExecuteError> {
  let mut entries = fs::read_dir(dir).await.map_err(ExecuteError::fs("read directory", dir))?;
  let mut removed = 0;

  while let Some(entry) = entries
    .next_entry()
    .await
    .map_err(ExecuteError::fs("read directory", dir))?
  {
    let path = entry.path();
    let matches = path
      .extension()
      .and_then(|e| e.to_str())
      .is_some_and(|e| e.eq_ignore_ascii_case(extension));
    if !matches || !path.is_file() {
      continue;
    }

    fs::remove_file(&path).await.map_err(ExecuteError::fs("remove", &path))?;
    removed += 1;
  }

  debug!(dir = %dir.display(), extension, removed, "removed matching files");
  Ok(removed)
}

/// Add the user-executable bit to `path`, or to every file directly inside it
/// when it is a directory.
pub async fn make_executable(path: &Path) -> Result<(), ExecuteError> {
  let metadata = fs::metadata(path).await.map_err(ExecuteError::fs("stat", path))?;

  if !metadata.is_dir() {
    return set_user_exec(path).await;
  }

  let mut entries = fs::read_dir(path).await.map_err(ExecuteError::fs("read directory", path))?;
  while let Some(entry) = entries
    .next_entry()
    .await
    .map_err(ExecuteError::fs("read directory", path))?
  {
    let child = entry.path();
    if child.is_file() {
      set_user_exec(&child).await?;
    }
  }
  Ok(())
}

#[cfg(unix)]
async fn set_user_exec(path: &Path) -> Result<(), ExecuteError> {
  use std::os::unix::fs::PermissionsExt;

  let mut perms = fs::metadata(path)
    .await
    .map_err(ExecuteError::fs("stat", path))?
    .permissions();
  perms.set_mode(perms.mode() | 0o100);
  fs::set_permissions(path, perms)
    .await
    .map_err(ExecuteError::fs("chmod", path))
}

#[cfg(not(unix))]
async fn set_user_exec(_path: &Path) -> Result<(), ExecuteError> {
  Ok(())
}

/// Replace every occurrence of `from` with `to` in a text file.
///
/// The original is copied to `<name>.bk` before the file is rewritten.
pub async fn replace_in_file(path: &Path, from: &str, to: &str) -> Result<(), ExecuteError> {
  let content = fs::read_to_string(path).await.map_err(ExecuteError::fs("read", path))?;

  let backup = backup_path(path);
  fs::copy(path, &backup).await.map_err(ExecuteError::fs("copy", &backup))?;

  let count = content.matches(from).count();
  fs::write(path, content.replace(from, to))
    .await
    .map_err(ExecuteError::fs("write", path))?;

  debug!(path = %path.display(), count, "replaced text");
  Ok(())
}

fn backup_path(path: &Path) -> PathBuf {
  let mut name = path.file_name().map(OsString::from).unwrap_or_default();
  name.push(".bk");
  path.with_file_name(name)
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  #[tokio::test]
  async fn remove_matching_only_touches_extension() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path();
    std::fs::write(dir.join("spkez.obj"), "").unwrap();
    std::fs::write(dir.join("SPKEZ2.OBJ"), "").unwrap();
    std::fs::write(dir.join("spkez.c"), "").unwrap();
    std::fs::create_dir(dir.join("nested.obj")).unwrap();

    let removed = remove_matching(dir, "obj").await.unwrap();

    assert_eq!(removed, 2);
    assert!(dir.join("spkez.c").exists());
    assert!(dir.join("nested.obj").is_dir());
    assert!(!dir.join("spkez.obj").exists());
  }

  #[tokio::test]
  async fn remove_matching_missing_dir_fails() {
    let temp = TempDir::new().unwrap();
    let result = remove_matching(&temp.path().join("gone"), "obj").await;
    assert!(matches!(result, Err(ExecuteError::Fs { op: "read directory", .. })));
  }

  #[tokio::test]
  async fn replace_keeps_backup() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("webview_webkit.mm");
    std::fs::write(&file, "#include <WebKit/WebKit.h>\n").unwrap();

    replace_in_file(&file, "WebKit.h", "WebKitLegacy.h").await.unwrap();

    assert_eq!(
      std::fs::read_to_string(&file).unwrap(),
      "#include <WebKit/WebKitLegacy.h>\n"
    );
    assert_eq!(
      std::fs::read_to_string(temp.path().join("webview_webkit.mm.bk")).unwrap(),
      "#include <WebKit/WebKit.h>\n"
    );
  }

  #[tokio::test]
  async fn replace_in_missing_file_fails() {
    let temp = TempDir::new().unwrap();
    let result = replace_in_file(&temp.path().join("gone.mm"), "a", "b").await;
    assert!(matches!(result, Err(ExecuteError::Fs { op: "read", .. })));
  }

  #[cfg(unix)]
  #[tokio::test]
  async fn make_executable_sets_user_bit_on_dir_contents() {
    use std::os::unix::fs::PermissionsExt;

    let temp = TempDir::new().unwrap();
    let config = temp.path().join("config");
    std::fs::create_dir(&config).unwrap();
    let script = config.join("install-sh");
    std::fs::write(&script, "#!/bin/sh\n").unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o644)).unwrap();

    make_executable(&config).await.unwrap();

    let mode = std::fs::metadata(&script).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o744);
  }

  #[cfg(unix)]
  #[tokio::test]
  async fn make_executable_on_single_file() {
    use std::os::unix::fs::PermissionsExt;

    let temp = TempDir::new().unwrap();
    let configure = temp.path().join("configure");
    std::fs::write(&configure, "#!/bin/sh\n").unwrap();
    std::fs::set_permissions(&configure, std::fs::Permissions::from_mode(0o600)).unwrap();

    make_executable(&configure).await.unwrap();

    let mode = std::fs::metadata(&configure).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o700);
  }
}
