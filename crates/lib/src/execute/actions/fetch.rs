//! Fetch action implementation.
//!
//! This module handles downloading archives over HTTP(S), with optional SHA256
//! verification.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::execute::types::ExecuteError;
use crate::util::hash::hash_file;

/// Execute a Fetch action.
///
/// Streams the response body into `<dest>.part` and renames it to `dest` once
/// complete, so an interrupted download never looks like a finished one.
///
/// # Arguments
///
/// * `client` - The shared HTTP client
/// * `url` - The URL to download from
/// * `dest` - Where the file should end up
/// * `expected_sha256` - If given, the download is rejected unless it matches (lowercase hex)
pub async fn execute_fetch(
  client: &reqwest::Client,
  url: &str,
  dest: &Path,
  expected_sha256: Option<&str>,
) -> Result<(), ExecuteError> {
  info!(url = %url, "fetching URL");

  if let Some(parent) = dest.parent() {
    fs::create_dir_all(parent)
      .await
      .map_err(ExecuteError::fs("create directory", parent))?;
  }

  // A verified leftover from an interrupted run can be reused
  if let Some(expected) = expected_sha256 {
    if dest.exists() {
      debug!(path = ?dest, "checking cached file");
      let cached = dest.to_path_buf();
      if let Ok(Ok(actual)) = tokio::task::spawn_blocking(move || hash_file(&cached)).await {
        if actual == expected {
          info!(path = ?dest, "using cached file");
          return Ok(());
        }
        debug!(expected = %expected, actual = %actual, "cached file hash mismatch, re-downloading");
      }
    }
  }

  let mut response = client.get(url).send().await.map_err(|e| fetch_failed(url, e))?;

  if !response.status().is_success() {
    return Err(ExecuteError::FetchFailed {
      url: url.to_string(),
      message: format!("HTTP {}", response.status()),
    });
  }

  let partial = partial_path(dest);
  let (size, hasher) = match stream_body(&mut response, url, &partial).await {
    Ok(written) => written,
    Err(e) => {
      let _ = fs::remove_file(&partial).await;
      return Err(e);
    }
  };

  let actual = hex::encode(hasher.finalize());

  if let Some(expected) = expected_sha256 {
    if actual != expected {
      let _ = fs::remove_file(&partial).await;
      return Err(ExecuteError::HashMismatch {
        url: url.to_string(),
        expected: expected.to_string(),
        actual,
      });
    }
  }

  if let Err(e) = fs::rename(&partial, dest).await {
    let _ = fs::remove_file(&partial).await;
    return Err(ExecuteError::fs("rename", &partial)(e));
  }

  info!(path = ?dest, size, sha256 = %actual, "download complete");

  Ok(())
}

/// Write the response body to `partial`, returning its size and running hash.
async fn stream_body(
  response: &mut reqwest::Response,
  url: &str,
  partial: &Path,
) -> Result<(u64, Sha256), ExecuteError> {
  let mut file = fs::File::create(partial)
    .await
    .map_err(ExecuteError::fs("create", partial))?;

  let mut hasher = Sha256::new();
  let mut size: u64 = 0;

  while let Some(chunk) = response.chunk().await.map_err(|e| fetch_failed(url, e))? {
    hasher.update(&chunk);
    file.write_all(&chunk).await.map_err(ExecuteError::fs("write", partial))?;
    size += chunk.len() as u64;
  }
  file.flush().await.map_err(ExecuteError::fs("write", partial))?;

  Ok((size, hasher))
}

fn fetch_failed(url: &str, err: reqwest::Error) -> ExecuteError {
  ExecuteError::FetchFailed {
    url: url.to_string(),
    message: err.to_string(),
  }
}

/// `dest` with `.part` appended to its file name.
fn partial_path(dest: &Path) -> PathBuf {
  let mut name = dest.file_name().map(OsString::from).unwrap_or_default();
  name.push(".part");
  dest.with_file_name(name)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::util::hash::hash_bytes;
  use tempfile::TempDir;
  use tokio::io::AsyncReadExt;
  use tokio::net::TcpListener;

  fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
  }

  /// Serve a single HTTP response on a local port and return its URL.
  async fn serve_once(status: &'static str, body: &'static [u8]) -> String {
    serve_with_length(status, body, body.len()).await
  }

  /// Like `serve_once`, but announce `length` bytes regardless of the body.
  async fn serve_with_length(status: &'static str, body: &'static [u8], length: usize) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
      let (mut socket, _) = listener.accept().await.unwrap();
      let mut request = Vec::new();
      let mut buf = [0u8; 1024];
      while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = socket.read(&mut buf).await.unwrap();
        if n == 0 {
          break;
        }
        request.extend_from_slice(&buf[..n]);
      }
      let head = format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status, length
      );
      socket.write_all(head.as_bytes()).await.unwrap();
      socket.write_all(body).await.unwrap();
      socket.shutdown().await.unwrap();
    });

    format!("http://{}/xerces-c-3.1.4.tar.gz", addr)
  }

  #[test]
  fn partial_path_appends_suffix() {
    assert_eq!(
      partial_path(Path::new("/deps/xerces.tar.gz")),
      PathBuf::from("/deps/xerces.tar.gz.part")
    );
  }

  #[tokio::test]
  async fn downloads_body_to_dest() {
    let url = serve_once("200 OK", b"archive-bytes").await;
    let temp = TempDir::new().unwrap();
    let dest = temp.path().join("downloads").join("xerces.tar.gz");

    execute_fetch(&client(), &url, &dest, None).await.unwrap();

    assert_eq!(std::fs::read(&dest).unwrap(), b"archive-bytes");
    assert!(!partial_path(&dest).exists());
  }

  #[tokio::test]
  async fn verifies_expected_hash() {
    let url = serve_once("200 OK", b"archive-bytes").await;
    let temp = TempDir::new().unwrap();
    let dest = temp.path().join("xerces.tar.gz");
    let expected = hash_bytes(b"archive-bytes");

    execute_fetch(&client(), &url, &dest, Some(&expected))
      .await
      .unwrap();

    assert!(dest.exists());
  }

  #[tokio::test]
  async fn hash_mismatch_leaves_no_file() {
    let url = serve_once("200 OK", b"tampered").await;
    let temp = TempDir::new().unwrap();
    let dest = temp.path().join("xerces.tar.gz");
    let expected = hash_bytes(b"archive-bytes");

    let result = execute_fetch(&client(), &url, &dest, Some(&expected)).await;

    assert!(matches!(result, Err(ExecuteError::HashMismatch { .. })));
    assert!(!dest.exists());
    assert!(!partial_path(&dest).exists());
  }

  #[tokio::test]
  async fn http_error_status_fails() {
    let url = serve_once("404 Not Found", b"missing").await;
    let temp = TempDir::new().unwrap();
    let dest = temp.path().join("xerces.tar.gz");

    let result = execute_fetch(&client(), &url, &dest, None).await;

    match result {
      Err(ExecuteError::FetchFailed { message, .. }) => assert!(message.contains("404")),
      other => panic!("expected FetchFailed, got {:?}", other),
    }
    assert!(!dest.exists());
  }

  #[tokio::test]
  async fn truncated_body_removes_partial_file() {
    let url = serve_with_length("200 OK", b"archive", 4096).await;
    let temp = TempDir::new().unwrap();
    let dest = temp.path().join("xerces.tar.gz");

    let result = execute_fetch(&client(), &url, &dest, None).await;

    assert!(matches!(result, Err(ExecuteError::FetchFailed { .. })));
    assert!(!dest.exists());
    assert!(!partial_path(&dest).exists());
  }

  #[tokio::test]
  async fn cached_file_with_matching_hash_skips_download() {
    let temp = TempDir::new().unwrap();
    let dest = temp.path().join("xerces.tar.gz");
    std::fs::write(&dest, b"archive-bytes").unwrap();
    let expected = hash_bytes(b"archive-bytes");

    // Nothing listens on this port; a request would fail
    let url = "http://127.0.0.1:9/xerces.tar.gz";
    execute_fetch(&client(), url, &dest, Some(&expected))
      .await
      .unwrap();
  }
}
