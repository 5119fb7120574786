//! Extract action implementation.
//!
//! Supports:
//! - `.tar.gz` / `.tgz`
//! - `.tar.bz2` / `.tbz2`
//! - `.tar`
//! - `.zip`
//!
//! Archives are unpacked as-is; recipes rename the top-level directory afterwards.

use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::Path;

use bzip2::read::BzDecoder;
use flate2::read::GzDecoder;
use tar::Archive;
use tracing::info;

use crate::action::ArchiveFormat;
use crate::execute::types::ExecuteError;

/// Execute an Extract action on a blocking thread.
pub async fn execute_extract(archive: &Path, dest: &Path, format: ArchiveFormat) -> Result<(), ExecuteError> {
  let (owned_archive, owned_dest) = (archive.to_path_buf(), dest.to_path_buf());

  tokio::task::spawn_blocking(move || unpack_archive(&owned_archive, &owned_dest, format))
    .await
    .map_err(|e| ExecuteError::Extract {
      archive: archive.to_path_buf(),
      message: e.to_string(),
    })?
}

/// Unpack an archive into the destination directory
pub fn unpack_archive(archive: &Path, dest: &Path, format: ArchiveFormat) -> Result<(), ExecuteError> {
  fs::create_dir_all(dest).map_err(ExecuteError::fs("create directory", dest))?;

  let file = File::open(archive).map_err(ExecuteError::fs("open", archive))?;
  let reader = BufReader::new(file);

  let result = match format {
    ArchiveFormat::TarGz => unpack_tar(GzDecoder::new(reader), dest),
    ArchiveFormat::TarBz2 => unpack_tar(BzDecoder::new(reader), dest),
    ArchiveFormat::Tar => unpack_tar(reader, dest),
    ArchiveFormat::Zip => unpack_zip(reader, dest),
  };

  result.map_err(|e| ExecuteError::Extract {
    archive: archive.to_path_buf(),
    message: e.to_string(),
  })?;

  info!(archive = %archive.display(), dest = %dest.display(), "unpacked archive");
  Ok(())
}

fn unpack_tar<R: Read>(reader: R, dest: &Path) -> io::Result<()> {
  let mut archive = Archive::new(reader);
  archive.set_preserve_mtime(true);
  archive.unpack(dest)
}

fn unpack_zip(reader: BufReader<File>, dest: &Path) -> io::Result<()> {
  let mut archive = zip::ZipArchive::new(reader).map_err(io::Error::other)?;

  for i in 0..archive.len() {
    let mut file = archive.by_index(i).map_err(io::Error::other)?;

    let path = file
      .enclosed_name()
      .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, format!("unsafe entry name: {}", file.name())))?;
    let dest_path = dest.join(path);

    if file.is_dir() {
      fs::create_dir_all(&dest_path)?;
      continue;
    }

    if let Some(parent) = dest_path.parent() {
      fs::create_dir_all(parent)?;
    }

    let mut outfile = File::create(&dest_path)?;
    io::copy(&mut file, &mut outfile)?;

    #[cfg(unix)]
    {
      use std::os::unix::fs::PermissionsExt;
      if let Some(mode) = file.unix_mode() {
        fs::set_permissions(&dest_path, fs::Permissions::from_mode(mode))?;
      }
    }
  }

  Ok(())
}
