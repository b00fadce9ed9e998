use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("save directory missing: {0}")]
    MissingDirectory(PathBuf),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Atomically write `bytes` to `target` by writing a temp file in the same
/// directory then renaming it over the target.
pub fn write_atomically(target: &Path, bytes: &[u8]) -> Result<(), PersistError> {
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    if !dir.is_dir() {
        return Err(PersistError::MissingDirectory(dir.to_path_buf()));
    }

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.flush()?;
    tmp.as_file_mut().sync_all()?;
    tmp.persist(target).map_err(|e| PersistError::Io(e.error))?;
    Ok(())
}
