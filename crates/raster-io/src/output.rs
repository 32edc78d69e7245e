//! All-or-nothing output writing.
//!
//! Every output is first written to a temporary file in its destination
//! directory, then all of them are renamed into place. A failure before the
//! rename phase leaves every destination untouched. A failure during it
//! undoes the renames already done by the same batch: new files are removed
//! and files that existed before the batch are moved back from their backups.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::{NamedTempFile, TempPath};
use tracing::{debug, warn};

use crate::error::{RasterError, Result};

/// A set of encoded outputs waiting to be committed together.
#[derive(Debug, Default)]
pub struct OutputBatch {
    staged: Vec<(PathBuf, NamedTempFile)>,
}

impl OutputBatch {
    /// Create an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Write `bytes` to a temporary file next to `path`.
    pub fn stage(&mut self, path: impl AsRef<Path>, bytes: &[u8]) -> Result<()> {
        let path = path.as_ref();
        let mut tmp = NamedTempFile::new_in(staging_dir(path)).map_err(|e| RasterError::write_failed(path, e))?;
        tmp.write_all(bytes)
            .and_then(|_| tmp.flush())
            .map_err(|e| RasterError::write_failed(path, e))?;

        debug!(path = %path.display(), bytes = bytes.len(), "Staged output");
        self.staged.push((path.to_path_buf(), tmp));
        Ok(())
    }

    /// Number of staged outputs.
    pub fn len(&self) -> usize {
        self.staged.len()
    }

    /// True when nothing is staged.
    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }

    /// Move every staged file to its destination.
    ///
    /// Returns the destination paths in staging order.
    pub fn commit(self) -> Result<Vec<PathBuf>> {
        let mut done: Vec<(PathBuf, Option<TempPath>)> = Vec::with_capacity(self.staged.len());

        for (path, tmp) in self.staged {
            let backup = match backup_existing(&path) {
                Ok(backup) => backup,
                Err(e) => {
                    roll_back(done);
                    return Err(RasterError::write_failed(&path, e));
                }
            };
            if let Err(err) = tmp.persist(&path) {
                roll_back(vec![(path.clone(), backup)]);
                roll_back(done);
                return Err(RasterError::write_failed(&path, err.error));
            }
            done.push((path, backup));
        }

        // Dropping the backups deletes them.
        Ok(done.into_iter().map(|(path, _)| path).collect())
    }
}

fn staging_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Move an existing destination aside so a failed batch can restore it.
fn backup_existing(path: &Path) -> std::io::Result<Option<TempPath>> {
    if !path.exists() {
        return Ok(None);
    }
    let backup = NamedTempFile::new_in(staging_dir(path))?.into_temp_path();
    fs::rename(path, &backup)?;
    debug!(path = %path.display(), backup = %backup.display(), "Backed up existing output");
    Ok(Some(backup))
}

/// Undo committed renames, newest first.
fn roll_back(done: Vec<(PathBuf, Option<TempPath>)>) {
    for (path, backup) in done.into_iter().rev() {
        let restored = match &backup {
            Some(backup) => fs::rename(backup, &path),
            None => match fs::remove_file(&path) {
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                other => other,
            },
        };
        if let Err(e) = restored {
            warn!(path = %path.display(), error = %e, "Failed to roll back output");
        }
    }
}

/// Write a single file atomically.
pub fn write_atomic(path: impl AsRef<Path>, bytes: &[u8]) -> Result<PathBuf> {
    let mut batch = OutputBatch::new();
    batch.stage(path.as_ref(), bytes)?;
    let mut written = batch.commit()?;
    Ok(written.remove(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_writes_all() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");

        let mut batch = OutputBatch::new();
        batch.stage(&a, b"first").unwrap();
        batch.stage(&b, b"second").unwrap();
        assert_eq!(batch.len(), 2);
        assert!(!a.exists());

        let written = batch.commit().unwrap();
        assert_eq!(written, vec![a.clone(), b.clone()]);
        assert_eq!(fs::read(&a).unwrap(), b"first");
        assert_eq!(fs::read(&b).unwrap(), b"second");
    }

    #[test]
    fn test_stage_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("missing").join("out.vtk");

        let mut batch = OutputBatch::new();
        let err = batch.stage(&target, b"data").unwrap_err();
        assert!(matches!(err, RasterError::WriteFailed { .. }));
        assert!(!target.exists());
    }

    #[test]
    fn test_dropped_batch_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.bin");
        {
            let mut batch = OutputBatch::new();
            batch.stage(&target, b"abc").unwrap();
        }
        assert!(!target.exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_failed_commit_restores_previous_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let mesh = dir.path().join("output.vtk");
        let sub = dir.path().join("textures");
        fs::create_dir(&sub).unwrap();
        fs::write(&mesh, b"last good mesh").unwrap();

        let mut batch = OutputBatch::new();
        batch.stage(&mesh, b"new mesh").unwrap();
        batch.stage(sub.join("satellite.png"), b"png").unwrap();
        // The second rename fails once its staging directory is gone.
        fs::remove_dir_all(&sub).unwrap();

        let err = batch.commit().unwrap_err();
        assert!(matches!(err, RasterError::WriteFailed { .. }));
        assert_eq!(fs::read(&mesh).unwrap(), b"last good mesh");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_failed_commit_removes_new_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let mesh = dir.path().join("output.vtk");
        let sub = dir.path().join("textures");
        fs::create_dir(&sub).unwrap();

        let mut batch = OutputBatch::new();
        batch.stage(&mesh, b"new mesh").unwrap();
        batch.stage(sub.join("satellite.png"), b"png").unwrap();
        fs::remove_dir_all(&sub).unwrap();

        assert!(batch.commit().is_err());
        assert!(!mesh.exists());
    }

    #[test]
    fn test_write_atomic_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.txt");
        fs::write(&target, b"old").unwrap();
        write_atomic(&target, b"new").unwrap();
        assert_eq!(fs::read(&target).unwrap(), b"new");
    }
}
