//! Per-run content-addressed file store.
//!
//! Stands in for the file-store half of the "external distributed job
//! engine" collaborator: a place jobs can stash local files so that another
//! job, possibly on a different scheduled unit, can read them back by
//! handle rather than by raw path. Grounded in `runtime::fs_utils`'s
//! directory-management helpers and `WorkflowDirectory` layout.

use crate::runtime::error::{RuntimeError, RuntimeResult};
use crate::runtime::fs_utils::{copy_file, create_dir_all};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// A run-scoped directory of imported/virtualized files, addressed by an
/// opaque key rather than by their original path.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: PathBuf) -> RuntimeResult<Self> {
        create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Copy a local file into the store under a fresh key, returning the
    /// key. Used when a Task Job's output file must survive past the task's
    /// own (possibly cleaned-up) working directory.
    pub fn import_local(&self, source: &Path) -> RuntimeResult<String> {
        let key = Uuid::new_v4().to_string();
        let dest_dir = self.root.join(&key);
        create_dir_all(&dest_dir)?;
        let file_name = source.file_name().ok_or_else(|| RuntimeError::FileSystemError {
            message: format!("source path has no file name: {}", source.display()),
            path: Some(source.display().to_string()),
            io_error: std::io::Error::new(std::io::ErrorKind::InvalidInput, "no file name"),
        })?;
        let dest = dest_dir.join(file_name);
        copy_file(source, &dest)?;
        Ok(key)
    }

    /// Resolve a key (previously returned by `import_local`) back to the
    /// path of the stored file.
    pub fn resolve(&self, key: &str) -> RuntimeResult<PathBuf> {
        let dest_dir = self.root.join(key);
        let mut entries = std::fs::read_dir(&dest_dir).map_err(|e| RuntimeError::FileSystemError {
            message: format!("file store entry '{}' not found", key),
            path: Some(dest_dir.display().to_string()),
            io_error: e,
        })?;
        let entry = entries
            .next()
            .ok_or_else(|| RuntimeError::FileSystemError {
                message: format!("file store entry '{}' is empty", key),
                path: Some(dest_dir.display().to_string()),
                io_error: std::io::Error::new(std::io::ErrorKind::NotFound, "empty entry"),
            })?
            .map_err(|e| RuntimeError::FileSystemError {
                message: format!("failed to read file store entry '{}'", key),
                path: Some(dest_dir.display().to_string()),
                io_error: e,
            })?;
        Ok(entry.path())
    }

    /// Allocate a fresh scratch directory for a scheduled unit's local
    /// temporary work (e.g. a Task Job's shell working directory).
    pub fn local_temp_dir(&self, label: &str) -> RuntimeResult<PathBuf> {
        let dir = self.root.join("tmp").join(format!("{}-{}", label, Uuid::new_v4()));
        create_dir_all(&dir)?;
        Ok(dir)
    }
}
