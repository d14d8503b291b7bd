//! Exclusive advisory lock serialising botctl invocations.
//!
//! Every operation that reads and then rewrites or deletes the
//! Lifecycle Record holds this lock for its whole duration.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::{Result, SupervisorError};

/// Held lock on `<record>.lock`. Released when dropped.
#[derive(Debug)]
pub struct SupervisorLock {
    file: File,
    path: PathBuf,
}

impl SupervisorLock {
    /// Takes the lock without waiting.
    ///
    /// Fails with [`SupervisorError::Busy`] if another invocation holds it.
    pub fn acquire(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| SupervisorError::storage(parent, e))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(path)
            .map_err(|e| SupervisorError::storage(path, e))?;

        match file.try_lock_exclusive() {
            Ok(()) => {}
            Err(e) if is_contended(&e) => {
                return Err(SupervisorError::Busy {
                    path: path.to_path_buf(),
                });
            }
            Err(e) => return Err(SupervisorError::storage(path, e)),
        }

        tracing::debug!(lock = %path.display(), "lock acquired");
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for SupervisorLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

fn is_contended(e: &io::Error) -> bool {
    e.kind() == io::ErrorKind::WouldBlock
        || e.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}
