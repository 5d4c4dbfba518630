//! Run-scoped temporary resources.
//!
//! Every pipeline run owns one scratch directory. Artifacts are registered
//! the moment they are created; finalization removes them in reverse creation
//! order and then the directory itself, on every exit path. Removal failures
//! are logged and never surfaced, so they cannot mask the error that ended
//! the run.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tempfile::TempDir;
use tracing::{debug, warn};

use crate::error::{Result, SubcastError};

pub struct Scratch {
    dir: Option<TempDir>,
    registered: Mutex<Vec<PathBuf>>,
}

impl Scratch {
    /// Create a uniquely named scratch directory for one pipeline run.
    pub fn new() -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("subcast-")
            .tempdir()
            .map_err(|e| {
                SubcastError::Internal(format!("failed to create scratch directory: {e}"))
            })?;
        debug!("Created scratch directory {:?}", dir.path());
        Ok(Self {
            dir: Some(dir),
            registered: Mutex::new(Vec::new()),
        })
    }

    pub fn path(&self) -> &Path {
        self.dir
            .as_ref()
            .expect("scratch directory lives until drop")
            .path()
    }

    /// Register a path for removal at the end of the run, returning it for
    /// chaining. Registering a path that never materializes is harmless.
    pub fn register(&self, path: impl Into<PathBuf>) -> PathBuf {
        let path = path.into();
        self.registered
            .lock()
            .expect("scratch registry poisoned")
            .push(path.clone());
        path
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        let files = std::mem::take(
            &mut *self
                .registered
                .lock()
                .expect("scratch registry poisoned"),
        );
        for path in files.iter().rev() {
            match std::fs::remove_file(path) {
                Ok(()) => debug!("Removed temp file {:?}", path),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!("Failed to remove temp file {:?}: {}", path, e),
            }
        }
        if let Some(dir) = self.dir.take() {
            let path = dir.path().to_path_buf();
            if let Err(e) = dir.close() {
                warn!("Failed to remove scratch directory {:?}: {}", path, e);
            } else {
                debug!("Removed scratch directory {:?}", path);
            }
        }
    }
}
