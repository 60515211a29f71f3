//! Per-job working directories
//!
//! Every submission is staged under its own uuid-named directory so
//! concurrent jobs never share files. The layout is fixed: `src/` holds the
//! staged source and test inputs, `build/` holds compiler output.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

/// Errors that occur while managing a job workspace
#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("failed to create directory {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid file name: {0}")]
    InvalidName(String),

    #[error("file already staged at {0}")]
    AlreadyStaged(PathBuf),

    #[error("failed to remove workspace {path}: {source}")]
    Cleanup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A private working directory for one submission
///
/// # Cleanup
///
/// Call [`cleanup()`](Self::cleanup) explicitly when the job is done. The
/// `Drop` implementation removes the directory best-effort and logs a warning,
/// but its result cannot be observed.
#[derive(Debug)]
pub struct JobWorkspace {
    /// Job ID, also the directory name
    id: Uuid,

    /// Absolute path of the workspace directory
    root: PathBuf,

    /// Whether cleanup already ran
    removed: bool,
}

impl JobWorkspace {
    /// Create a fresh workspace under `base`
    ///
    /// The workspace directory is named after a new v4 uuid, so two jobs can
    /// never collide even when created in the same instant.
    #[instrument(skip(base))]
    pub async fn create(base: &Path) -> Result<Self, WorkspaceError> {
        tokio::fs::create_dir_all(base)
            .await
            .map_err(|source| WorkspaceError::Create {
                path: base.to_path_buf(),
                source,
            })?;

        let id = Uuid::new_v4();
        let root = base.join(id.to_string());
        // create_dir rather than create_dir_all: a collision on a fresh uuid
        // means something else owns this path, which must fail loudly
        for dir in [root.clone(), root.join("src"), root.join("build")] {
            tokio::fs::create_dir(&dir)
                .await
                .map_err(|source| WorkspaceError::Create { path: dir, source })?;
        }

        debug!(%id, path = %root.display(), "created job workspace");

        Ok(Self {
            id,
            root,
            removed: false,
        })
    }

    /// Get the job ID
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Get the workspace root directory
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Get the directory the source file is staged into
    pub fn src_dir(&self) -> PathBuf {
        self.root.join("src")
    }

    /// Get the directory compiler output is written into
    pub fn build_dir(&self) -> PathBuf {
        self.root.join("build")
    }

    /// Write the submission source under `src/`
    ///
    /// Returns the absolute path of the staged file. Rejects names that could
    /// escape the workspace and refuses to overwrite an existing file.
    #[instrument(skip(self, content))]
    pub async fn stage_source(&self, name: &str, content: &str) -> Result<PathBuf, WorkspaceError> {
        if name.is_empty() || name.contains('/') || name.contains("..") {
            return Err(WorkspaceError::InvalidName(name.to_string()));
        }
        let path = self.src_dir().join(name);
        self.write_new(&path, content.as_bytes()).await?;
        debug!(path = %path.display(), len = content.len(), "staged source file");
        Ok(path)
    }

    /// Write one test input under `src/`
    ///
    /// Returns the absolute path of the staged file.
    #[instrument(skip(self, content))]
    pub async fn stage_input(&self, index: usize, content: &str) -> Result<PathBuf, WorkspaceError> {
        let path = self.src_dir().join(format!("input_{index}.txt"));
        self.write_new(&path, content.as_bytes()).await?;
        Ok(path)
    }

    async fn write_new(&self, path: &Path, content: &[u8]) -> Result<(), WorkspaceError> {
        let mut file = match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(WorkspaceError::AlreadyStaged(path.to_path_buf()));
            }
            Err(e) => return Err(WorkspaceError::Io(e)),
        };
        file.write_all(content).await?;
        file.flush().await?;
        Ok(())
    }

    /// Remove the workspace directory and everything in it
    ///
    /// Idempotent: calling it again after a successful removal is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory could not be removed.
    #[must_use = "cleanup errors should be handled"]
    #[instrument(skip(self))]
    pub async fn cleanup(&mut self) -> Result<(), WorkspaceError> {
        if self.removed {
            return Ok(());
        }

        tokio::fs::remove_dir_all(&self.root)
            .await
            .map_err(|source| WorkspaceError::Cleanup {
                path: self.root.clone(),
                source,
            })?;

        self.removed = true;
        debug!(id = %self.id, "job workspace removed");
        Ok(())
    }
}

impl Drop for JobWorkspace {
    fn drop(&mut self) {
        if self.removed {
            return;
        }
        warn!(
            id = %self.id,
            path = %self.root.display(),
            "JobWorkspace dropped without explicit cleanup, removing best-effort"
        );
        if let Err(e) = std::fs::remove_dir_all(&self.root) {
            warn!(id = %self.id, error = %e, "best-effort workspace removal failed");
        }
    }
}
