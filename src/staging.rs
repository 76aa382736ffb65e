//! Local staging directories for videos in flight.
//!
//! A request stages at most two files: the downloaded raw video and the
//! transcoder's output. [`StagedVideo`] owns both paths for the lifetime of the
//! request and removes them on every exit path.

use futures::join;
use std::io;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Prefix given to the processed copy of a raw video.
pub const PROCESSED_PREFIX: &str = "processed-";

#[derive(Debug, Error)]
pub enum StagingError {
    #[error("failed to create directory {path}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("failed to delete {path}: {source}")]
    Delete { path: PathBuf, source: io::Error },

    #[error("cannot stage {path}: {source}")]
    Reserve { path: PathBuf, source: io::Error },

    #[error("invalid file name {0:?}")]
    InvalidName(String),
}

/// Create `path` if it does not exist yet. Existing contents are left alone.
pub async fn ensure_directory(path: &Path) -> Result<(), StagingError> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_dir() => return Ok(()),
        _ => {}
    }

    tokio::fs::create_dir_all(path)
        .await
        .map_err(|source| StagingError::CreateDir {
            path: path.to_path_buf(),
            source,
        })?;
    info!("Directory created at {}", path.display());
    Ok(())
}

/// Delete the file at `path`. Returns `Ok(false)` without touching the
/// filesystem when there is nothing to delete.
pub async fn delete_if_exists(path: &Path) -> Result<bool, StagingError> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {
            info!("File deleted at {}", path.display());
            Ok(true)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!("File not found at {}, skipping the delete", path.display());
            Ok(false)
        }
        Err(source) => {
            warn!("Error deleting file {}: {}", path.display(), source);
            Err(StagingError::Delete {
                path: path.to_path_buf(),
                source,
            })
        }
    }
}

/// Name of the processed artifact for a raw video name.
pub fn processed_name(raw_name: &str) -> String {
    format!("{}{}", PROCESSED_PREFIX, raw_name)
}

/// A file name is stageable when it is a single normal path component.
pub fn is_valid_file_name(name: &str) -> bool {
    if name.is_empty() || name.contains(['/', '\\', '\0']) {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// The raw and processed staging directories.
#[derive(Clone, Debug)]
pub struct StagingDirs {
    raw: PathBuf,
    processed: PathBuf,
}

impl StagingDirs {
    pub fn new(raw: impl Into<PathBuf>, processed: impl Into<PathBuf>) -> Self {
        Self {
            raw: raw.into(),
            processed: processed.into(),
        }
    }

    pub fn raw_dir(&self) -> &Path {
        &self.raw
    }

    pub fn processed_dir(&self) -> &Path {
        &self.processed
    }

    /// Make sure both directories exist. Safe to call repeatedly.
    pub async fn setup(&self) -> Result<(), StagingError> {
        ensure_directory(&self.raw).await?;
        ensure_directory(&self.processed).await
    }

    /// Reserve the local paths for `raw_name` and its processed copy.
    pub fn stage(&self, raw_name: &str) -> Result<StagedVideo, StagingError> {
        if !is_valid_file_name(raw_name) {
            return Err(StagingError::InvalidName(raw_name.to_string()));
        }
        let processed_name = processed_name(raw_name);

        Ok(StagedVideo {
            raw_path: self.raw.join(raw_name),
            processed_path: self.processed.join(&processed_name),
            raw_name: raw_name.to_string(),
            processed_name,
            cleaned: false,
        })
    }
}

/// Local paths held by one request.
///
/// Call [`StagedVideo::cleanup`] once the request is done with them. If the
/// value is dropped before that (the request future was cancelled), the files
/// are removed synchronously in `Drop`.
#[derive(Debug)]
pub struct StagedVideo {
    raw_name: String,
    processed_name: String,
    raw_path: PathBuf,
    processed_path: PathBuf,
    cleaned: bool,
}

impl StagedVideo {
    pub fn raw_name(&self) -> &str {
        &self.raw_name
    }

    pub fn processed_name(&self) -> &str {
        &self.processed_name
    }

    pub fn raw_path(&self) -> &Path {
        &self.raw_path
    }

    pub fn processed_path(&self) -> &Path {
        &self.processed_path
    }

    /// Check both local paths can be written before any transfer starts.
    ///
    /// Leaves an empty raw file behind for the download to overwrite. The
    /// processed path is not created, the transcoder must produce it.
    pub async fn reserve(&self) -> Result<(), StagingError> {
        tokio::fs::File::create(&self.raw_path)
            .await
            .map_err(|source| StagingError::Reserve {
                path: self.raw_path.clone(),
                source,
            })?;

        let processed_dir = self.processed_path.parent().unwrap_or(Path::new("."));
        match tokio::fs::metadata(processed_dir).await {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(StagingError::Reserve {
                path: processed_dir.to_path_buf(),
                source: io::Error::new(io::ErrorKind::Other, "not a directory"),
            }),
            Err(source) => Err(StagingError::Reserve {
                path: processed_dir.to_path_buf(),
                source,
            }),
        }
    }

    /// Delete both staged files concurrently and wait for both.
    ///
    /// Each deletion is attempted even if the other fails; the first error is returned.
    pub async fn cleanup(mut self) -> Result<(), StagingError> {
        let (raw, processed) = join!(
            delete_if_exists(&self.raw_path),
            delete_if_exists(&self.processed_path)
        );
        // Only now: a cancelled cleanup leaves the removal to `Drop`.
        self.cleaned = true;
        raw.and(processed).map(|_| ())
    }
}

impl Drop for StagedVideo {
    fn drop(&mut self) {
        if self.cleaned {
            return;
        }
        for path in [&self.raw_path, &self.processed_path] {
            match std::fs::remove_file(path) {
                Ok(()) => debug!("Removed abandoned staging file {}", path.display()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => warn!("Failed to remove abandoned staging file {}: {}", path.display(), e),
            }
        }
    }
}
