use crate::ports::storage::{StorageError, StoragePort};
use crate::ports::transcoder::{TranscodeError, Transcoder};
use crate::staging::{StagedVideo, StagingDirs, StagingError};
use thiserror::Error;
use tracing::{info, instrument, warn};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Transcode(#[from] TranscodeError),

    #[error(transparent)]
    Staging(#[from] StagingError),
}

/// Where a processed video ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedVideo {
    pub raw_name: String,
    pub processed_name: String,
}

/// Download → convert → upload → publish, with local cleanup on every path.
pub struct VideoPipeline<S, T> {
    raw_storage: S,
    processed_storage: S,
    transcoder: T,
    staging: StagingDirs,
}

impl<S, T> VideoPipeline<S, T>
where
    S: StoragePort,
    T: Transcoder,
{
    pub fn new(raw_storage: S, processed_storage: S, transcoder: T, staging: StagingDirs) -> Self {
        Self {
            raw_storage,
            processed_storage,
            transcoder,
            staging,
        }
    }

    pub fn staging(&self) -> &StagingDirs {
        &self.staging
    }

    /// Process raw object `raw_name`.
    ///
    /// Both local copies are deleted before this returns, whatever the
    /// outcome. A failed deletion is logged and does not change the result.
    #[instrument(skip(self), fields(processed = tracing::field::Empty))]
    pub async fn process(&self, raw_name: &str) -> Result<ProcessedVideo, PipelineError> {
        let staged = self.staging.stage(raw_name)?;
        tracing::Span::current().record("processed", staged.processed_name());

        let result = self.run(&staged).await;

        if let Err(e) = staged.cleanup().await {
            warn!("Cleanup after processing {} failed: {}", raw_name, e);
        }

        result
    }

    async fn run(&self, staged: &StagedVideo) -> Result<ProcessedVideo, PipelineError> {
        // Local problems are reported as such, not as storage failures.
        staged.reserve().await?;

        self.raw_storage
            .download(staged.raw_name(), staged.raw_path())
            .await?;

        self.transcoder
            .convert(staged.raw_path(), staged.processed_path())
            .await?;

        self.processed_storage
            .upload(staged.processed_path(), staged.processed_name())
            .await?;
        self.processed_storage
            .make_public(staged.processed_name())
            .await?;

        info!("{} processed and published", staged.processed_name());
        Ok(ProcessedVideo {
            raw_name: staged.raw_name().to_string(),
            processed_name: staged.processed_name().to_string(),
        })
    }
}
