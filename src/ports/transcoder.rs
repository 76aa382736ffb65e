use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error("failed to start transcoder: {0}")]
    Spawn(#[source] io::Error),

    #[error("transcoder exited unsuccessfully (code {exit_code:?}): {stderr}")]
    Failed {
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("transcoding did not finish within {0:?}")]
    TimedOut(Duration),

    #[error("transcoder reported success but {0} was not written")]
    MissingOutput(PathBuf),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Convert the video at `input` into `output`
    async fn convert(&self, input: &Path, output: &Path) -> Result<(), TranscodeError>;
}
