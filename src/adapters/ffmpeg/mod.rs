//! Transcoder backed by the ffmpeg command line tool.

pub mod cmd;

use crate::domain::transcode::{ffmpeg_args, ScaleFilter};
use crate::ports::transcoder::{TranscodeError, Transcoder};
use async_trait::async_trait;
use cmd::FfmpegExecutor;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, error, info};

/// Lines of ffmpeg stderr kept in errors and logs.
const STDERR_TAIL_LINES: usize = 20;

pub struct FfmpegTranscoder<E> {
    executor: E,
    filter: ScaleFilter,
    timeout: Duration,
}

impl<E: FfmpegExecutor> FfmpegTranscoder<E> {
    pub fn new(executor: E, filter: ScaleFilter, timeout: Duration) -> Self {
        Self {
            executor,
            filter,
            timeout,
        }
    }
}

#[async_trait]
impl<E: FfmpegExecutor> Transcoder for FfmpegTranscoder<E> {
    async fn convert(&self, input: &Path, output: &Path) -> Result<(), TranscodeError> {
        let args = ffmpeg_args(input, output, &self.filter);
        debug!(?args, "Running ffmpeg");

        let process = match tokio::time::timeout(self.timeout, self.executor.run_ffmpeg(args)).await
        {
            Ok(result) => result.map_err(TranscodeError::Spawn)?,
            Err(_) => {
                error!(
                    "Transcoding {} exceeded {:?}, giving up",
                    input.display(),
                    self.timeout
                );
                return Err(TranscodeError::TimedOut(self.timeout));
            }
        };

        if !process.status.success() {
            let stderr = stderr_tail(&process.stderr);
            error!("Error processing video {}: {}", input.display(), stderr);
            return Err(TranscodeError::Failed {
                exit_code: process.status.code(),
                stderr,
            });
        }

        if tokio::fs::metadata(output).await.is_err() {
            return Err(TranscodeError::MissingOutput(output.to_path_buf()));
        }

        info!("Processing finished: {}", output.display());
        Ok(())
    }
}

fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.trim().lines().collect();
    lines[lines.len().saturating_sub(STDERR_TAIL_LINES)..].join("\n")
}
