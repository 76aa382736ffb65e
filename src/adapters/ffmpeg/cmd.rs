use async_trait::async_trait;
use std::io;
use std::process::{Output, Stdio};
use tokio::process::Command as TokioCommand;

/// Runs the ffmpeg executable. Split out so the transcoder can be tested without ffmpeg.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FfmpegExecutor: Send + Sync {
    async fn run_ffmpeg(&self, args: Vec<String>) -> io::Result<Output>;
}

pub struct RealFfmpegExecutor {
    binary: String,
}

impl RealFfmpegExecutor {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for RealFfmpegExecutor {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

#[async_trait]
impl FfmpegExecutor for RealFfmpegExecutor {
    async fn run_ffmpeg(&self, args: Vec<String>) -> io::Result<Output> {
        // The child is killed if this future is dropped, e.g. on timeout.
        TokioCommand::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
    }
}
