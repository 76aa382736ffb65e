//! Configuration loaded from the process environment.

use std::env;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be {expected}, got {value:?}")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Where processed and raw objects live.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StorageBackend {
    /// S3 (or S3-compatible) object storage through the AWS SDK.
    S3,
    /// Buckets are directories under `root`.
    Local { root: PathBuf },
}

#[derive(Clone, Debug)]
pub struct ServiceConfig {
    /// HTTP server bind address
    pub addr: String,
    /// HTTP server port
    pub port: u16,
    /// Bucket the upstream uploader writes raw videos to
    pub raw_bucket: String,
    /// Bucket processed videos are published to
    pub processed_bucket: String,
    /// Local directory raw videos are downloaded into
    pub raw_staging_dir: PathBuf,
    /// Local directory the transcoder writes into
    pub processed_staging_dir: PathBuf,
    pub storage: StorageBackend,
    /// ffmpeg executable name or path
    pub ffmpeg_bin: String,
    /// Short-edge size of the processed video, in pixels
    pub target_short_edge: u32,
    pub transcode_timeout: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            addr: String::from("0.0.0.0"),
            port: 3000,
            raw_bucket: String::from("raw-videos"),
            processed_bucket: String::from("processed-videos"),
            raw_staging_dir: PathBuf::from("./raw-videos"),
            processed_staging_dir: PathBuf::from("./processed-videos"),
            storage: StorageBackend::S3,
            ffmpeg_bin: String::from("ffmpeg"),
            target_short_edge: 360,
            transcode_timeout: Duration::from_secs(900),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from environment variables, reading `.env` first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup. Missing keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = match lookup("PORT") {
            Some(value) => value.trim().parse::<u16>().map_err(|_| ConfigError::Invalid {
                var: "PORT",
                expected: "a port number",
                value,
            })?,
            None => defaults.port,
        };

        let storage = match lookup("STORAGE_BACKEND").as_deref().map(str::trim) {
            None | Some("s3") => StorageBackend::S3,
            Some("local") => StorageBackend::Local {
                root: lookup("LOCAL_STORAGE_ROOT")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("./buckets")),
            },
            Some(other) => {
                return Err(ConfigError::Invalid {
                    var: "STORAGE_BACKEND",
                    expected: "one of `s3`, `local`",
                    value: other.to_string(),
                })
            }
        };

        let target_short_edge = match lookup("TARGET_SHORT_EDGE") {
            Some(value) => match value.trim().parse::<u32>() {
                Ok(edge) if edge > 0 && edge % 2 == 0 => edge,
                _ => {
                    return Err(ConfigError::Invalid {
                        var: "TARGET_SHORT_EDGE",
                        expected: "a positive even integer",
                        value,
                    })
                }
            },
            None => defaults.target_short_edge,
        };

        let transcode_timeout = match lookup("TRANSCODE_TIMEOUT_SECS") {
            Some(value) => match value.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::Invalid {
                        var: "TRANSCODE_TIMEOUT_SECS",
                        expected: "a positive number of seconds",
                        value,
                    })
                }
            },
            None => defaults.transcode_timeout,
        };

        Ok(Self {
            addr: lookup("ADDR").unwrap_or(defaults.addr),
            port,
            raw_bucket: lookup("RAW_VIDEO_BUCKET").unwrap_or(defaults.raw_bucket),
            processed_bucket: lookup("PROCESSED_VIDEO_BUCKET").unwrap_or(defaults.processed_bucket),
            raw_staging_dir: lookup("RAW_STAGING_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.raw_staging_dir),
            processed_staging_dir: lookup("PROCESSED_STAGING_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.processed_staging_dir),
            storage,
            ffmpeg_bin: lookup("FFMPEG_BIN").unwrap_or(defaults.ffmpeg_bin),
            target_short_edge,
            transcode_timeout,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.addr, self.port)
    }
}
