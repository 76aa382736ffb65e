use crate::application::pipeline::PipelineError;
use crate::domain::notification::NotificationError;
use crate::staging::StagingError;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{error, warn};

pub const MISSING_FILENAME: &str = "Bad Request: missing filename.";
pub const INVALID_FILENAME: &str = "Bad Request: invalid filename.";
pub const PROCESSING_FAILED: &str = "Error processing video";
pub const STORAGE_FAILED: &str = "Error accessing video storage";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("malformed request body: {0}")]
    Body(#[from] JsonRejection),

    #[error("malformed notification: {0}")]
    Notification(#[from] NotificationError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

impl ApiError {
    fn status_and_body(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Notification(NotificationError::InvalidName(_))
            | ApiError::Pipeline(PipelineError::Staging(StagingError::InvalidName(_))) => {
                (StatusCode::BAD_REQUEST, INVALID_FILENAME)
            }
            ApiError::Body(_) | ApiError::Notification(_) => {
                (StatusCode::BAD_REQUEST, MISSING_FILENAME)
            }
            ApiError::Pipeline(PipelineError::Storage(_)) => (StatusCode::BAD_GATEWAY, STORAGE_FAILED),
            ApiError::Pipeline(PipelineError::Transcode(_))
            | ApiError::Pipeline(PipelineError::Staging(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, PROCESSING_FAILED)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        if status.is_server_error() {
            error!("{}", self);
        } else {
            warn!("{}", self);
        }
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::storage::StorageError;
    use crate::ports::transcoder::TranscodeError;
    use std::time::Duration;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (
                ApiError::Notification(NotificationError::MissingName),
                StatusCode::BAD_REQUEST,
                MISSING_FILENAME,
            ),
            (
                ApiError::Notification(NotificationError::InvalidName("../x".into())),
                StatusCode::BAD_REQUEST,
                INVALID_FILENAME,
            ),
            (
                ApiError::Pipeline(PipelineError::Transcode(TranscodeError::TimedOut(
                    Duration::from_secs(1),
                ))),
                StatusCode::INTERNAL_SERVER_ERROR,
                PROCESSING_FAILED,
            ),
            (
                ApiError::Pipeline(PipelineError::Storage(StorageError::NotFound {
                    bucket: "raw-videos".into(),
                    key: "video1.mp4".into(),
                })),
                StatusCode::BAD_GATEWAY,
                STORAGE_FAILED,
            ),
            (
                ApiError::Pipeline(PipelineError::Staging(StagingError::Reserve {
                    path: "raw-videos/video1.mp4".into(),
                    source: std::io::Error::from(std::io::ErrorKind::NotFound),
                })),
                StatusCode::INTERNAL_SERVER_ERROR,
                PROCESSING_FAILED,
            ),
            (
                ApiError::Pipeline(PipelineError::Staging(StagingError::CreateDir {
                    path: "raw-videos".into(),
                    source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
                })),
                StatusCode::INTERNAL_SERVER_ERROR,
                PROCESSING_FAILED,
            ),
        ];

        for (error, status, body) in cases {
            assert_eq!(error.status_and_body(), (status, body), "{error}");
        }
    }
}
