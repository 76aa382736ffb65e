//! Inbound HTTP adapter.

pub mod error;

use crate::application::pipeline::VideoPipeline;
use crate::domain::notification::PushEnvelope;
use crate::ports::storage::StoragePort;
use crate::ports::transcoder::Transcoder;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use error::ApiError;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

pub const PROCESSED: &str = "Video processed successfully";

pub fn router<S, T>(pipeline: Arc<VideoPipeline<S, T>>) -> Router
where
    S: StoragePort + 'static,
    T: Transcoder + 'static,
{
    Router::new()
        .route("/process-video", post(process_video::<S, T>))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(pipeline)
}

/// Push endpoint for raw-bucket notifications.
async fn process_video<S, T>(
    State(pipeline): State<Arc<VideoPipeline<S, T>>>,
    payload: Result<Json<PushEnvelope>, JsonRejection>,
) -> Result<(StatusCode, &'static str), ApiError>
where
    S: StoragePort,
    T: Transcoder,
{
    let Json(envelope) = payload?;
    let raw_name = envelope.object_name()?;
    info!("Received notification for {}", raw_name);

    pipeline.process(&raw_name).await?;

    Ok((StatusCode::OK, PROCESSED))
}

async fn health() -> &'static str {
    "ok"
}
