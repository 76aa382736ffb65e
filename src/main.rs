//! Server binary
//!
//! Wires up:
//! - Storage adapters for the raw and processed buckets (S3 or local directories)
//! - The ffmpeg transcoder
//! - The HTTP push endpoint
//!
//! See `ServiceConfig` for the environment variables read at startup.

use std::error::Error;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use video_processing_service::adapters::ffmpeg::cmd::RealFfmpegExecutor;
use video_processing_service::adapters::ffmpeg::FfmpegTranscoder;
use video_processing_service::adapters::http::router;
use video_processing_service::adapters::local::FsAdapter;
use video_processing_service::domain::transcode::ScaleFilter;
use video_processing_service::ports::storage::StoragePort;
use video_processing_service::ports::transcoder::Transcoder;
use video_processing_service::staging::StagingDirs;
use video_processing_service::{ServiceConfig, StorageBackend, VideoPipeline};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServiceConfig::from_env().map_err(|e| {
        error!("Invalid configuration: {}", e);
        e
    })?;

    // Directories must exist before the first request is served.
    let staging = StagingDirs::new(&config.raw_staging_dir, &config.processed_staging_dir);
    staging.setup().await?;

    let transcoder = FfmpegTranscoder::new(
        RealFfmpegExecutor::new(&config.ffmpeg_bin),
        ScaleFilter::short_edge(config.target_short_edge),
        config.transcode_timeout,
    );

    match &config.storage {
        #[cfg(feature = "aws")]
        StorageBackend::S3 => {
            use video_processing_service::adapters::aws::s3::S3Adapter;

            let sdk_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
            let client = aws_sdk_s3::Client::new(&sdk_config);
            let pipeline = VideoPipeline::new(
                S3Adapter::new(client.clone(), &config.raw_bucket),
                S3Adapter::new(client, &config.processed_bucket),
                transcoder,
                staging,
            );
            serve(&config, pipeline).await
        }
        #[cfg(not(feature = "aws"))]
        StorageBackend::S3 => {
            Err("built without the `aws` feature, set STORAGE_BACKEND=local".into())
        }
        StorageBackend::Local { root } => {
            info!("Using local storage under {}", root.display());
            let pipeline = VideoPipeline::new(
                FsAdapter::new(root, &config.raw_bucket),
                FsAdapter::new(root, &config.processed_bucket),
                transcoder,
                staging,
            );
            serve(&config, pipeline).await
        }
    }
}

async fn serve<S, T>(config: &ServiceConfig, pipeline: VideoPipeline<S, T>) -> Result<(), Box<dyn Error>>
where
    S: StoragePort + 'static,
    T: Transcoder + 'static,
{
    let app = router(Arc::new(pipeline));

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    info!("Server running at http://{}", config.bind_address());
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutting down");
}
