//! Video processing service.
//!
//! Receives a push notification naming a newly uploaded raw video, downloads it,
//! rescales it with ffmpeg, and publishes the result to the processed bucket.
//!
//! Hexagonal Architecture:
//! - domain/: Notification decoding and the scale filter
//! - ports/: Trait definitions (storage, transcoder)
//! - adapters/: Concrete implementations (S3, local filesystem, ffmpeg, HTTP)
//! - application/: The processing pipeline
//! - staging: Local working directories
//! - config: Environment configuration
//!
//! # Features
//! - `aws` (default): S3 storage backend

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod staging;

pub use application::pipeline::{PipelineError, ProcessedVideo, VideoPipeline};
pub use config::{ServiceConfig, StorageBackend};
