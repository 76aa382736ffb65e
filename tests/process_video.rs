use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::path::Path;
use std::sync::Arc;
use tempfile::{tempdir, TempDir};
use tower::ServiceExt;
use video_processing_service::adapters::http::router;
use video_processing_service::adapters::local::FsAdapter;
use video_processing_service::ports::transcoder::{TranscodeError, Transcoder};
use video_processing_service::staging::StagingDirs;
use video_processing_service::VideoPipeline;

/// Copies the input instead of scaling it.
struct CopyTranscoder;

#[async_trait]
impl Transcoder for CopyTranscoder {
    async fn convert(&self, input: &Path, output: &Path) -> Result<(), TranscodeError> {
        tokio::fs::copy(input, output)
            .await
            .map_err(TranscodeError::Spawn)?;
        Ok(())
    }
}

/// Rejects every input, after leaving a partial output behind.
struct CorruptInputTranscoder;

#[async_trait]
impl Transcoder for CorruptInputTranscoder {
    async fn convert(&self, _input: &Path, output: &Path) -> Result<(), TranscodeError> {
        tokio::fs::write(output, b"partial")
            .await
            .map_err(TranscodeError::Spawn)?;
        Err(TranscodeError::Failed {
            exit_code: Some(1),
            stderr: "Invalid data found when processing input".to_string(),
        })
    }
}

struct Harness {
    _temp_dir: TempDir,
    buckets: std::path::PathBuf,
    staging: StagingDirs,
    app: Router,
}

impl Harness {
    async fn new<T: Transcoder + 'static>(transcoder: T) -> Self {
        let temp_dir = tempdir().unwrap();
        let buckets = temp_dir.path().join("buckets");
        std::fs::create_dir_all(buckets.join("raw-videos")).unwrap();
        let staging = StagingDirs::new(
            temp_dir.path().join("raw-videos"),
            temp_dir.path().join("processed-videos"),
        );
        staging.setup().await.unwrap();

        let pipeline = VideoPipeline::new(
            FsAdapter::new(&buckets, "raw-videos"),
            FsAdapter::new(&buckets, "processed-videos"),
            transcoder,
            staging.clone(),
        );

        Self {
            _temp_dir: temp_dir,
            buckets,
            staging,
            app: router(Arc::new(pipeline)),
        }
    }

    fn put_raw(&self, name: &str, contents: &[u8]) {
        std::fs::write(self.buckets.join("raw-videos").join(name), contents).unwrap();
    }

    fn processed_object(&self, name: &str) -> std::path::PathBuf {
        self.buckets.join("processed-videos").join(name)
    }

    async fn post(&self, body: String) -> (StatusCode, String) {
        let request = Request::builder()
            .method("POST")
            .uri("/process-video")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap();
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    fn assert_staging_empty(&self) {
        for dir in [self.staging.raw_dir(), self.staging.processed_dir()] {
            assert_eq!(std::fs::read_dir(dir).unwrap().count(), 0);
        }
    }
}

fn push_body(event_json: &str) -> String {
    serde_json::json!({ "message": { "data": STANDARD.encode(event_json) } }).to_string()
}

#[tokio::test]
async fn test_process_video_success() {
    let harness = Harness::new(CopyTranscoder).await;
    harness.put_raw("video1.mp4", b"raw video");

    let (status, body) = harness.post(push_body(r#"{"name":"video1.mp4"}"#)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Video processed successfully");
    assert_eq!(
        std::fs::read(harness.processed_object("processed-video1.mp4")).unwrap(),
        b"raw video"
    );
    assert!(!harness.staging.raw_dir().join("video1.mp4").exists());
    assert!(!harness
        .staging
        .processed_dir()
        .join("processed-video1.mp4")
        .exists());
}

#[tokio::test]
async fn test_process_video_transcode_failure() {
    let harness = Harness::new(CorruptInputTranscoder).await;
    harness.put_raw("video1.mp4", b"corrupted");

    let (status, body) = harness.post(push_body(r#"{"name":"video1.mp4"}"#)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "Error processing video");
    assert!(!harness.processed_object("processed-video1.mp4").exists());
    harness.assert_staging_empty();
}

#[tokio::test]
async fn test_process_video_missing_raw_object() {
    let harness = Harness::new(CopyTranscoder).await;

    let (status, body) = harness.post(push_body(r#"{"name":"absent.mp4"}"#)).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body, "Error accessing video storage");
    harness.assert_staging_empty();
}

#[tokio::test]
async fn test_process_video_without_staging_directory() {
    let harness = Harness::new(CopyTranscoder).await;
    harness.put_raw("video1.mp4", b"raw video");
    std::fs::remove_dir_all(harness.staging.raw_dir()).unwrap();

    let (status, body) = harness.post(push_body(r#"{"name":"video1.mp4"}"#)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "Error processing video");
    assert!(!harness.processed_object("processed-video1.mp4").exists());
}

#[tokio::test]
async fn test_process_video_bad_requests() {
    let harness = Harness::new(CopyTranscoder).await;
    harness.put_raw("video1.mp4", b"raw video");

    let bodies = [
        push_body(r#"{"bucket":"raw-videos"}"#),
        push_body(r#"{"name":""}"#),
        push_body("not json"),
        push_body(r#"["video1.mp4"]"#),
        push_body(r#""video1.mp4""#),
        push_body(r#"{"name":42}"#),
        r#"{"message":{"data":"%%%not-base64%%%"}}"#.to_string(),
        r#"{"message":{}}"#.to_string(),
        r#"{}"#.to_string(),
        "garbage".to_string(),
    ];

    for body in bodies {
        let (status, response) = harness.post(body.clone()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body: {body}");
        assert_eq!(response, "Bad Request: missing filename.");
    }

    assert!(!harness.processed_object("processed-video1.mp4").exists());
    harness.assert_staging_empty();
}

#[tokio::test]
async fn test_process_video_rejects_path_names() {
    let harness = Harness::new(CopyTranscoder).await;

    let (status, body) = harness
        .post(push_body(r#"{"name":"../buckets/raw-videos/video1.mp4"}"#))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Bad Request: invalid filename.");
}

#[tokio::test]
async fn test_process_video_twice_reprocesses() {
    let harness = Harness::new(CopyTranscoder).await;
    harness.put_raw("video1.mp4", b"first");
    let (status, _) = harness.post(push_body(r#"{"name":"video1.mp4"}"#)).await;
    assert_eq!(status, StatusCode::OK);

    harness.put_raw("video1.mp4", b"second");
    let (status, _) = harness.post(push_body(r#"{"name":"video1.mp4"}"#)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        std::fs::read(harness.processed_object("processed-video1.mp4")).unwrap(),
        b"second"
    );
    harness.assert_staging_empty();
}

#[tokio::test]
async fn test_health() {
    let harness = Harness::new(CopyTranscoder).await;
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = harness.app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
