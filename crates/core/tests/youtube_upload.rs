//! YouTubeClient against an in-process fake of the resumable upload endpoint.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{post, put},
    Json, Router,
};
use serde_json::{json, Value};
use tempfile::TempDir;

use drivetube_core::testing::StaticTokenProvider;
use drivetube_core::youtube::{
    PrivacyStatus, PublishError, VideoMetadata, VideoPublisher, YouTubeClient,
    YouTubeClientConfig,
};

const CHUNK: u64 = 256 * 1024;

/// How the fake answers chunk uploads.
#[derive(Clone, Copy, Default, PartialEq)]
enum Behavior {
    #[default]
    Normal,
    /// Answer 308 without a Range header (nothing persisted).
    NoProgress,
    /// Refuse to open a session.
    QuotaExceeded,
}

#[derive(Clone, Default)]
struct FakeUpload {
    addr: Arc<Mutex<Option<SocketAddr>>>,
    behavior: Behavior,
    session_query: Arc<Mutex<HashMap<String, String>>>,
    session_headers: Arc<Mutex<Option<HeaderMap>>>,
    metadata: Arc<Mutex<Option<Value>>>,
    received: Arc<Mutex<Vec<u8>>>,
    ranges: Arc<Mutex<Vec<String>>>,
}

async fn start_session(
    State(state): State<FakeUpload>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> Response {
    if state.behavior == Behavior::QuotaExceeded {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({"error": {"errors": [{"reason": "quotaExceeded"}]}})),
        )
            .into_response();
    }

    *state.session_query.lock().unwrap() = params;
    *state.session_headers.lock().unwrap() = Some(headers);
    *state.metadata.lock().unwrap() = Some(body);

    let addr = state.addr.lock().unwrap().unwrap();
    (
        StatusCode::OK,
        [(header::LOCATION, format!("http://{}/session/s-42", addr))],
    )
        .into_response()
}

async fn upload_chunk(
    State(state): State<FakeUpload>,
    Path(session): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    assert_eq!(session, "s-42");
    let range = headers
        .get(header::CONTENT_RANGE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    state.ranges.lock().unwrap().push(range.clone());

    if state.behavior == Behavior::NoProgress {
        return StatusCode::PERMANENT_REDIRECT.into_response();
    }

    // "bytes a-b/total"
    let spec = range.trim_start_matches("bytes ");
    let (span, total) = spec.split_once('/').unwrap();
    let (start, end) = span.split_once('-').unwrap();
    let (start, end, total): (usize, usize, usize) =
        (start.parse().unwrap(), end.parse().unwrap(), total.parse().unwrap());

    let mut received = state.received.lock().unwrap();
    assert_eq!(received.len(), start, "chunks must be contiguous");
    assert_eq!(body.len(), end - start + 1);
    received.extend_from_slice(&body);

    if end + 1 < total {
        (
            StatusCode::PERMANENT_REDIRECT,
            [(header::RANGE, format!("bytes=0-{}", end))],
        )
            .into_response()
    } else {
        (
            StatusCode::OK,
            Json(json!({"kind": "youtube#video", "id": "vid-123"})),
        )
            .into_response()
    }
}

async fn spawn(state: FakeUpload) -> SocketAddr {
    let app = Router::new()
        .route("/upload/youtube/v3/videos", post(start_session))
        .route("/session/{id}", put(upload_chunk))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    *state.addr.lock().unwrap() = Some(addr);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn client(addr: SocketAddr) -> YouTubeClient {
    YouTubeClient::new(
        YouTubeClientConfig {
            upload_url: format!("http://{}/upload/youtube/v3/videos", addr),
            chunk_size_bytes: CHUNK,
            timeout_secs: 10,
        },
        Arc::new(StaticTokenProvider::new("yt-token")),
    )
    .unwrap()
}

fn metadata() -> VideoMetadata {
    VideoMetadata {
        title: "Feeding time #3".to_string(),
        description: "Daily life on a small farm.".to_string(),
        tags: vec!["farm".to_string(), "goats".to_string()],
        category_id: "15".to_string(),
        privacy_status: PrivacyStatus::Public,
        made_for_kids: false,
    }
}

fn media_file(dir: &TempDir, name: &str, len: usize) -> (std::path::PathBuf, Vec<u8>) {
    let content: Vec<u8> = (0..len).map(|i| (i % 253) as u8).collect();
    let path = dir.path().join(name);
    std::fs::write(&path, &content).unwrap();
    (path, content)
}

#[tokio::test]
async fn test_chunked_upload_returns_video_id() {
    let state = FakeUpload::default();
    let addr = spawn(state.clone()).await;
    let dir = TempDir::new().unwrap();
    let (path, content) = media_file(&dir, "clip.mov", 600_000);

    let video = client(addr).publish(&path, &metadata()).await.unwrap();

    assert_eq!(video.id, "vid-123");
    assert_eq!(*state.received.lock().unwrap(), content);
    assert_eq!(
        *state.ranges.lock().unwrap(),
        vec![
            "bytes 0-262143/600000".to_string(),
            "bytes 262144-524287/600000".to_string(),
            "bytes 524288-599999/600000".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_session_request_carries_metadata_and_size() {
    let state = FakeUpload::default();
    let addr = spawn(state.clone()).await;
    let dir = TempDir::new().unwrap();
    let (path, _) = media_file(&dir, "clip.mov", 1000);

    client(addr).publish(&path, &metadata()).await.unwrap();

    let query = state.session_query.lock().unwrap().clone();
    assert_eq!(query.get("uploadType").map(String::as_str), Some("resumable"));
    assert_eq!(query.get("part").map(String::as_str), Some("snippet,status"));

    let headers = state.session_headers.lock().unwrap().clone().unwrap();
    assert_eq!(headers.get("x-upload-content-length").unwrap(), "1000");
    assert_eq!(headers.get("x-upload-content-type").unwrap(), "video/quicktime");
    assert_eq!(headers.get("authorization").unwrap(), "Bearer yt-token");

    let body = state.metadata.lock().unwrap().clone().unwrap();
    assert_eq!(body["snippet"]["title"], "Feeding time #3");
    assert_eq!(body["snippet"]["categoryId"], "15");
    assert_eq!(body["snippet"]["tags"], json!(["farm", "goats"]));
    assert_eq!(body["status"]["privacyStatus"], "public");
    assert_eq!(body["status"]["madeForKids"], false);

    // single chunk for a small file
    assert_eq!(state.ranges.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_no_progress_is_a_protocol_error() {
    let state = FakeUpload {
        behavior: Behavior::NoProgress,
        ..FakeUpload::default()
    };
    let addr = spawn(state.clone()).await;
    let dir = TempDir::new().unwrap();
    let (path, _) = media_file(&dir, "clip.mp4", 1000);

    let err = client(addr).publish(&path, &metadata()).await.unwrap_err();
    assert!(matches!(err, PublishError::Protocol(_)));
    assert_eq!(state.ranges.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_rejected_session_is_api_error() {
    let state = FakeUpload {
        behavior: Behavior::QuotaExceeded,
        ..FakeUpload::default()
    };
    let addr = spawn(state.clone()).await;
    let dir = TempDir::new().unwrap();
    let (path, _) = media_file(&dir, "clip.mp4", 1000);

    let err = client(addr).publish(&path, &metadata()).await.unwrap_err();
    match err {
        PublishError::ApiError { status, message } => {
            assert_eq!(status, 403);
            assert!(message.contains("quotaExceeded"));
        }
        other => panic!("expected ApiError, got {:?}", other),
    }
    assert!(state.ranges.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_empty_file_is_rejected_before_any_request() {
    let state = FakeUpload::default();
    let addr = spawn(state.clone()).await;
    let dir = TempDir::new().unwrap();
    let (path, _) = media_file(&dir, "empty.mp4", 0);

    let err = client(addr).publish(&path, &metadata()).await.unwrap_err();
    assert!(matches!(err, PublishError::EmptyFile(_)));
    assert!(state.metadata.lock().unwrap().is_none());
}
