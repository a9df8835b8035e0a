use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use hyocard_relay::ai::{MockVisionClient, VisionService};
use hyocard_relay::models::Mode;
use hyocard_relay::server::{create_router, AppState};
use hyocard_relay::{prompts, Result};
use async_trait::async_trait;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Barrier;
use tower::ServiceExt;

const BOUNDARY: &str = "hyocard-test-boundary";
const PNG_BYTES: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

fn router_with(vision: MockVisionClient) -> Router {
    create_router(AppState {
        vision: Arc::new(vision),
    })
}

/// Hand-built multipart form with an optional image part (and its declared
/// content type) and an optional mode text field.
fn multipart_body(image: Option<(&[u8], Option<&str>)>, mode: Option<&str>) -> Vec<u8> {
    let mut body = Vec::new();

    if let Some((bytes, content_type)) = image {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            b"Content-Disposition: form-data; name=\"image\"; filename=\"notes.png\"\r\n",
        );
        if let Some(content_type) = content_type {
            body.extend_from_slice(format!("Content-Type: {}\r\n", content_type).as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }

    if let Some(mode) = mode {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(b"Content-Disposition: form-data; name=\"mode\"\r\n\r\n");
        body.extend_from_slice(mode.as_bytes());
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn process_request(image: Option<(&[u8], Option<&str>)>, mode: Option<&str>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/process")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(image, mode)))
        .unwrap()
}

async fn response_json(response: axum::response::Response) -> serde_json::Value {
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_process_returns_model_text() {
    let mock = MockVisionClient::new().with_text_response("Hello".to_string());
    let router = router_with(mock.clone());

    let response = router
        .oneshot(process_request(
            Some((PNG_BYTES, Some("image/jpeg"))),
            Some("explain"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    assert_eq!(json, serde_json::json!({ "result": "Hello" }));

    let call = mock.last_call().unwrap();
    assert_eq!(call.prompt, prompts::EXPLAIN);
    assert_eq!(call.mime_type, "image/jpeg");
    assert_eq!(call.image_len, PNG_BYTES.len());
    assert_eq!(call.mode, Mode::Explain);
}

#[tokio::test]
async fn test_missing_mode_defaults_to_explain() {
    let mock = MockVisionClient::new();
    let router = router_with(mock.clone());

    let response = router
        .oneshot(process_request(Some((PNG_BYTES, Some("image/png"))), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(mock.last_call().unwrap().mode, Mode::Explain);
}

#[tokio::test]
async fn test_flashcards_mode_selects_flashcard_prompt() {
    let mock = MockVisionClient::new().with_text_response("[]".to_string());
    let router = router_with(mock.clone());

    let response = router
        .oneshot(process_request(
            Some((PNG_BYTES, Some("image/png"))),
            Some("flashcards"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let call = mock.last_call().unwrap();
    assert_eq!(call.prompt, prompts::FLASHCARDS);
    assert_eq!(call.mode, Mode::Flashcards);
}

#[tokio::test]
async fn test_unrecognized_mode_falls_back_to_flashcards() {
    let mock = MockVisionClient::new();
    let router = router_with(mock.clone());

    let response = router
        .oneshot(process_request(
            Some((PNG_BYTES, Some("image/png"))),
            Some("explian"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let call = mock.last_call().unwrap();
    assert_eq!(call.prompt, prompts::FLASHCARDS);
    assert_eq!(call.mode, Mode::Flashcards);
}

#[tokio::test]
async fn test_undeclared_content_type_defaults_to_png() {
    let mock = MockVisionClient::new();
    let router = router_with(mock.clone());

    let response = router
        .oneshot(process_request(Some((PNG_BYTES, None)), Some("explain")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(mock.last_call().unwrap().mime_type, "image/png");
}

#[tokio::test]
async fn test_large_upload_is_relayed() {
    // A 3 MB phone photo must clear the router's body limit and reach the
    // upstream client intact.
    let mock = MockVisionClient::new().with_text_response("큰 사진".to_string());
    let router = router_with(mock.clone());

    let large_image = vec![0xAB; 3 * 1024 * 1024];
    let response = router
        .oneshot(process_request(
            Some((&large_image, Some("image/jpeg"))),
            Some("explain"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    assert_eq!(json, serde_json::json!({ "result": "큰 사진" }));
    assert_eq!(mock.last_call().unwrap().image_len, large_image.len());
}

#[tokio::test]
async fn test_upstream_failure_returns_500_with_error_key() {
    let mock = MockVisionClient::new().with_error("quota exceeded".to_string());
    let router = router_with(mock);

    let response = router
        .oneshot(process_request(
            Some((PNG_BYTES, Some("image/png"))),
            Some("explain"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = response_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("quota exceeded"));
}

#[tokio::test]
async fn test_missing_image_field_returns_500_with_error_key() {
    let router = router_with(MockVisionClient::new());

    let response = router
        .oneshot(process_request(None, Some("explain")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = response_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("image"));
}

#[tokio::test]
async fn test_health_is_independent_of_upstream() {
    // Upstream always fails, /health still answers.
    let router = router_with(MockVisionClient::new().with_error("down".to_string()));

    let response = router
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    assert_eq!(json, serde_json::json!({ "status": "ok" }));
}

/// Vision stub that blocks until two requests are in flight at once. If the
/// server serialized `/process` calls, neither request would ever pass the
/// barrier and the test timeout would trip.
struct RendezvousVision {
    barrier: Barrier,
}

#[async_trait]
impl VisionService for RendezvousVision {
    async fn generate(
        &self,
        _prompt: &str,
        _image_bytes: &[u8],
        _mime_type: &str,
        _mode: Mode,
    ) -> Result<String> {
        self.barrier.wait().await;
        Ok("overlapped".to_string())
    }
}

#[tokio::test]
async fn test_concurrent_process_requests_overlap() {
    let state = AppState {
        vision: Arc::new(RendezvousVision {
            barrier: Barrier::new(2),
        }),
    };
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let url = format!("http://{}/process", addr);
    let client = reqwest::Client::new();

    let post = |client: reqwest::Client, url: String| async move {
        let part = reqwest::multipart::Part::bytes(PNG_BYTES.to_vec())
            .file_name("notes.png")
            .mime_str("image/png")
            .unwrap();
        let form = reqwest::multipart::Form::new()
            .part("image", part)
            .text("mode", "explain");
        client.post(&url).multipart(form).send().await.unwrap()
    };

    let (a, b) = tokio::time::timeout(Duration::from_secs(5), async {
        tokio::join!(post(client.clone(), url.clone()), post(client, url))
    })
    .await
    .expect("requests serialized instead of overlapping");

    assert_eq!(a.status(), reqwest::StatusCode::OK);
    assert_eq!(b.status(), reqwest::StatusCode::OK);

    let body: serde_json::Value = a.json().await.unwrap();
    assert_eq!(body, serde_json::json!({ "result": "overlapped" }));
}
