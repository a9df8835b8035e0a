use super::AppState;
use crate::models::{ErrorResponse, Mode, ProcessResponse};
use crate::{Error, Result};
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use tracing::{error, info};

pub async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "message": "Hyocard relay service is running. Use /process endpoint for image processing."
    }))
}

pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Accept a multipart upload (`image` file, optional `mode` text field) and
/// relay it to Gemini. Any failure maps to a 500 with an error envelope; no
/// failure kind gets a distinct status code.
pub async fn process(State(state): State<AppState>, multipart: Multipart) -> Response {
    match process_upload(&state, multipart).await {
        Ok(text) => (StatusCode::OK, Json(ProcessResponse { result: text })).into_response(),
        Err(e) => {
            error!("Processing failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Processing failed: {}", e),
                }),
            )
                .into_response()
        }
    }
}

struct Upload {
    image_bytes: Vec<u8>,
    mime_type: String,
    mode: Mode,
}

async fn read_upload(mut multipart: Multipart) -> Result<Upload> {
    let mut image: Option<(Vec<u8>, String)> = None;
    let mut mode_field: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::Multipart(e.to_string()))?
    {
        let name = field.name().map(|n| n.to_string());
        match name.as_deref() {
            Some("image") => {
                let mime_type = field
                    .content_type()
                    .unwrap_or("image/png")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| Error::Multipart(e.to_string()))?;
                image = Some((bytes.to_vec(), mime_type));
            }
            Some("mode") => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| Error::Multipart(e.to_string()))?;
                mode_field = Some(value);
            }
            _ => {}
        }
    }

    let (image_bytes, mime_type) =
        image.ok_or_else(|| Error::Multipart("missing 'image' field".to_string()))?;
    let mode = Mode::from_field(mode_field.as_deref().unwrap_or("explain"));

    Ok(Upload {
        image_bytes,
        mime_type,
        mode,
    })
}

async fn process_upload(state: &AppState, multipart: Multipart) -> Result<String> {
    let upload = read_upload(multipart).await?;

    info!(
        "Processing {} upload ({} bytes) in {:?} mode",
        upload.mime_type,
        upload.image_bytes.len(),
        upload.mode
    );

    state
        .vision
        .generate(
            upload.mode.prompt(),
            &upload.image_bytes,
            &upload.mime_type,
            upload.mode,
        )
        .await
}
