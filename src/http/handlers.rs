use super::state::AppState;
use crate::uploads::{self, audio_extension, stored_name};
use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use serde::Serialize;
use std::path::Path;
use tokio::io::AsyncWriteExt;
use tracing::{error, info, warn};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    /// Stored file name, usable as `audio_file` in `start_processing`
    pub filename: String,
    pub size: u64,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct AudioFilesResponse {
    pub files: Vec<String>,
}

fn error_response(status: StatusCode, error: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            success: false,
            error: error.into(),
        }),
    )
        .into_response()
}

enum StoreError {
    Io(std::io::Error),
    Body(MultipartError),
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /
pub async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "WebSocket server is running at /ws (captions at /ws/captions, live translation at /ws/translate)"
    }))
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// GET /audio-files
/// List uploaded audio files
pub async fn list_audio_files(State(state): State<AppState>) -> impl IntoResponse {
    let files = uploads::list_audio_files(&state.config.uploads.dir).await;
    Json(AudioFilesResponse { files })
}

/// POST /upload
/// Store an uploaded audio file (multipart field `audio` or `file`)
pub async fn upload_audio(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                warn!("Malformed upload: {}", e);
                return error_response(e.status(), e.body_text());
            }
        };

        let name = field.name().unwrap_or("");
        if name != "audio" && name != "file" {
            continue;
        }

        let original = field.file_name().unwrap_or("").to_string();
        let Some(extension) = audio_extension(&original) else {
            return error_response(
                StatusCode::BAD_REQUEST,
                format!(
                    "Unsupported file type '{}'. Allowed: {}",
                    original,
                    uploads::AUDIO_EXTENSIONS.join(", ")
                ),
            );
        };

        let dir = &state.config.uploads.dir;

        return match store_field(dir, &extension, field).await {
            Ok((filename, size)) => {
                info!("Stored upload {} as {} ({} bytes)", original, filename, size);
                (
                    StatusCode::OK,
                    Json(UploadResponse {
                        success: true,
                        filename,
                        size,
                    }),
                )
                    .into_response()
            }
            Err(StoreError::Body(e)) => {
                warn!("Upload of {} aborted: {}", original, e);
                error_response(e.status(), e.body_text())
            }
            Err(StoreError::Io(e)) => {
                error!("Failed to store upload {}: {}", original, e);
                error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Failed to store file: {}", e),
                )
            }
        };
    }

    error_response(StatusCode::BAD_REQUEST, "No audio file provided")
}

/// Stream one multipart field to a fresh file in `dir`, returning its name and
/// the bytes written. A partially written file is removed on failure.
async fn store_field(
    dir: &Path,
    extension: &str,
    mut field: axum::extract::multipart::Field<'_>,
) -> Result<(String, u64), StoreError> {
    let (filename, mut file) = uploads::create_unique(dir, || stored_name(Utc::now(), extension))
        .await
        .map_err(StoreError::Io)?;
    let path = dir.join(&filename);

    let written = async {
        let mut size = 0u64;
        while let Some(chunk) = field.chunk().await.map_err(StoreError::Body)? {
            file.write_all(&chunk).await.map_err(StoreError::Io)?;
            size += chunk.len() as u64;
        }
        file.flush().await.map_err(StoreError::Io)?;
        Ok::<u64, StoreError>(size)
    }
    .await;

    match written {
        Ok(size) => Ok((filename, size)),
        Err(e) => {
            drop(file);
            let _ = tokio::fs::remove_file(&path).await;
            Err(e)
        }
    }
}
