use std::sync::Arc;

use axum::extract::multipart::{Field, MultipartError, MultipartRejection};
use axum::extract::{Multipart, State};
use axum::Json;
use tracing::{error, info};

use crate::error::AppError;
use crate::models::{AnalysisRequest, AnalyzeResponse, ErrorBody, HealthResponse};
use crate::state::AppState;

pub const MAX_PHOTO_BYTES: usize = 10 * 1024 * 1024;
pub const MAX_VIBE_CHARS: usize = 50;
const ALLOWED_CONTENT_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/webp"];

struct Photo {
    file_name: String,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

#[derive(Default)]
struct AnalyzeForm {
    photo: Option<Photo>,
    /// Untrimmed, so the length limit sees what the client sent.
    vibe: Option<String>,
    language: Option<String>,
    hints: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    )
)]
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[utoipa::path(
    post,
    path = "/api/analyze",
    tag = "analyze",
    summary = "Analyze a photo and generate Instagram content",
    request_body(
        content_type = "multipart/form-data",
        description = "`photo` file (JPEG, PNG or WebP, at most 10MB) with optional `vibe`, `language` and `hints` text fields"
    ),
    responses(
        (status = 200, description = "Caption generated", body = AnalyzeResponse),
        (status = 400, description = "Invalid upload", body = ErrorBody),
        (status = 429, description = "Rate limit exceeded", body = ErrorBody),
        (status = 500, description = "Model call or reply parsing failed", body = ErrorBody)
    )
)]
pub async fn analyze_handler(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let multipart = multipart.map_err(|e| AppError::Validation(e.body_text()))?;
    let form = read_form(multipart).await?;

    let file_name = form
        .photo
        .as_ref()
        .map(|p| p.file_name.clone())
        .unwrap_or_default();
    let request = validate(form)?;

    info!(
        "Analyzing image: {}, Size: {}, Type: {}, Vibe: {}, Hints: {}",
        file_name,
        request.image.len(),
        request.content_type,
        request.vibe.as_deref().unwrap_or("auto"),
        request.hints.as_deref().unwrap_or("none")
    );

    let result = state.captioner.analyze(&request).await.map_err(|e| {
        error!("Analysis of {} failed: {}", file_name, e);
        AppError::from(e)
    })?;

    Ok(Json(result.into()))
}

async fn read_form(mut multipart: Multipart) -> Result<AnalyzeForm, AppError> {
    let mut form = AnalyzeForm::default();

    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "photo" => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = read_photo(&mut field).await?;
                form.photo = Some(Photo {
                    file_name,
                    content_type,
                    bytes,
                });
            }
            "vibe" => form.vibe = Some(field.text().await.map_err(multipart_error)?),
            "language" => form.language = non_blank(field.text().await.map_err(multipart_error)?),
            "hints" => form.hints = non_blank(field.text().await.map_err(multipart_error)?),
            _ => {}
        }
    }

    Ok(form)
}

/// Streams the photo in, bailing as soon as it passes the size cap.
async fn read_photo(field: &mut Field<'_>) -> Result<Vec<u8>, AppError> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        if bytes.len() + chunk.len() > MAX_PHOTO_BYTES {
            return Err(AppError::Validation(format!(
                "File size must not exceed {}MB",
                MAX_PHOTO_BYTES / 1024 / 1024
            )));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

fn validate(form: AnalyzeForm) -> Result<AnalysisRequest, AppError> {
    let photo = form
        .photo
        .filter(|p| !p.bytes.is_empty())
        .ok_or_else(|| AppError::Validation("Photo is required".to_string()))?;

    let content_type = photo
        .content_type
        .filter(|ct| ALLOWED_CONTENT_TYPES.contains(&ct.as_str()))
        .ok_or_else(|| {
            AppError::Validation(format!(
                "File type must be one of: {}",
                ALLOWED_CONTENT_TYPES.join(", ")
            ))
        })?;

    if let Some(vibe) = &form.vibe {
        if vibe.chars().count() > MAX_VIBE_CHARS {
            return Err(AppError::Validation(format!(
                "Vibe must not exceed {MAX_VIBE_CHARS} characters"
            )));
        }
    }

    Ok(AnalysisRequest {
        image: photo.bytes,
        content_type,
        vibe: form.vibe.and_then(non_blank),
        language: form.language,
        hints: form.hints,
    })
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn multipart_error(err: MultipartError) -> AppError {
    AppError::Validation(format!("Invalid upload: {}", err.body_text()))
}
