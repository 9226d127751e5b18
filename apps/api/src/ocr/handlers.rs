use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::ocr::{extract_text, structure_text, StructuredResume};
use crate::state::AppState;

/// Upload size accepted by the OCR route.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrResponse {
    pub extracted_text: String,
    pub structured_content: Option<StructuredResume>,
}

/// POST /api/ocr
///
/// Multipart upload with a `file` field (PDF recommended).
pub async fn handle_ocr(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<OcrResponse>, AppError> {
    let (file_name, bytes) = read_file_field(&mut multipart).await?.ok_or_else(|| {
        AppError::Validation(
            "No file provided. Send a PDF or image as 'file' in multipart form data.".to_string(),
        )
    })?;
    if bytes.is_empty() {
        return Err(AppError::Validation("Uploaded file is empty".to_string()));
    }

    let extracted_text = extract_text(state.documents.as_ref(), &file_name, bytes)
        .await
        .map_err(|e| AppError::Provider(format!("OCR extraction failed: {e}")))?;

    let structured_content = structure_text(state.documents.as_ref(), &extracted_text)
        .await
        .map_err(|e| AppError::Provider(format!("OCR structuring failed: {e}")))?;

    Ok(Json(OcrResponse {
        extracted_text,
        structured_content,
    }))
}

async fn read_file_field(multipart: &mut Multipart) -> Result<Option<(String, Bytes)>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field
            .file_name()
            .filter(|n| !n.is_empty())
            .map(String::from)
            .unwrap_or_else(|| format!("upload-{}", Uuid::new_v4()));
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(e.body_text()))?;
        return Ok(Some((file_name, bytes)));
    }
    Ok(None)
}
