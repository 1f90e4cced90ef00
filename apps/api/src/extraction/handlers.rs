//! Axum handler for the document-extraction endpoint.

use axum::extract::{Multipart, State};
use axum::Json;
use bytes::Bytes;
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::extraction::extractor::{DocType, UploadedDocument};
use crate::extraction::normalize::normalize_fields;
use crate::state::AppState;

/// POST /extract
///
/// Multipart form: `file` (the scanned document) and optional `doc_type`
/// (`cni` | `domicile` | `secu`, defaulting to `cni`). Returns the
/// normalized field payload extracted by the vision model.
pub async fn handle_extract(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    let mut upload: Option<UploadedDocument> = None;
    let mut doc_type = DocType::Cni;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("multipart invalide: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or("document").to_string();
                let mime = field.content_type().unwrap_or_default().to_string();
                let bytes: Bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("lecture du fichier: {e}")))?;
                upload = Some(UploadedDocument {
                    filename,
                    mime,
                    bytes,
                });
            }
            "doc_type" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("doc_type invalide: {e}")))?;
                doc_type = DocType::parse(&value);
            }
            _ => {}
        }
    }

    let upload = upload.ok_or_else(|| AppError::Validation("Fichier manquant".to_string()))?;
    if upload.bytes.is_empty() {
        return Err(AppError::Validation("Fichier vide".to_string()));
    }

    let data = state.extractor.extract(&upload, doc_type).await?;
    let data = normalize_fields(data);

    Ok(Json(json!({ "success": true, "data": data })))
}
