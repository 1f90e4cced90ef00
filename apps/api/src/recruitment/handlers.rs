//! Axum handler for CV analysis.

use axum::extract::{Multipart, State};
use axum::Json;
use bytes::Bytes;
use serde_json::Value;

use crate::errors::AppError;
use crate::extraction::UploadedDocument;
use crate::recruitment::analyzer::{analyze, parse_criteria};
use crate::state::AppState;

/// POST /recruitment/analyze
///
/// Multipart form: `role`, `criteria` (JSON, optional) and one or more
/// `files` (CVs as PDF or image). Returns the model's scored-candidate
/// payload.
pub async fn handle_analyze(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    let mut role = String::new();
    let mut criteria_raw = "{}".to_string();
    let mut files: Vec<UploadedDocument> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("multipart invalide: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "role" => {
                role = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("role invalide: {e}")))?;
            }
            "criteria" => {
                criteria_raw = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("criteria invalide: {e}")))?;
            }
            "files" => {
                let filename = field.file_name().unwrap_or("fichier").to_string();
                let mime = field.content_type().unwrap_or_default().to_string();
                let bytes: Bytes = match field.bytes().await {
                    Ok(b) => b,
                    // A broken part does not fail the batch; the other CVs
                    // are still worth analyzing.
                    Err(_) => continue,
                };
                if bytes.is_empty() {
                    continue;
                }
                files.push(UploadedDocument {
                    filename,
                    mime,
                    bytes,
                });
            }
            _ => {}
        }
    }

    if role.trim().is_empty() {
        return Err(AppError::Validation("Poste (role) manquant".to_string()));
    }
    if files.is_empty() {
        return Err(AppError::Validation(
            "Aucun fichier valide re\u{e7}u".to_string(),
        ));
    }

    let criteria = parse_criteria(&criteria_raw);
    let result = analyze(&state.llm, &role, &criteria, &files).await?;
    Ok(Json(result))
}
