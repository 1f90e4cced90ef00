//! Axum route handlers for the Contracts API.
//!
//! Creating a contract renders its PDF in the same request: store staff
//! either get back a record with a download URL, or a 400 naming exactly
//! what went wrong (typically a missing store template). There is no
//! partially generated state exposed to clients.

use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use tracing::warn;

use crate::contracts::queries;
use crate::errors::AppError;
use crate::models::contract::{ContractCreate, ContractRead, ContractRow, ContractsListResponse};
use crate::state::AppState;

/// POST /contracts
///
/// Persists the record, renders the PDF, and returns the record with its
/// download URL. A render failure surfaces as a 400 and leaves the record
/// in `created` so it can be retried after the template is fixed.
pub async fn handle_create(
    State(state): State<AppState>,
    Json(payload): Json<ContractCreate>,
) -> Result<Json<ContractRead>, AppError> {
    if payload.store.trim().is_empty() {
        return Err(AppError::Validation(
            "Magasin non sp\u{e9}cifi\u{e9} dans le contrat".to_string(),
        ));
    }

    let row = queries::insert_contract(&state.db, &payload).await?;

    // Layout is CPU-bound; keep it off the async workers.
    let renderer = state.renderer.clone();
    let render_input = row.clone();
    let path = tokio::task::spawn_blocking(move || renderer.generate(&render_input))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("render task failed: {e}")))??;

    let path_str = path.display().to_string();
    queries::mark_generated(&state.db, row.id, &path_str).await?;

    if let Some(storage) = &state.storage {
        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let key = format!(
                    "contracts/{}",
                    path.file_name().unwrap_or_default().to_string_lossy()
                );
                if let Err(e) = storage.upload_pdf(&key, bytes).await {
                    // The local file stays authoritative; upload is a mirror.
                    warn!("S3 upload failed for contract {}: {e:#}", row.id);
                }
            }
            Err(e) => warn!("could not re-read generated PDF for upload: {e}"),
        }
    }

    let row = queries::fetch_contract(&state.db, row.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Contrat introuvable".to_string()))?;
    let url = document_url(&state, &row);
    Ok(Json(ContractRead::from_row(row, url)))
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub store: Option<String>,
    /// Free-text search over prenom / nom / numero_secu / adresse.
    pub q: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /contracts
pub async fn handle_list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ContractsListResponse>, AppError> {
    let filter = queries::ContractFilter {
        store: params.store.filter(|s| !s.is_empty()),
        q: params.q.filter(|q| !q.is_empty()),
        limit: params.limit.unwrap_or(100).clamp(1, 1000),
        offset: params.offset.unwrap_or(0).max(0),
    };
    let (rows, total) = queries::list_contracts(&state.db, &filter).await?;
    let items = rows
        .into_iter()
        .map(|row| {
            let url = document_url(&state, &row);
            ContractRead::from_row(row, url)
        })
        .collect();
    Ok(Json(ContractsListResponse { items, total }))
}

/// GET /contracts/:id
pub async fn handle_get(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ContractRead>, AppError> {
    let row = queries::fetch_contract(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Contrat introuvable".to_string()))?;
    let url = document_url(&state, &row);
    Ok(Json(ContractRead::from_row(row, url)))
}

/// GET /contracts/export.csv
pub async fn handle_export_csv(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let rows = queries::all_contracts(&state.db).await?;
    let csv = contracts_to_csv(&rows);
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=contracts.csv",
            ),
        ],
        csv,
    ))
}

/// Maps a stored document path to its public `/files/...` URL, when the
/// file lives under the served output directory.
fn document_url(state: &AppState, row: &ContractRow) -> Option<String> {
    let path = row.generated_doc_path.as_deref()?;
    let rel = std::path::Path::new(path)
        .strip_prefix(state.renderer.output_dir())
        .ok()?;
    Some(format!("/files/{}", rel.to_string_lossy()))
}

const CSV_HEADERS: &[&str] = &[
    "id",
    "store",
    "prenom",
    "nom",
    "date_naissance",
    "lieu_naissance",
    "adresse",
    "nationalite",
    "numero_secu",
    "date_debut",
    "status",
    "generated_doc_path",
    "created_at",
];

/// Serializes contracts for the back-office export. Every field is quoted,
/// embedded quotes are doubled, and address newlines collapse to spaces so
/// each record stays on one line.
fn contracts_to_csv(rows: &[ContractRow]) -> String {
    let mut out = String::new();
    out.push_str(&CSV_HEADERS.join(","));
    out.push('\n');
    for row in rows {
        let values = [
            row.id.to_string(),
            row.store.clone(),
            row.prenom.clone(),
            row.nom.clone(),
            row.date_naissance.clone(),
            row.lieu_naissance.clone(),
            row.adresse.replace('\n', " "),
            row.nationalite.clone(),
            row.numero_secu.clone(),
            row.date_debut.clone(),
            row.status.clone(),
            row.generated_doc_path.clone().unwrap_or_default(),
            row.created_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
        ];
        let line: Vec<String> = values
            .iter()
            .map(|v| format!("\"{}\"", v.replace('"', "\"\"")))
            .collect();
        out.push_str(&line.join(","));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn row() -> ContractRow {
        ContractRow {
            id: 3,
            store: "AEJB".to_string(),
            prenom: "Marie".to_string(),
            nom: "D\"UPONT".to_string(),
            date_naissance: "07/06/1998".to_string(),
            lieu_naissance: "Lyon".to_string(),
            adresse: "3 rue des Lilas\n75011 Paris".to_string(),
            nationalite: "Fran\u{e7}aise".to_string(),
            numero_secu: "298067512345678".to_string(),
            date_debut: "01/09/2024".to_string(),
            status: "generated".to_string(),
            generated_doc_path: Some("/data/generated/contrat_3.pdf".to_string()),
            created_at: NaiveDateTime::default(),
        }
    }

    #[test]
    fn test_csv_has_header_and_one_line_per_row() {
        let csv = contracts_to_csv(&[row()]);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("id,store,prenom"));
    }

    #[test]
    fn test_csv_doubles_quotes_and_flattens_newlines() {
        let csv = contracts_to_csv(&[row()]);
        assert!(csv.contains("\"D\"\"UPONT\""));
        assert!(csv.contains("\"3 rue des Lilas 75011 Paris\""));
        assert!(!csv.contains("Lilas\n75011"));
    }
}
