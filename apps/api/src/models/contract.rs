use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One row of the `contracts` table. Every identity field is stored as the
/// string the extractor/operator supplied; normalization happens when the
/// token map is built, not at rest.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ContractRow {
    pub id: i64,
    pub store: String,
    pub prenom: String,
    pub nom: String,
    pub date_naissance: String,
    pub lieu_naissance: String,
    pub adresse: String,
    pub nationalite: String,
    pub numero_secu: String,
    pub date_debut: String,
    /// `created` until the PDF exists, then `generated`.
    pub status: String,
    pub generated_doc_path: Option<String>,
    pub created_at: NaiveDateTime,
}

/// Payload for POST /contracts. Absent fields default to empty strings so
/// a partially extracted document still yields a record (and a contract
/// with visible gaps to fill in).
#[derive(Debug, Deserialize)]
pub struct ContractCreate {
    pub store: String,
    #[serde(default)]
    pub prenom: String,
    #[serde(default)]
    pub nom: String,
    #[serde(default)]
    pub date_naissance: String,
    #[serde(default)]
    pub lieu_naissance: String,
    #[serde(default)]
    pub adresse: String,
    #[serde(default)]
    pub nationalite: String,
    #[serde(default)]
    pub numero_secu: String,
    #[serde(default)]
    pub date_debut: String,
}

/// Contract as exposed over the API: the row plus the download URL of the
/// generated document, when one exists under the served output directory.
#[derive(Debug, Serialize)]
pub struct ContractRead {
    pub id: i64,
    pub store: String,
    pub prenom: String,
    pub nom: String,
    pub date_naissance: String,
    pub lieu_naissance: String,
    pub adresse: String,
    pub nationalite: String,
    pub numero_secu: String,
    pub date_debut: String,
    pub status: String,
    pub generated_doc_url: Option<String>,
    pub created_at: NaiveDateTime,
}

impl ContractRead {
    pub fn from_row(row: ContractRow, generated_doc_url: Option<String>) -> Self {
        Self {
            id: row.id,
            store: row.store,
            prenom: row.prenom,
            nom: row.nom,
            date_naissance: row.date_naissance,
            lieu_naissance: row.lieu_naissance,
            adresse: row.adresse,
            nationalite: row.nationalite,
            numero_secu: row.numero_secu,
            date_debut: row.date_debut,
            status: row.status,
            generated_doc_url,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ContractsListResponse {
    pub items: Vec<ContractRead>,
    pub total: i64,
}
