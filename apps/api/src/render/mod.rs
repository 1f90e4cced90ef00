//! Contract rendering engine.
//!
//! Pipeline: token values are prepared (dates normalized, trial-period end
//! derived), the store's plain-text template is resolved and decoded, tokens
//! are substituted, lines are classified into structural roles, the flow
//! builder emits styled paragraphs and spacers, and the paginating renderer
//! produces the PDF bytes.
//!
//! One invocation owns all intermediate state; nothing is shared across
//! concurrent renders except the output directory, and filenames embed the
//! contract id plus a UTC timestamp so concurrent writers never collide.

pub mod classify;
pub mod dates;
pub mod flow;
pub mod pdf;
pub mod template;

use std::path::{Path, PathBuf};

use chrono::Utc;
use thiserror::Error;
use tracing::info;

use crate::models::contract::ContractRow;
use crate::render::template::{TemplateStore, TokenMap};

#[derive(Debug, Error)]
pub enum RenderError {
    /// No template exists for the store. Fatal: there is no default
    /// template to fall back to.
    #[error("aucun template de contrat pour le magasin '{store}' (attendu: {path})")]
    TemplateNotFound { store: String, path: PathBuf },

    /// The template file exists but could not be read.
    #[error("lecture du template {path} impossible")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Any failure while producing or writing the final document. Callers
    /// see one error kind for the whole rendering phase, with the cause
    /// attached.
    #[error("\u{e9}chec de la g\u{e9}n\u{e9}ration du PDF: {0}")]
    Rendering(#[source] anyhow::Error),
}

/// Renders employment contracts to PDF files.
///
/// Constructed once at startup from the loaded configuration; the template
/// and output directories are fixed for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct ContractRenderer {
    templates: TemplateStore,
    output_dir: PathBuf,
}

impl ContractRenderer {
    pub fn new(templates_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            templates: TemplateStore::new(templates_dir),
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Renders the contract to PDF bytes without touching the filesystem
    /// output path.
    pub fn render_bytes(&self, store: &str, tokens: &TokenMap) -> Result<Vec<u8>, RenderError> {
        let text = self.templates.load(store)?;
        let substituted = template::substitute(&text, tokens);
        let lines = classify::classify(&substituted);
        let story = flow::build_flow(&lines);
        Ok(pdf::render(&story))
    }

    /// Renders a contract record and writes the PDF under the output
    /// directory. Returns the written path.
    pub fn generate(&self, contract: &ContractRow) -> Result<PathBuf, RenderError> {
        let tokens = token_map(contract);
        let bytes = self.render_bytes(&contract.store, &tokens)?;

        std::fs::create_dir_all(&self.output_dir)
            .map_err(|e| RenderError::Rendering(anyhow::Error::new(e)))?;
        let filename = format!(
            "contrat_{}_{}.pdf",
            contract.id,
            Utc::now().format("%Y%m%d%H%M%S")
        );
        let path = self.output_dir.join(filename);
        std::fs::write(&path, &bytes)
            .map_err(|e| RenderError::Rendering(anyhow::Error::new(e)))?;

        info!(contract_id = contract.id, path = %path.display(), "contract PDF generated");
        Ok(path)
    }
}

/// Builds the template token map from a contract record.
///
/// Every token is present even when the underlying field is empty, and the
/// two date tokens are normalized to `DD/MM/YYYY`. The trial-period end is
/// the start date plus two months, day-clamped.
pub fn token_map(contract: &ContractRow) -> TokenMap {
    let date_debut = dates::format_fr_date(&contract.date_debut);
    let fin_essai = dates::trial_period_end(&date_debut);

    let mut tokens = TokenMap::new();
    tokens.insert("{{Pr\u{e9}nom}}".to_string(), contract.prenom.clone());
    tokens.insert("{{Nom}}".to_string(), contract.nom.clone());
    tokens.insert(
        "{{Date_de_naissance}}".to_string(),
        dates::format_fr_date(&contract.date_naissance),
    );
    tokens.insert(
        "{{Lieu de naissance}}".to_string(),
        contract.lieu_naissance.clone(),
    );
    tokens.insert("{{Adresse}}".to_string(), contract.adresse.clone());
    tokens.insert(
        "{{Nationalit\u{e9}}}".to_string(),
        contract.nationalite.clone(),
    );
    tokens.insert(
        "{{Num\u{e9}ro de secu}}".to_string(),
        contract.numero_secu.clone(),
    );
    tokens.insert("{{Date_debut}}".to_string(), date_debut);
    tokens.insert("{{Date_fin_periode_essai}}".to_string(), fin_essai);
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::contract::ContractRow;

    fn sample_contract() -> ContractRow {
        ContractRow {
            id: 7,
            store: "AEJB".to_string(),
            prenom: "Marie".to_string(),
            nom: "DUPONT".to_string(),
            date_naissance: "1998-06-07".to_string(),
            lieu_naissance: "Lyon".to_string(),
            adresse: "3 rue des Lilas, 75011 Paris".to_string(),
            nationalite: "Fran\u{e7}aise".to_string(),
            numero_secu: "298067512345678".to_string(),
            date_debut: "2024-01-31".to_string(),
            status: "created".to_string(),
            generated_doc_path: None,
            created_at: chrono::NaiveDateTime::default(),
        }
    }

    const TEMPLATE: &str = "\
CONTRAT DE TRAVAIL \u{c0} DUR\u{c9}E IND\u{c9}TERMIN\u{c9}E \u{c0} TEMPS PLEIN

La soci\u{e9}t\u{e9} AEJB, SAS immatricul\u{e9}e au RCS de Paris,

D'une part,
Et,
{{Pr\u{e9}nom}} {{Nom}}, n\u{e9}(e) le {{Date_de_naissance}} \u{e0} {{Lieu de naissance}},
D'autre part,

ARTICLE 1 \u{2013} ENGAGEMENT
Le salari\u{e9} est engag\u{e9} \u{e0} compter du {{Date_debut}}.
La p\u{e9}riode d'essai s'ach\u{e8}vera le {{Date_fin_periode_essai}}.
";

    #[test]
    fn test_token_map_normalizes_dates_and_trial_end() {
        let tokens = token_map(&sample_contract());
        assert_eq!(tokens["{{Date_debut}}"], "31/01/2024");
        // +2 months from 31/01 clamps to the end of leap-year March? No:
        // 31 January + 2 months = 31 March, a valid day.
        assert_eq!(tokens["{{Date_fin_periode_essai}}"], "31/03/2024");
        assert_eq!(tokens["{{Date_de_naissance}}"], "07/06/1998");
        assert_eq!(tokens["{{Nom}}"], "DUPONT");
    }

    #[test]
    fn test_generate_writes_pdf_named_after_contract() {
        let templates = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        std::fs::write(templates.path().join("AEJB_CDI_VENDEUR.txt"), TEMPLATE).unwrap();

        let renderer = ContractRenderer::new(templates.path(), out.path());
        let path = renderer.generate(&sample_contract()).unwrap();

        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("contrat_7_"), "got {name}");
        assert!(name.ends_with(".pdf"));
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
    }

    #[test]
    fn test_generate_unknown_store_is_fatal_and_names_store() {
        let templates = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let renderer = ContractRenderer::new(templates.path(), out.path());
        let mut contract = sample_contract();
        contract.store = "NOPE".to_string();
        let err = renderer.generate(&contract).unwrap_err();
        assert!(matches!(err, RenderError::TemplateNotFound { .. }));
        assert!(err.to_string().contains("NOPE"));
    }

    #[test]
    fn test_render_bytes_substitutes_all_tokens() {
        let templates = tempfile::tempdir().unwrap();
        std::fs::write(templates.path().join("AEJB_CDI_VENDEUR.txt"), TEMPLATE).unwrap();
        let renderer = ContractRenderer::new(templates.path(), "/tmp/unused");
        let tokens = token_map(&sample_contract());
        // The classified/substituted text feeding the PDF no longer holds
        // any mapped placeholder; check via the template module directly.
        let text = renderer.templates.load("AEJB").unwrap();
        let substituted = template::substitute(&text, &tokens);
        for key in tokens.keys() {
            assert!(!substituted.contains(key), "{key} not replaced");
        }
        let bytes = renderer.render_bytes("AEJB", &tokens).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
    }
}
