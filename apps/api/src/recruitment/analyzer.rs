//! CV analysis: weighted criteria + uploaded CVs → one scoring call.

use std::collections::BTreeMap;

use serde_json::{json, Value};

use crate::errors::AppError;
use crate::extraction::UploadedDocument;
use crate::llm_client::{ContentPart, LlmClient};
use crate::recruitment::prompts::CV_ANALYZER_SYSTEM;

/// Criteria coefficients live in 0..=3 (0 = ignored, 3 = decisive).
const MAX_COEFFICIENT: i64 = 3;

/// CV text is truncated before it reaches the model; beyond this the
/// signal is exhausted and tokens are wasted.
const MAX_CV_CHARS: usize = 8000;

/// Parses the client's criteria JSON, `{key: {label, coefficient}}`,
/// into `{key: coefficient}` with coefficients clamped to 0..=3.
///
/// Malformed JSON yields no criteria rather than a 400; the files are the
/// valuable part of the request.
pub fn parse_criteria(raw: &str) -> BTreeMap<String, i64> {
    let Ok(Value::Object(entries)) = serde_json::from_str::<Value>(raw) else {
        return BTreeMap::new();
    };
    entries
        .into_iter()
        .map(|(key, spec)| {
            let coefficient = spec
                .get("coefficient")
                .and_then(Value::as_i64)
                .unwrap_or(0)
                .clamp(0, MAX_COEFFICIENT);
            (key, coefficient)
        })
        .collect()
}

/// Builds the user content for one analysis call: the role + criteria as a
/// JSON text block, followed by one block per readable CV.
pub fn build_content(
    role: &str,
    criteria: &BTreeMap<String, i64>,
    files: &[UploadedDocument],
) -> Vec<ContentPart> {
    let mut content = vec![ContentPart::text(
        json!({ "role": role, "criteres": criteria }).to_string(),
    )];

    for file in files {
        if file.mime == "application/pdf" {
            match pdf_extract::extract_text_from_mem(&file.bytes) {
                Ok(text) => {
                    let clipped: String = text.chars().take(MAX_CV_CHARS).collect();
                    content.push(ContentPart::text(format!(
                        "[PDF:{}]\n{clipped}",
                        file.filename
                    )));
                }
                Err(_) => content.push(ContentPart::text(format!("[FICHIER:{}]", file.filename))),
            }
        } else if file.mime.starts_with("image/") {
            content.push(ContentPart::image(file.mime.clone(), &file.bytes));
        } else {
            // Unreadable format: keep a marker so the model knows a file
            // was provided but not its contents.
            content.push(ContentPart::text(format!("[FICHIER:{}]", file.filename)));
        }
    }
    content
}

/// Runs the analysis and returns the model's scored-candidate payload
/// verbatim.
pub async fn analyze(
    llm: &LlmClient,
    role: &str,
    criteria: &BTreeMap<String, i64>,
    files: &[UploadedDocument],
) -> Result<Value, AppError> {
    let content = build_content(role, criteria, files);
    llm.call_json::<Value>(&content, CV_ANALYZER_SYSTEM)
        .await
        .map_err(|e| AppError::Llm(format!("CV analysis failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn test_parse_criteria_clamps_coefficients() {
        let raw = r#"{
            "experience": {"label": "Experience en vente", "coefficient": 5},
            "ponctualite": {"label": "Ponctualite", "coefficient": -2},
            "vente": {"label": "Vente", "coefficient": 2}
        }"#;
        let parsed = parse_criteria(raw);
        assert_eq!(parsed["experience"], 3);
        assert_eq!(parsed["ponctualite"], 0);
        assert_eq!(parsed["vente"], 2);
    }

    #[test]
    fn test_parse_criteria_lenient_on_garbage() {
        assert!(parse_criteria("not json").is_empty());
        assert!(parse_criteria("[1,2,3]").is_empty());
        let parsed = parse_criteria(r#"{"a": {"coefficient": "trois"}}"#);
        assert_eq!(parsed["a"], 0);
    }

    #[test]
    fn test_build_content_leads_with_role_and_criteria() {
        let criteria = BTreeMap::from([("vente".to_string(), 2)]);
        let content = build_content("Vendeur", &criteria, &[]);
        assert_eq!(content.len(), 1);
        let json = serde_json::to_value(&content[0]).unwrap();
        let text = json["text"].as_str().unwrap();
        assert!(text.contains("Vendeur"));
        assert!(text.contains("vente"));
    }

    #[test]
    fn test_build_content_unknown_format_becomes_marker() {
        let files = vec![UploadedDocument {
            filename: "cv.docx".to_string(),
            mime: "application/msword".to_string(),
            bytes: Bytes::from_static(b"xxxx"),
        }];
        let content = build_content("Vendeur", &BTreeMap::new(), &files);
        let json = serde_json::to_value(&content[1]).unwrap();
        assert_eq!(json["text"], "[FICHIER:cv.docx]");
    }

    #[test]
    fn test_build_content_image_passes_through() {
        let files = vec![UploadedDocument {
            filename: "cv.png".to_string(),
            mime: "image/png".to_string(),
            bytes: Bytes::from_static(&[0x89, 0x50]),
        }];
        let content = build_content("Vendeur", &BTreeMap::new(), &files);
        let json = serde_json::to_value(&content[1]).unwrap();
        assert_eq!(json["type"], "image");
        assert_eq!(json["source"]["media_type"], "image/png");
    }
}
