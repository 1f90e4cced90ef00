//! Template resolution, decoding, and token substitution.
//!
//! Each store has exactly one seller-contract template on disk,
//! `<templates_dir>/<STORE>_CDI_VENDEUR.txt`. A missing file is a hard
//! error naming the store — there is no default template to fall back to.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::RenderError;

/// Placeholder → replacement value. Ordered so substitution is
/// deterministic across runs.
pub type TokenMap = BTreeMap<String, String>;

/// Resolves store keys to template files under a fixed directory.
#[derive(Debug, Clone)]
pub struct TemplateStore {
    dir: PathBuf,
}

impl TemplateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the template path for a store, failing if the file does not
    /// exist.
    pub fn resolve(&self, store: &str) -> Result<PathBuf, RenderError> {
        let path = self.dir.join(format!("{store}_CDI_VENDEUR.txt"));
        if path.is_file() {
            Ok(path)
        } else {
            Err(RenderError::TemplateNotFound {
                store: store.to_string(),
                path,
            })
        }
    }

    /// Resolves and reads the template text for a store.
    pub fn load(&self, store: &str) -> Result<String, RenderError> {
        read_template(&self.resolve(store)?)
    }
}

/// Reads a template file as UTF-8, falling back to Latin-1 for legacy
/// files exported from office tooling.
pub fn read_template(path: &Path) -> Result<String, RenderError> {
    let bytes = std::fs::read(path).map_err(|source| RenderError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => latin1_to_string(err.as_bytes()),
    })
}

/// Latin-1 maps each byte to the Unicode code point of the same value.
fn latin1_to_string(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// Replaces every occurrence of every token in `text`.
///
/// Plain substring substitution, one pass per key. Tokens absent from the
/// map stay verbatim in the output. Precondition on the template set: no
/// configured placeholder is a substring of another placeholder, so the
/// key application order cannot corrupt the output.
pub fn substitute(text: &str, tokens: &TokenMap) -> String {
    let mut out = text.to_string();
    for (token, value) in tokens {
        out = out.replace(token.as_str(), value);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_substitute_is_noop_without_matching_tokens() {
        let mut tokens = TokenMap::new();
        tokens.insert("{{Nom}}".to_string(), "DUPONT".to_string());
        let text = "Aucune balise ici.";
        assert_eq!(substitute(text, &tokens), text);
    }

    #[test]
    fn test_substitute_replaces_every_occurrence() {
        let mut tokens = TokenMap::new();
        tokens.insert("{{Nom}}".to_string(), "DUPONT".to_string());
        tokens.insert("{{Pr\u{e9}nom}}".to_string(), "Marie".to_string());
        let text = "{{Pr\u{e9}nom}} {{Nom}}, ci-apr\u{e8}s {{Nom}}";
        let out = substitute(text, &tokens);
        assert_eq!(out, "Marie DUPONT, ci-apr\u{e8}s DUPONT");
        assert!(!out.contains("{{Nom}}"));
        assert!(!out.contains("{{Pr\u{e9}nom}}"));
    }

    #[test]
    fn test_substitute_leaves_unmapped_tokens_verbatim() {
        let tokens = TokenMap::new();
        let text = "Bonjour {{Inconnu}}";
        assert_eq!(substitute(text, &tokens), "Bonjour {{Inconnu}}");
    }

    #[test]
    fn test_resolve_missing_template_names_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = TemplateStore::new(dir.path());
        let err = store.resolve("AEJB").unwrap_err();
        assert!(err.to_string().contains("AEJB"), "error was: {err}");
    }

    #[test]
    fn test_load_utf8_template() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("AEJB_CDI_VENDEUR.txt"), "caf\u{e9}").unwrap();
        let store = TemplateStore::new(dir.path());
        assert_eq!(store.load("AEJB").unwrap(), "caf\u{e9}");
    }

    #[test]
    fn test_load_falls_back_to_latin1() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("JAB_CDI_VENDEUR.txt");
        // "café" in Latin-1: é = 0xE9, invalid as UTF-8.
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(&[b'c', b'a', b'f', 0xE9]).unwrap();
        drop(f);
        let store = TemplateStore::new(dir.path());
        assert_eq!(store.load("JAB").unwrap(), "caf\u{e9}");
    }
}
