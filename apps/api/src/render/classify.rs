//! Line classification for plain-text contract templates.
//!
//! Templates carry no markup: document structure (title, article headings,
//! the "d'une part, / et, / d'autre part" intro markers, bullet lists) is
//! inferred from textual patterns alone. Each line is classified with
//! lookahead to the next non-blank line and lookback to the previous one,
//! because spacing decisions hinge on what surrounds a line, not just the
//! line itself.

use once_cell::sync::Lazy;
use regex::Regex;

/// `ARTICLE 3 – DURÉE DU CONTRAT`, tolerating hyphen, en-dash, or em-dash
/// and any casing of the word ARTICLE.
static ARTICLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^ARTICLE\s+(\d+)\s*[-\u{2013}\u{2014}]\s*(.+)$").unwrap());

/// Which intro marker a line is. The contract preamble names the employer
/// ("d'une part,"), then the employee ("et," ... "d'autre part").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    PartyOne,
    And,
    PartyTwo,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineRole {
    Blank,
    Title,
    ArticleHeading { number: String, heading: String },
    IntroMarker(MarkerKind),
    Bullet,
    Paragraph,
}

/// One template line with its inferred role and spacing directives.
#[derive(Debug, Clone)]
pub struct ClassifiedLine {
    /// Trimmed line text.
    pub text: String,
    pub role: LineRole,
    /// True when the next non-blank line is the "d'une part," marker: a
    /// blank here must not become a spacer, the marker hugs the text above.
    pub suppress_spacer: bool,
    /// True for paragraph text immediately preceding "d'une part," —
    /// rendered in the tight style variant (no trailing space).
    pub tight: bool,
    /// Previous non-blank line, lowercased. Empty at the top of the
    /// document. Consumed by the flow builder's signature-block rule.
    pub prev_lower: String,
}

/// Classifies every line of the substituted template text, in order.
pub fn classify(text: &str) -> Vec<ClassifiedLine> {
    let lines: Vec<&str> = text.lines().collect();
    let mut out = Vec::with_capacity(lines.len());
    let mut title_done = false;

    for (i, raw) in lines.iter().enumerate() {
        let trimmed = raw.trim();
        let next_lower = next_non_blank(&lines, i);
        let prev_lower = prev_non_blank(&lines, i);
        let next_is_party_one = next_lower.as_deref().is_some_and(is_party_one);

        let role = classify_one(trimmed, title_done);
        if role == LineRole::Title {
            title_done = true;
        }

        out.push(ClassifiedLine {
            text: trimmed.to_string(),
            tight: role == LineRole::Paragraph && next_is_party_one,
            suppress_spacer: next_is_party_one,
            role,
            prev_lower: prev_lower.unwrap_or_default(),
        });
    }
    out
}

/// Applies the classification rules to one trimmed line, first match wins.
fn classify_one(trimmed: &str, title_done: bool) -> LineRole {
    if trimmed.is_empty() {
        return LineRole::Blank;
    }
    if !title_done && is_all_caps(trimmed) && trimmed.chars().count() > 30 {
        return LineRole::Title;
    }
    if let Some(caps) = ARTICLE_RE.captures(trimmed) {
        return LineRole::ArticleHeading {
            number: caps[1].to_string(),
            heading: caps[2].trim().to_string(),
        };
    }
    let lower = trimmed.to_lowercase();
    if is_party_one(&lower) {
        return LineRole::IntroMarker(MarkerKind::PartyOne);
    }
    if lower == "et," || lower.starts_with("et,") {
        return LineRole::IntroMarker(MarkerKind::And);
    }
    if lower.starts_with("d'autre part") || lower.starts_with("d\u{2019}autre part") {
        return LineRole::IntroMarker(MarkerKind::PartyTwo);
    }
    if trimmed.starts_with('\u{b7}') || (trimmed.starts_with('-') && trimmed.chars().count() > 2) {
        return LineRole::Bullet;
    }
    LineRole::Paragraph
}

/// The "d'une part," marker, tolerating both apostrophe variants.
/// `lower` must already be trimmed and lowercased.
fn is_party_one(lower: &str) -> bool {
    lower == "d'une part," || lower == "d\u{2019}une part,"
}

/// All cased characters upper-case, with at least one cased character.
fn is_all_caps(s: &str) -> bool {
    s.chars().any(char::is_alphabetic) && !s.chars().any(char::is_lowercase)
}

fn next_non_blank(lines: &[&str], i: usize) -> Option<String> {
    lines[i + 1..]
        .iter()
        .find(|l| !l.trim().is_empty())
        .map(|l| l.trim().to_lowercase())
}

fn prev_non_blank(lines: &[&str], i: usize) -> Option<String> {
    lines[..i]
        .iter()
        .rev()
        .find(|l| !l.trim().is_empty())
        .map(|l| l.trim().to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roles(text: &str) -> Vec<LineRole> {
        classify(text).into_iter().map(|l| l.role).collect()
    }

    #[test]
    fn test_first_long_uppercase_line_is_title() {
        let text = "LE PR\u{c9}SENT CONTRAT DE TRAVAIL EST CONCLU ENTRE LES PARTIES SUIVANTES";
        assert_eq!(roles(text), vec![LineRole::Title]);
    }

    #[test]
    fn test_title_assigned_only_once() {
        let text = "LE PR\u{c9}SENT CONTRAT DE TRAVAIL EST CONCLU ENTRE LES PARTIES SUIVANTES\n\
                    UNE AUTRE LIGNE EN MAJUSCULES LARGEMENT ASSEZ LONGUE AUSSI";
        let r = roles(text);
        assert_eq!(r[0], LineRole::Title);
        assert_eq!(r[1], LineRole::Paragraph);
    }

    #[test]
    fn test_short_uppercase_line_is_not_title() {
        assert_eq!(roles("CONTRAT DE TRAVAIL"), vec![LineRole::Paragraph]);
    }

    #[test]
    fn test_article_heading_en_dash() {
        let r = roles("ARTICLE 3 \u{2013} DUR\u{c9}E DU CONTRAT");
        assert_eq!(
            r,
            vec![LineRole::ArticleHeading {
                number: "3".to_string(),
                heading: "DUR\u{c9}E DU CONTRAT".to_string(),
            }]
        );
    }

    #[test]
    fn test_article_heading_hyphen_mixed_case() {
        let r = roles("Article 12 - R\u{e9}mun\u{e9}ration");
        assert_eq!(
            r,
            vec![LineRole::ArticleHeading {
                number: "12".to_string(),
                heading: "R\u{e9}mun\u{e9}ration".to_string(),
            }]
        );
    }

    #[test]
    fn test_intro_markers_both_apostrophes() {
        assert_eq!(
            roles("D'une part,"),
            vec![LineRole::IntroMarker(MarkerKind::PartyOne)]
        );
        assert_eq!(
            roles("D\u{2019}une part,"),
            vec![LineRole::IntroMarker(MarkerKind::PartyOne)]
        );
        assert_eq!(roles("Et,"), vec![LineRole::IntroMarker(MarkerKind::And)]);
        assert_eq!(
            roles("D'autre part,"),
            vec![LineRole::IntroMarker(MarkerKind::PartyTwo)]
        );
    }

    #[test]
    fn test_bullets() {
        assert_eq!(roles("\u{b7} premier point"), vec![LineRole::Bullet]);
        assert_eq!(roles("- deuxi\u{e8}me point"), vec![LineRole::Bullet]);
        // A bare dash is too short to be a bullet.
        assert_eq!(roles("-"), vec![LineRole::Paragraph]);
    }

    #[test]
    fn test_tight_and_suppress_before_party_marker() {
        let text = "La soci\u{e9}t\u{e9} AEJB, SAS au capital de 1000 euros,\n\nD'une part,";
        let lines = classify(text);
        assert!(lines[0].tight, "paragraph before the marker is tight");
        assert!(lines[1].suppress_spacer, "blank before the marker is suppressed");
        assert_eq!(lines[2].role, LineRole::IntroMarker(MarkerKind::PartyOne));
    }

    #[test]
    fn test_mentioning_dune_part_mid_sentence_does_not_suppress() {
        let text = "Le salaire comprend d'une part le fixe, d'autre chose.\n\nSuite du texte.";
        let lines = classify(text);
        assert!(!lines[1].suppress_spacer);
    }

    #[test]
    fn test_prev_lower_skips_blanks() {
        let text = "Pour la soci\u{e9}t\u{e9} AEJB,\n\nMonsieur Martin";
        let lines = classify(text);
        assert_eq!(lines[2].prev_lower, "pour la soci\u{e9}t\u{e9} aejb,");
    }
}
