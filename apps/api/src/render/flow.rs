//! Flow builder: classified lines → ordered layout blocks.
//!
//! A block is either a styled paragraph or a vertical spacer. Block order
//! is the document's visual top-to-bottom order and is load-bearing: the
//! paginating renderer consumes the list as-is, so every spacing decision
//! is made here, once.
//!
//! The pass is single-direction with no backtracking, except the one-step
//! removal of a trailing spacer when an intro marker must hug the text
//! above it.

use crate::render::classify::{ClassifiedLine, LineRole};

// ────────────────────────────────────────────────────────────────────────────
// Styles
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Center,
    Justify,
}

/// Named paragraph styles, mirroring the professional contract layout:
/// a large centered title, bold underlined article headings, justified
/// body text, a tight body variant before intro markers, and the markers
/// themselves with no spacing of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleId {
    Title,
    Article,
    Normal,
    NormalTight,
    Marker,
}

/// Vertical metrics and alignment for one style. Sizes in points.
#[derive(Debug, Clone, Copy)]
pub struct ParagraphStyle {
    pub font_size: f32,
    pub leading: f32,
    pub space_before: f32,
    pub space_after: f32,
    pub alignment: Alignment,
}

impl StyleId {
    pub fn metrics(self) -> ParagraphStyle {
        match self {
            StyleId::Title => ParagraphStyle {
                font_size: 16.0,
                leading: 20.0,
                space_before: 0.0,
                space_after: 36.0,
                alignment: Alignment::Center,
            },
            StyleId::Article => ParagraphStyle {
                font_size: 11.0,
                leading: 16.0,
                space_before: 16.0,
                space_after: 12.0,
                alignment: Alignment::Left,
            },
            StyleId::Normal | StyleId::NormalTight => ParagraphStyle {
                font_size: 10.0,
                leading: NORMAL_LEADING,
                space_before: 0.0,
                space_after: 0.0,
                alignment: Alignment::Justify,
            },
            StyleId::Marker => ParagraphStyle {
                font_size: 10.0,
                leading: NORMAL_LEADING,
                space_before: 0.0,
                space_after: 0.0,
                alignment: Alignment::Justify,
            },
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Blocks
// ────────────────────────────────────────────────────────────────────────────

/// An atomic renderable unit. Paragraph text carries minimal inline markup
/// (`<b>`, `<u>`, and the escaped entities) interpreted by the renderer.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Paragraph { text: String, style: StyleId },
    Spacer(f32),
}

impl Block {
    pub fn is_spacer(&self) -> bool {
        matches!(self, Block::Spacer(_))
    }
}

/// Spacer emitted for a blank template line.
const BLANK_SPACER: f32 = 10.0;
/// Spacer following the document title.
const TITLE_SPACER: f32 = 28.0;
/// Breathing room after header-like lines ending in ':'.
const HEADER_SPACER: f32 = 6.0;
/// Body line height, also the unit of double-spacing after intro markers.
const NORMAL_LEADING: f32 = 16.0;

/// Signature-block special case: the president's signature line gets two
/// of these after it, but only directly under the company line. Document
/// specific, deliberately isolated from the general rules above.
const SIGNATURE_SPACER: f32 = 16.0;
const PRESIDENT_SIGNATURE: &str = "Monsieur Anthony BOUSKILA, Pr\u{e9}sident";
const COMPANY_SIGNATURE_LINE: &str = "pour la soci\u{e9}t\u{e9} aejb,";

/// Four non-breaking spaces indenting bullet items.
const BULLET_INDENT: &str = "&nbsp;&nbsp;&nbsp;&nbsp;";

// ────────────────────────────────────────────────────────────────────────────
// Builder
// ────────────────────────────────────────────────────────────────────────────

/// Builds the ordered block list for a classified document.
pub fn build_flow(lines: &[ClassifiedLine]) -> Vec<Block> {
    let mut story: Vec<Block> = Vec::new();

    for line in lines {
        match &line.role {
            LineRole::Blank => {
                if !line.suppress_spacer {
                    story.push(Block::Spacer(BLANK_SPACER));
                }
                continue;
            }
            LineRole::Title => {
                story.push(Block::Paragraph {
                    text: format!("<b>{}</b>", escape_markup(&line.text)),
                    style: StyleId::Title,
                });
                story.push(Block::Spacer(TITLE_SPACER));
            }
            LineRole::ArticleHeading { number, heading } => {
                // Always an en-dash in the output, whatever the template used.
                story.push(Block::Paragraph {
                    text: format!(
                        "<b><u>ARTICLE {number} \u{2013} {}</u></b>",
                        escape_markup(heading)
                    ),
                    style: StyleId::Article,
                });
            }
            LineRole::IntroMarker(_) => {
                // Markers hug the preceding text: drop a trailing spacer,
                // then double-space after the marker.
                if story.last().is_some_and(Block::is_spacer) {
                    story.pop();
                }
                story.push(Block::Paragraph {
                    text: escape_markup(&line.text),
                    style: StyleId::Marker,
                });
                story.push(Block::Spacer(NORMAL_LEADING));
                story.push(Block::Spacer(NORMAL_LEADING));
            }
            LineRole::Bullet => {
                story.push(Block::Paragraph {
                    text: format!("{BULLET_INDENT}{}", escape_markup(&line.text)),
                    style: StyleId::Normal,
                });
            }
            LineRole::Paragraph => {
                let style = if line.tight {
                    StyleId::NormalTight
                } else {
                    StyleId::Normal
                };
                story.push(Block::Paragraph {
                    text: escape_markup(&line.text),
                    style,
                });
            }
        }

        // Per-paragraph post-step, independent of role.
        if line.text.ends_with(':') {
            story.push(Block::Spacer(HEADER_SPACER));
        }
        if line.text.contains(PRESIDENT_SIGNATURE) && line.prev_lower == COMPANY_SIGNATURE_LINE {
            story.push(Block::Spacer(SIGNATURE_SPACER));
            story.push(Block::Spacer(SIGNATURE_SPACER));
        }
    }
    story
}

/// Escapes the three XML metacharacters so template content can never be
/// read as styling markup. Applied before any `<b>`/`<u>` wrapping.
pub fn escape_markup(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
