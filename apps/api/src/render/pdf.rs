//! Paginating PDF renderer for the layout block list.
//!
//! Takes the ordered paragraphs and spacers from the flow builder and
//! produces the final byte stream: inline markup is resolved into styled
//! text runs, runs are word-wrapped against the text column, and blocks
//! flow top-to-bottom across A4 pages with equal 2.5 cm margins.
//! Paragraphs place atomically — a paragraph that does not fit moves to
//! the next page whole, so block order is preserved exactly.
//!
//! Text uses the base-14 Helvetica family with WinAnsi encoding, which
//! covers French accented text without embedding font files. Widths are
//! static approximations at 1000 units/em; the layout tolerances of a
//! paginated contract absorb the residual error.

use pdf_writer::{Content, Name, Pdf, Rect, Ref, Str};

use crate::render::flow::{Alignment, Block};

// ────────────────────────────────────────────────────────────────────────────
// Page geometry (points)
// ────────────────────────────────────────────────────────────────────────────

pub const A4_WIDTH: f32 = 595.276;
pub const A4_HEIGHT: f32 = 841.89;
/// Four equal margins of 2.5 cm.
pub const MARGIN: f32 = 70.866;

const USABLE_WIDTH: f32 = A4_WIDTH - 2.0 * MARGIN;
const PAGE_TOP: f32 = A4_HEIGHT - MARGIN;

/// Helvetica ascender at 1000 units/em; places the first baseline of a
/// paragraph inside its slot.
const ASCENDER_RATIO: f32 = 0.718;

// ────────────────────────────────────────────────────────────────────────────
// Inline markup
// ────────────────────────────────────────────────────────────────────────────

/// A run of text with uniform styling, produced from the flow builder's
/// minimal markup (`<b>`, `<u>`, escaped entities).
#[derive(Debug, Clone, PartialEq)]
struct Span {
    text: String,
    bold: bool,
    underline: bool,
}

/// Resolves `<b>`/`<u>` tags and the four entities into styled spans.
/// Anything unrecognized is kept literally — template content was escaped
/// upstream, so stray `<` or `&` can only come from the flow builder
/// itself.
fn parse_markup(input: &str) -> Vec<Span> {
    let mut spans: Vec<Span> = Vec::new();
    let mut current = String::new();
    let mut bold = false;
    let mut underline = false;

    let mut flush = |text: &mut String, bold: bool, underline: bool, spans: &mut Vec<Span>| {
        if !text.is_empty() {
            spans.push(Span {
                text: std::mem::take(text),
                bold,
                underline,
            });
        }
    };

    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '<' => {
                let mut tag = String::new();
                for t in chars.by_ref() {
                    if t == '>' {
                        break;
                    }
                    tag.push(t);
                }
                match tag.as_str() {
                    "b" | "/b" => {
                        flush(&mut current, bold, underline, &mut spans);
                        bold = tag == "b";
                    }
                    "u" | "/u" => {
                        flush(&mut current, bold, underline, &mut spans);
                        underline = tag == "u";
                    }
                    _ => {
                        current.push('<');
                        current.push_str(&tag);
                        current.push('>');
                    }
                }
            }
            '&' => {
                let mut entity = String::new();
                while let Some(&e) = chars.peek() {
                    chars.next();
                    if e == ';' {
                        break;
                    }
                    entity.push(e);
                    if entity.len() > 6 {
                        break;
                    }
                }
                match entity.as_str() {
                    "amp" => current.push('&'),
                    "lt" => current.push('<'),
                    "gt" => current.push('>'),
                    "nbsp" => current.push('\u{a0}'),
                    other => {
                        current.push('&');
                        current.push_str(other);
                    }
                }
            }
            _ => current.push(c),
        }
    }
    flush(&mut current, bold, underline, &mut spans);
    spans
}

// ────────────────────────────────────────────────────────────────────────────
// Helvetica metrics (WinAnsi, 1000 units/em)
// ────────────────────────────────────────────────────────────────────────────

/// Approximate advance width of one WinAnsi byte.
fn glyph_width(byte: u8, bold: bool) -> f32 {
    if bold {
        match byte {
            32 | 0xA0 => 278.0,          // space, nbsp
            33..=47 => 333.0,            // punctuation
            48..=57 => 556.0,            // digits
            58..=64 => 333.0,
            73 => 278.0,                 // I
            77 => 833.0,                 // M
            87 => 944.0,                 // W
            65..=90 => 722.0,            // uppercase
            91..=96 => 333.0,
            105 | 106 | 108 => 278.0,    // i j l
            102 | 116 => 333.0,          // f t
            114 => 389.0,                // r
            109 => 889.0,                // m
            119 => 778.0,                // w
            97..=122 => 574.0,           // lowercase
            0x96 => 556.0,               // en-dash
            0x97 => 1000.0,              // em-dash
            0xB7 => 278.0,               // middle dot
            0xC0..=0xDF => 722.0,        // accented uppercase
            0xE0..=0xFF => 574.0,        // accented lowercase
            _ => 500.0,
        }
    } else {
        match byte {
            32 | 0xA0 => 278.0,
            33..=47 => 333.0,
            48..=57 => 556.0,
            58..=64 => 333.0,
            73 | 74 => 278.0,            // I J
            77 => 833.0,                 // M
            87 => 944.0,                 // W
            65..=90 => 667.0,
            91..=96 => 333.0,
            105 | 106 | 108 => 222.0,    // i j l
            102 | 116 => 278.0,          // f t
            114 => 333.0,                // r
            109 => 833.0,                // m
            119 => 722.0,                // w
            97..=122 => 556.0,
            0x96 => 556.0,
            0x97 => 1000.0,
            0xB7 => 278.0,
            0xC0..=0xDF => 667.0,
            0xE0..=0xFF => 556.0,
            _ => 500.0,
        }
    }
}

/// Unicode → WinAnsi (Windows-1252). Characters outside the code page are
/// dropped, both when measuring and when showing text.
fn to_winansi_byte(c: char) -> Option<u8> {
    match c as u32 {
        0x0000..=0x007F => Some(c as u8),
        0x00A0..=0x00FF => Some(c as u8),
        0x20AC => Some(0x80),
        0x201A => Some(0x82),
        0x0192 => Some(0x83),
        0x201E => Some(0x84),
        0x2026 => Some(0x85),
        0x2020 => Some(0x86),
        0x2021 => Some(0x87),
        0x02C6 => Some(0x88),
        0x2030 => Some(0x89),
        0x0160 => Some(0x8A),
        0x2039 => Some(0x8B),
        0x0152 => Some(0x8C),
        0x017D => Some(0x8E),
        0x2018 => Some(0x91),
        0x2019 => Some(0x92),
        0x201C => Some(0x93),
        0x201D => Some(0x94),
        0x2022 => Some(0x95),
        0x2013 => Some(0x96),
        0x2014 => Some(0x97),
        0x02DC => Some(0x98),
        0x2122 => Some(0x99),
        0x0161 => Some(0x9A),
        0x203A => Some(0x9B),
        0x0153 => Some(0x9C),
        0x017E => Some(0x9E),
        0x0178 => Some(0x9F),
        _ => None,
    }
}

fn to_winansi_bytes(s: &str) -> Vec<u8> {
    s.chars().filter_map(to_winansi_byte).collect()
}

fn text_width(s: &str, font_size: f32, bold: bool) -> f32 {
    s.chars()
        .filter_map(to_winansi_byte)
        .map(|b| glyph_width(b, bold) * font_size / 1000.0)
        .sum()
}

// ────────────────────────────────────────────────────────────────────────────
// Word wrap
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct Chunk {
    text: String,
    bold: bool,
    underline: bool,
    /// x relative to the line start.
    x_offset: f32,
    width: f32,
}

#[derive(Debug, Clone)]
struct WrappedLine {
    chunks: Vec<Chunk>,
    width: f32,
}

fn finish_line(chunks: &mut Vec<Chunk>) -> WrappedLine {
    let width = chunks.last().map(|c| c.x_offset + c.width).unwrap_or(0.0);
    WrappedLine {
        chunks: std::mem::take(chunks),
        width,
    }
}

/// Greedy word wrap. Words split on ASCII spaces only, so non-breaking
/// spaces (bullet indents) stay attached to their word.
fn wrap_spans(spans: &[Span], font_size: f32, max_width: f32) -> Vec<WrappedLine> {
    let mut lines: Vec<WrappedLine> = Vec::new();
    let mut current: Vec<Chunk> = Vec::new();
    let mut current_x = 0.0_f32;

    for span in spans {
        let space_w = glyph_width(32, span.bold) * font_size / 1000.0;
        for word in span.text.split(' ').filter(|w| !w.is_empty()) {
            let word_w = text_width(word, font_size, span.bold);
            if !current.is_empty() && current_x + word_w > max_width {
                lines.push(finish_line(&mut current));
                current_x = 0.0;
            }
            current.push(Chunk {
                text: word.to_string(),
                bold: span.bold,
                underline: span.underline,
                x_offset: current_x,
                width: word_w,
            });
            current_x += word_w + space_w;
        }
    }
    if !current.is_empty() {
        lines.push(finish_line(&mut current));
    }
    if lines.is_empty() {
        lines.push(WrappedLine {
            chunks: vec![],
            width: 0.0,
        });
    }
    lines
}

// ────────────────────────────────────────────────────────────────────────────
// Pagination
// ────────────────────────────────────────────────────────────────────────────

/// A text run placed at an absolute position on one page.
#[derive(Debug, Clone)]
pub struct PlacedChunk {
    pub text: String,
    pub bold: bool,
    pub underline: bool,
    pub x: f32,
    /// Baseline y, PDF coordinates (origin bottom-left).
    pub y: f32,
    pub font_size: f32,
    pub width: f32,
}

#[derive(Debug, Clone, Default)]
pub struct Page {
    pub chunks: Vec<PlacedChunk>,
}

/// Flows the block list onto pages. Exposed separately from [`render`] so
/// pagination behavior is testable without parsing PDF bytes.
pub fn layout_pages(blocks: &[Block]) -> Vec<Page> {
    let mut pages = vec![Page::default()];
    let mut cursor = PAGE_TOP;

    for block in blocks {
        match block {
            Block::Spacer(h) => {
                if cursor - h < MARGIN {
                    pages.push(Page::default());
                    cursor = PAGE_TOP;
                } else {
                    cursor -= h;
                }
            }
            Block::Paragraph { text, style } => {
                let st = style.metrics();
                let spans = parse_markup(text);
                let lines = wrap_spans(&spans, st.font_size, USABLE_WIDTH);
                let content_h = lines.len() as f32 * st.leading;

                let at_top = (PAGE_TOP - cursor).abs() < 0.5;
                if !at_top && cursor - (st.space_before + content_h + st.space_after) < MARGIN {
                    pages.push(Page::default());
                    cursor = PAGE_TOP;
                } else if !at_top {
                    cursor -= st.space_before;
                }

                let page = pages.last_mut().expect("at least one page");
                let last_idx = lines.len() - 1;
                for (i, line) in lines.iter().enumerate() {
                    let baseline = cursor - ASCENDER_RATIO * st.font_size;
                    place_line(page, line, st.alignment, baseline, st.font_size, i == last_idx);
                    cursor -= st.leading;
                }
                cursor -= st.space_after;
            }
        }
    }
    pages
}

fn place_line(
    page: &mut Page,
    line: &WrappedLine,
    alignment: Alignment,
    baseline: f32,
    font_size: f32,
    is_last_line: bool,
) {
    let justified = alignment == Alignment::Justify && !is_last_line && line.chunks.len() > 1;
    let start_x = match alignment {
        Alignment::Center => MARGIN + (USABLE_WIDTH - line.width) / 2.0,
        Alignment::Left | Alignment::Justify => MARGIN,
    };
    let extra_per_gap = if justified {
        (USABLE_WIDTH - line.width) / (line.chunks.len() - 1) as f32
    } else {
        0.0
    };

    for (idx, chunk) in line.chunks.iter().enumerate() {
        page.chunks.push(PlacedChunk {
            text: chunk.text.clone(),
            bold: chunk.bold,
            underline: chunk.underline,
            x: start_x + chunk.x_offset + idx as f32 * extra_per_gap,
            y: baseline,
            font_size,
            width: chunk.width,
        });
    }
}

// ────────────────────────────────────────────────────────────────────────────
// PDF emission
// ────────────────────────────────────────────────────────────────────────────

const FONT_REGULAR: &[u8] = b"F1";
const FONT_BOLD: &[u8] = b"F2";

/// Renders the block list to a complete PDF byte stream.
pub fn render(blocks: &[Block]) -> Vec<u8> {
    let pages = layout_pages(blocks);

    let mut pdf = Pdf::new();
    let mut next_id = 1;
    let mut alloc = || {
        let r = Ref::new(next_id);
        next_id += 1;
        r
    };

    let catalog_id = alloc();
    let pages_id = alloc();
    let regular_id = alloc();
    let bold_id = alloc();

    pdf.type1_font(regular_id)
        .base_font(Name(b"Helvetica"))
        .encoding_predefined(Name(b"WinAnsiEncoding"));
    pdf.type1_font(bold_id)
        .base_font(Name(b"Helvetica-Bold"))
        .encoding_predefined(Name(b"WinAnsiEncoding"));

    let page_ids: Vec<Ref> = pages.iter().map(|_| alloc()).collect();
    let content_ids: Vec<Ref> = pages.iter().map(|_| alloc()).collect();

    for (page, &content_id) in pages.iter().zip(&content_ids) {
        let mut content = Content::new();
        for chunk in &page.chunks {
            let font = if chunk.bold { FONT_BOLD } else { FONT_REGULAR };
            content
                .begin_text()
                .set_font(Name(font), chunk.font_size)
                .next_line(chunk.x, chunk.y)
                .show(Str(&to_winansi_bytes(&chunk.text)))
                .end_text();
            if chunk.underline {
                content
                    .set_line_width(0.6)
                    .move_to(chunk.x, chunk.y - 1.5)
                    .line_to(chunk.x + chunk.width, chunk.y - 1.5)
                    .stroke();
            }
        }
        pdf.stream(content_id, &content.finish());
    }

    pdf.catalog(catalog_id).pages(pages_id);
    pdf.pages(pages_id)
        .kids(page_ids.iter().copied())
        .count(page_ids.len() as i32);

    for (i, &page_id) in page_ids.iter().enumerate() {
        let mut page = pdf.page(page_id);
        page.media_box(Rect::new(0.0, 0.0, A4_WIDTH, A4_HEIGHT))
            .parent(pages_id)
            .contents(content_ids[i]);
        page.resources()
            .fonts()
            .pair(Name(FONT_REGULAR), regular_id)
            .pair(Name(FONT_BOLD), bold_id);
    }

    pdf.finish()
}
