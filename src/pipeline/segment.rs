//! Content segmentation: split extracted text into per-slide chunks.
//!
//! ## Algorithm
//!
//! ```text
//! text ──▶ sections ──▶ body pieces ──▶ keep / overflow ──▶ [summary] body… [appendix]
//!          (# lines)    (greedy pack)   (max_chunks)
//! ```
//!
//! 1. Every non-empty line is a unit, in source order. A `# ` line opens a
//!    new section and becomes the title of its first slide.
//! 2. Units are packed greedily into pieces of at most `chunk_chars`
//!    characters. An over-long unit is split at word boundaries; a single
//!    word longer than the budget is split at a character boundary.
//! 3. The first `max_chunks` pieces become body slides; the rest is overflow.
//!    Overflow goes to the appendix when one is requested, otherwise it is
//!    dropped.
//!
//! Sizing comes from [`SegmentationTable`], never from the audience. The
//! audience only selects titles and notes through [`crate::phrasing`].

use crate::config::SegmentationTable;
use crate::options::ConversionOptions;
use crate::phrasing::{phrasing, Phrasing, EMPTY_DOCUMENT_TEXT};
use serde::{Deserialize, Serialize};

/// What a chunk is for, which decides its position in the deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkRole {
    Summary,
    Body,
    Appendix,
}

/// Content sized and tagged for exactly one slide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideContentChunk {
    /// Position in the deck's content sequence, `0..n`.
    pub ordinal_index: usize,
    pub role: ChunkRole,
    pub title: String,
    /// Slide body; one bullet per line.
    pub text: String,
    /// Presenter notes.
    pub notes: String,
}

/// Split `text` into ordered slide chunks. Never returns an empty vector.
pub fn segment(
    text: &str,
    options: &ConversionOptions,
    table: &SegmentationTable,
) -> Vec<SlideContentChunk> {
    let words = phrasing(options.audience_level);
    let profile = table.profile(options.target_length);

    let sections = split_sections(text);
    let mut pieces = Vec::new();
    for section in &sections {
        pack_section(section, profile.chunk_chars.max(1), &mut pieces);
    }

    let overflow = if pieces.len() > profile.max_chunks {
        pieces.split_off(profile.max_chunks)
    } else {
        Vec::new()
    };

    let mut chunks = Vec::with_capacity(pieces.len() + 2);

    if options.include_summary {
        chunks.push(draft(
            ChunkRole::Summary,
            words.summary_title.to_string(),
            summary_text(&sections, table.summary_chars),
            words.summary_note,
        ));
    }

    if pieces.is_empty() {
        chunks.push(draft(
            ChunkRole::Body,
            words.section_title(1),
            EMPTY_DOCUMENT_TEXT.to_string(),
            words.body_note,
        ));
    }
    for (n, piece) in pieces.into_iter().enumerate() {
        let title = piece_title(&piece, n + 1, words);
        chunks.push(draft(ChunkRole::Body, title, piece.text, words.body_note));
    }

    if options.include_appendix && !overflow.is_empty() {
        chunks.push(draft(
            ChunkRole::Appendix,
            words.appendix_title.to_string(),
            appendix_text(&overflow),
            words.appendix_note,
        ));
    }

    for (i, chunk) in chunks.iter_mut().enumerate() {
        chunk.ordinal_index = i;
    }
    chunks
}

fn draft(role: ChunkRole, title: String, text: String, notes: &str) -> SlideContentChunk {
    SlideContentChunk {
        ordinal_index: 0,
        role,
        title,
        text,
        notes: notes.to_string(),
    }
}

// ── Sections ─────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct Section {
    heading: Option<String>,
    units: Vec<String>,
}

fn heading_of(line: &str) -> Option<&str> {
    line.trim_start()
        .strip_prefix("# ")
        .map(str::trim)
        .filter(|h| !h.is_empty())
}

fn split_sections(text: &str) -> Vec<Section> {
    let mut sections: Vec<Section> = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(h) = heading_of(line) {
            sections.push(Section {
                heading: Some(h.to_string()),
                units: Vec::new(),
            });
            continue;
        }
        match sections.last_mut() {
            Some(s) => s.units.push(line.to_string()),
            None => sections.push(Section {
                heading: None,
                units: vec![line.to_string()],
            }),
        }
    }
    sections
}

// ── Packing ──────────────────────────────────────────────────────────────────

#[derive(Debug)]
struct Piece {
    heading: Option<String>,
    /// `false` for the second and later pieces of one section.
    first_of_section: bool,
    text: String,
}

fn pack_section(section: &Section, limit: usize, out: &mut Vec<Piece>) {
    let start = out.len();
    let push = |text: String, out: &mut Vec<Piece>| {
        out.push(Piece {
            heading: section.heading.clone(),
            first_of_section: out.len() == start,
            text,
        });
    };

    let mut buf = String::new();
    let mut buf_chars = 0usize;
    for unit in &section.units {
        for part in split_long(unit, limit) {
            let len = part.chars().count();
            if buf.is_empty() {
                buf = part;
                buf_chars = len;
            } else if buf_chars + 1 + len <= limit {
                buf.push('\n');
                buf.push_str(&part);
                buf_chars += 1 + len;
            } else {
                push(std::mem::take(&mut buf), out);
                buf = part;
                buf_chars = len;
            }
        }
    }

    // A heading with no text still gets its own slide.
    if !buf.is_empty() || (out.len() == start && section.heading.is_some()) {
        push(buf, out);
    }
}

/// Split `unit` into parts of at most `limit` characters.
fn split_long(unit: &str, limit: usize) -> Vec<String> {
    if unit.chars().count() <= limit {
        return vec![unit.to_string()];
    }

    let mut parts = Vec::new();
    let mut cur = String::new();
    let mut cur_chars = 0usize;
    for word in unit.split_whitespace() {
        let wlen = word.chars().count();
        if wlen > limit {
            if !cur.is_empty() {
                parts.push(std::mem::take(&mut cur));
                cur_chars = 0;
            }
            let chars: Vec<char> = word.chars().collect();
            for slab in chars.chunks(limit) {
                parts.push(slab.iter().collect());
            }
            continue;
        }
        if cur.is_empty() {
            cur.push_str(word);
            cur_chars = wlen;
        } else if cur_chars + 1 + wlen <= limit {
            cur.push(' ');
            cur.push_str(word);
            cur_chars += 1 + wlen;
        } else {
            parts.push(std::mem::replace(&mut cur, word.to_string()));
            cur_chars = wlen;
        }
    }
    if !cur.is_empty() {
        parts.push(cur);
    }
    parts
}

fn piece_title(piece: &Piece, n: usize, words: &Phrasing) -> String {
    match &piece.heading {
        Some(h) if piece.first_of_section => h.clone(),
        Some(h) => words.continued_title(h),
        None => words.section_title(n),
    }
}

// ── Summary and appendix ─────────────────────────────────────────────────────

fn summary_text(sections: &[Section], max_chars: usize) -> String {
    let flat = sections
        .iter()
        .flat_map(|s| s.units.iter())
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ");
    if flat.is_empty() {
        return EMPTY_DOCUMENT_TEXT.to_string();
    }
    truncate_at_word(&flat, max_chars)
}

/// First `max_chars` characters cut back to a word boundary, with `…` when cut.
fn truncate_at_word(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let head: String = text.chars().take(max_chars).collect();
    let cut = match head.rfind(char::is_whitespace) {
        Some(i) if i > 0 => &head[..i],
        _ => head.as_str(),
    };
    format!("{}…", cut.trim_end())
}

fn appendix_text(overflow: &[Piece]) -> String {
    let mut out = String::new();
    for piece in overflow {
        if !out.is_empty() {
            out.push('\n');
        }
        if let (true, Some(h)) = (piece.first_of_section, &piece.heading) {
            out.push_str(h);
            if !piece.text.is_empty() {
                out.push('\n');
            }
        }
        out.push_str(&piece.text);
    }
    out
}
