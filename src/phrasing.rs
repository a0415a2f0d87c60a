//! Audience-specific wording for slide titles and presenter notes.
//!
//! Centralising every user-facing phrase here serves two purposes:
//!
//! 1. **Single source of truth**: retuning how a deck addresses novices or
//!    experts means editing exactly one table.
//!
//! 2. **Testability**: the segmenter's tests can check that the audience
//!    changes wording and nothing else, without building a deck.
//!
//! The audience never changes *which* content lands on a slide or in what
//! order; that is decided by the segmenter from the length profile alone.

use crate::options::AudienceLevel;

/// Shown when a document yields no text at all.
pub const EMPTY_DOCUMENT_TEXT: &str = "This document contains no extractable text.";

/// All phrases used for one audience.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Phrasing {
    /// Subtitle of the opening slide.
    pub deck_subtitle: &'static str,
    pub summary_title: &'static str,
    pub appendix_title: &'static str,
    /// Prefix for untitled body slides, followed by the slide number.
    pub section_label: &'static str,
    /// Suffix for the continuation of a titled section split over slides.
    pub continued_suffix: &'static str,
    pub summary_note: &'static str,
    pub body_note: &'static str,
    pub appendix_note: &'static str,
    /// Title of the last slide.
    pub closing_title: &'static str,
    pub closing_text: &'static str,
    pub closing_note: &'static str,
}

const NOVICE: Phrasing = Phrasing {
    deck_subtitle: "A gentle introduction",
    summary_title: "What This Is About",
    appendix_title: "Want to Know More?",
    section_label: "Part",
    continued_suffix: "(continued)",
    summary_note: "Start here: give the big picture before any details.",
    body_note: "Explain any unfamiliar terms and pause for questions.",
    appendix_note: "Optional reading for anyone who wants the full detail.",
    closing_title: "Thank You!",
    closing_text: "Questions are always welcome",
    closing_note: "Recap the one idea to remember, then invite questions.",
};

const GENERAL: Phrasing = Phrasing {
    deck_subtitle: "Automatically generated presentation",
    summary_title: "Document Summary",
    appendix_title: "Appendix",
    section_label: "Section",
    continued_suffix: "(continued)",
    summary_note: "Summarise the document in a sentence or two.",
    body_note: "Walk through the key points on this slide.",
    appendix_note: "Remaining material that did not fit the main slides.",
    closing_title: "Thank You",
    closing_text: "This presentation was automatically generated",
    closing_note: "Thank the audience and open the floor for questions.",
};

const EXPERT: Phrasing = Phrasing {
    deck_subtitle: "Technical briefing",
    summary_title: "Abstract",
    appendix_title: "Appendix: Supporting Material",
    section_label: "§",
    continued_suffix: "(cont.)",
    summary_note: "State the thesis; the audience knows the background.",
    body_note: "Focus on specifics and trade-offs.",
    appendix_note: "Reference material for follow-up discussion.",
    closing_title: "Questions & Discussion",
    closing_text: "Generated automatically from the source document",
    closing_note: "Open the floor for technical questions.",
};

/// The phrase table for `audience`.
pub fn phrasing(audience: AudienceLevel) -> &'static Phrasing {
    match audience {
        AudienceLevel::Novice => &NOVICE,
        AudienceLevel::General => &GENERAL,
        AudienceLevel::Expert => &EXPERT,
    }
}

impl Phrasing {
    /// Title for the `n`-th (1-based) body slide when the source had no heading.
    pub fn section_title(&self, n: usize) -> String {
        format!("{} {}", self.section_label, n)
    }

    /// Title for a continuation slide of the section titled `heading`.
    pub fn continued_title(&self, heading: &str) -> String {
        format!("{} {}", heading, self.continued_suffix)
    }
}
