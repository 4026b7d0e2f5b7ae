//! Radical delimiter variants and the selection of the smallest one that
//! covers a required height.

use crate::error::RadicalResult;
use crate::metrics::{probe_height, DelimiterFont, FontMetrics, SQRT_CHAR};
use crate::units::{MathOptions, Style};
use serde::{Deserialize, Serialize};

/// Style every radical glyph is sized under, whatever the radicand's style
pub const DELIMITER_STYLE: Style = Style::Text;

/// A font and style a radical glyph can be drawn at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DelimiterCandidate {
    pub font: DelimiterFont,
    pub style: Style,
}

/// Vector outline used to draw a radical
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathTemplate {
    Main,
    Size1,
    Size2,
    Size3,
    Size4,
    /// Outline whose vertical stroke grows with the requested height
    Tall,
}

/// One row of the radical delimiter table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DelimiterEntry {
    pub candidate: DelimiterCandidate,
    /// Ink height of the glyph, in em
    pub nominal_height: f32,
    pub template: PathTemplate,
}

impl DelimiterEntry {
    const fn new(font: DelimiterFont, nominal_height: f32, template: PathTemplate) -> Self {
        Self {
            candidate: DelimiterCandidate {
                font,
                style: DELIMITER_STYLE,
            },
            nominal_height,
            template,
        }
    }

    /// Whether this is the natural-size glyph from the main font
    pub fn is_natural(&self) -> bool {
        self.candidate.font == DelimiterFont::Main
    }
}

/// Radical variants, smallest first
pub const SQRT_DELIMITERS: [DelimiterEntry; 5] = [
    DelimiterEntry::new(DelimiterFont::Main, 1.0, PathTemplate::Main),
    DelimiterEntry::new(DelimiterFont::Size1, 1.2, PathTemplate::Size1),
    DelimiterEntry::new(DelimiterFont::Size2, 1.8, PathTemplate::Size2),
    DelimiterEntry::new(DelimiterFont::Size3, 2.4, PathTemplate::Size3),
    DelimiterEntry::new(DelimiterFont::Size4, 3.0, PathTemplate::Size4),
];

/// Find the first variant whose glyph is taller than `required_min_height`
/// (device pixels).
///
/// Returns `None` when even the largest variant falls short and a tall glyph
/// has to be synthesized instead.
pub fn select_variant<M: FontMetrics + ?Sized>(
    metrics: &M,
    options: &MathOptions,
    required_min_height: f32,
) -> RadicalResult<Option<&'static DelimiterEntry>> {
    for entry in SQRT_DELIMITERS.iter() {
        let candidate = entry.candidate;
        let height = probe_height(metrics, SQRT_CHAR, candidate.font, candidate.style, options)?;
        if height > required_min_height {
            tracing::trace!(
                target: "radical::delimiter",
                font = candidate.font.name(),
                height,
                required_min_height,
                "variant selected"
            );
            return Ok(Some(entry));
        }
    }

    tracing::trace!(
        target: "radical::delimiter",
        required_min_height,
        "no variant is tall enough"
    );
    Ok(None)
}
