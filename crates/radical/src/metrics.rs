//! Font metrics - the lookup view this crate reads glyph extents and
//! font parameters from, plus the glyph height probe built on it.

use crate::error::{RadicalError, RadicalResult};
use crate::units::{MathOptions, Style, Unit};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The radical sign
pub const SQRT_CHAR: char = '\u{221A}';

// =============================================================================
// Metric Types
// =============================================================================

/// Fonts a radical glyph can be drawn from
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DelimiterFont {
    #[serde(rename = "Main-Regular")]
    Main,
    #[serde(rename = "Size1-Regular")]
    Size1,
    #[serde(rename = "Size2-Regular")]
    Size2,
    #[serde(rename = "Size3-Regular")]
    Size3,
    #[serde(rename = "Size4-Regular")]
    Size4,
}

impl DelimiterFont {
    /// Canonical font name
    pub fn name(self) -> &'static str {
        match self {
            DelimiterFont::Main => "Main-Regular",
            DelimiterFont::Size1 => "Size1-Regular",
            DelimiterFont::Size2 => "Size2-Regular",
            DelimiterFont::Size3 => "Size3-Regular",
            DelimiterFont::Size4 => "Size4-Regular",
        }
    }
}

impl fmt::Display for DelimiterFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Lookup mode for character metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    Math,
    Text,
}

/// Extents of one glyph, in em
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CharMetrics {
    /// Height above the baseline
    pub height: f32,
    /// Depth below the baseline
    pub depth: f32,
    /// Advance width
    pub width: f32,
}

impl CharMetrics {
    pub const fn new(height: f32, depth: f32, width: f32) -> Self {
        Self {
            height,
            depth,
            width,
        }
    }

    /// Total vertical extent
    pub fn total_height(&self) -> f32 {
        self.height + self.depth
    }
}

/// Named font parameters read by radical layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetricName {
    XHeight,
    DefaultRuleThickness,
    SqrtRuleThickness,
}

/// Read-only view over a font metrics table.
///
/// All values are in em; callers convert them to device pixels.
pub trait FontMetrics {
    /// Extents of `ch` drawn from `font`, or `None` if the table lacks it
    fn char_metrics(&self, ch: char, font: DelimiterFont, mode: Mode) -> Option<CharMetrics>;

    /// A named font parameter under `style`
    fn metric(&self, name: MetricName, style: Style) -> f32;
}

// =============================================================================
// Built-in Table
// =============================================================================

/// TeX font metrics for the radical sign and the parameters around it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TexFontMetrics {
    /// Glyph extents per font
    pub glyphs: BTreeMap<DelimiterFont, BTreeMap<char, CharMetrics>>,
    /// x-height per style column (text, script, scriptscript)
    pub x_height: [f32; 3],
    /// Default rule thickness per style column
    pub default_rule_thickness: [f32; 3],
    /// Radical rule thickness per style column
    pub sqrt_rule_thickness: [f32; 3],
}

impl Default for TexFontMetrics {
    fn default() -> Self {
        let sqrt_extents = [
            (DelimiterFont::Main, CharMetrics::new(0.8, 0.2, 0.83334)),
            (DelimiterFont::Size1, CharMetrics::new(0.85, 0.35001, 1.0)),
            (DelimiterFont::Size2, CharMetrics::new(1.15, 0.65002, 1.0)),
            (DelimiterFont::Size3, CharMetrics::new(1.45, 0.95003, 1.0)),
            (DelimiterFont::Size4, CharMetrics::new(1.75, 1.25003, 1.0)),
        ];

        let glyphs = sqrt_extents
            .into_iter()
            .map(|(font, metrics)| (font, BTreeMap::from([(SQRT_CHAR, metrics)])))
            .collect();

        Self {
            glyphs,
            x_height: [0.431, 0.431, 0.431],
            default_rule_thickness: [0.04, 0.049, 0.049],
            sqrt_rule_thickness: [0.04, 0.04, 0.04],
        }
    }
}

impl TexFontMetrics {
    /// Load a metrics table from JSON
    pub fn from_json(json: &str) -> RadicalResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the table to JSON
    pub fn to_json(&self) -> RadicalResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Insert or replace a glyph entry
    pub fn set_char_metrics(&mut self, font: DelimiterFont, ch: char, metrics: CharMetrics) {
        self.glyphs.entry(font).or_default().insert(ch, metrics);
    }
}

impl FontMetrics for TexFontMetrics {
    // Only math-mode glyphs are tabulated; text mode reads the same entries.
    fn char_metrics(&self, ch: char, font: DelimiterFont, _mode: Mode) -> Option<CharMetrics> {
        self.glyphs.get(&font)?.get(&ch).copied()
    }

    fn metric(&self, name: MetricName, style: Style) -> f32 {
        let column = style.metric_column();
        match name {
            MetricName::XHeight => self.x_height[column],
            MetricName::DefaultRuleThickness => self.default_rule_thickness[column],
            MetricName::SqrtRuleThickness => self.sqrt_rule_thickness[column],
        }
    }
}

// =============================================================================
// Glyph Height Probe
// =============================================================================

/// Total extent (height + depth) of `ch` from `font` under `style`, in device
/// pixels.
///
/// A missing entry means the metrics table is broken, so it is reported as
/// [`RadicalError::UnknownGlyph`] rather than defaulted.
pub fn probe_height<M: FontMetrics + ?Sized>(
    metrics: &M,
    ch: char,
    font: DelimiterFont,
    style: Style,
    options: &MathOptions,
) -> RadicalResult<f32> {
    let glyph = metrics
        .char_metrics(ch, font, Mode::Math)
        .ok_or_else(|| RadicalError::UnknownGlyph {
            ch,
            font: font.name().to_string(),
        })?;

    Ok(options.to_px_under(glyph.total_height(), Unit::Em, style))
}

/// A named font parameter converted to device pixels under `style`
pub fn metric_px<M: FontMetrics + ?Sized>(
    metrics: &M,
    name: MetricName,
    style: Style,
    options: &MathOptions,
) -> f32 {
    options.to_px_under(metrics.metric(name, style), Unit::Em, style)
}
