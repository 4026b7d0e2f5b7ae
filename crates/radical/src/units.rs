//! Math styles and unit conversion
//!
//! Lengths coming out of this crate are in device pixels. Font-relative units
//! (em, mu) scale with the font size and the size multiplier of a style; TeX
//! points are absolute.

use serde::{Deserialize, Serialize};

/// Device pixels per TeX point (96 dpi, 72.27 pt per inch)
pub const PX_PER_PT: f32 = 96.0 / 72.27;

/// Math units per em
pub const MU_PER_EM: f32 = 18.0;

/// Nested sizing context of a math expression.
///
/// Variants are declared smallest first so the derived order ranks
/// `Display > Text > Script > ScriptScript`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Style {
    ScriptScript,
    Script,
    Text,
    Display,
}

impl Default for Style {
    fn default() -> Self {
        Self::Text
    }
}

impl Style {
    /// Scale factor applied to font-relative lengths under this style
    pub fn size_multiplier(self) -> f32 {
        match self {
            Style::Display | Style::Text => 1.0,
            Style::Script => 0.7,
            Style::ScriptScript => 0.5,
        }
    }

    /// Column of the font parameter tables used under this style
    pub fn metric_column(self) -> usize {
        match self {
            Style::Display | Style::Text => 0,
            Style::Script => 1,
            Style::ScriptScript => 2,
        }
    }
}

/// A unit of length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Unit {
    /// Font size of the current style
    Em,
    /// 1/18 em
    Mu,
    /// TeX point
    Pt,
    /// Device pixel
    Px,
}

/// Per-pass options for radical layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MathOptions {
    /// Style of the radicand
    pub style: Style,
    /// Device pixels per em at size multiplier 1.0
    pub font_size: f32,
    /// Lower bound for the vinculum thickness, in em
    pub min_rule_thickness: f32,
}

impl Default for MathOptions {
    fn default() -> Self {
        Self {
            style: Style::Text,
            font_size: 11.0,
            min_rule_thickness: 0.0,
        }
    }
}

impl MathOptions {
    /// Set the style
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Set the font size in device pixels per em
    pub fn with_font_size(mut self, font_size: f32) -> Self {
        self.font_size = font_size;
        self
    }

    /// Set the minimum vinculum thickness in em
    pub fn with_min_rule_thickness(mut self, min_rule_thickness: f32) -> Self {
        self.min_rule_thickness = min_rule_thickness;
        self
    }

    /// Convert a length to device pixels under the current style
    pub fn to_px(&self, value: f32, unit: Unit) -> f32 {
        self.to_px_under(value, unit, self.style)
    }

    /// Convert a length to device pixels under an explicit style
    pub fn to_px_under(&self, value: f32, unit: Unit, style: Style) -> f32 {
        match unit {
            Unit::Em => value * style.size_multiplier() * self.font_size,
            Unit::Mu => value / MU_PER_EM * style.size_multiplier() * self.font_size,
            Unit::Pt => value * PX_PER_PT,
            Unit::Px => value,
        }
    }

    /// Convert device pixels back to em under an explicit style
    pub fn px_to_em_under(&self, px: f32, style: Style) -> f32 {
        px / (style.size_multiplier() * self.font_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_order() {
        assert!(Style::Display > Style::Text);
        assert!(Style::Text > Style::Script);
        assert!(Style::Script > Style::ScriptScript);
    }

    #[test]
    fn test_em_scales_with_style() {
        let options = MathOptions::default().with_font_size(10.0);
        assert_eq!(options.to_px_under(1.0, Unit::Em, Style::Text), 10.0);
        assert!((options.to_px_under(1.0, Unit::Em, Style::Script) - 7.0).abs() < 1e-5);
        assert_eq!(options.to_px_under(1.0, Unit::Em, Style::ScriptScript), 5.0);
    }

    #[test]
    fn test_mu_is_eighteenth_of_em() {
        let options = MathOptions::default().with_font_size(18.0);
        assert!((options.to_px(-10.0, Unit::Mu) + 10.0).abs() < 1e-5);
    }

    #[test]
    fn test_pt_is_absolute() {
        let small = MathOptions::default().with_font_size(5.0);
        let large = MathOptions::default().with_font_size(50.0);
        assert_eq!(small.to_px(0.5, Unit::Pt), large.to_px(0.5, Unit::Pt));
        assert!((small.to_px(72.27, Unit::Pt) - 96.0).abs() < 1e-3);
    }

    #[test]
    fn test_px_to_em_roundtrip() {
        let options = MathOptions::default().with_font_size(12.0);
        let px = options.to_px_under(0.833, Unit::Em, Style::Script);
        assert!((options.px_to_em_under(px, Style::Script) - 0.833).abs() < 1e-5);
    }

    #[test]
    fn test_options_deserialize() {
        let options: MathOptions = serde_json::from_str(
            r#"{"style":"Display","font_size":14.0,"min_rule_thickness":0.05}"#,
        )
        .unwrap();
        assert_eq!(options.style, Style::Display);
        assert_eq!(options.font_size, 14.0);
    }
}
