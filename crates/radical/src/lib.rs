//! Radical Crate - Square roots and nth roots for math layout
//!
//! This crate sizes, draws, and places the radical sign of a formula:
//! - Unit conversion between em, mu, pt, and px under a math style
//! - Font metrics for the radical sign in each delimiter font
//! - Selection of the smallest delimiter variant that covers the radicand
//! - Synthesis of the radical glyph as scalable path markup
//! - Placement of the radicand, index, and glyph (TeX rule 11)
//! - Rendering to primitives for display
//! - A host node that resolves the glyph asynchronously

pub mod delimiter;
pub mod error;
pub mod layout;
pub mod metrics;
pub mod node;
pub mod path;
pub mod render;
pub mod synth;
pub mod units;

pub use delimiter::{select_variant, DelimiterCandidate, DelimiterEntry, PathTemplate, SQRT_DELIMITERS};
pub use error::*;
pub use layout::{
    BoxMetrics, ChildBoxes, ChildRole, Point, RadicalChildren, RadicalGeometry, RadicalLayout,
    RadicalLayoutEngine, Rect, Size,
};
pub use metrics::{
    CharMetrics, DelimiterFont, FontMetrics, MetricName, Mode, TexFontMetrics, SQRT_CHAR,
};
pub use node::RadicalNode;
pub use path::{build_svg_markup, resolve_renderable, synthesize_path, PathCommand, RenderableGlyph};
pub use render::{Color, PaintConfig, RadicalPainter, RenderOutput, RenderPrimitive, Transform};
pub use synth::{synthesize, GlyphRequest, GlyphVariant, SynthesizedGlyph};
pub use units::{MathOptions, Style, Unit};

#[cfg(test)]
mod tests {
    use super::*;

    // =============================================================================
    // Integration Tests
    // =============================================================================

    #[test]
    fn test_layout_resolve_paint_pipeline() {
        let options = MathOptions::default().with_font_size(10.0);
        let children = RadicalChildren::nth_root(
            BoxMetrics::new(5.0, 6.0, 0.0),
            BoxMetrics::new(20.0, 10.0, 2.0),
        );

        // Layout the radical
        let engine = RadicalLayoutEngine::new();
        let layout = engine.layout(&options, &children).unwrap();
        assert!(layout.geometry.size.width > 20.0);
        assert!(layout.geometry.index_offset.is_some());

        // Resolve the glyph from its markup
        let glyph = resolve_renderable(&layout.glyph.markup).unwrap();
        assert_eq!(glyph.viewport, layout.geometry.viewport);
        assert_eq!(glyph.view_box, layout.geometry.view_box);
        assert!(!glyph.commands.is_empty());

        // Render the layout
        let output = RadicalPainter::new().paint(&layout.geometry, Some(&glyph));
        assert!(output.has_glyph());
        assert_eq!(output.primitives.len(), 3);
        assert_eq!(output.bounds.size, layout.geometry.size);
    }

    #[test]
    fn test_metrics_table_roundtrip_drives_layout() {
        let json = TexFontMetrics::default().to_json().unwrap();
        let metrics = TexFontMetrics::from_json(&json).unwrap();

        let options = MathOptions::default();
        let children = RadicalChildren::sqrt(BoxMetrics::new(12.0, 8.0, 3.0));
        let from_default = RadicalLayoutEngine::new().layout(&options, &children).unwrap();
        let from_json = RadicalLayoutEngine::with_metrics(metrics)
            .layout(&options, &children)
            .unwrap();

        assert_eq!(from_default, from_json);
    }

    #[test]
    fn test_larger_radicand_never_shrinks_glyph() {
        let engine = RadicalLayoutEngine::new();
        let options = MathOptions::default().with_font_size(10.0);

        let mut last = 0.0;
        for height in [4.0, 8.0, 12.0, 18.0, 26.0, 40.0, 80.0] {
            let layout = engine
                .layout(&options, &RadicalChildren::sqrt(BoxMetrics::new(10.0, height, 2.0)))
                .unwrap();
            assert!(layout.geometry.viewport.height >= last);
            last = layout.geometry.viewport.height;
        }
    }
}
