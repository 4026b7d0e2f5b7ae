//! Glyph geometry synthesis - turns the selected radical variant (or the lack
//! of one) into viewport and view box dimensions, advance width, rule width,
//! and the markup request that is resolved into a drawable glyph later.

use crate::delimiter::{DelimiterEntry, PathTemplate, DELIMITER_STYLE};
use crate::error::RadicalResult;
use crate::layout::{Rect, Size};
use crate::metrics::{DelimiterFont, FontMetrics, MetricName};
use crate::path::{build_svg_markup, synthesize_path, HLINE_PAD, UNITS_PER_EM};
use crate::units::{MathOptions, Style, Unit};
use serde::{Deserialize, Serialize};

/// Padding above the vinculum, in em
pub const EM_PAD: f32 = HLINE_PAD / UNITS_PER_EM;

/// Advance of the natural-size radical, in em
const NATURAL_ADVANCE: f32 = 0.833;
/// Advance of the display-font radicals, in em
const DISPLAY_ADVANCE: f32 = 1.0;
/// Narrowest viewport of a display-font radical, in em
const DISPLAY_MIN_WIDTH: f32 = 1.02;
/// Advance of the synthesized tall radical, in em
const TALL_ADVANCE: f32 = 1.056;
/// Narrowest viewport of the synthesized tall radical, in em
const TALL_MIN_WIDTH: f32 = 0.742;

/// Which kind of glyph backs a radical
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GlyphVariant {
    /// Main-font glyph stretched to the required height
    Natural,
    /// Display-font glyph at its own aspect ratio
    Display(DelimiterFont),
    /// Synthesized glyph for heights beyond the largest display font
    Tall,
}

/// Everything needed to produce the glyph's markup and resolve it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlyphRequest {
    pub template: PathTemplate,
    /// Extra vinculum thickness, in em
    pub extra_thickness: f32,
    /// View box height, in design units
    pub view_box_height: f32,
    /// `<svg>` markup for the glyph
    pub markup: String,
}

/// Synthesized radical glyph dimensions, in device pixels
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesizedGlyph {
    pub variant: GlyphVariant,
    pub advance_width: f32,
    pub rule_width: f32,
    /// On-canvas size of the glyph including the top padding
    pub viewport: Size,
    pub view_box: Rect,
    /// Ink height of the glyph, the viewport minus its top padding
    pub glyph_tex_height: f32,
    pub request: GlyphRequest,
}

/// Compute the radical glyph covering `required_min_height` over a radicand
/// `base_width` wide. `selected` is the variant picked by
/// [`select_variant`](crate::delimiter::select_variant); `None` asks for a
/// synthesized tall glyph.
pub fn synthesize<M: FontMetrics + ?Sized>(
    metrics: &M,
    options: &MathOptions,
    required_min_height: f32,
    base_width: f32,
    selected: Option<&DelimiterEntry>,
) -> RadicalResult<SynthesizedGlyph> {
    // The glyph and its vinculum scale together, independent of the radicand
    let style = DELIMITER_STYLE;
    let sqrt_rule = metrics.metric(MetricName::SqrtRuleThickness, style);
    let extra = (options.min_rule_thickness - sqrt_rule).max(0.0);
    let rule_width = options.to_px_under(sqrt_rule + extra, Unit::Em, style);

    let shape = match selected {
        Some(entry) if entry.is_natural() => {
            natural_shape(options, entry, extra, required_min_height, base_width)
        }
        Some(entry) => display_shape(options, entry, extra, required_min_height, base_width),
        None => tall_shape(options, style, extra, required_min_height, base_width),
    };

    let path = synthesize_path(shape.template, extra, shape.view_box.height());
    let markup = build_svg_markup(&path, shape.viewport, shape.view_box)?;

    tracing::debug!(
        target: "radical::synth",
        variant = ?shape.variant,
        viewport_width = shape.viewport.width,
        viewport_height = shape.viewport.height,
        view_box_height = shape.view_box.height(),
        "radical glyph synthesized"
    );

    Ok(SynthesizedGlyph {
        variant: shape.variant,
        advance_width: shape.advance_width,
        rule_width,
        viewport: shape.viewport,
        view_box: shape.view_box,
        glyph_tex_height: shape.viewport.height - shape.pad,
        request: GlyphRequest {
            template: shape.template,
            extra_thickness: extra,
            view_box_height: shape.view_box.height(),
            markup,
        },
    })
}

/// Branch-specific dimensions before the markup is built
struct GlyphShape {
    variant: GlyphVariant,
    template: PathTemplate,
    advance_width: f32,
    viewport: Size,
    view_box: Rect,
    /// Top padding inside the viewport, in device pixels
    pad: f32,
}

/// View box width covering `viewport_width` at one design unit per
/// thousandth of an em
fn view_box_width(options: &MathOptions, viewport_width: f32, style: Style) -> f32 {
    options.px_to_em_under(viewport_width, style) * UNITS_PER_EM
}

fn natural_shape(
    options: &MathOptions,
    entry: &DelimiterEntry,
    extra: f32,
    required_min_height: f32,
    base_width: f32,
) -> GlyphShape {
    let style = entry.candidate.style;
    let advance_width = options.to_px_under(NATURAL_ADVANCE, Unit::Em, style);
    let pad = options.to_px_under(EM_PAD, Unit::Em, style);

    // Only the height is stretched; horizontal proportions stay at 1000 units/em.
    let viewport = Size::new(advance_width + base_width, required_min_height + pad);
    let view_box_height = UNITS_PER_EM * (entry.nominal_height + extra) + HLINE_PAD;
    let view_box = Rect::new(
        0.0,
        0.0,
        view_box_width(options, viewport.width, style),
        view_box_height,
    );

    GlyphShape {
        variant: GlyphVariant::Natural,
        template: entry.template,
        advance_width,
        viewport,
        view_box,
        pad,
    }
}

fn display_shape(
    options: &MathOptions,
    entry: &DelimiterEntry,
    extra: f32,
    required_min_height: f32,
    base_width: f32,
) -> GlyphShape {
    let style = entry.candidate.style;
    let advance_width = options.to_px_under(DISPLAY_ADVANCE, Unit::Em, style);
    let min_width = options.to_px_under(DISPLAY_MIN_WIDTH, Unit::Em, style);
    let pad = options.to_px_under(EM_PAD, Unit::Em, style);

    let mut height = options.to_px_under(entry.nominal_height + extra, Unit::Em, style) + pad;
    if height - pad < required_min_height {
        // The metrics table disagrees with the nominal heights; stretch to cover.
        tracing::debug!(
            target: "radical::synth",
            font = entry.candidate.font.name(),
            nominal = height - pad,
            required_min_height,
            "display glyph shorter than required"
        );
        height = required_min_height + pad;
    }

    let viewport = Size::new((advance_width + base_width).max(min_width), height);
    let view_box_height = UNITS_PER_EM * (entry.nominal_height + extra) + HLINE_PAD;
    let view_box = Rect::new(
        0.0,
        0.0,
        view_box_width(options, viewport.width, style),
        view_box_height,
    );

    GlyphShape {
        variant: GlyphVariant::Display(entry.candidate.font),
        template: entry.template,
        advance_width,
        viewport,
        view_box,
        pad,
    }
}

fn tall_shape(
    options: &MathOptions,
    style: Style,
    extra: f32,
    required_min_height: f32,
    base_width: f32,
) -> GlyphShape {
    let advance_width = options.to_px_under(TALL_ADVANCE, Unit::Em, style);
    let min_width = options.to_px_under(TALL_MIN_WIDTH, Unit::Em, style);
    let pad = options.to_px_under(EM_PAD, Unit::Em, style);
    let ink = required_min_height + options.to_px_under(extra, Unit::Em, style);

    let viewport = Size::new((advance_width + base_width).max(min_width), ink + pad);
    let view_box_height = options.px_to_em_under(ink, style) * UNITS_PER_EM + HLINE_PAD;
    let view_box = Rect::new(
        0.0,
        0.0,
        view_box_width(options, viewport.width, style),
        view_box_height,
    );

    GlyphShape {
        variant: GlyphVariant::Tall,
        template: PathTemplate::Tall,
        advance_width,
        viewport,
        view_box,
        pad,
    }
}
