//! Radical Layout - Size the radical sign and place the radicand and index
//!
//! This module implements TeX's rule for radicals: it derives the clearance
//! above the radicand from the font parameters, picks (or synthesizes) a
//! radical glyph tall enough to cover the radicand, and computes the final box
//! along with the offsets of the glyph and both children.

use crate::delimiter::select_variant;
use crate::error::{RadicalError, RadicalResult};
use crate::metrics::{metric_px, FontMetrics, MetricName, TexFontMetrics};
use crate::synth::{synthesize, GlyphRequest, GlyphVariant, SynthesizedGlyph};
use crate::units::{MathOptions, Style, Unit};
use serde::{Deserialize, Serialize};

// =============================================================================
// Layout Types
// =============================================================================

/// A position in 2D space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn origin() -> Self {
        Self::default()
    }
}

/// A size with width and height
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// A rectangle defined by position and size
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            origin: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    pub fn from_origin_size(origin: Point, size: Size) -> Self {
        Self { origin, size }
    }

    pub fn x(&self) -> f32 {
        self.origin.x
    }

    pub fn y(&self) -> f32 {
        self.origin.y
    }

    pub fn width(&self) -> f32 {
        self.size.width
    }

    pub fn height(&self) -> f32 {
        self.size.height
    }

    pub fn right(&self) -> f32 {
        self.origin.x + self.size.width
    }

    pub fn bottom(&self) -> f32 {
        self.origin.y + self.size.height
    }
}

/// Measured extents of an already laid out child, in device pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoxMetrics {
    pub width: f32,
    /// Height above the baseline
    pub height: f32,
    /// Depth below the baseline
    pub depth: f32,
}

impl BoxMetrics {
    pub fn new(width: f32, height: f32, depth: f32) -> Self {
        Self {
            width,
            height,
            depth,
        }
    }

    /// Height plus depth
    pub fn total_height(&self) -> f32 {
        self.height + self.depth
    }
}

/// The children of a radical
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChildRole {
    /// The radicand
    Base,
    /// The root degree
    Index,
}

/// Box metrics query for the children of a radical
pub trait ChildBoxes {
    /// Metrics of the child in `role`, or `None` if there is no such child
    fn box_metrics(&self, role: ChildRole) -> Option<BoxMetrics>;
}

/// Child metrics supplied directly
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RadicalChildren {
    pub base: Option<BoxMetrics>,
    pub index: Option<BoxMetrics>,
}

impl RadicalChildren {
    /// A square root over `base`
    pub fn sqrt(base: BoxMetrics) -> Self {
        Self {
            base: Some(base),
            index: None,
        }
    }

    /// An n-th root over `base` with `index` as the degree
    pub fn nth_root(index: BoxMetrics, base: BoxMetrics) -> Self {
        Self {
            base: Some(base),
            index: Some(index),
        }
    }
}

impl ChildBoxes for RadicalChildren {
    fn box_metrics(&self, role: ChildRole) -> Option<BoxMetrics> {
        match role {
            ChildRole::Base => self.base,
            ChildRole::Index => self.index,
        }
    }
}

/// Geometry of a laid out radical. Offsets are from the top-left corner of
/// the radical's box, y pointing down.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadicalGeometry {
    /// Full box size
    pub size: Size,
    /// Distance from the top of the box to the baseline
    pub height_above_baseline: f32,
    /// Horizontal space taken by the radical sign before the radicand
    pub advance_width: f32,
    /// Vinculum thickness
    pub rule_width: f32,
    /// Top-left corner of the glyph viewport
    pub glyph_offset: Point,
    /// Top-left corner of the radicand
    pub base_offset: Point,
    /// Top-left corner of the index, present only with an index
    pub index_offset: Option<Point>,
    /// On-canvas size of the glyph
    pub viewport: Size,
    /// Design-grid region mapped onto the viewport
    pub view_box: Rect,
    /// Ink height of the glyph
    pub glyph_tex_height: f32,
    pub variant: GlyphVariant,
}

impl RadicalGeometry {
    /// Depth below the baseline
    pub fn depth(&self) -> f32 {
        self.size.height - self.height_above_baseline
    }

    /// Bounds of the whole radical
    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(Point::origin(), self.size)
    }
}

/// Result of one layout pass
#[derive(Debug, Clone, PartialEq)]
pub struct RadicalLayout {
    pub geometry: RadicalGeometry,
    /// The glyph to resolve for painting
    pub glyph: GlyphRequest,
}

// =============================================================================
// Layout Engine
// =============================================================================

/// Padding left of the index
const INDEX_LEFT_PADDING_PT: f32 = 0.5;
/// Kern between the index and the radical sign
const INDEX_RIGHT_PADDING_MU: f32 = -10.0;
/// Fraction of the radicand's height-minus-depth the index is raised by
const INDEX_SHIFT: f32 = 0.6;

/// Child metrics read at the start of a pass
struct Measured {
    base: BoxMetrics,
    index: Option<BoxMetrics>,
}

/// Spacing constants and glyph chosen for the radicand
struct Sizing {
    psi: f32,
    glyph: SynthesizedGlyph,
}

/// Engine for computing radical layout.
///
/// The engine keeps no state between passes: the same options, children, and
/// metrics always produce the same geometry.
pub struct RadicalLayoutEngine<M: FontMetrics = TexFontMetrics> {
    metrics: M,
}

impl RadicalLayoutEngine<TexFontMetrics> {
    /// Create a new layout engine with the built-in metrics
    pub fn new() -> Self {
        Self {
            metrics: TexFontMetrics::default(),
        }
    }
}

impl Default for RadicalLayoutEngine<TexFontMetrics> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: FontMetrics> RadicalLayoutEngine<M> {
    /// Create with specific metrics
    pub fn with_metrics(metrics: M) -> Self {
        Self { metrics }
    }

    /// The metrics this engine reads
    pub fn metrics(&self) -> &M {
        &self.metrics
    }

    /// Lay out a radical over the children reported by `children`
    pub fn layout<C: ChildBoxes + ?Sized>(
        &self,
        options: &MathOptions,
        children: &C,
    ) -> RadicalResult<RadicalLayout> {
        let measured = self.measure(children)?;
        let sized = self.size(options, &measured)?;
        let geometry = self.place(options, &measured, &sized);

        tracing::debug!(
            target: "radical::layout",
            width = geometry.size.width,
            height = geometry.size.height,
            height_above_baseline = geometry.height_above_baseline,
            variant = ?geometry.variant,
            "radical laid out"
        );

        Ok(RadicalLayout {
            geometry,
            glyph: sized.glyph.request,
        })
    }

    /// Read the child metrics; a radical without a radicand is invalid
    fn measure<C: ChildBoxes + ?Sized>(&self, children: &C) -> RadicalResult<Measured> {
        let base = children
            .box_metrics(ChildRole::Base)
            .ok_or(RadicalError::MissingBase)?;
        let index = children.box_metrics(ChildRole::Index);
        Ok(Measured { base, index })
    }

    /// Derive the clearance and pick the glyph covering the radicand
    fn size(&self, options: &MathOptions, measured: &Measured) -> RadicalResult<Sizing> {
        let style = options.style;
        let theta = metric_px(&self.metrics, MetricName::DefaultRuleThickness, style, options);
        let phi = if style > Style::Text {
            metric_px(&self.metrics, MetricName::XHeight, style, options)
        } else {
            theta
        };
        let psi = theta + 0.25 * phi.abs();

        let min_sqrt_height = measured.base.total_height() + psi + theta;
        tracing::trace!(
            target: "radical::layout",
            theta,
            phi,
            psi,
            min_sqrt_height,
            "radical clearance"
        );

        let selected = select_variant(&self.metrics, options, min_sqrt_height)?;
        let glyph = synthesize(
            &self.metrics,
            options,
            min_sqrt_height,
            measured.base.width,
            selected,
        )?;

        Ok(Sizing { psi, glyph })
    }

    /// Compute the box and the offsets of the glyph and children
    fn place(&self, options: &MathOptions, measured: &Measured, sized: &Sizing) -> RadicalGeometry {
        let base = measured.base;
        let glyph = &sized.glyph;
        let rule_width = glyph.rule_width;
        let tex_height = glyph.glyph_tex_height;

        let index_left_padding = options.to_px(INDEX_LEFT_PADDING_PT, Unit::Pt);
        let index_right_padding = options.to_px(INDEX_RIGHT_PADDING_MU, Unit::Mu);
        let index_shift = INDEX_SHIFT * (base.height - base.depth);
        let (index_width, index_height) = measured
            .index
            .map(|index| (index.width, index.total_height()))
            .unwrap_or((0.0, 0.0));

        let sqrt_horizontal_pos =
            (index_left_padding + index_width + index_right_padding).max(0.0);
        let width = sqrt_horizontal_pos + glyph.advance_width + base.width;

        // A glyph much taller than required splits the excess so its hook
        // does not run into the radicand.
        let mut psi = sized.psi;
        let delim_depth = tex_height - rule_width;
        if delim_depth > base.total_height() + psi {
            psi += 0.5 * (delim_depth - base.total_height() - psi);
        }

        let sqrt_vertical_pos =
            (index_height + index_shift - base.height - psi - rule_width).max(0.0);
        let height_above_baseline = base.height + psi + rule_width + sqrt_vertical_pos;
        let height = (sqrt_vertical_pos + tex_height).max(height_above_baseline);

        let base_offset = Point::new(
            sqrt_horizontal_pos + glyph.advance_width,
            height_above_baseline - base.height,
        );
        let index_offset = measured.index.map(|_| {
            Point::new(
                sqrt_horizontal_pos - index_right_padding - index_width,
                height_above_baseline - index_shift - index_height,
            )
        });
        let glyph_offset = Point::new(
            sqrt_horizontal_pos,
            sqrt_vertical_pos + tex_height - glyph.viewport.height,
        );

        RadicalGeometry {
            size: Size::new(width, height),
            height_above_baseline,
            advance_width: glyph.advance_width,
            rule_width,
            glyph_offset,
            base_offset,
            index_offset,
            viewport: glyph.viewport,
            view_box: glyph.view_box,
            glyph_tex_height: tex_height,
            variant: glyph.variant,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
