//! Radical Rendering - Convert radical geometry to render primitives
//!
//! This module turns a laid out radical into render primitives that can be
//! drawn by a rendering backend. The children are emitted as placeholders the
//! host paints itself; the radical glyph is emitted once it has resolved.

use crate::layout::{ChildRole, Point, RadicalGeometry, Rect};
use crate::path::{PathCommand, RenderableGlyph};
use serde::{Deserialize, Serialize};

// =============================================================================
// Render Primitives
// =============================================================================

/// A color in RGBA format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

/// A render primitive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RenderPrimitive {
    /// Paint a child of the radical with its top-left corner at `position`
    Child { role: ChildRole, position: Point },
    /// Fill a path
    Path {
        commands: Vec<PathCommand>,
        fill: Color,
    },
    /// A group of primitives with a transform, clipped in its own coordinates
    Group {
        transform: Transform,
        clip: Option<Rect>,
        children: Vec<RenderPrimitive>,
    },
}

/// 2D transform: a point `p` maps to `translate + scale * p`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub translate_x: f32,
    pub translate_y: f32,
    pub scale_x: f32,
    pub scale_y: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translate_x: 0.0,
            translate_y: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }
}

impl Transform {
    pub fn translate(x: f32, y: f32) -> Self {
        Self {
            translate_x: x,
            translate_y: y,
            ..Default::default()
        }
    }

    pub fn scale(sx: f32, sy: f32) -> Self {
        Self {
            scale_x: sx,
            scale_y: sy,
            ..Default::default()
        }
    }

    /// Apply `self` after `inner`
    pub fn then(&self, inner: &Transform) -> Self {
        Self {
            translate_x: self.translate_x + self.scale_x * inner.translate_x,
            translate_y: self.translate_y + self.scale_y * inner.translate_y,
            scale_x: self.scale_x * inner.scale_x,
            scale_y: self.scale_y * inner.scale_y,
        }
    }

    pub fn apply(&self, p: Point) -> Point {
        Point::new(
            self.translate_x + self.scale_x * p.x,
            self.translate_y + self.scale_y * p.y,
        )
    }
}

// =============================================================================
// Render Output
// =============================================================================

/// The complete render output for a radical
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderOutput {
    /// All render primitives
    pub primitives: Vec<RenderPrimitive>,
    /// Total bounding box
    pub bounds: Rect,
    /// Baseline position (y coordinate)
    pub baseline: f32,
}

impl RenderOutput {
    pub fn new(primitives: Vec<RenderPrimitive>, bounds: Rect, baseline: f32) -> Self {
        Self {
            primitives,
            bounds,
            baseline,
        }
    }

    /// Whether the radical glyph was painted
    pub fn has_glyph(&self) -> bool {
        self.primitives
            .iter()
            .any(|p| matches!(p, RenderPrimitive::Group { .. }))
    }
}

// =============================================================================
// Painter
// =============================================================================

/// Configuration for the painter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaintConfig {
    /// Glyph fill color
    pub color: Color,
}

impl Default for PaintConfig {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
        }
    }
}

/// Painter for laid out radicals
pub struct RadicalPainter {
    config: PaintConfig,
}

impl RadicalPainter {
    /// Create a new painter with default config
    pub fn new() -> Self {
        Self {
            config: PaintConfig::default(),
        }
    }

    /// Create with custom config
    pub fn with_config(config: PaintConfig) -> Self {
        Self { config }
    }

    /// Paint a radical. `glyph` is `None` while the glyph is still resolving;
    /// the children are painted either way.
    pub fn paint(&self, geometry: &RadicalGeometry, glyph: Option<&RenderableGlyph>) -> RenderOutput {
        let mut primitives = Vec::new();

        if let Some(glyph) = glyph {
            primitives.push(self.glyph_group(geometry, glyph));
        }

        primitives.push(RenderPrimitive::Child {
            role: ChildRole::Base,
            position: geometry.base_offset,
        });
        if let Some(position) = geometry.index_offset {
            primitives.push(RenderPrimitive::Child {
                role: ChildRole::Index,
                position,
            });
        }

        RenderOutput::new(primitives, geometry.bounds(), geometry.height_above_baseline)
    }

    /// Glyph translated to its offset and scaled from view box to viewport
    fn glyph_group(&self, geometry: &RadicalGeometry, glyph: &RenderableGlyph) -> RenderPrimitive {
        let view_box = glyph.view_box;
        let scale_x = glyph.viewport.width / view_box.width();
        let scale_y = glyph.viewport.height / view_box.height();

        let transform = Transform::translate(geometry.glyph_offset.x, geometry.glyph_offset.y)
            .then(&Transform::scale(scale_x, scale_y))
            .then(&Transform::translate(-view_box.x(), -view_box.y()));

        RenderPrimitive::Group {
            transform,
            clip: Some(view_box),
            children: vec![RenderPrimitive::Path {
                commands: glyph.commands.clone(),
                fill: self.config.color,
            }],
        }
    }
}

impl Default for RadicalPainter {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================
