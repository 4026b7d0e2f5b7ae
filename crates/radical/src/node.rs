//! Radical Node - host-facing radical with asynchronous glyph resolution
//!
//! Layout runs synchronously and only needs the glyph's declared dimensions.
//! The glyph itself is resolved from its markup on the tokio runtime; when it
//! arrives it is cached for painting and the host is asked to repaint. Every
//! layout pass starts a new generation, and a resolution that finishes after
//! its generation was superseded is dropped.

use crate::error::RadicalResult;
use crate::layout::{ChildBoxes, RadicalGeometry, RadicalLayoutEngine};
use crate::metrics::{FontMetrics, TexFontMetrics};
use crate::path::{resolve_renderable, RenderableGlyph};
use crate::render::{PaintConfig, RadicalPainter, RenderOutput};
use crate::units::MathOptions;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::runtime::Handle;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

/// A glyph resolved for some generation
#[derive(Debug, Clone)]
struct ResolvedGlyph {
    generation: u64,
    markup: String,
    glyph: Arc<RenderableGlyph>,
}

/// State shared between a node and its in-flight resolution
#[derive(Debug)]
struct GlyphSlot {
    generation: u64,
    alive: bool,
    resolved: Option<ResolvedGlyph>,
}

impl GlyphSlot {
    fn new() -> Self {
        Self {
            generation: 0,
            alive: true,
            resolved: None,
        }
    }

    /// The cached glyph if it belongs to the current generation
    fn current(&self) -> Option<Arc<RenderableGlyph>> {
        self.resolved
            .as_ref()
            .filter(|r| r.generation == self.generation)
            .map(|r| Arc::clone(&r.glyph))
    }
}

fn lock(slot: &Mutex<GlyphSlot>) -> MutexGuard<'_, GlyphSlot> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Record the outcome of a resolution started for `generation`
fn complete_resolution(
    slot: &Mutex<GlyphSlot>,
    repaint: &Notify,
    generation: u64,
    markup: String,
    result: RadicalResult<RenderableGlyph>,
) {
    let mut state = lock(slot);
    if !state.alive {
        tracing::trace!(target: "radical::node", generation, "node gone, glyph dropped");
        return;
    }
    if state.generation != generation {
        tracing::debug!(
            target: "radical::node",
            generation,
            current = state.generation,
            "stale glyph discarded"
        );
        return;
    }

    match result {
        Ok(glyph) => {
            state.resolved = Some(ResolvedGlyph {
                generation,
                markup,
                glyph: Arc::new(glyph),
            });
            drop(state);
            repaint.notify_one();
        }
        Err(e) => {
            // The geometry stays valid; the glyph is just left out when painting.
            tracing::warn!(target: "radical::node", generation, "glyph resolution failed: {}", e);
        }
    }
}

/// A radical as owned by the host's render tree
pub struct RadicalNode<M: FontMetrics = TexFontMetrics> {
    engine: RadicalLayoutEngine<M>,
    painter: RadicalPainter,
    options: MathOptions,
    runtime: Handle,
    geometry: Option<RadicalGeometry>,
    slot: Arc<Mutex<GlyphSlot>>,
    repaint: Arc<Notify>,
    pending: Option<JoinHandle<()>>,
}

impl<M: FontMetrics> RadicalNode<M> {
    /// Create a node resolving glyphs on `runtime`
    pub fn new(engine: RadicalLayoutEngine<M>, options: MathOptions, runtime: Handle) -> Self {
        Self {
            engine,
            painter: RadicalPainter::new(),
            options,
            runtime,
            geometry: None,
            slot: Arc::new(Mutex::new(GlyphSlot::new())),
            repaint: Arc::new(Notify::new()),
            pending: None,
        }
    }

    /// Use a custom paint configuration
    pub fn with_paint_config(mut self, config: PaintConfig) -> Self {
        self.painter = RadicalPainter::with_config(config);
        self
    }

    pub fn options(&self) -> &MathOptions {
        &self.options
    }

    /// Change the options; takes effect on the next layout
    pub fn set_options(&mut self, options: MathOptions) {
        self.options = options;
    }

    /// Geometry from the latest successful layout
    pub fn geometry(&self) -> Option<&RadicalGeometry> {
        self.geometry.as_ref()
    }

    /// Current layout generation
    pub fn generation(&self) -> u64 {
        lock(&self.slot).generation
    }

    /// Notified whenever a glyph resolves and the node needs repainting
    pub fn repaint_signal(&self) -> Arc<Notify> {
        Arc::clone(&self.repaint)
    }

    /// Whether the glyph for the current geometry has resolved
    pub fn is_glyph_ready(&self) -> bool {
        lock(&self.slot).current().is_some()
    }

    /// Lay out the radical and start resolving its glyph.
    ///
    /// Returns as soon as the geometry is known; the glyph arrives later and
    /// is signalled through [`repaint_signal`](Self::repaint_signal). Layout
    /// errors leave the previous geometry in place.
    pub fn layout<C: ChildBoxes + ?Sized>(&mut self, children: &C) -> RadicalResult<&RadicalGeometry> {
        let layout = self.engine.layout(&self.options, children)?;
        let markup = layout.glyph.markup;

        let (generation, reused) = {
            let mut state = lock(&self.slot);
            state.generation += 1;
            let generation = state.generation;
            let reused = match state.resolved.as_mut() {
                Some(resolved) if resolved.markup == markup => {
                    resolved.generation = generation;
                    true
                }
                _ => false,
            };
            (generation, reused)
        };

        // Whatever is still in flight belongs to an older generation now
        if let Some(superseded) = self.pending.take() {
            superseded.abort();
        }

        if reused {
            tracing::trace!(target: "radical::node", generation, "cached glyph reused");
        } else {
            let slot = Arc::clone(&self.slot);
            let repaint = Arc::clone(&self.repaint);
            tracing::trace!(target: "radical::node", generation, "glyph resolution requested");
            self.pending = Some(self.runtime.spawn(async move {
                let result = resolve_renderable(&markup);
                complete_resolution(&slot, &repaint, generation, markup, result);
            }));
        }

        Ok(self.geometry.insert(layout.geometry))
    }

    /// Paint the latest geometry. The glyph is included only once it has
    /// resolved for that geometry.
    pub fn paint(&self) -> Option<RenderOutput> {
        let geometry = self.geometry.as_ref()?;
        let glyph = lock(&self.slot).current();
        Some(self.painter.paint(geometry, glyph.as_deref()))
    }
}

impl<M: FontMetrics> Drop for RadicalNode<M> {
    fn drop(&mut self) {
        lock(&self.slot).alive = false;
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
    }
}
