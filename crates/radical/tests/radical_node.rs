//! Integration tests for the radical node
//! Tests layout, asynchronous glyph resolution, and repaint signalling
//!
//! These tests drive a node the way a host render tree would: lay out,
//! paint with whatever has resolved, wait for the repaint signal, and paint
//! again.

use radical::{
    BoxMetrics, ChildRole, Color, GlyphVariant, MathOptions, PaintConfig, RadicalChildren,
    RadicalLayoutEngine, RadicalNode, RenderPrimitive,
};
use std::sync::Once;
use std::time::Duration;
use tokio::runtime::Handle;

static TRACING: Once = Once::new();

fn init_tracing() {
    TRACING.call_once(|| {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
        let _ = tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().with_test_writer())
            .with(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}

/// Test harness wrapping a node and its repaint signal
struct NodeHarness {
    node: RadicalNode,
}

impl NodeHarness {
    fn new(options: MathOptions) -> Self {
        init_tracing();
        Self {
            node: RadicalNode::new(RadicalLayoutEngine::new(), options, Handle::current()),
        }
    }

    async fn wait_for_glyph(&self) {
        let signal = self.node.repaint_signal();
        tokio::time::timeout(Duration::from_secs(5), signal.notified())
            .await
            .expect("repaint was never requested");
        assert!(self.node.is_glyph_ready());
    }
}

#[tokio::test]
async fn test_host_paints_children_before_glyph_resolves() {
    let mut harness = NodeHarness::new(MathOptions::default().with_font_size(10.0));
    harness
        .node
        .layout(&RadicalChildren::nth_root(
            BoxMetrics::new(5.0, 6.0, 0.0),
            BoxMetrics::new(20.0, 10.0, 2.0),
        ))
        .unwrap();

    let before = harness.node.paint().unwrap();
    assert!(!before.has_glyph());
    let roles: Vec<ChildRole> = before
        .primitives
        .iter()
        .filter_map(|p| match p {
            RenderPrimitive::Child { role, .. } => Some(*role),
            _ => None,
        })
        .collect();
    assert_eq!(roles, vec![ChildRole::Base, ChildRole::Index]);

    harness.wait_for_glyph().await;
    let after = harness.node.paint().unwrap();
    assert!(after.has_glyph());
    assert_eq!(after.bounds, before.bounds);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_rapid_relayout_settles_on_latest_geometry() {
    let mut harness = NodeHarness::new(MathOptions::default().with_font_size(10.0));

    for height in [4.0, 12.0, 20.0, 60.0] {
        harness
            .node
            .layout(&RadicalChildren::sqrt(BoxMetrics::new(15.0, height, 2.0)))
            .unwrap();
    }
    assert_eq!(harness.node.generation(), 4);

    // Earlier resolutions may land first; only the latest generation counts
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while !harness.node.is_glyph_ready() {
        assert!(tokio::time::Instant::now() < deadline, "glyph never resolved");
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let geometry = harness.node.geometry().unwrap().clone();
    assert_eq!(geometry.variant, GlyphVariant::Tall);
    let output = harness.node.paint().unwrap();
    let RenderPrimitive::Group { clip, .. } = &output.primitives[0] else {
        panic!("expected glyph group first");
    };
    assert_eq!(*clip, Some(geometry.view_box));
}

#[tokio::test]
async fn test_font_size_change_resolves_new_glyph() {
    let mut harness = NodeHarness::new(MathOptions::default().with_font_size(10.0));

    let small = harness
        .node
        .layout(&RadicalChildren::sqrt(BoxMetrics::new(20.0, 10.0, 2.0)))
        .unwrap()
        .clone();
    harness.wait_for_glyph().await;
    let generation = harness.node.generation();

    // The host lays the radicand out again at the new size too
    harness
        .node
        .set_options(harness.node.options().clone().with_font_size(20.0));
    let large = harness
        .node
        .layout(&RadicalChildren::sqrt(BoxMetrics::new(40.0, 20.0, 4.0)))
        .unwrap()
        .clone();
    assert_eq!(harness.node.generation(), generation + 1);
    assert!(large.viewport.height > small.viewport.height);
    assert!(large.size.width > small.size.width);
    assert!(!harness.node.is_glyph_ready());

    harness.wait_for_glyph().await;
    assert!(harness.node.paint().unwrap().has_glyph());
}

#[tokio::test]
async fn test_paint_config_colors_glyph() {
    let mut harness = NodeHarness::new(MathOptions::default());
    harness.node = RadicalNode::new(
        RadicalLayoutEngine::new(),
        MathOptions::default(),
        Handle::current(),
    )
    .with_paint_config(PaintConfig { color: Color::BLUE });

    harness
        .node
        .layout(&RadicalChildren::sqrt(BoxMetrics::new(8.0, 7.0, 1.0)))
        .unwrap();
    harness.wait_for_glyph().await;

    let output = harness.node.paint().unwrap();
    let RenderPrimitive::Group { children, .. } = &output.primitives[0] else {
        panic!("expected glyph group first");
    };
    assert!(matches!(
        children[0],
        RenderPrimitive::Path { fill: Color::BLUE, .. }
    ));
}

#[tokio::test]
async fn test_dropping_node_with_pending_glyph() {
    let mut harness = NodeHarness::new(MathOptions::default());
    harness
        .node
        .layout(&RadicalChildren::sqrt(BoxMetrics::new(8.0, 7.0, 1.0)))
        .unwrap();
    let signal = harness.node.repaint_signal();
    drop(harness);

    // The in-flight resolution is cancelled and never requests a repaint
    let waited = tokio::time::timeout(Duration::from_millis(50), signal.notified()).await;
    assert!(waited.is_err());
}
