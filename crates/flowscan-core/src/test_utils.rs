//! Shared test helpers for integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available in unit tests, integration tests, and benchmarks (via the
//! `test-utils` feature).

use crate::block::{BlockKind, BridgeConfig, CrafterConfig, StackState};
use crate::geom::{Direction, GridPosition, WorldPoint};
use crate::grid::GridWorld;
use crate::id::{NodeId, TeamId};
use crate::render::{Color, EdgeSink};
use crate::scan::PointerReadout;

// ===========================================================================
// World construction
// ===========================================================================

pub fn grid() -> GridWorld {
    GridWorld::new()
}

/// Place a 1x1 block owned by team 0. Panics on overlap.
pub fn place(world: &mut GridWorld, kind: BlockKind, x: i32, y: i32, rotation: Direction) -> NodeId {
    world
        .place(kind, GridPosition::new(x, y), 1, rotation, TeamId(0))
        .expect("test placement overlaps")
}

/// Place a square block of `size` tiles owned by team 0, facing east.
pub fn place_sized(world: &mut GridWorld, kind: BlockKind, x: i32, y: i32, size: u32) -> NodeId {
    world
        .place(kind, GridPosition::new(x, y), size, Direction::East, TeamId(0))
        .expect("test placement overlaps")
}

// ===========================================================================
// Block constructors
// ===========================================================================

pub fn conveyor() -> BlockKind {
    BlockKind::Conveyor { armored: false }
}

pub fn armored_conveyor() -> BlockKind {
    BlockKind::Conveyor { armored: true }
}

pub fn router() -> BlockKind {
    BlockKind::Router
}

/// A crafter that emits and consumes items only.
pub fn item_crafter() -> BlockKind {
    BlockKind::Crafter(CrafterConfig {
        outputs_items: true,
        consumes_items: true,
        ..CrafterConfig::default()
    })
}

/// A crafter that emits and consumes liquids only.
pub fn liquid_crafter() -> BlockKind {
    BlockKind::Crafter(CrafterConfig {
        outputs_liquids: true,
        consumes_liquids: true,
        ..CrafterConfig::default()
    })
}

pub fn stack_conveyor(state: StackState, output_router: bool) -> BlockKind {
    BlockKind::StackConveyor {
        state,
        output_router,
    }
}

pub fn item_bridge(range: u32) -> BlockKind {
    BlockKind::ItemBridge(BridgeConfig::with_range(range))
}

pub fn liquid_bridge(range: u32) -> BlockKind {
    BlockKind::LiquidBridge(BridgeConfig::with_range(range))
}

pub fn duct_bridge(range: u32) -> BlockKind {
    BlockKind::DuctBridge { range }
}

pub fn mass_driver(range: u32) -> BlockKind {
    BlockKind::MassDriver { range, link: None }
}

// ===========================================================================
// Recording sink
// ===========================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawnEdge {
    pub from: WorldPoint,
    pub to: WorldPoint,
    pub color: Color,
    pub alpha: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawnMarker {
    pub center: WorldPoint,
    pub half_extent: f32,
    pub color: Color,
}

/// An [`EdgeSink`] that keeps every draw call for later inspection.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pub edges: Vec<DrawnEdge>,
    pub markers: Vec<DrawnMarker>,
    pub readouts: Vec<(WorldPoint, PointerReadout)>,
}

impl RecordingSink {
    pub fn edges_colored(&self, color: Color) -> usize {
        self.edges.iter().filter(|e| e.color == color).count()
    }

    pub fn clear(&mut self) {
        self.edges.clear();
        self.markers.clear();
        self.readouts.clear();
    }
}

impl EdgeSink for RecordingSink {
    fn draw_edge(&mut self, from: WorldPoint, to: WorldPoint, color: Color, alpha: f32) {
        self.edges.push(DrawnEdge {
            from,
            to,
            color,
            alpha,
        });
    }

    fn draw_marker(&mut self, center: WorldPoint, half_extent: f32, color: Color) {
        self.markers.push(DrawnMarker {
            center,
            half_extent,
            color,
        });
    }

    fn draw_readout(&mut self, at: WorldPoint, readout: &PointerReadout) {
        self.readouts.push((at, *readout));
    }
}
