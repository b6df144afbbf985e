//! Per-frame entry point.
//!
//! [`TransportScan::scan`] resolves the node under the pointer and runs the
//! four passes from it. [`TransportScan::on_frame`] is the tick callback the
//! host wires into its render loop: scan, then draw.

use crate::config::ScanConfig;
use crate::geom::{GridPosition, WorldPoint};
use crate::id::{NodeId, TeamId};
use crate::render::{EdgeSink, draw_report};
use crate::traversal::{Commodity, FlowDirection, PassResult, run_pass};
use crate::world::World;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Pass order within one scan.
const PASS_ORDER: [(FlowDirection, Commodity); 4] = [
    (FlowDirection::Outbound, Commodity::Item),
    (FlowDirection::Outbound, Commodity::Liquid),
    (FlowDirection::Inbound, Commodity::Item),
    (FlowDirection::Inbound, Commodity::Liquid),
];

// ---------------------------------------------------------------------------
// Frame data
// ---------------------------------------------------------------------------

/// Everything the host supplies per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInput {
    /// Pointer position in world units.
    pub pointer: WorldPoint,
    /// Team whose fog-of-war applies.
    pub observer: TeamId,
    /// Observer's own position, if it has one.
    pub observer_position: Option<WorldPoint>,
    /// Monotonic frame time in ticks, drives the pulse.
    pub time: f32,
}

/// Pointer coordinate label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointerReadout {
    pub tile: GridPosition,
    /// Whole tiles between the observer and the pointer.
    pub distance_tiles: Option<u32>,
}

/// Result of one scan.
#[derive(Debug, Clone)]
pub struct ScanReport {
    pub pointer: WorldPoint,
    pub readout: PointerReadout,
    /// `None` when nothing visible sits under the pointer.
    pub focal: Option<NodeId>,
    /// Enabled passes in execution order.
    pub passes: Vec<PassResult>,
}

impl ScanReport {
    pub fn pass(&self, direction: FlowDirection, commodity: Commodity) -> Option<&PassResult> {
        self.passes
            .iter()
            .find(|p| p.direction == direction && p.commodity == commodity)
    }

    pub fn edge_count(&self) -> usize {
        self.passes.iter().map(|p| p.edges.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.edge_count() == 0
    }
}

// ---------------------------------------------------------------------------
// Scanner
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct TransportScan {
    config: ScanConfig,
}

impl TransportScan {
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: ScanConfig) {
        self.config = config;
    }

    /// Scan from whatever sits under `pointer`.
    ///
    /// The readout is always filled. Passes only run when a node covers the
    /// pointer tile and the observer has discovered it.
    pub fn scan(
        &self,
        world: &dyn World,
        pointer: WorldPoint,
        observer: TeamId,
        observer_position: Option<WorldPoint>,
    ) -> ScanReport {
        let tile_size = world.tile_size();
        let readout = PointerReadout {
            tile: pointer.truncated_tile(tile_size),
            distance_tiles: observer_position
                .map(|from| (from.distance(&pointer) / tile_size).max(0.0) as u32),
        };

        let focal = world
            .node_at(pointer)
            .filter(|id| world.is_discovered_by(*id, observer));
        let mut report = ScanReport {
            pointer,
            readout,
            focal,
            passes: Vec::new(),
        };
        let Some(focal) = focal else {
            return report;
        };

        for (direction, commodity) in PASS_ORDER {
            if self.config.passes.enabled(direction, commodity) {
                report
                    .passes
                    .push(run_pass(world, focal, direction, commodity));
            }
        }
        debug!(
            ?focal,
            tile = ?report.readout.tile,
            passes = report.passes.len(),
            edges = report.edge_count(),
            "scan complete"
        );
        report
    }

    /// Tick callback: scan, then hand the result to `sink`.
    pub fn on_frame(
        &self,
        world: &dyn World,
        frame: &FrameInput,
        sink: &mut dyn EdgeSink,
    ) -> ScanReport {
        let report = self.scan(world, frame.pointer, frame.observer, frame.observer_position);
        draw_report(world, &report, &self.config, frame.time, sink);
        report
    }
}
