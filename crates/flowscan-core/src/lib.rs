//! Flowscan Core -- transport-network scan for tile-based factory worlds.
//!
//! Given the node under the pointer (the *focal* node), the scan walks the
//! transport network around it and reports which neighbours items and
//! liquids flow to (outbound) and come from (inbound). Each block kind is
//! interpreted by a [`adaptor::NodeAdaptor`], so conveyors, routers,
//! bridges, junctions, mass drivers and pipes all share one traversal.
//!
//! # Per-frame flow
//!
//! 1. The host calls [`scan::TransportScan::on_frame`] with the pointer and
//!    observing team.
//! 2. The node under the pointer is looked up through the [`world::World`]
//!    collaborator. Undiscovered nodes are ignored.
//! 3. Four passes run in order (outbound items, outbound liquids, inbound
//!    items, inbound liquids), each with a fresh
//!    [`traversal::TraversalContext`].
//! 4. The resulting [`scan::ScanReport`] is handed to an
//!    [`render::EdgeSink`] as coloured edges and markers.
//!
//! # Key Types
//!
//! - [`world::World`] -- Read-only view of the placed blocks.
//! - [`grid::GridWorld`] -- In-memory reference world.
//! - [`block::BlockKind`] -- Structural kind plus connectivity config.
//! - [`adaptor::NodeAdaptor`] -- Per-kind connectivity rules.
//! - [`traversal::run_pass`] -- One directional, per-commodity walk.
//! - [`config::ScanConfig`] -- Colours, pulse and pass toggles.

pub mod adaptor;
pub mod block;
pub mod config;
pub mod geom;
pub mod grid;
pub mod id;
pub mod render;
pub mod scan;
pub mod traversal;
pub mod world;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
