//! Depth-first walk over the transport network from a focal node.
//!
//! One pass covers a fixed ([`FlowDirection`], [`Commodity`]) pair and owns
//! its own [`TraversalContext`]. A pass visits each node at most once, so it
//! terminates on cyclic layouts in O(nodes).
//!
//! Edges are confirmed from both sides: the emitting side must declare the
//! candidate as an output (or accept it as an input), and the other side's
//! adaptor must resolve the link back through
//! [`NodeAdaptor::actual_input_receiver`] /
//! [`NodeAdaptor::actual_output_source`]. Candidates whose resolution yields
//! nothing are dropped, never drawn as edges to nowhere.

use crate::adaptor::NodeAdaptor;
use crate::id::NodeId;
use crate::world::World;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, trace};

// ---------------------------------------------------------------------------
// Pass parameters
// ---------------------------------------------------------------------------

/// The material classes tracked independently by the scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Commodity {
    Item,
    Liquid,
}

impl Commodity {
    pub fn all() -> [Commodity; 2] {
        [Commodity::Item, Commodity::Liquid]
    }
}

/// Which way a pass walks the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FlowDirection {
    /// Follow material away from the focal node.
    Outbound,
    /// Follow material back to where it comes from.
    Inbound,
}

impl FlowDirection {
    pub fn all() -> [FlowDirection; 2] {
        [FlowDirection::Outbound, FlowDirection::Inbound]
    }
}

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

/// Mutable state of a single pass, threaded through every adaptor call.
#[derive(Debug, Clone)]
pub struct TraversalContext {
    focal: NodeId,
    visited: BTreeSet<NodeId>,
    /// Indirection nodes currently being resolved through, innermost last.
    delegation: Vec<NodeId>,
    dead_ends: Vec<NodeId>,
}

impl TraversalContext {
    pub fn new(focal: NodeId) -> Self {
        Self {
            focal,
            visited: BTreeSet::new(),
            delegation: Vec::new(),
            dead_ends: Vec::new(),
        }
    }

    pub fn focal(&self) -> NodeId {
        self.focal
    }

    pub fn is_focal(&self, id: NodeId) -> bool {
        self.focal == id
    }

    /// Mark `id` visited. Returns false if it already was.
    pub fn visit(&mut self, id: NodeId) -> bool {
        self.visited.insert(id)
    }

    pub fn is_visited(&self, id: NodeId) -> bool {
        self.visited.contains(&id)
    }

    pub fn visited(&self) -> &BTreeSet<NodeId> {
        &self.visited
    }

    /// Begin resolving through indirection node `id`.
    ///
    /// Returns false when `id` is already on the current delegation chain;
    /// the caller must then abandon the lookup. On success `id` is recorded
    /// as visited and must be released with [`leave_delegation`].
    ///
    /// [`leave_delegation`]: TraversalContext::leave_delegation
    pub fn enter_delegation(&mut self, id: NodeId) -> bool {
        if self.delegation.contains(&id) {
            return false;
        }
        self.delegation.push(id);
        self.visited.insert(id);
        true
    }

    pub fn leave_delegation(&mut self, id: NodeId) {
        if let Some(pos) = self.delegation.iter().rposition(|d| *d == id) {
            self.delegation.truncate(pos);
        }
    }

    /// Record an indirection node whose lookup found nothing to delegate to.
    pub fn record_dead_end(&mut self, id: NodeId) {
        if !self.dead_ends.contains(&id) {
            self.dead_ends.push(id);
        }
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// A resolved link, produced only to be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge {
    /// Node material leaves.
    pub from: NodeId,
    /// Node material arrives at.
    pub to: NodeId,
    pub commodity: Commodity,
    pub direction: FlowDirection,
}

/// Everything one pass discovered.
#[derive(Debug, Clone)]
pub struct PassResult {
    pub direction: FlowDirection,
    pub commodity: Commodity,
    /// Edges in discovery order, without duplicates.
    pub edges: Vec<Edge>,
    /// Path terminals: endpoint nodes that stopped expansion and indirection
    /// nodes that led nowhere.
    pub endpoints: Vec<NodeId>,
    pub visited: BTreeSet<NodeId>,
}

impl PassResult {
    fn new(direction: FlowDirection, commodity: Commodity) -> Self {
        Self {
            direction,
            commodity,
            edges: Vec::new(),
            endpoints: Vec::new(),
            visited: BTreeSet::new(),
        }
    }

    pub fn has_edge(&self, from: NodeId, to: NodeId) -> bool {
        self.edges.iter().any(|e| e.from == from && e.to == to)
    }

    /// Whether `id` is the source or destination of any edge.
    pub fn touches(&self, id: NodeId) -> bool {
        self.edges.iter().any(|e| e.from == id || e.to == id)
    }

    fn push_edge(&mut self, from: NodeId, to: NodeId) {
        if self.has_edge(from, to) {
            return;
        }
        trace!(?from, ?to, commodity = ?self.commodity, direction = ?self.direction, "edge");
        self.edges.push(Edge {
            from,
            to,
            commodity: self.commodity,
            direction: self.direction,
        });
    }

    fn push_endpoint(&mut self, id: NodeId) {
        if !self.endpoints.contains(&id) {
            self.endpoints.push(id);
        }
    }
}

// ---------------------------------------------------------------------------
// Passes
// ---------------------------------------------------------------------------

/// Run one pass from `focal`.
pub fn run_pass(
    world: &dyn World,
    focal: NodeId,
    direction: FlowDirection,
    commodity: Commodity,
) -> PassResult {
    let mut ctx = TraversalContext::new(focal);
    let mut pass = PassResult::new(direction, commodity);

    // Explicit work stack in place of call recursion: long belt lines would
    // otherwise grow the call stack with the network.
    let mut stack = vec![focal];
    while let Some(id) = stack.pop() {
        let next = match direction {
            FlowDirection::Outbound => visit_outbound(world, id, commodity, &mut ctx, &mut pass),
            FlowDirection::Inbound => visit_inbound(world, id, commodity, &mut ctx, &mut pass),
        };
        stack.extend(next.into_iter().rev());
    }

    for dead_end in std::mem::take(&mut ctx.dead_ends) {
        pass.push_endpoint(dead_end);
    }
    pass.visited = ctx.visited;
    debug!(
        ?focal,
        ?direction,
        ?commodity,
        edges = pass.edges.len(),
        endpoints = pass.endpoints.len(),
        visited = pass.visited.len(),
        "pass complete"
    );
    pass
}

/// Expand one node outward. Returns the receivers to walk next.
fn visit_outbound(
    world: &dyn World,
    id: NodeId,
    commodity: Commodity,
    ctx: &mut TraversalContext,
    pass: &mut PassResult,
) -> Vec<NodeId> {
    if !ctx.visit(id) {
        return Vec::new();
    }
    let Some(adaptor) = NodeAdaptor::resolve_id(world, id) else {
        return Vec::new();
    };
    if adaptor.is_endpoint() && !ctx.is_focal(id) {
        pass.push_endpoint(id);
        return Vec::new();
    }

    let mut next = Vec::new();
    for output in adaptor.possible_outputs(commodity) {
        let Some(candidate) = NodeAdaptor::resolve_id(world, output) else {
            continue;
        };
        let Some(receiver) = candidate.actual_input_receiver(id, commodity, ctx) else {
            trace!(from = ?id, candidate = ?output, "no receiver");
            continue;
        };
        if receiver == id {
            continue;
        }
        pass.push_edge(id, receiver);
        next.push(receiver);
    }
    next
}

/// Expand one node backward. Returns the sources to walk next.
fn visit_inbound(
    world: &dyn World,
    id: NodeId,
    commodity: Commodity,
    ctx: &mut TraversalContext,
    pass: &mut PassResult,
) -> Vec<NodeId> {
    if !ctx.visit(id) {
        return Vec::new();
    }
    let Some(adaptor) = NodeAdaptor::resolve_id(world, id) else {
        return Vec::new();
    };
    if adaptor.is_endpoint() && !ctx.is_focal(id) {
        pass.push_endpoint(id);
        return Vec::new();
    }

    let mut inputs = world.proximity(id);
    for external in adaptor.external_possible_inputs() {
        if !inputs.contains(&external) {
            inputs.push(external);
        }
    }
    inputs.retain(|input| adaptor.can_accept(*input, commodity));

    let mut next = Vec::new();
    for input in inputs {
        let Some(candidate) = NodeAdaptor::resolve_id(world, input) else {
            continue;
        };
        let Some(source) = candidate.actual_output_source(id, commodity, ctx) else {
            trace!(to = ?id, candidate = ?input, "no source");
            continue;
        };
        if source == id {
            continue;
        }
        pass.push_edge(source, id);
        next.push(source);
    }
    next
}
