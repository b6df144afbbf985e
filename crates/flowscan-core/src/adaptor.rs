//! Per-kind connectivity rules.
//!
//! [`NodeAdaptor::resolve`] maps every [`BlockKind`] onto one arm of the
//! closed [`AdaptorKind`] sum type. Kinds the scan does not model land on
//! [`AdaptorKind::Noop`], so resolution is total. Adaptors are built fresh
//! for every lookup and borrow the world for that lookup only; link validity
//! is computed at construction time from the current world state.

use crate::block::{BlockKind, BridgeConfig, CrafterConfig, StackState};
use crate::geom::{Direction, GridPosition};
use crate::id::NodeId;
use crate::traversal::{Commodity, TraversalContext};
use crate::world::{Node, World};
use tracing::trace;

// ---------------------------------------------------------------------------
// Adaptor kinds
// ---------------------------------------------------------------------------

/// Connectivity family of a node, with the state its rules depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdaptorKind {
    /// Belt or duct: single forward output.
    Conveyor { armored: bool, duct: bool },
    StackConveyor { state: StackState, output_router: bool },
    /// Router, sorter, overflow gate: fan out to every neighbour.
    Router,
    /// Duct router, overflow duct: fed from the back only.
    DirectionalRouter,
    Unloader,
    DirectionalUnloader,
    /// Two-endpoint bridge. `link` is the target if the configured link is
    /// currently valid.
    Bridge { commodity: Commodity, link: Option<NodeId> },
    /// Bridge that links to the first matching bridge it faces.
    DirectionBridge { commodity: Commodity, link: Option<NodeId> },
    /// Pass-through crossing; never a link endpoint itself.
    Junction { commodity: Commodity },
    MassDriver { link: Option<NodeId> },
    Conduit,
    LiquidRouter,
    Crafter(CrafterConfig),
    /// Pump or sandbox source.
    Source { commodity: Commodity },
    Noop,
}

/// A node viewed through its connectivity rules.
#[derive(Clone, Copy)]
pub struct NodeAdaptor<'w> {
    world: &'w dyn World,
    node: &'w Node,
    kind: AdaptorKind,
}

impl std::fmt::Debug for NodeAdaptor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeAdaptor")
            .field("node", &self.node.id)
            .field("kind", &self.kind)
            .finish()
    }
}

impl<'w> NodeAdaptor<'w> {
    /// Resolve the adaptor for a node. Total over [`BlockKind`].
    pub fn resolve(world: &'w dyn World, node: &'w Node) -> Self {
        let kind = match &node.kind {
            BlockKind::Conveyor { armored } => AdaptorKind::Conveyor {
                armored: *armored,
                duct: false,
            },
            BlockKind::Duct { armored } => AdaptorKind::Conveyor {
                armored: *armored,
                duct: true,
            },
            BlockKind::StackConveyor {
                state,
                output_router,
            } => AdaptorKind::StackConveyor {
                state: *state,
                output_router: *output_router,
            },
            BlockKind::Router | BlockKind::Sorter | BlockKind::OverflowGate => AdaptorKind::Router,
            BlockKind::DuctRouter | BlockKind::OverflowDuct => AdaptorKind::DirectionalRouter,
            BlockKind::Unloader => AdaptorKind::Unloader,
            BlockKind::DirectionalUnloader => AdaptorKind::DirectionalUnloader,
            BlockKind::ItemBridge(cfg) => AdaptorKind::Bridge {
                commodity: Commodity::Item,
                link: valid_bridge_link(world, node, cfg),
            },
            BlockKind::LiquidBridge(cfg) => AdaptorKind::Bridge {
                commodity: Commodity::Liquid,
                link: valid_bridge_link(world, node, cfg),
            },
            BlockKind::DuctBridge { range } => AdaptorKind::DirectionBridge {
                commodity: Commodity::Item,
                link: find_direction_link(world, node, *range),
            },
            BlockKind::DirectionLiquidBridge { range } => AdaptorKind::DirectionBridge {
                commodity: Commodity::Liquid,
                link: find_direction_link(world, node, *range),
            },
            BlockKind::Junction | BlockKind::DuctJunction => AdaptorKind::Junction {
                commodity: Commodity::Item,
            },
            BlockKind::LiquidJunction => AdaptorKind::Junction {
                commodity: Commodity::Liquid,
            },
            BlockKind::MassDriver { range, link } => AdaptorKind::MassDriver {
                link: valid_driver_link(world, node, *range, *link),
            },
            BlockKind::Conduit => AdaptorKind::Conduit,
            BlockKind::LiquidRouter => AdaptorKind::LiquidRouter,
            BlockKind::Pump | BlockKind::LiquidSource => AdaptorKind::Source {
                commodity: Commodity::Liquid,
            },
            BlockKind::ItemSource => AdaptorKind::Source {
                commodity: Commodity::Item,
            },
            BlockKind::Crafter(cfg) => AdaptorKind::Crafter(*cfg),
            BlockKind::Storage | BlockKind::Other { .. } => AdaptorKind::Noop,
        };
        Self { world, node, kind }
    }

    /// Resolve by handle. `None` only if the handle is stale.
    pub fn resolve_id(world: &'w dyn World, id: NodeId) -> Option<Self> {
        world.node(id).map(|node| Self::resolve(world, node))
    }

    pub fn id(&self) -> NodeId {
        self.node.id
    }

    pub fn kind(&self) -> AdaptorKind {
        self.kind
    }

    /// Pure producers and consumers terminate a drawn path.
    pub fn is_endpoint(&self) -> bool {
        matches!(
            self.kind,
            AdaptorKind::Crafter(_) | AdaptorKind::Source { .. }
        )
    }

    /// Nodes that are never the logical end of a link.
    pub fn is_indirection(&self) -> bool {
        matches!(self.kind, AdaptorKind::Junction { .. })
    }

    /// Whether lookups for `commodity` pass through this node.
    pub fn delegates(&self, commodity: Commodity) -> bool {
        matches!(self.kind, AdaptorKind::Junction { commodity: own } if own == commodity)
    }

    // -- Local rules --

    /// Nodes this node might push `commodity` toward, from local state only.
    pub fn possible_outputs(&self, commodity: Commodity) -> Vec<NodeId> {
        let id = self.node.id;
        let world = self.world;
        match self.kind {
            AdaptorKind::Conveyor { .. } | AdaptorKind::DirectionalUnloader
                if commodity == Commodity::Item =>
            {
                world.front(id).into_iter().collect()
            }
            AdaptorKind::StackConveyor {
                state,
                output_router,
            } if commodity == Commodity::Item => match state {
                StackState::Output if output_router => {
                    let back = world.back(id);
                    world
                        .proximity(id)
                        .into_iter()
                        .filter(|n| Some(*n) != back)
                        .collect()
                }
                StackState::Output | StackState::Input => world.front(id).into_iter().collect(),
                StackState::Standby => world
                    .proximity(id)
                    .into_iter()
                    .filter(|n| self.kind_of(*n).is_some_and(BlockKind::is_stack_conveyor))
                    .collect(),
            },
            AdaptorKind::Router | AdaptorKind::Unloader if commodity == Commodity::Item => {
                world.proximity(id)
            }
            AdaptorKind::DirectionalRouter if commodity == Commodity::Item => {
                let back = world.back(id);
                world
                    .proximity(id)
                    .into_iter()
                    .filter(|n| Some(*n) != back)
                    .collect()
            }
            AdaptorKind::Bridge {
                commodity: own,
                link,
            } if own == commodity => match link {
                Some(target) => vec![target],
                None => self.bridge_dump_targets(),
            },
            AdaptorKind::DirectionBridge {
                commodity: own,
                link,
            } if own == commodity => match link {
                Some(target) => vec![target],
                None => world.front(id).into_iter().collect(),
            },
            AdaptorKind::Junction { commodity: own } if own == commodity => world.proximity(id),
            AdaptorKind::MassDriver { link } if commodity == Commodity::Item => match link {
                Some(target) => vec![target],
                None => world.proximity(id),
            },
            AdaptorKind::Conduit if commodity == Commodity::Liquid => {
                world.front(id).into_iter().collect()
            }
            AdaptorKind::LiquidRouter if commodity == Commodity::Liquid => world.proximity(id),
            AdaptorKind::Crafter(cfg) => {
                let emits = match commodity {
                    Commodity::Item => cfg.outputs_items,
                    Commodity::Liquid => cfg.outputs_liquids,
                };
                if emits { world.proximity(id) } else { Vec::new() }
            }
            AdaptorKind::Source { commodity: own } if own == commodity => world.proximity(id),
            _ => Vec::new(),
        }
    }

    /// Whether this node takes `commodity` arriving from `from`.
    pub fn can_accept(&self, from: NodeId, commodity: Commodity) -> bool {
        let id = self.node.id;
        let world = self.world;
        match self.kind {
            AdaptorKind::Conveyor { armored, duct } if commodity == Commodity::Item => {
                if world.front(id) == Some(from) {
                    return false;
                }
                if !armored || world.back(id) == Some(from) {
                    return true;
                }
                // Armored belts only take side input from their own family.
                self.kind_of(from).is_some_and(|kind| {
                    if duct {
                        kind.is_duct()
                    } else {
                        kind.is_conveyor()
                    }
                })
            }
            AdaptorKind::StackConveyor { state, .. } if commodity == Commodity::Item => {
                let from_stack = self.kind_of(from).is_some_and(BlockKind::is_stack_conveyor);
                match state {
                    StackState::Output => from_stack && world.back(id) == Some(from),
                    StackState::Input => world.front(id) != Some(from),
                    StackState::Standby => from_stack,
                }
            }
            AdaptorKind::Router | AdaptorKind::MassDriver { .. }
                if commodity == Commodity::Item =>
            {
                true
            }
            AdaptorKind::DirectionalRouter if commodity == Commodity::Item => {
                world.back(id) == Some(from)
            }
            AdaptorKind::Unloader if commodity == Commodity::Item => self.is_unloadable(from),
            AdaptorKind::DirectionalUnloader if commodity == Commodity::Item => {
                world.back(id) == Some(from) && self.is_unloadable(from)
            }
            AdaptorKind::Bridge {
                commodity: own,
                link,
            } if own == commodity => self.bridge_accepts(from, link),
            AdaptorKind::DirectionBridge { commodity: own, .. } if own == commodity => {
                self.occupying_bridges().contains(&from) || world.front(id) != Some(from)
            }
            AdaptorKind::Junction { commodity: own } => own == commodity,
            AdaptorKind::Conduit if commodity == Commodity::Liquid => world.front(id) != Some(from),
            AdaptorKind::LiquidRouter => commodity == Commodity::Liquid,
            AdaptorKind::Crafter(cfg) => match commodity {
                Commodity::Item => cfg.consumes_items,
                Commodity::Liquid => cfg.consumes_liquids,
            },
            _ => false,
        }
    }

    /// Sources that are not geometric neighbours: incoming bridge links and
    /// directional bridges pointing at this one.
    pub fn external_possible_inputs(&self) -> Vec<NodeId> {
        match self.kind {
            AdaptorKind::Bridge { .. } => self
                .incoming_positions()
                .iter()
                .filter_map(|pos| self.world.node_at_tile(*pos))
                .collect(),
            AdaptorKind::DirectionBridge { .. } => self.occupying_bridges(),
            _ => Vec::new(),
        }
    }

    // -- Delegating resolution --

    /// The node that actually delivers `commodity` to `to` through this one.
    ///
    /// A junction answers with whatever feeds it from the side opposite `to`;
    /// every other kind answers with itself if it declares `to` as an output.
    pub fn actual_output_source(
        &self,
        to: NodeId,
        commodity: Commodity,
        ctx: &mut TraversalContext,
    ) -> Option<NodeId> {
        match self.kind {
            AdaptorKind::Junction { commodity: own } => {
                if own != commodity {
                    return None;
                }
                let arrival = self.world.relative_to(to, self.node.id)?;
                let id = self.node.id;
                self.delegate(arrival, commodity, ctx, |next, ctx| {
                    next.actual_output_source(id, commodity, ctx)
                })
            }
            _ => self
                .possible_outputs(commodity)
                .contains(&to)
                .then_some(self.node.id),
        }
    }

    /// The node that actually receives `commodity` sent from `from` into
    /// this one.
    pub fn actual_input_receiver(
        &self,
        from: NodeId,
        commodity: Commodity,
        ctx: &mut TraversalContext,
    ) -> Option<NodeId> {
        match self.kind {
            AdaptorKind::Junction { commodity: own } => {
                if own != commodity {
                    return None;
                }
                let arrival = self.world.relative_to(from, self.node.id)?;
                let id = self.node.id;
                self.delegate(arrival, commodity, ctx, |next, ctx| {
                    next.actual_input_receiver(id, commodity, ctx)
                })
            }
            _ => self
                .can_accept(from, commodity)
                .then_some(self.node.id),
        }
    }

    /// Continue a lookup with the neighbour across the edge facing `dir`.
    ///
    /// This node is recorded as a dead end when the far side is empty or its
    /// neighbour refuses. A nested junction carrying `commodity` records its
    /// own.
    fn delegate(
        &self,
        dir: Direction,
        commodity: Commodity,
        ctx: &mut TraversalContext,
        lookup: impl FnOnce(NodeAdaptor<'w>, &mut TraversalContext) -> Option<NodeId>,
    ) -> Option<NodeId> {
        let id = self.node.id;
        if !ctx.enter_delegation(id) {
            trace!(node = ?id, "delegation cycle");
            return None;
        }
        let next = self
            .world
            .nearby(id, dir)
            .and_then(|next| NodeAdaptor::resolve_id(self.world, next));
        let result = match next {
            Some(next) if next.delegates(commodity) => lookup(next, ctx),
            Some(next) => {
                let found = lookup(next, ctx);
                if found.is_none() {
                    ctx.record_dead_end(id);
                }
                found
            }
            None => {
                ctx.record_dead_end(id);
                None
            }
        };
        ctx.leave_delegation(id);
        result
    }

    // -- Helpers --

    fn kind_of(&self, id: NodeId) -> Option<&'w BlockKind> {
        self.world.node(id).map(|n| &n.kind)
    }

    fn is_unloadable(&self, id: NodeId) -> bool {
        self.world.node(id).is_some_and(|n| n.unloadable)
    }

    fn incoming_positions(&self) -> &'w [GridPosition] {
        match &self.node.kind {
            BlockKind::ItemBridge(cfg) | BlockKind::LiquidBridge(cfg) => &cfg.incoming,
            _ => &[],
        }
    }

    /// Directions from this bridge toward its incoming links.
    fn incoming_directions(&self) -> Vec<Direction> {
        self.incoming_positions()
            .iter()
            .filter_map(|pos| self.node.origin.axis_direction_to(pos))
            .collect()
    }

    fn is_incoming(&self, from: NodeId) -> bool {
        self.world
            .node(from)
            .is_some_and(|n| self.incoming_positions().contains(&n.origin))
    }

    /// An unlinked bridge dumps to every side except those its incoming
    /// links arrive from.
    fn bridge_dump_targets(&self) -> Vec<NodeId> {
        let id = self.node.id;
        let blocked = self.incoming_directions();
        self.world
            .proximity(id)
            .into_iter()
            .filter(|n| {
                self.world
                    .relative_to(id, *n)
                    .is_none_or(|dir| !blocked.contains(&dir))
            })
            .collect()
    }

    fn bridge_accepts(&self, from: NodeId, link: Option<NodeId>) -> bool {
        if self.is_incoming(from) {
            return true;
        }
        let Some(target) = link else {
            return false;
        };
        let id = self.node.id;
        let link_dir = self
            .world
            .node(target)
            .and_then(|t| self.node.origin.axis_direction_to(&t.origin));
        link_dir != self.world.relative_to(id, from)
    }

    /// Directional bridges of the same block whose link lands on this one.
    fn occupying_bridges(&self) -> Vec<NodeId> {
        let id = self.node.id;
        let range = direction_bridge_range(&self.node.kind);
        let mut result = Vec::new();
        for dir in Direction::all() {
            for step in 1..=range as i32 {
                let pos = self.node.origin.offset_by(dir, step);
                let Some(other) = self.world.node_at_tile(pos).and_then(|n| self.world.node(n)) else {
                    continue;
                };
                if !other.kind.same_block(&self.node.kind) || other.team != self.node.team {
                    continue;
                }
                let other_range = direction_bridge_range(&other.kind);
                if find_direction_link(self.world, other, other_range) == Some(id) {
                    result.push(other.id);
                }
                break;
            }
        }
        result
    }
}

// ---------------------------------------------------------------------------
// Link validity
// ---------------------------------------------------------------------------

/// The configured bridge target, if the link is currently usable: same
/// block, same team, axis-aligned within range, and not linked back.
fn valid_bridge_link(world: &dyn World, node: &Node, cfg: &BridgeConfig) -> Option<NodeId> {
    let target_id = world.node_at_tile(cfg.link?)?;
    let target = world.node(target_id)?;
    if target.id == node.id || !target.kind.same_block(&node.kind) || target.team != node.team {
        return None;
    }
    node.origin.axis_direction_to(&target.origin)?;
    if node.origin.manhattan_distance(&target.origin) > cfg.range {
        return None;
    }
    let links_back = match &target.kind {
        BlockKind::ItemBridge(other) | BlockKind::LiquidBridge(other) => {
            other.link == Some(node.origin)
        }
        _ => false,
    };
    (!links_back).then_some(target_id)
}

/// The configured mass-driver target, if it is another driver of the same
/// team within range (centre to centre, in tiles).
fn valid_driver_link(
    world: &dyn World,
    node: &Node,
    range: u32,
    link: Option<GridPosition>,
) -> Option<NodeId> {
    let target_id = world.node_at_tile(link?)?;
    let target = world.node(target_id)?;
    if target.id == node.id || !target.kind.same_block(&node.kind) || target.team != node.team {
        return None;
    }
    let distance = world.center(node.id)?.distance(&world.center(target_id)?) / world.tile_size();
    (distance <= range as f32).then_some(target_id)
}

/// First bridge of the same block and team within range in the facing
/// direction.
fn find_direction_link(world: &dyn World, node: &Node, range: u32) -> Option<NodeId> {
    (1..=range as i32)
        .map(|step| node.origin.offset_by(node.rotation, step))
        .filter_map(|pos| world.node_at_tile(pos))
        .filter_map(|id| world.node(id))
        .find(|other| other.kind.same_block(&node.kind) && other.team == node.team)
        .map(|other| other.id)
}

fn direction_bridge_range(kind: &BlockKind) -> u32 {
    match kind {
        BlockKind::DuctBridge { range } | BlockKind::DirectionLiquidBridge { range } => *range,
        _ => 0,
    }
}
