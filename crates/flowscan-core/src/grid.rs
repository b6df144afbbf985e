//! Reference [`World`] implementation backed by a tile index.
//!
//! Maintains a bidirectional mapping:
//! - `nodes`: handle -> node (kind, footprint, facing, team)
//! - `tiles`: position -> handle (which node occupies each tile)
//!
//! Bridge and mass-driver links are stored on the source node; the grid keeps
//! each bridge's `incoming` list in step with the links pointing at it.

use crate::block::BlockKind;
use crate::geom::{Direction, GridPosition};
use crate::id::{NodeId, TeamId};
use crate::world::{DEFAULT_TILE_SIZE, Node, World};
use slotmap::SlotMap;
use std::collections::{BTreeMap, BTreeSet};

/// Errors from grid mutations.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    #[error("position {0:?} is occupied")]
    Occupied(GridPosition),
    #[error("node is not placed on the grid: {0:?}")]
    NotPlaced(NodeId),
    #[error("node kind cannot hold a link: {0:?}")]
    NotLinkable(NodeId),
    #[error("footprint size must be at least 1")]
    InvalidSize,
}

#[derive(Debug)]
pub struct GridWorld {
    nodes: SlotMap<NodeId, Node>,
    tiles: BTreeMap<GridPosition, NodeId>,
    tile_size: f32,
    fog: bool,
    revealed: BTreeMap<TeamId, BTreeSet<GridPosition>>,
}

impl Default for GridWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl GridWorld {
    pub fn new() -> Self {
        Self::with_tile_size(DEFAULT_TILE_SIZE)
    }

    pub fn with_tile_size(tile_size: f32) -> Self {
        Self {
            nodes: SlotMap::with_key(),
            tiles: BTreeMap::new(),
            tile_size,
            fog: false,
            revealed: BTreeMap::new(),
        }
    }

    // -- Placement --

    /// Place a building. `origin` is the top-left tile of a `size`x`size`
    /// footprint.
    pub fn place(
        &mut self,
        kind: BlockKind,
        origin: GridPosition,
        size: u32,
        rotation: Direction,
        team: TeamId,
    ) -> Result<NodeId, GridError> {
        if size == 0 {
            return Err(GridError::InvalidSize);
        }
        if let Some(taken) = self.first_occupied(origin, size) {
            return Err(GridError::Occupied(taken));
        }
        let unloadable = kind.default_unloadable();
        let id = self.nodes.insert_with_key(|id| Node {
            id,
            kind,
            origin,
            size,
            rotation,
            team,
            unloadable,
        });
        let tiles: Vec<GridPosition> = self.nodes[id].tiles().collect();
        for tile in tiles {
            self.tiles.insert(tile, id);
        }
        Ok(id)
    }

    /// Remove a building, dropping any links that point at it.
    pub fn remove(&mut self, id: NodeId) -> Result<Node, GridError> {
        self.unlink(id)?;
        let node = self.nodes.remove(id).ok_or(GridError::NotPlaced(id))?;
        for tile in node.tiles() {
            self.tiles.remove(&tile);
        }
        if let Some(incoming) = incoming_of(&node.kind) {
            for source in incoming.clone() {
                if let Some(source_id) = self.tiles.get(&source).copied() {
                    set_link(&mut self.nodes[source_id].kind, None);
                }
            }
        }
        Ok(node)
    }

    /// Check if a footprint can be placed at the given origin.
    pub fn can_place(&self, origin: GridPosition, size: u32) -> bool {
        self.first_occupied(origin, size).is_none()
    }

    /// First tile of the footprint that is already taken, row by row.
    fn first_occupied(&self, origin: GridPosition, size: u32) -> Option<GridPosition> {
        let size = size as i32;
        (0..size)
            .flat_map(|dy| (0..size).map(move |dx| GridPosition::new(origin.x + dx, origin.y + dy)))
            .find(|tile| self.tiles.contains_key(tile))
    }

    // -- Configuration --

    /// Configure `from` (a bridge or mass driver) to link to `to`'s tile.
    ///
    /// The link is stored even when it would not be valid for transport;
    /// validity is judged at scan time, as the game does.
    pub fn link(&mut self, from: NodeId, to: NodeId) -> Result<(), GridError> {
        let target = self.nodes.get(to).ok_or(GridError::NotPlaced(to))?.origin;
        let source = self.nodes.get(from).ok_or(GridError::NotPlaced(from))?;
        if !source.kind.is_linkable() {
            return Err(GridError::NotLinkable(from));
        }
        self.unlink(from)?;

        let source_pos = self.nodes[from].origin;
        set_link(&mut self.nodes[from].kind, Some(target));
        if let Some(incoming) = incoming_of_mut(&mut self.nodes[to].kind) {
            if !incoming.contains(&source_pos) {
                incoming.push(source_pos);
            }
        }
        Ok(())
    }

    /// Clear `from`'s configured link, if any.
    pub fn unlink(&mut self, from: NodeId) -> Result<(), GridError> {
        let source = self.nodes.get(from).ok_or(GridError::NotPlaced(from))?;
        let source_pos = source.origin;
        let Some(previous) = link_of(&source.kind) else {
            return Ok(());
        };
        set_link(&mut self.nodes[from].kind, None);
        if let Some(target_id) = self.tiles.get(&previous).copied() {
            if let Some(incoming) = incoming_of_mut(&mut self.nodes[target_id].kind) {
                incoming.retain(|p| *p != source_pos);
            }
        }
        Ok(())
    }

    /// Mutable access for reconfiguration (stack modes, crafter flags).
    /// Footprint fields must not be changed through this handle.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    // -- Visibility --

    /// With fog enabled, foreign nodes are only visible once revealed.
    pub fn set_fog(&mut self, enabled: bool) {
        self.fog = enabled;
    }

    /// Reveal every tile in the inclusive rectangle to `team`.
    pub fn reveal(&mut self, team: TeamId, min: GridPosition, max: GridPosition) {
        let revealed = self.revealed.entry(team).or_default();
        for y in min.y..=max.y {
            for x in min.x..=max.x {
                revealed.insert(GridPosition::new(x, y));
            }
        }
    }

    // -- Stats --

    /// Number of unique nodes placed on the grid.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Total number of occupied tiles.
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys()
    }
}

impl World for GridWorld {
    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    fn node_at_tile(&self, pos: GridPosition) -> Option<NodeId> {
        self.tiles.get(&pos).copied()
    }

    fn proximity(&self, id: NodeId) -> Vec<NodeId> {
        let Some(node) = self.nodes.get(id) else {
            return Vec::new();
        };
        let mut seen = BTreeSet::new();
        let mut result = Vec::new();
        for dir in Direction::all() {
            for tile in node.tiles() {
                let neighbor_pos = tile.step(dir);
                if node.covers(neighbor_pos) {
                    continue;
                }
                if let Some(&neighbor) = self.tiles.get(&neighbor_pos) {
                    if seen.insert(neighbor) {
                        result.push(neighbor);
                    }
                }
            }
        }
        result
    }

    fn is_discovered_by(&self, id: NodeId, observer: TeamId) -> bool {
        let Some(node) = self.nodes.get(id) else {
            return false;
        };
        if !self.fog || node.team == observer {
            return true;
        }
        self.revealed
            .get(&observer)
            .is_some_and(|tiles| node.tiles().any(|t| tiles.contains(&t)))
    }

    fn tile_size(&self) -> f32 {
        self.tile_size
    }
}

fn link_of(kind: &BlockKind) -> Option<GridPosition> {
    match kind {
        BlockKind::ItemBridge(cfg) | BlockKind::LiquidBridge(cfg) => cfg.link,
        BlockKind::MassDriver { link, .. } => *link,
        _ => None,
    }
}

fn set_link(kind: &mut BlockKind, target: Option<GridPosition>) {
    match kind {
        BlockKind::ItemBridge(cfg) | BlockKind::LiquidBridge(cfg) => cfg.link = target,
        BlockKind::MassDriver { link, .. } => *link = target,
        _ => {}
    }
}

fn incoming_of(kind: &BlockKind) -> Option<&Vec<GridPosition>> {
    match kind {
        BlockKind::ItemBridge(cfg) | BlockKind::LiquidBridge(cfg) => Some(&cfg.incoming),
        _ => None,
    }
}

fn incoming_of_mut(kind: &mut BlockKind) -> Option<&mut Vec<GridPosition>> {
    match kind {
        BlockKind::ItemBridge(cfg) | BlockKind::LiquidBridge(cfg) => Some(&mut cfg.incoming),
        _ => None,
    }
}
