//! The world collaborator: node storage, lookup, adjacency and visibility.
//!
//! The scan never owns nodes. It borrows them from a [`World`] for the
//! duration of one call and derives everything else (facing neighbours,
//! relative directions, centres) from the four required methods.

use crate::block::BlockKind;
use crate::geom::{Direction, GridPosition, WorldPoint};
use crate::id::{NodeId, TeamId};
use serde::{Deserialize, Serialize};

/// Default edge length of one tile in world units.
pub const DEFAULT_TILE_SIZE: f32 = 8.0;

// ---------------------------------------------------------------------------
// Node
// ---------------------------------------------------------------------------

/// A placed building. Square footprint of `size` tiles anchored at `origin`
/// (top-left tile).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub kind: BlockKind,
    pub origin: GridPosition,
    pub size: u32,
    /// Facing direction. Ignored by kinds without a facing.
    pub rotation: Direction,
    pub team: TeamId,
    /// Whether unloaders may pull from this node.
    pub unloadable: bool,
}

impl Node {
    /// Whether `pos` lies inside this node's footprint.
    pub fn covers(&self, pos: GridPosition) -> bool {
        let size = self.size as i32;
        pos.x >= self.origin.x
            && pos.x < self.origin.x + size
            && pos.y >= self.origin.y
            && pos.y < self.origin.y + size
    }

    /// Iterate over every tile of the footprint.
    pub fn tiles(&self) -> impl Iterator<Item = GridPosition> + use<> {
        let size = self.size as i32;
        let origin = self.origin;
        (0..size).flat_map(move |dy| (0..size).map(move |dx| GridPosition::new(origin.x + dx, origin.y + dy)))
    }

    /// Footprint centre in half-tile units, so odd and even sizes compare
    /// exactly.
    fn doubled_center(&self) -> (i32, i32) {
        let size = self.size as i32;
        (
            2 * self.origin.x + size - 1,
            2 * self.origin.y + size - 1,
        )
    }
}

// ---------------------------------------------------------------------------
// World trait
// ---------------------------------------------------------------------------

/// Read-only access to the building grid.
pub trait World {
    /// Look up a node by handle.
    fn node(&self, id: NodeId) -> Option<&Node>;

    /// The node covering a tile, if any.
    fn node_at_tile(&self, pos: GridPosition) -> Option<NodeId>;

    /// Unique nodes sharing an edge with `id`'s footprint.
    fn proximity(&self, id: NodeId) -> Vec<NodeId>;

    /// Whether `observer` is allowed to see `id`.
    fn is_discovered_by(&self, id: NodeId, observer: TeamId) -> bool;

    fn tile_size(&self) -> f32 {
        DEFAULT_TILE_SIZE
    }

    /// The node under a world-space point.
    fn node_at(&self, point: WorldPoint) -> Option<NodeId> {
        self.node_at_tile(point.to_tile(self.tile_size()))
    }

    /// World-space centre of a node.
    fn center(&self, id: NodeId) -> Option<WorldPoint> {
        let node = self.node(id)?;
        Some(WorldPoint::footprint_center(
            node.origin,
            node.size,
            self.tile_size(),
        ))
    }

    /// The first node found across `id`'s edge facing `dir`.
    fn nearby(&self, id: NodeId, dir: Direction) -> Option<NodeId> {
        let node = self.node(id)?;
        node.tiles()
            .map(|tile| tile.step(dir))
            .filter(|pos| !node.covers(*pos))
            .find_map(|pos| self.node_at_tile(pos))
    }

    /// The node `id` faces.
    fn front(&self, id: NodeId) -> Option<NodeId> {
        let rotation = self.node(id)?.rotation;
        self.nearby(id, rotation)
    }

    /// The node directly behind `id`.
    fn back(&self, id: NodeId) -> Option<NodeId> {
        let rotation = self.node(id)?.rotation;
        self.nearby(id, rotation.opposite())
    }

    /// Direction from `from` toward `to`.
    ///
    /// Two single-tile nodes only relate when they are edge-adjacent. For
    /// larger footprints the dominant axis between the centres is used.
    fn relative_to(&self, from: NodeId, to: NodeId) -> Option<Direction> {
        let a = self.node(from)?;
        let b = self.node(to)?;
        if a.size == 1 && b.size == 1 {
            return a.origin.unit_direction_to(&b.origin);
        }
        let (ax, ay) = a.doubled_center();
        let (bx, by) = b.doubled_center();
        let (dx, dy) = (bx - ax, by - ay);
        if dx == 0 && dy == 0 {
            return None;
        }
        if dx.abs() > dy.abs() {
            Some(if dx > 0 { Direction::East } else { Direction::West })
        } else {
            Some(if dy > 0 { Direction::South } else { Direction::North })
        }
    }
}
