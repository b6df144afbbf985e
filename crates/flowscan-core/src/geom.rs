//! Grid and world-space geometry shared by the world model and the scan.
//!
//! Grid coordinates are integer tiles with `y` growing downward. World
//! coordinates are floating-point units where tile `(x, y)` is centred on
//! `(x * tile_size, y * tile_size)`.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Grid positions
// ---------------------------------------------------------------------------

/// A position on the 2D tile grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPosition {
    pub x: i32,
    pub y: i32,
}

impl GridPosition {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance to another position.
    pub fn manhattan_distance(&self, other: &GridPosition) -> u32 {
        (self.x - other.x).unsigned_abs() + (self.y - other.y).unsigned_abs()
    }

    /// The adjacent position one step in `dir`.
    pub fn step(&self, dir: Direction) -> GridPosition {
        self.offset_by(dir, 1)
    }

    /// The position `distance` steps away in `dir`.
    pub fn offset_by(&self, dir: Direction, distance: i32) -> GridPosition {
        let (dx, dy) = dir.offset();
        GridPosition::new(self.x + dx * distance, self.y + dy * distance)
    }

    /// Direction of a unit cardinal step from `self` to `other`, if the two
    /// positions are exactly one tile apart along an axis.
    pub fn unit_direction_to(&self, other: &GridPosition) -> Option<Direction> {
        let delta = (other.x - self.x, other.y - self.y);
        Direction::all().into_iter().find(|d| d.offset() == delta)
    }

    /// Direction from `self` toward `other` when both lie on the same row or
    /// column. `None` for identical or diagonal positions.
    pub fn axis_direction_to(&self, other: &GridPosition) -> Option<Direction> {
        match (other.x - self.x, other.y - self.y) {
            (0, 0) => None,
            (0, dy) if dy < 0 => Some(Direction::North),
            (0, _) => Some(Direction::South),
            (dx, 0) if dx > 0 => Some(Direction::East),
            (_, 0) => Some(Direction::West),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Directions
// ---------------------------------------------------------------------------

/// Cardinal directions. A node's rotation is the direction it faces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    North,
    #[default]
    East,
    South,
    West,
}

impl Direction {
    /// All four cardinal directions.
    pub fn all() -> [Direction; 4] {
        [
            Direction::North,
            Direction::East,
            Direction::South,
            Direction::West,
        ]
    }

    /// Offset for this direction.
    pub fn offset(&self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::East => (1, 0),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }
}

// ---------------------------------------------------------------------------
// World space
// ---------------------------------------------------------------------------

/// A point in world units (pointer positions, draw coordinates).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldPoint {
    pub x: f32,
    pub y: f32,
}

impl WorldPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &WorldPoint) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// The tile containing this point.
    pub fn to_tile(&self, tile_size: f32) -> GridPosition {
        GridPosition::new(
            (self.x / tile_size).round() as i32,
            (self.y / tile_size).round() as i32,
        )
    }

    /// Tile coordinates truncated toward zero, as shown in the pointer label.
    pub fn truncated_tile(&self, tile_size: f32) -> GridPosition {
        GridPosition::new((self.x / tile_size) as i32, (self.y / tile_size) as i32)
    }

    /// Centre of a square footprint of `size` tiles whose top-left tile is
    /// `origin`.
    pub fn footprint_center(origin: GridPosition, size: u32, tile_size: f32) -> Self {
        let half = (size as f32 - 1.0) / 2.0;
        Self::new(
            (origin.x as f32 + half) * tile_size,
            (origin.y as f32 + half) * tile_size,
        )
    }
}
