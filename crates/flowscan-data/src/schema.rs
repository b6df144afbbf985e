//! Serde data file structs for world layouts.
//!
//! A layout names every block so links can refer to them. Layouts are
//! deserialized from RON, JSON, or TOML and then built into a
//! [`GridWorld`](flowscan_core::grid::GridWorld) by the loader.

use flowscan_core::block::BlockKind;
use flowscan_core::geom::{Direction, GridPosition};
use flowscan_core::world::DEFAULT_TILE_SIZE;
use serde::{Deserialize, Serialize};

// ===========================================================================
// Layout
// ===========================================================================

/// A whole layout file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutFile {
    #[serde(default = "default_tile_size")]
    pub tile_size: f32,
    /// Enables fog-of-war; foreign blocks then need a `reveal` entry.
    #[serde(default)]
    pub fog: bool,
    #[serde(default)]
    pub blocks: Vec<BlockEntry>,
    #[serde(default)]
    pub links: Vec<LinkEntry>,
    #[serde(default)]
    pub reveal: Vec<RevealEntry>,
}

fn default_tile_size() -> f32 {
    DEFAULT_TILE_SIZE
}

impl Default for LayoutFile {
    fn default() -> Self {
        Self {
            tile_size: DEFAULT_TILE_SIZE,
            fog: false,
            blocks: Vec::new(),
            links: Vec::new(),
            reveal: Vec::new(),
        }
    }
}

// ===========================================================================
// Entries
// ===========================================================================

/// One placed block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockEntry {
    pub name: String,
    pub kind: BlockKind,
    pub x: i32,
    pub y: i32,
    #[serde(default = "default_size")]
    pub size: u32,
    #[serde(default)]
    pub rotation: Direction,
    #[serde(default)]
    pub team: u8,
    /// Overrides the kind's default unloadability.
    #[serde(default)]
    pub unloadable: Option<bool>,
}

fn default_size() -> u32 {
    1
}

/// A bridge or mass-driver link between two named blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkEntry {
    pub from: String,
    pub to: String,
}

/// Tiles revealed to a team, as an inclusive rectangle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealEntry {
    pub team: u8,
    pub min: GridPosition,
    pub max: GridPosition,
}
