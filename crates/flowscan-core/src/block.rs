//! Structural block kinds and their per-instance configuration.
//!
//! A node's [`BlockKind`] is the only input to adaptor resolution. Kinds
//! carry the configuration that affects connectivity (facing is stored on
//! the node itself): operating mode for stack conveyors, configured links
//! for bridges and mass drivers, and emit/consume flags for crafters.

use crate::geom::GridPosition;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Per-kind configuration
// ---------------------------------------------------------------------------

/// Operating mode of a stack conveyor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StackState {
    /// Idle; only exchanges stacks with neighbouring stack conveyors.
    #[default]
    Standby,
    /// Loading end of a stack line.
    Input,
    /// Unloading end of a stack line.
    Output,
}

/// Configuration of a two-endpoint bridge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Maximum link distance in tiles.
    pub range: u32,
    /// Configured link target, if any. Validity is checked at scan time.
    #[serde(default)]
    pub link: Option<GridPosition>,
    /// Positions of bridges that link into this one.
    #[serde(default)]
    pub incoming: Vec<GridPosition>,
}

impl BridgeConfig {
    pub fn with_range(range: u32) -> Self {
        Self {
            range,
            ..Self::default()
        }
    }
}

/// Which commodities a crafter emits and consumes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrafterConfig {
    #[serde(default)]
    pub outputs_items: bool,
    #[serde(default)]
    pub outputs_liquids: bool,
    /// True when at least one item filter slot is active.
    #[serde(default)]
    pub consumes_items: bool,
    /// True when at least one liquid filter slot is active.
    #[serde(default)]
    pub consumes_liquids: bool,
}

// ---------------------------------------------------------------------------
// Block kinds
// ---------------------------------------------------------------------------

/// The structural type of a placed node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockKind {
    Conveyor {
        #[serde(default)]
        armored: bool,
    },
    Duct {
        #[serde(default)]
        armored: bool,
    },
    StackConveyor {
        #[serde(default)]
        state: StackState,
        #[serde(default)]
        output_router: bool,
    },
    Router,
    Sorter,
    OverflowGate,
    DuctRouter,
    OverflowDuct,
    Unloader,
    DirectionalUnloader,
    ItemBridge(BridgeConfig),
    LiquidBridge(BridgeConfig),
    DuctBridge {
        range: u32,
    },
    DirectionLiquidBridge {
        range: u32,
    },
    Junction,
    DuctJunction,
    LiquidJunction,
    MassDriver {
        range: u32,
        #[serde(default)]
        link: Option<GridPosition>,
    },
    Conduit,
    LiquidRouter,
    Pump,
    LiquidSource,
    ItemSource,
    Crafter(CrafterConfig),
    Storage,
    /// Anything the scan does not model (walls, turrets, ...).
    Other {
        name: String,
    },
}

impl BlockKind {
    /// Whether `other` is the same block, the way link targets are matched.
    /// Configuration (links, modes) is ignored.
    pub fn same_block(&self, other: &BlockKind) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    /// Members of the duct family, accepted by armored ducts from the side.
    pub fn is_duct(&self) -> bool {
        matches!(
            self,
            BlockKind::Duct { .. }
                | BlockKind::DuctRouter
                | BlockKind::OverflowDuct
                | BlockKind::DuctBridge { .. }
                | BlockKind::DuctJunction
        )
    }

    pub fn is_conveyor(&self) -> bool {
        matches!(self, BlockKind::Conveyor { .. })
    }

    pub fn is_stack_conveyor(&self) -> bool {
        matches!(self, BlockKind::StackConveyor { .. })
    }

    /// Whether unloaders can pull from this block by default.
    pub fn default_unloadable(&self) -> bool {
        matches!(self, BlockKind::Storage | BlockKind::Crafter(_))
    }

    /// Whether this kind can hold a configured point-to-point link.
    pub fn is_linkable(&self) -> bool {
        matches!(
            self,
            BlockKind::ItemBridge(_) | BlockKind::LiquidBridge(_) | BlockKind::MassDriver { .. }
        )
    }
}
