use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    /// Identifies a placed node (building) in the world grid.
    ///
    /// Handles are non-owning: the world owns the node, and a handle is only
    /// meaningful for the frame in which it was looked up.
    pub struct NodeId;
}

/// Identifies a team. Used both as node owner and as scan observer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TeamId(pub u8);
