//! Renderer-facing glue.
//!
//! The scan hands resolved edges and markers to an [`EdgeSink`] as plain
//! geometry plus a colour. Line widths, arrow heads and the like belong to
//! the sink.

use crate::config::ScanConfig;
use crate::geom::WorldPoint;
use crate::id::NodeId;
use crate::scan::{PointerReadout, ScanReport};
use crate::world::World;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Colour
// ---------------------------------------------------------------------------

/// Errors parsing a hex colour.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColorError {
    #[error("expected 6 or 8 hex digits, got '{0}'")]
    Length(String),
    #[error("invalid hex digits in '{0}'")]
    Digits(String),
}

/// An RGBA colour, serialized as `rrggbb` or `rrggbbaa` hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn from_hex(hex: &str) -> Result<Self, ColorError> {
        let digits = hex.trim_start_matches('#');
        if digits.len() != 6 && digits.len() != 8 {
            return Err(ColorError::Length(hex.to_string()));
        }
        let byte = |i: usize| {
            digits
                .get(i..i + 2)
                .and_then(|s| u8::from_str_radix(s, 16).ok())
                .ok_or_else(|| ColorError::Digits(hex.to_string()))
        };
        Ok(Self {
            r: byte(0)?,
            g: byte(2)?,
            b: byte(4)?,
            a: if digits.len() == 8 { byte(6)? } else { 255 },
        })
    }

    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl TryFrom<String> for Color {
    type Error = ColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::from_hex(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

// ---------------------------------------------------------------------------
// Sink
// ---------------------------------------------------------------------------

/// Drawing collaborator.
pub trait EdgeSink {
    /// A directed connection. `alpha` is the pulse factor for this frame.
    fn draw_edge(&mut self, from: WorldPoint, to: WorldPoint, color: Color, alpha: f32);

    /// Highlight a node footprint (focal node, path terminals).
    fn draw_marker(&mut self, center: WorldPoint, half_extent: f32, color: Color);

    /// Pointer coordinate / distance label. Optional.
    fn draw_readout(&mut self, _at: WorldPoint, _readout: &PointerReadout) {}
}

/// Draw a scan report: readout, focal marker, then every pass's edges and
/// terminal markers in the pass colour.
pub fn draw_report(
    world: &dyn World,
    report: &ScanReport,
    config: &ScanConfig,
    time: f32,
    sink: &mut dyn EdgeSink,
) {
    sink.draw_readout(report.pointer, &report.readout);
    let Some(focal) = report.focal else {
        return;
    };
    draw_node_marker(world, focal, config.colors.accent, sink);

    let alpha = config.pulse.alpha(time);
    for pass in &report.passes {
        let color = config.colors.for_pass(pass.direction, pass.commodity);
        for edge in &pass.edges {
            if let (Some(from), Some(to)) = (world.center(edge.from), world.center(edge.to)) {
                sink.draw_edge(from, to, color, alpha);
            }
        }
        for endpoint in &pass.endpoints {
            draw_node_marker(world, *endpoint, color, sink);
        }
    }
}

fn draw_node_marker(world: &dyn World, id: NodeId, color: Color, sink: &mut dyn EdgeSink) {
    let (Some(center), Some(node)) = (world.center(id), world.node(id)) else {
        return;
    };
    sink.draw_marker(center, node.size as f32 * world.tile_size() / 2.0, color);
}
