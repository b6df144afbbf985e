//! Belt overlay example: a short production line scanned from its middle.
//!
//! Builds an item source feeding a belt that crosses a junction and ends in
//! a crafter, then runs one frame with the pointer on the belt and prints
//! every draw call.
//!
//! Run with: `cargo run -p flowscan-core --example belt_overlay`

use flowscan_core::block::{BlockKind, CrafterConfig};
use flowscan_core::geom::{Direction, GridPosition, WorldPoint};
use flowscan_core::grid::{GridError, GridWorld};
use flowscan_core::id::TeamId;
use flowscan_core::render::{Color, EdgeSink};
use flowscan_core::scan::{FrameInput, PointerReadout, TransportScan};

/// Prints draw calls instead of rendering them.
struct PrintSink;

impl EdgeSink for PrintSink {
    fn draw_edge(&mut self, from: WorldPoint, to: WorldPoint, color: Color, alpha: f32) {
        println!(
            "  edge  ({:>5.1},{:>5.1}) -> ({:>5.1},{:>5.1})  #{}  alpha {alpha:.2}",
            from.x,
            from.y,
            to.x,
            to.y,
            color.to_hex()
        );
    }

    fn draw_marker(&mut self, center: WorldPoint, half_extent: f32, color: Color) {
        println!(
            "  mark  ({:>5.1},{:>5.1})  r={half_extent}  #{}",
            center.x,
            center.y,
            color.to_hex()
        );
    }

    fn draw_readout(&mut self, _at: WorldPoint, readout: &PointerReadout) {
        match readout.distance_tiles {
            Some(d) => println!("  text  {},{}  distance {d}", readout.tile.x, readout.tile.y),
            None => println!("  text  {},{}", readout.tile.x, readout.tile.y),
        }
    }
}

fn build_line() -> Result<GridWorld, GridError> {
    let mut world = GridWorld::new();
    let team = TeamId(0);
    let belt = BlockKind::Conveyor { armored: false };

    world.place(BlockKind::ItemSource, GridPosition::new(0, 0), 1, Direction::East, team)?;
    for x in 1..=3 {
        world.place(belt.clone(), GridPosition::new(x, 0), 1, Direction::East, team)?;
    }
    world.place(BlockKind::Junction, GridPosition::new(4, 0), 1, Direction::East, team)?;
    world.place(belt, GridPosition::new(5, 0), 1, Direction::East, team)?;
    world.place(
        BlockKind::Crafter(CrafterConfig {
            outputs_items: true,
            consumes_items: true,
            ..CrafterConfig::default()
        }),
        GridPosition::new(6, 0),
        2,
        Direction::East,
        team,
    )?;
    Ok(world)
}

fn main() -> Result<(), GridError> {
    let world = build_line()?;
    let scan = TransportScan::default();

    let frame = FrameInput {
        pointer: WorldPoint::new(16.0, 0.0),
        observer: TeamId(0),
        observer_position: Some(WorldPoint::new(0.0, 40.0)),
        time: 3.0,
    };

    println!("Frame at t={}:", frame.time);
    let report = scan.on_frame(&world, &frame, &mut PrintSink);
    for pass in &report.passes {
        println!(
            "{:?} {:?}: {} edges, {} endpoints, {} nodes visited",
            pass.direction,
            pass.commodity,
            pass.edges.len(),
            pass.endpoints.len(),
            pass.visited.len()
        );
    }
    Ok(())
}
