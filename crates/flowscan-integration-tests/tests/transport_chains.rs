//! Integration test: scans over layouts loaded from text.
//!
//! Each scenario is written as a RON layout, built through `flowscan-data`,
//! and scanned from a named block. Edges are compared by block name.

use flowscan_core::traversal::{Commodity, FlowDirection, PassResult, run_pass};
use flowscan_data::{Format, LoadedLayout, build_world, parse_layout_str};

fn load(ron: &str) -> LoadedLayout {
    let layout = parse_layout_str(ron, Format::Ron).expect("layout parses");
    build_world(&layout).expect("layout builds")
}

fn pass(layout: &LoadedLayout, focal: &str, direction: FlowDirection, commodity: Commodity) -> PassResult {
    run_pass(&layout.world, layout.id(focal).unwrap(), direction, commodity)
}

fn named_edges(layout: &LoadedLayout, pass: &PassResult) -> Vec<(String, String)> {
    let name_of = |id| {
        layout
            .names
            .iter()
            .find(|(_, v)| **v == id)
            .map(|(k, _)| k.clone())
            .unwrap()
    };
    let mut edges: Vec<_> = pass
        .edges
        .iter()
        .map(|e| (name_of(e.from), name_of(e.to)))
        .collect();
    edges.sort();
    edges
}

fn pair(a: &str, b: &str) -> (String, String) {
    (a.to_string(), b.to_string())
}

#[test]
fn belt_line_into_crafter_both_directions() {
    let layout = load(
        r#"(
            blocks: [
                (name: "a", kind: Conveyor(armored: false), x: 0, y: 0, rotation: East),
                (name: "b", kind: Conveyor(armored: false), x: 1, y: 0, rotation: East),
                (name: "c", kind: Crafter((outputs_items: true, consumes_items: true)), x: 2, y: 0),
            ],
        )"#,
    );

    let out = pass(&layout, "a", FlowDirection::Outbound, Commodity::Item);
    assert_eq!(named_edges(&layout, &out), vec![pair("a", "b"), pair("b", "c")]);
    assert_eq!(out.endpoints, vec![layout.id("c").unwrap()]);

    let back = pass(&layout, "c", FlowDirection::Inbound, Commodity::Item);
    assert_eq!(named_edges(&layout, &back), vec![pair("a", "b"), pair("b", "c")]);

    for direction in FlowDirection::all() {
        let liquid = pass(&layout, "a", direction, Commodity::Liquid);
        assert!(liquid.edges.is_empty());
    }
}

#[test]
fn junction_is_transparent() {
    let layout = load(
        r#"(
            blocks: [
                (name: "a", kind: Conveyor(armored: false), x: 0, y: 0, rotation: East),
                (name: "j", kind: Junction, x: 1, y: 0),
                (name: "c", kind: Conveyor(armored: false), x: 2, y: 0, rotation: East),
                (name: "cross", kind: Conveyor(armored: false), x: 1, y: 1, rotation: North),
                (name: "top", kind: Conveyor(armored: false), x: 1, y: -1, rotation: North),
            ],
        )"#,
    );

    let out = pass(&layout, "a", FlowDirection::Outbound, Commodity::Item);
    assert_eq!(named_edges(&layout, &out), vec![pair("a", "c")]);
    assert!(out.visited.contains(&layout.id("j").unwrap()));

    // The crossing belt passes straight through the same junction.
    let cross = pass(&layout, "cross", FlowDirection::Outbound, Commodity::Item);
    assert_eq!(named_edges(&layout, &cross), vec![pair("cross", "top")]);

    let back = pass(&layout, "c", FlowDirection::Inbound, Commodity::Item);
    assert_eq!(named_edges(&layout, &back), vec![pair("a", "c")]);
}

#[test]
fn junction_chain_resolves_through() {
    let layout = load(
        r#"(
            blocks: [
                (name: "a", kind: Conveyor(armored: false), x: 0, y: 0, rotation: East),
                (name: "j1", kind: Junction, x: 1, y: 0),
                (name: "j2", kind: DuctJunction, x: 2, y: 0),
                (name: "r", kind: Router, x: 3, y: 0),
            ],
        )"#,
    );
    let out = pass(&layout, "a", FlowDirection::Outbound, Commodity::Item);
    assert_eq!(named_edges(&layout, &out), vec![pair("a", "r")]);
}

#[test]
fn item_bridge_carries_across_gap() {
    let layout = load(
        r#"(
            blocks: [
                (name: "feed", kind: Conveyor(armored: false), x: -1, y: 0, rotation: East),
                (name: "in", kind: ItemBridge((range: 4)), x: 0, y: 0),
                (name: "wall", kind: Other(name: "copper-wall"), x: 1, y: 0),
                (name: "out", kind: ItemBridge((range: 4)), x: 3, y: 0),
                (name: "belt", kind: Conveyor(armored: false), x: 4, y: 0, rotation: East),
            ],
            links: [(from: "in", to: "out")],
        )"#,
    );

    let out = pass(&layout, "feed", FlowDirection::Outbound, Commodity::Item);
    assert_eq!(
        named_edges(&layout, &out),
        vec![pair("feed", "in"), pair("in", "out"), pair("out", "belt")]
    );

    let back = pass(&layout, "belt", FlowDirection::Inbound, Commodity::Item);
    assert_eq!(
        named_edges(&layout, &back),
        vec![pair("feed", "in"), pair("in", "out"), pair("out", "belt")]
    );
}

#[test]
fn junction_into_bridge_draws_each_bridge_hop() {
    let layout = load(
        r#"(
            blocks: [
                (name: "feed", kind: Conveyor(armored: false), x: -2, y: 0, rotation: East),
                (name: "j", kind: Junction, x: -1, y: 0),
                (name: "in", kind: ItemBridge((range: 4)), x: 0, y: 0),
                (name: "wall", kind: Other(name: "copper-wall"), x: 1, y: 0),
                (name: "out", kind: ItemBridge((range: 4)), x: 3, y: 0),
                (name: "belt", kind: Conveyor(armored: false), x: 4, y: 0, rotation: East),
            ],
            links: [(from: "in", to: "out")],
        )"#,
    );
    let hops = vec![pair("feed", "in"), pair("in", "out"), pair("out", "belt")];

    // The junction is skipped; both bridge ends stay drawn.
    let out = pass(&layout, "feed", FlowDirection::Outbound, Commodity::Item);
    assert_eq!(named_edges(&layout, &out), hops);
    assert!(out.visited.contains(&layout.id("j").unwrap()));
    assert!(!out.touches(layout.id("j").unwrap()));
    assert!(out.endpoints.is_empty());

    let back = pass(&layout, "belt", FlowDirection::Inbound, Commodity::Item);
    assert_eq!(named_edges(&layout, &back), hops);
}

#[test]
fn out_of_range_bridge_dumps_locally() {
    let layout = load(
        r#"(
            blocks: [
                (name: "in", kind: ItemBridge((range: 2)), x: 0, y: 0),
                (name: "side", kind: Conveyor(armored: false), x: 0, y: 1, rotation: South),
                (name: "out", kind: ItemBridge((range: 2)), x: 5, y: 0),
            ],
            links: [(from: "in", to: "out")],
        )"#,
    );
    let out = pass(&layout, "in", FlowDirection::Outbound, Commodity::Item);
    assert_eq!(named_edges(&layout, &out), vec![pair("in", "side")]);
}

#[test]
fn mass_driver_link() {
    let layout = load(
        r#"(
            blocks: [
                (name: "feed", kind: Conveyor(armored: false), x: -1, y: 1, rotation: East),
                (name: "d1", kind: MassDriver(range: 20), x: 0, y: 0, size: 3),
                (name: "d2", kind: MassDriver(range: 20), x: 10, y: 0, size: 3),
                (name: "belt", kind: Conveyor(armored: false), x: 13, y: 1, rotation: East),
            ],
            links: [(from: "d1", to: "d2")],
        )"#,
    );
    let out = pass(&layout, "feed", FlowDirection::Outbound, Commodity::Item);
    assert_eq!(
        named_edges(&layout, &out),
        vec![pair("d1", "d2"), pair("d2", "belt"), pair("feed", "d1")]
    );
}

#[test]
fn liquid_network_is_isolated_from_items() {
    let layout = load(
        r#"(
            blocks: [
                (name: "pump", kind: Pump, x: 0, y: 0),
                (name: "p1", kind: Conduit, x: 1, y: 0, rotation: East),
                (name: "lj", kind: LiquidJunction, x: 2, y: 0),
                (name: "p2", kind: Conduit, x: 3, y: 0, rotation: East),
                (name: "tank", kind: Crafter((consumes_liquids: true)), x: 4, y: 0),
                (name: "belt", kind: Conveyor(armored: false), x: 0, y: 1, rotation: East),
            ],
        )"#,
    );

    let liquid = pass(&layout, "pump", FlowDirection::Outbound, Commodity::Liquid);
    assert_eq!(
        named_edges(&layout, &liquid),
        vec![pair("p1", "p2"), pair("p2", "tank"), pair("pump", "p1")]
    );

    let items = pass(&layout, "pump", FlowDirection::Outbound, Commodity::Item);
    assert!(items.edges.is_empty());

    let back = pass(&layout, "tank", FlowDirection::Inbound, Commodity::Liquid);
    assert_eq!(named_edges(&layout, &back), named_edges(&layout, &liquid));
}

#[test]
fn ring_terminates() {
    let layout = load(
        r#"(
            blocks: [
                (name: "n", kind: Conveyor(armored: false), x: 0, y: 0, rotation: East),
                (name: "e", kind: Conveyor(armored: false), x: 1, y: 0, rotation: South),
                (name: "s", kind: Conveyor(armored: false), x: 1, y: 1, rotation: West),
                (name: "w", kind: Conveyor(armored: false), x: 0, y: 1, rotation: North),
            ],
        )"#,
    );
    for direction in FlowDirection::all() {
        let result = pass(&layout, "n", direction, Commodity::Item);
        assert_eq!(result.edges.len(), 4);
        assert_eq!(result.visited.len(), 4);
    }
}
