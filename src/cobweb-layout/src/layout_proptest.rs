// Copyright 2026 The Cobweb Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Property-based tests for the layout engine.
//!
//! These check that, for arbitrary small graphs:
//! 1. randomization moves non-pinned nodes by at most half the intensity per
//!    axis and never moves pinned ones
//! 2. box enforcement leaves every node inside and is idempotent
//! 3. an untangle pass never increases the crossing count
//! 4. the grid crossing count agrees with the pairwise scan
//! 5. tree facts never report a depth for a graph with a cycle

use proptest::prelude::*;

use crate::layout::config::LayoutConfig;
use crate::layout::graph::{Edge, Graph, Node, NodeId};
use crate::layout::intersections::{count_crossing_edges, count_crossings, graph_segments};
use crate::layout::tree::TreeFacts;
use crate::layout::{ForceLayout, LayoutEngine};

fn coordinate() -> impl Strategy<Value = f64> {
    prop_oneof![
        Just(0.0),
        (-500i32..500).prop_map(|x| x as f64),
        (-5000i32..5000).prop_map(|x| x as f64 / 10.0),
    ]
}

/// Up to 12 nodes with ids 0..n, random coordinates and pinned flags, and up
/// to 20 edges between them (parallel edges and self loops included).
fn graph_strategy() -> impl Strategy<Value = Graph> {
    (1usize..12)
        .prop_flat_map(|n| {
            (
                prop::collection::vec((coordinate(), coordinate(), any::<bool>()), n),
                prop::collection::vec((0..n as i64, 0..n as i64), 0..20),
            )
        })
        .prop_map(|(nodes, edges)| {
            let nodes = nodes
                .into_iter()
                .enumerate()
                .map(|(i, (x, y, pinned))| {
                    let node = Node::new(i as i64, x, y);
                    if pinned { node.pinned() } else { node }
                })
                .collect();
            let edges = edges.into_iter().map(|(a, b)| Edge::new(a, b)).collect();
            Graph::new(nodes, edges).unwrap()
        })
}

fn small_config(seed: u64) -> LayoutConfig {
    LayoutConfig {
        seed,
        annealing_iterations: 40,
        ..LayoutConfig::default()
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn randomize_is_bounded_and_respects_pins(
        graph in graph_strategy(),
        intensity in -50.0f64..50.0,
        seed in any::<u64>(),
    ) {
        let pinned: Vec<bool> = graph.nodes().iter().map(|n| n.pinned).collect();
        let mut layout = ForceLayout::new(graph, small_config(seed));
        let before = layout.nodes_data();
        layout.randomize_node_positions(Some(intensity));
        let after = layout.nodes_data();

        let half = intensity.abs() / 2.0;
        for ((a, b), pinned) in before.iter().zip(&after).zip(pinned) {
            prop_assert_eq!(a.id, b.id);
            if pinned {
                prop_assert_eq!(a, b);
            } else {
                prop_assert!((a.x - b.x).abs() <= half + 1e-9);
                prop_assert!((a.y - b.y).abs() <= half + 1e-9);
            }
        }
    }

    #[test]
    fn enforced_box_contains_everything(graph in graph_strategy(), size in -400.0f64..400.0) {
        let mut layout = ForceLayout::new(graph, small_config(1));
        let first = layout.inside_box(size, true);
        prop_assert_eq!(first.nodes_inside, layout.graph().node_count());
        prop_assert_eq!(first.edges_inside, layout.graph().edge_count());

        let snapshot = layout.nodes_data();
        let second = layout.inside_box(size, true);
        prop_assert_eq!(second.clamped, 0);
        prop_assert!(second.all_inside());
        prop_assert_eq!(layout.nodes_data(), snapshot);
    }

    #[test]
    fn untangle_never_adds_crossings(graph in graph_strategy(), seed in any::<u64>()) {
        let mut layout = ForceLayout::new(graph, small_config(seed));
        let pinned: Vec<(NodeId, f64, f64)> = layout
            .graph()
            .nodes()
            .iter()
            .filter(|n| n.pinned)
            .map(|n| (n.id, n.position.x, n.position.y))
            .collect();

        let before = layout.count_graph_intersections(true);
        let after = layout.count_graph_intersections(false);
        prop_assert!(after <= before);

        for (id, x, y) in pinned {
            let pos = layout.graph().position(id).unwrap();
            prop_assert_eq!((pos.x, pos.y), (x, y));
        }
    }

    #[test]
    fn grid_agrees_with_pairwise(graph in graph_strategy()) {
        let segments = graph_segments(&graph);
        prop_assert_eq!(count_crossings(&segments, 0), count_crossings(&segments, usize::MAX));
        prop_assert_eq!(
            count_crossing_edges(&segments, 0),
            count_crossing_edges(&segments, usize::MAX)
        );
    }

    #[test]
    fn crossing_edges_bounded_by_pairs(graph in graph_strategy()) {
        let segments = graph_segments(&graph);
        let pairs = count_crossings(&segments, usize::MAX);
        let edges = count_crossing_edges(&segments, usize::MAX);
        prop_assert!(edges <= 2 * pairs);
        prop_assert_eq!(pairs == 0, edges == 0);
    }

    #[test]
    fn cyclic_graphs_have_no_depth(graph in graph_strategy()) {
        let layout = ForceLayout::new(graph, small_config(3));
        let facts = layout.tree_facts();
        if layout.graph().edge_count() >= layout.graph().node_count() {
            // More edges than a spanning tree allows means a cycle.
            prop_assert!(!facts.is_tree());
            prop_assert_eq!(facts.depth(), None);
        }
        if let TreeFacts::Tree(summary) = &facts {
            prop_assert_eq!(summary.node_count, layout.graph().node_count());
            prop_assert_eq!(summary.level_widths.iter().sum::<usize>(), summary.node_count);
        }
    }
}
