// Copyright 2026 The Cobweb Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use serde::Serialize;

use super::graph::{Graph, NodeId, Position};

/// Result of checking the graph against an origin-centred square.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BoxReport {
    pub nodes_inside: usize,
    /// Edges with both endpoints inside.
    pub edges_inside: usize,
    /// Nodes that were outside before any clamping, in construction order.
    pub outside: Vec<NodeId>,
    pub clamped: usize,
}

impl BoxReport {
    pub fn all_inside(&self) -> bool {
        self.outside.is_empty()
    }
}

fn contains(half: f64, p: Position) -> bool {
    p.x.abs() <= half && p.y.abs() <= half
}

/// Count nodes and edges inside the square `[-|size|, |size|]^2` and, when
/// `enforce` is set, clamp every node outside onto its boundary. Pinned
/// nodes are clamped as well. A non-finite `size` only reports.
///
/// Counts are taken after clamping, so an enforced call reports every node
/// inside.
pub fn inside_box(graph: &mut Graph, size: f64, enforce: bool) -> BoxReport {
    let half = size.abs();
    let enforce = enforce && half.is_finite();

    let mut report = BoxReport::default();
    for node in graph.nodes_mut() {
        if contains(half, node.position) {
            continue;
        }
        report.outside.push(node.id);
        if enforce {
            node.position = Position::new(
                node.position.x.clamp(-half, half),
                node.position.y.clamp(-half, half),
            );
            report.clamped += 1;
        }
    }

    let inside: Vec<bool> = graph
        .nodes()
        .iter()
        .map(|n| contains(half, n.position))
        .collect();
    report.nodes_inside = inside.iter().filter(|&&b| b).count();
    report.edges_inside = graph
        .endpoint_slots()
        .iter()
        .filter(|&&(from, to)| inside[from] && inside[to])
        .count();
    report
}
