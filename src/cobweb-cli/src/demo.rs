// Copyright 2026 The Cobweb Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use cobweb_layout::{EdgeData, GraphData, NodeData, NodeId};

/// Five-node star: A at the centre, B through E at the corners of a
/// 400x400 square, with an edge from A to each corner.
pub fn star() -> GraphData {
    let corners = [("B", 0.0, 0.0), ("C", 0.0, 400.0), ("D", 400.0, 400.0), ("E", 400.0, 0.0)];

    let mut nodes = vec![node(1, "A", 200.0, 200.0)];
    let mut edges = Vec::with_capacity(corners.len());
    for (i, (label, x, y)) in corners.into_iter().enumerate() {
        let id = i as i64 + 2;
        nodes.push(node(id, label, x, y));
        edges.push(EdgeData {
            from: NodeId(1),
            to: NodeId(id),
            label: Some(format!("A to {label}")),
        });
    }

    GraphData { nodes, edges }
}

fn node(id: i64, label: &str, x: f64, y: f64) -> NodeData {
    NodeData {
        id: NodeId(id),
        label: Some(label.to_owned()),
        x: Some(x),
        y: Some(y),
        fixed: false,
    }
}
