// Copyright 2026 The Cobweb Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! JSON interchange for graphs.
//!
//! Nodes carry an integer id and optional label, coordinates and pinned
//! flag; edges reference node ids:
//!
//! ```
//! use cobweb_layout::json::GraphData;
//!
//! let data = GraphData::from_json(
//!     r#"{"nodes": [{"id": 1, "label": "A"}, {"id": 2, "x": 10, "y": 5}],
//!         "edges": [{"from": 1, "to": 2, "label": "A to B"}]}"#,
//! )?;
//! let graph = data.into_graph()?;
//! assert_eq!(graph.edge_count(), 1);
//! # Ok::<(), cobweb_layout::common::Error>(())
//! ```

use serde::{Deserialize, Serialize};

use crate::common::Result;
use crate::layout::graph::{Edge, Graph, Node, NodeId, Position};

fn is_false(val: &bool) -> bool {
    !*val
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    pub id: NodeId,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "is_false", default)]
    pub fixed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeData {
    pub from: NodeId,
    pub to: NodeId,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
    #[serde(default)]
    pub nodes: Vec<NodeData>,
    #[serde(default)]
    pub edges: Vec<EdgeData>,
}

impl From<NodeData> for Node {
    fn from(data: NodeData) -> Self {
        Node {
            id: data.id,
            label: data.label,
            position: Position::new(data.x.unwrap_or(0.0), data.y.unwrap_or(0.0)),
            pinned: data.fixed,
        }
    }
}

impl From<&Node> for NodeData {
    fn from(node: &Node) -> Self {
        NodeData {
            id: node.id,
            label: node.label.clone(),
            x: Some(node.position.x),
            y: Some(node.position.y),
            fixed: node.pinned,
        }
    }
}

impl From<EdgeData> for Edge {
    fn from(data: EdgeData) -> Self {
        Edge {
            from: data.from,
            to: data.to,
            label: data.label,
        }
    }
}

impl From<&Edge> for EdgeData {
    fn from(edge: &Edge) -> Self {
        EdgeData {
            from: edge.from,
            to: edge.to,
            label: edge.label.clone(),
        }
    }
}

impl From<&Graph> for GraphData {
    fn from(graph: &Graph) -> Self {
        GraphData {
            nodes: graph.nodes().iter().map(NodeData::from).collect(),
            edges: graph.edges().iter().map(EdgeData::from).collect(),
        }
    }
}

impl GraphData {
    pub fn from_json(json: &str) -> Result<GraphData> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate and build the graph. Missing coordinates default to the
    /// origin.
    pub fn into_graph(self) -> Result<Graph> {
        Graph::new(
            self.nodes.into_iter().map(Node::from).collect(),
            self.edges.into_iter().map(Edge::from).collect(),
        )
    }
}
