// Copyright 2026 The Cobweb Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::collections::HashMap;
use std::fmt;
use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::common::Result;
use crate::{graph_err, unknown_node_err};

/// 2D position/vector used throughout the layout pipeline.
#[derive(Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// 2D cross product: z-component of the 3D cross product.
    pub fn cross_2d(self, other: Self) -> f64 {
        self.x * other.y - self.y * other.x
    }

    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    pub fn length(self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn distance(self, other: Self) -> f64 {
        (other - self).length()
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Position {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl Sub for Position {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl Mul<f64> for Position {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        Self {
            x: self.x * rhs,
            y: self.y * rhs,
        }
    }
}

/// Identity of a node, stable for the lifetime of a layout session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub i64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for NodeId {
    fn from(id: i64) -> Self {
        NodeId(id)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub label: Option<String>,
    pub position: Position,
    /// Pinned nodes are never moved by randomization, force steps or
    /// crossing reduction.
    pub pinned: bool,
}

impl Node {
    pub fn new(id: impl Into<NodeId>, x: f64, y: f64) -> Self {
        Self {
            id: id.into(),
            label: None,
            position: Position::new(x, y),
            pinned: false,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn pinned(mut self) -> Self {
        self.pinned = true;
        self
    }
}

/// A directed edge. Parallel edges and self loops are allowed.
#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
    pub label: Option<String>,
}

impl Edge {
    pub fn new(from: impl Into<NodeId>, to: impl Into<NodeId>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn is_self_loop(&self) -> bool {
        self.from == self.to
    }
}

/// The per-node record handed to renderers every frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodePosition {
    pub id: NodeId,
    pub x: f64,
    pub y: f64,
}

type EdgeList = SmallVec<[usize; 4]>;

/// Directed multigraph with positioned nodes. Nodes keep construction order;
/// edge endpoints are resolved to node slots once, at construction.
#[derive(Clone, Debug)]
pub struct Graph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    slots: HashMap<NodeId, usize>,
    /// (from slot, to slot) per edge, parallel to `edges`.
    endpoints: Vec<(usize, usize)>,
    outgoing: Vec<EdgeList>,
    incoming: Vec<EdgeList>,
}

impl Graph {
    /// Build a graph, rejecting duplicate ids, dangling edge endpoints and
    /// non-finite coordinates.
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Result<Graph> {
        let mut slots = HashMap::with_capacity(nodes.len());
        for (slot, node) in nodes.iter().enumerate() {
            if !node.position.is_finite() {
                return graph_err!(
                    NonFiniteCoordinate,
                    format!("node {} at {:?}", node.id, node.position)
                );
            }
            if slots.insert(node.id, slot).is_some() {
                return graph_err!(DuplicateNode, format!("node {}", node.id));
            }
        }

        let mut endpoints = Vec::with_capacity(edges.len());
        let mut outgoing: Vec<EdgeList> = vec![EdgeList::new(); nodes.len()];
        let mut incoming: Vec<EdgeList> = vec![EdgeList::new(); nodes.len()];

        for (i, edge) in edges.iter().enumerate() {
            let Some(&from) = slots.get(&edge.from) else {
                return graph_err!(
                    DanglingEdge,
                    format!("edge {} references node {}", i, edge.from)
                );
            };
            let Some(&to) = slots.get(&edge.to) else {
                return graph_err!(
                    DanglingEdge,
                    format!("edge {} references node {}", i, edge.to)
                );
            };
            endpoints.push((from, to));
            outgoing[from].push(i);
            incoming[to].push(i);
        }

        Ok(Graph {
            nodes,
            edges,
            slots,
            endpoints,
            outgoing,
            incoming,
        })
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.slots.get(&id).map(|&slot| &self.nodes[slot])
    }

    pub fn position(&self, id: NodeId) -> Option<Position> {
        self.node(id).map(|n| n.position)
    }

    /// Snapshot of every node's position, in construction order.
    pub fn positions_snapshot(&self) -> Vec<NodePosition> {
        self.nodes
            .iter()
            .map(|n| NodePosition {
                id: n.id,
                x: n.position.x,
                y: n.position.y,
            })
            .collect()
    }

    pub fn update_position(&mut self, id: NodeId, x: f64, y: f64) -> Result<()> {
        let Some(&slot) = self.slots.get(&id) else {
            return unknown_node_err!(id);
        };
        if !x.is_finite() || !y.is_finite() {
            return graph_err!(NonFiniteCoordinate, format!("node {id} to ({x}, {y})"));
        }
        self.nodes[slot].position = Position::new(x, y);
        Ok(())
    }

    pub fn set_pinned(&mut self, id: NodeId, pinned: bool) -> Result<()> {
        let Some(&slot) = self.slots.get(&id) else {
            return unknown_node_err!(id);
        };
        self.nodes[slot].pinned = pinned;
        Ok(())
    }

    pub fn out_degree(&self, id: NodeId) -> usize {
        self.slots.get(&id).map_or(0, |&s| self.outgoing[s].len())
    }

    pub fn in_degree(&self, id: NodeId) -> usize {
        self.slots.get(&id).map_or(0, |&s| self.incoming[s].len())
    }

    /// Undirected degree; a self loop contributes two.
    pub fn degree(&self, id: NodeId) -> usize {
        self.out_degree(id) + self.in_degree(id)
    }

    /// Undirected neighbors, one entry per incident edge (so parallel edges
    /// repeat a neighbor).
    pub fn neighbors(&self, id: NodeId) -> Option<impl Iterator<Item = NodeId> + '_> {
        let slot = *self.slots.get(&id)?;
        let out = self.outgoing[slot]
            .iter()
            .map(|&e| self.nodes[self.endpoints[e].1].id);
        let inc = self.incoming[slot]
            .iter()
            .map(|&e| self.nodes[self.endpoints[e].0].id);
        Some(out.chain(inc))
    }

    /// Current segment of edge `idx` as (start, end) positions.
    pub fn edge_segment(&self, idx: usize) -> Option<(Position, Position)> {
        let &(from, to) = self.endpoints.get(idx)?;
        Some((self.nodes[from].position, self.nodes[to].position))
    }

    pub(crate) fn endpoint_slots(&self) -> &[(usize, usize)] {
        &self.endpoints
    }

    pub(crate) fn outgoing_edges(&self, slot: usize) -> &[usize] {
        &self.outgoing[slot]
    }

    pub(crate) fn incoming_edges(&self, slot: usize) -> &[usize] {
        &self.incoming[slot]
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{ErrorCode, ErrorKind};

    fn star() -> Graph {
        let nodes = vec![
            Node::new(1, 200.0, 200.0).with_label("A"),
            Node::new(2, 0.0, 0.0).with_label("B"),
            Node::new(3, 0.0, 400.0).with_label("C"),
            Node::new(4, 400.0, 400.0).with_label("D"),
            Node::new(5, 400.0, 0.0).with_label("E"),
        ];
        let edges = (2..=5)
            .map(|to| Edge::new(1, to).with_label(format!("A to {to}")))
            .collect();
        Graph::new(nodes, edges).unwrap()
    }

    #[test]
    fn test_position_add_sub_mul() {
        let a = Position::new(1.0, 2.0);
        let b = Position::new(3.0, 4.0);
        let sum = a + b;
        assert!((sum.x - 4.0).abs() < f64::EPSILON);
        assert!((sum.y - 6.0).abs() < f64::EPSILON);
        let diff = b - a;
        assert!((diff.x - 2.0).abs() < f64::EPSILON);
        assert!((diff.y - 2.0).abs() < f64::EPSILON);
        let scaled = a * 2.0;
        assert!((scaled.y - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_position_cross_2d_dot_length() {
        let a = Position::new(1.0, 0.0);
        let b = Position::new(0.0, 1.0);
        assert!((a.cross_2d(b) - 1.0).abs() < f64::EPSILON);
        assert!((b.cross_2d(a) - (-1.0)).abs() < f64::EPSILON);
        assert!(a.dot(b).abs() < f64::EPSILON);
        let c = Position::new(3.0, 4.0);
        assert!((c.length() - 5.0).abs() < f64::EPSILON);
        assert!((Position::default().distance(c) - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_construct_star() {
        let graph = star();
        assert_eq!(graph.node_count(), 5);
        assert_eq!(graph.edge_count(), 4);
        assert_eq!(graph.out_degree(NodeId(1)), 4);
        assert_eq!(graph.in_degree(NodeId(1)), 0);
        assert_eq!(graph.degree(NodeId(3)), 1);
        assert_eq!(graph.node(NodeId(2)).unwrap().label.as_deref(), Some("B"));

        let mut neighbors: Vec<NodeId> = graph.neighbors(NodeId(1)).unwrap().collect();
        neighbors.sort();
        assert_eq!(neighbors, vec![NodeId(2), NodeId(3), NodeId(4), NodeId(5)]);
        assert!(graph.neighbors(NodeId(42)).is_none());
    }

    #[test]
    fn test_construct_rejects_dangling_edge() {
        let err = Graph::new(vec![Node::new(1, 0.0, 0.0)], vec![Edge::new(1, 9)]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidGraph);
        assert_eq!(err.code, ErrorCode::DanglingEdge);
    }

    #[test]
    fn test_construct_rejects_duplicate_ids() {
        let err = Graph::new(
            vec![Node::new(1, 0.0, 0.0), Node::new(1, 5.0, 5.0)],
            vec![],
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidGraph);
        assert_eq!(err.code, ErrorCode::DuplicateNode);
    }

    #[test]
    fn test_construct_rejects_non_finite() {
        let err = Graph::new(vec![Node::new(1, f64::NAN, 0.0)], vec![]).unwrap_err();
        assert_eq!(err.code, ErrorCode::NonFiniteCoordinate);
    }

    #[test]
    fn test_multigraph_and_self_loop_allowed() {
        let graph = Graph::new(
            vec![Node::new(1, 0.0, 0.0), Node::new(2, 1.0, 0.0)],
            vec![Edge::new(1, 2), Edge::new(1, 2), Edge::new(2, 2)],
        )
        .unwrap();
        assert_eq!(graph.edge_count(), 3);
        assert!(graph.edges()[2].is_self_loop());
        assert_eq!(graph.degree(NodeId(2)), 4);
    }

    #[test]
    fn test_snapshot_in_construction_order() {
        let graph = star();
        let ids: Vec<i64> = graph.positions_snapshot().iter().map(|p| p.id.0).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        let c = graph.positions_snapshot()[2];
        assert!((c.x - 0.0).abs() < f64::EPSILON);
        assert!((c.y - 400.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_update_position() {
        let mut graph = star();
        graph.update_position(NodeId(3), 7.0, -7.0).unwrap();
        assert_eq!(graph.position(NodeId(3)), Some(Position::new(7.0, -7.0)));

        let (start, end) = graph.edge_segment(1).unwrap();
        assert_eq!(start, Position::new(200.0, 200.0));
        assert_eq!(end, Position::new(7.0, -7.0));

        let err = graph.update_position(NodeId(99), 0.0, 0.0).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnknownNode);

        let err = graph.update_position(NodeId(3), f64::INFINITY, 0.0).unwrap_err();
        assert_eq!(err.code, ErrorCode::NonFiniteCoordinate);
        assert_eq!(graph.position(NodeId(3)), Some(Position::new(7.0, -7.0)));
    }

    #[test]
    fn test_set_pinned() {
        let mut graph = star();
        graph.set_pinned(NodeId(1), true).unwrap();
        assert!(graph.node(NodeId(1)).unwrap().pinned);
        assert!(graph.set_pinned(NodeId(0), true).is_err());
    }
}
