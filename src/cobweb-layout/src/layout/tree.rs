// Copyright 2026 The Cobweb Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Structural analytics for graphs that are (or should be) rooted trees.

use std::collections::VecDeque;

use serde::Serialize;

use super::graph::{Graph, NodeId};

/// Shape of a rooted directed tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TreeSummary {
    pub root: NodeId,
    /// Longest root-to-leaf path, in edges. A single node has depth 0.
    pub depth: usize,
    /// Largest number of children of any node.
    pub max_branching: usize,
    pub leaves: usize,
    /// Number of nodes at each depth, starting with the root level.
    pub level_widths: Vec<usize>,
    pub node_count: usize,
}

/// Why a graph isn't a rooted tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "nodes", rename_all = "snake_case")]
pub enum NotATree {
    Empty,
    SelfLoop(NodeId),
    /// Nodes along one undirected cycle (parallel edges count as a cycle of
    /// two nodes).
    Cycle(Vec<NodeId>),
    Disconnected { components: usize },
    /// Acyclic and connected, but edge directions don't hang from a single
    /// root.
    MultipleRoots(Vec<NodeId>),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeFacts {
    Tree(TreeSummary),
    NotATree(NotATree),
}

impl TreeFacts {
    pub fn is_tree(&self) -> bool {
        matches!(self, TreeFacts::Tree(_))
    }

    pub fn depth(&self) -> Option<usize> {
        match self {
            TreeFacts::Tree(summary) => Some(summary.depth),
            TreeFacts::NotATree(_) => None,
        }
    }

    pub fn root(&self) -> Option<NodeId> {
        match self {
            TreeFacts::Tree(summary) => Some(summary.root),
            TreeFacts::NotATree(_) => None,
        }
    }
}

/// Test whether `graph` is a rooted directed tree (every node but the root
/// has exactly one parent, every node reachable from the root) and, if so,
/// measure it. Runs in O(n + e).
pub fn tree_facts(graph: &Graph) -> TreeFacts {
    let n = graph.node_count();
    if n == 0 {
        return TreeFacts::NotATree(NotATree::Empty);
    }

    if let Some(edge) = graph.edges().iter().find(|e| e.is_self_loop()) {
        return TreeFacts::NotATree(NotATree::SelfLoop(edge.from));
    }

    if let Some(cycle) = find_undirected_cycle(graph) {
        return TreeFacts::NotATree(NotATree::Cycle(cycle));
    }

    // Acyclic from here on: the graph is a forest with n - e components.
    let components = n - graph.edge_count();
    if components > 1 {
        return TreeFacts::NotATree(NotATree::Disconnected { components });
    }

    let roots: Vec<usize> = (0..n)
        .filter(|&slot| graph.incoming_edges(slot).is_empty())
        .collect();
    if roots.len() != 1 {
        let ids = roots.iter().map(|&slot| graph.nodes()[slot].id).collect();
        return TreeFacts::NotATree(NotATree::MultipleRoots(ids));
    }
    let root = roots[0];

    let endpoints = graph.endpoint_slots();
    let mut depth_of = vec![usize::MAX; n];
    let mut level_widths: Vec<usize> = Vec::new();
    let mut max_branching = 0;
    let mut leaves = 0;
    let mut queue = VecDeque::from([root]);
    depth_of[root] = 0;

    while let Some(slot) = queue.pop_front() {
        let depth = depth_of[slot];
        if level_widths.len() <= depth {
            level_widths.push(0);
        }
        level_widths[depth] += 1;

        let children = graph.outgoing_edges(slot);
        max_branching = max_branching.max(children.len());
        if children.is_empty() {
            leaves += 1;
        }
        for &edge in children {
            let child = endpoints[edge].1;
            depth_of[child] = depth + 1;
            queue.push_back(child);
        }
    }

    TreeFacts::Tree(TreeSummary {
        root: graph.nodes()[root].id,
        depth: level_widths.len() - 1,
        max_branching,
        leaves,
        level_widths,
        node_count: n,
    })
}

/// First undirected cycle found by an iterative DFS, as node ids along the
/// cycle. Each edge is traversed at most once per direction, so parallel
/// edges show up as a two-node cycle.
fn find_undirected_cycle(graph: &Graph) -> Option<Vec<NodeId>> {
    let n = graph.node_count();
    let endpoints = graph.endpoint_slots();
    let mut parent: Vec<Option<usize>> = vec![None; n];
    let mut parent_edge: Vec<Option<usize>> = vec![None; n];
    let mut visited = vec![false; n];

    for start in 0..n {
        if visited[start] {
            continue;
        }
        visited[start] = true;
        let mut stack = vec![start];

        while let Some(slot) = stack.pop() {
            let incident = graph
                .outgoing_edges(slot)
                .iter()
                .map(|&e| (e, endpoints[e].1))
                .chain(graph.incoming_edges(slot).iter().map(|&e| (e, endpoints[e].0)));

            for (edge, other) in incident {
                if parent_edge[slot] == Some(edge) {
                    continue;
                }
                if visited[other] {
                    return Some(cycle_path(graph, &parent, slot, other));
                }
                visited[other] = true;
                parent[other] = Some(slot);
                parent_edge[other] = Some(edge);
                stack.push(other);
            }
        }
    }
    None
}

/// Nodes on the tree path between `a` and `b` (which are joined by the
/// closing edge of the cycle).
fn cycle_path(graph: &Graph, parent: &[Option<usize>], a: usize, b: usize) -> Vec<NodeId> {
    let ancestors = |mut slot: usize| {
        let mut path = vec![slot];
        while let Some(p) = parent[slot] {
            path.push(p);
            slot = p;
        }
        path
    };
    let path_a = ancestors(a);
    let path_b = ancestors(b);

    // Trim the shared tail above the lowest common ancestor.
    let mut ia = path_a.len();
    let mut ib = path_b.len();
    while ia > 0 && ib > 0 && path_a[ia - 1] == path_b[ib - 1] {
        ia -= 1;
        ib -= 1;
    }
    let lca = path_a.get(ia).copied();

    let mut cycle: Vec<usize> = path_a[..ia].to_vec();
    cycle.extend(lca);
    cycle.extend(path_b[..ib].iter().rev());
    cycle.into_iter().map(|slot| graph.nodes()[slot].id).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::graph::{Edge, Node};

    fn graph(ids: &[i64], edges: &[(i64, i64)]) -> Graph {
        Graph::new(
            ids.iter().map(|&id| Node::new(id, 0.0, 0.0)).collect(),
            edges.iter().map(|&(a, b)| Edge::new(a, b)).collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_star_is_depth_one_tree() {
        let g = graph(&[1, 2, 3, 4, 5], &[(1, 2), (1, 3), (1, 4), (1, 5)]);
        let facts = tree_facts(&g);
        assert_eq!(
            facts,
            TreeFacts::Tree(TreeSummary {
                root: NodeId(1),
                depth: 1,
                max_branching: 4,
                leaves: 4,
                level_widths: vec![1, 4],
                node_count: 5,
            })
        );
    }

    #[test]
    fn test_single_node_tree() {
        let facts = tree_facts(&graph(&[7], &[]));
        assert_eq!(facts.depth(), Some(0));
        assert_eq!(facts.root(), Some(NodeId(7)));
    }

    #[test]
    fn test_deep_chain() {
        let g = graph(&[1, 2, 3, 4], &[(3, 4), (1, 2), (2, 3)]);
        let facts = tree_facts(&g);
        assert_eq!(facts.depth(), Some(3));
        assert_eq!(facts.root(), Some(NodeId(1)));
    }

    #[test]
    fn test_cycle_is_not_a_tree() {
        let g = graph(&[1, 2, 3], &[(1, 2), (2, 3), (3, 1)]);
        match tree_facts(&g) {
            TreeFacts::NotATree(NotATree::Cycle(nodes)) => {
                let mut nodes = nodes;
                nodes.sort();
                assert_eq!(nodes, vec![NodeId(1), NodeId(2), NodeId(3)]);
            }
            other => panic!("expected a cycle, got {other:?}"),
        }

        // Undirected cycle with a diamond of directed edges
        let g = graph(&[1, 2, 3, 4], &[(1, 2), (1, 3), (2, 4), (3, 4)]);
        let facts = tree_facts(&g);
        assert!(!facts.is_tree());
        assert_eq!(facts.depth(), None);
    }

    #[test]
    fn test_parallel_edges_are_a_cycle() {
        let g = graph(&[1, 2], &[(1, 2), (1, 2)]);
        assert!(matches!(
            tree_facts(&g),
            TreeFacts::NotATree(NotATree::Cycle(ref nodes)) if nodes.len() == 2
        ));
    }

    #[test]
    fn test_self_loop() {
        let g = graph(&[1, 2], &[(1, 2), (2, 2)]);
        assert_eq!(
            tree_facts(&g),
            TreeFacts::NotATree(NotATree::SelfLoop(NodeId(2)))
        );
    }

    #[test]
    fn test_disconnected_and_empty() {
        let g = graph(&[1, 2, 3, 4], &[(1, 2), (3, 4)]);
        assert_eq!(
            tree_facts(&g),
            TreeFacts::NotATree(NotATree::Disconnected { components: 2 })
        );
        assert_eq!(tree_facts(&graph(&[], &[])), TreeFacts::NotATree(NotATree::Empty));
    }

    #[test]
    fn test_multiple_roots() {
        // 1 -> 2 <- 3 is connected and acyclic but has two roots.
        let g = graph(&[1, 2, 3], &[(1, 2), (3, 2)]);
        assert_eq!(
            tree_facts(&g),
            TreeFacts::NotATree(NotATree::MultipleRoots(vec![NodeId(1), NodeId(3)]))
        );
    }
}
