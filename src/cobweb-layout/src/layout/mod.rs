// Copyright 2026 The Cobweb Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

pub mod annealing;
pub mod bounds;
pub mod config;
pub mod graph;
pub mod intersections;
pub mod sfdp;
pub mod tree;

use std::slice;

use log::{Level, debug, info, log};
use ordered_float::OrderedFloat;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::common::Result;
use crate::json::GraphData;

use self::annealing::{AnnealingResult, untangle};
use self::bounds::BoxReport;
use self::config::LayoutConfig;
use self::graph::{Graph, Node, NodeId, NodePosition, Position};
use self::intersections::{count_crossing_edges, count_crossings, graph_segments};
use self::sfdp::{ForceSimulation, MIN_SEPARATION, StepReport};
use self::tree::TreeFacts;

/// Operations a host drives a layout with, typically once per frame.
pub trait LayoutEngine {
    fn graph(&self) -> &Graph;

    /// Nudge every non-pinned node by `intensity * (u - 0.5)` per axis, `u`
    /// uniform in `[0, 1)`. `None` uses the configured default drift.
    fn randomize_node_positions(&mut self, intensity: Option<f64>);

    /// Current position of every node, in construction order.
    fn node_positions(&self) -> NodePositions<'_>;

    fn nodes_data(&self) -> Vec<NodePosition> {
        self.node_positions().collect()
    }

    /// Check the layout against the square of half-size `|size|` centred at
    /// the origin, clamping outside nodes onto it when `enforce` is set.
    fn inside_box(&mut self, size: f64, enforce: bool) -> BoxReport;

    /// Number of crossing edge pairs. Unless `count_only`, one untangle pass
    /// runs first and the count is for the untangled layout.
    fn count_graph_intersections(&mut self, count_only: bool) -> usize;

    /// Number of edges crossing at least one other edge. Unless
    /// `count_only`, one untangle pass runs first.
    fn count_edges_intersections(&mut self, count_only: bool) -> usize;

    fn tree_facts(&self) -> TreeFacts;

    /// Advance the layout by one iteration.
    fn step(&mut self) -> StepReport;
}

/// Lazy iterator over node positions. Cloning restarts from the current
/// point; calling `node_positions` again restarts from the first node.
#[derive(Clone)]
pub struct NodePositions<'a> {
    nodes: slice::Iter<'a, Node>,
}

impl<'a> NodePositions<'a> {
    pub fn new(graph: &'a Graph) -> Self {
        Self {
            nodes: graph.nodes().iter(),
        }
    }
}

impl Iterator for NodePositions<'_> {
    type Item = NodePosition;

    fn next(&mut self) -> Option<NodePosition> {
        self.nodes.next().map(|n| NodePosition {
            id: n.id,
            x: n.position.x,
            y: n.position.y,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.nodes.size_hint()
    }
}

impl ExactSizeIterator for NodePositions<'_> {}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Constructed; no step has run yet.
    Ready,
    Stepping,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SettleReport {
    pub iterations: usize,
    pub converged: bool,
    /// Energy reported by the last step that ran.
    pub energy: f64,
}

/// The layout kept by `settle_best_of`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BestOfReport {
    pub attempt: usize,
    pub crossings: usize,
}

/// Force-directed layout engine over an owned graph.
#[cfg_attr(feature = "debug-derive", derive(Debug))]
pub struct ForceLayout {
    graph: Graph,
    config: LayoutConfig,
    rng: StdRng,
    simulation: ForceSimulation,
    phase: Phase,
}

impl ForceLayout {
    pub fn new(graph: Graph, config: LayoutConfig) -> Self {
        let config = config.sanitized();
        let simulation = ForceSimulation::new(&graph, &config);
        debug!(
            "layout: {} nodes, {} edges, ideal edge length {:.1}",
            graph.node_count(),
            graph.edge_count(),
            simulation.ideal_edge_length()
        );
        Self {
            rng: StdRng::seed_from_u64(config.seed),
            graph,
            config,
            simulation,
            phase: Phase::Ready,
        }
    }

    pub fn from_data(data: GraphData, config: LayoutConfig) -> Result<Self> {
        Ok(Self::new(data.into_graph()?, config))
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn ideal_edge_length(&self) -> f64 {
        self.simulation.ideal_edge_length()
    }

    pub fn is_converged(&self) -> bool {
        self.simulation.is_converged()
    }

    /// Move a node, e.g. while the user drags it.
    pub fn update_position(&mut self, id: NodeId, x: f64, y: f64) -> Result<()> {
        self.graph.update_position(id, x, y)?;
        self.simulation.reheat(&self.config);
        Ok(())
    }

    pub fn set_pinned(&mut self, id: NodeId, pinned: bool) -> Result<()> {
        self.graph.set_pinned(id, pinned)
    }

    /// One simulated-annealing pass over the current layout. Positions are
    /// only replaced when the pass found fewer crossings.
    pub fn untangle(&mut self) -> AnnealingResult {
        let result = untangle(&self.graph, &self.config, &mut self.rng);
        if result.improved {
            for (node, pos) in self.graph.nodes_mut().iter_mut().zip(&result.positions) {
                node.position = *pos;
            }
            self.simulation.reheat(&self.config);
        }
        debug!(
            "untangle: {} crossings after {} iterations",
            result.crossings, result.iterations
        );
        result
    }

    /// Step until the simulation converges or `max_iterations` steps ran.
    pub fn settle(&mut self, max_iterations: usize) -> SettleReport {
        let mut report = SettleReport {
            iterations: 0,
            converged: self.simulation.is_converged(),
            energy: 0.0,
        };
        while !report.converged && report.iterations < max_iterations {
            let step = self.step();
            report.iterations += 1;
            report.converged = step.converged;
            report.energy = step.energy;
        }
        if self.config.arrange_leaves {
            self.simulation.arrange_leaves(&mut self.graph);
        }
        debug!(
            "settle: {} iterations, converged: {}",
            report.iterations, report.converged
        );
        report
    }

    /// Settle `attempts` seeded copies of the layout and keep the one with
    /// the fewest crossings (the earliest attempt on ties). Attempt 0 starts
    /// from the current positions; the rest start from a perturbed copy.
    pub fn settle_best_of(&mut self, attempts: usize) -> BestOfReport {
        let attempts = attempts.max(1);

        let (crossings, layout) = self.attempt(0);
        let mut best = (0, crossings, layout);

        #[cfg(not(target_arch = "wasm32"))]
        let rest: Vec<(usize, ForceLayout)> = {
            use rayon::prelude::*;
            (1..attempts)
                .into_par_iter()
                .map(|i| self.attempt(i))
                .collect()
        };
        #[cfg(target_arch = "wasm32")]
        let rest: Vec<(usize, ForceLayout)> = (1..attempts).map(|i| self.attempt(i)).collect();

        for (attempt, (crossings, layout)) in (1..).zip(rest) {
            if crossings < best.1 {
                best = (attempt, crossings, layout);
            }
        }

        let (attempt, crossings, layout) = best;
        self.graph = layout.graph;
        self.simulation = layout.simulation;
        self.phase = Phase::Stepping;
        let report = BestOfReport { attempt, crossings };
        info!(
            "best of {} layouts: attempt {} with {} crossings",
            attempts, report.attempt, report.crossings
        );
        report
    }

    fn attempt(&self, index: usize) -> (usize, ForceLayout) {
        let config = LayoutConfig {
            seed: self.config.seed.wrapping_add(index as u64),
            ..self.config.clone()
        };
        let mut layout = ForceLayout::new(self.graph.clone(), config);
        if index > 0 {
            let drift = layout.ideal_edge_length();
            layout.randomize_node_positions(Some(drift));
        }
        layout.settle(self.config.settle_iterations);
        let crossings = layout.count_graph_intersections(true);
        (crossings, layout)
    }

    /// Sum of `1 / d^2` over all node pairs, with `d` floored at
    /// `MIN_SEPARATION`.
    pub fn charge_energy(&self) -> f64 {
        let nodes = self.graph.nodes();
        let mut total = 0.0;
        for (i, a) in nodes.iter().enumerate() {
            for b in &nodes[i + 1..] {
                let d = a.position.distance(b.position).max(MIN_SEPARATION);
                total += 1.0 / (d * d);
            }
        }
        total
    }

    /// Nearest node within `radius` of `point`.
    pub fn node_at(&self, point: Position, radius: f64) -> Option<NodeId> {
        let radius = radius.abs();
        self.graph
            .nodes()
            .iter()
            .map(|n| (n.id, n.position.distance(point)))
            .filter(|&(_, d)| d <= radius)
            .min_by_key(|&(_, d)| OrderedFloat(d))
            .map(|(id, _)| id)
    }

    /// End the session, handing back the final graph.
    pub fn dispose(self) -> Graph {
        debug!("layout disposed after phase {:?}", self.phase);
        self.graph
    }

    fn log_level(&self) -> Level {
        if self.config.debug {
            Level::Info
        } else {
            Level::Debug
        }
    }
}

impl LayoutEngine for ForceLayout {
    fn graph(&self) -> &Graph {
        &self.graph
    }

    fn randomize_node_positions(&mut self, intensity: Option<f64>) {
        let intensity = intensity.unwrap_or(self.config.default_drift);
        let amount = if intensity.is_finite() {
            intensity.abs()
        } else {
            0.0
        };
        if amount == 0.0 {
            return;
        }

        let rng = &mut self.rng;
        for node in self.graph.nodes_mut() {
            if node.pinned {
                continue;
            }
            let dx = amount * (rng.random::<f64>() - 0.5);
            let dy = amount * (rng.random::<f64>() - 0.5);
            // a move past f64::MAX is dropped; coordinates stay finite
            let moved = node.position + Position::new(dx, dy);
            if moved.is_finite() {
                node.position = moved;
            }
        }
        self.simulation.reheat(&self.config);
        log!(self.log_level(), "randomized positions with drift {amount}");
    }

    fn node_positions(&self) -> NodePositions<'_> {
        NodePositions::new(&self.graph)
    }

    fn inside_box(&mut self, size: f64, enforce: bool) -> BoxReport {
        let report = bounds::inside_box(&mut self.graph, size, enforce);
        if report.clamped > 0 {
            self.simulation.reheat(&self.config);
        }
        log!(
            self.log_level(),
            "inside box {}: {} nodes, {} edges inside, {} clamped",
            size,
            report.nodes_inside,
            report.edges_inside,
            report.clamped
        );
        report
    }

    fn count_graph_intersections(&mut self, count_only: bool) -> usize {
        if !count_only {
            self.untangle();
        }
        count_crossings(&graph_segments(&self.graph), self.config.brute_force_limit)
    }

    fn count_edges_intersections(&mut self, count_only: bool) -> usize {
        if !count_only {
            self.untangle();
        }
        count_crossing_edges(&graph_segments(&self.graph), self.config.brute_force_limit)
    }

    fn tree_facts(&self) -> TreeFacts {
        info!(
            "tree facts: {} nodes, {} edges",
            self.graph.node_count(),
            self.graph.edge_count()
        );
        let facts = tree::tree_facts(&self.graph);
        match &facts {
            TreeFacts::Tree(summary) => info!(
                "tree rooted at {} with depth {} and {} leaves",
                summary.root, summary.depth, summary.leaves
            ),
            TreeFacts::NotATree(reason) => info!("not a tree: {reason:?}"),
        }
        facts
    }

    fn step(&mut self) -> StepReport {
        self.phase = Phase::Stepping;
        let report = self
            .simulation
            .step(&mut self.graph, &self.config, &mut self.rng);
        log!(
            self.log_level(),
            "step: energy {:.3}, step size {:.3}, converged: {}",
            report.energy,
            report.step_size,
            report.converged
        );
        report
    }
}
