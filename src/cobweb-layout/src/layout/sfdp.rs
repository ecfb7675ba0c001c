// Copyright 2026 The Cobweb Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::collections::{BTreeMap, HashMap};
use std::f64::consts::PI;

use rand::Rng;
use rand::rngs::StdRng;

use super::config::LayoutConfig;
use super::graph::{Graph, Position};

/// Distances below this are treated as coincident nodes.
pub const MIN_SEPARATION: f64 = 1e-3;

/// Outcome of a single force-directed iteration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepReport {
    /// Sum of force magnitudes over movable nodes.
    pub energy: f64,
    /// Displacement applied to each movable node this step.
    pub step_size: f64,
    pub converged: bool,
}

/// Incremental SFDP-style force simulation. One `step` is one iteration of
/// repulsion between node pairs plus spring attraction along edges, with an
/// adaptive step size; the host calls it once (or a few times) per frame.
#[cfg_attr(feature = "debug-derive", derive(Debug))]
#[derive(Clone)]
pub struct ForceSimulation {
    k: f64,
    step: f64,
    prev_norm: f64,
    converged: bool,
}

impl ForceSimulation {
    pub fn new(graph: &Graph, config: &LayoutConfig) -> Self {
        let k = if config.ideal_edge_length < 0.0 {
            average_edge_length(graph).unwrap_or(LayoutConfig::default().ideal_edge_length)
        } else {
            config.ideal_edge_length
        };
        Self {
            k,
            step: config.initial_step_size,
            prev_norm: f64::MAX,
            converged: false,
        }
    }

    pub fn ideal_edge_length(&self) -> f64 {
        self.k
    }

    pub fn is_converged(&self) -> bool {
        self.converged
    }

    /// Restart cooling after positions changed from outside the simulation.
    pub fn reheat(&mut self, config: &LayoutConfig) {
        self.step = config.initial_step_size;
        self.prev_norm = f64::MAX;
        self.converged = false;
    }

    pub fn step(&mut self, graph: &mut Graph, config: &LayoutConfig, rng: &mut StdRng) -> StepReport {
        if self.converged {
            return StepReport {
                energy: 0.0,
                step_size: 0.0,
                converged: true,
            };
        }

        let forces = self.forces(graph, config, rng);
        let step = self.step;
        let mut norm = 0.0;

        for (node, force) in graph.nodes_mut().iter_mut().zip(&forces) {
            if node.pinned {
                continue;
            }
            let mag = force.length();
            if !mag.is_finite() {
                continue;
            }
            norm += mag;
            if mag > 0.0 {
                let moved = node.position + *force * (step / mag);
                if moved.is_finite() {
                    node.position = moved;
                }
            }
        }

        // Adaptive cooling: increase step when energy drops significantly,
        // cool when energy rises, hold steady for small improvements.
        if norm >= self.prev_norm {
            self.step *= config.cooling_factor;
        } else if norm <= 0.95 * self.prev_norm {
            self.step = (self.step * 0.99 / config.cooling_factor).min(self.k.abs());
        }
        self.prev_norm = norm;

        if norm == 0.0 || self.step < config.convergence_threshold * self.k.abs() {
            self.converged = true;
        }

        StepReport {
            energy: norm,
            step_size: step,
            converged: self.converged,
        }
    }

    /// Net force on every node slot.
    fn forces(&self, graph: &Graph, config: &LayoutConfig, rng: &mut StdRng) -> Vec<Position> {
        let k = self.k.abs().max(MIN_SEPARATION);
        let p = config.repulsive_exponent;
        let kp = k.powf(1.0 - p);
        let crk = config.attractive_constant.powf((2.0 - p) / 3.0) / k;

        let positions: Vec<Position> = graph.nodes().iter().map(|n| n.position).collect();
        let mut forces = vec![Position::default(); positions.len()];

        let mut repel = |i: usize, j: usize, forces: &mut [Position]| {
            let mut delta = positions[i] - positions[j];
            let mut dist = delta.length();
            if dist < MIN_SEPARATION {
                // Coincident nodes: push apart along a random direction.
                let angle = rng.random::<f64>() * 2.0 * PI;
                delta = Position::new(angle.cos(), angle.sin()) * MIN_SEPARATION;
                dist = MIN_SEPARATION;
            }
            let f = kp / dist.powf(1.0 - p);
            let push = delta * (f / dist);
            forces[i] = forces[i] + push;
            forces[j] = forces[j] - push;
        };

        if positions.len() <= config.exact_repulsion_limit {
            // O(n^2) repulsive forces between all node pairs
            for i in 0..positions.len() {
                for j in (i + 1)..positions.len() {
                    repel(i, j, &mut forces);
                }
            }
        } else {
            let cutoff = config.repulsion_cutoff * k;
            for (i, j) in nearby_pairs(&positions, cutoff) {
                repel(i, j, &mut forces);
            }
        }

        // O(edges) attractive forces along edges
        for &(from, to) in graph.endpoint_slots() {
            if from == to {
                continue;
            }
            let delta = positions[from] - positions[to];
            let dist = delta.length();
            if dist < MIN_SEPARATION {
                continue;
            }
            // Spring force crk * dist along the unit direction.
            let pull = delta * crk;
            forces[from] = forces[from] - pull;
            forces[to] = forces[to] + pull;
        }

        forces
    }

    /// Rearrange degree-1 (leaf) nodes evenly around their single neighbor at
    /// distance `k`. Pinned leaves stay put.
    pub fn arrange_leaves(&self, graph: &mut Graph) {
        let mut children_of: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for (slot, node) in graph.nodes().iter().enumerate() {
            if node.pinned {
                continue;
            }
            let out = graph.outgoing_edges(slot);
            let inc = graph.incoming_edges(slot);
            let parent = match (out, inc) {
                ([e], []) => graph.endpoint_slots()[*e].1,
                ([], [e]) => graph.endpoint_slots()[*e].0,
                _ => continue,
            };
            if parent != slot {
                children_of.entry(parent).or_default().push(slot);
            }
        }

        for (parent, leaves) in &children_of {
            if leaves.len() <= 1 {
                continue;
            }
            let parent_pos = graph.nodes()[*parent].position;
            let angle_step = 2.0 * PI / leaves.len() as f64;
            let nodes = graph.nodes_mut();
            for (i, &leaf) in leaves.iter().enumerate() {
                let angle = i as f64 * angle_step;
                nodes[leaf].position = parent_pos + Position::new(angle.cos(), angle.sin()) * self.k;
            }
        }
    }
}

pub(crate) fn average_edge_length(graph: &Graph) -> Option<f64> {
    let mut total = 0.0;
    let mut count = 0usize;
    for idx in 0..graph.edge_count() {
        if let Some((a, b)) = graph.edge_segment(idx) {
            let dist = a.distance(b);
            if dist > 0.0 {
                total += dist;
                count += 1;
            }
        }
    }
    (count > 0).then(|| total / count as f64)
}

/// Node pairs `(i, j)`, `i < j`, closer than `cutoff`, found through a hash
/// grid with `cutoff`-sized cells.
fn nearby_pairs(positions: &[Position], cutoff: f64) -> Vec<(usize, usize)> {
    let cell = |p: Position| ((p.x / cutoff).floor() as i64, (p.y / cutoff).floor() as i64);

    let mut grid: HashMap<(i64, i64), Vec<usize>> = HashMap::new();
    for (i, p) in positions.iter().enumerate() {
        grid.entry(cell(*p)).or_default().push(i);
    }

    let mut pairs = Vec::new();
    for (i, p) in positions.iter().enumerate() {
        let (cx, cy) = cell(*p);
        for dx in -1..=1 {
            for dy in -1..=1 {
                let (Some(nx), Some(ny)) = (cx.checked_add(dx), cy.checked_add(dy)) else {
                    continue;
                };
                let Some(members) = grid.get(&(nx, ny)) else {
                    continue;
                };
                for &j in members {
                    if j > i && positions[j].distance(*p) < cutoff {
                        pairs.push((i, j));
                    }
                }
            }
        }
    }
    pairs
}
