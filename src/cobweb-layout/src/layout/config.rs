// Copyright 2026 The Cobweb Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use serde::{Deserialize, Serialize};

use crate::common::Result;

/// Layout engine configuration.
///
/// Distances are in renderer pixels: the host maps layout coordinates 1:1
/// onto the canvas with the origin at its centre.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Seed for the engine's random source (drift, jitter, annealing).
    pub seed: u64,

    // Force-directed stepping
    /// Ideal edge length. When negative, derived from the average edge
    /// length of the initial layout.
    pub ideal_edge_length: f64,
    /// Repulsive exponent controlling how repulsion scales with distance.
    pub repulsive_exponent: f64,
    /// Attractive constant scaling the spring forces along edges.
    pub attractive_constant: f64,
    /// Starting (and reheated) displacement per step, in pixels.
    pub initial_step_size: f64,
    /// Multiplicative cooling applied when total force rises between steps.
    pub cooling_factor: f64,
    /// Stepping stops once the step size drops below
    /// `convergence_threshold * ideal_edge_length`.
    pub convergence_threshold: f64,
    /// Above this many nodes, repulsion only considers nodes within
    /// `repulsion_cutoff` ideal edge lengths.
    pub exact_repulsion_limit: usize,
    pub repulsion_cutoff: f64,
    /// Arrange degree-1 nodes evenly around their neighbor after settling.
    pub arrange_leaves: bool,
    /// Step budget for each layout tried by `settle_best_of`.
    pub settle_iterations: usize,

    // Randomization
    /// Drift intensity used when `randomize_node_positions` gets `None`.
    pub default_drift: f64,

    // Crossing analysis
    /// Above this many segments, crossing candidates come from a spatial
    /// grid instead of the full pairwise scan.
    pub brute_force_limit: usize,

    // Simulated annealing parameters for crossing reduction
    /// Max iterations of a single untangle pass.
    pub annealing_iterations: usize,
    /// Initial temperature. Raised to the edge-length derived temperature
    /// when that is larger.
    pub annealing_temperature: f64,
    /// Cooling factor per iteration (multiplicative).
    pub annealing_cooling_rate: f64,
    /// Iterations between reheating within a single pass.
    pub annealing_reheat_period: usize,
    /// Maximum displacement of a node from where the pass found it.
    pub annealing_max_displacement: f64,
    /// Scales average edge length to compute the initial temperature.
    pub annealing_temperature_scale: f64,

    /// Number of seeded layouts tried by `settle_best_of`.
    pub parallel_attempts: usize,

    /// Host frame rate for real-time playback.
    pub frame_rate_hz: f64,

    /// Enable verbose logging.
    pub debug: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            ideal_edge_length: 100.0,
            repulsive_exponent: -1.0,
            attractive_constant: 0.2,
            initial_step_size: 10.0,
            cooling_factor: 0.9,
            convergence_threshold: 1e-3,
            exact_repulsion_limit: 500,
            repulsion_cutoff: 4.0,
            arrange_leaves: false,
            settle_iterations: 1000,
            default_drift: 1.0,
            brute_force_limit: 256,
            annealing_iterations: 200,
            annealing_temperature: 30.0,
            annealing_cooling_rate: 0.995,
            annealing_reheat_period: 12,
            annealing_max_displacement: 200.0,
            annealing_temperature_scale: 0.4,
            parallel_attempts: 4,
            frame_rate_hz: 60.0,
            debug: false,
        }
    }
}

impl LayoutConfig {
    /// Parse a (possibly partial) JSON config; missing fields take defaults.
    pub fn from_json(json: &str) -> Result<LayoutConfig> {
        let config: LayoutConfig = serde_json::from_str(json)?;
        Ok(config.sanitized())
    }

    /// Replace values that would make per-frame operations diverge or stall
    /// with their defaults.
    pub fn sanitized(mut self) -> LayoutConfig {
        let defaults = LayoutConfig::default();
        if !self.ideal_edge_length.is_finite() || self.ideal_edge_length == 0.0 {
            self.ideal_edge_length = defaults.ideal_edge_length;
        }
        if !self.initial_step_size.is_finite() || self.initial_step_size <= 0.0 {
            self.initial_step_size = defaults.initial_step_size;
        }
        if !(self.cooling_factor > 0.0 && self.cooling_factor < 1.0) {
            self.cooling_factor = defaults.cooling_factor;
        }
        if !(self.annealing_cooling_rate > 0.0 && self.annealing_cooling_rate <= 1.0) {
            self.annealing_cooling_rate = defaults.annealing_cooling_rate;
        }
        if !(self.annealing_max_displacement.is_finite() && self.annealing_max_displacement >= 0.0) {
            self.annealing_max_displacement = defaults.annealing_max_displacement;
        }
        if self.annealing_reheat_period == 0 {
            self.annealing_reheat_period = defaults.annealing_reheat_period;
        }
        if !self.default_drift.is_finite() {
            self.default_drift = defaults.default_drift;
        }
        if !(self.frame_rate_hz.is_finite() && self.frame_rate_hz > 0.0) {
            self.frame_rate_hz = defaults.frame_rate_hz;
        }
        if !(self.repulsion_cutoff.is_finite() && self.repulsion_cutoff > 0.0) {
            self.repulsion_cutoff = defaults.repulsion_cutoff;
        }
        if self.parallel_attempts == 0 {
            self.parallel_attempts = 1;
        }
        self
    }
}
