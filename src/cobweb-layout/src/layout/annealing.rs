// Copyright 2026 The Cobweb Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::collections::BTreeSet;
use std::f64::consts::PI;

use rand::Rng;
use rand::rngs::StdRng;

use super::config::LayoutConfig;
use super::graph::{Graph, Position};
use super::intersections::{LineSegment, count_crossings, crossing_edges, segments_for};

/// Sample from the standard normal distribution using the Box-Muller transform.
fn sample_standard_normal(rng: &mut StdRng) -> f64 {
    // random() returns [0, 1), so clamp u1 away from zero to avoid ln(0).
    let u1: f64 = rng.random::<f64>().max(f64::MIN_POSITIVE);
    let u2: f64 = rng.random();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

/// Perturbation step: 65% Gaussian steps, 35% uniform-radius polar steps.
fn generate_step(rng: &mut StdRng, temperature: f64) -> Position {
    let gauss_x = sample_standard_normal(rng) * temperature;
    let gauss_y = sample_standard_normal(rng) * temperature;
    if rng.random::<f64>() < 0.35 {
        let angle = rng.random::<f64>() * 2.0 * PI;
        let radius = (0.4 + rng.random::<f64>() * 0.8) * temperature;
        Position::new(radius * angle.cos(), radius * angle.sin())
    } else {
        Position::new(gauss_x, gauss_y)
    }
}

/// Result of a simulated annealing run. `positions` is indexed by node slot.
pub struct AnnealingResult {
    pub positions: Vec<Position>,
    pub crossings: usize,
    pub improved: bool,
    pub iterations: usize,
}

/// Run one bounded simulated-annealing pass to reduce edge crossings.
///
/// 1. Compute initial crossings; bail out immediately if zero.
/// 2. Candidates are the non-pinned endpoints of edges that cross.
/// 3. Each iteration: perturb 1..4 random candidates, recompute crossings,
///    accept via the Metropolis criterion.
/// 4. Cool temperature multiplicatively; periodically reheat.
/// 5. Return the best layout seen, never one with more crossings than the
///    starting layout.
pub fn untangle(graph: &Graph, config: &LayoutConfig, rng: &mut StdRng) -> AnnealingResult {
    let initial: Vec<Position> = graph.nodes().iter().map(|n| n.position).collect();
    let build_segments = |layout: &[Position]| segments_for(graph, |slot| layout[slot]);

    let segments = build_segments(initial.as_slice());
    let limit = config.brute_force_limit;
    let initial_crossings = count_crossings(&segments, limit);

    let candidates = movable_crossing_endpoints(graph, &segments, limit);
    if initial_crossings == 0 || candidates.is_empty() {
        return AnnealingResult {
            positions: initial,
            crossings: initial_crossings,
            improved: false,
            iterations: 0,
        };
    }

    let base_temperature = config
        .annealing_temperature
        .max(derive_initial_temperature(&segments, config));
    let base_temperature = if base_temperature > 0.0 && base_temperature.is_finite() {
        base_temperature
    } else {
        1.0
    };

    // Displacement limits are relative to where the pass found each node.
    let baseline = initial.clone();

    let mut best_layout = initial.clone();
    let mut best_crossings = initial_crossings;

    let mut test_layout = initial;
    let mut current_crossings = initial_crossings;

    let mut improved = false;
    let mut temperature = base_temperature;
    let mut total_iters = 0;

    for iter in 0..config.annealing_iterations {
        if best_crossings == 0 {
            break;
        }

        let perturbed = perturb_layout(
            &test_layout,
            &baseline,
            &candidates,
            temperature,
            config.annealing_max_displacement,
            rng,
        );
        let perturbed_crossings = count_crossings(&build_segments(perturbed.as_slice()), limit);

        let delta = perturbed_crossings as f64 - current_crossings as f64;
        let accept_prob = if delta > 0.0 {
            (-delta / temperature).exp()
        } else {
            1.0
        };

        if rng.random::<f64>() < accept_prob {
            test_layout = perturbed;
            current_crossings = perturbed_crossings;

            if current_crossings < best_crossings {
                best_layout = test_layout.clone();
                best_crossings = current_crossings;
                improved = true;
            }
        }

        temperature *= config.annealing_cooling_rate;

        // Periodic reheating to escape local minima
        if (iter + 1) % config.annealing_reheat_period == 0 {
            temperature = base_temperature;
        }

        total_iters = iter + 1;
    }

    AnnealingResult {
        positions: best_layout,
        crossings: best_crossings,
        improved,
        iterations: total_iters,
    }
}

/// Slots of non-pinned nodes that are endpoints of a crossing edge.
fn movable_crossing_endpoints(graph: &Graph, segments: &[LineSegment], limit: usize) -> Vec<usize> {
    let slots: BTreeSet<usize> = crossing_edges(segments, limit)
        .into_iter()
        .flat_map(|seg| {
            let (from, to) = graph.endpoint_slots()[segments[seg].edge];
            [from, to]
        })
        .filter(|&slot| !graph.nodes()[slot].pinned)
        .collect();
    slots.into_iter().collect()
}

/// Average segment length scaled by `config.annealing_temperature_scale`.
/// Falls back to `config.annealing_temperature` if the scale is non-positive
/// or there are no measurable segments.
fn derive_initial_temperature(segments: &[LineSegment], config: &LayoutConfig) -> f64 {
    let scale = config.annealing_temperature_scale;
    if scale <= 0.0 {
        return config.annealing_temperature;
    }

    let mut total = 0.0;
    let mut count: usize = 0;
    for seg in segments {
        let dist = (seg.end - seg.start).length();
        if dist > 0.0 {
            total += dist;
            count += 1;
        }
    }

    if count == 0 {
        return config.annealing_temperature;
    }

    (total / count as f64) * scale
}

/// Perturb 1..4 random candidate nodes, clamping each to `limit` from its
/// baseline position.
fn perturb_layout(
    layout: &[Position],
    baseline: &[Position],
    candidates: &[usize],
    temperature: f64,
    limit: f64,
    rng: &mut StdRng,
) -> Vec<Position> {
    let mut result = layout.to_vec();
    let mut candidates = candidates.to_vec();

    let max_moves = 4.min(candidates.len());
    let num_to_perturb = 1 + rng.random_range(0..max_moves);

    for _ in 0..num_to_perturb {
        let idx = rng.random_range(0..candidates.len());
        let slot = candidates.swap_remove(idx);

        let step = generate_step(rng, temperature);
        let base = baseline[slot];
        let target = result[slot] + step;
        let moved = Position::new(
            target.x.clamp(base.x - limit, base.x + limit),
            target.y.clamp(base.y - limit, base.y + limit),
        );
        if moved.is_finite() {
            result[slot] = moved;
        }
    }

    result
}
