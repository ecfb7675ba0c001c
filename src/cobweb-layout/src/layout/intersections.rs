// Copyright 2026 The Cobweb Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Straight-line edge crossing detection.
//!
//! Two edges cross when their segments share a point and the edges share no
//! endpoint node. Touching and collinear-overlapping segments count as
//! crossings; a zero-length segment (both endpoints at the same spot)
//! behaves as a point. Self loops never produce a segment.

use std::collections::{BTreeSet, HashMap};

use float_cmp::approx_eq;

use super::graph::{Graph, NodeId, Position};

/// Orientation values closer than this to zero are treated as collinear.
const ORIENTATION_EPSILON: f64 = 1e-9;

/// Upper bound on grid cells along one axis, keeping per-segment cell
/// coverage bounded for long edges.
const MAX_GRID_CELLS_PER_AXIS: f64 = 64.0;

/// A line segment for crossing detection.
#[derive(Clone, Debug, PartialEq)]
pub struct LineSegment {
    pub start: Position,
    pub end: Position,
    /// Node at the start of this segment (for shared-endpoint detection).
    pub from_node: NodeId,
    /// Node at the end of this segment.
    pub to_node: NodeId,
    /// Index of the edge this segment draws.
    pub edge: usize,
}

impl LineSegment {
    fn min(&self) -> Position {
        Position::new(self.start.x.min(self.end.x), self.start.y.min(self.end.y))
    }

    fn max(&self) -> Position {
        Position::new(self.start.x.max(self.end.x), self.start.y.max(self.end.y))
    }

    fn shares_endpoint(&self, other: &LineSegment) -> bool {
        self.from_node == other.from_node
            || self.from_node == other.to_node
            || self.to_node == other.from_node
            || self.to_node == other.to_node
    }
}

/// Segments for every non-loop edge of `graph`, in edge order.
pub fn graph_segments(graph: &Graph) -> Vec<LineSegment> {
    segments_for(graph, |slot| graph.nodes()[slot].position)
}

/// Segments for the edges of `graph` drawn with positions taken from
/// `position_of(slot)` instead of the graph's own.
pub(crate) fn segments_for<F>(graph: &Graph, position_of: F) -> Vec<LineSegment>
where
    F: Fn(usize) -> Position,
{
    graph
        .edges()
        .iter()
        .zip(graph.endpoint_slots())
        .enumerate()
        .filter(|(_, (edge, _))| !edge.is_self_loop())
        .map(|(idx, (edge, &(from, to)))| LineSegment {
            start: position_of(from),
            end: position_of(to),
            from_node: edge.from,
            to_node: edge.to,
            edge: idx,
        })
        .collect()
}

/// Sign of the turn a -> b -> c: 1 counter-clockwise, -1 clockwise, 0
/// collinear.
fn orientation(a: Position, b: Position, c: Position) -> i8 {
    let turn = (b - a).cross_2d(c - a);
    if approx_eq!(f64, turn, 0.0, epsilon = ORIENTATION_EPSILON) {
        0
    } else if turn > 0.0 {
        1
    } else {
        -1
    }
}

/// Whether `q`, known to be collinear with segment `p`-`r`, lies within its
/// bounding box.
fn on_segment(p: Position, q: Position, r: Position) -> bool {
    q.x <= p.x.max(r.x) + ORIENTATION_EPSILON
        && q.x >= p.x.min(r.x) - ORIENTATION_EPSILON
        && q.y <= p.y.max(r.y) + ORIENTATION_EPSILON
        && q.y >= p.y.min(r.y) - ORIENTATION_EPSILON
}

/// Check if two segments cross.
/// Segments sharing an endpoint node are never considered crossing.
pub fn segments_intersect(s1: &LineSegment, s2: &LineSegment) -> bool {
    if s1.shares_endpoint(s2) {
        return false;
    }
    if s1.from_node == s1.to_node || s2.from_node == s2.to_node {
        return false;
    }

    let (p1, q1) = (s1.start, s1.end);
    let (p2, q2) = (s2.start, s2.end);

    let o1 = orientation(p1, q1, p2);
    let o2 = orientation(p1, q1, q2);
    let o3 = orientation(p2, q2, p1);
    let o4 = orientation(p2, q2, q1);

    if o1 != o2 && o3 != o4 && o1 != 0 && o2 != 0 && o3 != 0 && o4 != 0 {
        return true;
    }

    (o1 == 0 && on_segment(p1, p2, q1))
        || (o2 == 0 && on_segment(p1, q2, q1))
        || (o3 == 0 && on_segment(p2, p1, q2))
        || (o4 == 0 && on_segment(p2, q1, q2))
}

/// All crossing segment pairs `(i, j)` with `i < j`, sorted.
///
/// At or below `brute_force_limit` segments this is the O(n^2) pairwise
/// scan; above it, candidates are drawn from a uniform grid over segment
/// bounding boxes.
pub fn crossing_pairs(segments: &[LineSegment], brute_force_limit: usize) -> Vec<(usize, usize)> {
    if segments.len() <= brute_force_limit {
        return pairwise_crossings(segments);
    }

    match SegmentGrid::new(segments) {
        Some(grid) => grid
            .candidate_pairs()
            .into_iter()
            .filter(|&(i, j)| segments_intersect(&segments[i], &segments[j]))
            .collect(),
        // drawing too wide to measure in f64
        None => pairwise_crossings(segments),
    }
}

fn pairwise_crossings(segments: &[LineSegment]) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    for i in 0..segments.len() {
        for j in (i + 1)..segments.len() {
            if segments_intersect(&segments[i], &segments[j]) {
                pairs.push((i, j));
            }
        }
    }
    pairs
}

/// Count the crossing pairs among a set of segments.
pub fn count_crossings(segments: &[LineSegment], brute_force_limit: usize) -> usize {
    crossing_pairs(segments, brute_force_limit).len()
}

/// Count the edges that cross at least one other edge.
pub fn count_crossing_edges(segments: &[LineSegment], brute_force_limit: usize) -> usize {
    crossing_edges(segments, brute_force_limit).len()
}

/// Indices (into `segments`) of the segments involved in any crossing.
pub fn crossing_edges(segments: &[LineSegment], brute_force_limit: usize) -> BTreeSet<usize> {
    crossing_pairs(segments, brute_force_limit)
        .into_iter()
        .flat_map(|(i, j)| [i, j])
        .collect()
}

/// Uniform hash grid over segment bounding boxes. Only segments sharing a
/// cell are ever tested against each other.
///
/// Cells are indexed relative to the lower corner of the drawing, so every
/// index lies in `0..=MAX_GRID_CELLS_PER_AXIS` whatever the coordinates.
struct SegmentGrid {
    cells: HashMap<(usize, usize), Vec<usize>>,
}

impl SegmentGrid {
    /// `None` when the drawing's extent overflows f64.
    fn new(segments: &[LineSegment]) -> Option<Self> {
        let mut lo = Position::new(f64::INFINITY, f64::INFINITY);
        let mut hi = Position::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
        for seg in segments {
            let (smin, smax) = (seg.min(), seg.max());
            lo = Position::new(lo.x.min(smin.x), lo.y.min(smin.y));
            hi = Position::new(hi.x.max(smax.x), hi.y.max(smax.y));
        }
        let extent = (hi.x - lo.x).max(hi.y - lo.y);
        if !extent.is_finite() {
            return None;
        }

        let cell_size = Self::cell_size(segments, extent);
        let cell = |v: f64, origin: f64| -> usize {
            // v >= origin and both are finite
            ((v - origin) / cell_size)
                .floor()
                .clamp(0.0, MAX_GRID_CELLS_PER_AXIS) as usize
        };

        let mut cells: HashMap<(usize, usize), Vec<usize>> = HashMap::new();
        for (idx, seg) in segments.iter().enumerate() {
            let (smin, smax) = (seg.min(), seg.max());
            for cx in cell(smin.x, lo.x)..=cell(smax.x, lo.x) {
                for cy in cell(smin.y, lo.y)..=cell(smax.y, lo.y) {
                    cells.entry((cx, cy)).or_default().push(idx);
                }
            }
        }

        Some(Self { cells })
    }

    /// Average segment length, but never so small that the drawing spans
    /// more than `MAX_GRID_CELLS_PER_AXIS` cells.
    fn cell_size(segments: &[LineSegment], extent: f64) -> f64 {
        let count = segments.len().max(1) as f64;
        let average: f64 = segments
            .iter()
            .map(|seg| (seg.end - seg.start).length() / count)
            .sum();
        let floor = extent / MAX_GRID_CELLS_PER_AXIS;
        let size = if average.is_finite() {
            average.max(floor)
        } else {
            floor
        };
        if size.is_finite() && size > 0.0 {
            size
        } else {
            1.0
        }
    }

    fn candidate_pairs(&self) -> Vec<(usize, usize)> {
        let mut pairs = BTreeSet::new();
        for members in self.cells.values() {
            for (a, &i) in members.iter().enumerate() {
                for &j in &members[(a + 1)..] {
                    pairs.insert((i.min(j), i.max(j)));
                }
            }
        }
        pairs.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(x1: f64, y1: f64, x2: f64, y2: f64, from: i64, to: i64) -> LineSegment {
        LineSegment {
            start: Position::new(x1, y1),
            end: Position::new(x2, y2),
            from_node: NodeId(from),
            to_node: NodeId(to),
            edge: 0,
        }
    }

    #[test]
    fn test_segments_intersect_crossing() {
        // An X pattern: (0,0)-(10,10) crosses (0,10)-(10,0)
        let s1 = seg(0.0, 0.0, 10.0, 10.0, 1, 2);
        let s2 = seg(0.0, 10.0, 10.0, 0.0, 3, 4);
        assert!(segments_intersect(&s1, &s2));
        assert!(segments_intersect(&s2, &s1));
    }

    #[test]
    fn test_segments_no_intersect_parallel() {
        let s1 = seg(0.0, 0.0, 10.0, 0.0, 1, 2);
        let s2 = seg(0.0, 5.0, 10.0, 5.0, 3, 4);
        assert!(!segments_intersect(&s1, &s2));
    }

    #[test]
    fn test_segments_no_intersect_separate_collinear() {
        let s1 = seg(0.0, 0.0, 5.0, 0.0, 1, 2);
        let s2 = seg(10.0, 0.0, 15.0, 0.0, 3, 4);
        assert!(!segments_intersect(&s1, &s2));
    }

    #[test]
    fn test_segments_collinear_overlap_counts() {
        let s1 = seg(0.0, 0.0, 10.0, 0.0, 1, 2);
        let s2 = seg(5.0, 0.0, 15.0, 0.0, 3, 4);
        assert!(segments_intersect(&s1, &s2));
    }

    #[test]
    fn test_segments_touching_counts() {
        // T junction: s2 ends on the interior of s1
        let s1 = seg(0.0, 0.0, 10.0, 0.0, 1, 2);
        let s2 = seg(5.0, 5.0, 5.0, 0.0, 3, 4);
        assert!(segments_intersect(&s1, &s2));
    }

    #[test]
    fn test_segments_shared_endpoint() {
        // Two edges sharing node 2 -- not a crossing
        let s1 = seg(0.0, 0.0, 5.0, 5.0, 1, 2);
        let s2 = seg(5.0, 5.0, 10.0, 0.0, 2, 3);
        assert!(!segments_intersect(&s1, &s2));

        // Shared node even when the geometry overlaps completely
        let s3 = seg(0.0, 0.0, 10.0, 0.0, 1, 2);
        let s4 = seg(0.0, 0.0, 10.0, 0.0, 1, 2);
        assert!(!segments_intersect(&s3, &s4));
    }

    #[test]
    fn test_degenerate_segment_is_a_point() {
        // Both endpoints of s2 sit at the same spot on s1's interior
        let s1 = seg(0.0, 0.0, 10.0, 0.0, 1, 2);
        let on = seg(4.0, 0.0, 4.0, 0.0, 3, 4);
        let off = seg(4.0, 1.0, 4.0, 1.0, 3, 4);
        assert!(segments_intersect(&s1, &on));
        assert!(!segments_intersect(&s1, &off));

        // Two coincident points
        let p = seg(1.0, 1.0, 1.0, 1.0, 5, 6);
        let q = seg(1.0, 1.0, 1.0, 1.0, 7, 8);
        assert!(segments_intersect(&p, &q));
    }

    #[test]
    fn test_count_crossings_known() {
        let segments = vec![
            seg(0.0, 0.0, 10.0, 10.0, 1, 2), // diagonal up-right
            seg(0.0, 10.0, 10.0, 0.0, 3, 4), // diagonal down-right (crosses s1)
            seg(20.0, 0.0, 30.0, 0.0, 5, 6), // far away horizontal
        ];
        assert_eq!(count_crossings(&segments, 256), 1);
        assert_eq!(count_crossing_edges(&segments, 256), 2);

        // One horizontal crossing two parallel verticals
        let segments2 = vec![
            seg(0.0, 5.0, 20.0, 5.0, 1, 2),
            seg(5.0, 0.0, 5.0, 10.0, 3, 4),
            seg(15.0, 0.0, 15.0, 10.0, 5, 6),
        ];
        assert_eq!(count_crossings(&segments2, 256), 2);
        assert_eq!(count_crossing_edges(&segments2, 256), 3);
    }

    #[test]
    fn test_grid_matches_brute_force() {
        // A lattice of horizontal and vertical edges: every horizontal
        // crosses every vertical.
        let mut segments = Vec::new();
        let mut id = 0;
        for i in 0..6 {
            let y = 10.0 + i as f64 * 15.0;
            segments.push(seg(0.0, y, 100.0, y, id, id + 1));
            id += 2;
        }
        for i in 0..5 {
            let x = 5.0 + i as f64 * 20.0;
            segments.push(seg(x, 0.0, x, 100.0, id, id + 1));
            id += 2;
        }
        let brute = crossing_pairs(&segments, usize::MAX);
        let grid = crossing_pairs(&segments, 0);
        assert_eq!(brute.len(), 30);
        assert_eq!(brute, grid);
    }

    #[test]
    fn test_graph_segments_skip_self_loops() {
        use crate::layout::graph::{Edge, Node};
        let graph = Graph::new(
            vec![Node::new(1, 0.0, 0.0), Node::new(2, 10.0, 0.0)],
            vec![Edge::new(1, 1), Edge::new(1, 2)],
        )
        .unwrap();
        let segments = graph_segments(&graph);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].edge, 1);
        assert_eq!(segments[0].end, Position::new(10.0, 0.0));
    }

    #[test]
    fn test_grid_handles_extreme_coordinates() {
        // one edge spanning most of f64, crossed by a vertical that also
        // crosses 299 short parallel edges
        let mut segments = vec![seg(-8e307, 0.0, 8e307, 0.0, 0, 1)];
        for i in 1..300 {
            let y = i as f64;
            segments.push(seg(0.0, y, 10.0, y, 2 * i, 2 * i + 1));
        }
        segments.push(seg(5.0, -0.5, 5.0, 299.5, 1000, 1001));
        assert_eq!(count_crossings(&segments, 256), 300);

        // vertical extent overflows f64: pairwise fallback
        segments.push(seg(20.0, -1e308, 30.0, -1e308, 1002, 1003));
        segments.push(seg(20.0, 1e308, 30.0, 1e308, 1004, 1005));
        assert_eq!(count_crossings(&segments, 256), 300);
        assert_eq!(count_crossing_edges(&segments, 256), 301);
    }

    #[test]
    fn test_grid_matches_brute_force_on_wide_drawing() {
        let mut segments = vec![seg(-1e150, -1e150, 1e150, 1e150, 0, 1)];
        for i in 1..40 {
            let x = i as f64 * 1e148;
            segments.push(seg(x, -1e150, x, 1e150, 2 * i, 2 * i + 1));
        }
        let brute = crossing_pairs(&segments, usize::MAX);
        assert_eq!(brute.len(), 39);
        assert_eq!(crossing_pairs(&segments, 0), brute);
    }
}
