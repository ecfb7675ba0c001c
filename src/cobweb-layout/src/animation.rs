// Copyright 2026 The Cobweb Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Frame driver: a scheduler produces ticks, and each tick runs a
//! [`FramePlan`] against a [`LayoutEngine`] and hands the resulting
//! positions to a [`PositionSink`].

use std::time::Duration;

use log::{debug, warn};

use crate::common::Result;
use crate::layout::LayoutEngine;
use crate::layout::graph::NodePosition;

/// Receives the full position set once per rendered frame. Positions are
/// keyed by node id, so a renderer can apply them incrementally.
pub trait PositionSink {
    fn update(&mut self, positions: &[NodePosition]) -> Result<()>;
}

/// Keeps every frame in memory.
#[derive(Debug, Default)]
pub struct FrameRecorder {
    pub frames: Vec<Vec<NodePosition>>,
}

impl PositionSink for FrameRecorder {
    fn update(&mut self, positions: &[NodePosition]) -> Result<()> {
        self.frames.push(positions.to_vec());
        Ok(())
    }
}

/// What runs on every frame, in order: randomize, force steps, an untangle
/// pass every `untangle_every` frames, then box enforcement.
#[derive(Clone, Debug, PartialEq)]
pub struct FramePlan {
    pub randomize: bool,
    /// Drift intensity; `None` uses the engine's configured default.
    pub drift: Option<f64>,
    pub steps_per_frame: usize,
    /// Half-size of the origin-centred box nodes are clamped into.
    pub box_size: Option<f64>,
    pub untangle_every: Option<u64>,
}

impl Default for FramePlan {
    fn default() -> Self {
        Self {
            randomize: true,
            drift: None,
            steps_per_frame: 1,
            box_size: None,
            untangle_every: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameTick {
    pub index: u64,
    /// Time since the first tick.
    pub elapsed: Duration,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    Rendered,
    /// The sink rejected the frame.
    Skipped,
}

pub struct Animator<E: LayoutEngine, S: PositionSink> {
    engine: E,
    sink: S,
    plan: FramePlan,
    buffer: Vec<NodePosition>,
    rendered: u64,
    skipped: u64,
}

impl<E: LayoutEngine, S: PositionSink> Animator<E, S> {
    pub fn new(engine: E, sink: S, plan: FramePlan) -> Self {
        Self {
            engine,
            sink,
            plan,
            buffer: Vec::new(),
            rendered: 0,
            skipped: 0,
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn plan(&self) -> &FramePlan {
        &self.plan
    }

    pub fn frames_rendered(&self) -> u64 {
        self.rendered
    }

    pub fn frames_skipped(&self) -> u64 {
        self.skipped
    }

    /// Run one frame of the plan and push the positions to the sink. A sink
    /// failure is logged and the frame counted as skipped.
    pub fn on_frame(&mut self, tick: FrameTick) -> FrameOutcome {
        if self.plan.randomize {
            self.engine.randomize_node_positions(self.plan.drift);
        }
        for _ in 0..self.plan.steps_per_frame {
            self.engine.step();
        }
        if let Some(period) = self.plan.untangle_every
            && period > 0
            && (tick.index + 1) % period == 0
        {
            let crossings = self.engine.count_graph_intersections(false);
            debug!("frame {}: {} crossings after untangle", tick.index, crossings);
        }
        if let Some(size) = self.plan.box_size {
            self.engine.inside_box(size, true);
        }

        self.buffer.clear();
        self.buffer.extend(self.engine.node_positions());
        match self.sink.update(&self.buffer) {
            Ok(()) => {
                self.rendered += 1;
                FrameOutcome::Rendered
            }
            Err(err) => {
                warn!("skipping frame {}: {}", tick.index, err);
                self.skipped += 1;
                FrameOutcome::Skipped
            }
        }
    }

    /// Drive frames from `scheduler` until it stops; returns the number of
    /// ticks delivered.
    pub fn run<Sch: FrameScheduler + ?Sized>(&mut self, scheduler: &mut Sch) -> u64 {
        let ticks = scheduler.run(&mut |tick| {
            self.on_frame(tick);
        });
        debug!(
            "animation stopped after {} ticks ({} rendered, {} skipped)",
            ticks, self.rendered, self.skipped
        );
        ticks
    }

    pub fn into_parts(self) -> (E, S) {
        (self.engine, self.sink)
    }
}

/// Source of frame ticks.
pub trait FrameScheduler {
    /// Call `frame` once per tick until the schedule ends. Returns the number
    /// of ticks delivered.
    fn run(&mut self, frame: &mut dyn FnMut(FrameTick)) -> u64;
}

/// Delivers a fixed number of ticks back to back, with `elapsed` advancing
/// as if frames arrived at `frame_rate_hz`.
#[derive(Clone, Debug)]
pub struct HeadlessScheduler {
    frames: u64,
    interval: Duration,
}

impl HeadlessScheduler {
    pub fn new(frames: u64, frame_rate_hz: f64) -> Self {
        let interval = if frame_rate_hz.is_finite() && frame_rate_hz > 0.0 {
            Duration::from_secs_f64(1.0 / frame_rate_hz)
        } else {
            Duration::ZERO
        };
        Self { frames, interval }
    }
}

impl FrameScheduler for HeadlessScheduler {
    fn run(&mut self, frame: &mut dyn FnMut(FrameTick)) -> u64 {
        for index in 0..self.frames {
            frame(FrameTick {
                index,
                elapsed: self.interval.saturating_mul(index.min(u32::MAX as u64) as u32),
            });
        }
        self.frames
    }
}
