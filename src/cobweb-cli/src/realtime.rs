// Copyright 2026 The Cobweb Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::time::Duration;

use anyhow::{Context, Result};
use cobweb_layout::{FrameScheduler, FrameTick};
use tokio::runtime::{Builder, Runtime};
use tokio::time::{Instant, MissedTickBehavior, interval};

/// Ticks on a wall-clock interval until `frames` ticks were delivered or the
/// process gets Ctrl-C. Ticks missed while a frame ran long are dropped
/// rather than replayed.
pub struct IntervalScheduler {
    runtime: Runtime,
    frames: Option<u64>,
    period: Duration,
}

impl IntervalScheduler {
    pub fn new(frames: Option<u64>, frame_rate_hz: f64) -> Result<Self> {
        let runtime = Builder::new_current_thread()
            .enable_time()
            .enable_io()
            .build()
            .context("building frame timer runtime")?;
        let period = Duration::try_from_secs_f64(1.0 / frame_rate_hz)
            .with_context(|| format!("invalid frame rate {frame_rate_hz}"))?
            .max(Duration::from_micros(100));
        Ok(Self {
            runtime,
            frames,
            period,
        })
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}

impl FrameScheduler for IntervalScheduler {
    fn run(&mut self, frame: &mut dyn FnMut(FrameTick)) -> u64 {
        let period = self.period;
        let frames = self.frames;

        self.runtime.block_on(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let shutdown = tokio::signal::ctrl_c();
            tokio::pin!(shutdown);

            let start = Instant::now();
            let mut index = 0;
            while frames.is_none_or(|n| index < n) {
                tokio::select! {
                    _ = ticker.tick() => {}
                    _ = &mut shutdown => {
                        tracing::info!("interrupted after {index} frames");
                        break;
                    }
                }
                frame(FrameTick {
                    index,
                    elapsed: start.elapsed(),
                });
                index += 1;
            }
            index
        })
    }
}
