// Copyright 2026 The Cobweb Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::io::Write;

use cobweb_layout::{Error, ErrorCode, ErrorKind, NodePosition, PositionSink, Result};
use serde::Serialize;

#[derive(Serialize)]
struct FrameRecord<'a> {
    frame: u64,
    positions: &'a [NodePosition],
}

/// Writes one JSON object per frame: `{"frame": n, "positions": [...]}`.
pub struct JsonLinesSink<W: Write> {
    writer: W,
    frame: u64,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, frame: 0 }
    }

    pub fn frames_written(&self) -> u64 {
        self.frame
    }

    /// Flush and hand back the writer.
    pub fn finish(mut self) -> Result<W> {
        self.writer.flush().map_err(write_err)?;
        Ok(self.writer)
    }
}

fn write_err(err: std::io::Error) -> Error {
    Error::new(ErrorKind::Output, ErrorCode::SinkWrite, Some(err.to_string()))
}

impl<W: Write> PositionSink for JsonLinesSink<W> {
    fn update(&mut self, positions: &[NodePosition]) -> Result<()> {
        let record = FrameRecord {
            frame: self.frame,
            positions,
        };
        let line = serde_json::to_string(&record).map_err(|err| {
            Error::new(
                ErrorKind::Output,
                ErrorCode::JsonSerialization,
                Some(err.to_string()),
            )
        })?;
        writeln!(self.writer, "{line}").map_err(write_err)?;
        self.frame += 1;
        Ok(())
    }
}
