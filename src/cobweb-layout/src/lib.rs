// Copyright 2026 The Cobweb Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

#![forbid(unsafe_code)]

pub mod animation;
pub mod common;
pub mod json;
pub mod layout;

#[cfg(test)]
mod layout_proptest;

pub use self::animation::{
    Animator, FramePlan, FrameRecorder, FrameScheduler, FrameTick, HeadlessScheduler,
    PositionSink,
};
pub use self::common::{Error, ErrorCode, ErrorKind, Result};
pub use self::json::{EdgeData, GraphData, NodeData};
pub use self::layout::bounds::BoxReport;
pub use self::layout::config::LayoutConfig;
pub use self::layout::graph::{Edge, Graph, Node, NodeId, NodePosition, Position};
pub use self::layout::sfdp::StepReport;
pub use self::layout::tree::{NotATree, TreeFacts, TreeSummary};
pub use self::layout::{BestOfReport, ForceLayout, LayoutEngine, Phase, SettleReport};
