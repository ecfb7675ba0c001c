// Copyright 2026 The Cobweb Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

mod demo;
mod realtime;
mod sink;

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use cobweb_layout::{
    Animator, BoxReport, ForceLayout, FramePlan, FrameScheduler, GraphData, HeadlessScheduler,
    LayoutConfig, LayoutEngine, TreeFacts,
};
use serde::Serialize;
use tracing::info;

use crate::realtime::IntervalScheduler;
use crate::sink::JsonLinesSink;

const DEFAULT_FRAMES: u64 = 120;
const DEFAULT_BOX_SIZE: f64 = 300.0;

#[derive(Parser, Debug)]
#[command(name = "cobweb", version, about = "Animate and analyse 2D graph layouts")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the animation loop and write per-frame positions as JSON lines
    Run(RunArgs),
    /// Print crossing counts, box containment, tree facts and charge energy
    Stats(StatsArgs),
}

#[derive(Args, Debug)]
struct SessionArgs {
    /// Graph JSON file; defaults to the built-in five-node star
    #[arg(long)]
    graph: Option<PathBuf>,

    /// Layout config JSON file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the config's random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Log every engine operation
    #[arg(long)]
    debug: bool,
}

#[derive(Args, Debug)]
struct RunArgs {
    #[command(flatten)]
    session: SessionArgs,

    /// Number of frames; unlimited with --realtime when omitted
    #[arg(long)]
    frames: Option<u64>,

    /// Pace frames at the configured frame rate instead of running flat out
    #[arg(long)]
    realtime: bool,

    /// Override the config's frame rate
    #[arg(long)]
    frame_rate: Option<f64>,

    /// Drift intensity per frame; defaults to the config's default_drift
    #[arg(long, allow_hyphen_values = true)]
    drift: Option<f64>,

    /// Force steps per frame
    #[arg(long, default_value_t = 1)]
    steps: usize,

    /// Clamp nodes into the origin-centred box of this half-size every frame
    #[arg(long)]
    box_size: Option<f64>,

    /// Run an untangle pass every N frames
    #[arg(long)]
    untangle_every: Option<u64>,

    /// Output file; defaults to stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct StatsArgs {
    #[command(flatten)]
    session: SessionArgs,

    /// Half-size of the containment box to report on
    #[arg(long, default_value_t = DEFAULT_BOX_SIZE, allow_hyphen_values = true)]
    box_size: f64,

    /// Run an untangle pass before counting crossings
    #[arg(long)]
    untangle: bool,

    /// Settle several seeded layouts first and keep the least crossed
    #[arg(long)]
    best_of: Option<usize>,
}

#[derive(Serialize)]
struct Stats {
    nodes: usize,
    edges: usize,
    graph_crossings: usize,
    crossing_edges: usize,
    inside_box: BoxReport,
    tree: TreeFacts,
    charge_energy: f64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Run(args) => run(args),
        Command::Stats(args) => stats(args),
    }
}

fn load_config(args: &SessionArgs) -> Result<LayoutConfig> {
    let mut config = match &args.config {
        Some(path) => LayoutConfig::from_json(&read(path)?)
            .with_context(|| format!("parsing config {}", path.display()))?,
        None => LayoutConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    config.debug |= args.debug;
    Ok(config)
}

fn load_graph(args: &SessionArgs) -> Result<GraphData> {
    match &args.graph {
        Some(path) => GraphData::from_json(&read(path)?)
            .with_context(|| format!("parsing graph {}", path.display())),
        None => Ok(demo::star()),
    }
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn open_layout(args: &SessionArgs, config: LayoutConfig) -> Result<ForceLayout> {
    let data = load_graph(args)?;
    ForceLayout::from_data(data, config).context("building layout")
}

fn run(args: RunArgs) -> Result<()> {
    let mut config = load_config(&args.session)?;
    if let Some(rate) = args.frame_rate {
        config.frame_rate_hz = rate;
    }
    let layout = open_layout(&args.session, config)?;
    let frame_rate_hz = layout.config().frame_rate_hz;

    let plan = FramePlan {
        randomize: true,
        drift: args.drift,
        steps_per_frame: args.steps,
        box_size: args.box_size,
        untangle_every: args.untangle_every,
    };

    let writer: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("creating {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let mut scheduler: Box<dyn FrameScheduler> = if args.realtime {
        Box::new(IntervalScheduler::new(args.frames, frame_rate_hz)?)
    } else {
        Box::new(HeadlessScheduler::new(
            args.frames.unwrap_or(DEFAULT_FRAMES),
            frame_rate_hz,
        ))
    };

    let mut animator = Animator::new(layout, JsonLinesSink::new(writer), plan);
    let ticks = animator.run(scheduler.as_mut());
    info!(
        ticks,
        rendered = animator.frames_rendered(),
        skipped = animator.frames_skipped(),
        "animation finished"
    );

    let (_layout, sink) = animator.into_parts();
    sink.finish().context("flushing output")?;
    Ok(())
}

fn collect_stats(layout: &mut ForceLayout, args: &StatsArgs) -> Stats {
    if let Some(attempts) = args.best_of {
        layout.settle_best_of(attempts);
    }
    let count_only = !args.untangle;
    let graph_crossings = layout.count_graph_intersections(count_only);
    let crossing_edges = layout.count_edges_intersections(true);

    Stats {
        nodes: layout.graph().node_count(),
        edges: layout.graph().edge_count(),
        graph_crossings,
        crossing_edges,
        inside_box: layout.inside_box(args.box_size, false),
        tree: layout.tree_facts(),
        charge_energy: layout.charge_energy(),
    }
}

fn stats(args: StatsArgs) -> Result<()> {
    let config = load_config(&args.session)?;
    let mut layout = open_layout(&args.session, config)?;
    let stats = collect_stats(&mut layout, &args);

    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &stats).context("writing stats")?;
    writeln!(stdout)?;
    Ok(())
}
