//! FrameScope - Main Entry Point
//!
//! Registers archive sources, drives the shared cursor, runs the transform
//! pipeline and prints what each display slot would show.

use anyhow::Context;
use clap::Parser;
use framescope_rs::{
    config::ViewerConfig,
    crosshair::{readout, CrosshairSync},
    manager::{RefreshReport, SourceManager},
    pipeline::{Pipeline, SlotView},
    source::parse_entries,
    types::Part,
};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "framescope", version, about = "Navigate archived multi-channel frames")]
struct Cli {
    /// Archive paths; `name:path` groups files into one source, commas allowed
    entries: Vec<String>,

    /// Add a synthetic random source
    #[arg(long)]
    random: bool,

    /// Jump every source to this index
    #[arg(long, value_name = "N")]
    jump: Option<usize>,

    /// Set the shared layer
    #[arg(long, value_name = "L")]
    layer: Option<usize>,

    /// Emit only the source with this display name
    #[arg(long, value_name = "NAME")]
    select: Option<String>,

    /// Enable a pipeline stage (repeatable)
    #[arg(long = "stage", value_name = "NAME")]
    stages: Vec<String>,

    /// Shared crosshair column to read out in every slot
    #[arg(long, value_name = "COL")]
    column: Option<usize>,

    /// Config file instead of the default location
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

fn report_failures(what: &str, report: &RefreshReport) {
    for (id, err) in &report.failures {
        tracing::warn!("{} left source {} stale: {}", what, id, err);
    }
}

fn describe(slot: usize, part: &Part) -> String {
    let (rows, cols) = part.shape();
    let channels = match (part.channel_ids.first(), part.channel_ids.last()) {
        (Some(first), Some(last)) => format!("{}..={}", first, last),
        _ => "-".to_string(),
    };
    let values = match part.value_range() {
        Some((lo, hi)) => format!("[{:.3}, {:.3}]", lo, hi),
        None => "-".to_string(),
    };
    let ti = part.tick_info;
    format!(
        "slot {}: {}x{} channels {} ticks start={} period={} count={}{} values {}",
        slot,
        rows,
        cols,
        channels,
        ti.start,
        ti.period,
        ti.count,
        if part.tick_count_matches() { "" } else { " (mismatch)" },
        values
    )
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => ViewerConfig::load_from(path),
        None => ViewerConfig::load(),
    };
    let (config, config_error) = match loaded {
        Ok(config) => (config, None),
        Err(e) => (ViewerConfig::default(), Some(e)),
    };

    // Initialize logging
    let default_filter = config
        .log_filter
        .clone()
        .unwrap_or_else(|| "info,framescope_rs=debug".to_string());
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Some(e) = config_error {
        tracing::warn!("Failed to load config, using defaults: {}", e);
    }
    tracing::info!("Starting FrameScope");

    let mut manager = SourceManager::new();
    for spec in parse_entries(&cli.entries) {
        if let Err(e) = manager.register(&spec) {
            tracing::warn!("{}", e);
        }
    }
    if cli.random || cli.entries.is_empty() {
        manager.add_random(config.random_shapes.clone());
    }
    if manager.is_empty() {
        anyhow::bail!("no source could be registered");
    }

    if let Some(layer) = cli.layer {
        if let Some(report) = manager.set_layer(layer) {
            report_failures("Layer change", &report);
        }
    }
    if let Some(index) = cli.jump {
        report_failures("Jump", &manager.jump(index));
    }
    if let Some(name) = &cli.select {
        if !manager.select(name) {
            tracing::warn!("Showing all sources; {:?} did not select one", name);
        }
    }

    let mut stage_names = config.stages.clone();
    stage_names.extend(cli.stages.iter().cloned());
    let pipeline = Pipeline::from_names(&stage_names).context("invalid pipeline stage")?;
    let mut view = SlotView::new(pipeline);
    view.set_parts_from(&manager.emitted());

    let mut crosshair = CrosshairSync::new(config.slots);
    if let Some(column) = cli.column {
        crosshair.user_set_column(0, column);
    }

    let cursor = manager.cursor();
    println!("cursor: index {} layer {}", cursor.index, cursor.layer);
    for data in manager.get_all_sources_data() {
        println!("source {}: {} ({} part slot(s))", data.id, data.name, data.parts.len());
    }
    println!("stages: {:?}", view.pipeline().stage_names());

    let shown = view.output().iter().take(config.slots).enumerate();
    for (slot, part) in shown {
        match part {
            Some(part) => {
                println!("{}", describe(slot, part));
                if cli.column.is_some() {
                    if let Some(r) = crosshair.cursor(slot).and_then(|c| readout(part, c)) {
                        println!(
                            "  at column {} row {}: value {} channel {} time {}",
                            r.column, r.row, r.value, r.channel_id, r.time
                        );
                    }
                }
            }
            None => println!("slot {}: (no plane)", slot),
        }
    }
    let hidden = view.output().len().saturating_sub(config.slots);
    if hidden > 0 {
        println!("{} more part(s) not shown", hidden);
    }

    Ok(())
}
