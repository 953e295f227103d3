mod app;
mod config;
mod events;
mod layout;
mod util;

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use crate::layout::LayoutState;

/// Simulated frame length for headless relaxation.
const HEADLESS_FRAME_SECONDS: f32 = 1.0 / 60.0;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Event records as a JSON array (or an object with an `events` array).
    #[arg(long)]
    events: PathBuf,

    /// Layout configuration JSON; built-in defaults when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Relax without a window and print the final frame as JSON.
    #[arg(long)]
    headless: bool,

    /// Tick budget for `--headless` before giving up on settling.
    #[arg(long, default_value_t = 2000)]
    max_ticks: usize,
}

fn main() -> Result<()> {
    // stdout carries the headless snapshot, so logs go to stderr.
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("epoch_rings=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = config::load_config(args.config.as_deref())?;

    if args.headless {
        return run_headless(&args, config);
    }

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    let events_path = args.events.clone();
    eframe::run_native(
        "epoch-rings",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::EpochRingsApp::new(
                cc,
                events_path.clone(),
                config.clone(),
            )))
        }),
    )
    .map_err(|error| anyhow!("viewer failed: {error}"))
}

fn run_headless(args: &Args, config: config::LayoutConfig) -> Result<()> {
    let events = events::load_events(&args.events)?;
    let mut layout = LayoutState::new(events, config).context("failed to build layout")?;

    let mut ticks = 0;
    while ticks < args.max_ticks && !layout.is_settled() {
        layout.tick(HEADLESS_FRAME_SECONDS);
        ticks += 1;
    }
    if layout.is_settled() {
        tracing::info!(ticks, "layout settled");
    } else {
        tracing::warn!(ticks, energy = layout.energy(), "tick budget exhausted before settling");
    }

    let snapshot = serde_json::to_string_pretty(&layout.snapshot())
        .context("failed to serialize frame snapshot")?;
    println!("{snapshot}");

    let diagnostics = layout.diagnostics();
    tracing::info!(
        nodes = layout.nodes().len(),
        edges = layout.edges().len(),
        unresolved_links = diagnostics.unresolved_links(),
        unplaced = diagnostics.unplaced_nodes(),
        "headless run finished"
    );
    Ok(())
}
