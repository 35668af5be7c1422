use std::{io, path::PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use curriculum::{handshake_steps, journey_steps, layer, Layer, LayerKey, LAYERS};
use explorer::{
    config::load_settings,
    console,
    views::{layers, HandshakeView, JourneyView},
};
use sequencer::{Sequencer, SpeedDial, StepObserver};
use shared::domain::SpeedFactor;
use tokio::io::BufReader;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "explorer", about = "Interactive tour of the TCP/IP model")]
struct Cli {
    /// Settings file; defaults to ./explorer.toml when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Playback speed multiplier, e.g. 2 or 0.5x.
    #[arg(long, global = true, value_parser = console::parse_speed)]
    speed: Option<SpeedFactor>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Describe the four layers.
    Layers {
        #[arg(long)]
        layer: Option<LayerKey>,
        #[arg(long)]
        json: bool,
    },
    /// Follow an HTTP request down the client stack and up the server's.
    Journey {
        #[arg(long)]
        once: bool,
    },
    /// Watch SYN, SYN-ACK, ACK and the first data segment.
    Handshake {
        #[arg(long)]
        once: bool,
    },
    /// Six questions on what the other commands cover.
    Quiz,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut settings = load_settings(cli.config.as_deref())?;
    if let Some(speed) = cli.speed {
        settings.speed = speed;
    }
    init_tracing(&settings.log_filter);
    debug!(?settings, "settings loaded");
    let dials = settings.speed_dials();

    match cli.command {
        Command::Layers { layer: key, json } => show_layers(key, json),
        Command::Journey { once } => {
            let dial = dials.journey;
            let sequencer = Sequencer::new(
                "journey",
                journey_steps(),
                dial.clone(),
                JourneyView::new(io::stdout()),
            )?;
            simulate(&sequencer, &dial, once).await
        }
        Command::Handshake { once } => {
            let dial = dials.handshake;
            let sequencer = Sequencer::new(
                "handshake",
                handshake_steps(),
                dial.clone(),
                HandshakeView::new(io::stdout()),
            )?;
            simulate(&sequencer, &dial, once).await
        }
        Command::Quiz => {
            console::run_quiz(BufReader::new(tokio::io::stdin()), io::stdout()).await
        }
    }
}

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn show_layers(key: Option<LayerKey>, json: bool) -> anyhow::Result<()> {
    let selected: Vec<&Layer> = match key {
        Some(key) => vec![layer(key)],
        None => LAYERS.iter().collect(),
    };
    let mut out = io::stdout().lock();
    if json {
        layers::write_json(&mut out, &selected).context("failed to write layers as json")
    } else {
        layers::write_stack(&mut out, &selected).context("failed to write layers")
    }
}

async fn simulate<S, O>(
    sequencer: &Sequencer<S, O>,
    dial: &SpeedDial,
    once: bool,
) -> anyhow::Result<()>
where
    S: Send + Sync + 'static,
    O: StepObserver<S>,
{
    if once {
        let outcome = console::play_once(sequencer).await?;
        info!(sequencer = %sequencer.label(), ?outcome, "single run finished");
        return Ok(());
    }

    let stdin = BufReader::new(tokio::io::stdin());
    console::run_simulation(sequencer, dial, stdin, io::stdout()).await
}
