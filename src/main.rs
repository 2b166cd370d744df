use clap::Parser;
use std::path::PathBuf;

use comet_orbits::{run, RunOptions};

#[derive(Parser, Debug)]
#[command(name = "comet-orbits", about = "Render animated comet orbits as SVG frames")]
struct Args {
    /// JSON config file; built-in defaults when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Comet table, overrides `data_path` from the config
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// JSON array of scripted pointer events
    #[arg(short, long)]
    events: Option<PathBuf>,

    #[arg(short, long, default_value = "frames")]
    out: PathBuf,

    #[arg(short, long, default_value = "1000")]
    ticks: u64,

    /// Write a frame every N ticks
    #[arg(long, default_value = "10")]
    frame_every: u64,

    /// Also write JSON scene snapshots next to the SVG frames
    #[arg(long)]
    snapshots: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    run(RunOptions {
        config_path: args.config,
        data_path: args.data,
        events_path: args.events,
        output_dir: args.out,
        ticks: args.ticks,
        frame_every: args.frame_every,
        snapshots: args.snapshots,
    })
    .await
}
