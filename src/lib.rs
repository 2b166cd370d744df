// Comet Orbits - Animated Kepler orbits of near-Earth comets
// Library entry point; the binary in main.rs only parses arguments

pub mod animation;
pub mod catalog;
pub mod config;
pub mod error;
pub mod orbit;
pub mod render;
pub mod simulation;

use anyhow::Context;
use std::path::PathBuf;

pub use animation::{run_animation, EventScript, FrameSink, FrameWriter, ScriptedEvent};
pub use catalog::{CometCatalog, CometRow};
pub use config::VisualizationConfig;
pub use error::{VisError, VisResult};
pub use orbit::{
    mean_anomaly, orbit_path, position, true_anomaly, GeometryModel, KeplerSolution, KeplerSolver,
    OrbitGeometry, OrbitalElements, Vector2,
};
pub use render::render_svg;
pub use simulation::{Event, SceneSnapshot, SimulationState, StateTransition, TrackedComet};

/// Everything the binary resolved from its arguments
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub config_path: Option<PathBuf>,
    pub data_path: Option<PathBuf>,
    pub events_path: Option<PathBuf>,
    pub output_dir: PathBuf,
    pub ticks: u64,
    pub frame_every: u64,
    pub snapshots: bool,
}

pub async fn run(options: RunOptions) -> anyhow::Result<()> {
    let mut config = match &options.config_path {
        Some(path) => VisualizationConfig::from_path(path)
            .with_context(|| format!("failed to load config {:?}", path))?,
        None => VisualizationConfig::default(),
    };
    if let Some(data_path) = options.data_path.clone() {
        config.data_path = data_path;
    }
    config.validate()?;

    // A missing or unreadable table still shows the empty scene
    let catalog = match CometCatalog::from_path(&config.data_path) {
        Ok(catalog) => catalog,
        Err(err) => {
            tracing::error!("Failed to load data from {:?}: {}", config.data_path, err);
            CometCatalog::default()
        }
    };

    let script = match &options.events_path {
        Some(path) => EventScript::from_path(path)
            .with_context(|| format!("failed to load events {:?}", path))?,
        None => EventScript::default(),
    };

    let state = SimulationState::new(catalog, &config);
    let mut writer = FrameWriter::new(options.output_dir.clone(), options.frame_every, options.snapshots)
        .with_context(|| format!("failed to create output dir {:?}", options.output_dir))?;

    let state = run_animation(state, &config, script, &mut writer, options.ticks).await?;

    tracing::info!(
        frames = writer.frames_written(),
        elapsed_days = state.elapsed_time,
        "Animation finished, frames in {:?}",
        options.output_dir
    );
    Ok(())
}
