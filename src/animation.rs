// Animation Loop - Fixed-interval ticks driving the simulation
// One task owns the state; scripted pointer events are dispatched between ticks

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::VisualizationConfig;
use crate::error::VisResult;
use crate::render::render_svg;
use crate::simulation::{Event, SimulationState, StateTransition};

// =============================================================================
// EVENT SCRIPT
// =============================================================================

/// Pointer or click input delivered before tick number `tick` runs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScriptedEvent {
    pub tick: u64,
    pub event: Event,
}

#[derive(Debug, Clone, Default)]
pub struct EventScript {
    pending: VecDeque<ScriptedEvent>,
}

impl EventScript {
    pub fn new(mut events: Vec<ScriptedEvent>) -> Self {
        // Stable sort keeps file order among events of the same tick
        events.sort_by_key(|e| e.tick);
        Self {
            pending: events.into(),
        }
    }

    /// Read a JSON array of scripted events
    pub fn from_path(path: &Path) -> VisResult<Self> {
        let file = File::open(path)?;
        let events: Vec<ScriptedEvent> = serde_json::from_reader(BufReader::new(file))?;
        Ok(Self::new(events))
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Pop every event scheduled at or before `tick`, in order
    fn take_due(&mut self, tick: u64) -> Vec<Event> {
        let mut due = Vec::new();
        while let Some(next) = self.pending.front() {
            if next.tick > tick {
                break;
            }
            due.push(next.event);
            self.pending.pop_front();
        }
        due
    }
}

// =============================================================================
// FRAME OUTPUT
// =============================================================================

/// Receives the state after every tick (and once before the first)
pub trait FrameSink {
    fn on_frame(&mut self, state: &SimulationState, config: &VisualizationConfig) -> VisResult<()>;
}

/// Writes `frame_NNNNNN.svg` (and optionally `.json` snapshots) every `every` ticks
pub struct FrameWriter {
    dir: PathBuf,
    every: u64,
    snapshots: bool,
    written: usize,
}

impl FrameWriter {
    pub fn new(dir: PathBuf, every: u64, snapshots: bool) -> VisResult<Self> {
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            every: every.max(1),
            snapshots,
            written: 0,
        })
    }

    pub fn frames_written(&self) -> usize {
        self.written
    }
}

impl FrameSink for FrameWriter {
    fn on_frame(&mut self, state: &SimulationState, config: &VisualizationConfig) -> VisResult<()> {
        if state.ticks % self.every != 0 {
            return Ok(());
        }

        let stem = format!("frame_{:06}", state.ticks);
        fs::write(self.dir.join(format!("{}.svg", stem)), render_svg(state, config))?;
        if self.snapshots {
            let json = serde_json::to_string_pretty(&state.snapshot(config))?;
            fs::write(self.dir.join(format!("{}.json", stem)), json)?;
        }
        self.written += 1;
        Ok(())
    }
}

// =============================================================================
// TICK LOOP
// =============================================================================

/// Run `ticks` ticks at `tick_interval_ms` and return the final state.
///
/// A slow tick delays the ones behind it; missed ticks fire back to back.
pub async fn run_animation<S: FrameSink>(
    mut state: SimulationState,
    config: &VisualizationConfig,
    mut script: EventScript,
    sink: &mut S,
    ticks: u64,
) -> VisResult<SimulationState> {
    let mut interval = tokio::time::interval(Duration::from_millis(config.tick_interval_ms));

    tracing::info!(
        bodies = state.bodies.len(),
        ticks,
        interval_ms = config.tick_interval_ms,
        "Starting animation"
    );
    sink.on_frame(&state, config)?;

    for _ in 0..ticks {
        interval.tick().await;

        for event in script.take_due(state.ticks) {
            let transition = state.handle_event(event, config);
            if transition != StateTransition::Unchanged {
                tracing::debug!(tick = state.ticks, ?event, ?transition, "Pointer event");
            }
        }

        if let StateTransition::HoverFaded { index } = state.handle_event(Event::Tick, config) {
            tracing::debug!(tick = state.ticks, index, "Hover faded out");
        }

        sink.on_frame(&state, config)?;
    }

    if !script.is_empty() {
        tracing::warn!("{} scripted events scheduled after the last tick were dropped", script.len());
    }

    Ok(state)
}

// =============================================================================
// TESTS
// =============================================================================
