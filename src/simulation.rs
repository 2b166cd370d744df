// Simulation State - Explicit scene state and event dispatch
// Ticks and pointer input all go through `handle_event`

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::catalog::CometCatalog;
use crate::config::VisualizationConfig;
use crate::orbit::{OrbitGeometry, OrbitalElements, Vector2};

// =============================================================================
// TRACKED BODIES
// =============================================================================

#[derive(Debug, Clone)]
pub struct TrackedComet {
    pub elements: OrbitalElements,
    pub geometry: OrbitGeometry,
    /// Current marker center in surface coordinates
    pub position: Vector2,
}

impl TrackedComet {
    pub fn contains(&self, point: &Vector2) -> bool {
        self.position.distance(point) <= self.geometry.marker_radius
    }

    pub fn tooltip_lines(&self) -> Vec<String> {
        vec![
            format!("Name: {}", self.elements.name),
            format!("Orbital Period: {} years", self.elements.period),
            format!("Eccentricity: {}", self.elements.eccentricity),
        ]
    }
}

// =============================================================================
// EVENTS
// =============================================================================

/// Input to the simulation, from the timer or the pointer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    Tick,
    PointerMove { x: f64, y: f64 },
    Click,
}

/// What an event changed
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StateTransition {
    Advanced { elapsed_time: f64 },
    HoverStarted { index: usize },
    TooltipMoved { index: usize },
    HoverEnded { index: usize },
    HoverFaded { index: usize },
    Dismissed { index: usize },
    Unchanged,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HoverPhase {
    /// Pointer is over the marker
    Active,
    /// Pointer left; orbit and tooltip fade out
    Fading { remaining_ms: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hover {
    pub index: usize,
    pub phase: HoverPhase,
    /// Tooltip corner while the pointer is over the marker
    pub anchor: Vector2,
}

// =============================================================================
// SIMULATION STATE
// =============================================================================

/// Orbit outline of a body that lost the hover to another marker
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FadingPath {
    pub index: usize,
    pub remaining_ms: u64,
}

#[derive(Debug, Clone)]
pub struct SimulationState {
    pub bodies: Vec<TrackedComet>,
    /// Simulated days since start
    pub elapsed_time: f64,
    pub hover: Option<Hover>,
    pub trail: Option<FadingPath>,
    /// Last pointer position, re-checked after markers move
    pub pointer: Option<Vector2>,
    pub ticks: u64,
}

impl SimulationState {
    /// Build geometry for every comet and place markers at t = 0
    pub fn new(catalog: CometCatalog, config: &VisualizationConfig) -> Self {
        let center = config.center();
        let solver = config.kepler_solver();

        let bodies = catalog
            .into_elements()
            .into_iter()
            .map(|elements| {
                let geometry =
                    OrbitGeometry::new(&elements, config.scale, center, config.geometry_model);
                let position = geometry.surface_position(&elements, 0.0, &solver);
                TrackedComet {
                    elements,
                    geometry,
                    position,
                }
            })
            .collect();

        Self {
            bodies,
            elapsed_time: 0.0,
            hover: None,
            trail: None,
            pointer: None,
            ticks: 0,
        }
    }

    pub fn handle_event(&mut self, event: Event, config: &VisualizationConfig) -> StateTransition {
        match event {
            Event::Tick => self.tick(config),
            Event::PointerMove { x, y } => self.pointer_move(Vector2::new(x, y), config),
            Event::Click => self.click(),
        }
    }

    fn tick(&mut self, config: &VisualizationConfig) -> StateTransition {
        self.elapsed_time += config.time_step;
        self.ticks += 1;

        let solver = config.kepler_solver();
        let t = self.elapsed_time;
        for body in self.bodies.iter_mut() {
            body.position = body.geometry.surface_position(&body.elements, t, &solver);
        }

        self.trail = self.trail.and_then(|trail| {
            let remaining_ms = trail.remaining_ms.saturating_sub(config.tick_interval_ms);
            (remaining_ms > 0).then_some(FadingPath { remaining_ms, ..trail })
        });

        if let Some(hover) = self.hover {
            match hover.phase {
                HoverPhase::Fading { remaining_ms } => {
                    let remaining_ms = remaining_ms.saturating_sub(config.tick_interval_ms);
                    if remaining_ms == 0 {
                        self.hover = None;
                        return StateTransition::HoverFaded { index: hover.index };
                    }
                    self.hover = Some(Hover {
                        phase: HoverPhase::Fading { remaining_ms },
                        ..hover
                    });
                }
                HoverPhase::Active => {
                    // The marker can slide out from under a pointer that stands still
                    let still_under = match (self.pointer, self.bodies.get(hover.index)) {
                        (Some(pointer), Some(body)) => body.contains(&pointer),
                        _ => false,
                    };
                    if !still_under {
                        self.leave(hover, config);
                        return StateTransition::HoverEnded { index: hover.index };
                    }
                }
            }
        }

        StateTransition::Advanced { elapsed_time: t }
    }

    fn pointer_move(&mut self, point: Vector2, config: &VisualizationConfig) -> StateTransition {
        self.pointer = Some(point);
        let offset = Vector2::new(config.tooltip_offset, config.tooltip_offset);
        let anchor = point.add(&offset);

        match (self.hover, self.hit_test(&point)) {
            (Some(hover), Some(index))
                if hover.index == index && hover.phase == HoverPhase::Active =>
            {
                self.hover = Some(Hover { anchor, ..hover });
                StateTransition::TooltipMoved { index }
            }
            (previous, Some(index)) => {
                // The marker we leave keeps fading its outline
                if let Some(previous) = previous.filter(|h| h.index != index) {
                    let remaining_ms = match previous.phase {
                        HoverPhase::Active => config.path_fade_ms,
                        HoverPhase::Fading { remaining_ms } => remaining_ms,
                    };
                    self.trail = (remaining_ms > 0).then_some(FadingPath {
                        index: previous.index,
                        remaining_ms,
                    });
                }
                if self.trail.is_some_and(|trail| trail.index == index) {
                    self.trail = None;
                }
                self.hover = Some(Hover {
                    index,
                    phase: HoverPhase::Active,
                    anchor,
                });
                StateTransition::HoverStarted { index }
            }
            (Some(hover), None) if hover.phase == HoverPhase::Active => {
                self.leave(hover, config);
                StateTransition::HoverEnded { index: hover.index }
            }
            _ => StateTransition::Unchanged,
        }
    }

    fn leave(&mut self, hover: Hover, config: &VisualizationConfig) {
        self.hover = if config.path_fade_ms == 0 {
            None
        } else {
            Some(Hover {
                phase: HoverPhase::Fading {
                    remaining_ms: config.path_fade_ms,
                },
                ..hover
            })
        };
    }

    fn click(&mut self) -> StateTransition {
        self.trail = None;
        match self.hover.take() {
            Some(hover) => StateTransition::Dismissed { index: hover.index },
            None => StateTransition::Unchanged,
        }
    }

    /// Topmost marker under `point`; later bodies are drawn on top
    pub fn hit_test(&self, point: &Vector2) -> Option<usize> {
        self.bodies.iter().rposition(|body| body.contains(point))
    }

    /// Orbit outline opacity for body `index`
    pub fn path_opacity(&self, index: usize, config: &VisualizationConfig) -> f64 {
        match (self.hover, self.trail) {
            (Some(hover), _) if hover.index == index => hover_opacity(hover.phase, config),
            (_, Some(trail)) if trail.index == index => hover_opacity(
                HoverPhase::Fading {
                    remaining_ms: trail.remaining_ms,
                },
                config,
            ),
            _ => 0.0,
        }
    }

    pub fn tooltip(&self, config: &VisualizationConfig) -> Option<TooltipView> {
        let hover = self.hover?;
        let body = self.bodies.get(hover.index)?;

        // A fading tooltip follows the comet instead of the pointer
        let position = match hover.phase {
            HoverPhase::Active => hover.anchor,
            HoverPhase::Fading { .. } => {
                Vector2::new(body.position.x, body.position.y - config.tooltip_offset)
            }
        };

        Some(TooltipView {
            index: hover.index,
            lines: body.tooltip_lines(),
            x: position.x,
            y: position.y,
            opacity: hover_opacity(hover.phase, config),
        })
    }

    pub fn simulated_date(&self, epoch: NaiveDate) -> Option<NaiveDate> {
        epoch.checked_add_days(Days::new(self.elapsed_time.floor() as u64))
    }

    pub fn snapshot(&self, config: &VisualizationConfig) -> SceneSnapshot {
        let bodies = self
            .bodies
            .iter()
            .enumerate()
            .map(|(index, b)| BodySnapshot {
                name: b.elements.name.clone(),
                x: b.position.x,
                y: b.position.y,
                radius: b.geometry.marker_radius,
                path_opacity: self.path_opacity(index, config),
            })
            .collect();

        SceneSnapshot {
            elapsed_time: self.elapsed_time,
            simulated_date: self
                .simulated_date(config.epoch)
                .map(|d| d.format("%Y-%m-%d").to_string()),
            bodies,
            tooltip: self.tooltip(config),
        }
    }
}

fn hover_opacity(phase: HoverPhase, config: &VisualizationConfig) -> f64 {
    match phase {
        HoverPhase::Active => 1.0,
        HoverPhase::Fading { remaining_ms } if config.path_fade_ms > 0 => {
            remaining_ms as f64 / config.path_fade_ms as f64
        }
        HoverPhase::Fading { .. } => 0.0,
    }
}

// =============================================================================
// SERIALIZABLE SNAPSHOT
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TooltipView {
    pub index: usize,
    pub lines: Vec<String>,
    pub x: f64,
    pub y: f64,
    pub opacity: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BodySnapshot {
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub path_opacity: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneSnapshot {
    pub elapsed_time: f64,
    pub simulated_date: Option<String>,
    pub bodies: Vec<BodySnapshot>,
    pub tooltip: Option<TooltipView>,
}

// =============================================================================
// TESTS
// =============================================================================
