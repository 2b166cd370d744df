// Visualization Config - Tunables for the comet scene
// Loaded from a JSON file; every field falls back to its default when absent

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::error::{VisError, VisResult};
use crate::orbit::{
    GeometryModel, KeplerSolver, Vector2, KEPLER_MAX_ITERATIONS, KEPLER_TOLERANCE,
    MIN_ORBIT_SAMPLE_STEP, TIME_UNITS_PER_YEAR,
};

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Scene, timing and styling parameters.
///
/// An example file overriding a few fields:
///
/// ```json
/// {
///   "data_path": "data/near-earth-comets.csv",
///   "viewport_width": 1920,
///   "viewport_height": 1080,
///   "geometry_model": "standard",
///   "epoch": "2024-01-01"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualizationConfig {
    pub data_path: PathBuf, // comet table (CSV with header row)

    pub viewport_width: f64,  // window width the surface is sized from
    pub viewport_height: f64, // window height the surface is sized from
    pub viewport_margin: f64, // subtracted from both dimensions

    pub scale: f64,               // pixels per AU
    pub time_step: f64,           // simulated days per tick
    pub tick_interval_ms: u64,    // wall time between ticks
    pub time_units_per_year: f64, // days per year for the mean anomaly

    pub kepler_tolerance: f64,
    pub kepler_max_iterations: usize,

    pub orbit_sample_step: f64, // radians between orbit outline samples
    pub path_fade_ms: u64,      // orbit/tooltip fade after pointer leaves

    pub geometry_model: GeometryModel,

    pub sun_href: String,
    pub sun_size: f64,

    pub marker_fill: String,
    pub marker_opacity: f64,
    pub orbit_stroke: String,
    pub orbit_stroke_width: f64,

    pub tooltip_offset: f64, // pixels between pointer and tooltip corner

    pub epoch: NaiveDate, // calendar date at elapsed time zero
}

impl Default for VisualizationConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("data/near-earth-comets.csv"),
            viewport_width: 1280.0,
            viewport_height: 800.0,
            viewport_margin: 50.0,
            scale: 20.0,
            time_step: 1.0,
            tick_interval_ms: 10,
            time_units_per_year: TIME_UNITS_PER_YEAR,
            kepler_tolerance: KEPLER_TOLERANCE,
            kepler_max_iterations: KEPLER_MAX_ITERATIONS,
            orbit_sample_step: 0.01,
            path_fade_ms: 2000,
            geometry_model: GeometryModel::Legacy,
            sun_href: "images/sun.png".to_string(),
            sun_size: 40.0,
            marker_fill: "#FDD692".to_string(),
            marker_opacity: 0.6,
            orbit_stroke: "grey".to_string(),
            orbit_stroke_width: 0.5,
            tooltip_offset: 10.0,
            // J2000 calendar day
            epoch: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or_default(),
        }
    }
}

impl VisualizationConfig {
    /// Read a JSON config file and validate it
    pub fn from_path(path: &Path) -> VisResult<Self> {
        let file = File::open(path)?;
        let config: Self = serde_json::from_reader(BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    /// Drawing surface size, fixed once at load time
    pub fn surface_size(&self) -> (f64, f64) {
        (
            self.viewport_width - self.viewport_margin,
            self.viewport_height - self.viewport_margin,
        )
    }

    /// Center of the drawing surface, shared by every orbit
    pub fn surface_center(&self) -> (f64, f64) {
        let (width, height) = self.surface_size();
        (width / 2.0, height / 2.0)
    }

    pub fn center(&self) -> Vector2 {
        let (x, y) = self.surface_center();
        Vector2::new(x, y)
    }

    pub fn kepler_solver(&self) -> KeplerSolver {
        KeplerSolver {
            tolerance: self.kepler_tolerance,
            max_iterations: self.kepler_max_iterations,
            time_units_per_year: self.time_units_per_year,
        }
    }

    pub fn validate(&self) -> VisResult<()> {
        let (width, height) = self.surface_size();
        if width <= 0.0 || height <= 0.0 {
            return Err(VisError::Config(format!(
                "surface {}x{} is empty after a {} margin",
                width, height, self.viewport_margin
            )));
        }
        if self.scale <= 0.0 {
            return Err(VisError::Config(format!("scale must be positive, got {}", self.scale)));
        }
        if self.time_step <= 0.0 {
            return Err(VisError::Config(format!(
                "time_step must be positive, got {}",
                self.time_step
            )));
        }
        if self.tick_interval_ms == 0 {
            return Err(VisError::Config("tick_interval_ms must be at least 1".to_string()));
        }
        if self.time_units_per_year <= 0.0 {
            return Err(VisError::Config(format!(
                "time_units_per_year must be positive, got {}",
                self.time_units_per_year
            )));
        }
        if self.orbit_sample_step.is_nan() || self.orbit_sample_step < MIN_ORBIT_SAMPLE_STEP {
            return Err(VisError::Config(format!(
                "orbit_sample_step must be at least {}, got {}",
                MIN_ORBIT_SAMPLE_STEP, self.orbit_sample_step
            )));
        }
        if self.kepler_tolerance <= 0.0 || self.kepler_max_iterations == 0 {
            return Err(VisError::Config(
                "kepler_tolerance and kepler_max_iterations must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
