// Orbit Integrator - Planar Kepler orbits for the comet scene
// Solves Kepler's equation each tick and maps the result onto the drawn ellipse

use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

// =============================================================================
// CONSTANTS
// =============================================================================

/// Days per Julian year; elapsed time is counted in days
pub const TIME_UNITS_PER_YEAR: f64 = 365.25;

/// Absolute residual at which the Newton iteration stops
pub const KEPLER_TOLERANCE: f64 = 1e-6;

/// Iteration cap; the best estimate is returned once it is hit
pub const KEPLER_MAX_ITERATIONS: usize = 1000;

/// Finest outline sampling, radians; about 63k points per orbit
pub const MIN_ORBIT_SAMPLE_STEP: f64 = 1e-4;

// =============================================================================
// 2D VECTOR MATHEMATICS
// =============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
pub struct Vector2 {
    pub x: f64,
    pub y: f64,
}

impl Vector2 {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn add(&self, other: &Vector2) -> Vector2 {
        Vector2 {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }

    pub fn sub(&self, other: &Vector2) -> Vector2 {
        Vector2 {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }

    pub fn distance(&self, other: &Vector2) -> f64 {
        self.sub(other).magnitude()
    }
}

// =============================================================================
// ORBITAL ELEMENTS
// =============================================================================

/// Elements of one comet as read from the catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrbitalElements {
    pub name: String,
    /// Perihelion distance (AU)
    pub perihelion: f64,
    /// Aphelion distance (AU)
    pub aphelion: f64,
    /// Eccentricity (0-1 for elliptical)
    pub eccentricity: f64,
    /// Minimum orbit intersection distance (AU), only sizes the marker
    pub moid: f64,
    /// Orbital period (years)
    pub period: f64,
}

/// How the drawn ellipse is derived from the elements.
///
/// `Legacy` keeps the historical visuals: the semi-minor axis is
/// `scale * sqrt(a * q * Q * (1 - e^2))` and the marker sits at the true
/// anomaly on the parametric ellipse. `Standard` uses `b = a * sqrt(1 - e^2)`
/// and places the marker at the eccentric anomaly, which is where a body on
/// a Kepler orbit actually is.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum GeometryModel {
    #[default]
    Legacy,
    Standard,
}

/// Scaled ellipse for one comet, computed once at load time
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct OrbitGeometry {
    pub semi_major_axis: f64,
    pub semi_minor_axis: f64,
    /// Shared drawing center of every orbit
    pub center: Vector2,
    /// Distance from the center to the focus along the major axis
    pub focus_offset: f64,
    pub marker_radius: f64,
    pub model: GeometryModel,
}

impl OrbitGeometry {
    pub fn new(elements: &OrbitalElements, scale: f64, center: Vector2, model: GeometryModel) -> Self {
        let q = elements.perihelion;
        let big_q = elements.aphelion;
        let e = elements.eccentricity;

        let semi_major_axis = scale * (q + big_q) / 2.0;
        let semi_minor_axis = match model {
            // Mixes scaled and unscaled lengths; kept for the existing visuals
            GeometryModel::Legacy => scale * (semi_major_axis * q * big_q * (1.0 - e * e)).sqrt(),
            GeometryModel::Standard => semi_major_axis * (1.0 - e * e).sqrt(),
        };

        Self {
            semi_major_axis,
            semi_minor_axis,
            center,
            focus_offset: e * semi_major_axis,
            marker_radius: elements.moid * scale,
            model,
        }
    }

    /// Position of the body relative to the orbit center at `elapsed_time`
    pub fn position_at(&self, elements: &OrbitalElements, elapsed_time: f64, solver: &KeplerSolver) -> Vector2 {
        match self.model {
            GeometryModel::Legacy => position(
                elements,
                self.semi_major_axis,
                self.semi_minor_axis,
                elapsed_time,
                solver,
            ),
            GeometryModel::Standard => {
                let m = mean_anomaly(elements.period, elapsed_time, solver.time_units_per_year);
                let solution = solver.solve(m, elements.eccentricity);
                let ecc = solution.eccentric_anomaly;
                Vector2::new(
                    self.semi_major_axis * ecc.cos(),
                    self.semi_minor_axis * ecc.sin(),
                )
            }
        }
    }

    /// Absolute surface position at `elapsed_time`
    pub fn surface_position(&self, elements: &OrbitalElements, elapsed_time: f64, solver: &KeplerSolver) -> Vector2 {
        self.center.add(&self.position_at(elements, elapsed_time, solver))
    }

    /// Where the sun is drawn for this orbit
    pub fn focus(&self) -> Vector2 {
        Vector2::new(self.center.x + self.focus_offset, self.center.y)
    }
}

// =============================================================================
// KEPLER SOLVER
// =============================================================================

/// Outcome of one Newton-Raphson solve
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeplerSolution {
    pub eccentric_anomaly: f64,
    /// |E - e*sin(E) - M| at the returned estimate
    pub residual: f64,
    pub iterations: usize,
    pub converged: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeplerSolver {
    pub tolerance: f64,
    pub max_iterations: usize,
    pub time_units_per_year: f64,
}

impl Default for KeplerSolver {
    fn default() -> Self {
        Self {
            tolerance: KEPLER_TOLERANCE,
            max_iterations: KEPLER_MAX_ITERATIONS,
            time_units_per_year: TIME_UNITS_PER_YEAR,
        }
    }
}

impl KeplerSolver {
    /// Solve Kepler's equation M = E - e*sin(E) using Newton-Raphson
    pub fn solve(&self, mean_anomaly: f64, eccentricity: f64) -> KeplerSolution {
        let mut e_anom = mean_anomaly; // Initial guess
        let mut residual = e_anom - eccentricity * e_anom.sin() - mean_anomaly;
        let mut iterations = 0;

        while residual.abs() >= self.tolerance && iterations < self.max_iterations {
            let f_prime = 1.0 - eccentricity * e_anom.cos();
            e_anom -= residual / f_prime;
            residual = e_anom - eccentricity * e_anom.sin() - mean_anomaly;
            iterations += 1;
        }

        let converged = residual.abs() < self.tolerance;
        if !converged {
            tracing::debug!(
                mean_anomaly,
                eccentricity,
                residual,
                "Kepler iteration hit the cap, using best estimate"
            );
        }

        KeplerSolution {
            eccentric_anomaly: e_anom,
            residual: residual.abs(),
            iterations,
            converged,
        }
    }
}

/// Mean anomaly in [0, 2π) for a period in years and elapsed time in days.
/// Reducing by whole turns leaves every position unchanged.
pub fn mean_anomaly(period: f64, elapsed_time: f64, time_units_per_year: f64) -> f64 {
    let years = elapsed_time / time_units_per_year;
    ((TAU / period) * years).rem_euclid(TAU)
}

/// True anomaly from eccentric anomaly
pub fn true_anomaly(eccentric_anomaly: f64, eccentricity: f64) -> f64 {
    2.0 * ((1.0 + eccentricity).sqrt() * (eccentric_anomaly / 2.0).sin())
        .atan2((1.0 - eccentricity).sqrt() * (eccentric_anomaly / 2.0).cos())
}

/// Planar position relative to the orbit center at `elapsed_time`.
///
/// Pure function of its inputs. The point is taken on the parametric ellipse
/// at the true anomaly, without a focal offset.
pub fn position(
    elements: &OrbitalElements,
    semi_major_axis: f64,
    semi_minor_axis: f64,
    elapsed_time: f64,
    solver: &KeplerSolver,
) -> Vector2 {
    let e = elements.eccentricity;
    let m = mean_anomaly(elements.period, elapsed_time, solver.time_units_per_year);
    let solution = solver.solve(m, e);
    let nu = true_anomaly(solution.eccentric_anomaly, e);

    Vector2::new(semi_major_axis * nu.cos(), semi_minor_axis * nu.sin())
}

/// Orbit outline relative to the center, sampled every `step` radians over [0, 2π)
pub fn orbit_path(geometry: &OrbitGeometry, step: f64) -> Vec<Vector2> {
    let step = step.max(MIN_ORBIT_SAMPLE_STEP);
    let samples = (TAU / step).ceil() as usize;
    (0..samples)
        .map(|i| i as f64 * step)
        .filter(|angle| *angle < TAU)
        .map(|angle| {
            Vector2::new(
                geometry.semi_major_axis * angle.cos(),
                geometry.semi_minor_axis * angle.sin(),
            )
        })
        .collect()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn halley_like() -> OrbitalElements {
        OrbitalElements {
            name: "1P/Halley".to_string(),
            perihelion: 0.5,
            aphelion: 5.0,
            eccentricity: 0.8,
            moid: 0.06,
            period: 76.0,
        }
    }

    fn elements_with(e: f64) -> OrbitalElements {
        OrbitalElements {
            eccentricity: e,
            ..halley_like()
        }
    }

    #[test]
    fn test_kepler_equation_circular() {
        // For circular orbit e=0, E = M
        let solution = KeplerSolver::default().solve(1.0, 0.0);
        assert!((solution.eccentric_anomaly - 1.0).abs() < 1e-10);
        assert!(solution.converged);
        assert_eq!(solution.iterations, 0);
    }

    #[test]
    fn test_kepler_equation_eccentric() {
        let solution = KeplerSolver::default().solve(0.5, 0.5);
        // Verify: E - 0.5*sin(E) should equal 0.5
        let check = solution.eccentric_anomaly - 0.5 * solution.eccentric_anomaly.sin();
        assert!((check - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_kepler_residual_sweep() {
        let solver = KeplerSolver::default();
        for &e in &[0.0, 0.3, 0.6, 0.9] {
            let mut m = 0.0;
            while m < TAU {
                let solution = solver.solve(m, e);
                let ecc = solution.eccentric_anomaly;
                let residual = (ecc - e * ecc.sin() - m).abs();
                assert!(residual < 1e-6, "e={} M={} residual={}", e, m, residual);
                assert!(solution.converged);
                m += 0.05;
            }
        }
    }

    #[test]
    fn test_iteration_cap_returns_best_estimate() {
        let solver = KeplerSolver {
            max_iterations: 1,
            tolerance: 1e-15,
            ..Default::default()
        };
        let solution = solver.solve(2.0, 0.9);
        assert_eq!(solution.iterations, 1);
        assert!(!solution.converged);
        assert!(solution.eccentric_anomaly.is_finite());
    }

    #[test]
    fn test_near_parabolic_stops_at_cap() {
        let solver = KeplerSolver::default();
        for i in 1..=50 {
            let m = TAU - i as f64 * 1e-3;
            let solution = solver.solve(m, 0.995);
            assert!(solution.iterations <= KEPLER_MAX_ITERATIONS);
            assert_eq!(solution.converged, solution.residual < KEPLER_TOLERANCE);
        }
    }

    #[test]
    fn test_position_lies_on_ellipse() {
        let solver = KeplerSolver::default();
        for &e in &[0.0, 0.3, 0.6, 0.9] {
            let elements = elements_with(e);
            let geometry = OrbitGeometry::new(&elements, 20.0, Vector2::zero(), GeometryModel::Legacy);
            let (a, b) = (geometry.semi_major_axis, geometry.semi_minor_axis);
            for step in 0..200 {
                let t = step as f64 * 137.0;
                let p = position(&elements, a, b, t, &solver);
                let on_ellipse = (p.x / a).powi(2) + (p.y / b).powi(2);
                assert!((on_ellipse - 1.0).abs() < 1e-9, "e={} t={} -> {}", e, t, on_ellipse);
            }
        }
    }

    #[test]
    fn test_position_is_periodic() {
        let solver = KeplerSolver::default();
        let elements = halley_like();
        let geometry = OrbitGeometry::new(&elements, 20.0, Vector2::zero(), GeometryModel::Legacy);
        let one_orbit = elements.period * TIME_UNITS_PER_YEAR;

        for &t in &[0.0, 10.0, 1234.5, 9000.0] {
            let p1 = geometry.position_at(&elements, t, &solver);
            let p2 = geometry.position_at(&elements, t + one_orbit, &solver);
            assert!(p1.distance(&p2) < 1e-6, "t={} {:?} vs {:?}", t, p1, p2);
        }
    }

    #[test]
    fn test_starts_at_perihelion() {
        let solver = KeplerSolver::default();
        let elements = halley_like();
        for model in [GeometryModel::Legacy, GeometryModel::Standard] {
            let geometry = OrbitGeometry::new(&elements, 20.0, Vector2::zero(), model);
            let p = geometry.position_at(&elements, 0.0, &solver);
            assert!((p.x - geometry.semi_major_axis).abs() < 1e-12);
            assert!(p.y.abs() < 1e-12);
        }
    }

    #[test]
    fn test_legacy_golden_values() {
        let elements = halley_like();
        let geometry = OrbitGeometry::new(&elements, 20.0, Vector2::new(615.0, 375.0), GeometryModel::Legacy);

        assert!((geometry.semi_major_axis - 55.0).abs() < 1e-12);
        // 20 * sqrt(55 * 0.5 * 5 * 0.36) = 20 * sqrt(49.5)
        assert!((geometry.semi_minor_axis - 140.712_472_794_702_88).abs() < 1e-9);
        assert!((geometry.focus_offset - 44.0).abs() < 1e-12);
        assert!((geometry.marker_radius - 1.2).abs() < 1e-12);

        let p = geometry.surface_position(&elements, 0.0, &KeplerSolver::default());
        assert!((p.x - 670.0).abs() < 1e-12);
        assert!((p.y - 375.0).abs() < 1e-12);
    }

    #[test]
    fn test_standard_model_axes() {
        let elements = halley_like();
        let geometry = OrbitGeometry::new(&elements, 20.0, Vector2::zero(), GeometryModel::Standard);
        assert!((geometry.semi_major_axis - 55.0).abs() < 1e-12);
        assert!((geometry.semi_minor_axis - 33.0).abs() < 1e-12);
        assert!(geometry.semi_major_axis >= geometry.semi_minor_axis);

        // Perihelion seen from the focus is a(1 - e)
        let p = geometry.position_at(&elements, 0.0, &KeplerSolver::default());
        assert!((p.x - geometry.focus_offset - 11.0).abs() < 1e-9);
    }

    #[test]
    fn test_true_anomaly_half_orbit() {
        // At E = π the body is at aphelion regardless of eccentricity
        for &e in &[0.0, 0.5, 0.9] {
            let nu = true_anomaly(std::f64::consts::PI, e);
            assert!((nu.abs() - std::f64::consts::PI).abs() < 1e-9);
        }
    }

    #[test]
    fn test_orbit_path_sampling() {
        let elements = halley_like();
        let geometry = OrbitGeometry::new(&elements, 20.0, Vector2::zero(), GeometryModel::Standard);
        let path = orbit_path(&geometry, 0.01);
        assert_eq!(path.len(), 629);
        assert!((path[0].x - 55.0).abs() < 1e-12);
        for p in &path {
            let on_ellipse = (p.x / 55.0).powi(2) + (p.y / 33.0).powi(2);
            assert!((on_ellipse - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_orbit_path_step_has_a_floor() {
        let geometry = OrbitGeometry::new(&halley_like(), 20.0, Vector2::zero(), GeometryModel::Standard);
        let finest = orbit_path(&geometry, MIN_ORBIT_SAMPLE_STEP).len();
        assert_eq!(orbit_path(&geometry, 1e-12).len(), finest);
        assert_eq!(finest, 62_832);
    }
}
