//! Least-squares intersection of lines of bearing

use nalgebra::{DMatrix, DVector};
use tracing::{debug, warn};

use super::projection::{Projector, UtmProjection};
use crate::core::{BearingReading, Fix, DEFAULT_SINGULAR_RATIO_TOLERANCE, MIN_OBSERVATIONS};
use crate::validation::error::TriangulationError;

/// A line of bearing in the planar frame: `a*x + b*y = c`.
///
/// `(a, b) = (dy, -dx)` where `(dx, dy) = (sin θ, cos θ)` is the compass
/// direction (0° = +y north, 90° = +x east), so `(a, b)` is a unit normal
/// and `a*x + b*y - c` is the signed perpendicular distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanarLine {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl PlanarLine {
    /// Line through `(x0, y0)` along compass bearing `bearing_deg`
    pub fn from_bearing(x0: f64, y0: f64, bearing_deg: f64) -> Self {
        let rad = bearing_deg.to_radians();
        let (dx, dy) = (rad.sin(), rad.cos());
        Self {
            a: dy,
            b: -dx,
            c: dy * x0 - dx * y0,
        }
    }

    /// Unit direction vector `(dx, dy)` of the bearing
    pub fn direction(&self) -> (f64, f64) {
        (-self.b, self.a)
    }

    pub fn signed_distance(&self, x: f64, y: f64) -> f64 {
        self.a * x + self.b * y - self.c
    }
}

/// Outcome of the planar least-squares step
#[derive(Debug, Clone, PartialEq)]
struct PlanarSolution {
    x: f64,
    y: f64,
    /// Only available for overdetermined systems
    residual_sum_of_squares: Option<f64>,
}

/// Triangulates a transmitter position from compass bearings
#[derive(Debug, Clone)]
pub struct BearingTriangulator<P: Projector = UtmProjection> {
    projector: P,
    /// Smallest accepted `σ_min / σ_max` of the line matrix
    pub singular_ratio_tolerance: f64,
}

impl Default for BearingTriangulator<UtmProjection> {
    fn default() -> Self {
        Self::new(UtmProjection::default())
    }
}

impl<P: Projector> BearingTriangulator<P> {
    pub fn new(projector: P) -> Self {
        Self {
            projector,
            singular_ratio_tolerance: DEFAULT_SINGULAR_RATIO_TOLERANCE,
        }
    }

    pub fn with_tolerance(mut self, singular_ratio_tolerance: f64) -> Self {
        self.singular_ratio_tolerance = singular_ratio_tolerance;
        self
    }

    pub fn projector(&self) -> &P {
        &self.projector
    }

    /// Find the point with minimal summed squared perpendicular distance to
    /// every line of bearing.
    pub fn solve(&self, readings: &[BearingReading]) -> Result<Fix, TriangulationError> {
        let n = readings.len();
        if n < MIN_OBSERVATIONS {
            return Err(TriangulationError::InsufficientObservations {
                available: n,
                required: MIN_OBSERVATIONS,
            });
        }

        if let Some((index, reading)) = readings.iter().enumerate().find(|(_, r)| !r.is_finite()) {
            warn!(index, ?reading, "non-finite bearing reading");
            return Err(TriangulationError::numeric(format!(
                "reading {} is not finite: {:?}",
                index, reading
            )));
        }

        let (origin, lines) = self.planar_lines(readings)?;
        let solution = self.least_squares(&lines)?;

        let (lat, lon) = self
            .projector
            .unproject(solution.x + origin.0, solution.y + origin.1)?;

        // Exactly determined systems have no residual to speak of
        let error_meters = solution
            .residual_sum_of_squares
            .map(|rss| (rss / n as f64).sqrt())
            .unwrap_or(0.0);

        if !error_meters.is_finite() {
            return Err(TriangulationError::numeric("residual is not finite"));
        }

        debug!(observations = n, lat, lon, error_meters, "bearing fix computed");

        Ok(Fix {
            latitude: lat,
            longitude: lon,
            error_meters,
            observations: n,
        })
    }

    /// Project readings and build their lines relative to the first reading
    fn planar_lines(
        &self,
        readings: &[BearingReading],
    ) -> Result<((f64, f64), Vec<PlanarLine>), TriangulationError> {
        let mut origin = None;
        let mut lines = Vec::with_capacity(readings.len());

        for reading in readings {
            let (x, y) = self.projector.project(reading.lat, reading.lon)?;
            let (ox, oy) = *origin.get_or_insert((x, y));
            lines.push(PlanarLine::from_bearing(x - ox, y - oy, reading.bearing));
        }

        Ok((origin.unwrap_or((0.0, 0.0)), lines))
    }

    fn least_squares(&self, lines: &[PlanarLine]) -> Result<PlanarSolution, TriangulationError> {
        let n = lines.len();
        let a = DMatrix::from_fn(n, 2, |i, j| if j == 0 { lines[i].a } else { lines[i].b });
        let b = DVector::from_iterator(n, lines.iter().map(|l| l.c));

        let svd = a.clone().svd(true, true);
        let sigma_max = svd.singular_values.iter().cloned().fold(0.0_f64, f64::max);
        let sigma_min = svd.singular_values.iter().cloned().fold(f64::INFINITY, f64::min);
        let singular_ratio = if sigma_max > 0.0 { sigma_min / sigma_max } else { 0.0 };

        // Written so that a NaN ratio is rejected as well
        if !(singular_ratio > self.singular_ratio_tolerance) {
            debug!(
                observations = n,
                singular_ratio,
                tolerance = self.singular_ratio_tolerance,
                "bearings are parallel or nearly so"
            );
            return Err(TriangulationError::DegenerateGeometry {
                singular_ratio,
                tolerance: self.singular_ratio_tolerance,
            });
        }

        let eps = self.singular_ratio_tolerance * sigma_max;
        let p = svd
            .solve(&b, eps)
            .map_err(|e| TriangulationError::numeric(format!("least squares solve failed: {}", e)))?;

        let (x, y) = (p[0], p[1]);
        if !x.is_finite() || !y.is_finite() {
            warn!(x, y, "least squares produced a non-finite point");
            return Err(TriangulationError::numeric("least squares produced a non-finite point"));
        }

        let residual_sum_of_squares = if n > 2 {
            Some((&a * &p - &b).norm_squared())
        } else {
            None
        };

        Ok(PlanarSolution {
            x,
            y,
            residual_sum_of_squares,
        })
    }
}
