//! Geodetic <-> planar projection for bearing geometry
//!
//! Lines of bearing are only straight in a conformal planar frame, so every
//! reading is projected into a fixed UTM zone before solving. The zone is a
//! deployment constant taken from configuration. Features:
//! - WGS84 transverse Mercator via the Krüger series (4th order in n)
//! - Sub-millimeter round trip inside the zone
//! - No zone-validity check: out-of-zone input degrades silently
//!
//! Axis convention: inputs are `(lat, lon)` in degrees, outputs are
//! `(x, y) = (easting, northing)` in meters.

use crate::core::{
    DEFAULT_UTM_ZONE, UTM_FALSE_EASTING, UTM_FALSE_NORTHING_SOUTH, UTM_SCALE_FACTOR,
    WGS84_FLATTENING, WGS84_SEMI_MAJOR_AXIS,
};
use crate::validation::error::ProjectionError;

/// Conversion between geographic and local planar coordinates
pub trait Projector: Send + Sync {
    /// Map `(lat, lon)` degrees to `(x, y)` meters
    fn project(&self, lat: f64, lon: f64) -> Result<(f64, f64), ProjectionError>;

    /// Map `(x, y)` meters back to `(lat, lon)` degrees
    fn unproject(&self, x: f64, y: f64) -> Result<(f64, f64), ProjectionError>;
}

/// Krüger series coefficients for an ellipsoid
#[derive(Debug, Clone, Copy)]
struct KrugerSeries {
    /// Rectifying radius
    rectifying_radius: f64,
    eccentricity: f64,
    alpha: [f64; 4],
    beta: [f64; 4],
    delta: [f64; 4],
}

impl KrugerSeries {
    fn new(semi_major_axis: f64, flattening: f64) -> Self {
        let n = flattening / (2.0 - flattening);
        let n2 = n * n;
        let n3 = n2 * n;
        let n4 = n3 * n;

        Self {
            rectifying_radius: semi_major_axis / (1.0 + n) * (1.0 + n2 / 4.0 + n4 / 64.0),
            eccentricity: (flattening * (2.0 - flattening)).sqrt(),
            alpha: [
                n / 2.0 - 2.0 / 3.0 * n2 + 5.0 / 16.0 * n3 + 41.0 / 180.0 * n4,
                13.0 / 48.0 * n2 - 3.0 / 5.0 * n3 + 557.0 / 1440.0 * n4,
                61.0 / 240.0 * n3 - 103.0 / 140.0 * n4,
                49561.0 / 161280.0 * n4,
            ],
            beta: [
                n / 2.0 - 2.0 / 3.0 * n2 + 37.0 / 96.0 * n3 - 1.0 / 360.0 * n4,
                1.0 / 48.0 * n2 + 1.0 / 15.0 * n3 - 437.0 / 1440.0 * n4,
                17.0 / 480.0 * n3 - 37.0 / 840.0 * n4,
                4397.0 / 161280.0 * n4,
            ],
            delta: [
                2.0 * n - 2.0 / 3.0 * n2 - 2.0 * n3 + 116.0 / 45.0 * n4,
                7.0 / 3.0 * n2 - 8.0 / 5.0 * n3 - 227.0 / 45.0 * n4,
                56.0 / 15.0 * n3 - 136.0 / 35.0 * n4,
                4279.0 / 630.0 * n4,
            ],
        }
    }

    fn wgs84() -> Self {
        Self::new(WGS84_SEMI_MAJOR_AXIS, WGS84_FLATTENING)
    }
}

/// Universal Transverse Mercator projection for a single fixed zone
#[derive(Debug, Clone, Copy)]
pub struct UtmProjection {
    zone: u8,
    northern: bool,
    /// Central meridian (radians)
    central_meridian: f64,
    series: KrugerSeries,
}

impl Default for UtmProjection {
    fn default() -> Self {
        Self::new(DEFAULT_UTM_ZONE, true)
    }
}

impl UtmProjection {
    /// Projection for `zone` (clamped to 1..=60) in the given hemisphere
    pub fn new(zone: u8, northern: bool) -> Self {
        let zone = zone.clamp(1, 60);
        Self {
            zone,
            northern,
            central_meridian: Self::central_meridian_deg(zone).to_radians(),
            series: KrugerSeries::wgs84(),
        }
    }

    /// Projection for the zone containing a position
    pub fn for_position(lat: f64, lon: f64) -> Self {
        Self::new(Self::zone_for_longitude(lon), lat >= 0.0)
    }

    pub fn zone(&self) -> u8 {
        self.zone
    }

    pub fn is_northern(&self) -> bool {
        self.northern
    }

    /// EPSG code of the equivalent WGS84 / UTM coordinate reference system
    pub fn epsg_code(&self) -> u32 {
        let base = if self.northern { 32600 } else { 32700 };
        base + self.zone as u32
    }

    pub fn zone_for_longitude(lon: f64) -> u8 {
        let zone = ((lon + 180.0) / 6.0).floor() as i64 + 1;
        zone.clamp(1, 60) as u8
    }

    pub fn central_meridian_deg(zone: u8) -> f64 {
        zone as f64 * 6.0 - 183.0
    }

    fn false_northing(&self) -> f64 {
        if self.northern { 0.0 } else { UTM_FALSE_NORTHING_SOUTH }
    }
}

impl Projector for UtmProjection {
    fn project(&self, lat: f64, lon: f64) -> Result<(f64, f64), ProjectionError> {
        if !lat.is_finite() || !lon.is_finite() {
            return Err(ProjectionError::NonFiniteGeodetic { lat, lon });
        }
        if lat.abs() > 90.0 {
            return Err(ProjectionError::LatitudeOutOfRange(lat));
        }

        let s = &self.series;
        let sin_phi = lat.to_radians().sin();
        let dlon = lon.to_radians() - self.central_meridian;

        // Conformal latitude, then Gauss-Schreiber coordinates
        let t = (sin_phi.atanh() - s.eccentricity * (s.eccentricity * sin_phi).atanh()).sinh();
        let xi_p = t.atan2(dlon.cos());
        let eta_p = (dlon.sin() / (1.0 + t * t).sqrt()).atanh();

        let mut xi = xi_p;
        let mut eta = eta_p;
        for (j, a) in s.alpha.iter().enumerate() {
            let k = 2.0 * (j + 1) as f64;
            xi += a * (k * xi_p).sin() * (k * eta_p).cosh();
            eta += a * (k * xi_p).cos() * (k * eta_p).sinh();
        }

        let scale = UTM_SCALE_FACTOR * s.rectifying_radius;
        let x = UTM_FALSE_EASTING + scale * eta;
        let y = self.false_northing() + scale * xi;

        if !x.is_finite() || !y.is_finite() {
            return Err(ProjectionError::Diverged);
        }
        Ok((x, y))
    }

    fn unproject(&self, x: f64, y: f64) -> Result<(f64, f64), ProjectionError> {
        if !x.is_finite() || !y.is_finite() {
            return Err(ProjectionError::NonFinitePlanar { x, y });
        }

        let s = &self.series;
        let scale = UTM_SCALE_FACTOR * s.rectifying_radius;
        let xi = (y - self.false_northing()) / scale;
        let eta = (x - UTM_FALSE_EASTING) / scale;

        let mut xi_p = xi;
        let mut eta_p = eta;
        for (j, b) in s.beta.iter().enumerate() {
            let k = 2.0 * (j + 1) as f64;
            xi_p -= b * (k * xi).sin() * (k * eta).cosh();
            eta_p -= b * (k * xi).cos() * (k * eta).sinh();
        }

        let chi = (xi_p.sin() / eta_p.cosh()).asin();
        let mut phi = chi;
        for (j, d) in s.delta.iter().enumerate() {
            let k = 2.0 * (j + 1) as f64;
            phi += d * (k * chi).sin();
        }
        let lambda = self.central_meridian + eta_p.sinh().atan2(xi_p.cos());

        let (lat, lon) = (phi.to_degrees(), lambda.to_degrees());
        if !lat.is_finite() || !lon.is_finite() {
            return Err(ProjectionError::Diverged);
        }
        Ok((lat, lon))
    }
}
