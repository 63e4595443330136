//! Core data types for the triangulation system

use serde::{Deserialize, Serialize};

use super::constants::DEFAULT_SOURCE_ID;

/// A single (lat, lon, bearing) triple as consumed by the solver
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BearingReading {
    /// Observer latitude in decimal degrees
    pub lat: f64,
    /// Observer longitude in decimal degrees
    pub lon: f64,
    /// Compass bearing to the signal, degrees clockwise from true north
    pub bearing: f64,
}

impl BearingReading {
    pub fn new(lat: f64, lon: f64, bearing: f64) -> Self {
        Self { lat, lon, bearing }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite() && self.bearing.is_finite()
    }
}

impl From<(f64, f64, f64)> for BearingReading {
    fn from((lat, lon, bearing): (f64, f64, f64)) -> Self {
        Self::new(lat, lon, bearing)
    }
}

/// A recorded direction-finding observation belonging to one session.
///
/// Deserializes from the field device payload as well, where coordinates
/// arrive as `lat`/`lon` and the observer tag as `pango_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    #[serde(alias = "lat")]
    pub latitude: f64,
    #[serde(alias = "lon")]
    pub longitude: f64,
    pub bearing: f64,
    pub group_id: String,
    #[serde(alias = "pango_id", default = "default_source_id")]
    pub source_id: Option<String>,
}

fn default_source_id() -> Option<String> {
    Some(DEFAULT_SOURCE_ID.to_string())
}

impl Observation {
    pub fn new(group_id: impl Into<String>, latitude: f64, longitude: f64, bearing: f64) -> Self {
        Self {
            latitude,
            longitude,
            bearing,
            group_id: group_id.into(),
            source_id: None,
        }
    }

    pub fn with_source(mut self, source_id: impl Into<String>) -> Self {
        self.source_id = Some(source_id.into());
        self
    }

    pub fn reading(&self) -> BearingReading {
        BearingReading::new(self.latitude, self.longitude, self.bearing)
    }
}

/// Estimated transmitter position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fix {
    pub latitude: f64,
    pub longitude: f64,
    /// RMS perpendicular distance from the fix to the lines of bearing.
    /// Zero when the system is exactly determined.
    pub error_meters: f64,
    /// Number of readings the fix was computed from
    pub observations: usize,
}
