//! Geodetic constants and solver defaults

/// WGS84 semi-major axis (meters)
pub const WGS84_SEMI_MAJOR_AXIS: f64 = 6378137.0;

/// WGS84 flattening
pub const WGS84_FLATTENING: f64 = 1.0 / 298.257223563;

/// UTM central scale factor
pub const UTM_SCALE_FACTOR: f64 = 0.9996;

/// UTM false easting (meters)
pub const UTM_FALSE_EASTING: f64 = 500000.0;

/// UTM false northing for the southern hemisphere (meters)
pub const UTM_FALSE_NORTHING_SOUTH: f64 = 10000000.0;

/// Default UTM zone, 78°E to 84°E (EPSG:32644)
pub const DEFAULT_UTM_ZONE: u8 = 44;

/// Two lines of bearing are the minimum for a fix
pub const MIN_OBSERVATIONS: usize = 2;

/// Smallest accepted ratio of the smallest to largest singular value
/// of the line-of-bearing matrix. Roughly 0.11 degrees between bearings.
pub const DEFAULT_SINGULAR_RATIO_TOLERANCE: f64 = 1e-3;

/// Observer tag assigned to wire observations that carry none
pub const DEFAULT_SOURCE_ID: &str = "P01";
