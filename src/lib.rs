use thiserror::Error;

pub mod gpxxml;
pub mod kinematics;
pub mod project;
pub mod report;

/// One point of a parsed track, in geographic coordinates.
///
/// `time` is Unix epoch seconds; `time` and `elev` are NaN when the source
/// document does not carry them, which downstream statistics tolerate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackPoint {
    pub time: f64,
    pub lon: f64,
    pub lat: f64,
    pub elev: f64,
}

/// Ordered track points in document order (not necessarily time-sorted).
pub type Track = Vec<TrackPoint>;

/// One track point after projection into a planar system, with `x`/`y` in the
/// target system's linear units (meters for the default EPSG:28353).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedPoint {
    pub time: f64,
    pub x: f64,
    pub y: f64,
    pub elev: f64,
}

/// Projected points, one-to-one and same-order with the source [`Track`].
pub type ProjectedTrack = Vec<ProjectedPoint>;

/// Pipeline settings, passed explicitly to whichever stage needs them.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// EPSG code of the input coordinates.
    pub source_epsg: u16,
    /// EPSG code of the planar system used for distance arithmetic.
    pub target_epsg: u16,
    /// Multiplier taking time deltas in seconds to hours.
    pub time_factor_hours: f64,
    /// Multiplier taking distances in meters to kilometers.
    pub distance_factor_km: f64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            source_epsg: 4326,
            target_epsg: 28353,
            time_factor_hours: 1.0 / 3600.0,
            distance_factor_km: 1.0 / 1000.0,
        }
    }
}

/// Failure to extract track points from a document.
///
/// A parse failure aborts the whole track rather than yielding a partial one;
/// silently dropped points would skew every downstream distance and speed.
/// Missing optional fields are represented as NaN instead, not as errors.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed XML at position {position}: {source}")]
    Xml {
        position: u64,
        #[source]
        source: quick_xml::Error,
    },
    #[error("document ended inside point {index}")]
    Truncated { index: usize },
    #[error("point {index}: missing required `{attr}` attribute")]
    MissingAttribute { index: usize, attr: &'static str },
    #[error("point {index}: invalid `{field}` value `{value}`")]
    InvalidValue {
        index: usize,
        field: &'static str,
        value: String,
    },
}

/// Failure to set up or apply a coordinate transform.
#[derive(Debug, Error)]
pub enum ProjectionError {
    #[error("unrecognized EPSG code {0}")]
    UnknownCrs(u16),
    #[error("coordinate transform failed: {0}")]
    Transform(#[from] proj4rs::errors::Error),
}
