//! Per-point kinematics and aggregate statistics for a projected track.
//!
//! Deltas use an edge-aware centered-difference convention (the shape of
//! `numpy.gradient` with unit spacing): interior samples get
//! `(v[i+1] - v[i-1]) / 2`, the endpoints fall back to one-sided
//! differences. This approximates an instantaneous rate at every sample,
//! smoothing single-sample jitter, and must not be replaced with plain
//! consecutive differencing: boundary behavior changes every downstream
//! distance and speed figure.

use crate::{Config, ProjectedPoint};

/// Edge-aware centered differences over a sample sequence.
///
/// Lengths 0 and 1 yield `[]` and `[0.0]` so degenerate tracks flow through
/// the pipeline without special cases.
pub fn gradient(values: &[f64]) -> Vec<f64> {
    match values.len() {
        0 => Vec::new(),
        1 => vec![0.0],
        n => {
            let mut deltas = Vec::with_capacity(n);
            deltas.push(values[1] - values[0]);
            for i in 1..n - 1 {
                deltas.push((values[i + 1] - values[i - 1]) / 2.0);
            }
            deltas.push(values[n - 1] - values[n - 2]);
            deltas
        }
    }
}

/// Sum treating NaN entries as zero; an empty or all-NaN input sums to 0.
///
/// Folds from an explicit `+0.0` identity: the `Sum<f64>` identity is `-0.0`,
/// which would flip the sign of downstream divisions by a zero total.
pub fn nan_sum(values: &[f64]) -> f64 {
    values
        .iter()
        .copied()
        .filter(|v| !v.is_nan())
        .fold(0.0, |acc, v| acc + v)
}

/// Maximum ignoring NaN entries; NaN when no finite ordering exists.
pub fn nan_max(values: &[f64]) -> f64 {
    values
        .iter()
        .copied()
        .filter(|v| !v.is_nan())
        .fold(f64::NAN, f64::max)
}

/// Per-point delta series for a projected track, aligned by index with the
/// track itself.
#[derive(Debug, Clone, PartialEq)]
pub struct KinematicSeries {
    /// Distance deltas in the projection's linear units (meters).
    pub distance_m: Vec<f64>,
    /// Time deltas in seconds.
    pub time_s: Vec<f64>,
    /// Speed per point, in km/h under the default [`Config`] factors.
    pub speed_kmh: Vec<f64>,
}

impl KinematicSeries {
    /// Derive the series from a projected track.
    ///
    /// Gradient deltas are taken over x, y, and time independently before
    /// being combined. A zero or NaN time delta yields an infinite or NaN
    /// speed per IEEE division; callers reduce with NaN-aware folds.
    pub fn compute(track: &[ProjectedPoint], config: &Config) -> KinematicSeries {
        let xs: Vec<f64> = track.iter().map(|p| p.x).collect();
        let ys: Vec<f64> = track.iter().map(|p| p.y).collect();
        let times: Vec<f64> = track.iter().map(|p| p.time).collect();

        let dxs = gradient(&xs);
        let dys = gradient(&ys);
        let time_s = gradient(&times);

        let distance_m: Vec<f64> = dxs.iter().zip(&dys).map(|(dx, dy)| dx.hypot(*dy)).collect();
        let speed_kmh: Vec<f64> = distance_m
            .iter()
            .zip(&time_s)
            .map(|(d, t)| (d * config.distance_factor_km) / (t * config.time_factor_hours))
            .collect();

        log::debug!("dxs={dxs:?}");
        log::debug!("dys={dys:?}");
        log::debug!("dtimes={time_s:?}");
        log::debug!("distances={distance_m:?}");
        log::debug!("speeds={speed_kmh:?}");

        KinematicSeries {
            distance_m,
            time_s,
            speed_kmh,
        }
    }

    pub fn len(&self) -> usize {
        self.speed_kmh.len()
    }

    pub fn is_empty(&self) -> bool {
        self.speed_kmh.is_empty()
    }
}

/// Aggregate statistics of one projected track.
///
/// Stored in base units: meters, seconds, meters per second. Recomputed from
/// scratch whenever the underlying track changes; never mutated in place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Path {
    /// NaN-ignoring sum of the per-point distance deltas, in meters.
    pub total_distance_m: f64,
    /// NaN-ignoring sum of the per-point time deltas, in seconds.
    pub total_time_s: f64,
    /// Total distance over total time, in m/s. This is the global average,
    /// not the mean of the per-point speeds.
    pub average_speed: f64,
    /// Fastest per-point speed in m/s; NaN for a track without usable times.
    pub max_speed: f64,
}

impl Path {
    pub fn from_projected(track: &[ProjectedPoint]) -> Path {
        let xs: Vec<f64> = track.iter().map(|p| p.x).collect();
        let ys: Vec<f64> = track.iter().map(|p| p.y).collect();
        let times: Vec<f64> = track.iter().map(|p| p.time).collect();

        let dxs = gradient(&xs);
        let dys = gradient(&ys);
        let dtimes = gradient(&times);

        let distances: Vec<f64> = dxs.iter().zip(&dys).map(|(dx, dy)| dx.hypot(*dy)).collect();
        let speeds: Vec<f64> = distances.iter().zip(&dtimes).map(|(d, t)| d / t).collect();

        let total_distance_m = nan_sum(&distances);
        let total_time_s = nan_sum(&dtimes);

        Path {
            total_distance_m,
            total_time_s,
            average_speed: total_distance_m / total_time_s,
            max_speed: nan_max(&speeds),
        }
    }
}
