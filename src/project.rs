//! EPSG-to-EPSG coordinate transforms.
//!
//! All projection math is delegated to `proj4rs`; EPSG codes are resolved
//! to proj-strings through the `crs-definitions` registry. This module is a
//! thin, side-effect-free adapter so the rest of the pipeline can do plain
//! Euclidean arithmetic on the output.

use proj4rs::proj::Proj;
use proj4rs::transform::transform;

use crate::{ProjectedPoint, ProjectedTrack, ProjectionError, TrackPoint};

/// Pointwise transform between two EPSG-coded coordinate reference systems.
///
/// Deterministic for a given code pair; point `i` of the output depends only
/// on point `i` of the input.
#[derive(Debug)]
pub struct Transformer {
    source: Proj,
    target: Proj,
}

impl Transformer {
    /// Build a transform from `source_epsg` into `target_epsg`.
    ///
    /// Swap the arguments to obtain the inverse transform.
    pub fn new(source_epsg: u16, target_epsg: u16) -> Result<Self, ProjectionError> {
        Ok(Transformer {
            source: resolve(source_epsg)?,
            target: resolve(target_epsg)?,
        })
    }

    /// Transform one coordinate pair (x = lon/easting, y = lat/northing).
    ///
    /// proj4rs works in radians for geographic systems, so degrees are
    /// converted on the way in and out as needed.
    pub fn transform_point(&self, x: f64, y: f64) -> Result<(f64, f64), ProjectionError> {
        let mut point = if self.source.is_latlong() {
            (x.to_radians(), y.to_radians(), 0.0)
        } else {
            (x, y, 0.0)
        };
        transform(&self.source, &self.target, &mut point)?;
        if self.target.is_latlong() {
            Ok((point.0.to_degrees(), point.1.to_degrees()))
        } else {
            Ok((point.0, point.1))
        }
    }

    /// Transform parallel coordinate slices; same length out as in.
    pub fn transform(
        &self,
        xs: &[f64],
        ys: &[f64],
    ) -> Result<(Vec<f64>, Vec<f64>), ProjectionError> {
        debug_assert_eq!(xs.len(), ys.len());
        let mut out_xs = Vec::with_capacity(xs.len());
        let mut out_ys = Vec::with_capacity(ys.len());
        for (&x, &y) in xs.iter().zip(ys) {
            let (tx, ty) = self.transform_point(x, y)?;
            out_xs.push(tx);
            out_ys.push(ty);
        }
        Ok((out_xs, out_ys))
    }

    /// Project a parsed track, carrying time and elevation through unchanged.
    pub fn project_track(&self, track: &[TrackPoint]) -> Result<ProjectedTrack, ProjectionError> {
        track
            .iter()
            .map(|p| {
                let (x, y) = self.transform_point(p.lon, p.lat)?;
                Ok(ProjectedPoint {
                    time: p.time,
                    x,
                    y,
                    elev: p.elev,
                })
            })
            .collect()
    }
}

fn resolve(code: u16) -> Result<Proj, ProjectionError> {
    let def = crs_definitions::from_code(code).ok_or(ProjectionError::UnknownCrs(code))?;
    Ok(Proj::from_proj_string(def.proj4)?)
}
