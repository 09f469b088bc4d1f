use std::error::Error;
use std::io::{self, Read};

use gpxpath::kinematics::KinematicSeries;
use gpxpath::project::Transformer;
use gpxpath::{Config, gpxxml};

/// Emit the per-point speed series as CSV, one row per track point. This is
/// the raw data behind a speed-vs-time graph.
pub fn speeds_command(config: &Config) -> Result<(), Box<dyn Error>> {
    let mut input = Vec::new();
    io::stdin().lock().read_to_end(&mut input)?;

    let track = gpxxml::read_gpx(&input)?;
    let transformer = Transformer::new(config.source_epsg, config.target_epsg)?;
    let projected = transformer.project_track(&track)?;
    let series = KinematicSeries::compute(&projected, config);

    println!("time,speed_kmh");
    for (point, speed) in projected.iter().zip(&series.speed_kmh) {
        println!("{},{}", point.time, speed);
    }
    Ok(())
}
