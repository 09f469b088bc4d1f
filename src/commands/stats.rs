use std::error::Error;
use std::io::{self, Read};

use gpxpath::kinematics::Path;
use gpxpath::project::Transformer;
use gpxpath::{Config, gpxxml, report};

pub fn stats_command(config: &Config, kml: bool) -> Result<(), Box<dyn Error>> {
    let mut input = Vec::new();
    io::stdin().lock().read_to_end(&mut input)?;

    let track = if kml {
        gpxxml::read_kml(&input)?
    } else {
        gpxxml::read_gpx(&input)?
    };
    log::info!("parsed {} points", track.len());

    let transformer = Transformer::new(config.source_epsg, config.target_epsg)?;
    let projected = transformer.project_track(&track)?;
    let path = Path::from_projected(&projected);

    println!("{}", report::summary(&path));
    Ok(())
}
