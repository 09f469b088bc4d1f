use clap::{Parser, Subcommand};
use std::error::Error;

use gpxpath::Config;

mod commands;

#[derive(Parser)]
#[command(
    name = "gpxpath",
    about = "Derive distance and speed statistics from GPS track files"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Print summary statistics for a track read from stdin")]
    Stats {
        /// EPSG code of the input coordinates.
        #[arg(long, default_value_t = 4326)]
        from_epsg: u16,
        /// EPSG code of the planar system used for distance arithmetic.
        #[arg(long, default_value_t = 28353)]
        to_epsg: u16,
        /// Treat the input as KML instead of GPX.
        #[arg(long)]
        kml: bool,
    },
    #[command(about = "Print per-point time,speed CSV for a track read from stdin")]
    Speeds {
        /// EPSG code of the input coordinates.
        #[arg(long, default_value_t = 4326)]
        from_epsg: u16,
        /// EPSG code of the planar system used for distance arithmetic.
        #[arg(long, default_value_t = 28353)]
        to_epsg: u16,
    },
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    match cli.command {
        Commands::Stats {
            from_epsg,
            to_epsg,
            kml,
        } => {
            let config = Config {
                source_epsg: from_epsg,
                target_epsg: to_epsg,
                ..Config::default()
            };
            commands::stats::stats_command(&config, kml)
        }
        Commands::Speeds { from_epsg, to_epsg } => {
            let config = Config {
                source_epsg: from_epsg,
                target_epsg: to_epsg,
                ..Config::default()
            };
            commands::speeds::speeds_command(&config)
        }
    }
}
