//! Command line entry point.
//!
//! Exits with the run error's status code on failure. Log verbosity
//! follows `RUST_LOG` and defaults to `info`.

use std::env;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "voxmorph", about = "Convert a source world snapshot into a chunked voxel world")]
struct Cli {
    /// Configuration file with settings, materials and templates
    #[arg(long, short, default_value = "voxmorph.toml")]
    config: PathBuf,
    /// World snapshot to convert
    world: PathBuf,
}

fn init_logging() {
    let filter = env::var(EnvFilter::DEFAULT_ENV).unwrap_or_else(|_| "info".to_owned());
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging();
    info!(config = %cli.config.display(), world = %cli.world.display(), "starting conversion");

    match voxmorph::run(&cli.config, &cli.world) {
        Ok(report) => {
            info!(
                world = %report.world_dir.display(),
                levels = report.levels,
                "done"
            );
        }
        Err(err) => {
            error!(code = err.code(), "{err}");
            process::exit(err.code());
        }
    }
}
