/*
 * Boid Flocking Simulation
 *
 * This application simulates the flocking behavior of birds (boids) based on
 * three rules: separation, alignment and cohesion. Neighbors are found through
 * a quadtree rebuilt every tick.
 *
 * Usage: quadboids [config.json]
 *
 * Logging is controlled with RUST_LOG (e.g. RUST_LOG=quadboids=debug prints
 * per-tick counters).
 */

use nannou::prelude::*;
use std::sync::OnceLock;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use quadboids::app::{self, Model};
use quadboids::RunConfig;

// Startup configuration, read once before the event loop starts
static RUN_CONFIG: OnceLock<RunConfig> = OnceLock::new();

fn main() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();

    let config = match std::env::args().nth(1) {
        Some(path) => match RunConfig::load(&path) {
            Ok(config) => {
                info!(%path, "loaded run configuration");
                config
            }
            Err(err) => {
                error!(%err, "could not load run configuration");
                std::process::exit(1);
            }
        },
        None => RunConfig::default(),
    };
    let _ = RUN_CONFIG.set(config);

    nannou::app(model).update(app::update).run();
}

fn model(app: &App) -> Model {
    let config = RUN_CONFIG.get().cloned().unwrap_or_default();
    app::model(app, config)
}
