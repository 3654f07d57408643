//! Desktop build: the same serving loop with a simulated sensor.
//!
//! ```text
//! RUST_LOG=debug CLIMATE_WEB_PORT=8080 cargo run
//! curl 'http://127.0.0.1:8080/data'
//! ```

use climate_web::{
    http::{bridge, handlers, host},
    indicator::LogIndicator,
    sensor::SimulatedSensor,
    Config, Dispatcher, Sampler, Scheduler, SystemClock,
};

/// Port 80 needs privileges on a desktop.
const SIMULATOR_PORT: u16 = 8080;

pub fn start() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config {
        http_port: SIMULATOR_PORT,
        ..Config::default()
    }
    .with_env_overrides();

    let clock = SystemClock::new();
    let sampler = Sampler::new(SimulatedSensor::from_entropy(), clock, config.sample_interval);
    let routes = handlers::register_routes(sampler.handle())?;
    for path in routes.paths() {
        log::info!("Route {}", path);
    }

    let (sender, transport) = bridge::channel(config.reply_timeout);
    let addr = host::spawn(("127.0.0.1", config.http_port), sender)?;
    log::info!("HTTP server started on http://{}", addr);

    Scheduler::new(
        transport,
        Dispatcher::new(routes, LogIndicator::default()),
        sampler,
    )
    .with_yield(config.tick_yield)
    .run()
}
