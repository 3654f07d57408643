//! Board bring-up for the ESP32: WiFi, mDNS, HTTP server, status LED and the
//! DHT22 pin.
//!
//! Pin map: status LED on GPIO13, DHT22 data on GPIO4.

use esp_idf_svc::{
    eventloop::EspSystemEventLoop, hal::prelude::Peripherals, nvs::EspDefaultNvsPartition,
};

use climate_web::{
    http::{bridge, handlers},
    Config, Dispatcher, Sampler, Scheduler, SystemClock,
};

#[cfg(feature = "sensor")]
mod dht;
mod led;
mod mdns;
mod server;
mod wifi;

pub fn start() -> anyhow::Result<()> {
    esp_idf_svc::sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();

    let config = Config::default();
    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;

    // off until a request comes in
    let led = led::StatusLed::new(peripherals.pins.gpio13)?;

    let _wifi = wifi::connect(peripherals.modem, sysloop, nvs, config.connect_backoff)?;
    let _mdns = mdns::advertise(config.mdns_hostname, config.http_port);

    let clock = SystemClock::new();

    #[cfg(feature = "sensor")]
    let sensor = {
        let pin = dht::DhtPin::new(peripherals.pins.gpio4)?;
        climate_web::sensor::Dht22::new(pin, clock)
    };
    #[cfg(not(feature = "sensor"))]
    let sensor = climate_web::sensor::NoSensor;

    let sampler = Sampler::new(sensor, clock, config.sample_interval);
    let routes = handlers::register_routes(sampler.handle())?;
    for path in routes.paths() {
        log::info!("Route {}", path);
    }

    let (sender, transport) = bridge::channel(config.reply_timeout);
    let _server = server::start(config.http_port, sender)?;
    log::info!("HTTP server started on port {}", config.http_port);

    Scheduler::new(transport, Dispatcher::new(routes, led), sampler)
        .with_yield(config.tick_yield)
        .run()
}
