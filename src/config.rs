//! Build-time and default settings.
//!
//! WiFi credentials are baked in at compile time, e.g.
//! `WIFI_SSID=home WIFI_PASS=secret cargo build`. There is no runtime
//! configuration store.

use std::time::Duration;

use crate::scheduler::DEFAULT_YIELD;

pub static WIFI_SSID: Option<&str> = option_env!("WIFI_SSID");
pub static WIFI_PASS: Option<&str> = option_env!("WIFI_PASS");
pub static WIFI_HOSTNAME: Option<&str> = option_env!("WIFI_HOSTNAME");

#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    /// mDNS name, answered as `<name>.local`.
    pub mdns_hostname: &'static str,
    pub sample_interval: Duration,
    pub tick_yield: Duration,
    /// How long the HTTP server waits for the loop to answer a request.
    pub reply_timeout: Duration,
    /// Pause between checks while waiting for WiFi to come up.
    pub connect_backoff: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_port: 80,
            mdns_hostname: "esp32",
            sample_interval: Duration::from_secs(2),
            tick_yield: DEFAULT_YIELD,
            reply_timeout: Duration::from_secs(1),
            connect_backoff: Duration::from_millis(500),
        }
    }
}

impl Config {
    /// Apply `CLIMATE_WEB_PORT` and `CLIMATE_WEB_INTERVAL_MS` from the
    /// environment. Only meaningful when running on a desktop.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(port) = env_parse("CLIMATE_WEB_PORT") {
            self.http_port = port;
        }
        if let Some(ms) = env_parse("CLIMATE_WEB_INTERVAL_MS") {
            self.sample_interval = Duration::from_millis(ms);
        }
        self
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let value = std::env::var(key).ok()?;
    match value.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            log::warn!("Ignoring {}={:?}: not a number", key, value);
            None
        }
    }
}

#[test]
fn test_defaults() {
    let config = Config::default();
    assert_eq!(config.http_port, 80);
    assert_eq!(config.sample_interval, Duration::from_secs(2));
    assert_eq!(config.tick_yield, Duration::from_millis(2));
    assert!(config.reply_timeout > config.tick_yield);
}
