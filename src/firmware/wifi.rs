//! Station-mode WiFi bring-up.

use std::time::Duration;

use anyhow::anyhow;
use esp_idf_svc::{
    eventloop::EspSystemEventLoop,
    hal::modem::Modem,
    nvs::EspDefaultNvsPartition,
    wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi},
};

use climate_web::config;

/// Join the network baked in at build time. Keeps retrying until an address
/// has been assigned; nothing else is worth doing without one.
pub fn connect(
    modem: Modem,
    sysloop: EspSystemEventLoop,
    nvs: EspDefaultNvsPartition,
    backoff: Duration,
) -> anyhow::Result<BlockingWifi<EspWifi<'static>>> {
    let ssid = config::WIFI_SSID.ok_or_else(|| anyhow!("WIFI_SSID was not set at build time"))?;
    let pass = config::WIFI_PASS.unwrap_or_default();

    let mut esp_wifi = EspWifi::new(modem, sysloop.clone(), Some(nvs))?;
    match config::WIFI_HOSTNAME {
        Some(hostname) => {
            log::info!("Setting hostname to {}", hostname);
            esp_wifi.sta_netif_mut().set_hostname(hostname)?;
        }
        None => log::info!(
            "Hostname not configured. Default hostname: {}",
            esp_wifi.sta_netif().get_hostname()?
        ),
    }

    let mut wifi = BlockingWifi::wrap(esp_wifi, sysloop)?;
    wifi.set_configuration(&Configuration::Client(ClientConfiguration {
        ssid: ssid
            .try_into()
            .map_err(|_| anyhow!("SSID {:?} is too long", ssid))?,
        password: pass
            .try_into()
            .map_err(|_| anyhow!("WiFi password is too long"))?,
        auth_method: if pass.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        },
        ..Default::default()
    }))?;
    wifi.start()?;

    log::info!("Connecting to {}", ssid);
    loop {
        match wifi.connect().and_then(|_| wifi.wait_netif_up()) {
            Ok(()) => break,
            Err(e) => {
                log::warn!("WiFi not up yet: {:?}", e);
                std::thread::sleep(backoff);
            }
        }
    }

    let ip_info = wifi.wifi().sta_netif().get_ip_info()?;
    log::info!("Connected to {}", ssid);
    log::info!("IP address: {}", ip_info.ip);

    Ok(wifi)
}
