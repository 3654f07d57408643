use esp_idf_svc::mdns::EspMdns;

/// Answer `<hostname>.local` and announce the HTTP service.
///
/// Failure is not fatal: the board is still reachable by IP.
pub fn advertise(hostname: &str, http_port: u16) -> Option<EspMdns> {
    let result = EspMdns::take().and_then(|mut mdns| {
        mdns.set_hostname(hostname)?;
        mdns.add_service(None, "_http", "_tcp", http_port, &[])?;
        Ok(mdns)
    });

    match result {
        Ok(mdns) => {
            log::info!("MDNS responder started: http://{}.local", hostname);
            Some(mdns)
        }
        Err(e) => {
            log::error!("Failed to start MDNS responder: {:?}", e);
            None
        }
    }
}
