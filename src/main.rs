//! Touchpanel Firmware — Main Entry Point
//!
//! Hexagonal architecture with thread-per-actuator execution.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Adapters (outer ring)                    │
//! │                                                              │
//! │  BeeperSink     BacklightSink   LogEventSink   NvsAdapter    │
//! │  (SwitchSink)   (IntensitySink) (EventSink)    (ConfigPort)  │
//! │  WifiAdapter    MqttLink                                     │
//! │  (Connectivity) (command transport)                          │
//! │                                                              │
//! │  ─────────────── Port Trait Boundary ──────────────────      │
//! │                                                              │
//! │  ┌───────────────────────────────────────────────────────┐   │
//! │  │            PanelService (pure logic)                  │   │
//! │  │  PulseSequencer · RampController · pattern compiler   │   │
//! │  └───────────────────────────────────────────────────────┘   │
//! └──────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

#[cfg(not(target_os = "espidf"))]
fn main() {
    // The binary only makes sense on the device; host users want the
    // library and its test suites.
    eprintln!("touchpanel: this binary targets ESP-IDF; build with the xtensa toolchain");
}

#[cfg(target_os = "espidf")]
fn main() -> anyhow::Result<()> {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use log::{error, info, warn};

    use touchpanel::adapters::hardware::{BacklightSink, BeeperSink};
    use touchpanel::adapters::log_sink::LogEventSink;
    use touchpanel::adapters::mqtt::{parse_command, MqttLink};
    use touchpanel::adapters::nvs::NvsAdapter;
    use touchpanel::adapters::wifi::{ConnectivityPort, WifiAdapter};
    use touchpanel::app::ports::ConfigPort;
    use touchpanel::app::service::PanelService;
    use touchpanel::config::PanelConfig;
    use touchpanel::drivers;
    use touchpanel::error::Error;

    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Touchpanel v{}                     ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 1b. Initialise hardware peripherals ───────────────────
    if let Err(e) = drivers::hw_init::init_peripherals() {
        // Peripheral init failure is critical — log and halt.
        // In production this triggers the watchdog reset after timeout.
        error!("HAL init failed: {} — halting", e);
        #[allow(clippy::empty_loop)]
        loop {}
    }
    let watchdog = drivers::watchdog::Watchdog::new();

    // ── 2. Load config from NVS (or defaults) ─────────────────
    let nvs = match NvsAdapter::new() {
        Ok(n) => Some(n),
        Err(e) => {
            warn!("NVS init failed ({}), running with defaults and no persistence", e);
            None
        }
    };
    let config = match nvs.as_ref().map(ConfigPort::load) {
        Some(Ok(cfg)) => {
            info!("Config loaded from NVS");
            cfg
        }
        Some(Err(e)) => {
            warn!("NVS config load failed ({}), using defaults", e);
            PanelConfig::default()
        }
        None => PanelConfig::default(),
    };

    // ── 3. Construct the panel service ────────────────────────
    let mut events = LogEventSink::new();
    let service = PanelService::start(BeeperSink::new(), BacklightSink::new(), &config, &mut events)
        .map_err(anyhow::Error::from)?;
    let service = Arc::new(Mutex::new(service));

    // ── 4. WiFi station ───────────────────────────────────────
    let ssid = option_env!("TOUCHPANEL_WIFI_SSID").unwrap_or("");
    let pass = option_env!("TOUCHPANEL_WIFI_PASS").unwrap_or("");

    let sysloop = esp_idf_svc::eventloop::EspSystemEventLoop::take()?;
    let peripherals = esp_idf_svc::hal::peripherals::Peripherals::take()?;
    // Second take of the default partition after NvsAdapter's flash init is
    // fine: nvs_flash_init() is a no-op once the partition is up.
    let nvs_partition = esp_idf_svc::nvs::EspDefaultNvsPartition::take()?;
    let wifi_driver = esp_idf_svc::wifi::BlockingWifi::wrap(
        esp_idf_svc::wifi::EspWifi::new(peripherals.modem, sysloop.clone(), Some(nvs_partition))?,
        sysloop,
    )?;

    let mut wifi = WifiAdapter::new(wifi_driver);
    wifi.set_credentials(ssid, pass)
        .map_err(|e| anyhow::anyhow!("WiFi credentials: {e}"))?;

    // Keep retrying until the AP accepts us; there is nothing useful the
    // panel can do offline.
    while let Err(e) = wifi.connect() {
        warn!("WiFi connect failed ({}), retrying in 5s", e);
        std::thread::sleep(Duration::from_secs(5));
    }

    // ── 5. MQTT link ──────────────────────────────────────────
    let broker_url = option_env!("TOUCHPANEL_MQTT_URL").unwrap_or("mqtt://127.0.0.1:1883");
    let prefix: String = config.topic_prefix.as_str().into();

    let mut link = {
        let service = Arc::clone(&service);
        let config = config;
        let prefix = prefix.clone();
        MqttLink::connect(broker_url, "touchpanel", move |topic, payload| {
            match parse_command(&prefix, topic, payload, &config) {
                Ok(cmd) => {
                    let mut events = LogEventSink::new();
                    let mut svc = match service.lock() {
                        Ok(g) => g,
                        Err(poisoned) => poisoned.into_inner(),
                    };
                    if let Err(e) = svc.handle_command(cmd, &mut events) {
                        warn!("command rejected: {}", e);
                    }
                }
                Err(e) => warn!("dropping message on '{}': {}", topic, e),
            }
        })
        .map_err(Error::from)?
    };

    let subscription = format!("{prefix}/#");
    link.subscribe(&subscription).map_err(Error::from)?;
    info!("Subscribed to {}", subscription);

    info!("System ready. Entering supervision loop.");

    // ── 6. Supervision loop ───────────────────────────────────
    // The actuator workers run on their own threads; this loop only keeps
    // the watchdog fed and the WiFi session alive.
    loop {
        watchdog.feed();
        wifi.poll();
        std::thread::sleep(Duration::from_secs(1));
    }
}
