//! MQTT command adapter.
//!
//! Two halves:
//!
//! - [`parse_command`] — pure topic/payload routing into [`PanelCommand`].
//!   Host-testable, no broker required.
//! - [`MqttLink`] — thin wrapper over the ESP-IDF MQTT client that feeds
//!   received messages through a dispatch closure (espidf only).
//!
//! ## Topic surface
//!
//! | Topic                  | Payload                                      |
//! |------------------------|----------------------------------------------|
//! | `<prefix>/brightness`  | numeric (float accepted, truncated to int)   |
//! | `<prefix>/beep`        | JSON `{count, on_ms?, off_ms?, cancel_previous?}` or bare count |
//! | `<prefix>/beep/delay`  | integer milliseconds                         |
//! | `<prefix>/beep/flush`  | any                                          |

use core::fmt;

use serde::Deserialize;

use crate::app::commands::PanelCommand;
use crate::config::PanelConfig;
use crate::error::PatternError;

// ---------------------------------------------------------------------------
// Routing errors
// ---------------------------------------------------------------------------

/// Why an inbound message could not be turned into a command.  Routing
/// failures are logged and dropped; they never tear down the MQTT link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteError {
    /// Topic did not match any known suffix under the configured prefix.
    UnknownTopic,
    /// Payload was not valid for the matched topic.
    Payload(&'static str),
    /// Payload parsed but described an invalid pattern.
    Pattern(PatternError),
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownTopic => write!(f, "unknown topic"),
            Self::Payload(msg) => write!(f, "bad payload: {msg}"),
            Self::Pattern(e) => write!(f, "bad pattern: {e}"),
        }
    }
}

impl From<PatternError> for RouteError {
    fn from(e: PatternError) -> Self {
        Self::Pattern(e)
    }
}

// ---------------------------------------------------------------------------
// Payload parsing
// ---------------------------------------------------------------------------

fn default_cancel() -> bool {
    true
}

/// JSON shape accepted on the beep topic.  Fields are signed so that
/// negative inputs can be rejected explicitly instead of failing opaque
/// unsigned deserialisation.
#[derive(Deserialize)]
struct BeepPayload {
    count: i64,
    on_ms: Option<i64>,
    off_ms: Option<i64>,
    #[serde(default = "default_cancel")]
    cancel_previous: bool,
}

fn payload_str(payload: &[u8]) -> Result<&str, RouteError> {
    core::str::from_utf8(payload)
        .map(str::trim)
        .map_err(|_| RouteError::Payload("not UTF-8"))
}

fn non_negative_ms(ms: i64) -> Result<u64, RouteError> {
    u64::try_from(ms).map_err(|_| PatternError::NegativeDuration.into())
}

fn parse_brightness(payload: &[u8]) -> Result<PanelCommand, RouteError> {
    let text = payload_str(payload)?;
    // Float payloads are accepted and truncated toward zero, matching what
    // home-automation senders typically publish ("128.0").
    let value: f64 = text
        .parse()
        .map_err(|_| RouteError::Payload("brightness is not a number"))?;
    if !value.is_finite() {
        return Err(RouteError::Payload("brightness is not finite"));
    }
    Ok(PanelCommand::SetBrightness(value as i32))
}

fn parse_beep(payload: &[u8], config: &PanelConfig) -> Result<PanelCommand, RouteError> {
    let text = payload_str(payload)?;

    let (count, on_ms, off_ms, cancel_previous) = if text.starts_with('{') {
        let p: BeepPayload =
            serde_json::from_str(text).map_err(|_| RouteError::Payload("malformed beep JSON"))?;
        let on = match p.on_ms {
            Some(ms) => non_negative_ms(ms)?,
            None => config.beep_on_ms,
        };
        let off = match p.off_ms {
            Some(ms) => non_negative_ms(ms)?,
            None => config.beep_off_ms,
        };
        (p.count, on, off, p.cancel_previous)
    } else {
        let count: i64 = text
            .parse()
            .map_err(|_| RouteError::Payload("beep count is not an integer"))?;
        (count, config.beep_on_ms, config.beep_off_ms, true)
    };

    if count < 0 {
        return Err(PatternError::NegativeCount.into());
    }
    let count = u32::try_from(count).map_err(|_| RouteError::Payload("beep count too large"))?;

    Ok(PanelCommand::Beep {
        count,
        on_ms,
        off_ms,
        cancel_previous,
    })
}

fn parse_delay(payload: &[u8]) -> Result<PanelCommand, RouteError> {
    let text = payload_str(payload)?;
    let ms: i64 = text
        .parse()
        .map_err(|_| RouteError::Payload("delay is not an integer"))?;
    Ok(PanelCommand::BeepDelay(non_negative_ms(ms)?))
}

/// Route one inbound message to a [`PanelCommand`].
pub fn parse_command(
    prefix: &str,
    topic: &str,
    payload: &[u8],
    config: &PanelConfig,
) -> Result<PanelCommand, RouteError> {
    let suffix = topic
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('/'))
        .ok_or(RouteError::UnknownTopic)?;

    match suffix {
        "brightness" => parse_brightness(payload),
        "beep" => parse_beep(payload, config),
        "beep/delay" => parse_delay(payload),
        "beep/flush" => Ok(PanelCommand::FlushBeeps),
        _ => Err(RouteError::UnknownTopic),
    }
}

// ---------------------------------------------------------------------------
// ESP-IDF MQTT client wiring
// ---------------------------------------------------------------------------

#[cfg(all(feature = "espidf", target_os = "espidf"))]
pub use espidf_link::MqttLink;

#[cfg(all(feature = "espidf", target_os = "espidf"))]
mod espidf_link {
    use esp_idf_svc::mqtt::client::{
        EspMqttClient, EventPayload, MqttClientConfiguration, QoS,
    };
    use log::{info, warn};

    use crate::error::CommsError;

    /// Connected MQTT client that hands every received message to the
    /// dispatch closure.  Reconnection after broker loss is handled inside
    /// the ESP-IDF client task.
    pub struct MqttLink {
        client: EspMqttClient<'static>,
    }

    impl MqttLink {
        /// Connect to `broker_url` and install `on_message` as the receive
        /// path.  The closure runs on the MQTT client task, so it must stay
        /// short and must not block on the controllers' worker threads.
        pub fn connect(
            broker_url: &str,
            client_id: &str,
            mut on_message: impl FnMut(&str, &[u8]) + Send + 'static,
        ) -> Result<Self, CommsError> {
            let conf = MqttClientConfiguration {
                client_id: Some(client_id),
                ..Default::default()
            };

            let client = EspMqttClient::new_cb(broker_url, &conf, move |event| {
                match event.payload() {
                    EventPayload::Received {
                        topic: Some(topic),
                        data,
                        ..
                    } => on_message(topic, data),
                    EventPayload::Connected(_) => info!("MQTT: connected"),
                    EventPayload::Disconnected => warn!("MQTT: disconnected, client will retry"),
                    _ => {}
                }
            })
            .map_err(|_| CommsError::MqttConnectFailed)?;

            Ok(Self { client })
        }

        /// Subscribe at QoS 0.  Command topics are fire-and-forget; a lost
        /// message is recovered by the sender publishing again.
        pub fn subscribe(&mut self, topic: &str) -> Result<(), CommsError> {
            self.client
                .subscribe(topic, QoS::AtMostOnce)
                .map(|_| ())
                .map_err(|_| CommsError::MqttSubscribeFailed)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> PanelConfig {
        PanelConfig::default()
    }

    #[test]
    fn brightness_integer_payload() {
        let cmd = parse_command("touchpanel", "touchpanel/brightness", b"128", &cfg()).unwrap();
        assert_eq!(cmd, PanelCommand::SetBrightness(128));
    }

    #[test]
    fn brightness_float_payload_truncates() {
        let cmd = parse_command("touchpanel", "touchpanel/brightness", b"99.9", &cfg()).unwrap();
        assert_eq!(cmd, PanelCommand::SetBrightness(99));
    }

    #[test]
    fn brightness_out_of_range_still_routes() {
        // Range enforcement is deferred to the ramp worker, not the router.
        let cmd = parse_command("touchpanel", "touchpanel/brightness", b"9000", &cfg()).unwrap();
        assert_eq!(cmd, PanelCommand::SetBrightness(9000));
    }

    #[test]
    fn brightness_garbage_is_rejected() {
        let err = parse_command("touchpanel", "touchpanel/brightness", b"bright", &cfg());
        assert!(matches!(err, Err(RouteError::Payload(_))));
    }

    #[test]
    fn beep_bare_count_uses_config_defaults() {
        let cmd = parse_command("touchpanel", "touchpanel/beep", b"3", &cfg()).unwrap();
        assert_eq!(
            cmd,
            PanelCommand::Beep {
                count: 3,
                on_ms: cfg().beep_on_ms,
                off_ms: cfg().beep_off_ms,
                cancel_previous: true,
            }
        );
    }

    #[test]
    fn beep_json_payload_overrides_defaults() {
        let cmd = parse_command(
            "touchpanel",
            "touchpanel/beep",
            br#"{"count": 2, "on_ms": 50, "off_ms": 75, "cancel_previous": false}"#,
            &cfg(),
        )
        .unwrap();
        assert_eq!(
            cmd,
            PanelCommand::Beep {
                count: 2,
                on_ms: 50,
                off_ms: 75,
                cancel_previous: false,
            }
        );
    }

    #[test]
    fn beep_json_partial_fills_from_config() {
        let cmd = parse_command(
            "touchpanel",
            "touchpanel/beep",
            br#"{"count": 1, "on_ms": 40}"#,
            &cfg(),
        )
        .unwrap();
        assert_eq!(
            cmd,
            PanelCommand::Beep {
                count: 1,
                on_ms: 40,
                off_ms: cfg().beep_off_ms,
                cancel_previous: true,
            }
        );
    }

    #[test]
    fn beep_negative_count_is_pattern_error() {
        let err = parse_command("touchpanel", "touchpanel/beep", b"-1", &cfg());
        assert_eq!(err, Err(RouteError::Pattern(PatternError::NegativeCount)));
    }

    #[test]
    fn beep_negative_duration_is_pattern_error() {
        let err = parse_command(
            "touchpanel",
            "touchpanel/beep",
            br#"{"count": 1, "on_ms": -5}"#,
            &cfg(),
        );
        assert_eq!(
            err,
            Err(RouteError::Pattern(PatternError::NegativeDuration))
        );
    }

    #[test]
    fn delay_routes_milliseconds() {
        let cmd = parse_command("touchpanel", "touchpanel/beep/delay", b"1500", &cfg()).unwrap();
        assert_eq!(cmd, PanelCommand::BeepDelay(1500));
    }

    #[test]
    fn delay_negative_is_pattern_error() {
        let err = parse_command("touchpanel", "touchpanel/beep/delay", b"-10", &cfg());
        assert_eq!(
            err,
            Err(RouteError::Pattern(PatternError::NegativeDuration))
        );
    }

    #[test]
    fn flush_ignores_payload() {
        let cmd = parse_command("touchpanel", "touchpanel/beep/flush", b"whatever", &cfg()).unwrap();
        assert_eq!(cmd, PanelCommand::FlushBeeps);
    }

    #[test]
    fn unknown_topic_is_rejected() {
        let err = parse_command("touchpanel", "touchpanel/volume", b"1", &cfg());
        assert_eq!(err, Err(RouteError::UnknownTopic));

        let err = parse_command("touchpanel", "otherdevice/brightness", b"1", &cfg());
        assert_eq!(err, Err(RouteError::UnknownTopic));
    }
}
