//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured panel events to the
//! ESP-IDF logger (which goes to UART / USB-CDC in production).  A future
//! MQTT status-topic adapter would implement the same trait.

use log::info;

use crate::app::events::PanelEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`PanelEvent`] to the serial console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &PanelEvent) {
        match event {
            PanelEvent::Started { brightness } => {
                info!("START | backlight={}", brightness);
            }
            PanelEvent::BrightnessTargeted { target } => {
                info!("RAMP  | target={}", target);
            }
            PanelEvent::BrightnessSet { value } => {
                info!("SET   | backlight={}", value);
            }
            PanelEvent::BeepQueued {
                count,
                cancelled_previous,
            } => {
                info!(
                    "BEEP  | count={} cancel_previous={}",
                    count, cancelled_previous
                );
            }
            PanelEvent::BeepsFlushed => {
                info!("FLUSH | beep queue cleared");
            }
        }
    }
}
