//! System configuration parameters
//!
//! All tunable parameters for the touch-panel actuators and their bus
//! surface.  Values can be overridden via NVS (non-volatile storage).

use serde::{Deserialize, Serialize};

/// Core panel configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelConfig {
    // --- Backlight ---
    /// Lowest intensity value the backlight sink accepts.
    pub min_brightness: i32,
    /// Highest intensity value the backlight sink accepts (8-bit PWM → 255).
    pub max_brightness: i32,
    /// Wall-clock budget for one smooth brightness transition, regardless
    /// of distance (milliseconds).
    pub transition_ms: u32,

    // --- Beeper ---
    /// Energized duration per beep when the request carries none (ms).
    pub beep_on_ms: u64,
    /// Gap duration between beeps when the request carries none (ms).
    pub beep_off_ms: u64,

    // --- Bus ---
    /// First segment of every command topic, e.g. `touchpanel/brightness`.
    pub topic_prefix: heapless::String<32>,
}

impl Default for PanelConfig {
    fn default() -> Self {
        let mut topic_prefix = heapless::String::new();
        // "touchpanel" always fits in 32 bytes.
        let _ = topic_prefix.push_str("touchpanel");

        Self {
            // Backlight
            min_brightness: 0,
            max_brightness: 255,
            transition_ms: 500,

            // Beeper
            beep_on_ms: 200,
            beep_off_ms: 200,

            topic_prefix,
        }
    }
}
