//! Inbound commands to the panel service.
//!
//! These represent actions requested by the outside world (MQTT, serial,
//! startup code) that the [`PanelService`](super::service::PanelService)
//! interprets and acts upon.

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelCommand {
    /// Ramp the backlight smoothly toward the given intensity.
    SetBrightness(i32),

    /// Jump the backlight to the given intensity with no ramp
    /// (initialization / diagnostics only).
    SetBrightnessImmediate(i32),

    /// Play an alert pattern on the beeper.
    Beep {
        count: u32,
        on_ms: u64,
        off_ms: u64,
        /// Discard any not-yet-started segments before queueing this
        /// pattern.  `false` composes patterns in call order instead.
        cancel_previous: bool,
    },

    /// Queue a silent pause between independently-issued patterns.
    BeepDelay(u64),

    /// Discard all queued beep segments and force the beeper off.
    FlushBeeps,
}
