//! Outbound application events.
//!
//! The [`PanelService`](super::service::PanelService) emits these through
//! the [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them — log to serial, publish a status
//! topic, etc.

/// Structured events emitted by the application core.
#[derive(Debug, Clone, Copy)]
pub enum PanelEvent {
    /// The service has started (carries the initial backlight level).
    Started { brightness: i32 },

    /// A smooth ramp toward a new backlight target was requested.
    BrightnessTargeted { target: i32 },

    /// The backlight was set directly, bypassing the ramp.
    BrightnessSet { value: i32 },

    /// An alert pattern was queued on the beeper.
    BeepQueued { count: u32, cancelled_previous: bool },

    /// All pending beep segments were discarded.
    BeepsFlushed,
}
