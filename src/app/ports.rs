//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ controllers (domain)
//! ```
//!
//! Driven adapters (actuator sinks, event sinks, config storage) implement
//! these traits.  The controllers in [`crate::control`] consume them via
//! generics, so the domain core never touches hardware directly and runs
//! against recording fakes in tests.

use crate::config::PanelConfig;

// ───────────────────────────────────────────────────────────────
// Actuator sinks (driven adapters: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// A binary on/off physical output (the beeper).
///
/// Mutated only by the owning pulse sequencer: its worker thread during
/// playback, and the dispatch context during `flush()` — both serialised
/// by the sequencer's sink lock.
pub trait SwitchSink {
    /// Energize (`true`) or de-energize (`false`) the output.
    fn set(&mut self, energized: bool);
}

/// A bounded integer intensity output (the backlight).
///
/// Callers guarantee `value` has passed the controller's range check; the
/// sink itself performs no validation.
pub trait IntensitySink {
    /// Push a new intensity level to the hardware.
    fn write(&mut self, value: i32);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`PanelEvent`](super::events::PanelEvent)s
/// through this port.  Adapters decide where they go (serial log, MQTT
/// status topic, etc.).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::PanelEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists panel configuration.
///
/// Implementations MUST validate before persisting.  Invalid ranges are
/// rejected with [`ConfigError::ValidationFailed`], not silently clamped.
pub trait ConfigPort {
    /// Load configuration from persistent storage.
    /// Returns [`PanelConfig::default()`] if no stored config exists.
    fn load(&self) -> Result<PanelConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &PanelConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug)]
pub enum ConfigError {
    /// No config found in storage (first boot).
    NotFound,
    /// Stored config failed integrity / deserialization check.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}
