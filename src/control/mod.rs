//! Actuator controllers — the timed-output core of the firmware.
//!
//! Two share-nothing subsystems, each owning exactly one physical output
//! and one dedicated worker thread:
//!
//! | Controller       | Output                  | Worker                        |
//! |------------------|-------------------------|-------------------------------|
//! | [`PulseSequencer`](sequencer::PulseSequencer) | on/off beeper | long-lived queue consumer |
//! | [`RampController`](ramp::RampController)      | backlight PWM | spawned per transition    |
//!
//! Both are preemptible mid-playback by the command dispatch context and
//! guarantee the hardware never sees conflicting or out-of-range writes.

pub mod pattern;
pub mod ramp;
pub mod sequencer;

use std::sync::{Mutex, MutexGuard};

/// Lock a controller mutex, recovering from poisoning.
///
/// A panicking worker must not wedge the actuator it owns: the state it
/// guards (queue contents, last-written intensity) stays internally
/// consistent because every mutation completes before the guard drops.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| {
        log::error!("controller lock poisoned; recovering");
        poisoned.into_inner()
    })
}
