//! GPIO / peripheral pin assignments for the touch-panel main board.
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// Backlight (white LED rail behind the panel, MP3302 boost driver)
// ---------------------------------------------------------------------------

/// LEDC PWM output controlling backlight intensity.
pub const BACKLIGHT_PWM_GPIO: i32 = 4;

// ---------------------------------------------------------------------------
// Beeper (magnetic buzzer with on-board oscillator, NPN low-side switch)
// ---------------------------------------------------------------------------

/// Digital output: HIGH = beeper energized.
pub const BEEPER_GPIO: i32 = 5;

// ---------------------------------------------------------------------------
// PWM configuration
// ---------------------------------------------------------------------------

/// LEDC timer resolution (bits).  8-bit gives 0 – 255 intensity levels,
/// matching the configured brightness range.
pub const PWM_RESOLUTION_BITS: u32 = 8;
/// LEDC base frequency for the backlight (25 kHz — above audible range,
/// flicker-free).
pub const BACKLIGHT_PWM_FREQ_HZ: u32 = 25_000;
