//! Backlight driver (LEDC PWM channel 0).
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the LEDC duty register via hw_init.
//! On host/test: tracks state in-memory only.

use crate::drivers::hw_init;

pub struct BacklightDriver {
    duty: u8,
}

impl BacklightDriver {
    pub fn new() -> Self {
        Self { duty: 0 }
    }

    /// Push an 8-bit duty level.  Range checking happens upstream in the
    /// ramp controller; the clamp here only guards the integer narrowing.
    pub fn set_duty(&mut self, value: i32) {
        let duty = value.clamp(0, 255) as u8;
        hw_init::ledc_set(hw_init::LEDC_CH_BACKLIGHT, duty);
        self.duty = duty;
    }

    pub fn current_duty(&self) -> u8 {
        self.duty
    }
}
