//! Beeper driver (magnetic buzzer behind an NPN low-side switch).
//!
//! The buzzer carries its own oscillator, so "energized" is a plain GPIO
//! level — no PWM tone generation needed.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the real GPIO via hw_init helpers.
//! On host/test: tracks state in-memory only.

use crate::drivers::hw_init;
use crate::pins;

pub struct BeeperDriver {
    energized: bool,
}

impl BeeperDriver {
    pub fn new() -> Self {
        Self { energized: false }
    }

    pub fn set_energized(&mut self, on: bool) {
        hw_init::gpio_write(pins::BEEPER_GPIO, on);
        self.energized = on;
    }

    pub fn is_energized(&self) -> bool {
        self.energized
    }
}
