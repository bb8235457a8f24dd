//! Hardware adapter — bridges real peripherals to domain port traits.
//!
//! Wraps the dumb actuator drivers in the sink traits the controllers
//! consume.  Each controller owns its sink outright (they live on separate
//! worker threads), so unlike a monolithic adapter there is one small
//! wrapper per output.  This is the only module besides `drivers` that
//! touches actual hardware; on non-espidf targets the underlying drivers
//! use cfg-gated simulation stubs.

use crate::app::ports::{IntensitySink, SwitchSink};
use crate::drivers::backlight::BacklightDriver;
use crate::drivers::beeper::BeeperDriver;

/// [`SwitchSink`] over the beeper GPIO.
pub struct BeeperSink {
    driver: BeeperDriver,
}

impl BeeperSink {
    pub fn new() -> Self {
        Self {
            driver: BeeperDriver::new(),
        }
    }
}

impl SwitchSink for BeeperSink {
    fn set(&mut self, energized: bool) {
        self.driver.set_energized(energized);
    }
}

/// [`IntensitySink`] over the backlight PWM channel.
pub struct BacklightSink {
    driver: BacklightDriver,
}

impl BacklightSink {
    pub fn new() -> Self {
        Self {
            driver: BacklightDriver::new(),
        }
    }
}

impl IntensitySink for BacklightSink {
    fn write(&mut self, value: i32) {
        self.driver.set_duty(value);
    }
}
