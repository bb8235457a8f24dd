//! Actuator drivers, hardware initialisation, and peripheral helpers.

pub mod backlight;
pub mod beeper;
pub mod hw_init;
pub mod task_pin;
pub mod watchdog;
