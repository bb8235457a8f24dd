//! Application core — command interpretation, zero I/O.
//!
//! This module contains the glue between the outside world and the actuator
//! controllers: inbound [`commands`], outbound [`events`], and the
//! [`service`] that owns both controllers.  All interaction with hardware
//! happens through **port traits** defined in [`ports`], keeping this layer
//! fully testable without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
