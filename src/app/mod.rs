//! Application core: pure domain logic, zero I/O.
//!
//! Business rules for the cabinet controller: control cycles, fan duty
//! checks, operator commands and the degraded-mode indicator.  All
//! interaction with hardware happens through **port traits** defined in
//! [`ports`], keeping this layer fully testable without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
