//! Curing cabinet climate controller.
//!
//! Hysteresis control of fan, atomizer, fridge and heater from periodic
//! temperature/humidity samples, a sampling scheduler that keeps the
//! blocking sensor read off the tick context, fan duty cycling, and
//! debounced front-panel input.  Hardware sits behind the port traits in
//! [`app::ports`]; the host build runs against simulated lines and a
//! simulated sensor.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod control;
pub mod drivers;
pub mod error;
pub mod health;
pub mod pins;
pub mod scheduler;
pub mod sensors;
pub mod ui;
