//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements   | Connects to                      |
//! |------------|--------------|----------------------------------|
//! | `log_sink` | EventSink    | `log` facade / stderr console    |
//! | `storage`  | ConfigPort   | JSON file, in-memory store       |
//! | `time`     | -            | monotonic host clock             |
//!
//! Sensor and actuator adapters live in [`crate::sensors`] and
//! [`crate::drivers`].

pub mod log_sink;
pub mod storage;
pub mod time;
