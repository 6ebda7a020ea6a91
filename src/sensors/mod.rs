//! Sensor subsystem: the validated [`SensorSample`] and the simulated
//! DHT22-class sensor used by the host build.
//!
//! The physical sensor transport is an adapter behind
//! [`SensorPort`](crate::app::ports::SensorPort); the sampling task only
//! ever sees samples that passed [`SensorSample::validated`].

pub mod sim;

use crate::error::SensorFault;

/// DHT22 operating envelope.
pub const TEMPERATURE_RANGE_C: core::ops::RangeInclusive<f32> = -40.0..=80.0;
pub const HUMIDITY_RANGE_PCT: core::ops::RangeInclusive<f32> = 0.0..=100.0;

/// One temperature/humidity pair.  Only constructible through
/// [`validated`](Self::validated), so every instance is finite and in range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorSample {
    temperature: f32,
    humidity: f32,
}

impl SensorSample {
    /// Accept a raw reading, rejecting NaN/infinite or out-of-envelope values.
    pub fn validated(temperature: f32, humidity: f32) -> Result<Self, SensorFault> {
        if !temperature.is_finite() || !humidity.is_finite() {
            return Err(SensorFault::OutOfRange);
        }
        if !TEMPERATURE_RANGE_C.contains(&temperature) || !HUMIDITY_RANGE_PCT.contains(&humidity) {
            return Err(SensorFault::OutOfRange);
        }
        Ok(Self {
            temperature,
            humidity,
        })
    }

    /// Temperature (°C).
    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    /// Relative humidity (%).
    pub fn humidity(&self) -> f32 {
        self.humidity
    }
}
