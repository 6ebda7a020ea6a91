//! Simulated DHT22-class sensor and cabinet climate model.
//!
//! The host build has no sensor transport.  [`SimCabinet`] is a first-order
//! model of the cabinet air that drifts toward ambient and is pushed around
//! by the actuators; [`SimDht22`] samples it with the real sensor's blocking
//! latency and can be told to fail.
//!
//! Model state lives in atomics so the main loop (which steps the model)
//! and the sampling task (which reads it) never share a lock.

use core::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::app::ports::{ActuatorState, SensorPort};
use crate::error::SensorFault;

const AMBIENT_C: f32 = 20.0;
const AMBIENT_RH: f32 = 45.0;
/// Fraction of the gap to ambient closed per second.
const LEAK_PER_SEC: f32 = 0.002;

const HEATER_C_PER_SEC: f32 = 0.05;
const FRIDGE_C_PER_SEC: f32 = 0.08;
const ATOMIZER_RH_PER_SEC: f32 = 0.3;
const FAN_RH_PER_SEC: f32 = 0.25;

/// DHT22 transaction time (start pulse + 40 bit frame).
pub const DHT22_LATENCY: Duration = Duration::from_millis(250);

pub struct SimCabinet {
    temperature_bits: AtomicU32,
    humidity_bits: AtomicU32,
    pending_failures: AtomicU32,
}

impl SimCabinet {
    pub fn new(temperature: f32, humidity: f32) -> Self {
        Self {
            temperature_bits: AtomicU32::new(temperature.to_bits()),
            humidity_bits: AtomicU32::new(humidity.to_bits()),
            pending_failures: AtomicU32::new(0),
        }
    }

    pub fn temperature(&self) -> f32 {
        f32::from_bits(self.temperature_bits.load(Ordering::Relaxed))
    }

    pub fn humidity(&self) -> f32 {
        f32::from_bits(self.humidity_bits.load(Ordering::Relaxed))
    }

    pub fn set(&self, temperature: f32, humidity: f32) {
        self.temperature_bits.store(temperature.to_bits(), Ordering::Relaxed);
        self.humidity_bits.store(humidity.to_bits(), Ordering::Relaxed);
    }

    /// Make the next `n` measurements fail.
    pub fn inject_failures(&self, n: u32) {
        self.pending_failures.fetch_add(n, Ordering::Relaxed);
    }

    fn take_failure(&self) -> bool {
        self.pending_failures
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1))
            .is_ok()
    }

    /// Advance the model by `dt_secs` under the given actuator states.
    pub fn step(&self, actuators: ActuatorState, dt_secs: f32) {
        let mut t = self.temperature();
        let mut h = self.humidity();

        t += (AMBIENT_C - t) * LEAK_PER_SEC * dt_secs;
        h += (AMBIENT_RH - h) * LEAK_PER_SEC * dt_secs;
        if actuators.heater {
            t += HEATER_C_PER_SEC * dt_secs;
        }
        if actuators.fridge {
            t -= FRIDGE_C_PER_SEC * dt_secs;
        }
        if actuators.atomizer {
            h += ATOMIZER_RH_PER_SEC * dt_secs;
        }
        if actuators.fan {
            h -= FAN_RH_PER_SEC * dt_secs;
        }

        self.set(t.clamp(-40.0, 80.0), h.clamp(0.0, 100.0));
    }
}

impl Default for SimCabinet {
    fn default() -> Self {
        Self::new(AMBIENT_C, AMBIENT_RH)
    }
}

/// Simulated sensor reading a shared [`SimCabinet`].
pub struct SimDht22 {
    cabinet: Arc<SimCabinet>,
    temperature: f32,
    humidity: f32,
    enabled: bool,
    latency: Duration,
}

impl SimDht22 {
    pub fn new(cabinet: Arc<SimCabinet>) -> Self {
        Self {
            cabinet,
            temperature: 0.0,
            humidity: 0.0,
            enabled: true,
            latency: DHT22_LATENCY,
        }
    }

    /// Override the simulated transaction time.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

impl SensorPort for SimDht22 {
    fn measure(&mut self) -> Result<(), SensorFault> {
        if !self.enabled {
            return Err(SensorFault::NotPowered);
        }
        if !self.latency.is_zero() {
            std::thread::sleep(self.latency);
        }
        if self.cabinet.take_failure() {
            return Err(SensorFault::Timeout);
        }
        self.temperature = self.cabinet.temperature();
        self.humidity = self.cabinet.humidity();
        Ok(())
    }

    fn temperature(&self) -> f32 {
        self.temperature
    }

    fn humidity(&self) -> f32 {
        self.humidity
    }

    fn set_enabled(&mut self, on: bool) {
        self.enabled = on;
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}
