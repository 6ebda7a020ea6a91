//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (sensor, digital outputs, event sinks, setpoint storage)
//! implement these traits.  The [`AppService`](super::service::AppService),
//! the controller and the scheduler consume them via generics, so the domain
//! core never touches hardware directly.

use crate::config::SetpointConfig;
use crate::error::SensorFault;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → sampling task)
// ───────────────────────────────────────────────────────────────

/// Combined temperature/humidity sensor with a power-enable line.
///
/// `measure()` may block for hundreds of milliseconds and is only ever
/// called from the background sampling task.  `temperature()` and
/// `humidity()` return the values of the last *successful* measurement;
/// they stay stale until the next one succeeds.
pub trait SensorPort {
    /// Run one measurement transaction.
    fn measure(&mut self) -> Result<(), SensorFault>;

    /// Last successfully measured temperature (°C).
    fn temperature(&self) -> f32;

    /// Last successfully measured relative humidity (%).
    fn humidity(&self) -> f32;

    /// Drive the sensor's power-enable line.
    fn set_enabled(&mut self, on: bool);

    /// Current level of the power-enable line.
    fn is_enabled(&self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → digital outputs)
// ───────────────────────────────────────────────────────────────

/// The four binary actuators of the cabinet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Actuator {
    /// Vents humid air.
    Fan,
    /// Humidifies.
    Atomizer,
    /// Compressor / fridge relay (cools).
    Fridge,
    /// Heater element.
    Heater,
}

impl Actuator {
    pub const ALL: [Actuator; 4] = [Self::Fan, Self::Atomizer, Self::Fridge, Self::Heater];

    pub fn name(self) -> &'static str {
        match self {
            Self::Fan => "fan",
            Self::Atomizer => "atomizer",
            Self::Fridge => "fridge",
            Self::Heater => "heater",
        }
    }
}

/// Logical (energised = `true`) state of every actuator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActuatorState {
    pub fan: bool,
    pub atomizer: bool,
    pub fridge: bool,
    pub heater: bool,
}

impl ActuatorState {
    pub fn get(&self, actuator: Actuator) -> bool {
        match actuator {
            Actuator::Fan => self.fan,
            Actuator::Atomizer => self.atomizer,
            Actuator::Fridge => self.fridge,
            Actuator::Heater => self.heater,
        }
    }
}

/// Write-side port: the controller and the duty policy command actuators
/// through this trait.
///
/// All values are *logical*: `true` means energised.  Line polarity is an
/// adapter concern fixed at construction.
pub trait ActuatorPort {
    /// Switch one actuator on or off.
    fn set(&mut self, actuator: Actuator, on: bool);

    /// Query the current logical state of one actuator.
    fn is_on(&mut self, actuator: Actuator) -> bool;

    /// Snapshot of all four actuators.
    fn state(&mut self) -> ActuatorState {
        ActuatorState {
            fan: self.is_on(Actuator::Fan),
            atomizer: self.is_on(Actuator::Atomizer),
            fridge: self.is_on(Actuator::Fridge),
            heater: self.is_on(Actuator::Heater),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / display)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent setpoints)
// ───────────────────────────────────────────────────────────────

/// Loads and persists the setpoint configuration as a text blob.
///
/// Validation happens in [`SetpointStore`](crate::config::SetpointStore)
/// before `save` is called; implementations only move bytes.
pub trait ConfigPort {
    /// Whether a stored configuration exists.
    fn exists(&self) -> bool;

    /// Load configuration from persistent storage.
    fn load(&self) -> Result<SetpointConfig, ConfigError>;

    /// Persist configuration.
    fn save(&mut self, config: &SetpointConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations and setpoint validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// No config found in storage.
    NotFound,
    /// Stored config failed to parse.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}
