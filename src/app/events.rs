//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them: log to the console, drive a status
//! display, etc.

use crate::app::ports::{ActuatorState, ConfigError};
use crate::config::{FanMode, SetpointField};

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// Periodic status snapshot.
    Telemetry(TelemetryData),

    /// One or more health faults were raised (carries the full mask).
    FaultDetected(u8),

    /// All health faults have been cleared.
    FaultCleared,

    /// An operator edit was written to the setpoint store.
    SetpointChanged(SetpointField),

    /// An operator edit failed validation and was not applied.
    SetpointRejected(&'static str),

    /// The setpoint store could not be written.  Not retried.
    ConfigSaveFailed(ConfigError),

    /// The duty-cycle policy switched the fan.
    FanToggled { on: bool },

    /// The application service has started.
    Started(FanMode),
}

/// A point-in-time status snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryData {
    /// Best available sample (`None` until the first good read).
    pub temperature_c: Option<f32>,
    pub humidity_pct: Option<f32>,
    pub target_temperature_c: f32,
    pub target_humidity_pct: f32,
    pub actuators: ActuatorState,
    pub fan_mode: FanMode,
    pub fan_on_minutes: u16,
    pub fan_off_minutes: u16,
    /// Scheduler ticks since the last duty-cycle toggle.
    pub counter: u32,
    pub sample_errors: u32,
    pub fault_flags: u8,
}
