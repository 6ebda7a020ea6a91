//! Unified error types for the cabinet controller.
//!
//! A single `Error` enum for the operations the entry point propagates:
//! bringing the scheduler up and driving the lines off at shutdown.  Sensor
//! faults and config errors never leave their subsystems; they travel as
//! values (`SampleOutcome`, `AppEvent::ConfigSaveFailed`) and are `Copy`
//! so the deferred queue carries them without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Errors the binary propagates out of `main`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A digital output line could not be driven or read back.
    Actuator(ActuatorError),
    /// The sampling scheduler refused a lifecycle request.
    Scheduler(SchedulerError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Actuator(e) => write!(f, "actuator: {e}"),
            Self::Scheduler(e) => write!(f, "scheduler: {e}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor faults
// ---------------------------------------------------------------------------

/// Recoverable sensor failure.  Triggers power-cycle recovery in the
/// sampling task; never reaches the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorFault {
    /// The sensor did not answer within the protocol window.
    Timeout,
    /// The frame arrived but its checksum did not match.
    Checksum,
    /// The reading is NaN or outside the sensor's physical envelope.
    OutOfRange,
    /// The enable line is low; the sensor cannot answer.
    NotPowered,
}

impl fmt::Display for SensorFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "timeout"),
            Self::Checksum => write!(f, "checksum mismatch"),
            Self::OutOfRange => write!(f, "reading out of range"),
            Self::NotPowered => write!(f, "sensor not powered"),
        }
    }
}

// ---------------------------------------------------------------------------
// Actuator errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorError {
    /// GPIO set failed.
    GpioWriteFailed,
    /// GPIO state read-back failed.
    GpioReadFailed,
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GpioWriteFailed => write!(f, "GPIO write failed"),
            Self::GpioReadFailed => write!(f, "GPIO read failed"),
        }
    }
}

impl From<ActuatorError> for Error {
    fn from(e: ActuatorError) -> Self {
        Self::Actuator(e)
    }
}

// ---------------------------------------------------------------------------
// Scheduler errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerError {
    /// `start()` was called while the tick source is already armed.
    AlreadyRunning,
    /// `start()` was called after an explicit `stop()`; stopping is terminal.
    Stopped,
    /// The tick source or the sampling task could not be created.
    SpawnFailed,
}

impl fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyRunning => write!(f, "already running"),
            Self::Stopped => write!(f, "stopped (terminal)"),
            Self::SpawnFailed => write!(f, "task spawn failed"),
        }
    }
}

impl From<SchedulerError> for Error {
    fn from(e: SchedulerError) -> Self {
        Self::Scheduler(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
