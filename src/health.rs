//! Health monitor: the degraded-mode indicator.
//!
//! Nothing here stops the controller.  Faults accumulate in a bitmask
//! that the pager's fault page and the telemetry line display:
//!
//! 1. A condition triggers a fault (e.g. five sampling failures in a row).
//! 2. The monitor sets the corresponding bit.
//! 3. When the condition clears (next good sample, next successful save)
//!    the bit is cleared.
//!
//! Multiple faults can be active at once; the cabinet is healthy only
//! when the mask is zero.

use core::fmt;

use log::{error, info};

use crate::scheduler::SampleOutcome;

/// Consecutive sampling failures before the sample is reported stale.
pub const SENSOR_STALE_AFTER: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthFault {
    /// The controller is running on an old sample.
    SensorStale,
    /// The setpoint store could not be read or written.
    ConfigIo,
}

impl HealthFault {
    pub const ALL: [HealthFault; 2] = [Self::SensorStale, Self::ConfigIo];

    pub fn mask(self) -> u8 {
        match self {
            Self::SensorStale => 1 << 0,
            Self::ConfigIo => 1 << 1,
        }
    }
}

impl fmt::Display for HealthFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SensorStale => write!(f, "sensor stale"),
            Self::ConfigIo => write!(f, "config storage error"),
        }
    }
}

#[derive(Debug, Default)]
pub struct HealthMonitor {
    faults: u8,
}

impl HealthMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one sampling outcome in.  Returns the updated mask.
    pub fn on_sample(&mut self, outcome: &SampleOutcome) -> u8 {
        match outcome {
            SampleOutcome::Fresh(_) => self.eval_fault(HealthFault::SensorStale, false),
            SampleOutcome::Failed { consecutive, .. } => {
                self.eval_fault(HealthFault::SensorStale, *consecutive >= SENSOR_STALE_AFTER);
            }
        }
        self.faults
    }

    /// Record whether the last config store access succeeded.
    pub fn on_config_io(&mut self, ok: bool) -> u8 {
        self.eval_fault(HealthFault::ConfigIo, !ok);
        self.faults
    }

    pub fn faults(&self) -> u8 {
        self.faults
    }

    pub fn has_faults(&self) -> bool {
        self.faults != 0
    }

    pub fn has_fault(&self, fault: HealthFault) -> bool {
        self.faults & fault.mask() != 0
    }

    /// Active faults in a fixed order.
    pub fn active(&self) -> impl Iterator<Item = HealthFault> + '_ {
        HealthFault::ALL.into_iter().filter(|f| self.has_fault(*f))
    }

    fn eval_fault(&mut self, fault: HealthFault, condition: bool) {
        if condition {
            if self.faults & fault.mask() == 0 {
                error!("FAULT SET: {fault}");
            }
            self.faults |= fault.mask();
        } else {
            if self.faults & fault.mask() != 0 {
                info!("FAULT CLEARED: {fault}");
            }
            self.faults &= !fault.mask();
        }
    }
}
