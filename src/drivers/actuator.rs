//! Relay / MOSFET output lines for the four cabinet actuators.
//!
//! Every line is constructed with a fixed [`Polarity`].  The driver
//! translates between the *logical* state (`true` = energised) and the raw
//! electrical level, so nothing above this module ever sees an inverted
//! value.  The fridge relay board is active-low (see [`crate::pins`]).
//!
//! Lines are driven to their de-energised level at construction.

use embedded_hal::digital::StatefulOutputPin;
use log::{debug, warn};

use crate::app::ports::{Actuator, ActuatorPort};
use crate::error::ActuatorError;

/// Electrical level that energises the load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    ActiveHigh,
    ActiveLow,
}

impl Polarity {
    fn level_for(self, on: bool) -> bool {
        match self {
            Self::ActiveHigh => on,
            Self::ActiveLow => !on,
        }
    }
}

/// One digital output with a fixed polarity.
pub struct ActuatorLine<P> {
    pin: P,
    polarity: Polarity,
    name: &'static str,
    /// Last commanded logical state; reported if read-back fails.
    commanded: bool,
}

impl<P: StatefulOutputPin> ActuatorLine<P> {
    pub fn new(pin: P, polarity: Polarity, name: &'static str) -> Self {
        let mut line = Self {
            pin,
            polarity,
            name,
            commanded: false,
        };
        if let Err(e) = line.set(false) {
            warn!("{}: initial off failed: {}", name, e);
        }
        line
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    /// Drive the line to the logical state `on`.
    pub fn set(&mut self, on: bool) -> Result<(), ActuatorError> {
        let high = self.polarity.level_for(on);
        let res = if high {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        res.map_err(|_| ActuatorError::GpioWriteFailed)?;
        self.commanded = on;
        Ok(())
    }

    /// Logical state read back from the pin's output register.
    pub fn is_on(&mut self) -> Result<bool, ActuatorError> {
        let high = self
            .pin
            .is_set_high()
            .map_err(|_| ActuatorError::GpioReadFailed)?;
        Ok(self.polarity.level_for(high))
    }

    /// Last logical state successfully commanded.
    pub fn commanded(&self) -> bool {
        self.commanded
    }
}

/// The cabinet's four output lines behind [`ActuatorPort`].
pub struct ActuatorBank<P> {
    fan: ActuatorLine<P>,
    atomizer: ActuatorLine<P>,
    fridge: ActuatorLine<P>,
    heater: ActuatorLine<P>,
}

impl<P: StatefulOutputPin> ActuatorBank<P> {
    pub fn new(
        fan: ActuatorLine<P>,
        atomizer: ActuatorLine<P>,
        fridge: ActuatorLine<P>,
        heater: ActuatorLine<P>,
    ) -> Self {
        Self {
            fan,
            atomizer,
            fridge,
            heater,
        }
    }

    fn line(&mut self, actuator: Actuator) -> &mut ActuatorLine<P> {
        match actuator {
            Actuator::Fan => &mut self.fan,
            Actuator::Atomizer => &mut self.atomizer,
            Actuator::Fridge => &mut self.fridge,
            Actuator::Heater => &mut self.heater,
        }
    }

    /// De-energise everything (shutdown path).  Every line is tried; the
    /// first failure is returned.
    pub fn all_off(&mut self) -> Result<(), ActuatorError> {
        let mut first = Ok(());
        for a in Actuator::ALL {
            let line = self.line(a);
            if let Err(e) = line.set(false) {
                warn!("{}: off failed: {}", line.name(), e);
                first = first.and(Err(e));
            }
        }
        first
    }
}

impl<P: StatefulOutputPin> ActuatorPort for ActuatorBank<P> {
    fn set(&mut self, actuator: Actuator, on: bool) {
        let line = self.line(actuator);
        match line.set(on) {
            Ok(()) => debug!("{} -> {}", line.name(), if on { "ON" } else { "OFF" }),
            Err(e) => warn!("{}: {}", line.name(), e),
        }
    }

    fn is_on(&mut self, actuator: Actuator) -> bool {
        let line = self.line(actuator);
        match line.is_on() {
            Ok(on) => on,
            Err(e) => {
                warn!("{}: {}, using last commanded state", line.name(), e);
                line.commanded()
            }
        }
    }
}
