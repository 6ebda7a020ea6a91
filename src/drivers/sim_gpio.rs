//! In-memory digital lines for the host build.
//!
//! Each pin shares its level with a [`LineProbe`] so the simulation (and
//! tests) can watch outputs or drive inputs from another thread.  Levels
//! are raw electrical levels; polarity is applied by the driver that owns
//! the pin.

use core::convert::Infallible;
use core::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use embedded_hal::digital::{ErrorType, InputPin, OutputPin, StatefulOutputPin};

/// Shared view of one simulated line.
#[derive(Debug, Clone, Default)]
pub struct LineProbe {
    level: Arc<AtomicBool>,
}

impl LineProbe {
    pub fn is_high(&self) -> bool {
        self.level.load(Ordering::Acquire)
    }

    /// Force the raw level (input lines: the "outside world" side).
    pub fn set_high(&self, high: bool) {
        self.level.store(high, Ordering::Release);
    }
}

/// Output line backed by a [`LineProbe`].
#[derive(Debug)]
pub struct SimOutputPin {
    probe: LineProbe,
}

impl SimOutputPin {
    /// New output at the given initial raw level, plus a probe to observe it.
    pub fn new(initial_high: bool) -> (Self, LineProbe) {
        let probe = LineProbe::default();
        probe.set_high(initial_high);
        (
            Self {
                probe: probe.clone(),
            },
            probe,
        )
    }
}

impl ErrorType for SimOutputPin {
    type Error = Infallible;
}

impl OutputPin for SimOutputPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.probe.set_high(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.probe.set_high(true);
        Ok(())
    }
}

impl StatefulOutputPin for SimOutputPin {
    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.probe.is_high())
    }

    fn is_set_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.probe.is_high())
    }
}

/// Input line backed by a [`LineProbe`].
#[derive(Debug)]
pub struct SimInputPin {
    probe: LineProbe,
}

impl SimInputPin {
    pub fn new(initial_high: bool) -> (Self, LineProbe) {
        let probe = LineProbe::default();
        probe.set_high(initial_high);
        (
            Self {
                probe: probe.clone(),
            },
            probe,
        )
    }
}

impl ErrorType for SimInputPin {
    type Error = Infallible;
}

impl InputPin for SimInputPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.probe.is_high())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.probe.is_high())
    }
}
