//! Fan duty-cycle policy.
//!
//! With `FanMode::DutyCycle` the fan alternates fixed minimum on and off
//! periods regardless of humidity:
//!
//! - fan on  and `elapsed >= fan_on_interval  * 60 s` → off, restart clock
//! - fan off and `elapsed >= fan_off_interval * 60 s` → on,  restart clock
//! - otherwise nothing; the clock keeps running toward the next threshold
//!
//! The clock is the scheduler's tick counter, seen through [`DutyClock`].

use std::time::Duration;

use log::info;

use crate::app::ports::{Actuator, ActuatorPort};
use crate::config::{FanMode, SetpointConfig};

/// Elapsed-time source for the duty policy.
pub trait DutyClock {
    /// Ticks since the last restart.
    fn elapsed_ticks(&self) -> u32;

    /// Zero the tick count.
    fn restart(&self);
}

/// What one duty evaluation did to the fan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DutyAction {
    TurnedOn,
    TurnedOff,
    Hold,
}

#[derive(Debug, Clone, Copy)]
pub struct FanDutyPolicy {
    tick_period: Duration,
}

impl Default for FanDutyPolicy {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl FanDutyPolicy {
    pub fn new(tick_period: Duration) -> Self {
        Self { tick_period }
    }

    fn elapsed_secs(&self, ticks: u32) -> u64 {
        u64::from(ticks) * self.tick_period.as_millis() as u64 / 1000
    }

    /// Evaluate the policy once.  Does nothing unless the fan is in
    /// duty-cycle mode.
    pub fn evaluate(
        &self,
        setpoints: &SetpointConfig,
        clock: &impl DutyClock,
        hw: &mut impl ActuatorPort,
    ) -> DutyAction {
        if setpoints.fan_mode != FanMode::DutyCycle {
            return DutyAction::Hold;
        }

        let elapsed = self.elapsed_secs(clock.elapsed_ticks());
        if hw.is_on(Actuator::Fan) {
            if elapsed >= u64::from(setpoints.fan_on_secs()) {
                info!("Fan off after {}s", elapsed);
                hw.set(Actuator::Fan, false);
                clock.restart();
                return DutyAction::TurnedOff;
            }
        } else if elapsed >= u64::from(setpoints.fan_off_secs()) {
            info!("Fan on after {}s", elapsed);
            hw.set(Actuator::Fan, true);
            clock.restart();
            return DutyAction::TurnedOn;
        }
        DutyAction::Hold
    }
}
