//! Dead-band (hysteresis) climate controller.
//!
//! Each actuator has two thresholds around its setpoint.  Crossing the
//! outer one switches it on, crossing the inner one switches it off, and
//! in between the line is left alone:
//!
//! | Actuator | On when                 | Off when                  |
//! |----------|-------------------------|---------------------------|
//! | fridge   | `t >= target + tol`     | `t <= target - tol / 2`   |
//! | heater   | `t <= target - tol`     | `t >= target + tol / 2`   |
//! | fan      | `h >= target + tol`     | `h <= target - tol / 2`   |
//! | atomizer | `h <= target - tol`     | `h >= target + tol / 2`   |
//!
//! The controller keeps no history of its own; "prior state" is whatever
//! the output line holds.  A line is only written when one of its
//! thresholds is met.

use log::debug;

use crate::app::ports::{Actuator, ActuatorPort};
use crate::config::{FanMode, SetpointConfig};

/// Which side of the setpoint energises the actuator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Switches on above the band (fridge, fan).
    OnAbove,
    /// Switches on below the band (heater, atomizer).
    OnBelow,
}

/// Decide one actuator.  `Some(on)` means "write this state", `None`
/// means the value is inside the dead band and the line keeps its state.
///
/// With a zero tolerance both thresholds coincide at the target; the off
/// rule wins there.
pub fn decide(direction: Direction, value: f32, target: f32, tolerance: f32) -> Option<bool> {
    let (off, on) = match direction {
        Direction::OnAbove => (
            value <= target - tolerance / 2.0,
            value >= target + tolerance,
        ),
        Direction::OnBelow => (
            value >= target + tolerance / 2.0,
            value <= target - tolerance,
        ),
    };
    if off {
        Some(false)
    } else if on {
        Some(true)
    } else {
        None
    }
}

/// Maps one sample to actuator commands.
#[derive(Debug, Default, Clone, Copy)]
pub struct ClimateController;

impl ClimateController {
    pub fn new() -> Self {
        Self
    }

    /// Run one control cycle against the live setpoints.
    ///
    /// `temperature` and `humidity` must already be validated; the
    /// sampling task rejects NaN and out-of-envelope readings.  The fan
    /// is skipped when the duty-cycle policy owns it.
    pub fn control(
        &self,
        setpoints: &SetpointConfig,
        temperature: f32,
        humidity: f32,
        hw: &mut impl ActuatorPort,
    ) {
        debug_assert!(temperature.is_finite() && humidity.is_finite());

        let t = (setpoints.target_temperature, setpoints.temperature_tolerance);
        let h = (setpoints.target_humidity, setpoints.humidity_tolerance);

        if setpoints.fan_mode == FanMode::Hysteresis {
            Self::apply(hw, Actuator::Fan, decide(Direction::OnAbove, humidity, h.0, h.1));
        }
        Self::apply(hw, Actuator::Atomizer, decide(Direction::OnBelow, humidity, h.0, h.1));
        Self::apply(hw, Actuator::Fridge, decide(Direction::OnAbove, temperature, t.0, t.1));
        Self::apply(hw, Actuator::Heater, decide(Direction::OnBelow, temperature, t.0, t.1));
    }

    fn apply(hw: &mut impl ActuatorPort, actuator: Actuator, decision: Option<bool>) {
        if let Some(on) = decision {
            debug!("control: {} -> {}", actuator.name(), on);
            hw.set(actuator, on);
        }
    }
}
