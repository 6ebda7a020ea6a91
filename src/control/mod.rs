//! Control laws: the dead-band climate controller and the fan duty-cycle
//! policy.  Both write actuators only through
//! [`ActuatorPort`](crate::app::ports::ActuatorPort).

pub mod fan_duty;
pub mod hysteresis;
