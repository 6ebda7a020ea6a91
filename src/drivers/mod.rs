//! Actuator and switch drivers, tick source, and task helpers.

pub mod actuator;
pub mod hw_timer;
pub mod sim_gpio;
pub mod switch;
pub mod task;
