//! Line assignments for the cabinet controller board.
//!
//! Single source of truth: every driver references this module rather
//! than hard-coding pin numbers or polarities.  Change a line here and it
//! propagates everywhere.

use crate::drivers::actuator::Polarity;

// ---------------------------------------------------------------------------
// Climate sensor (DHT22, single-wire, external pull-up)
// ---------------------------------------------------------------------------

pub const DHT_DATA_GPIO: u8 = 22;
/// Sensor supply switch, HIGH = powered.  Dropped after a failed read.
pub const DHT_ENABLE_GPIO: u8 = 13;

// ---------------------------------------------------------------------------
// Actuators
// ---------------------------------------------------------------------------

/// Exhaust fan MOSFET.
pub const FAN_GPIO: u8 = 12;
pub const FAN_POLARITY: Polarity = Polarity::ActiveHigh;

/// Ultrasonic atomizer MOSFET.
pub const ATOMIZER_GPIO: u8 = 15;
pub const ATOMIZER_POLARITY: Polarity = Polarity::ActiveHigh;

/// Compressor relay.  The relay board pulls in when its input is LOW.
pub const FRIDGE_GPIO: u8 = 14;
pub const FRIDGE_POLARITY: Polarity = Polarity::ActiveLow;

/// Heater SSR.
pub const HEATER_GPIO: u8 = 28;
pub const HEATER_POLARITY: Polarity = Polarity::ActiveHigh;

// ---------------------------------------------------------------------------
// Front-panel switches (pull-down, HIGH while pressed)
// ---------------------------------------------------------------------------

pub const SWITCH_UP_GPIO: u8 = 17;
pub const SWITCH_DOWN_GPIO: u8 = 21;
pub const SWITCH_EDIT_GPIO: u8 = 18;
pub const SWITCH_PAGE_GPIO: u8 = 16;
