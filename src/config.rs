//! Setpoint configuration.
//!
//! All tunable parameters of the cabinet.  The live values are owned by
//! [`SetpointStore`]; the controller and the duty policy borrow them each
//! cycle, so an edit made through the pager takes effect on the next cycle.

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::app::ports::{ConfigError, ConfigPort};

/// Which component owns the fan line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FanMode {
    /// The hysteresis controller switches the fan on humidity.
    #[default]
    Hysteresis,
    /// The duty-cycle policy alternates fixed on/off intervals.
    DutyCycle,
}

impl FanMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Hysteresis => Self::DutyCycle,
            Self::DutyCycle => Self::Hysteresis,
        }
    }
}

/// Cabinet setpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SetpointConfig {
    // --- Temperature ---
    /// Target temperature (°C)
    pub target_temperature: f32,
    /// Dead-band half width for heater/fridge (°C)
    pub temperature_tolerance: f32,

    // --- Humidity ---
    /// Target relative humidity (%)
    pub target_humidity: f32,
    /// Dead-band half width for fan/atomizer (%)
    pub humidity_tolerance: f32,

    // --- Fan duty cycle ---
    /// Minimum fan on time (minutes)
    pub fan_on_interval_minutes: u16,
    /// Minimum fan off time (minutes)
    pub fan_off_interval_minutes: u16,
    pub fan_mode: FanMode,
}

impl Default for SetpointConfig {
    fn default() -> Self {
        Self {
            target_temperature: 50.0,
            temperature_tolerance: 2.0,

            target_humidity: 55.0,
            humidity_tolerance: 5.0,

            fan_on_interval_minutes: 5,
            fan_off_interval_minutes: 15,
            fan_mode: FanMode::Hysteresis,
        }
    }
}

impl SetpointConfig {
    /// Range-check every field.  Invalid values are rejected, not clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let floats = [
            self.target_temperature,
            self.temperature_tolerance,
            self.target_humidity,
            self.humidity_tolerance,
        ];
        if floats.iter().any(|v| !v.is_finite()) {
            return Err(ConfigError::ValidationFailed("setpoints must be finite"));
        }
        if !(-40.0..=80.0).contains(&self.target_temperature) {
            return Err(ConfigError::ValidationFailed(
                "target_temperature must be -40.0–80.0",
            ));
        }
        if !(0.0..=100.0).contains(&self.target_humidity) {
            return Err(ConfigError::ValidationFailed(
                "target_humidity must be 0.0–100.0",
            ));
        }
        if self.temperature_tolerance < 0.0 {
            return Err(ConfigError::ValidationFailed(
                "temperature_tolerance must be >= 0",
            ));
        }
        if self.humidity_tolerance < 0.0 {
            return Err(ConfigError::ValidationFailed(
                "humidity_tolerance must be >= 0",
            ));
        }
        if self.fan_on_interval_minutes == 0 || self.fan_off_interval_minutes == 0 {
            return Err(ConfigError::ValidationFailed(
                "fan intervals must be >= 1 minute",
            ));
        }
        Ok(())
    }

    /// Fan on interval in seconds.
    pub fn fan_on_secs(&self) -> u32 {
        u32::from(self.fan_on_interval_minutes) * 60
    }

    /// Fan off interval in seconds.
    pub fn fan_off_secs(&self) -> u32 {
        u32::from(self.fan_off_interval_minutes) * 60
    }

    pub fn get(&self, field: SetpointField) -> FieldValue {
        match field {
            SetpointField::TargetTemperature => FieldValue::Number(self.target_temperature),
            SetpointField::TemperatureTolerance => FieldValue::Number(self.temperature_tolerance),
            SetpointField::TargetHumidity => FieldValue::Number(self.target_humidity),
            SetpointField::HumidityTolerance => FieldValue::Number(self.humidity_tolerance),
            SetpointField::FanOnInterval => FieldValue::Minutes(self.fan_on_interval_minutes),
            SetpointField::FanOffInterval => FieldValue::Minutes(self.fan_off_interval_minutes),
            SetpointField::FanMode => FieldValue::Mode(self.fan_mode),
        }
    }

    /// Write `value` into `field`.  Mismatched value kinds are ignored.
    fn put(&mut self, field: SetpointField, value: FieldValue) {
        match (field, value) {
            (SetpointField::TargetTemperature, FieldValue::Number(v)) => self.target_temperature = v,
            (SetpointField::TemperatureTolerance, FieldValue::Number(v)) => {
                self.temperature_tolerance = v;
            }
            (SetpointField::TargetHumidity, FieldValue::Number(v)) => self.target_humidity = v,
            (SetpointField::HumidityTolerance, FieldValue::Number(v)) => self.humidity_tolerance = v,
            (SetpointField::FanOnInterval, FieldValue::Minutes(m)) => self.fan_on_interval_minutes = m,
            (SetpointField::FanOffInterval, FieldValue::Minutes(m)) => {
                self.fan_off_interval_minutes = m;
            }
            (SetpointField::FanMode, FieldValue::Mode(m)) => self.fan_mode = m,
            (field, value) => warn!("config: {:?} cannot hold {:?}", field, value),
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Editable fields
// ═══════════════════════════════════════════════════════════════

/// Every operator-editable setpoint, in menu order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetpointField {
    TargetTemperature,
    TemperatureTolerance,
    TargetHumidity,
    HumidityTolerance,
    FanOnInterval,
    FanOffInterval,
    FanMode,
}

impl SetpointField {
    pub const ALL: [SetpointField; 7] = [
        Self::TargetTemperature,
        Self::TemperatureTolerance,
        Self::TargetHumidity,
        Self::HumidityTolerance,
        Self::FanOnInterval,
        Self::FanOffInterval,
        Self::FanMode,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::TargetTemperature => "Temperature",
            Self::TemperatureTolerance => "Temp. tolerance",
            Self::TargetHumidity => "Humidity",
            Self::HumidityTolerance => "Hum. tolerance",
            Self::FanOnInterval => "Fan on (min)",
            Self::FanOffInterval => "Fan off (min)",
            Self::FanMode => "Fan mode",
        }
    }
}

/// A setpoint value as shown in / edited by the menu.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue {
    Number(f32),
    Minutes(u16),
    Mode(FanMode),
}

impl FieldValue {
    /// One "up" step: +0.5 for numbers, +1 minute, or mode toggle.
    pub fn step_up(self) -> Self {
        match self {
            Self::Number(v) => Self::Number(v + 0.5),
            Self::Minutes(m) => Self::Minutes(m.saturating_add(1)),
            Self::Mode(m) => Self::Mode(m.toggled()),
        }
    }

    /// One "down" step.  Minutes saturate at zero; validation rejects zero on commit.
    pub fn step_down(self) -> Self {
        match self {
            Self::Number(v) => Self::Number(v - 0.5),
            Self::Minutes(m) => Self::Minutes(m.saturating_sub(1)),
            Self::Mode(m) => Self::Mode(m.toggled()),
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Store
// ═══════════════════════════════════════════════════════════════

/// Owner of the live setpoints.  Every setter persists immediately
/// through the [`ConfigPort`] when the value actually changed.
pub struct SetpointStore<P: ConfigPort> {
    current: SetpointConfig,
    port: P,
    startup_fault: Option<ConfigError>,
}

impl<P: ConfigPort> SetpointStore<P> {
    /// Load the stored configuration, or write the defaults if none exists.
    ///
    /// Never fails: a corrupt or unwritable store leaves the defaults in
    /// memory and is reported through [`startup_fault`](Self::startup_fault).
    pub fn open(mut port: P) -> Self {
        let mut startup_fault = None;
        let current = if port.exists() {
            match port.load().and_then(|c| c.validate().map(|()| c)) {
                Ok(cfg) => {
                    info!("Config loaded from store");
                    cfg
                }
                Err(e) => {
                    warn!("Config load failed ({}), using defaults", e);
                    startup_fault = Some(e);
                    SetpointConfig::default()
                }
            }
        } else {
            let cfg = SetpointConfig::default();
            match port.save(&cfg) {
                Ok(()) => info!("No stored config, defaults written"),
                Err(e) => {
                    warn!("Writing default config failed ({})", e);
                    startup_fault = Some(e);
                }
            }
            cfg
        };

        Self {
            current,
            port,
            startup_fault,
        }
    }

    /// Live setpoints.
    pub fn setpoints(&self) -> &SetpointConfig {
        &self.current
    }

    /// Error encountered while opening the store, if any.
    pub fn startup_fault(&self) -> Option<ConfigError> {
        self.startup_fault
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    // ── Getters ───────────────────────────────────────────────

    pub fn target_temperature(&self) -> f32 {
        self.current.target_temperature
    }

    pub fn temperature_tolerance(&self) -> f32 {
        self.current.temperature_tolerance
    }

    pub fn target_humidity(&self) -> f32 {
        self.current.target_humidity
    }

    pub fn humidity_tolerance(&self) -> f32 {
        self.current.humidity_tolerance
    }

    pub fn fan_on_interval(&self) -> u16 {
        self.current.fan_on_interval_minutes
    }

    pub fn fan_off_interval(&self) -> u16 {
        self.current.fan_off_interval_minutes
    }

    pub fn fan_mode(&self) -> FanMode {
        self.current.fan_mode
    }

    // ── Setters (persist on change) ───────────────────────────

    pub fn set_target_temperature(&mut self, value: f32) -> Result<bool, ConfigError> {
        self.set(SetpointField::TargetTemperature, FieldValue::Number(value))
    }

    pub fn set_temperature_tolerance(&mut self, value: f32) -> Result<bool, ConfigError> {
        self.set(SetpointField::TemperatureTolerance, FieldValue::Number(value))
    }

    pub fn set_target_humidity(&mut self, value: f32) -> Result<bool, ConfigError> {
        self.set(SetpointField::TargetHumidity, FieldValue::Number(value))
    }

    pub fn set_humidity_tolerance(&mut self, value: f32) -> Result<bool, ConfigError> {
        self.set(SetpointField::HumidityTolerance, FieldValue::Number(value))
    }

    pub fn set_fan_on_interval(&mut self, minutes: u16) -> Result<bool, ConfigError> {
        self.set(SetpointField::FanOnInterval, FieldValue::Minutes(minutes))
    }

    pub fn set_fan_off_interval(&mut self, minutes: u16) -> Result<bool, ConfigError> {
        self.set(SetpointField::FanOffInterval, FieldValue::Minutes(minutes))
    }

    pub fn set_fan_mode(&mut self, mode: FanMode) -> Result<bool, ConfigError> {
        self.set(SetpointField::FanMode, FieldValue::Mode(mode))
    }

    /// Set one field.  Returns `Ok(true)` if the value changed and was
    /// written, `Ok(false)` if it was already equal.
    ///
    /// A rejected value leaves the live config untouched.  A failed write
    /// keeps the new value live (it is what the operator asked for) and
    /// returns the error; nothing is retried.
    pub fn set(&mut self, field: SetpointField, value: FieldValue) -> Result<bool, ConfigError> {
        let mut next = self.current.clone();
        next.put(field, value);
        if next == self.current {
            return Ok(false);
        }
        next.validate()?;
        self.current = next;
        self.port.save(&self.current)?;
        info!("Config: {} = {:?} saved", field.label(), value);
        Ok(true)
    }
}
