//! Numeric conversions between vendor readings and driver values.
//!
//! Rounding is half away from zero everywhere (`f64::round`), both for the
//! whole-number path and the one-decimal path.

use core::fmt;
use std::error::Error;

use crate::translate::drivers::DriverValue;

/// Raw input that could not be read as a finite number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionError {
    pub input: String,
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "not a number: {:?}", self.input)
    }
}

impl Error for ConversionError {}

/// How a vendor field encodes a temperature.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum TemperatureEncoding {
    /// Plain decimal degrees (current thermostat API).
    #[default]
    Degrees,
    /// Degrees multiplied by ten (legacy sensor API). A raw 0 means "no reading".
    Tenths,
}

impl TemperatureEncoding {
    pub fn decode(self, raw: Option<f64>) -> Option<f64> {
        match (self, raw) {
            (TemperatureEncoding::Degrees, v) => v,
            (TemperatureEncoding::Tenths, Some(v)) if v == 0.0 => None,
            (TemperatureEncoding::Tenths, Some(v)) => Some(v / 10.0),
            (TemperatureEncoding::Tenths, None) => None,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TemperatureUnit {
    Fahrenheit,
    Celsius,
}

impl TemperatureUnit {
    /// The vendor's `units` field.
    pub fn parse(units: &str) -> Option<Self> {
        match units {
            "Fahrenheit" => Some(TemperatureUnit::Fahrenheit),
            "Celsius" => Some(TemperatureUnit::Celsius),
            _ => None,
        }
    }

    pub fn from_celsius_flag(use_celsius: bool) -> Self {
        if use_celsius { TemperatureUnit::Celsius } else { TemperatureUnit::Fahrenheit }
    }
}

/// Re-expresses `value` in `to`; identity when the units already match.
pub fn convert_temperature(value: f64, from: TemperatureUnit, to: TemperatureUnit) -> f64 {
    match (from, to) {
        (TemperatureUnit::Fahrenheit, TemperatureUnit::Celsius) => fahrenheit_to_celsius(value),
        (TemperatureUnit::Celsius, TemperatureUnit::Fahrenheit) => celsius_to_fahrenheit(value),
        _ => value,
    }
}

/// Parse a host-supplied raw value. Non-finite values are rejected too.
pub fn parse_numeric(raw: &str) -> Result<f64, ConversionError> {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(ConversionError { input: raw.to_string() }),
    }
}

/// Absent values become 0 of the requested kind.
pub fn to_driver_value(value: Option<f64>, as_integer: bool) -> DriverValue {
    match (value, as_integer) {
        (None, true) => DriverValue::Integer(0),
        (None, false) => DriverValue::Decimal(0.0),
        (Some(v), true) => DriverValue::Integer(v.round() as i64),
        (Some(v), false) => DriverValue::Decimal(round_one_decimal(v)),
    }
}

pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Nearest multiple of 0.5, used for Celsius setpoints sent to the vendor.
pub fn to_half_step(value: f64) -> f64 {
    (value * 2.0).round() / 2.0
}

/// Whole-degree Celsius.
pub fn fahrenheit_to_celsius(temp_f: f64) -> f64 {
    ((temp_f - 32.0) * 5.0 / 9.0).round()
}

/// Whole-degree Fahrenheit.
pub fn celsius_to_fahrenheit(temp_c: f64) -> f64 {
    (temp_c * 1.8).round() + 32.0
}
