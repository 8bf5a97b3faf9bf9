//! Unified error types for the boiler controller.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! orchestrator's error handling uniform.  All variants are `Copy` so they
//! can be passed through the control path without allocation.
//!
//! Rejections never mutate state: a setter that returns `Err` leaves the
//! previous value in place.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A sensor could not be read or returned out-of-range data.
    Sensor(SensorError),
    /// Actuator travel range rejected.
    TravelRange(TravelRangeError),
    /// Configuration is invalid.
    Config(ConfigError),
    /// Refused while the safety override holds the actuators.
    SafetyOverride,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::TravelRange(e) => write!(f, "travel range: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::SafetyOverride => write!(f, "safety override active"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// ADC read returned an error or timed out.
    AdcReadFailed,
    /// Raw reading sits on a rail (open or shorted thermistor).
    OutOfRange,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AdcReadFailed => write!(f, "ADC read failed"),
            Self::OutOfRange => write!(f, "reading out of range"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Travel range errors
// ---------------------------------------------------------------------------

/// Why a servo travel limit was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TravelRangeError {
    /// Requested minimum is not below the current maximum.
    MinNotBelowMax { min: u16, max: u16 },
    /// Requested maximum is not above the current minimum.
    MaxNotAboveMin { min: u16, max: u16 },
    /// Requested limit exceeds the servo's physical travel.
    BeyondPhysicalLimit { value: u16, limit: u16 },
}

impl fmt::Display for TravelRangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MinNotBelowMax { min, max } => {
                write!(f, "minimum {min} must be below maximum {max}")
            }
            Self::MaxNotAboveMin { min, max } => {
                write!(f, "maximum {max} must be above minimum {min}")
            }
            Self::BeyondPhysicalLimit { value, limit } => {
                write!(f, "{value} exceeds physical limit {limit}")
            }
        }
    }
}

impl From<TravelRangeError> for Error {
    fn from(e: TravelRangeError) -> Self {
        Self::TravelRange(e)
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
        }
    }
}

impl core::error::Error for ConfigError {}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
