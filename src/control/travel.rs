//! Air-intake travel range.
//!
//! The control core speaks in percent of air (0 = closed, 100 = fully
//! open).  The servo on the intake flap is mounted so that only part of
//! its travel is useful; `TravelRange` maps the percentage onto that
//! window of servo degrees.

use serde::{Deserialize, Serialize};

use crate::error::TravelRangeError;

/// Mechanical end stop of the hobby servo on the intake flap.
pub const SERVO_TRAVEL_LIMIT_DEG: u16 = 180;

/// Servo angles at 0% and 100% air.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TravelRange {
    min_deg: u16,
    max_deg: u16,
}

impl Default for TravelRange {
    fn default() -> Self {
        Self {
            min_deg: 0,
            max_deg: SERVO_TRAVEL_LIMIT_DEG,
        }
    }
}

impl TravelRange {
    pub fn new(min_deg: u16, max_deg: u16) -> Result<Self, TravelRangeError> {
        if max_deg > SERVO_TRAVEL_LIMIT_DEG {
            return Err(TravelRangeError::BeyondPhysicalLimit {
                value: max_deg,
                limit: SERVO_TRAVEL_LIMIT_DEG,
            });
        }
        if min_deg >= max_deg {
            return Err(TravelRangeError::MinNotBelowMax {
                min: min_deg,
                max: max_deg,
            });
        }
        Ok(Self { min_deg, max_deg })
    }

    /// Move the 0% end.  Must stay below the current maximum.
    pub fn set_min(&mut self, min_deg: u16) -> Result<(), TravelRangeError> {
        if min_deg >= self.max_deg {
            return Err(TravelRangeError::MinNotBelowMax {
                min: min_deg,
                max: self.max_deg,
            });
        }
        self.min_deg = min_deg;
        Ok(())
    }

    /// Move the 100% end.  Must stay above the current minimum and within
    /// the servo's physical travel.
    pub fn set_max(&mut self, max_deg: u16) -> Result<(), TravelRangeError> {
        if max_deg > SERVO_TRAVEL_LIMIT_DEG {
            return Err(TravelRangeError::BeyondPhysicalLimit {
                value: max_deg,
                limit: SERVO_TRAVEL_LIMIT_DEG,
            });
        }
        if max_deg <= self.min_deg {
            return Err(TravelRangeError::MaxNotAboveMin {
                min: self.min_deg,
                max: max_deg,
            });
        }
        self.max_deg = max_deg;
        Ok(())
    }

    pub fn min_deg(&self) -> u16 {
        self.min_deg
    }

    pub fn max_deg(&self) -> u16 {
        self.max_deg
    }

    /// Servo angle for an air-intake percentage.  NaN maps to closed.
    pub fn angle_for(&self, percent: f32) -> u16 {
        let pct = clamp_percent(percent);
        let span = f32::from(self.max_deg - self.min_deg);
        self.min_deg + (span * pct / 100.0).round() as u16
    }
}

/// Clamp a command to 0–100 %, treating NaN as fully closed.
pub fn clamp_percent(percent: f32) -> f32 {
    if percent.is_nan() {
        0.0
    } else {
        percent.clamp(0.0, 100.0)
    }
}
