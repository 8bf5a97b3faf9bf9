//! PID controller for the air-intake actuator
//!
//! Proportional-integral-derivative controller holding the combustion
//! chamber at its target temperature.  The controller is rate limited:
//! calls arriving before one sample interval has elapsed return the
//! previous output untouched.
//!
//! The derivative term acts on the measurement, not the error, so a
//! setpoint change never produces a derivative kick.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Proportional, integral and derivative gains.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PidGains {
    pub kp: f32,
    pub ki: f32,
    pub kd: f32,
}

impl PidGains {
    pub const fn new(kp: f32, ki: f32, kd: f32) -> Self {
        Self { kp, ki, kd }
    }

    /// True if every gain is a finite number.
    pub fn is_finite(&self) -> bool {
        self.kp.is_finite() && self.ki.is_finite() && self.kd.is_finite()
    }
}

/// Whether `compute` drives the output or merely holds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PidMode {
    Automatic,
    /// Output held; some other component owns the actuator.
    Manual,
}

/// PID controller
pub struct PidController {
    gains: PidGains,
    setpoint: f32,
    output: f32,
    /// Accumulated error·seconds (unscaled by `ki`).
    integral: f32,
    last_error: f32,
    last_input: Option<f32>,
    last_time_ms: Option<u64>,
    sample_interval_ms: u64,
    output_min: f32,
    output_max: f32,
    mode: PidMode,
}

impl PidController {
    pub fn new(gains: PidGains, setpoint: f32, sample_interval_ms: u64) -> Self {
        Self {
            gains,
            setpoint,
            output: 0.0,
            integral: 0.0,
            last_error: 0.0,
            last_input: None,
            last_time_ms: None,
            sample_interval_ms,
            output_min: 0.0,
            output_max: 100.0,
            mode: PidMode::Automatic,
        }
    }

    /// Set output limits.  Rejects `min >= max` and keeps the old bounds.
    pub fn set_output_limits(&mut self, min: f32, max: f32) -> Result<(), ConfigError> {
        if !(min.is_finite() && max.is_finite()) || min >= max {
            return Err(ConfigError::ValidationFailed(
                "PID output minimum must be below maximum",
            ));
        }
        self.output_min = min;
        self.output_max = max;
        self.output = self.output.clamp(min, max);
        Ok(())
    }

    /// Update setpoint
    pub fn set_target(&mut self, setpoint: f32) {
        self.setpoint = setpoint;
    }

    /// Replace the gains.  The integral accumulator is kept.
    pub fn set_gains(&mut self, gains: PidGains) {
        self.gains = gains;
    }

    pub fn set_sample_interval(&mut self, interval_ms: u64) {
        self.sample_interval_ms = interval_ms.max(1);
    }

    /// Switch between automatic and manual operation.
    ///
    /// Entering automatic from manual re-initialises the timing and
    /// derivative history so the first step afterwards sees no spike.
    pub fn set_mode(&mut self, mode: PidMode) {
        if mode == PidMode::Automatic && self.mode == PidMode::Manual {
            self.initialize();
        }
        self.mode = mode;
    }

    /// Forget sample history; the next `compute` runs immediately.
    pub fn initialize(&mut self) {
        self.last_input = None;
        self.last_time_ms = None;
    }

    /// Compute PID output given current measurement and a monotonic timestamp.
    pub fn compute(&mut self, measured: f32, now_ms: u64) -> f32 {
        if self.mode == PidMode::Manual {
            return self.output;
        }

        let elapsed_ms = match self.last_time_ms {
            Some(last) => {
                let elapsed = now_ms.saturating_sub(last);
                if elapsed < self.sample_interval_ms {
                    return self.output;
                }
                elapsed
            }
            None => self.sample_interval_ms,
        };
        let dt = elapsed_ms as f32 / 1000.0;

        let error = self.setpoint - measured;

        // Proportional
        let p = self.gains.kp * error;

        // Integral (committed below, after the windup check)
        let integral = self.integral + error * dt;
        let i = self.gains.ki * integral;

        // Derivative on measurement
        let derivative = match self.last_input {
            Some(prev) => (measured - prev) / dt,
            None => 0.0,
        };
        let d = self.gains.kd * derivative;

        let unclamped = p + i - d;
        let output = unclamped.clamp(self.output_min, self.output_max);

        // Anti-windup: stop integrating in the direction that saturates.
        // Direction follows the error sign, so it holds for any `ki`.
        let winding_up = (unclamped > self.output_max && error > 0.0)
            || (unclamped < self.output_min && error < 0.0);
        if !winding_up {
            self.integral = integral;
        }

        self.last_error = error;
        self.last_input = Some(measured);
        self.last_time_ms = Some(now_ms);
        self.output = output;

        output
    }

    /// Reset controller state
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.last_error = 0.0;
        self.initialize();
    }

    pub fn gains(&self) -> PidGains {
        self.gains
    }

    pub fn setpoint(&self) -> f32 {
        self.setpoint
    }

    /// Last computed (or held) output.
    pub fn output(&self) -> f32 {
        self.output
    }

    pub fn integral(&self) -> f32 {
        self.integral
    }

    pub fn last_error(&self) -> f32 {
        self.last_error
    }

    pub fn mode(&self) -> PidMode {
        self.mode
    }

    pub fn output_limits(&self) -> (f32, f32) {
        (self.output_min, self.output_max)
    }
}
