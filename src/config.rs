//! System configuration parameters
//!
//! All tunable parameters for the boiler controller.  Defaults match the
//! installed hardware; the control surface may replace them at runtime
//! through [`AppCommand::UpdateConfig`](crate::app::commands::AppCommand).

use serde::{Deserialize, Serialize};

use crate::control::autotune::{ControlClass, TuningParams};
use crate::control::pid::PidGains;
use crate::control::travel::SERVO_TRAVEL_LIMIT_DEG;
use crate::error::ConfigError;

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Thresholds ---
    /// Combustion chamber temperature (°C) above which the fire counts as burning
    pub burning_threshold_c: f32,
    /// Boiler water temperature (°C) above which the heating pump may run
    pub heating_threshold_c: f32,
    /// Boiler water temperature (°C) that trips the safety override
    pub critical_threshold_c: f32,

    // --- Air intake ---
    /// Default combustion temperature setpoint (°C)
    pub target_burning_c: f32,
    /// Servo angle at 0% air (degrees)
    pub servo_min_deg: u16,
    /// Servo angle at 100% air (degrees)
    pub servo_max_deg: u16,

    // --- PID ---
    pub pid_kp: f32,
    pub pid_ki: f32,
    pub pid_kd: f32,
    /// PID sample interval (milliseconds)
    pub pid_sample_interval_ms: u64,

    // --- Auto-tune ---
    /// Which Ziegler–Nichols rule set to apply
    pub autotune_class: ControlClass,
    /// Hysteresis around the setpoint during the relay experiment (°C)
    pub autotune_noise_band_c: f32,
    /// Relay amplitude (air intake %)
    pub autotune_output_step: f32,
    /// Tuner sampling cadence (milliseconds)
    pub autotune_cadence_ms: u64,
    /// Number of samples a peak must dominate
    pub autotune_peak_window: usize,

    // --- Timing ---
    /// Sensor read / safety evaluation interval (milliseconds)
    pub sensor_read_interval_ms: u64,
    /// Telemetry report interval (milliseconds)
    pub telemetry_interval_ms: u64,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Thresholds
            burning_threshold_c: 100.0,
            heating_threshold_c: 40.0,
            critical_threshold_c: 90.0,

            // Air intake
            target_burning_c: 85.0,
            servo_min_deg: 0,
            servo_max_deg: 180,

            // PID
            pid_kp: 2.0,
            pid_ki: 0.1,
            pid_kd: 1.0,
            pid_sample_interval_ms: 1000,

            // Auto-tune (PI is the better fit for a slow thermal process)
            autotune_class: ControlClass::Pi,
            autotune_noise_band_c: 1.0,
            autotune_output_step: 50.0,
            autotune_cadence_ms: 500,
            autotune_peak_window: 10,

            // Timing
            sensor_read_interval_ms: 1000, // 1 Hz
            telemetry_interval_ms: 10_000,
        }
    }
}

impl SystemConfig {
    /// PID gains as a single value.
    pub fn pid_gains(&self) -> PidGains {
        PidGains::new(self.pid_kp, self.pid_ki, self.pid_kd)
    }

    /// Relay experiment parameters.
    pub fn tuning_params(&self) -> TuningParams {
        TuningParams {
            output_step: self.autotune_output_step,
            noise_band: self.autotune_noise_band_c,
            control_class: self.autotune_class,
            cadence_ms: self.autotune_cadence_ms,
            peak_window: self.autotune_peak_window,
        }
    }

    /// Range-check every field.
    ///
    /// Invalid values are rejected, not clamped.  A config that would
    /// disable the over-temperature override must never be accepted.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.critical_threshold_c.is_finite() || self.critical_threshold_c <= 0.0 {
            return Err(ConfigError::ValidationFailed(
                "critical threshold must be a positive temperature",
            ));
        }
        if !self.heating_threshold_c.is_finite()
            || self.heating_threshold_c >= self.critical_threshold_c
        {
            return Err(ConfigError::ValidationFailed(
                "heating threshold must be below the critical threshold",
            ));
        }
        if !self.burning_threshold_c.is_finite() {
            return Err(ConfigError::ValidationFailed(
                "burning threshold must be finite",
            ));
        }
        if !self.target_burning_c.is_finite() {
            return Err(ConfigError::ValidationFailed("target must be finite"));
        }
        if self.servo_min_deg >= self.servo_max_deg {
            return Err(ConfigError::ValidationFailed(
                "servo minimum must be below servo maximum",
            ));
        }
        if self.servo_max_deg > SERVO_TRAVEL_LIMIT_DEG {
            return Err(ConfigError::ValidationFailed(
                "servo maximum exceeds physical travel",
            ));
        }
        if ![self.pid_kp, self.pid_ki, self.pid_kd]
            .iter()
            .all(|g| g.is_finite())
        {
            return Err(ConfigError::ValidationFailed("PID gains must be finite"));
        }
        if self.pid_sample_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed(
                "PID sample interval must be non-zero",
            ));
        }
        self.tuning_params().validate()?;
        if self.autotune_cadence_ms > self.pid_sample_interval_ms {
            return Err(ConfigError::ValidationFailed(
                "tuner cadence must not exceed the PID sample interval",
            ));
        }
        if self.sensor_read_interval_ms == 0 || self.telemetry_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed(
                "timing intervals must be non-zero",
            ));
        }
        Ok(())
    }
}
