//! Inbound commands to the application service.
//!
//! These represent actions requested by the outside world (settings
//! endpoint, serial console, simulation script) that the
//! [`BoilerService`](super::service::BoilerService) interprets and acts upon.

use heapless::Vec;
use serde::Deserialize;

use crate::config::SystemConfig;

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    /// New combustion setpoint (°C).
    SetTargetTemperature(f32),

    /// Servo angle at 0% air.
    SetServoMin(u16),

    /// Servo angle at 100% air.
    SetServoMax(u16),

    StartAutoTune,

    CancelAutoTune,

    /// Cancel a running experiment, otherwise start one.
    ToggleAutoTune,

    /// Switch the auxiliary relay.
    SetAuxRelay(bool),

    /// Replace the whole configuration (validated before it is applied).
    UpdateConfig(SystemConfig),
}

/// Partial settings update as posted by the web UI.
///
/// ```json
/// { "target_burning_temp": 90.0, "servo_min": 20, "servo_max": 160, "autotune": true }
/// ```
///
/// Every key is optional and unknown keys are ignored.  `autotune: true`
/// toggles the experiment; `false` does nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct SettingsPatch {
    pub target_burning_temp: Option<f32>,
    pub servo_min: Option<u16>,
    pub servo_max: Option<u16>,
    #[serde(default)]
    pub autotune: bool,
}

impl SettingsPatch {
    pub fn from_json(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }

    /// Commands in application order: target, servo min, servo max, tuning.
    pub fn commands(&self) -> Vec<AppCommand, 4> {
        let mut out = Vec::new();
        // Capacity equals the number of fields; pushes cannot fail.
        if let Some(t) = self.target_burning_temp {
            let _ = out.push(AppCommand::SetTargetTemperature(t));
        }
        if let Some(min) = self.servo_min {
            let _ = out.push(AppCommand::SetServoMin(min));
        }
        if let Some(max) = self.servo_max {
            let _ = out.push(AppCommand::SetServoMax(max));
        }
        if self.autotune {
            let _ = out.push(AppCommand::ToggleAutoTune);
        }
        out
    }
}
