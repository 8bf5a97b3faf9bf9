//! Air-intake control loop.
//!
//! Owns the PID controller and the relay auto-tuner and decides, per tick,
//! which of the two drives the actuator.
//!
//! ```text
//!              request_auto_tune (ok)
//!   Automatic ──────────────────────────▶ Tuning
//!       ▲                                   │
//!       └──── result / failure / cancel ────┘
//! ```
//!
//! The PID sits in manual mode for the duration of an experiment, so its
//! integral and gains are untouched unless the experiment completes.

use log::{info, warn};
use serde::Serialize;

use super::autotune::{RelayAutoTuner, TunerPhase, TuningParams, TuningResult};
use super::pid::{PidController, PidGains, PidMode};
use super::travel::clamp_percent;
use crate::config::SystemConfig;
use crate::error::ConfigError;

/// Who currently drives the actuator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopMode {
    Automatic,
    Tuning,
}

/// How the last tuning experiment ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TuningOutcome {
    /// Gains installed.
    Completed(TuningResult),
    /// Oscillation was degenerate; previous gains kept.
    Failed,
    /// Aborted by the caller; previous gains kept.
    Cancelled,
}

pub struct ControlLoop {
    pid: PidController,
    tuner: RelayAutoTuner,
    params: TuningParams,
    mode: LoopMode,
    /// Actuator command of the most recent tick (0–100 %).
    command: f32,
    last_outcome: Option<TuningOutcome>,
}

impl ControlLoop {
    pub fn new(gains: PidGains, setpoint: f32, sample_interval_ms: u64, params: TuningParams) -> Self {
        Self {
            pid: PidController::new(gains, setpoint, sample_interval_ms),
            tuner: RelayAutoTuner::new(params),
            params,
            mode: LoopMode::Automatic,
            command: 0.0,
            last_outcome: None,
        }
    }

    pub fn from_config(config: &SystemConfig) -> Self {
        Self::new(
            config.pid_gains(),
            config.target_burning_c,
            config.pid_sample_interval_ms,
            config.tuning_params(),
        )
    }

    /// Run one control step and return the actuator command in percent.
    pub fn tick(&mut self, measured: f32, now_ms: u64) -> f32 {
        match self.mode {
            LoopMode::Automatic => {
                self.command = clamp_percent(self.pid.compute(measured, now_ms));
            }
            LoopMode::Tuning => {
                let result = self.tuner.step(measured, now_ms);
                self.command = clamp_percent(self.tuner.command());

                if let Some(gains) = result {
                    self.pid.set_gains(gains);
                    let outcome = match self.tuner.last_result() {
                        Some(r) => TuningOutcome::Completed(r),
                        None => TuningOutcome::Failed,
                    };
                    self.end_tuning(outcome);
                } else if !self.tuner.is_running() {
                    warn!("Control loop: tuning ended without a result, keeping gains");
                    self.end_tuning(TuningOutcome::Failed);
                }
            }
        }
        self.command
    }

    /// Start a relay experiment.  Returns `false` if one is already running.
    pub fn request_auto_tune(&mut self, measured: f32, now_ms: u64) -> bool {
        if self.mode == LoopMode::Tuning {
            return false;
        }
        self.pid.set_mode(PidMode::Manual);
        self.tuner
            .start(measured, self.pid.setpoint(), self.params, now_ms);
        self.mode = LoopMode::Tuning;
        self.last_outcome = None;
        true
    }

    /// Abort a running experiment and hand the actuator back to the PID.
    pub fn cancel_auto_tune(&mut self) {
        if self.mode != LoopMode::Tuning {
            return;
        }
        self.tuner.cancel();
        self.end_tuning(TuningOutcome::Cancelled);
    }

    pub fn set_target(&mut self, setpoint: f32) {
        self.pid.set_target(setpoint);
    }

    pub fn set_gains(&mut self, gains: PidGains) {
        self.pid.set_gains(gains);
    }

    pub fn set_sample_interval(&mut self, interval_ms: u64) {
        self.pid.set_sample_interval(interval_ms);
    }

    /// Parameters for the next experiment; a running one keeps its own.
    pub fn set_tuning_params(&mut self, params: TuningParams) -> Result<(), ConfigError> {
        params.validate()?;
        self.params = params;
        Ok(())
    }

    /// Clear PID sample history, e.g. after the loop was bypassed.
    pub fn reinitialize(&mut self) {
        self.pid.initialize();
    }

    pub fn mode(&self) -> LoopMode {
        self.mode
    }

    pub fn is_tuning(&self) -> bool {
        self.mode == LoopMode::Tuning
    }

    pub fn tuner_phase(&self) -> TunerPhase {
        self.tuner.phase()
    }

    pub fn peak_count(&self) -> usize {
        self.tuner.peak_count()
    }

    pub fn gains(&self) -> PidGains {
        self.pid.gains()
    }

    pub fn setpoint(&self) -> f32 {
        self.pid.setpoint()
    }

    pub fn command(&self) -> f32 {
        self.command
    }

    pub fn last_outcome(&self) -> Option<TuningOutcome> {
        self.last_outcome
    }

    pub fn pid(&self) -> &PidController {
        &self.pid
    }

    fn end_tuning(&mut self, outcome: TuningOutcome) {
        self.pid.set_mode(PidMode::Automatic);
        self.mode = LoopMode::Automatic;
        self.last_outcome = Some(outcome);
        info!("Control loop: back to automatic ({:?})", outcome);
    }
}
