//! Relay-feedback auto-tuner.
//!
//! Drives the air intake as a two-level relay around the setpoint until the
//! combustion temperature settles into a self-sustained limit cycle, then
//! reads the ultimate gain `Ku` and ultimate period `Tu` off that cycle and
//! converts them into PID gains with the Ziegler–Nichols rules.
//!
//! ```text
//!   Idle ──start──▶ AwaitingSteady ──|pv − sp| < band──▶ Oscillating
//!    ▲                                                      │
//!    └────────────── 4 confirmed peaks / cancel ────────────┘
//! ```
//!
//! There is no internal timeout.  A process that never settles or never
//! oscillates keeps the experiment running until the caller cancels it.
//!
//! All history is held in fixed-capacity arrays; nothing allocates.

use core::f32::consts::PI;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use super::pid::PidGains;
use crate::error::ConfigError;

/// Largest peak-detection window the sample ring can hold.
pub const MAX_PEAK_WINDOW: usize = 32;

/// Confirmed peaks needed before gains are computed.
pub const PEAKS_REQUIRED: usize = 4;

/// Ziegler–Nichols rule set to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlClass {
    P,
    Pi,
    Pid,
}

/// Relay experiment parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TuningParams {
    /// Relay high level (air intake %); the low level is 0.
    pub output_step: f32,
    /// Hysteresis half-width around the setpoint.
    pub noise_band: f32,
    pub control_class: ControlClass,
    /// Minimum spacing between two tuner steps.
    pub cadence_ms: u64,
    /// Samples a peak must dominate (newest included).
    pub peak_window: usize,
}

impl TuningParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.output_step.is_finite() || self.output_step <= 0.0 {
            return Err(ConfigError::ValidationFailed(
                "auto-tune output step must be positive",
            ));
        }
        if !self.noise_band.is_finite() || self.noise_band <= 0.0 {
            return Err(ConfigError::ValidationFailed(
                "auto-tune noise band must be positive",
            ));
        }
        if self.cadence_ms == 0 {
            return Err(ConfigError::ValidationFailed(
                "auto-tune cadence must be non-zero",
            ));
        }
        if !(2..=MAX_PEAK_WINDOW).contains(&self.peak_window) {
            return Err(ConfigError::ValidationFailed(
                "auto-tune peak window out of range",
            ));
        }
        Ok(())
    }
}

/// Experiment phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TunerPhase {
    Idle,
    AwaitingSteady,
    Oscillating,
}

/// Direction of the last detected extremum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PeakSign {
    Unknown,
    Rising,
    Falling,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Extremum {
    Max,
    Min,
}

/// Outcome of a completed experiment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TuningResult {
    pub gains: PidGains,
    pub ultimate_gain: f32,
    pub ultimate_period_secs: f32,
    /// Half the distance between the last two peaks.
    pub amplitude: f32,
}

/// Apply the Ziegler–Nichols ultimate-cycle rules.
pub fn ziegler_nichols(class: ControlClass, ku: f32, tu_secs: f32) -> PidGains {
    match class {
        ControlClass::Pid => PidGains::new(0.6 * ku, 1.2 * ku / tu_secs, 0.075 * ku * tu_secs),
        ControlClass::Pi => PidGains::new(0.45 * ku, 0.54 * ku / tu_secs, 0.0),
        ControlClass::P => PidGains::new(0.5 * ku, 0.0, 0.0),
    }
}

// ───────────────────────────────────────────────────────────────
// Sample ring
// ───────────────────────────────────────────────────────────────

/// Fixed-capacity history of the most recent samples.
///
/// `head` indexes the newest sample; older samples sit behind it modulo
/// `window`.
#[derive(Debug, Clone)]
struct SampleRing {
    buf: [f32; MAX_PEAK_WINDOW],
    head: usize,
    len: usize,
    window: usize,
}

impl SampleRing {
    fn new(window: usize) -> Self {
        Self {
            buf: [0.0; MAX_PEAK_WINDOW],
            head: 0,
            len: 0,
            window: window.clamp(2, MAX_PEAK_WINDOW),
        }
    }

    /// Overwrite every slot with `value`.
    fn fill(&mut self, value: f32) {
        self.buf[..self.window].fill(value);
        self.head = 0;
        self.len = self.window;
    }

    fn push(&mut self, value: f32) {
        self.head = (self.head + 1) % self.window;
        self.buf[self.head] = value;
        self.len = (self.len + 1).min(self.window);
    }

    /// Samples newest first.
    fn iter(&self) -> impl Iterator<Item = f32> + '_ {
        (0..self.len).map(move |k| self.buf[(self.head + self.window - k) % self.window])
    }

    /// Classify the newest sample against its predecessors.
    ///
    /// Comparisons are strict: a plateau is neither a maximum nor a minimum.
    fn classify(&self) -> Option<Extremum> {
        if self.len < self.window {
            return None;
        }
        let mut samples = self.iter();
        let newest = samples.next()?;
        let (mut is_max, mut is_min) = (true, true);
        for prev in samples {
            is_max &= newest > prev;
            is_min &= newest < prev;
        }
        match (is_max, is_min) {
            (true, _) => Some(Extremum::Max),
            (_, true) => Some(Extremum::Min),
            _ => None,
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Tuner
// ───────────────────────────────────────────────────────────────

/// Relay-feedback auto-tuner.
///
/// The tuner owns only its own command value; it never touches the PID
/// controller.  Callers pass the measurement in and read the command out.
pub struct RelayAutoTuner {
    phase: TunerPhase,
    params: TuningParams,
    setpoint: f32,
    command: f32,
    ring: SampleRing,
    peak_sign: PeakSign,
    peak_count: usize,
    peaks: [f32; PEAKS_REQUIRED],
    peak_times_ms: [u64; PEAKS_REQUIRED - 1],
    last_step_ms: u64,
    result: Option<TuningResult>,
}

impl RelayAutoTuner {
    pub fn new(params: TuningParams) -> Self {
        Self {
            phase: TunerPhase::Idle,
            params,
            setpoint: 0.0,
            command: 0.0,
            ring: SampleRing::new(params.peak_window),
            peak_sign: PeakSign::Unknown,
            peak_count: 0,
            peaks: [0.0; PEAKS_REQUIRED],
            peak_times_ms: [0; PEAKS_REQUIRED - 1],
            last_step_ms: 0,
            result: None,
        }
    }

    /// Arm a new experiment.  Ignored while one is already running.
    pub fn start(&mut self, measured: f32, setpoint: f32, params: TuningParams, now_ms: u64) {
        if self.is_running() {
            debug!("Auto-tune: start ignored, experiment already running");
            return;
        }
        self.params = params;
        self.setpoint = setpoint;
        self.ring = SampleRing::new(params.peak_window);
        self.peak_sign = PeakSign::Unknown;
        self.peak_count = 0;
        self.peaks = [0.0; PEAKS_REQUIRED];
        self.peak_times_ms = [0; PEAKS_REQUIRED - 1];
        self.last_step_ms = now_ms;
        self.command = self.steady_command(measured);
        self.phase = TunerPhase::AwaitingSteady;
        info!(
            "Auto-tune: started (sp={:.1}, step={:.1}, band={:.2}, class={:?})",
            setpoint, params.output_step, params.noise_band, params.control_class
        );
    }

    /// Abort immediately, discarding partial peaks.
    pub fn cancel(&mut self) {
        if self.is_running() {
            info!(
                "Auto-tune: cancelled in {:?} after {} peaks",
                self.phase, self.peak_count
            );
        }
        self.phase = TunerPhase::Idle;
        self.peak_sign = PeakSign::Unknown;
        self.peak_count = 0;
    }

    /// Advance the experiment by one sample.
    ///
    /// Returns the new gains on the step that completes the experiment.
    /// Calls closer together than the cadence are ignored.
    pub fn step(&mut self, measured: f32, now_ms: u64) -> Option<PidGains> {
        if !self.is_running() || now_ms.saturating_sub(self.last_step_ms) < self.params.cadence_ms
        {
            return None;
        }
        self.last_step_ms = now_ms;

        match self.phase {
            TunerPhase::Idle => None,
            TunerPhase::AwaitingSteady => {
                self.command = self.steady_command(measured);
                if (measured - self.setpoint).abs() < self.params.noise_band {
                    // Kick the process the other way to start the cycle.
                    self.command = if measured > self.setpoint {
                        self.params.output_step
                    } else {
                        0.0
                    };
                    self.ring.fill(measured);
                    self.phase = TunerPhase::Oscillating;
                    info!("Auto-tune: steady at {:.2}, relay oscillation started", measured);
                }
                None
            }
            TunerPhase::Oscillating => {
                self.ring.push(measured);
                match self.ring.classify() {
                    Some(Extremum::Max) => {
                        if self.peak_sign == PeakSign::Falling {
                            self.record_peak(measured, now_ms);
                        }
                        self.peak_sign = PeakSign::Rising;
                    }
                    Some(Extremum::Min) => {
                        if self.peak_sign == PeakSign::Rising {
                            self.record_peak(measured, now_ms);
                        }
                        self.peak_sign = PeakSign::Falling;
                    }
                    None => {}
                }

                if self.peak_count >= PEAKS_REQUIRED {
                    return self.finish();
                }

                let band = self.params.noise_band;
                if measured > self.setpoint + band && self.command > 0.0 {
                    self.command = 0.0;
                } else if measured < self.setpoint - band && self.command < self.params.output_step
                {
                    self.command = self.params.output_step;
                }
                None
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.phase != TunerPhase::Idle
    }

    pub fn phase(&self) -> TunerPhase {
        self.phase
    }

    /// Current relay command (0 or the output step).
    pub fn command(&self) -> f32 {
        self.command
    }

    pub fn peak_count(&self) -> usize {
        self.peak_count
    }

    /// Result of the most recent successful experiment.
    pub fn last_result(&self) -> Option<TuningResult> {
        self.result
    }

    // ── Internal ──────────────────────────────────────────────

    /// Relay level that pushes the measurement toward the setpoint.
    fn steady_command(&self, measured: f32) -> f32 {
        if measured > self.setpoint {
            0.0
        } else {
            self.params.output_step
        }
    }

    fn record_peak(&mut self, value: f32, now_ms: u64) {
        self.peaks[self.peak_count] = value;
        if let Some(t) = self.peak_times_ms.get_mut(self.peak_count) {
            *t = now_ms;
        }
        self.peak_count += 1;
        debug!(
            "Auto-tune: peak {} at {:.2} (t={}ms)",
            self.peak_count, value, now_ms
        );
    }

    fn finish(&mut self) -> Option<PidGains> {
        self.phase = TunerPhase::Idle;

        let n = self.peak_count - 1;
        let amplitude = 0.5 * (self.peaks[n] - self.peaks[n - 1]).abs();
        let ku = 4.0 * self.params.output_step / (amplitude * PI);
        let span_ms = self.peak_times_ms[PEAKS_REQUIRED - 2].saturating_sub(self.peak_times_ms[0]);
        let tu_secs = span_ms as f32 / 1000.0;
        let gains = ziegler_nichols(self.params.control_class, ku, tu_secs);

        if !gains.is_finite() {
            warn!(
                "Auto-tune: degenerate oscillation (a={:.3}, Tu={:.1}s), result discarded",
                amplitude, tu_secs
            );
            return None;
        }

        info!(
            "Auto-tune: complete Ku={:.3} Tu={:.1}s -> kp={:.3} ki={:.4} kd={:.3}",
            ku, tu_secs, gains.kp, gains.ki, gains.kd
        );
        self.result = Some(TuningResult {
            gains,
            ultimate_gain: ku,
            ultimate_period_secs: tu_secs,
            amplitude,
        });
        Some(gains)
    }
}
