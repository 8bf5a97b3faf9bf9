//! Outbound application events.
//!
//! The [`BoilerService`](super::service::BoilerService) emits these through
//! the [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them: log to serial, keep them in the
//! [`EventLog`](super::event_log::EventLog) ring, publish a status report.

use core::fmt;

use serde::Serialize;

use crate::control::autotune::{TunerPhase, TuningResult};
use crate::control::pid::PidGains;
use crate::error::{Error, SensorError};
use crate::safety::{SafetyEvent, SafetyMode};

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The service has started with the given setpoint.
    Started { setpoint_c: f32 },

    /// The safety supervisor changed mode.
    Safety(SafetyEvent),

    /// Sensors could not be read; the fail-safe override is active.
    SensorFault(SensorError),

    /// Sensors readable again after a fault.
    SensorRecovered,

    TuningStarted { setpoint_c: f32 },
    TuningCompleted(TuningResult),
    /// Oscillation was degenerate; gains unchanged.
    TuningFailed,
    TuningCancelled,

    SetpointChanged { setpoint_c: f32 },

    TravelRangeChanged { min_deg: u16, max_deg: u16 },

    ConfigUpdated,

    AuxRelayChanged { on: bool },

    /// A command was refused; state is unchanged.
    CommandRejected(Error),

    /// Periodic status snapshot.
    Telemetry(StatusReport),
}

impl fmt::Display for AppEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Started { setpoint_c } => write!(f, "controller started, target {setpoint_c:.1}°C"),
            Self::Safety(SafetyEvent::EnteredCritical { boiler_water_c }) => write!(
                f,
                "ALERT! Critical water temperature {boiler_water_c:.1}°C, emergency mode activated"
            ),
            Self::Safety(SafetyEvent::LeftCritical { boiler_water_c }) => write!(
                f,
                "water temperature normalized at {boiler_water_c:.1}°C, normal mode restored"
            ),
            Self::SensorFault(e) => write!(f, "sensor fault: {e}, fail-safe engaged"),
            Self::SensorRecovered => write!(f, "sensors recovered"),
            Self::TuningStarted { setpoint_c } => {
                write!(f, "auto-tune started at {setpoint_c:.1}°C")
            }
            Self::TuningCompleted(r) => write!(
                f,
                "auto-tune complete: kp={:.3} ki={:.4} kd={:.3}",
                r.gains.kp, r.gains.ki, r.gains.kd
            ),
            Self::TuningFailed => write!(f, "auto-tune failed, gains unchanged"),
            Self::TuningCancelled => write!(f, "auto-tune cancelled"),
            Self::SetpointChanged { setpoint_c } => {
                write!(f, "target temperature set to {setpoint_c:.1}°C")
            }
            Self::TravelRangeChanged { min_deg, max_deg } => {
                write!(f, "servo range set to {min_deg}-{max_deg}°")
            }
            Self::ConfigUpdated => write!(f, "configuration updated"),
            Self::AuxRelayChanged { on } => {
                write!(f, "auxiliary relay {}", if *on { "ON" } else { "OFF" })
            }
            Self::CommandRejected(e) => write!(f, "command rejected: {e}"),
            Self::Telemetry(r) => write!(
                f,
                "water={:.1} heating={:.1} burning={:.1} air={:.0}% mode={:?}",
                r.boiler_water_temp, r.heating_temp, r.burning_temp, r.air_intake, r.safety_mode
            ),
        }
    }
}

/// Point-in-time status, serialisable for a status endpoint or telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatusReport {
    pub boiler_water_temp: f32,
    pub heating_temp: f32,
    pub burning_temp: f32,
    pub ambient_temp: f32,
    pub boiler_pump: bool,
    pub heating_pump: bool,
    pub fans: bool,
    /// Auxiliary relay.
    pub other: bool,
    pub target_burning_temp: f32,
    /// Air intake, percent open.
    pub air_intake: f32,
    pub auto_tuning: bool,
    pub tuner_phase: TunerPhase,
    pub killswitch_active: bool,
    pub safety_mode: SafetyMode,
    pub sensor_fault: bool,
    pub servo_min: u16,
    pub servo_max: u16,
    pub pid: PidGains,
}
