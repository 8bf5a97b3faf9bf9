//! Safety supervisor.
//!
//! The supervisor runs **every tick before the control loop** and turns
//! the latest temperatures into pump, fan and air-intake overrides.
//!
//! ## Modes
//!
//! - `Normal`: relays follow combustion state; the air intake is left to
//!   the control loop.
//! - `Critical`: boiler water is above the critical threshold.  Both pumps
//!   and the fans run and the air intake is forced shut, whatever the fire
//!   is doing.  The control loop is not run at all.
//!
//! Mode changes are returned as [`SafetyEvent`] values, exactly once per
//! edge.  Nothing is latched beyond the previous mode: the supervisor
//! leaves `Critical` on the first reading at or below the threshold.

use log::{error, info};
use serde::Serialize;

use crate::config::SystemConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SafetyMode {
    Normal,
    Critical,
}

/// Relay and actuator demands for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SafetyCommand {
    pub mode: SafetyMode,
    pub boiler_pump: bool,
    pub heating_pump: bool,
    pub fans: bool,
    /// Air intake must be held at 0 %; the control loop is bypassed.
    pub force_actuator_closed: bool,
}

impl SafetyCommand {
    /// Critical override: circulate, ventilate and starve the fire.  Also
    /// applied while temperatures cannot be read.
    pub const FAIL_SAFE: Self = Self {
        mode: SafetyMode::Critical,
        boiler_pump: true,
        heating_pump: true,
        fans: true,
        force_actuator_closed: true,
    };

    /// Everything off, actuator left to the control loop.
    pub const IDLE: Self = Self {
        mode: SafetyMode::Normal,
        boiler_pump: false,
        heating_pump: false,
        fans: false,
        force_actuator_closed: false,
    };
}

/// Mode transition, reported on the tick it happens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SafetyEvent {
    EnteredCritical { boiler_water_c: f32 },
    LeftCritical { boiler_water_c: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SafetyEvaluation {
    pub command: SafetyCommand,
    pub event: Option<SafetyEvent>,
}

/// Safety supervisor.
pub struct SafetySupervisor {
    critical_c: f32,
    heating_c: f32,
    burning_c: f32,
    mode: SafetyMode,
}

impl SafetySupervisor {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            critical_c: config.critical_threshold_c,
            heating_c: config.heating_threshold_c,
            burning_c: config.burning_threshold_c,
            mode: SafetyMode::Normal,
        }
    }

    /// Pick up new thresholds.  The current mode is kept; the next
    /// `evaluate` re-checks it against the new values.
    pub fn reconfigure(&mut self, config: &SystemConfig) {
        self.critical_c = config.critical_threshold_c;
        self.heating_c = config.heating_threshold_c;
        self.burning_c = config.burning_threshold_c;
    }

    /// Evaluate the thresholds against fresh readings.
    ///
    /// A NaN boiler reading never counts as critical; sensor faults are
    /// handled by the caller before temperatures reach this point.
    pub fn evaluate(&mut self, boiler_water_c: f32, burning_c: f32) -> SafetyEvaluation {
        if boiler_water_c > self.critical_c {
            let event = (self.mode != SafetyMode::Critical).then(|| {
                error!(
                    "ALERT! Critical water temperature {:.1}°C (limit {:.1}°C), emergency mode activated",
                    boiler_water_c, self.critical_c
                );
                SafetyEvent::EnteredCritical { boiler_water_c }
            });
            self.mode = SafetyMode::Critical;
            return SafetyEvaluation {
                command: SafetyCommand::FAIL_SAFE,
                event,
            };
        }

        let event = (self.mode == SafetyMode::Critical).then(|| {
            info!(
                "Water temperature normalized at {:.1}°C, normal mode restored",
                boiler_water_c
            );
            SafetyEvent::LeftCritical { boiler_water_c }
        });
        self.mode = SafetyMode::Normal;

        let burning = burning_c > self.burning_c;
        SafetyEvaluation {
            command: SafetyCommand {
                mode: SafetyMode::Normal,
                boiler_pump: burning,
                heating_pump: burning && boiler_water_c > self.heating_c,
                fans: burning,
                force_actuator_closed: false,
            },
            event,
        }
    }

    pub fn mode(&self) -> SafetyMode {
        self.mode
    }

    pub fn is_critical(&self) -> bool {
        self.mode == SafetyMode::Critical
    }
}
