//! Application service: the hexagonal core.
//!
//! [`BoilerService`] owns the safety supervisor, the air-intake control
//! loop and the live configuration.  All I/O flows through port traits
//! injected at call sites, making the entire service testable with mock
//! adapters.
//!
//! ```text
//!  SensorPort ──▶ ┌──────────────────────────┐ ──▶ EventSink
//!                 │      BoilerService        │
//! ActuatorPort ◀──│  Safety · ControlLoop     │
//!                 └──────────────────────────┘
//! ```
//!
//! Per tick: read sensors, evaluate safety, run the control loop unless an
//! override holds the intake shut, write relays and servo, emit events.

use log::{info, warn};

use crate::config::SystemConfig;
use crate::control::{ControlLoop, TravelRange, TuningOutcome};
use crate::error::{ConfigError, Error};
use crate::safety::{SafetyCommand, SafetyEvent, SafetySupervisor};

use super::commands::AppCommand;
use super::events::{AppEvent, StatusReport};
use super::ports::{ActuatorPort, EventSink, SensorPort, SensorSnapshot};

// ───────────────────────────────────────────────────────────────
// BoilerService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct BoilerService {
    config: SystemConfig,
    safety: SafetySupervisor,
    control: ControlLoop,
    travel: TravelRange,
    /// Last successful sensor read.
    snapshot: SensorSnapshot,
    /// Relay demands applied on the last tick.
    relays: SafetyCommand,
    /// Operator-switched auxiliary relay; no override touches it.
    aux_relay: bool,
    /// Air intake applied on the last tick (0–100 %).
    air_intake: f32,
    sensor_fault: bool,
    last_telemetry_ms: Option<u64>,
    tick_count: u64,
}

impl BoilerService {
    /// Construct the service from a validated configuration.
    pub fn new(config: SystemConfig) -> Result<Self, Error> {
        config.validate()?;
        let travel = TravelRange::new(config.servo_min_deg, config.servo_max_deg)?;
        Ok(Self {
            safety: SafetySupervisor::new(&config),
            control: ControlLoop::from_config(&config),
            travel,
            snapshot: SensorSnapshot::default(),
            relays: SafetyCommand::IDLE,
            aux_relay: false,
            air_intake: 0.0,
            sensor_fault: false,
            last_telemetry_ms: None,
            tick_count: 0,
            config,
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Put every output in a known state and announce startup.
    pub fn start(&mut self, hw: &mut impl ActuatorPort, sink: &mut impl EventSink) {
        hw.all_off();
        self.aux_relay = false;
        self.air_intake = 0.0;
        hw.set_air_intake(0.0, self.travel.angle_for(0.0));
        sink.emit(&AppEvent::Started {
            setpoint_c: self.control.setpoint(),
        });
        info!(
            "BoilerService started, target {:.1}°C, gains {:?}",
            self.control.setpoint(),
            self.control.gains()
        );
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one full cycle: read sensors → safety → control → actuators.
    ///
    /// The `hw` parameter satisfies **both** [`SensorPort`] and
    /// [`ActuatorPort`], which avoids a double mutable borrow while
    /// keeping the port boundary explicit.
    pub fn tick(
        &mut self,
        hw: &mut (impl SensorPort + ActuatorPort),
        sink: &mut impl EventSink,
        now_ms: u64,
    ) {
        self.tick_count += 1;

        // 1. Sensors
        match hw.read_all() {
            Ok(snapshot) => {
                self.snapshot = snapshot;
                if self.sensor_fault {
                    self.sensor_fault = false;
                    self.control.reinitialize();
                    info!("Sensors recovered, resuming control");
                    sink.emit(&AppEvent::SensorRecovered);
                }
            }
            Err(e) => {
                if !self.sensor_fault {
                    self.sensor_fault = true;
                    warn!("Sensor read failed ({}), holding fail-safe outputs", e);
                    sink.emit(&AppEvent::SensorFault(e));
                    self.abort_tuning(sink);
                }
                self.relays = SafetyCommand::FAIL_SAFE;
                self.air_intake = 0.0;
                self.apply_outputs(hw);
                self.maybe_emit_telemetry(sink, now_ms);
                return;
            }
        }

        // 2. Safety evaluation
        let eval = self
            .safety
            .evaluate(self.snapshot.boiler_water_c, self.snapshot.burning_c);
        if let Some(event) = eval.event {
            sink.emit(&AppEvent::Safety(event));
            match event {
                SafetyEvent::EnteredCritical { .. } => self.abort_tuning(sink),
                SafetyEvent::LeftCritical { .. } => self.control.reinitialize(),
            }
        }
        self.relays = eval.command;

        // 3. Air intake: override or control loop, never both
        if eval.command.force_actuator_closed {
            self.air_intake = 0.0;
        } else {
            let was_tuning = self.control.is_tuning();
            self.air_intake = self.control.tick(self.snapshot.burning_c, now_ms);
            if was_tuning && !self.control.is_tuning() {
                self.report_tuning_outcome(sink);
            }
        }

        // 4. Outputs
        self.apply_outputs(hw);

        // 5. Telemetry
        self.maybe_emit_telemetry(sink, now_ms);
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an external command.
    ///
    /// A rejected command leaves every setting as it was and is also
    /// reported as [`AppEvent::CommandRejected`].
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        sink: &mut impl EventSink,
        now_ms: u64,
    ) -> Result<(), Error> {
        let result = self.apply_command(cmd, sink, now_ms);
        if let Err(e) = result {
            warn!("Command rejected: {}", e);
            sink.emit(&AppEvent::CommandRejected(e));
        }
        result
    }

    fn apply_command(
        &mut self,
        cmd: AppCommand,
        sink: &mut impl EventSink,
        now_ms: u64,
    ) -> Result<(), Error> {
        match cmd {
            AppCommand::SetTargetTemperature(setpoint_c) => {
                if !setpoint_c.is_finite() {
                    return Err(ConfigError::ValidationFailed("target must be finite").into());
                }
                self.control.set_target(setpoint_c);
                self.config.target_burning_c = setpoint_c;
                info!("New target temperature: {:.1}°C", setpoint_c);
                sink.emit(&AppEvent::SetpointChanged { setpoint_c });
            }
            AppCommand::SetServoMin(deg) => {
                self.travel.set_min(deg)?;
                self.travel_changed(sink);
            }
            AppCommand::SetServoMax(deg) => {
                self.travel.set_max(deg)?;
                self.travel_changed(sink);
            }
            AppCommand::StartAutoTune => self.start_tuning(sink, now_ms)?,
            AppCommand::CancelAutoTune => self.cancel_tuning(sink),
            AppCommand::ToggleAutoTune => {
                if self.control.is_tuning() {
                    self.cancel_tuning(sink);
                } else {
                    self.start_tuning(sink, now_ms)?;
                }
            }
            AppCommand::SetAuxRelay(on) => {
                self.aux_relay = on;
                info!("Auxiliary relay {}", if on { "ON" } else { "OFF" });
                sink.emit(&AppEvent::AuxRelayChanged { on });
            }
            AppCommand::UpdateConfig(new_config) => {
                new_config.validate()?;
                let travel = TravelRange::new(new_config.servo_min_deg, new_config.servo_max_deg)?;
                self.control
                    .set_tuning_params(new_config.tuning_params())?;
                self.control.set_gains(new_config.pid_gains());
                self.control.set_target(new_config.target_burning_c);
                self.control
                    .set_sample_interval(new_config.pid_sample_interval_ms);
                self.safety.reconfigure(&new_config);
                self.travel = travel;
                self.config = new_config;
                info!("Configuration updated at runtime");
                sink.emit(&AppEvent::ConfigUpdated);
            }
        }
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────

    /// Snapshot of everything a status page needs.
    pub fn status(&self) -> StatusReport {
        StatusReport {
            boiler_water_temp: self.snapshot.boiler_water_c,
            heating_temp: self.snapshot.heating_c,
            burning_temp: self.snapshot.burning_c,
            ambient_temp: self.snapshot.ambient_c,
            boiler_pump: self.relays.boiler_pump,
            heating_pump: self.relays.heating_pump,
            fans: self.relays.fans,
            other: self.aux_relay,
            target_burning_temp: self.control.setpoint(),
            air_intake: self.air_intake,
            auto_tuning: self.control.is_tuning(),
            tuner_phase: self.control.tuner_phase(),
            killswitch_active: self.is_override_active(),
            safety_mode: self.safety.mode(),
            sensor_fault: self.sensor_fault,
            servo_min: self.travel.min_deg(),
            servo_max: self.travel.max_deg(),
            pid: self.control.gains(),
        }
    }

    /// True while the intake is forced shut (critical water or sensor fault).
    pub fn is_override_active(&self) -> bool {
        self.sensor_fault || self.safety.is_critical()
    }

    pub fn control(&self) -> &ControlLoop {
        &self.control
    }

    pub fn travel(&self) -> TravelRange {
        self.travel
    }

    /// Air intake applied on the last tick (0–100 %).
    pub fn air_intake(&self) -> f32 {
        self.air_intake
    }

    /// Total ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Cadence the caller should tick at: fast enough for both the sensor
    /// interval and the tuner's relay cadence.
    pub fn tick_interval_ms(&self) -> u64 {
        self.config
            .sensor_read_interval_ms
            .min(self.config.autotune_cadence_ms)
    }

    /// Clone of the live configuration, including tuned gains, target and
    /// servo range.
    pub fn current_config(&self) -> SystemConfig {
        self.config.clone()
    }

    // ── Internal ──────────────────────────────────────────────

    fn start_tuning(&mut self, sink: &mut impl EventSink, now_ms: u64) -> Result<(), Error> {
        if self.is_override_active() {
            return Err(Error::SafetyOverride);
        }
        if self
            .control
            .request_auto_tune(self.snapshot.burning_c, now_ms)
        {
            info!("Starting PID auto-tuning, this may take several minutes");
            sink.emit(&AppEvent::TuningStarted {
                setpoint_c: self.control.setpoint(),
            });
        }
        Ok(())
    }

    fn cancel_tuning(&mut self, sink: &mut impl EventSink) {
        if self.control.is_tuning() {
            self.control.cancel_auto_tune();
            sink.emit(&AppEvent::TuningCancelled);
        }
    }

    /// Cancel a running experiment because an override took the actuator.
    fn abort_tuning(&mut self, sink: &mut impl EventSink) {
        if self.control.is_tuning() {
            warn!("Auto-tune aborted by safety override");
            self.cancel_tuning(sink);
        }
    }

    fn report_tuning_outcome(&mut self, sink: &mut impl EventSink) {
        match self.control.last_outcome() {
            Some(TuningOutcome::Completed(result)) => {
                self.config.pid_kp = result.gains.kp;
                self.config.pid_ki = result.gains.ki;
                self.config.pid_kd = result.gains.kd;
                sink.emit(&AppEvent::TuningCompleted(result));
            }
            Some(TuningOutcome::Cancelled) => sink.emit(&AppEvent::TuningCancelled),
            Some(TuningOutcome::Failed) | None => sink.emit(&AppEvent::TuningFailed),
        }
    }

    fn travel_changed(&mut self, sink: &mut impl EventSink) {
        self.config.servo_min_deg = self.travel.min_deg();
        self.config.servo_max_deg = self.travel.max_deg();
        info!(
            "New servo range: {}-{}°",
            self.travel.min_deg(),
            self.travel.max_deg()
        );
        sink.emit(&AppEvent::TravelRangeChanged {
            min_deg: self.travel.min_deg(),
            max_deg: self.travel.max_deg(),
        });
    }

    /// Translate the tick's decisions into port calls.
    fn apply_outputs(&self, hw: &mut impl ActuatorPort) {
        hw.set_boiler_pump(self.relays.boiler_pump);
        hw.set_heating_pump(self.relays.heating_pump);
        hw.set_fans(self.relays.fans);
        hw.set_aux_relay(self.aux_relay);
        hw.set_air_intake(self.air_intake, self.travel.angle_for(self.air_intake));
    }

    fn maybe_emit_telemetry(&mut self, sink: &mut impl EventSink, now_ms: u64) {
        let due = self.last_telemetry_ms.is_none_or(|last| {
            now_ms.saturating_sub(last) >= self.config.telemetry_interval_ms
        });
        if due {
            self.last_telemetry_ms = Some(now_ms);
            sink.emit(&AppEvent::Telemetry(self.status()));
        }
    }
}
