//! Relay auto-tune experiments driven through the service.
//!
//! The long-running scenarios use the simulated plant so the relay
//! experiment sees a real limit cycle; the override scenarios use the
//! scripted mock.

use lumberboiler::app::commands::AppCommand;
use lumberboiler::app::events::AppEvent;
use lumberboiler::app::service::BoilerService;
use lumberboiler::config::SystemConfig;
use lumberboiler::control::autotune::TunerPhase;
use lumberboiler::control::{LoopMode, PidGains};
use lumberboiler::error::SensorError;
use lumberboiler::sim::{BoilerPlant, PlantParams};

use crate::mock_hw::{MockHardware, RecordingSink};

const DEFAULT_GAINS: PidGains = PidGains::new(2.0, 0.1, 1.0);

struct Rig {
    app: BoilerService,
    plant: BoilerPlant,
    sink: RecordingSink,
    now_ms: u64,
}

impl Rig {
    fn new() -> Self {
        let mut app = BoilerService::new(SystemConfig::default()).unwrap();
        let mut plant = BoilerPlant::new(PlantParams {
            step_ms: app.tick_interval_ms(),
            ..PlantParams::default()
        });
        let mut sink = RecordingSink::new();
        app.start(&mut plant, &mut sink);
        app.tick(&mut plant, &mut sink, 0);
        Self {
            app,
            plant,
            sink,
            now_ms: 0,
        }
    }

    fn command(&mut self, cmd: AppCommand) {
        self.app
            .handle_command(cmd, &mut self.sink, self.now_ms)
            .unwrap();
    }

    /// Advance one plant step and tick the service.
    fn step(&mut self) {
        self.plant.advance();
        self.now_ms += self.plant.step_ms();
        self.app.tick(&mut self.plant, &mut self.sink, self.now_ms);
    }

    /// Step until the experiment ends or `max_ms` elapses.
    fn run_until_tuned(&mut self, max_ms: u64) {
        let until = self.now_ms + max_ms;
        while self.app.control().is_tuning() && self.now_ms < until {
            self.step();
        }
    }
}

// ── Full experiment on the simulated plant ───────────────────

#[test]
fn relay_experiment_completes_and_installs_gains() {
    let mut rig = Rig::new();
    rig.command(AppCommand::StartAutoTune);
    assert_eq!(rig.app.control().mode(), LoopMode::Tuning);
    assert!(rig.app.status().auto_tuning);

    rig.run_until_tuned(30 * 60_000);

    assert_eq!(rig.app.control().mode(), LoopMode::Automatic);
    assert_eq!(rig.app.control().tuner_phase(), TunerPhase::Idle);

    let result = rig
        .sink
        .events
        .iter()
        .find_map(|e| match e {
            AppEvent::TuningCompleted(r) => Some(*r),
            _ => None,
        })
        .expect("experiment should complete");

    assert!(result.gains.is_finite());
    assert!(result.gains.kp > 0.0);
    assert!(result.ultimate_period_secs > 10.0);
    assert!(result.amplitude > 0.0);
    assert_eq!(rig.app.control().gains(), result.gains);

    // Tuned gains become part of the live configuration.
    let cfg = rig.app.current_config();
    assert_eq!(cfg.pid_gains(), result.gains);
    assert_eq!(rig.sink.count(|e| *e == AppEvent::TuningFailed), 0);
}

#[test]
fn relay_output_stays_within_step_during_experiment() {
    let mut rig = Rig::new();
    rig.command(AppCommand::StartAutoTune);
    for _ in 0..400 {
        rig.step();
        if !rig.app.control().is_tuning() {
            break;
        }
        let air = rig.app.air_intake();
        assert!(air == 0.0 || air == 50.0, "relay output {air}");
    }
}

#[test]
fn cancel_mid_experiment_keeps_previous_gains() {
    let mut rig = Rig::new();
    rig.command(AppCommand::StartAutoTune);
    for _ in 0..120 {
        rig.step();
    }
    assert!(rig.app.control().is_tuning());

    rig.command(AppCommand::ToggleAutoTune);
    assert_eq!(rig.app.control().mode(), LoopMode::Automatic);
    assert_eq!(rig.app.control().gains(), DEFAULT_GAINS);
    assert_eq!(rig.app.current_config().pid_gains(), DEFAULT_GAINS);
    assert_eq!(rig.sink.count(|e| *e == AppEvent::TuningCancelled), 1);

    // The PID takes the actuator back on the next tick.
    rig.step();
    assert!(!rig.app.control().is_tuning());
}

#[test]
fn second_start_while_running_is_a_no_op() {
    let mut rig = Rig::new();
    rig.command(AppCommand::StartAutoTune);
    rig.step();
    rig.command(AppCommand::StartAutoTune);
    assert_eq!(
        rig.sink
            .count(|e| matches!(e, AppEvent::TuningStarted { .. })),
        1
    );
}

#[test]
fn degenerate_oscillation_reports_failure_and_keeps_config() {
    let mut app = BoilerService::new(SystemConfig::default()).unwrap();
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::new();
    app.start(&mut hw, &mut sink);

    hw.set_temps(60.0, 85.0);
    app.tick(&mut hw, &mut sink, 0);
    app.handle_command(AppCommand::StartAutoTune, &mut sink, 0)
        .unwrap();
    app.tick(&mut hw, &mut sink, 500);

    // Equal third and fourth peaks give a zero amplitude.
    let mut trace = vec![80.0, 101.0, 50.0, 102.0];
    trace.extend((103..=111).map(|t| t as f32));
    trace.push(102.0);
    let mut now = 500;
    for burning in trace {
        now += 500;
        hw.set_temps(60.0, burning);
        app.tick(&mut hw, &mut sink, now);
    }

    assert!(!app.control().is_tuning());
    assert_eq!(sink.count(|e| *e == AppEvent::TuningFailed), 1);
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::TuningCompleted(_))),
        0
    );
    assert_eq!(app.control().gains(), DEFAULT_GAINS);
    assert_eq!(app.current_config().pid_gains(), DEFAULT_GAINS);
}

// ── Overrides abort the experiment ───────────────────────────

#[test]
fn entering_critical_aborts_tuning() {
    let mut app = BoilerService::new(SystemConfig::default()).unwrap();
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::new();
    app.start(&mut hw, &mut sink);

    hw.set_temps(60.0, 70.0);
    app.tick(&mut hw, &mut sink, 0);
    app.handle_command(AppCommand::StartAutoTune, &mut sink, 0)
        .unwrap();
    app.tick(&mut hw, &mut sink, 500);
    assert!(app.control().is_tuning());

    hw.set_temps(95.0, 70.0);
    app.tick(&mut hw, &mut sink, 1000);

    assert!(!app.control().is_tuning());
    assert_eq!(app.air_intake(), 0.0);
    assert_eq!(app.control().gains(), DEFAULT_GAINS);
    assert_eq!(sink.count(|e| *e == AppEvent::TuningCancelled), 1);
}

#[test]
fn sensor_fault_aborts_tuning() {
    let mut app = BoilerService::new(SystemConfig::default()).unwrap();
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::new();
    app.start(&mut hw, &mut sink);

    hw.set_temps(60.0, 70.0);
    app.tick(&mut hw, &mut sink, 0);
    app.handle_command(AppCommand::ToggleAutoTune, &mut sink, 0)
        .unwrap();
    assert!(app.control().is_tuning());

    hw.fail_sensors(SensorError::AdcReadFailed);
    app.tick(&mut hw, &mut sink, 500);

    assert!(!app.control().is_tuning());
    assert_eq!(sink.count(|e| *e == AppEvent::TuningCancelled), 1);

    // Refused until the sensors recover.
    assert!(app
        .handle_command(AppCommand::StartAutoTune, &mut sink, 600)
        .is_err());
    hw.set_temps(60.0, 70.0);
    app.tick(&mut hw, &mut sink, 1000);
    app.handle_command(AppCommand::StartAutoTune, &mut sink, 1000)
        .unwrap();
    assert!(app.control().is_tuning());
}
