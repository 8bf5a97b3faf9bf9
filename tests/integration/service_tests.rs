//! Integration tests for the BoilerService → safety → control → actuators
//! pipeline.
//!
//! These run on the host and drive the service through mock ports.

use lumberboiler::app::commands::AppCommand;
use lumberboiler::app::events::AppEvent;
use lumberboiler::app::service::BoilerService;
use lumberboiler::config::SystemConfig;
use lumberboiler::control::{LoopMode, PidController};
use lumberboiler::error::{Error, SensorError, TravelRangeError};
use lumberboiler::safety::{SafetyEvent, SafetyMode};

use crate::mock_hw::{MockHardware, RecordingSink};

fn make_app() -> (BoilerService, MockHardware, RecordingSink) {
    let mut app = BoilerService::new(SystemConfig::default()).unwrap();
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::new();
    app.start(&mut hw, &mut sink);
    (app, hw, sink)
}

// ── Startup ──────────────────────────────────────────────────

#[test]
fn start_releases_relays_and_closes_intake() {
    let (_app, hw, sink) = make_app();
    assert!(!hw.boiler_pump() && !hw.heating_pump() && !hw.fans());
    assert_eq!(hw.air_intake(), Some((0.0, 0)));
    assert_eq!(sink.events[0], AppEvent::Started { setpoint_c: 85.0 });
}

// ── Safety scenarios ─────────────────────────────────────────

#[test]
fn critical_water_forces_override_regardless_of_pid() {
    let (mut app, mut hw, mut sink) = make_app();

    // Cold fire: the PID would open the intake fully.
    hw.set_temps(95.0, 40.0);
    app.tick(&mut hw, &mut sink, 0);

    assert!(hw.boiler_pump() && hw.heating_pump() && hw.fans());
    assert_eq!(hw.air_intake(), Some((0.0, 0)));
    assert!(app.status().killswitch_active);
    assert_eq!(app.status().safety_mode, SafetyMode::Critical);
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::Safety(SafetyEvent::EnteredCritical { .. }))),
        1
    );
}

#[test]
fn combustion_with_warm_water_runs_all_relays() {
    let (mut app, mut hw, mut sink) = make_app();
    hw.set_temps(50.0, 120.0);
    app.tick(&mut hw, &mut sink, 0);

    assert!(hw.boiler_pump());
    assert!(hw.fans());
    assert!(hw.heating_pump());
    assert!(!app.is_override_active());
}

#[test]
fn no_combustion_relays_off_and_intake_follows_pid() {
    let (mut app, mut hw, mut sink) = make_app();
    let mut reference = PidController::new(SystemConfig::default().pid_gains(), 85.0, 1000);

    hw.set_temps(60.0, 50.0);
    app.tick(&mut hw, &mut sink, 0);

    assert!(!hw.boiler_pump() && !hw.heating_pump() && !hw.fans());
    let expected = reference.compute(50.0, 0);
    let (percent, _) = hw.air_intake().unwrap();
    assert_eq!(percent, expected);
    assert_eq!(app.air_intake(), expected);
}

#[test]
fn one_event_per_critical_edge() {
    let (mut app, mut hw, mut sink) = make_app();
    let trace = [80.0, 95.0, 96.0, 85.0, 84.0, 91.0, 70.0, 92.0, 93.0];
    for (i, water) in trace.into_iter().enumerate() {
        hw.set_temps(water, 50.0);
        app.tick(&mut hw, &mut sink, i as u64 * 1000);
    }
    let entered =
        sink.count(|e| matches!(e, AppEvent::Safety(SafetyEvent::EnteredCritical { .. })));
    let left = sink.count(|e| matches!(e, AppEvent::Safety(SafetyEvent::LeftCritical { .. })));
    assert_eq!(entered, 3);
    assert_eq!(left, 2);
}

#[test]
fn leaving_critical_resumes_pid_without_stale_history() {
    let (mut app, mut hw, mut sink) = make_app();
    hw.set_temps(60.0, 80.0);
    app.tick(&mut hw, &mut sink, 0);

    hw.set_temps(95.0, 80.0);
    app.tick(&mut hw, &mut sink, 1000);
    assert_eq!(app.air_intake(), 0.0);

    // Back to normal only 200 ms later: a rate-limited PID would return
    // its stale output; a re-initialised one computes immediately.
    hw.set_temps(60.0, 70.0);
    app.tick(&mut hw, &mut sink, 1200);
    let mut fresh = PidController::new(SystemConfig::default().pid_gains(), 85.0, 1000);
    fresh.compute(80.0, 0);
    fresh.initialize();
    assert_eq!(app.air_intake(), fresh.compute(70.0, 1200));
}

// ── Sensor faults ────────────────────────────────────────────

#[test]
fn sensor_fault_engages_fail_safe_once() {
    let (mut app, mut hw, mut sink) = make_app();
    hw.set_temps(60.0, 50.0);
    app.tick(&mut hw, &mut sink, 0);
    assert!(!hw.fans());

    hw.fail_sensors(SensorError::OutOfRange);
    app.tick(&mut hw, &mut sink, 1000);
    app.tick(&mut hw, &mut sink, 2000);

    assert!(hw.boiler_pump() && hw.heating_pump() && hw.fans());
    assert_eq!(hw.air_intake(), Some((0.0, 0)));
    assert!(app.status().sensor_fault);
    assert!(app.is_override_active());
    assert_eq!(sink.count(|e| matches!(e, AppEvent::SensorFault(_))), 1);

    hw.set_temps(60.0, 50.0);
    app.tick(&mut hw, &mut sink, 3000);
    assert!(!app.is_override_active());
    assert!(!hw.fans());
    assert!(hw.air_intake().unwrap().0 > 0.0);
    assert_eq!(sink.count(|e| *e == AppEvent::SensorRecovered), 1);
}

// ── Commands ─────────────────────────────────────────────────

#[test]
fn set_target_updates_status_and_config() {
    let (mut app, _hw, mut sink) = make_app();
    app.handle_command(AppCommand::SetTargetTemperature(92.5), &mut sink, 0)
        .unwrap();
    assert_eq!(app.status().target_burning_temp, 92.5);
    assert_eq!(app.current_config().target_burning_c, 92.5);
    assert!(sink.events.contains(&AppEvent::SetpointChanged { setpoint_c: 92.5 }));
}

#[test]
fn non_finite_target_is_rejected() {
    let (mut app, _hw, mut sink) = make_app();
    let r = app.handle_command(AppCommand::SetTargetTemperature(f32::NAN), &mut sink, 0);
    assert!(matches!(r, Err(Error::Config(_))));
    assert_eq!(app.status().target_burning_temp, 85.0);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::CommandRejected(_))), 1);
}

#[test]
fn servo_range_is_validated_and_applied() {
    let (mut app, mut hw, mut sink) = make_app();
    app.handle_command(AppCommand::SetServoMax(120), &mut sink, 0)
        .unwrap();
    app.handle_command(AppCommand::SetServoMin(20), &mut sink, 0)
        .unwrap();

    let r = app.handle_command(AppCommand::SetServoMin(120), &mut sink, 0);
    assert_eq!(
        r,
        Err(Error::TravelRange(TravelRangeError::MinNotBelowMax { min: 120, max: 120 }))
    );
    let r = app.handle_command(AppCommand::SetServoMax(200), &mut sink, 0);
    assert!(matches!(
        r,
        Err(Error::TravelRange(TravelRangeError::BeyondPhysicalLimit { .. }))
    ));
    assert_eq!((app.status().servo_min, app.status().servo_max), (20, 120));

    // Critical: intake at 0 % lands on the new closed end.
    hw.set_temps(95.0, 50.0);
    app.tick(&mut hw, &mut sink, 0);
    assert_eq!(hw.air_intake(), Some((0.0, 20)));
}

#[test]
fn update_config_rejects_unsafe_thresholds() {
    let (mut app, _hw, mut sink) = make_app();
    let bad = SystemConfig {
        critical_threshold_c: 30.0,
        ..SystemConfig::default()
    };
    assert!(app
        .handle_command(AppCommand::UpdateConfig(bad), &mut sink, 0)
        .is_err());
    assert_eq!(app.current_config(), SystemConfig::default());
}

#[test]
fn update_config_moves_thresholds_and_gains() {
    let (mut app, mut hw, mut sink) = make_app();
    let cfg = SystemConfig {
        critical_threshold_c: 80.0,
        pid_kp: 3.0,
        ..SystemConfig::default()
    };
    app.handle_command(AppCommand::UpdateConfig(cfg.clone()), &mut sink, 0)
        .unwrap();
    assert_eq!(app.status().pid.kp, 3.0);
    assert_eq!(app.current_config(), cfg);

    hw.set_temps(85.0, 50.0);
    app.tick(&mut hw, &mut sink, 0);
    assert!(app.is_override_active());
}

#[test]
fn tuning_refused_during_override() {
    let (mut app, mut hw, mut sink) = make_app();
    hw.set_temps(95.0, 50.0);
    app.tick(&mut hw, &mut sink, 0);
    let r = app.handle_command(AppCommand::StartAutoTune, &mut sink, 100);
    assert_eq!(r, Err(Error::SafetyOverride));
    assert_eq!(app.control().mode(), LoopMode::Automatic);
}

#[test]
fn aux_relay_follows_command_and_ignores_override() {
    let (mut app, mut hw, mut sink) = make_app();
    app.handle_command(AppCommand::SetAuxRelay(true), &mut sink, 0)
        .unwrap();
    assert!(sink.events.contains(&AppEvent::AuxRelayChanged { on: true }));

    hw.set_temps(60.0, 50.0);
    app.tick(&mut hw, &mut sink, 0);
    assert!(hw.aux_relay());
    assert!(!hw.fans());
    assert!(app.status().other);

    hw.set_temps(95.0, 50.0);
    app.tick(&mut hw, &mut sink, 1000);
    assert!(hw.aux_relay());

    app.handle_command(AppCommand::SetAuxRelay(false), &mut sink, 2000)
        .unwrap();
    app.tick(&mut hw, &mut sink, 2000);
    assert!(!hw.aux_relay());
}

#[test]
fn start_releases_aux_relay() {
    let (mut app, mut hw, mut sink) = make_app();
    app.handle_command(AppCommand::SetAuxRelay(true), &mut sink, 0)
        .unwrap();
    app.start(&mut hw, &mut sink);
    assert!(!hw.aux_relay());
    assert!(!app.status().other);
}

// ── Telemetry ────────────────────────────────────────────────

#[test]
fn telemetry_follows_its_own_interval() {
    let (mut app, mut hw, mut sink) = make_app();
    for t in (0..=25_000).step_by(500) {
        app.tick(&mut hw, &mut sink, t);
    }
    // 0, 10 000 and 20 000 ms.
    assert_eq!(sink.count(|e| matches!(e, AppEvent::Telemetry(_))), 3);
    assert_eq!(app.tick_count(), 51);
}
