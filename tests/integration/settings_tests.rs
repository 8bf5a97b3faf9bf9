//! Settings patches flowing through the command path.

use lumberboiler::app::commands::SettingsPatch;
use lumberboiler::app::events::AppEvent;
use lumberboiler::app::service::BoilerService;
use lumberboiler::config::SystemConfig;
use lumberboiler::error::Error;

use crate::mock_hw::{MockHardware, RecordingSink};

fn apply(
    app: &mut BoilerService,
    sink: &mut RecordingSink,
    body: &str,
    now_ms: u64,
) -> Vec<Result<(), Error>> {
    let patch = SettingsPatch::from_json(body.as_bytes()).unwrap();
    patch
        .commands()
        .into_iter()
        .map(|cmd| app.handle_command(cmd, &mut *sink, now_ms))
        .collect()
}

fn make_app() -> (BoilerService, MockHardware, RecordingSink) {
    let mut app = BoilerService::new(SystemConfig::default()).unwrap();
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::new();
    app.start(&mut hw, &mut sink);
    hw.set_temps(60.0, 70.0);
    app.tick(&mut hw, &mut sink, 0);
    (app, hw, sink)
}

#[test]
fn full_patch_applies_in_order() {
    let (mut app, _hw, mut sink) = make_app();
    let results = apply(
        &mut app,
        &mut sink,
        r#"{"target_burning_temp":90.0,"servo_min":20,"servo_max":160,"autotune":true}"#,
        100,
    );
    assert!(results.iter().all(|r| r.is_ok()));

    let s = app.status();
    assert_eq!(s.target_burning_temp, 90.0);
    assert_eq!((s.servo_min, s.servo_max), (20, 160));
    assert!(s.auto_tuning);

    // The experiment runs against the new target.
    assert!(sink
        .events
        .contains(&AppEvent::TuningStarted { setpoint_c: 90.0 }));
}

#[test]
fn autotune_flag_toggles() {
    let (mut app, _hw, mut sink) = make_app();
    apply(&mut app, &mut sink, r#"{"autotune":true}"#, 0);
    assert!(app.control().is_tuning());
    apply(&mut app, &mut sink, r#"{"autotune":true}"#, 500);
    assert!(!app.control().is_tuning());
    apply(&mut app, &mut sink, r#"{"autotune":false}"#, 1000);
    assert!(!app.control().is_tuning());
    assert_eq!(sink.count(|e| *e == AppEvent::TuningCancelled), 1);
}

#[test]
fn min_is_checked_against_the_old_max() {
    let (mut app, _hw, mut sink) = make_app();
    apply(&mut app, &mut sink, r#"{"servo_max":100}"#, 0);

    // min is applied before max, so 120 is still checked against 100.
    let results = apply(&mut app, &mut sink, r#"{"servo_min":120,"servo_max":170}"#, 0);
    assert!(results[0].is_err());
    assert!(results[1].is_ok());
    assert_eq!((app.status().servo_min, app.status().servo_max), (0, 170));
    assert_eq!(sink.count(|e| matches!(e, AppEvent::CommandRejected(_))), 1);
}

#[test]
fn rejected_field_does_not_block_the_rest() {
    let (mut app, _hw, mut sink) = make_app();
    let results = apply(
        &mut app,
        &mut sink,
        r#"{"target_burning_temp":80.0,"servo_max":250}"#,
        0,
    );
    assert!(results[0].is_ok());
    assert!(results[1].is_err());
    assert_eq!(app.status().target_burning_temp, 80.0);
    assert_eq!(app.status().servo_max, 180);
}

#[test]
fn patch_moves_the_live_config() {
    let (mut app, _hw, mut sink) = make_app();
    apply(
        &mut app,
        &mut sink,
        r#"{"target_burning_temp":75.5,"servo_min":10}"#,
        0,
    );
    let cfg = app.current_config();
    assert_eq!(cfg.target_burning_c, 75.5);
    assert_eq!(cfg.servo_min_deg, 10);
    assert!(cfg.validate().is_ok());
}
