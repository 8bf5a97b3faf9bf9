//! Fuzz target: settings patch → service commands
//!
//! Feeds arbitrary request bodies through `SettingsPatch` and applies the
//! resulting commands to a live service, verifying:
//! - No panics under arbitrary byte inputs
//! - The servo range stays ordered and within physical travel
//! - The live configuration still validates afterwards
//!
//! cargo fuzz run fuzz_settings_patch

#![no_main]

use libfuzzer_sys::fuzz_target;
use lumberboiler::app::commands::SettingsPatch;
use lumberboiler::app::events::AppEvent;
use lumberboiler::app::ports::EventSink;
use lumberboiler::app::service::BoilerService;
use lumberboiler::config::SystemConfig;
use lumberboiler::control::travel::SERVO_TRAVEL_LIMIT_DEG;

struct Discard;

impl EventSink for Discard {
    fn emit(&mut self, _event: &AppEvent) {}
}

fuzz_target!(|data: &[u8]| {
    let Ok(patch) = SettingsPatch::from_json(data) else {
        return;
    };
    let Ok(mut app) = BoilerService::new(SystemConfig::default()) else {
        return;
    };
    for cmd in patch.commands() {
        let _ = app.handle_command(cmd, &mut Discard, 0);
    }

    let status = app.status();
    assert!(status.servo_min < status.servo_max);
    assert!(status.servo_max <= SERVO_TRAVEL_LIMIT_DEG);
    let angle = app.travel().angle_for(status.air_intake);
    assert!(angle >= status.servo_min && angle <= status.servo_max);
    assert!(app.current_config().validate().is_ok());
});
