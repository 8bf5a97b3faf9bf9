//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the `log` facade (serial console on the controller, `env_logger` on
//! the host).  A telemetry publisher would implement the same trait.

use log::{error, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::safety::SafetyEvent;

/// Adapter that logs every [`AppEvent`] to the console.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry(t) => {
                info!(
                    "TELEM | water={:.1}\u{00b0}C heating={:.1}\u{00b0}C burning={:.1}\u{00b0}C \
                     ambient={:.1}\u{00b0}C | target={:.1}\u{00b0}C air={:.0}% | \
                     pumps={}/{} fans={} | tuning={} killswitch={}",
                    t.boiler_water_temp,
                    t.heating_temp,
                    t.burning_temp,
                    t.ambient_temp,
                    t.target_burning_temp,
                    t.air_intake,
                    on_off(t.boiler_pump),
                    on_off(t.heating_pump),
                    on_off(t.fans),
                    t.auto_tuning,
                    t.killswitch_active,
                );
            }
            AppEvent::Safety(SafetyEvent::EnteredCritical { .. }) | AppEvent::SensorFault(_) => {
                error!("SAFETY | {}", event);
            }
            AppEvent::Safety(SafetyEvent::LeftCritical { .. }) | AppEvent::SensorRecovered => {
                info!("SAFETY | {}", event);
            }
            AppEvent::TuningFailed | AppEvent::CommandRejected(_) => warn!("EVENT | {}", event),
            _ => info!("EVENT | {}", event),
        }
    }
}

fn on_off(on: bool) -> &'static str {
    if on { "ON" } else { "OFF" }
}
