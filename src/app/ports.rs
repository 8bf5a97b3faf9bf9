//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ BoilerService (domain)
//! ```
//!
//! Driven adapters (sensors, relays, servo, event sinks, clocks) implement
//! these traits.  The [`BoilerService`](super::service::BoilerService)
//! consumes them via generics, so the domain core never touches hardware
//! directly.

use serde::Serialize;

use crate::error::SensorError;

/// One reading of every temperature probe, in °C.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct SensorSnapshot {
    pub boiler_water_c: f32,
    pub heating_c: f32,
    pub burning_c: f32,
    pub ambient_c: f32,
}

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this to obtain sensor data.
pub trait SensorPort {
    /// Read every probe.  A single failed probe fails the whole snapshot.
    fn read_all(&mut self) -> Result<SensorSnapshot, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain calls this to command relays and the
/// air-intake servo.
pub trait ActuatorPort {
    fn set_boiler_pump(&mut self, on: bool);

    fn set_heating_pump(&mut self, on: bool);

    fn set_fans(&mut self, on: bool);

    /// Auxiliary relay switched only by operator command.
    fn set_aux_relay(&mut self, on: bool);

    /// Position the air intake.  `angle_deg` is `percent` already mapped
    /// through the configured travel range.
    fn set_air_intake(&mut self, percent: f32, angle_deg: u16);

    /// Release every relay, the auxiliary one included.
    fn all_off(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go (serial log, event
/// ring, telemetry publisher).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

impl<T: EventSink + ?Sized> EventSink for &mut T {
    fn emit(&mut self, event: &super::events::AppEvent) {
        (**self).emit(event);
    }
}

/// Fan out to two sinks, first one first.
impl<A: EventSink, B: EventSink> EventSink for (A, B) {
    fn emit(&mut self, event: &super::events::AppEvent) {
        self.0.emit(event);
        self.1.emit(event);
    }
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic millisecond time source.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}
