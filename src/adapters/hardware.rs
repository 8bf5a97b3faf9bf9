//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the [`SensorHub`] and all actuator drivers, exposing them
//! through [`SensorPort`] and [`ActuatorPort`].  This is the only
//! module in the system that touches actual hardware.  It is generic over
//! the `embedded-hal` pin and PWM types so a board crate (or a test) can
//! plug in its own peripherals.
//!
//! A failed relay or PWM write is logged and skipped; the next tick
//! writes every output again.

use core::fmt::Debug;

use embedded_hal::digital::OutputPin;
use embedded_hal::pwm::SetDutyCycle;
use log::warn;

use crate::app::ports::{ActuatorPort, SensorPort, SensorSnapshot};
use crate::drivers::relay::Relay;
use crate::drivers::servo::ServoDriver;
use crate::error::SensorError;
use crate::sensors::{AdcChannel, SensorHub};

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<A, P, S>
where
    A: AdcChannel,
    P: OutputPin,
    S: SetDutyCycle,
{
    sensor_hub: SensorHub<A>,
    boiler_pump: Relay<P>,
    heating_pump: Relay<P>,
    fans: Relay<P>,
    aux: Relay<P>,
    servo: ServoDriver<S>,
}

impl<A, P, S> HardwareAdapter<A, P, S>
where
    A: AdcChannel,
    P: OutputPin,
    S: SetDutyCycle,
{
    pub fn new(
        sensor_hub: SensorHub<A>,
        boiler_pump: Relay<P>,
        heating_pump: Relay<P>,
        fans: Relay<P>,
        aux: Relay<P>,
        servo: ServoDriver<S>,
    ) -> Self {
        Self {
            sensor_hub,
            boiler_pump,
            heating_pump,
            fans,
            aux,
            servo,
        }
    }

    pub fn relay_states(&self) -> (bool, bool, bool) {
        (
            self.boiler_pump.is_on(),
            self.heating_pump.is_on(),
            self.fans.is_on(),
        )
    }

    pub fn aux_relay(&self) -> bool {
        self.aux.is_on()
    }

    pub fn servo_angle(&self) -> Option<u16> {
        self.servo.angle_deg()
    }

    pub fn sensor_hub_mut(&mut self) -> &mut SensorHub<A> {
        &mut self.sensor_hub
    }
}

fn set_relay<P: OutputPin>(relay: &mut Relay<P>, on: bool) {
    if let Err(e) = relay.set(on) {
        warn!("Relay '{}' write failed: {:?}", relay.name(), e);
    }
}

fn report<E: Debug>(what: &str, result: Result<(), E>) {
    if let Err(e) = result {
        warn!("{} write failed: {:?}", what, e);
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<A, P, S> SensorPort for HardwareAdapter<A, P, S>
where
    A: AdcChannel,
    P: OutputPin,
    S: SetDutyCycle,
{
    fn read_all(&mut self) -> Result<SensorSnapshot, SensorError> {
        self.sensor_hub.read_all()
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl<A, P, S> ActuatorPort for HardwareAdapter<A, P, S>
where
    A: AdcChannel,
    P: OutputPin,
    S: SetDutyCycle,
{
    fn set_boiler_pump(&mut self, on: bool) {
        set_relay(&mut self.boiler_pump, on);
    }

    fn set_heating_pump(&mut self, on: bool) {
        set_relay(&mut self.heating_pump, on);
    }

    fn set_fans(&mut self, on: bool) {
        set_relay(&mut self.fans, on);
    }

    fn set_aux_relay(&mut self, on: bool) {
        set_relay(&mut self.aux, on);
    }

    fn set_air_intake(&mut self, _percent: f32, angle_deg: u16) {
        report("Servo", self.servo.set_angle(angle_deg));
    }

    fn all_off(&mut self) {
        set_relay(&mut self.boiler_pump, false);
        set_relay(&mut self.heating_pump, false);
        set_relay(&mut self.fans, false);
        set_relay(&mut self.aux, false);
    }
}
