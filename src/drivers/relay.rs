//! Relay output (pumps, fans).
//!
//! A relay board input driven by one GPIO.  Boards differ in polarity,
//! so the driver is told whether the coil energises on a high or a low
//! level.  This driver is a dumb actuator: which relay runs when is
//! decided by the safety supervisor.

use embedded_hal::digital::OutputPin;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    ActiveHigh,
    ActiveLow,
}

pub struct Relay<P: OutputPin> {
    pin: P,
    polarity: Polarity,
    name: &'static str,
    on: bool,
}

impl<P: OutputPin> Relay<P> {
    /// Take the pin and drive it to the de-energised level.
    pub fn new(pin: P, polarity: Polarity, name: &'static str) -> Result<Self, P::Error> {
        let mut relay = Self {
            pin,
            polarity,
            name,
            on: false,
        };
        relay.write(false)?;
        Ok(relay)
    }

    /// Energise or release the coil.  The cached state only changes when
    /// the pin write succeeds.
    pub fn set(&mut self, on: bool) -> Result<(), P::Error> {
        self.write(on)?;
        self.on = on;
        Ok(())
    }

    pub fn is_on(&self) -> bool {
        self.on
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    fn write(&mut self, on: bool) -> Result<(), P::Error> {
        match (on, self.polarity) {
            (true, Polarity::ActiveHigh) | (false, Polarity::ActiveLow) => self.pin.set_high(),
            (false, Polarity::ActiveHigh) | (true, Polarity::ActiveLow) => self.pin.set_low(),
        }
    }
}
