//! Sensor subsystem: probe conversion and the aggregating [`SensorHub`].
//!
//! The hub owns one ADC channel per probe and produces a
//! [`SensorSnapshot`] each tick.

pub mod ntc;

use crate::app::ports::SensorSnapshot;
use crate::error::SensorError;

/// One single-ended ADC input.
///
/// `embedded-hal` 1.0 has no ADC abstraction, so the board layer
/// implements this for its oneshot driver.
pub trait AdcChannel {
    /// Raw 12-bit conversion result.
    fn read_raw(&mut self) -> Result<u16, SensorError>;
}

/// Aggregates the four thermistor probes.
pub struct SensorHub<A: AdcChannel> {
    pub boiler_water: A,
    pub heating: A,
    pub burning: A,
    pub ambient: A,
}

impl<A: AdcChannel> SensorHub<A> {
    pub fn new(boiler_water: A, heating: A, burning: A, ambient: A) -> Self {
        Self {
            boiler_water,
            heating,
            burning,
            ambient,
        }
    }

    /// Read every probe.  The first failing probe fails the snapshot; a
    /// partial snapshot is never returned.
    pub fn read_all(&mut self) -> Result<SensorSnapshot, SensorError> {
        Ok(SensorSnapshot {
            boiler_water_c: read_probe(&mut self.boiler_water)?,
            heating_c: read_probe(&mut self.heating)?,
            burning_c: read_probe(&mut self.burning)?,
            ambient_c: read_probe(&mut self.ambient)?,
        })
    }
}

fn read_probe(channel: &mut impl AdcChannel) -> Result<f32, SensorError> {
    ntc::raw_to_celsius(channel.read_raw()?)
}
