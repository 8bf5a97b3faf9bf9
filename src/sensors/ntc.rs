//! NTC thermistor probe (10 kOhm), Steinhart–Hart conversion.
//!
//! The thermistor sits on the low side of a divider with a fixed 10 kOhm
//! series resistor, read by a 12-bit ADC:
//!
//! ```text
//!   R_ntc = R_series / (ADC_MAX / raw − 1)
//!   1/T   = c1 + c2·ln R + c3·(ln R)³
//! ```
//!
//! Readings near either rail mean an open or shorted probe and are
//! rejected instead of converted.

use crate::error::SensorError;

const C1: f32 = 1.009_249_5e-3;
const C2: f32 = 2.378_405_4e-4;
const C3: f32 = 2.019_202_7e-7;

const R_SERIES: f32 = 10_000.0;
const ADC_MAX: u16 = 4095;
/// Counts from either rail treated as a wiring fault.
const RAIL_MARGIN: u16 = 8;

const KELVIN_OFFSET: f32 = 273.15;

/// Convert a raw 12-bit reading into °C.
pub fn raw_to_celsius(raw: u16) -> Result<f32, SensorError> {
    if raw <= RAIL_MARGIN || raw >= ADC_MAX - RAIL_MARGIN {
        return Err(SensorError::OutOfRange);
    }
    let resistance = R_SERIES / (f32::from(ADC_MAX) / f32::from(raw) - 1.0);
    let ln_r = resistance.ln();
    let kelvin = 1.0 / (C1 + C2 * ln_r + C3 * ln_r * ln_r * ln_r);
    let celsius = kelvin - KELVIN_OFFSET;
    if celsius.is_finite() {
        Ok(celsius)
    } else {
        Err(SensorError::OutOfRange)
    }
}
