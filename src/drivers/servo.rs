//! Air-intake servo on a 50 Hz PWM channel.
//!
//! Standard hobby-servo timing: one pulse every 20 ms, pulse width
//! 544–2400 µs across 0–180°.  The angle is already mapped through the
//! configured travel range by the time it reaches this driver.

use embedded_hal::pwm::SetDutyCycle;

use crate::control::travel::SERVO_TRAVEL_LIMIT_DEG;

const PERIOD_US: u16 = 20_000;
const PULSE_MIN_US: u16 = 544;
const PULSE_MAX_US: u16 = 2_400;

pub struct ServoDriver<P: SetDutyCycle> {
    pwm: P,
    angle_deg: Option<u16>,
}

impl<P: SetDutyCycle> ServoDriver<P> {
    pub fn new(pwm: P) -> Self {
        Self {
            pwm,
            angle_deg: None,
        }
    }

    /// Move to `angle_deg`, clamped to the servo's physical travel.
    pub fn set_angle(&mut self, angle_deg: u16) -> Result<(), P::Error> {
        let angle = angle_deg.min(SERVO_TRAVEL_LIMIT_DEG);
        if self.angle_deg == Some(angle) {
            return Ok(());
        }
        self.pwm
            .set_duty_cycle_fraction(pulse_width_us(angle), PERIOD_US)?;
        self.angle_deg = Some(angle);
        Ok(())
    }

    /// Last angle written, `None` before the first write.
    pub fn angle_deg(&self) -> Option<u16> {
        self.angle_deg
    }
}

fn pulse_width_us(angle_deg: u16) -> u16 {
    let span = u32::from(PULSE_MAX_US - PULSE_MIN_US);
    let offset = span * u32::from(angle_deg) / u32::from(SERVO_TRAVEL_LIMIT_DEG);
    PULSE_MIN_US + offset as u16
}
