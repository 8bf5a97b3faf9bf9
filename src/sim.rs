//! Simulated boiler plant for host runs and integration tests.
//!
//! A lumped first-order thermal model:
//!
//! ```text
//!   air % ──[transport delay]──▶ combustion chamber ──▶ boiler water ──▶ heating loop
//! ```
//!
//! Each stage relaxes toward an equilibrium with its own time constant.
//! The delay between moving the intake flap and the fire responding is
//! what makes a relay experiment settle into a limit cycle.

use heapless::Deque;

use crate::app::ports::{ActuatorPort, SensorPort, SensorSnapshot};
use crate::error::SensorError;

/// Longest transport delay the model can hold, in steps.
const MAX_DELAY_STEPS: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlantParams {
    /// Integration step (milliseconds).
    pub step_ms: u64,
    pub ambient_c: f32,
    /// Combustion temperature rise per % of air at equilibrium.
    pub burn_gain_c_per_pct: f32,
    pub burn_tau_secs: f32,
    /// Delay between an intake change and the fire's response.
    pub transport_delay_ms: u64,
    /// Fraction of the combustion temperature rise reaching the water.
    pub water_coupling: f32,
    pub water_tau_secs: f32,
    /// Water equilibrium drop while the heating pump draws heat.
    pub heating_draw_c: f32,
    pub heating_tau_secs: f32,
}

impl Default for PlantParams {
    fn default() -> Self {
        Self {
            step_ms: 500,
            ambient_c: 20.0,
            burn_gain_c_per_pct: 2.0,
            burn_tau_secs: 60.0,
            transport_delay_ms: 10_000,
            water_coupling: 0.7,
            water_tau_secs: 300.0,
            heating_draw_c: 15.0,
            heating_tau_secs: 120.0,
        }
    }
}

/// Boiler plant that also stands in for the hardware ports.
pub struct BoilerPlant {
    params: PlantParams,
    delay_steps: usize,
    delay_line: Deque<f32, MAX_DELAY_STEPS>,
    burning_c: f32,
    water_c: f32,
    heating_c: f32,
    air_pct: f32,
    servo_deg: u16,
    boiler_pump: bool,
    heating_pump: bool,
    fans: bool,
    aux_relay: bool,
    sensors_failed: bool,
    elapsed_ms: u64,
}

impl BoilerPlant {
    /// Plant at ambient temperature with the intake closed.
    pub fn new(params: PlantParams) -> Self {
        let steps = params.transport_delay_ms / params.step_ms.max(1);
        let delay_steps = (steps as usize).min(MAX_DELAY_STEPS - 1);
        Self {
            params,
            delay_steps,
            delay_line: Deque::new(),
            burning_c: params.ambient_c,
            water_c: params.ambient_c,
            heating_c: params.ambient_c,
            air_pct: 0.0,
            servo_deg: 0,
            boiler_pump: false,
            heating_pump: false,
            fans: false,
            aux_relay: false,
            sensors_failed: false,
            elapsed_ms: 0,
        }
    }

    /// Start from given temperatures instead of ambient.
    pub fn with_temperatures(mut self, burning_c: f32, water_c: f32) -> Self {
        self.burning_c = burning_c;
        self.water_c = water_c;
        self
    }

    /// Integrate one step with the current actuator state.
    pub fn advance(&mut self) {
        let p = self.params;
        let dt = p.step_ms as f32 / 1000.0;

        if self.delay_line.is_full() {
            self.delay_line.pop_front();
        }
        let _ = self.delay_line.push_back(self.air_pct);
        while self.delay_line.len() > self.delay_steps + 1 {
            self.delay_line.pop_front();
        }
        let delayed_air = if self.delay_line.len() > self.delay_steps {
            self.delay_line.front().copied().unwrap_or(0.0)
        } else {
            0.0
        };

        let burn_eq = p.ambient_c + p.burn_gain_c_per_pct * delayed_air;
        self.burning_c += (burn_eq - self.burning_c) * dt / p.burn_tau_secs;

        let draw = if self.heating_pump { p.heating_draw_c } else { 0.0 };
        let water_eq = p.ambient_c + p.water_coupling * (self.burning_c - p.ambient_c) - draw;
        self.water_c += (water_eq - self.water_c) * dt / p.water_tau_secs;

        let heating_eq = if self.heating_pump {
            self.water_c - 5.0
        } else {
            p.ambient_c
        };
        self.heating_c += (heating_eq - self.heating_c) * dt / p.heating_tau_secs;

        self.elapsed_ms += p.step_ms;
    }

    /// Make every subsequent sensor read fail (or recover).
    pub fn set_sensors_failed(&mut self, failed: bool) {
        self.sensors_failed = failed;
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    pub fn step_ms(&self) -> u64 {
        self.params.step_ms
    }

    pub fn burning_c(&self) -> f32 {
        self.burning_c
    }

    pub fn water_c(&self) -> f32 {
        self.water_c
    }

    pub fn air_pct(&self) -> f32 {
        self.air_pct
    }

    pub fn servo_deg(&self) -> u16 {
        self.servo_deg
    }

    pub fn relays(&self) -> (bool, bool, bool) {
        (self.boiler_pump, self.heating_pump, self.fans)
    }

    pub fn aux_relay(&self) -> bool {
        self.aux_relay
    }
}

impl SensorPort for BoilerPlant {
    fn read_all(&mut self) -> Result<SensorSnapshot, SensorError> {
        if self.sensors_failed {
            return Err(SensorError::AdcReadFailed);
        }
        Ok(SensorSnapshot {
            boiler_water_c: self.water_c,
            heating_c: self.heating_c,
            burning_c: self.burning_c,
            ambient_c: self.params.ambient_c,
        })
    }
}

impl ActuatorPort for BoilerPlant {
    fn set_boiler_pump(&mut self, on: bool) {
        self.boiler_pump = on;
    }

    fn set_heating_pump(&mut self, on: bool) {
        self.heating_pump = on;
    }

    fn set_fans(&mut self, on: bool) {
        self.fans = on;
    }

    fn set_aux_relay(&mut self, on: bool) {
        self.aux_relay = on;
    }

    fn set_air_intake(&mut self, percent: f32, angle_deg: u16) {
        self.air_pct = percent;
        self.servo_deg = angle_deg;
    }

    fn all_off(&mut self) {
        self.boiler_pump = false;
        self.heating_pump = false;
        self.fans = false;
        self.aux_relay = false;
    }
}
