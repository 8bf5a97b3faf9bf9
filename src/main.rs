//! Lumber boiler controller: host simulation entry point.
//!
//! Runs the controller core against the simulated plant faster than real
//! time: warm-up under the configured PID gains, a relay auto-tune
//! experiment requested through the settings patch, then a settling run
//! with the tuned gains.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                 Adapters (outer ring)                     │
//! │  BoilerPlant        LogEventSink + EventLog   SimClock    │
//! │  (Sensor+Actuator)  (EventSink)               (Clock)     │
//! │  ─────────────── Port Trait Boundary ─────────────────    │
//! │  ┌─────────────────────────────────────────────────────┐  │
//! │  │          BoilerService (pure logic)                 │  │
//! │  │          Safety · ControlLoop (PID + auto-tune)     │  │
//! │  └─────────────────────────────────────────────────────┘  │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! Usage: `lumberboiler-sim [config.json]`.  `SIM_MINUTES` bounds each
//! phase (default 20).

use std::fs;

use anyhow::{Context, Result, bail};
use log::{info, warn};

use lumberboiler::adapters::log_sink::LogEventSink;
use lumberboiler::adapters::time::SimulatedClock;
use lumberboiler::app::commands::SettingsPatch;
use lumberboiler::app::event_log::EventLog;
use lumberboiler::app::ports::{Clock, EventSink};
use lumberboiler::app::service::BoilerService;
use lumberboiler::config::SystemConfig;
use lumberboiler::sim::{BoilerPlant, PlantParams};

const DEFAULT_PHASE_MINUTES: u64 = 20;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("╔══════════════════════════════════════╗");
    info!("║  Lumber boiler sim v{:<16} ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 1. Configuration ──────────────────────────────────────
    let config = match std::env::args().nth(1) {
        Some(path) => load_config(&path)?,
        None => SystemConfig::default(),
    };
    let phase_ms = phase_duration_ms(phase_minutes()?)?;

    // ── 2. Wire adapters around the core ──────────────────────
    let clock = SimulatedClock::new();
    let mut service = BoilerService::new(config)?;
    let mut plant = BoilerPlant::new(PlantParams {
        step_ms: service.tick_interval_ms(),
        ..PlantParams::default()
    });
    let mut sink = (LogEventSink::new(), EventLog::new(&clock));

    service.start(&mut plant, &mut sink);

    // ── 3. Warm-up under the configured gains ─────────────────
    run_for(&mut service, &mut plant, &mut sink, &clock, phase_ms, |_| false);
    info!(
        "Warm-up done: burning {:.1}°C, water {:.1}°C",
        plant.burning_c(),
        plant.water_c()
    );

    // ── 4. Auto-tune through the settings surface ─────────────
    let patch = SettingsPatch::from_json(br#"{"autotune":true}"#)?;
    for cmd in patch.commands() {
        if let Err(e) = service.handle_command(cmd, &mut sink, clock.now_ms()) {
            warn!("Settings command failed: {}", e);
        }
    }
    run_for(&mut service, &mut plant, &mut sink, &clock, phase_ms, |s| {
        !s.control().is_tuning()
    });
    if service.control().is_tuning() {
        warn!("Auto-tune still running after {} min, cancelling", phase_ms / 60_000);
        let patch = SettingsPatch::from_json(br#"{"autotune":true}"#)?;
        for cmd in patch.commands() {
            service.handle_command(cmd, &mut sink, clock.now_ms())?;
        }
    }

    // ── 5. Run with the resulting gains ───────────────────────
    run_for(&mut service, &mut plant, &mut sink, &clock, phase_ms, |_| false);

    // ── 6. Report ─────────────────────────────────────────────
    let status = serde_json::to_string_pretty(&service.status())?;
    println!("{status}");
    println!("--- event log ---");
    print!("{}", sink.1.render());
    Ok(())
}

/// Tick the service and advance the plant until `duration_ms` has passed
/// or `done` returns true.
fn run_for(
    service: &mut BoilerService,
    plant: &mut BoilerPlant,
    sink: &mut impl EventSink,
    clock: &SimulatedClock,
    duration_ms: u64,
    done: impl Fn(&BoilerService) -> bool,
) {
    let until = clock.now_ms().saturating_add(duration_ms);
    while clock.now_ms() < until {
        service.tick(plant, sink, clock.now_ms());
        if done(service) {
            return;
        }
        plant.advance();
        clock.advance(plant.step_ms());
    }
}

fn load_config(path: &str) -> Result<SystemConfig> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    let config: SystemConfig =
        serde_json::from_str(&raw).with_context(|| format!("parsing {path}"))?;
    config.validate()?;
    info!("Loaded configuration from {}", path);
    Ok(config)
}

fn phase_duration_ms(minutes: u64) -> Result<u64> {
    match minutes.checked_mul(60_000) {
        Some(ms) => Ok(ms),
        None => bail!("SIM_MINUTES={minutes} is too large"),
    }
}

fn phase_minutes() -> Result<u64> {
    match std::env::var("SIM_MINUTES") {
        Ok(v) => {
            let minutes: u64 = v.parse().with_context(|| format!("SIM_MINUTES={v}"))?;
            if minutes == 0 {
                bail!("SIM_MINUTES must be at least 1");
            }
            Ok(minutes)
        }
        Err(_) => Ok(DEFAULT_PHASE_MINUTES),
    }
}
