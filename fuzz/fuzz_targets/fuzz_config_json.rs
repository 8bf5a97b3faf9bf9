//! Fuzz target: `SystemConfig` JSON
//!
//! Any configuration that parses and validates must construct a service.
//!
//! cargo fuzz run fuzz_config_json

#![no_main]

use libfuzzer_sys::fuzz_target;
use lumberboiler::app::service::BoilerService;
use lumberboiler::config::SystemConfig;

fuzz_target!(|data: &[u8]| {
    let Ok(config) = serde_json::from_slice::<SystemConfig>(data) else {
        return;
    };
    if config.validate().is_ok() {
        assert!(BoilerService::new(config).is_ok());
    }
});
