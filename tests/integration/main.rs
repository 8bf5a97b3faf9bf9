//! Integration test harness for the boiler controller.
//!
//! Everything runs on the host against mock or simulated ports.

mod service_tests;
mod settings_tests;
mod tuning_tests;
