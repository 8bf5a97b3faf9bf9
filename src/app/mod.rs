//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the business rules for the boiler controller:
//! orchestration of safety evaluation and air-intake control, command
//! handling and event reporting.  All interaction with hardware happens
//! through **port traits** defined in [`ports`], keeping this layer fully
//! testable without real peripherals.

pub mod commands;
pub mod event_log;
pub mod events;
pub mod ports;
pub mod service;
