//! Lumber boiler controller library.
//!
//! Air-intake regulation (PID with relay auto-tuning) and over-temperature
//! supervision for a biomass boiler.  The domain core in [`app`],
//! [`control`] and [`safety`] is pure logic; hardware and time reach it
//! through the port traits in [`app::ports`].

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod control;
pub mod error;
pub mod safety;
pub mod sim;

pub mod adapters;
pub mod drivers;
pub mod sensors;

pub use error::{Error, Result};
