//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements    | Connects to                      |
//! |-------------|---------------|----------------------------------|
//! | `hardware`  | SensorPort    | NTC probes via ADC channels      |
//! |             | ActuatorPort  | relay GPIOs, servo PWM           |
//! | `log_sink`  | EventSink     | `log` facade                     |
//! | `time`      | Clock         | `std::time::Instant` / simulated |

pub mod hardware;
pub mod log_sink;
pub mod time;
