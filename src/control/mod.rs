//! Air-intake control: PID, relay auto-tuner and the loop that arbitrates
//! between them.

pub mod autotune;
pub mod control_loop;
pub mod pid;
pub mod travel;

pub use control_loop::{ControlLoop, LoopMode, TuningOutcome};
pub use pid::{PidController, PidGains, PidMode};
pub use travel::TravelRange;
