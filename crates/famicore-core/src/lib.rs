//! Core traits and types for cycle-accurate emulation.
//!
//! Every chip advances in lockstep with the CPU clock. All cross-chip timing
//! derives from the CPU tick fan-out. No exceptions.

mod bus;
mod observable;
mod tickable;
mod ticks;

pub use bus::{Bus, SimpleBus};
pub use observable::{Observable, Value};
pub use tickable::Tickable;
pub use ticks::Ticks;
