//! Trait for components that can be advanced by clock ticks.

use crate::Ticks;

/// A component that can be advanced by clock ticks.
///
/// This is the core abstraction for cycle-accurate emulation: whenever the
/// CPU consumes one clock cycle, every other component is advanced through
/// this trait before the CPU touches memory again.
pub trait Tickable {
    /// Advance the component by one CPU clock tick.
    ///
    /// Components running at a multiple of the CPU clock perform several
    /// internal steps per call (e.g. the video chip runs three of its own
    /// cycles per CPU tick).
    fn tick(&mut self);

    /// Advance the component by multiple ticks.
    ///
    /// Default implementation calls `tick()` in a loop. Components may
    /// override for efficiency, but must produce identical results.
    fn tick_n(&mut self, count: Ticks) {
        for _ in 0..count.get() {
            self.tick();
        }
    }
}
