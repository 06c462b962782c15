use holodeck_core::Tick;

use crate::TickSourceResult;

/// Port for a finite, forward-only stream of market ticks
///
/// Implementations parse their own format; the simulation only relies on
/// ticks arriving in non-decreasing timestamp order and enforces it.
pub trait TickSource {
    /// Next tick, or `None` once the stream is drained
    fn next_tick(&mut self) -> TickSourceResult<Option<Tick>>;

    /// Get the source's name/identifier for logging
    fn name(&self) -> &str {
        "TickSource"
    }
}

impl<T: TickSource + ?Sized> TickSource for Box<T> {
    fn next_tick(&mut self) -> TickSourceResult<Option<Tick>> {
        (**self).next_tick()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
