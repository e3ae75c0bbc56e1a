//! Wall-clock timing for live drivers.

use std::time::{Duration, Instant};

use fn_nodes::TickContext;

/// Turns wall-clock instants into [`TickContext`]s.
///
/// `elapsed` is the time since the previous tick (0 on the first) and `time`
/// the time since the clock started.
#[derive(Debug, Clone, Copy)]
pub struct TickClock {
    start: Instant,
    last: Option<Instant>,
}

impl TickClock {
    pub fn start() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(start: Instant) -> Self {
        Self { start, last: None }
    }

    /// Context for a tick happening now.
    pub fn next(&mut self) -> TickContext {
        self.next_at(Instant::now())
    }

    /// Context for a tick happening at `now`.
    pub fn next_at(&mut self, now: Instant) -> TickContext {
        let elapsed = self
            .last
            .map_or(Duration::ZERO, |last| now.saturating_duration_since(last));
        self.last = Some(now);
        TickContext::new(
            elapsed.as_secs_f64(),
            now.saturating_duration_since(self.start).as_secs_f64(),
        )
    }
}
