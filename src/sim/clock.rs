//! One-second round countdown

use super::timer::{TimerId, TimerKind, Timers};
use crate::consts::CLOCK_TICK_MS;

/// Result of a clock tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockSignal {
    /// Stale fire from a cancelled clock
    Ignored,
    /// Time left went down by one
    Ticked,
    /// Reached zero; the clock has stopped itself
    Expired,
}

#[derive(Debug, Default)]
pub struct RoundClock {
    running: bool,
    tick: Option<TimerId>,
}

impl RoundClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Begin ticking. Any previous tick is disarmed first.
    pub fn start(&mut self, timers: &mut Timers) {
        self.stop(timers);
        self.running = true;
        self.tick = Some(timers.schedule(CLOCK_TICK_MS, TimerKind::ClockTick));
    }

    /// Idempotent
    pub fn stop(&mut self, timers: &mut Timers) {
        self.running = false;
        if let Some(id) = self.tick.take() {
            timers.cancel(id);
        }
    }

    /// Handle a `ClockTick` fire. Decrements `time_left`, or at 1 or below
    /// sets it to zero, stops and reports expiry.
    pub fn on_tick(
        &mut self,
        id: TimerId,
        time_left: &mut u32,
        timers: &mut Timers,
    ) -> ClockSignal {
        if !self.running || self.tick != Some(id) {
            log::trace!("Ignoring stale clock tick {id:?}");
            return ClockSignal::Ignored;
        }

        if *time_left <= 1 {
            *time_left = 0;
            self.running = false;
            self.tick = None;
            return ClockSignal::Expired;
        }

        *time_left -= 1;
        self.tick = Some(timers.schedule(CLOCK_TICK_MS, TimerKind::ClockTick));
        ClockSignal::Ticked
    }
}
