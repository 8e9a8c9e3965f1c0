//! Virtual clock and timer queue
//!
//! Every timer in the game lives here. The host advances time explicitly, so
//! firing order is fully deterministic: earliest due time first, ties broken
//! by scheduling order.

/// Handle to a scheduled timer. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

/// What a timer does when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// One-second round clock tick
    ClockTick,
    /// First target of a round, deferred to the next frame
    FirstSpawn { round: u32 },
    /// Live target's reaction window ran out
    TargetExpiry { round: u32 },
    /// Cosmetic gap after a miss has elapsed
    Respawn { round: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timer {
    pub id: TimerId,
    pub due_ms: u64,
    pub kind: TimerKind,
}

#[derive(Debug, Default)]
pub struct Timers {
    now_ms: u64,
    next_id: u64,
    pending: Vec<Timer>,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time in milliseconds
    pub fn now(&self) -> u64 {
        self.now_ms
    }

    /// Arm a one-shot timer `delay_ms` from now
    pub fn schedule(&mut self, delay_ms: u64, kind: TimerKind) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.push(Timer {
            id,
            due_ms: self.now_ms.saturating_add(delay_ms),
            kind,
        });
        id
    }

    /// Disarm a timer. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|t| t.id != id);
        self.pending.len() != before
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.pending.iter().any(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Remove and return the next timer due at or before `until_ms`, moving
    /// the clock to its due time. Returns None once nothing else is due.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<Timer> {
        let index = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due_ms <= until_ms)
            .min_by_key(|(_, t)| (t.due_ms, t.id))
            .map(|(i, _)| i)?;

        let timer = self.pending.swap_remove(index);
        self.now_ms = self.now_ms.max(timer.due_ms);
        Some(timer)
    }

    /// Move the clock forward (never backward)
    pub fn advance_to(&mut self, now_ms: u64) {
        self.now_ms = self.now_ms.max(now_ms);
    }
}
