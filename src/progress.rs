//! Cross-session progress: current round and lifetime hit count
//!
//! Persisted as two independent integer strings. Reads fail soft to
//! `{round: 1, total_hits: 0}`; writes are queued by the game and flushed
//! later, with failures logged and dropped.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::clamp_round;
use crate::storage::Storage;

/// Durable progress record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    /// Current round, always in `1..=TOTAL_ROUNDS`
    pub round: u32,
    /// Lifetime successful taps
    pub total_hits: u64,
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            round: 1,
            total_hits: 0,
        }
    }
}

/// Stateless accessor for the progress keys
pub struct ProgressStore;

impl ProgressStore {
    pub const ROUND_KEY: &'static str = "fire_rush_round";
    pub const HITS_KEY: &'static str = "fire_rush_hits_total";

    /// Load progress. Missing, unreadable or unparsable entries fall back to
    /// their defaults independently; values are clamped into range.
    pub fn load(storage: &dyn Storage) -> Progress {
        let defaults = Progress::default();

        let round = read_int(storage, Self::ROUND_KEY)
            .map(|n| match n {
                StoredInt::Negative(_) => 1,
                StoredInt::NonNegative(v) => clamp_round(v.min(i64::MAX as u64) as i64),
            })
            .unwrap_or(defaults.round);
        let total_hits = read_int(storage, Self::HITS_KEY)
            .map(|n| match n {
                StoredInt::Negative(_) => 0,
                StoredInt::NonNegative(v) => v,
            })
            .unwrap_or(defaults.total_hits);

        let progress = Progress { round, total_hits };
        log::info!(
            "Loaded progress: round {}, {} total hits",
            progress.round,
            progress.total_hits
        );
        progress
    }

    /// Write `round` (clamped) and, when supplied, `total_hits`. Omitting the
    /// hit count leaves the stored one untouched. Errors are swallowed.
    pub fn save(storage: &mut dyn Storage, round: i64, total_hits: Option<i64>) {
        Self::write(storage, clamp_round(round), total_hits.map(|h| h.max(0) as u64));
    }

    fn write(storage: &mut dyn Storage, round: u32, total_hits: Option<u64>) {
        if let Err(e) = storage.set_item(Self::ROUND_KEY, &round.to_string()) {
            log::warn!("Progress save failed (round): {e}");
            return;
        }
        if let Some(hits) = total_hits {
            if let Err(e) = storage.set_item(Self::HITS_KEY, &hits.to_string()) {
                log::warn!("Progress save failed (hits): {e}");
                return;
            }
        }
        log::debug!("Progress saved: round {round}, hits {total_hits:?}");
    }
}

/// Integer read back from storage; magnitudes saturate at `u64::MAX`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StoredInt {
    Negative(u64),
    NonNegative(u64),
}

/// Leading-integer parse: skips leading whitespace, takes an optional sign
/// and the longest run of decimal digits, ignores whatever follows.
/// `"3abc"` → 3, `"42.0"` → 42, `"abc"` → None.
fn parse_leading_int(raw: &str) -> Option<StoredInt> {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let mut value: u64 = 0;
    let mut seen = false;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        seen = true;
        value = value.saturating_mul(10).saturating_add((b - b'0') as u64);
    }

    seen.then_some(if negative {
        StoredInt::Negative(value)
    } else {
        StoredInt::NonNegative(value)
    })
}

fn read_int(storage: &dyn Storage, key: &str) -> Option<StoredInt> {
    match storage.get_item(key) {
        Ok(Some(raw)) => parse_leading_int(&raw),
        Ok(None) => None,
        Err(e) => {
            log::warn!("Progress read failed for `{key}`: {e}");
            None
        }
    }
}

/// A pending progress write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveRequest {
    pub round: u32,
    pub total_hits: Option<u64>,
}

/// Fire-and-forget write queue. Gameplay only enqueues; the host's frame
/// loop flushes.
#[derive(Debug, Default)]
pub struct SaveQueue {
    pending: VecDeque<SaveRequest>,
}

impl SaveQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, round: u32, total_hits: Option<u64>) {
        self.pending.push_back(SaveRequest { round, total_hits });
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Write every pending request in order. Never fails.
    pub fn flush(&mut self, storage: &mut dyn Storage) {
        while let Some(req) = self.pending.pop_front() {
            ProgressStore::write(storage, clamp_round(req.round as i64), req.total_hits);
        }
    }
}
