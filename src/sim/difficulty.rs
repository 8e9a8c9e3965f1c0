//! Per-round difficulty curve
//!
//! Pure functions of the round number. Out-of-range rounds are clamped.

use crate::clamp_round;
use crate::consts::*;

/// Taps needed to pass `round`: 10 at round 1, +5 per round, 55 at round 10
pub fn pass_taps_for_round(round: u32) -> u32 {
    let r = clamp_round(round as i64);
    PASS_TAPS_BASE + (r - 1) * PASS_TAPS_PER_ROUND
}

/// How long a target stays live in `round`, in milliseconds.
/// Linear from 900ms (round 1) to 420ms (last round), rounded.
pub fn reaction_ms_for_round(round: u32) -> u64 {
    let r = clamp_round(round as i64);
    let t = (r - 1) as f64 / (TOTAL_ROUNDS - 1) as f64;
    (REACTION_MS_START + (REACTION_MS_END - REACTION_MS_START) * t).round() as u64
}

/// Whether `score` meets the pass threshold of `round`
pub fn is_pass(round: u32, score: u32) -> bool {
    score >= pass_taps_for_round(round)
}
