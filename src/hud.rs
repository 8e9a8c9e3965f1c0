//! HUD and result card values
//!
//! Everything here is a pure function of a `Snapshot`; nothing is stored.

use crate::consts::BADGE_COUNT;
use crate::sim::{Phase, Snapshot};

/// Primary button on the result card
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultAction {
    NextRound,
    Finish,
    TryAgain,
}

impl ResultAction {
    pub fn label(&self) -> &'static str {
        match self {
            ResultAction::NextRound => "NEXT ROUND",
            ResultAction::Finish => "FINISH",
            ResultAction::TryAgain => "TRY AGAIN",
        }
    }
}

pub const IDLE_PROMPT: &str = "Press START to begin";

/// "3/10"
pub fn round_label(snap: &Snapshot) -> String {
    format!("{}/{}", snap.round, snap.total_rounds)
}

/// Countdown while playing, full length otherwise
pub fn time_label(snap: &Snapshot) -> String {
    let secs = if snap.phase == Phase::Round {
        snap.time_left
    } else {
        snap.round_seconds
    };
    format!("{secs}s")
}

/// Score is only shown while playing
pub fn score_value(snap: &Snapshot) -> u32 {
    if snap.phase == Phase::Round { snap.score } else { 0 }
}

pub fn reaction_hint(snap: &Snapshot) -> String {
    format!("Reaction window: {}ms", snap.reaction_window_ms)
}

pub fn pass_hint(snap: &Snapshot) -> String {
    format!("Pass: {}+ taps in {}s", snap.pass_threshold, snap.round_seconds)
}

/// Badge artwork index for a round, cycling through the set
pub fn badge_index(round: u32) -> u32 {
    round.saturating_sub(1) % BADGE_COUNT
}

/// Badge shown on the result card (pass only)
pub fn result_badge(snap: &Snapshot) -> Option<u32> {
    (snap.phase == Phase::Result && snap.passed).then(|| badge_index(snap.round))
}

pub fn result_title(snap: &Snapshot) -> &'static str {
    if snap.passed { "ROUND COMPLETE" } else { "ROUND FAILED" }
}

fn is_last_round(snap: &Snapshot) -> bool {
    snap.round >= snap.total_rounds
}

pub fn result_hint(snap: &Snapshot) -> String {
    match (snap.passed, is_last_round(snap)) {
        (true, true) => "All rounds finished.".to_string(),
        (true, false) => "Next round is ready.".to_string(),
        (false, _) => format!("Need {}+ to pass.", snap.pass_threshold),
    }
}

pub fn result_action(snap: &Snapshot) -> ResultAction {
    match (snap.passed, is_last_round(snap)) {
        (true, true) => ResultAction::Finish,
        (true, false) => ResultAction::NextRound,
        (false, _) => ResultAction::TryAgain,
    }
}

pub fn taps_line(snap: &Snapshot) -> String {
    format!("Taps: {}", snap.score)
}

/// "Round 3/10 • Total taps 120"
pub fn level_line(snap: &Snapshot) -> String {
    format!(
        "Round {}/{} • Total taps {}",
        snap.round, snap.total_rounds, snap.total_hits
    )
}
