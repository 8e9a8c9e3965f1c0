//! Game state and snapshot types

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::ROUND_SECONDS;

/// Top-level phase of the round state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Waiting for START
    #[default]
    Idle,
    /// Live play
    Round,
    /// Post-round summary
    Result,
}

/// The single tappable target
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Target {
    /// Top-left corner inside the play area
    pub pos: Vec2,
    pub visible: bool,
    /// Virtual time (ms) at which the reaction window closes
    pub expires_at: u64,
}

/// Per-round counters. Reset on every start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSession {
    pub score: u32,
    pub time_left: u32,
}

impl Default for RoundSession {
    fn default() -> Self {
        Self {
            score: 0,
            time_left: ROUND_SECONDS,
        }
    }
}

/// Notifications for the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    RoundStarted { round: u32 },
    TargetSpawned { x: f32, y: f32 },
    /// Reaction window ran out before a tap
    TargetMissed,
    TargetHit { score: u32 },
    RoundEnded { round: u32, score: u32, passed: bool },
    /// Progress moved to the next round
    RoundAdvanced { round: u32 },
    /// Last round passed and acknowledged; host should leave the game
    SessionFinished,
    /// Host should navigate back to its menu
    ReturnToMenu,
}

/// Target as seen by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetView {
    pub x: f32,
    pub y: f32,
    pub visible: bool,
}

/// Read-only view of everything the presentation layer renders
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub phase: Phase,
    pub round: u32,
    pub total_rounds: u32,
    pub time_left: u32,
    pub round_seconds: u32,
    pub score: u32,
    pub target: Option<TargetView>,
    pub pass_threshold: u32,
    pub reaction_window_ms: u64,
    pub total_hits: u64,
    /// Only meaningful in `Phase::Result`
    pub passed: bool,
}
