//! Fire Rush - A timed reaction-tap mini-game core
//!
//! Core modules:
//! - `sim`: Deterministic round/spawn state machine on a virtual clock
//! - `progress`: Cross-session progress (current round, lifetime hits)
//! - `storage`: Key/value storage backends (memory, file, LocalStorage)
//! - `settings`: Play area and RNG configuration
//! - `hud`: Display values derived from the state snapshot

pub mod error;
pub mod hud;
pub mod progress;
pub mod settings;
pub mod sim;
pub mod storage;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use error::StorageError;
pub use progress::{Progress, ProgressStore};
pub use settings::Settings;
pub use sim::{GameEvent, Phase, RoundMachine, Snapshot};
pub use storage::{MemoryStorage, Storage};

/// Game configuration constants
pub mod consts {
    /// Number of rounds in a full run
    pub const TOTAL_ROUNDS: u32 = 10;
    /// Length of a round in seconds
    pub const ROUND_SECONDS: u32 = 20;
    /// Round clock cadence
    pub const CLOCK_TICK_MS: u64 = 1000;
    /// Cosmetic gap between a missed target hiding and the next one appearing
    pub const RESPAWN_DELAY_MS: u64 = 120;

    /// Pass threshold curve
    pub const PASS_TAPS_BASE: u32 = 10;
    pub const PASS_TAPS_PER_ROUND: u32 = 5;

    /// Reaction window curve endpoints (round 1 → round TOTAL_ROUNDS)
    pub const REACTION_MS_START: f64 = 900.0;
    pub const REACTION_MS_END: f64 = 420.0;

    /// Target footprint (square side)
    pub const TARGET_SIZE: f32 = 74.0;
    /// Default play area, replaced by the host once layout is known
    pub const PLAY_WIDTH: f32 = 354.0;
    pub const PLAY_HEIGHT: f32 = 420.0;

    /// Number of distinct round badges
    pub const BADGE_COUNT: u32 = 5;
}

/// Clamp a round number into `1..=TOTAL_ROUNDS`
#[inline]
pub fn clamp_round(round: i64) -> u32 {
    round.clamp(1, consts::TOTAL_ROUNDS as i64) as u32
}
