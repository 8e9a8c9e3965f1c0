//! Deterministic game core
//!
//! All gameplay timing lives here and runs on a virtual clock:
//! - No real timers, the host feeds elapsed milliseconds
//! - Seeded RNG only
//! - No rendering or platform dependencies

pub mod autoplay;
pub mod clock;
pub mod difficulty;
pub mod machine;
pub mod spawner;
pub mod state;
pub mod timer;

pub use autoplay::AutoPlayer;
pub use clock::{ClockSignal, RoundClock};
pub use difficulty::{is_pass, pass_taps_for_round, reaction_ms_for_round};
pub use machine::RoundMachine;
pub use spawner::{PlayArea, SpawnScheduler};
pub use state::{GameEvent, Phase, RoundSession, Snapshot, Target, TargetView};
pub use timer::{Timer, TimerId, TimerKind, Timers};
