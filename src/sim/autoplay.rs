//! Idle/demo player
//!
//! Taps each target once it has been on screen for a fixed reaction time.
//! Drives the headless binary and the end-to-end tests.

use super::machine::RoundMachine;

#[derive(Debug, Clone)]
pub struct AutoPlayer {
    reaction_ms: u64,
    /// (expires_at of the tracked target, time it was first seen)
    tracking: Option<(u64, u64)>,
}

impl AutoPlayer {
    pub fn new(reaction_ms: u64) -> Self {
        Self {
            reaction_ms,
            tracking: None,
        }
    }

    /// Whether the bot taps this frame
    pub fn wants_tap(&mut self, machine: &RoundMachine) -> bool {
        let now = machine.now_ms();
        let Some(target) = machine.target().filter(|t| t.visible) else {
            self.tracking = None;
            return false;
        };

        let seen_at = match self.tracking {
            Some((expires_at, seen_at)) if expires_at == target.expires_at => seen_at,
            _ => {
                self.tracking = Some((target.expires_at, now));
                now
            }
        };

        if now.saturating_sub(seen_at) >= self.reaction_ms {
            self.tracking = None;
            true
        } else {
            false
        }
    }

    /// Play one frame: advance time, then tap if ready
    pub fn step(&mut self, machine: &mut RoundMachine, frame_ms: u64) {
        machine.advance(frame_ms);
        if self.wants_tap(machine) {
            machine.tap();
        }
    }
}
