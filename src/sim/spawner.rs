//! Target spawn scheduling
//!
//! Owns the single target: where it is, whether it is live, and the timers
//! that expire it and bring it back after a miss. Taps are not detected here;
//! the state machine calls `spawn` again on a hit.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::difficulty::reaction_ms_for_round;
use super::state::Target;
use super::timer::{TimerId, TimerKind, Timers};
use crate::consts::RESPAWN_DELAY_MS;

/// Play area the target must fit in
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayArea {
    pub width: f32,
    pub height: f32,
    /// Side of the square target footprint
    pub target_size: f32,
}

impl PlayArea {
    /// Largest top-left corner that keeps the whole target inside.
    /// Areas smaller than the target collapse to zero.
    pub fn max_corner(&self) -> Vec2 {
        Vec2::new(
            (self.width - self.target_size).max(0.0),
            (self.height - self.target_size).max(0.0),
        )
    }
}

#[derive(Debug)]
pub struct SpawnScheduler {
    rng: Pcg32,
    area: PlayArea,
    running: bool,
    target: Option<Target>,
    /// Reaction window of the live target
    expiry: Option<TimerId>,
    /// Deferred spawn (first of the round, or after a miss)
    pending_spawn: Option<TimerId>,
}

impl SpawnScheduler {
    pub fn new(area: PlayArea, seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            area,
            running: false,
            target: None,
            expiry: None,
            pending_spawn: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn target(&self) -> Option<&Target> {
        self.target.as_ref()
    }

    pub fn target_visible(&self) -> bool {
        self.target.is_some_and(|t| t.visible)
    }

    /// New bounds take effect on the next spawn
    pub fn set_area(&mut self, width: f32, height: f32) {
        let sane = |v: f32| if v.is_finite() { v.max(0.0) } else { 0.0 };
        self.area.width = sane(width);
        self.area.height = sane(height);
    }

    /// Enter the running state and defer the first spawn to the next frame
    pub fn start(&mut self, round: u32, timers: &mut Timers) {
        self.stop(timers);
        self.running = true;
        self.pending_spawn = Some(timers.schedule(0, TimerKind::FirstSpawn { round }));
    }

    /// Place a fresh live target and arm its expiry. No-op unless running.
    /// Returns the new position.
    pub fn spawn(&mut self, round: u32, timers: &mut Timers) -> Option<Vec2> {
        if !self.running {
            return None;
        }
        self.disarm(timers);

        let max = self.area.max_corner();
        let pos = Vec2::new(
            self.rng.random_range(0.0..=max.x),
            self.rng.random_range(0.0..=max.y),
        );

        let reaction_ms = reaction_ms_for_round(round);
        self.target = Some(Target {
            pos,
            visible: true,
            expires_at: timers.now() + reaction_ms,
        });
        self.expiry = Some(timers.schedule(reaction_ms, TimerKind::TargetExpiry { round }));

        log::debug!("Target spawned at ({:.0}, {:.0}), live {reaction_ms}ms", pos.x, pos.y);
        Some(pos)
    }

    /// Handle a `TargetExpiry` fire: hide the target and schedule the next
    /// one after the cosmetic delay. Returns false for stale fires.
    pub fn on_expiry(&mut self, id: TimerId, round: u32, timers: &mut Timers) -> bool {
        if !self.running || self.expiry != Some(id) {
            log::trace!("Ignoring stale expiry {id:?}");
            return false;
        }
        self.expiry = None;
        self.hide();
        self.pending_spawn = Some(timers.schedule(RESPAWN_DELAY_MS, TimerKind::Respawn { round }));
        log::debug!("Target missed");
        true
    }

    /// Handle a `FirstSpawn` or `Respawn` fire
    pub fn on_deferred_spawn(
        &mut self,
        id: TimerId,
        round: u32,
        timers: &mut Timers,
    ) -> Option<Vec2> {
        if !self.running || self.pending_spawn != Some(id) {
            log::trace!("Ignoring stale spawn {id:?}");
            return None;
        }
        self.pending_spawn = None;
        self.spawn(round, timers)
    }

    /// Disarm everything, hide the target, leave the running state. Idempotent.
    pub fn stop(&mut self, timers: &mut Timers) {
        self.running = false;
        self.disarm(timers);
        self.hide();
    }

    /// Forget the target entirely (fresh session)
    pub fn clear(&mut self) {
        self.target = None;
    }

    fn hide(&mut self) {
        if let Some(target) = self.target.as_mut() {
            target.visible = false;
        }
    }

    fn disarm(&mut self, timers: &mut Timers) {
        if let Some(id) = self.expiry.take() {
            timers.cancel(id);
        }
        if let Some(id) = self.pending_spawn.take() {
            timers.cancel(id);
        }
    }
}
