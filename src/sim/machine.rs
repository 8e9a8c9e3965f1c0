//! Round state machine
//!
//! Orchestrates `Idle → Round → Result`, owns the clock, the spawner and the
//! timer queue, and is the only writer of progress. The host forwards intents
//! and calls `advance` once per frame with the elapsed milliseconds.

use std::collections::VecDeque;

use super::clock::{ClockSignal, RoundClock};
use super::difficulty::{is_pass, pass_taps_for_round, reaction_ms_for_round};
use super::spawner::{PlayArea, SpawnScheduler};
use super::state::{GameEvent, Phase, RoundSession, Snapshot, Target, TargetView};
use super::timer::{Timer, TimerKind, Timers};
use crate::clamp_round;
use crate::consts::*;
use crate::progress::{ProgressStore, SaveQueue};
use crate::settings::Settings;
use crate::storage::Storage;

/// Undrained events kept before the oldest are dropped
pub const MAX_PENDING_EVENTS: usize = 256;

/// Events queue up until the host calls `drain_events`, normally once per
/// frame. A host that never drains keeps only the newest `MAX_PENDING_EVENTS`.
pub struct RoundMachine {
    phase: Phase,
    round: u32,
    total_hits: u64,
    session: RoundSession,
    passed: bool,
    timers: Timers,
    clock: RoundClock,
    spawner: SpawnScheduler,
    storage: Box<dyn Storage>,
    saves: SaveQueue,
    events: VecDeque<GameEvent>,
}

impl RoundMachine {
    /// Create a machine in `Idle` with progress loaded from `storage`
    pub fn new(settings: &Settings, storage: Box<dyn Storage>) -> Self {
        let seed = settings.seed.unwrap_or_else(rand::random);
        let area = PlayArea {
            width: settings.play_width,
            height: settings.play_height,
            target_size: settings.target_size,
        };
        let progress = ProgressStore::load(storage.as_ref());

        Self {
            phase: Phase::Idle,
            round: progress.round,
            total_hits: progress.total_hits,
            session: RoundSession::default(),
            passed: false,
            timers: Timers::new(),
            clock: RoundClock::new(),
            spawner: SpawnScheduler::new(area, seed),
            storage,
            saves: SaveQueue::new(),
            events: VecDeque::new(),
        }
    }

    /// Create a machine using the settings stored alongside progress
    pub fn open(storage: Box<dyn Storage>) -> Self {
        let settings = Settings::load(storage.as_ref());
        Self::new(&settings, storage)
    }

    // === Intents ===

    /// Start the current round. Only effective from `Idle`.
    pub fn start(&mut self) {
        if self.phase != Phase::Idle {
            log::debug!("start ignored in {:?}", self.phase);
            return;
        }
        self.stop_all();

        self.round = clamp_round(self.round as i64);
        self.session = RoundSession::default();
        self.passed = false;
        self.spawner.clear();
        self.phase = Phase::Round;

        self.clock.start(&mut self.timers);
        self.spawner.start(self.round, &mut self.timers);

        log::info!(
            "Round {} started: need {}, window {}ms",
            self.round,
            pass_taps_for_round(self.round),
            reaction_ms_for_round(self.round)
        );
        self.emit(GameEvent::RoundStarted { round: self.round });
    }

    /// Tap the target. Returns true if it counted as a hit.
    pub fn tap(&mut self) -> bool {
        if self.phase != Phase::Round
            || !self.spawner.is_running()
            || !self.spawner.target_visible()
        {
            return false;
        }

        self.session.score += 1;
        self.total_hits += 1;
        self.saves.push(self.round, Some(self.total_hits));
        self.emit(GameEvent::TargetHit {
            score: self.session.score,
        });
        log::debug!("Hit ({} this round)", self.session.score);

        if let Some(pos) = self.spawner.spawn(self.round, &mut self.timers) {
            self.emit(GameEvent::TargetSpawned { x: pos.x, y: pos.y });
        }
        true
    }

    /// End the live round now. Fired by the clock; also callable by the host.
    pub fn time_up(&mut self) {
        if self.phase != Phase::Round {
            return;
        }
        self.stop_all();
        self.session.time_left = 0;
        self.passed = is_pass(self.round, self.session.score);
        self.phase = Phase::Result;

        log::info!(
            "Round {} ended: {} taps, {}",
            self.round,
            self.session.score,
            if self.passed { "passed" } else { "failed" }
        );
        self.emit(GameEvent::RoundEnded {
            round: self.round,
            score: self.session.score,
            passed: self.passed,
        });
    }

    /// Back to `Idle` on the same round
    pub fn retry(&mut self) {
        if self.phase != Phase::Result {
            return;
        }
        self.reset_to_idle();
    }

    /// Acknowledge a passed round: advance, or wrap to round 1 after the last
    pub fn next(&mut self) {
        if self.phase != Phase::Result || !self.passed {
            log::debug!("next ignored (phase {:?}, passed {})", self.phase, self.passed);
            return;
        }

        if self.round >= TOTAL_ROUNDS {
            self.saves.push(1, Some(self.total_hits));
            self.round = 1;
            self.reset_to_idle();
            log::info!("All rounds finished ({} total hits)", self.total_hits);
            self.emit(GameEvent::SessionFinished);
            return;
        }

        self.round = clamp_round(self.round as i64 + 1);
        self.saves.push(self.round, Some(self.total_hits));
        self.reset_to_idle();
        log::info!("Advanced to round {}", self.round);
        self.emit(GameEvent::RoundAdvanced { round: self.round });
    }

    /// Abandon whatever is going on and ask the host for its menu
    pub fn menu(&mut self) {
        self.reset_to_idle();
        self.emit(GameEvent::ReturnToMenu);
    }

    /// Same as `menu`
    pub fn back(&mut self) {
        self.menu();
    }

    /// The game is no longer visible: cancel every timer
    pub fn suspend(&mut self) {
        self.stop_all();
    }

    /// The game became visible again. Reloads progress and always lands in
    /// `Idle`; an interrupted round is discarded.
    pub fn resume(&mut self) {
        self.saves.flush(self.storage.as_mut());
        let progress = ProgressStore::load(self.storage.as_ref());
        self.round = progress.round;
        self.total_hits = progress.total_hits;
        self.reset_to_idle();
    }

    /// Layout changed; used from the next spawn on
    pub fn set_play_area(&mut self, width: f32, height: f32) {
        self.spawner.set_area(width, height);
    }

    // === Time ===

    /// Advance virtual time by `dt_ms`, firing due timers in order, then
    /// flush queued progress writes.
    pub fn advance(&mut self, dt_ms: u64) {
        let until = self.timers.now().saturating_add(dt_ms);
        while let Some(timer) = self.timers.pop_due(until) {
            self.fire(timer);
        }
        self.timers.advance_to(until);
        self.flush();
    }

    /// Write queued progress. Failures are logged inside the store.
    pub fn flush(&mut self) {
        self.saves.flush(self.storage.as_mut());
    }

    fn fire(&mut self, timer: Timer) {
        match timer.kind {
            TimerKind::ClockTick => {
                let signal = self
                    .clock
                    .on_tick(timer.id, &mut self.session.time_left, &mut self.timers);
                if signal == ClockSignal::Expired {
                    self.time_up();
                }
            }
            TimerKind::FirstSpawn { round } | TimerKind::Respawn { round } => {
                if let Some(pos) = self
                    .spawner
                    .on_deferred_spawn(timer.id, round, &mut self.timers)
                {
                    self.emit(GameEvent::TargetSpawned { x: pos.x, y: pos.y });
                }
            }
            TimerKind::TargetExpiry { round } => {
                if self.spawner.on_expiry(timer.id, round, &mut self.timers) {
                    self.emit(GameEvent::TargetMissed);
                }
            }
        }
    }

    fn emit(&mut self, event: GameEvent) {
        if self.events.len() >= MAX_PENDING_EVENTS {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    fn stop_all(&mut self) {
        self.clock.stop(&mut self.timers);
        self.spawner.stop(&mut self.timers);
    }

    fn reset_to_idle(&mut self) {
        self.stop_all();
        self.session = RoundSession::default();
        self.passed = false;
        self.spawner.clear();
        self.phase = Phase::Idle;
    }

    // === State ===

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn total_hits(&self) -> u64 {
        self.total_hits
    }

    pub fn score(&self) -> u32 {
        self.session.score
    }

    pub fn time_left(&self) -> u32 {
        self.session.time_left
    }

    pub fn passed(&self) -> bool {
        self.passed
    }

    pub fn target(&self) -> Option<&Target> {
        self.spawner.target()
    }

    /// Current virtual time in milliseconds
    pub fn now_ms(&self) -> u64 {
        self.timers.now()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn pending_saves(&self) -> usize {
        self.saves.len()
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.events.drain(..).collect()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            phase: self.phase,
            round: self.round,
            total_rounds: TOTAL_ROUNDS,
            time_left: self.session.time_left,
            round_seconds: ROUND_SECONDS,
            score: self.session.score,
            target: self.spawner.target().map(|t| TargetView {
                x: t.pos.x,
                y: t.pos.y,
                visible: t.visible,
            }),
            pass_threshold: pass_taps_for_round(self.round),
            reaction_window_ms: reaction_ms_for_round(self.round),
            total_hits: self.total_hits,
            passed: self.passed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hud;
    use crate::storage::MemoryStorage;

    fn settings() -> Settings {
        Settings {
            seed: Some(12345),
            ..Default::default()
        }
    }

    fn machine_with(storage: &MemoryStorage) -> RoundMachine {
        RoundMachine::new(&settings(), Box::new(storage.clone()))
    }

    fn machine_at_round(round: u32) -> (RoundMachine, MemoryStorage) {
        let mut storage = MemoryStorage::new();
        ProgressStore::save(&mut storage, round as i64, None);
        let machine = machine_with(&storage);
        (machine, storage)
    }

    /// Start and let the first target appear
    fn started(machine: &mut RoundMachine) {
        machine.start();
        machine.advance(0);
        assert!(machine.snapshot().target.is_some_and(|t| t.visible));
    }

    fn count_ended(events: &[GameEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, GameEvent::RoundEnded { .. }))
            .count()
    }

    #[test]
    fn test_new_loads_progress() {
        let mut storage = MemoryStorage::new();
        ProgressStore::save(&mut storage, 6, Some(140));
        let machine = machine_with(&storage);

        let snap = machine.snapshot();
        assert_eq!(snap.phase, Phase::Idle);
        assert_eq!(snap.round, 6);
        assert_eq!(snap.total_hits, 140);
        assert_eq!(snap.pass_threshold, 35);
        assert_eq!(snap.target, None);
    }

    #[test]
    fn test_start_resets_session() {
        let (mut machine, _) = machine_at_round(1);
        started(&mut machine);
        machine.tap();
        machine.advance(3_000);
        machine.time_up();
        machine.retry();

        machine.start();
        let snap = machine.snapshot();
        assert_eq!(snap.phase, Phase::Round);
        assert_eq!(snap.score, 0);
        assert_eq!(snap.time_left, ROUND_SECONDS);
        assert_eq!(machine.drain_events().last(), Some(&GameEvent::RoundStarted { round: 1 }));
    }

    #[test]
    fn test_first_target_waits_for_next_frame() {
        let (mut machine, _) = machine_at_round(1);
        machine.start();
        assert_eq!(machine.snapshot().target, None);
        assert!(!machine.tap());

        machine.advance(0);
        assert!(machine.snapshot().target.unwrap().visible);
    }

    #[test]
    fn test_start_twice_is_noop() {
        let (mut machine, _) = machine_at_round(1);
        started(&mut machine);
        machine.advance(3_000);
        machine.start();
        assert_eq!(machine.time_left(), 17);
    }

    #[test]
    fn test_tap_scores_and_respawns_immediately() {
        let (mut machine, storage) = machine_at_round(2);
        started(&mut machine);

        assert!(machine.tap());
        let snap = machine.snapshot();
        assert_eq!(snap.score, 1);
        assert_eq!(snap.total_hits, 1);
        assert!(snap.target.unwrap().visible);

        machine.advance(0);
        assert_eq!(storage.peek(ProgressStore::HITS_KEY).as_deref(), Some("1"));
        assert_eq!(storage.peek(ProgressStore::ROUND_KEY).as_deref(), Some("2"));
    }

    #[test]
    fn test_hit_resets_reaction_window() {
        let (mut machine, _) = machine_at_round(1);
        started(&mut machine);

        // Tap just before expiry; the new target gets a full window
        machine.advance(850);
        assert!(machine.tap());
        assert_eq!(machine.target().unwrap().expires_at, 850 + 900);

        machine.advance(100);
        assert!(machine.target().unwrap().visible);
        assert!(!machine.drain_events().contains(&GameEvent::TargetMissed));
    }

    #[test]
    fn test_miss_hides_then_respawns() {
        let (mut machine, _) = machine_at_round(1);
        started(&mut machine);

        machine.advance(900);
        assert!(!machine.target().unwrap().visible);
        assert!(!machine.tap());
        assert_eq!(machine.score(), 0);

        machine.advance(RESPAWN_DELAY_MS);
        assert!(machine.target().unwrap().visible);
        assert!(machine.drain_events().contains(&GameEvent::TargetMissed));
    }

    #[test]
    fn test_misses_cycle_until_round_ends() {
        let (mut machine, _) = machine_at_round(1);
        started(&mut machine);
        machine.advance(19_999);
        assert_eq!(machine.phase(), Phase::Round);
        assert_eq!(machine.time_left(), 1);

        machine.advance(1);
        assert_eq!(machine.phase(), Phase::Result);
        assert_eq!(machine.time_left(), 0);
        assert!(!machine.passed());

        let missed = machine
            .drain_events()
            .iter()
            .filter(|e| **e == GameEvent::TargetMissed)
            .count();
        // 900ms window + 120ms gap
        assert_eq!(missed, 19);
    }

    #[test]
    fn test_round_ends_exactly_once() {
        let (mut machine, _) = machine_at_round(3);
        started(&mut machine);
        for _ in 0..7 {
            machine.tap();
        }
        machine.advance(60_000);

        let events = machine.drain_events();
        assert_eq!(count_ended(&events), 1);
        assert_eq!(machine.phase(), Phase::Result);
        assert_eq!(machine.pending_timers(), 0);
        assert!(!machine.target().unwrap().visible);
    }

    #[test]
    fn test_time_counts_down_by_one_per_second() {
        let (mut machine, _) = machine_at_round(1);
        started(&mut machine);
        for expected in (1..ROUND_SECONDS).rev() {
            machine.advance(1_000);
            assert_eq!(machine.time_left(), expected);
        }
    }

    #[test]
    fn test_round_one_pass_scenario() {
        let (mut machine, _) = machine_at_round(1);
        started(&mut machine);
        for _ in 0..10 {
            assert!(machine.tap());
            machine.advance(200);
        }
        machine.advance(20_000);

        let snap = machine.snapshot();
        assert_eq!(snap.phase, Phase::Result);
        assert!(snap.passed);
        assert_eq!(hud::result_badge(&snap), Some(0));
        assert_eq!(hud::result_hint(&snap), "Next round is ready.");
    }

    #[test]
    fn test_round_ten_one_short_scenario() {
        let (mut machine, _) = machine_at_round(10);
        started(&mut machine);
        for _ in 0..54 {
            assert!(machine.tap());
        }
        machine.advance(20_000);

        let snap = machine.snapshot();
        assert_eq!(snap.phase, Phase::Result);
        assert_eq!(snap.score, 54);
        assert!(!snap.passed);
        assert_eq!(hud::result_hint(&snap), "Need 55+ to pass.");
        assert_eq!(hud::result_badge(&snap), None);
    }

    #[test]
    fn test_external_time_up() {
        let (mut machine, _) = machine_at_round(1);
        started(&mut machine);
        machine.time_up();
        machine.time_up();
        assert_eq!(machine.phase(), Phase::Result);
        assert_eq!(count_ended(&machine.drain_events()), 1);
        assert_eq!(machine.pending_timers(), 0);
    }

    #[test]
    fn test_retry_keeps_round_and_hits() {
        let (mut machine, _) = machine_at_round(4);
        started(&mut machine);
        machine.tap();
        machine.tap();
        machine.advance(20_000);
        machine.retry();

        let snap = machine.snapshot();
        assert_eq!(snap.phase, Phase::Idle);
        assert_eq!(snap.round, 4);
        assert_eq!(snap.total_hits, 2);
        assert_eq!(snap.score, 0);
        assert_eq!(snap.time_left, ROUND_SECONDS);
        assert_eq!(snap.target, None);
    }

    #[test]
    fn test_retry_outside_result_is_noop() {
        let (mut machine, _) = machine_at_round(1);
        started(&mut machine);
        machine.retry();
        assert_eq!(machine.phase(), Phase::Round);
    }

    #[test]
    fn test_next_advances_and_persists() {
        let (mut machine, storage) = machine_at_round(1);
        started(&mut machine);
        for _ in 0..10 {
            machine.tap();
        }
        machine.time_up();
        machine.next();
        machine.flush();

        assert_eq!(machine.phase(), Phase::Idle);
        assert_eq!(machine.round(), 2);
        assert_eq!(storage.peek(ProgressStore::ROUND_KEY).as_deref(), Some("2"));
        assert_eq!(storage.peek(ProgressStore::HITS_KEY).as_deref(), Some("10"));
        assert!(machine.drain_events().contains(&GameEvent::RoundAdvanced { round: 2 }));
    }

    #[test]
    fn test_next_after_fail_is_noop() {
        let (mut machine, _) = machine_at_round(1);
        started(&mut machine);
        machine.time_up();
        machine.next();
        assert_eq!(machine.phase(), Phase::Result);
        assert_eq!(machine.round(), 1);
    }

    #[test]
    fn test_finishing_last_round_wraps_and_keeps_hits() {
        let mut storage = MemoryStorage::new();
        ProgressStore::save(&mut storage, 10, Some(300));
        let mut machine = machine_with(&storage);
        started(&mut machine);
        for _ in 0..55 {
            machine.tap();
        }
        machine.advance(20_000);
        assert!(machine.passed());

        machine.next();
        machine.flush();

        assert_eq!(machine.round(), 1);
        assert_eq!(machine.total_hits(), 355);
        assert_eq!(machine.phase(), Phase::Idle);
        assert_eq!(storage.peek(ProgressStore::ROUND_KEY).as_deref(), Some("1"));
        assert_eq!(storage.peek(ProgressStore::HITS_KEY).as_deref(), Some("355"));
        assert!(machine.drain_events().contains(&GameEvent::SessionFinished));
    }

    #[test]
    fn test_menu_cancels_everything() {
        let (mut machine, _) = machine_at_round(1);
        started(&mut machine);
        machine.advance(2_500);
        machine.menu();
        assert_eq!(machine.pending_timers(), 0);
        assert!(machine.drain_events().contains(&GameEvent::ReturnToMenu));

        // Nothing stale fires into the idle session
        machine.advance(30_000);
        assert!(machine.drain_events().is_empty());
        assert_eq!(machine.phase(), Phase::Idle);
        assert_eq!(machine.time_left(), ROUND_SECONDS);
        assert_eq!(machine.snapshot().target, None);
    }

    #[test]
    fn test_undrained_events_are_capped() {
        let (mut machine, _) = machine_at_round(1);
        // Misses alone produce a spawn and a miss event every 1020ms
        for _ in 0..50 {
            machine.start();
            machine.advance(20_000);
            machine.retry();
        }

        let events = machine.drain_events();
        assert_eq!(events.len(), MAX_PENDING_EVENTS);
        assert!(matches!(events.last(), Some(GameEvent::RoundEnded { .. })));
        assert!(machine.drain_events().is_empty());
    }

    #[test]
    fn test_back_matches_menu() {
        let (mut machine, _) = machine_at_round(1);
        machine.back();
        assert_eq!(machine.drain_events(), vec![GameEvent::ReturnToMenu]);
        assert_eq!(machine.phase(), Phase::Idle);
    }

    #[test]
    fn test_resume_discards_round_in_flight() {
        let (mut machine, storage) = machine_at_round(5);
        started(&mut machine);
        machine.tap();
        machine.tap();
        machine.advance(4_000);

        machine.suspend();
        assert_eq!(machine.pending_timers(), 0);
        machine.resume();

        let snap = machine.snapshot();
        assert_eq!(snap.phase, Phase::Idle);
        assert_eq!(snap.round, 5);
        assert_eq!(snap.score, 0);
        assert_eq!(snap.time_left, ROUND_SECONDS);
        assert_eq!(snap.target, None);
        assert_eq!(snap.total_hits, 2);
        assert_eq!(storage.peek(ProgressStore::HITS_KEY).as_deref(), Some("2"));
    }

    #[test]
    fn test_resume_picks_up_external_progress() {
        let (mut machine, mut storage) = machine_at_round(1);
        ProgressStore::save(&mut storage, 8, Some(99));
        machine.resume();
        assert_eq!(machine.round(), 8);
        assert_eq!(machine.total_hits(), 99);
    }

    #[test]
    fn test_play_area_bounds_spawns() {
        let (mut machine, _) = machine_at_round(1);
        machine.set_play_area(TARGET_SIZE, TARGET_SIZE);
        started(&mut machine);
        let target = machine.snapshot().target.unwrap();
        assert_eq!((target.x, target.y), (0.0, 0.0));
    }

    #[test]
    fn test_snapshot_difficulty_follows_round() {
        let (machine, _) = machine_at_round(10);
        let snap = machine.snapshot();
        assert_eq!(snap.pass_threshold, 55);
        assert_eq!(snap.reaction_window_ms, 420);
        assert_eq!(snap.total_rounds, TOTAL_ROUNDS);
        assert_eq!(snap.round_seconds, ROUND_SECONDS);
    }
}
