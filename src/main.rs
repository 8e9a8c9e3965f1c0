//! Fire Rush entry point
//!
//! Native: headless run of the current round with the autoplay bot on a
//! virtual clock, persisting progress to a JSON file. The browser build
//! drives the core through `fire_rush::web` instead.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use fire_rush::hud;
    use fire_rush::sim::{AutoPlayer, GameEvent, Phase, RoundMachine};
    use fire_rush::storage::{FileStorage, MemoryStorage, Storage};

    const FRAME_MS: u64 = 16;

    env_logger::init();
    log::info!("Fire Rush (native) starting...");

    let path =
        std::env::var("FIRE_RUSH_SAVE").unwrap_or_else(|_| "fire_rush_save.json".to_string());
    let reaction_ms = std::env::var("FIRE_RUSH_REACTION_MS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(300);

    let storage: Box<dyn Storage> = match FileStorage::open(&path) {
        Ok(storage) => {
            log::info!("Progress file: {}", storage.path().display());
            Box::new(storage)
        }
        Err(e) => {
            log::warn!("Cannot open {path}: {e}; progress will not persist");
            Box::new(MemoryStorage::new())
        }
    };

    let mut machine = RoundMachine::open(storage);
    let mut bot = AutoPlayer::new(reaction_ms);
    machine.resume();

    let snap = machine.snapshot();
    println!("{}  {}", hud::round_label(&snap), hud::pass_hint(&snap));
    println!("{}", hud::reaction_hint(&snap));
    println!("{}", hud::IDLE_PROMPT);

    machine.start();
    while machine.phase() == Phase::Round {
        bot.step(&mut machine, FRAME_MS);
    }

    let snap = machine.snapshot();
    println!("{}", hud::result_title(&snap));
    println!("{}", hud::taps_line(&snap));
    println!("{}", hud::result_hint(&snap));

    if snap.passed {
        machine.next();
    } else {
        machine.retry();
    }
    machine.flush();

    for event in machine.drain_events() {
        if event == GameEvent::SessionFinished {
            println!("Session finished, progress wrapped to round 1");
        }
    }
    println!("{}", hud::level_line(&machine.snapshot()));
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is fire_rush::web::wasm_start, this is just to satisfy the compiler
}
