//! Browser bridge
//!
//! Thin `wasm-bindgen` wrapper: the page renders from `snapshot()` JSON and
//! forwards button presses and taps. Time comes from `requestAnimationFrame`
//! timestamps passed to `frame`.

use wasm_bindgen::prelude::*;

use crate::sim::RoundMachine;
use crate::storage::{LocalStorage, MemoryStorage, Storage};

#[wasm_bindgen(start)]
pub fn wasm_start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"logger already initialised".into());
    }
    log::info!("Fire Rush starting...");
}

#[wasm_bindgen]
pub struct WebGame {
    machine: RoundMachine,
    last_time: Option<f64>,
}

#[wasm_bindgen]
impl WebGame {
    #[wasm_bindgen(constructor)]
    pub fn new() -> WebGame {
        let storage: Box<dyn Storage> = match LocalStorage::open() {
            Ok(storage) => Box::new(storage),
            Err(e) => {
                log::warn!("{e}; progress will not persist");
                Box::new(MemoryStorage::new())
            }
        };
        WebGame {
            machine: RoundMachine::open(storage),
            last_time: None,
        }
    }

    /// Advance by the time since the previous frame
    pub fn frame(&mut self, now_ms: f64) {
        let dt = match self.last_time {
            Some(last) if now_ms > last => (now_ms - last).round() as u64,
            _ => 0,
        };
        self.last_time = Some(now_ms);
        self.machine.advance(dt);
    }

    pub fn start(&mut self) {
        self.machine.start();
    }

    pub fn tap(&mut self) -> bool {
        self.machine.tap()
    }

    pub fn retry(&mut self) {
        self.machine.retry();
    }

    pub fn next(&mut self) {
        self.machine.next();
    }

    pub fn menu(&mut self) {
        self.machine.menu();
    }

    pub fn back(&mut self) {
        self.machine.back();
    }

    /// Page hidden or navigated away
    pub fn suspend(&mut self) {
        self.machine.suspend();
        self.last_time = None;
    }

    pub fn resume(&mut self) {
        self.machine.resume();
        self.last_time = None;
    }

    pub fn set_play_area(&mut self, width: f32, height: f32) {
        self.machine.set_play_area(width, height);
    }

    /// Current state as JSON
    pub fn snapshot(&self) -> String {
        serde_json::to_string(&self.machine.snapshot()).unwrap_or_default()
    }

    /// Events since the last call, as a JSON array
    pub fn drain_events(&mut self) -> String {
        serde_json::to_string(&self.machine.drain_events()).unwrap_or_else(|_| "[]".to_string())
    }
}

impl Default for WebGame {
    fn default() -> Self {
        Self::new()
    }
}
