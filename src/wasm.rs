#![cfg(feature = "wasm")]

use wasm_bindgen::prelude::*;

use crate::api::Simulator;
use crate::config::ScenarioFile;
use crate::time::Timestamp;

/// WASM binding for the simulator.
///
/// Exposes `Simulator` to a JavaScript renderer. The page calls
/// `on_frame(performance.now())` from `requestAnimationFrame` and reads
/// state back as JSON.
#[wasm_bindgen]
pub struct ArpStepper {
    sim: Simulator,
}

#[wasm_bindgen]
impl ArpStepper {
    /// Create a simulator for the classroom LAN.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<ArpStepper, JsError> {
        console_error_panic_hook::set_once();
        let file = ScenarioFile::classroom();
        let sim = Simulator::new(file.topology, file.config)?;
        Ok(ArpStepper { sim })
    }

    /// Create a simulator from a scenario JSON document.
    pub fn from_scenario(json: &str) -> Result<ArpStepper, JsError> {
        console_error_panic_hook::set_once();
        let file = ScenarioFile::from_json(json)?;
        let sim = Simulator::new(file.topology, file.config)?;
        Ok(ArpStepper { sim })
    }

    pub fn next(&mut self) {
        self.sim.advance();
    }

    pub fn prev(&mut self) {
        self.sim.retreat();
    }

    pub fn jump_to(&mut self, index: u32) {
        self.sim.jump_to(index as usize);
    }

    pub fn reset(&mut self) {
        self.sim.reset();
    }

    pub fn play(&mut self) {
        self.sim.play();
    }

    pub fn pause(&mut self) {
        self.sim.pause();
    }

    pub fn is_playing(&self) -> bool {
        self.sim.is_playing()
    }

    /// Refresh callback. `now_ms` is a `DOMHighResTimeStamp`.
    pub fn on_frame(&mut self, now_ms: f64) -> u32 {
        let now = Timestamp::from_millis(now_ms.max(0.0).round() as u64);
        self.sim.on_frame(now) as u32
    }

    pub fn step_index(&self) -> u32 {
        self.sim.step_index() as u32
    }

    pub fn step_count(&self) -> u32 {
        self.sim.script().len() as u32
    }

    pub fn progress(&self) -> f64 {
        self.sim.progress()
    }

    pub fn state_json(&self) -> String {
        self.sim.state_json()
    }

    pub fn event_log_json(&self) -> String {
        self.sim.event_log_json()
    }

    pub fn script_json(&self) -> String {
        self.sim.script_json()
    }
}
