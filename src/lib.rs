// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Planet Economy Engine - spaceship production and external upkeep

pub mod types;
pub mod economy;
pub mod conservation;
pub mod config;
pub mod drift;
pub mod predictor;

// Fixed-point mirror of the on-chain arithmetic
pub mod core_types;
pub mod core_economy;
pub mod adapter;

pub use types::*;
pub use economy::{count_arrival, peek, receive_spaceships, send, EconomyError};
pub use config::{ConfigError, GameConfig};
pub use predictor::PlanetPredictor;

use wasm_bindgen::prelude::*;

fn js_err(e: impl std::fmt::Display) -> JsError {
    JsError::new(&e.to_string())
}

// ─── WASM Interface ─────────────────────────────────────────────────────────

#[wasm_bindgen]
impl PlanetPredictor {
    /// `config_json` uses the contract field names; `"{}"` selects the
    /// reference constants.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str, time: f64, initial_grant: f64) -> Result<PlanetPredictor, JsError> {
        #[cfg(target_arch = "wasm32")]
        std::panic::set_hook(Box::new(console_error_panic_hook::hook));

        let config = GameConfig::from_json_str(config_json).map_err(js_err)?;
        Ok(Self::from_config(&config, time, initial_grant))
    }

    /// Rebuild a predictor from a serialized `PlanetEconomyState`.
    pub fn restore(state: JsValue) -> Result<PlanetPredictor, JsError> {
        let state: PlanetEconomyState = serde_wasm_bindgen::from_value(state).map_err(js_err)?;
        conservation::check_invariants(&state).map_err(js_err)?;
        Ok(Self::from_state(state))
    }

    pub fn peek(&mut self, now: f64) -> Result<(), JsError> {
        self.advance_to(now).map_err(js_err)
    }

    pub fn send(&mut self, now: f64, quantity: f64) -> Result<(), JsError> {
        self.send_at(now, quantity).map_err(js_err)
    }

    #[wasm_bindgen(js_name = countArrival)]
    pub fn count_arrival(&mut self, now: f64, quantity: f64, start_time: f64) -> Result<(), JsError> {
        self.arrival_at(now, quantity, start_time).map_err(js_err)
    }

    #[wasm_bindgen(js_name = receiveSpaceships)]
    pub fn receive_spaceships(&mut self, now: f64, quantity: f64) -> Result<(), JsError> {
        self.receive_at(now, quantity).map_err(js_err)
    }

    /// Adopt a confirmed on-chain state; returns the resync report.
    pub fn resync(&mut self, confirmed: JsValue) -> Result<JsValue, JsError> {
        let confirmed: PlanetEconomyState = serde_wasm_bindgen::from_value(confirmed).map_err(js_err)?;
        let report = self.resync_core(confirmed).map_err(js_err)?;
        serde_wasm_bindgen::to_value(&report).map_err(js_err)
    }

    /// Projected state at `now` (not committed).
    pub fn projection(&self, now: f64) -> Result<JsValue, JsError> {
        let projected = self.project(now).map_err(js_err)?;
        serde_wasm_bindgen::to_value(&projected).map_err(js_err)
    }

    #[wasm_bindgen(js_name = getState)]
    pub fn get_state(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.state).unwrap_or(JsValue::NULL)
    }

    #[wasm_bindgen(getter, js_name = numSpaceships)]
    pub fn num_spaceships(&self) -> f64 {
        self.state.num_spaceships
    }

    #[wasm_bindgen(getter, js_name = externalUpkeep)]
    pub fn external_upkeep(&self) -> f64 {
        self.state.external_upkeep
    }

    #[wasm_bindgen(getter, js_name = externalUpkeepDuration)]
    pub fn external_upkeep_duration(&self) -> f64 {
        self.state.external_upkeep_duration
    }

    #[wasm_bindgen(getter, js_name = lastUpdate)]
    pub fn last_update(&self) -> f64 {
        self.state.last_update
    }

    /// Whole ships at `now`, for display.
    #[wasm_bindgen(js_name = displayedSpaceships)]
    pub fn displayed_spaceships(&self, now: f64) -> Result<f64, JsError> {
        self.whole_spaceships_at(now).map(|n| n as f64).map_err(js_err)
    }

    /// Whether drift against confirmed reads is still within bounds.
    #[wasm_bindgen(getter)]
    pub fn trusted(&self) -> bool {
        self.drift.ensure_trusted().is_ok()
    }

    #[wasm_bindgen(js_name = resetDrift)]
    pub fn reset_drift(&mut self) {
        self.drift.reset();
    }
}
