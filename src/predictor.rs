// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Planet Economy Engine - Planet Predictor
//
// Wraps one planet's state behind an absolute-clock API: callers pass the
// current game time and the predictor derives the elapsed interval.

use wasm_bindgen::prelude::*;

use crate::config::GameConfig;
use crate::drift::{DriftError, DriftMonitor, ResyncReport};
use crate::economy::{self, EconomyError};
use crate::types::PlanetEconomyState;

// ─── PlanetPredictor struct ─────────────────────────────────────────────────

#[wasm_bindgen]
pub struct PlanetPredictor {
    pub(crate) state: PlanetEconomyState,
    pub(crate) drift: DriftMonitor,
}

// ─── Internal Logic (Testable, pure Rust) ───────────────────────────────────

impl PlanetPredictor {
    pub fn from_state(state: PlanetEconomyState) -> Self {
        Self {
            state,
            drift: DriftMonitor::default(),
        }
    }

    pub fn from_config(config: &GameConfig, time: f64, initial_grant: f64) -> Self {
        Self::from_state(config.genesis(time, initial_grant))
    }

    pub fn state(&self) -> &PlanetEconomyState {
        &self.state
    }

    pub fn drift(&self) -> &DriftMonitor {
        &self.drift
    }

    fn elapsed_until(&self, now: f64) -> f64 {
        now - self.state.last_update
    }

    /// Bring the state up to `now`. Fails if `now` is before the last update.
    pub fn advance_to(&mut self, now: f64) -> Result<(), EconomyError> {
        self.state.advance(self.elapsed_until(now))
    }

    /// State as it would be at `now`, without committing it.
    pub fn project(&self, now: f64) -> Result<PlanetEconomyState, EconomyError> {
        economy::peek(&self.state, self.elapsed_until(now))
    }

    pub fn send_at(&mut self, now: f64, quantity: f64) -> Result<(), EconomyError> {
        self.state.depart(self.elapsed_until(now), quantity)
    }

    pub fn arrival_at(&mut self, now: f64, quantity: f64, start_time: f64) -> Result<(), EconomyError> {
        self.state.arrive(self.elapsed_until(now), quantity, start_time)
    }

    pub fn receive_at(&mut self, now: f64, quantity: f64) -> Result<(), EconomyError> {
        self.state.receive(self.elapsed_until(now), quantity)
    }

    /// Adopt a confirmed contract read.
    pub fn resync_core(&mut self, confirmed: PlanetEconomyState) -> Result<ResyncReport, DriftError> {
        self.drift.resync(&mut self.state, confirmed)
    }

    /// Whole ships shown at `now`.
    pub fn whole_spaceships_at(&self, now: f64) -> Result<u64, EconomyError> {
        Ok(self.project(now)?.whole_spaceships())
    }
}
