// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Planet Economy Engine - Invariant Audit

use serde::{Deserialize, Serialize};

use crate::types::PlanetEconomyState;

/// Absolute error below this is treated as balanced.
pub const SHIP_TOLERANCE: f64 = 1e-6;

// ---------------------------------------------------------------------------
// Invariants
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvariantViolation {
    #[error("negative spaceship count: {0}")]
    NegativeShips(f64),

    #[error("negative external upkeep: {0}")]
    NegativeUpkeep(f64),

    #[error("upkeep duration {duration} outside [0, {window}]")]
    DurationOutOfRange { duration: f64, window: f64 },

    #[error("upkeep {upkeep} and duration {duration} must be zero together")]
    UnpairedZero { upkeep: f64, duration: f64 },

    #[error("clock moved backward: {before} -> {after}")]
    ClockRewound { before: f64, after: f64 },

    #[error("non-finite field: {0}")]
    NonFinite(&'static str),

    #[error("{field} must be positive and finite, got {value}")]
    InvalidConstant { field: &'static str, value: f64 },
}

/// Return the first invariant `state` violates, if any.
pub fn check_invariants(state: &PlanetEconomyState) -> Result<(), InvariantViolation> {
    check_constants(state)?;
    for (name, value) in [
        ("num_spaceships", state.num_spaceships),
        ("last_update", state.last_update),
        ("external_upkeep", state.external_upkeep),
        ("external_upkeep_duration", state.external_upkeep_duration),
    ] {
        if !value.is_finite() {
            return Err(InvariantViolation::NonFinite(name));
        }
    }

    if state.num_spaceships < 0.0 {
        return Err(InvariantViolation::NegativeShips(state.num_spaceships));
    }
    if state.external_upkeep < 0.0 {
        return Err(InvariantViolation::NegativeUpkeep(state.external_upkeep));
    }

    let window = state.world.external_upkeep_duration;
    let duration = state.external_upkeep_duration;
    if duration < 0.0 || duration > window {
        return Err(InvariantViolation::DurationOutOfRange { duration, window });
    }
    if (state.external_upkeep == 0.0) != (duration == 0.0) {
        return Err(InvariantViolation::UnpairedZero {
            upkeep: state.external_upkeep,
            duration,
        });
    }
    Ok(())
}

/// Planet and world constants must be positive and finite; every tick
/// divides by or clamps against them.
pub fn check_constants(state: &PlanetEconomyState) -> Result<(), InvariantViolation> {
    for (field, value) in [
        ("production", state.stats.production),
        ("maxUpkeep", state.stats.max_upkeep),
        ("externalUpKeepDuration", state.world.external_upkeep_duration),
        ("externalUpkeepDownRate", state.world.external_upkeep_down_rate),
    ] {
        if !(value.is_finite() && value > 0.0) {
            return Err(InvariantViolation::InvalidConstant { field, value });
        }
    }
    Ok(())
}

/// Check a transition: the post state must be valid and not rewind the clock.
pub fn check_transition(
    before: &PlanetEconomyState,
    after: &PlanetEconomyState,
) -> Result<(), InvariantViolation> {
    check_invariants(after)?;
    if after.last_update < before.last_update {
        return Err(InvariantViolation::ClockRewound {
            before: before.last_update,
            after: after.last_update,
        });
    }
    Ok(())
}

/// Ship conservation at departure.
///
/// `advanced` is the state after the implicit advance, `departed` the state
/// returned by the departure. Returns the absolute leak; zero is balanced.
pub fn ship_balance(advanced: &PlanetEconomyState, departed: &PlanetEconomyState, quantity: f64) -> f64 {
    (advanced.num_spaceships - quantity - departed.num_spaceships).abs()
}

// ---------------------------------------------------------------------------
// Audit log
// ---------------------------------------------------------------------------

/// Running tally of checked transitions.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct InvariantAudit {
    pub checked: u64,
    pub violations: u64,
    /// Display text of the first violation seen.
    pub first_violation: Option<String>,
    /// Largest departure imbalance seen.
    pub max_ship_leak: f64,
}

impl InvariantAudit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, before: &PlanetEconomyState, after: &PlanetEconomyState) {
        self.checked += 1;
        if let Err(violation) = check_transition(before, after) {
            self.violations += 1;
            if self.first_violation.is_none() {
                self.first_violation = Some(violation.to_string());
            }
        }
    }

    pub fn record_departure(&mut self, advanced: &PlanetEconomyState, departed: &PlanetEconomyState, quantity: f64) {
        let leak = ship_balance(advanced, departed, quantity);
        self.max_ship_leak = self.max_ship_leak.max(leak);
        if leak > SHIP_TOLERANCE {
            self.violations += 1;
            if self.first_violation.is_none() {
                self.first_violation = Some(format!("departure leaked {leak} ships"));
            }
        }
    }

    pub fn is_clean(&self) -> bool {
        self.violations == 0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
