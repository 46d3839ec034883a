// Copyright (c) 2026 Hypermesh Foundation. All rights reserved.
// Licensed under the Business Source License 1.1.
// See the LICENSE file in the repository root for full license text.

//! Fixed-point production / upkeep integration.
//!
//! Same algorithm as [`crate::economy`], evaluated in `Decimal`. Used as the
//! parity reference for the float predictor: the on-chain record is fixed
//! point, so the two are compared step by step in the bench runner and tests.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::core_types::{FixedPlanetState, Ships, SECONDS_PER_HOUR};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Validation failures, raised before the state is touched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FixedEconomyError {
    #[error("invalid time travel: cannot advance by {0}s")]
    InvalidTimeTravel(Decimal),

    #[error("cannot move negative spaceships ({0})")]
    NegativeQuantity(Decimal),

    #[error("not enough spaceships: requested {requested}, available {available}")]
    InsufficientShips { requested: Decimal, available: Decimal },
}

const TWO: Decimal = dec!(2);

fn require_quantity(quantity: Ships) -> Result<(), FixedEconomyError> {
    if quantity.0 < Decimal::ZERO {
        return Err(FixedEconomyError::NegativeQuantity(quantity.0));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Advance
// ---------------------------------------------------------------------------

/// Advance by `time_elapsed` seconds.
pub fn peek(state: &FixedPlanetState, time_elapsed: Decimal) -> Result<FixedPlanetState, FixedEconomyError> {
    if time_elapsed < Decimal::ZERO {
        return Err(FixedEconomyError::InvalidTimeTravel(time_elapsed));
    }

    let mut next = *state;
    let max = state.stats.max_upkeep.0;
    let above_cap = state.num_spaceships.0 >= max;

    let mut external_area = Decimal::ZERO;
    if next.has_debt() {
        let actual_time = next.external_upkeep_duration.min(time_elapsed);
        let decrease = (next.world.external_upkeep_down_rate * actual_time).min(next.external_upkeep.0);
        external_area = decrease * actual_time / TWO + next.external_upkeep.0 * actual_time;

        next.external_upkeep = Ships(next.external_upkeep.0 - decrease);
        next.external_upkeep_duration -= actual_time;
        if next.external_upkeep.0 <= Decimal::ZERO || next.external_upkeep_duration <= Decimal::ZERO {
            next.clear_debt();
        }
    }

    let mut ships = next.num_spaceships.0;
    if above_cap {
        ships -= time_elapsed * next.stats.production / SECONDS_PER_HOUR / TWO;
        // Zero floor first, then the cap floor.
        if ships <= Decimal::ZERO {
            ships = Decimal::ZERO;
        } else if ships < max {
            ships = max;
        }
    } else {
        let budget = max * time_elapsed;
        if budget > Decimal::ZERO {
            let free = (budget - external_area).max(Decimal::ZERO);
            // Divide before multiplying to keep intermediates inside Decimal range.
            ships += time_elapsed * next.stats.production / SECONDS_PER_HOUR * (free / budget);
        }
        ships = ships.max(Decimal::ZERO).min(max);
    }
    next.num_spaceships = Ships(ships);

    next.last_update += time_elapsed;
    Ok(next)
}

// ---------------------------------------------------------------------------
// Depart
// ---------------------------------------------------------------------------

fn merge_upkeep(state: &mut FixedPlanetState, quantity: Ships) {
    let rate = state.world.external_upkeep_down_rate;
    let old_duration = state.external_upkeep_duration;
    let old_upkeep = state.external_upkeep.0;
    let window = state.world.external_upkeep_duration;

    let own_duration = quantity.0.checked_div(rate).unwrap_or(window);
    let new_duration = old_duration.max(own_duration).min(window);
    if new_duration <= Decimal::ZERO {
        return;
    }

    let new_upkeep = (new_duration * new_duration * rate - rate * old_duration * old_duration
        + TWO * new_duration * quantity.0
        + TWO * old_duration * old_upkeep)
        / (TWO * new_duration);

    if new_upkeep <= Decimal::ZERO {
        state.clear_debt();
    } else {
        state.external_upkeep = Ships(new_upkeep);
        state.external_upkeep_duration = new_duration;
    }
}

/// Advance by `time_elapsed`, then send `quantity` ships away.
pub fn send(
    state: &FixedPlanetState,
    time_elapsed: Decimal,
    quantity: Ships,
) -> Result<FixedPlanetState, FixedEconomyError> {
    require_quantity(quantity)?;
    let mut next = peek(state, time_elapsed)?;
    if quantity > next.num_spaceships {
        return Err(FixedEconomyError::InsufficientShips {
            requested: quantity.0,
            available: next.num_spaceships.0,
        });
    }
    if quantity.is_zero() {
        return Ok(next);
    }

    next.num_spaceships = next.num_spaceships - quantity;
    if next.has_debt() {
        merge_upkeep(&mut next, quantity);
    } else {
        next.external_upkeep = quantity;
        next.external_upkeep_duration = next.world.external_upkeep_duration;
    }
    Ok(next)
}

// ---------------------------------------------------------------------------
// Arrive / Return
// ---------------------------------------------------------------------------

/// Advance by `time_elapsed`, then redeem the debt of `quantity` ships that
/// departed at `start_time`.
pub fn count_arrival(
    state: &FixedPlanetState,
    time_elapsed: Decimal,
    quantity: Ships,
    start_time: Decimal,
) -> Result<FixedPlanetState, FixedEconomyError> {
    require_quantity(quantity)?;
    let mut next = peek(state, time_elapsed)?;
    if quantity.is_zero() || !next.has_debt() || next.external_upkeep_duration <= Decimal::ZERO {
        return Ok(next);
    }

    let time_left = next.world.external_upkeep_duration - (next.last_update - start_time);
    if time_left <= Decimal::ZERO {
        return Ok(next);
    }

    let duration = next.external_upkeep_duration;
    let new_upkeep = (duration * next.external_upkeep.0 - time_left * quantity.0) / duration;
    if new_upkeep <= Decimal::ZERO {
        next.clear_debt();
    } else {
        next.external_upkeep = Ships(new_upkeep);
    }
    Ok(next)
}

/// Advance by `time_elapsed`, then add `quantity` ships without capping.
pub fn receive_spaceships(
    state: &FixedPlanetState,
    time_elapsed: Decimal,
    quantity: Ships,
) -> Result<FixedPlanetState, FixedEconomyError> {
    require_quantity(quantity)?;
    let mut next = peek(state, time_elapsed)?;
    next.num_spaceships = next.num_spaceships + quantity;
    Ok(next)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
