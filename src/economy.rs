// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Planet Economy Engine - Production / Upkeep Integration
//
// Closed-form integration of a planet's spaceship population between two
// clock readings: growth toward the cap is throttled by the decaying
// external-upkeep pool, and a planet above its cap bleeds back down to it.

use tracing::{debug, trace};

use crate::types::{PlanetEconomyState, PopulationRegime, Regime, UpkeepRegime, SECONDS_PER_HOUR};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Input validation failures. Raised before any field is touched.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EconomyError {
    #[error("invalid time travel: cannot advance by {0}s")]
    InvalidTimeTravel(f64),

    #[error("cannot move negative spaceships ({0})")]
    NegativeQuantity(f64),

    #[error("not enough spaceships: requested {requested}, available {available}")]
    InsufficientShips { requested: f64, available: f64 },

    #[error("non-finite value for {field}")]
    NonFiniteInput { field: &'static str },
}

fn require_finite(value: f64, field: &'static str) -> Result<(), EconomyError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(EconomyError::NonFiniteInput { field })
    }
}

fn require_quantity(quantity: f64) -> Result<(), EconomyError> {
    require_finite(quantity, "quantity")?;
    if quantity < 0.0 {
        return Err(EconomyError::NegativeQuantity(quantity));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Advance
// ---------------------------------------------------------------------------

/// Upkeep debt integrated over one tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct UpkeepTick {
    /// Lost production capacity x time attributable to departed ships.
    external_area: f64,
}

/// Decays the upkeep pool by `time_elapsed` and reports the capacity area it
/// consumed. Leaves the pool untouched when there is no debt.
fn decay_upkeep(state: &mut PlanetEconomyState, time_elapsed: f64) -> UpkeepTick {
    if !state.has_debt() {
        return UpkeepTick::default();
    }

    let actual_time = state.external_upkeep_duration.min(time_elapsed);
    let decrease = (state.world.external_upkeep_down_rate * actual_time).min(state.external_upkeep);

    let decrease_area = decrease * actual_time / 2.0;
    let static_area = state.external_upkeep * actual_time;

    state.external_upkeep -= decrease;
    state.external_upkeep_duration -= actual_time;
    if state.external_upkeep <= 0.0 || state.external_upkeep_duration <= 0.0 {
        state.clear_debt();
    }

    UpkeepTick {
        external_area: decrease_area + static_area,
    }
}

/// Ships gained while below the cap. `external_area` is carved out of the
/// tick's `max_upkeep x time_elapsed` capacity budget.
fn grown(state: &PlanetEconomyState, time_elapsed: f64, external_area: f64) -> f64 {
    let max = state.stats.max_upkeep;
    let mut ships = state.num_spaceships;
    if time_elapsed > 0.0 {
        let budget = max * time_elapsed;
        let free = (budget - external_area).max(0.0);
        ships += time_elapsed * state.stats.production * free / budget / SECONDS_PER_HOUR;
    }
    ships.clamp(0.0, max)
}

/// Ships left after decaying at half production while at or above the cap.
///
/// The zero floor is checked before the cap floor, so an overshoot that
/// lands at or below zero stays at zero instead of snapping back to the cap.
/// The on-chain reference behaves this way and predictions must match it.
fn decayed(state: &PlanetEconomyState, time_elapsed: f64) -> f64 {
    let ships = state.num_spaceships - time_elapsed * state.stats.production / SECONDS_PER_HOUR / 2.0;
    if ships <= 0.0 {
        0.0
    } else if ships < state.stats.max_upkeep {
        state.stats.max_upkeep
    } else {
        ships
    }
}

/// Advance `state` by `time_elapsed` seconds and return the new state.
pub fn peek(state: &PlanetEconomyState, time_elapsed: f64) -> Result<PlanetEconomyState, EconomyError> {
    require_finite(time_elapsed, "time_elapsed")?;
    if time_elapsed < 0.0 {
        return Err(EconomyError::InvalidTimeTravel(time_elapsed));
    }

    let regime = state.regime();
    trace!(?regime, time_elapsed, "advance");

    let mut next = *state;
    let upkeep = match regime.upkeep {
        UpkeepRegime::DebtPresent => decay_upkeep(&mut next, time_elapsed),
        UpkeepRegime::DebtAbsent => UpkeepTick::default(),
    };

    next.num_spaceships = match regime {
        Regime { population: PopulationRegime::AboveCap, .. } => decayed(&next, time_elapsed),
        Regime { population: PopulationRegime::BelowCap, upkeep: UpkeepRegime::DebtPresent } => {
            grown(&next, time_elapsed, upkeep.external_area)
        }
        Regime { population: PopulationRegime::BelowCap, upkeep: UpkeepRegime::DebtAbsent } => {
            grown(&next, time_elapsed, 0.0)
        }
    };

    next.last_update += time_elapsed;
    Ok(next)
}

// ---------------------------------------------------------------------------
// Depart
// ---------------------------------------------------------------------------

/// Fold `quantity` freshly departed ships into an already decaying debt.
///
/// The merged pool decays at the world rate and keeps the area of the old
/// ramp plus a `quantity x new_duration` block.
fn merge_upkeep(state: &mut PlanetEconomyState, quantity: f64) {
    let rate = state.world.external_upkeep_down_rate;
    let old_duration = state.external_upkeep_duration;
    let old_upkeep = state.external_upkeep;

    let new_duration = old_duration
        .max(quantity / rate)
        .min(state.world.external_upkeep_duration);
    if new_duration <= 0.0 {
        return;
    }

    let new_upkeep = (new_duration * new_duration * rate - rate * old_duration * old_duration
        + 2.0 * new_duration * quantity
        + 2.0 * old_duration * old_upkeep)
        / (2.0 * new_duration);

    if new_upkeep <= 0.0 {
        state.clear_debt();
    } else {
        state.external_upkeep = new_upkeep;
        state.external_upkeep_duration = new_duration;
    }
}

/// Advance by `time_elapsed`, then send `quantity` ships away.
pub fn send(
    state: &PlanetEconomyState,
    time_elapsed: f64,
    quantity: f64,
) -> Result<PlanetEconomyState, EconomyError> {
    require_quantity(quantity)?;
    let mut next = peek(state, time_elapsed)?;
    if quantity > next.num_spaceships {
        return Err(EconomyError::InsufficientShips {
            requested: quantity,
            available: next.num_spaceships,
        });
    }
    if quantity == 0.0 {
        return Ok(next);
    }

    next.num_spaceships -= quantity;
    if next.has_debt() {
        merge_upkeep(&mut next, quantity);
    } else {
        next.external_upkeep = quantity;
        next.external_upkeep_duration = next.world.external_upkeep_duration;
    }

    debug!(
        quantity,
        remaining = next.num_spaceships,
        upkeep = next.external_upkeep,
        upkeep_duration = next.external_upkeep_duration,
        "spaceships departed"
    );
    Ok(next)
}

// ---------------------------------------------------------------------------
// Arrive
// ---------------------------------------------------------------------------

/// Advance by `time_elapsed`, then redeem the debt still owed by `quantity`
/// ships that left this planet at `start_time` and have now landed.
pub fn count_arrival(
    state: &PlanetEconomyState,
    time_elapsed: f64,
    quantity: f64,
    start_time: f64,
) -> Result<PlanetEconomyState, EconomyError> {
    require_quantity(quantity)?;
    require_finite(start_time, "start_time")?;
    let mut next = peek(state, time_elapsed)?;
    if quantity == 0.0 || !next.has_debt() || next.external_upkeep_duration <= 0.0 {
        return Ok(next);
    }

    let time_left = next.world.external_upkeep_duration - (next.last_update - start_time);
    if time_left <= 0.0 {
        return Ok(next);
    }

    let area_left = time_left * quantity;
    let duration = next.external_upkeep_duration;
    let new_upkeep = (duration * next.external_upkeep - area_left) / duration;
    if new_upkeep <= 0.0 {
        next.clear_debt();
    } else {
        next.external_upkeep = new_upkeep;
    }

    debug!(quantity, start_time, upkeep = next.external_upkeep, "arrival counted");
    Ok(next)
}

// ---------------------------------------------------------------------------
// Return
// ---------------------------------------------------------------------------

/// Advance by `time_elapsed`, then add `quantity` ships. No cap is applied;
/// later advances decay any excess.
pub fn receive_spaceships(
    state: &PlanetEconomyState,
    time_elapsed: f64,
    quantity: f64,
) -> Result<PlanetEconomyState, EconomyError> {
    require_quantity(quantity)?;
    let mut next = peek(state, time_elapsed)?;
    if quantity == 0.0 {
        return Ok(next);
    }
    next.num_spaceships += quantity;
    debug!(quantity, total = next.num_spaceships, "spaceships received");
    Ok(next)
}

// ---------------------------------------------------------------------------
// In-place API
// ---------------------------------------------------------------------------

impl PlanetEconomyState {
    /// In-place [`peek`]. On error `self` is left untouched.
    pub fn advance(&mut self, time_elapsed: f64) -> Result<(), EconomyError> {
        *self = peek(self, time_elapsed)?;
        Ok(())
    }

    /// In-place [`send`].
    pub fn depart(&mut self, time_elapsed: f64, quantity: f64) -> Result<(), EconomyError> {
        *self = send(self, time_elapsed, quantity)?;
        Ok(())
    }

    /// In-place [`count_arrival`].
    pub fn arrive(&mut self, time_elapsed: f64, quantity: f64, start_time: f64) -> Result<(), EconomyError> {
        *self = count_arrival(self, time_elapsed, quantity, start_time)?;
        Ok(())
    }

    /// In-place [`receive_spaceships`].
    pub fn receive(&mut self, time_elapsed: f64, quantity: f64) -> Result<(), EconomyError> {
        *self = receive_spaceships(self, time_elapsed, quantity)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PlanetStats, WorldConfig};

    const EPS: f64 = 1e-6;

    fn planet(ships: f64) -> PlanetEconomyState {
        PlanetEconomyState::genesis(
            PlanetStats { production: 3600.0, max_upkeep: 259_200.0 },
            WorldConfig { external_upkeep_duration: 86_400.0, external_upkeep_down_rate: 0.1 },
            0.0,
            ships,
        )
    }

    fn small_planet(ships: f64) -> PlanetEconomyState {
        PlanetEconomyState::genesis(
            PlanetStats { production: 3600.0, max_upkeep: 500.0 },
            WorldConfig { external_upkeep_duration: 1000.0, external_upkeep_down_rate: 0.1 },
            0.0,
            ships,
        )
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= EPS * b.abs().max(1.0)
    }

    #[test]
    fn growth_without_debt_is_full_rate() {
        let s = peek(&planet(0.0), 3600.0).expect("test: advance");
        assert!(close(s.num_spaceships, 3600.0), "got {}", s.num_spaceships);
        assert_eq!(s.last_update, 3600.0);
    }

    #[test]
    fn growth_clamps_at_cap() {
        let s = peek(&planet(259_000.0), 3600.0).expect("test: advance");
        assert_eq!(s.num_spaceships, 259_200.0);
    }

    #[test]
    fn zero_advance_changes_nothing() {
        let mut s = planet(1000.0);
        s.external_upkeep = 400.0;
        s.external_upkeep_duration = 600.0;
        let next = peek(&s, 0.0).expect("test: advance");
        assert_eq!(next, s);
    }

    #[test]
    fn negative_advance_rejected() {
        let s = planet(10.0);
        assert_eq!(peek(&s, -1.0), Err(EconomyError::InvalidTimeTravel(-1.0)));
    }

    #[test]
    fn nan_advance_rejected() {
        let s = planet(10.0);
        assert!(matches!(peek(&s, f64::NAN), Err(EconomyError::NonFiniteInput { .. })));
    }

    #[test]
    fn above_cap_decays_at_half_rate() {
        let s = small_planet(1000.0);
        // 0.5 ships/s over 200s
        let next = peek(&s, 200.0).expect("test: advance");
        assert!(close(next.num_spaceships, 900.0));
    }

    #[test]
    fn above_cap_decay_stops_at_cap() {
        let next = peek(&small_planet(1000.0), 1500.0).expect("test: advance");
        assert_eq!(next.num_spaceships, 500.0);
    }

    #[test]
    fn above_cap_overshoot_to_zero_stays_zero() {
        // 1000 - 0.5 * 2000 = 0: the zero floor wins over the cap floor
        let next = peek(&small_planet(1000.0), 2000.0).expect("test: advance");
        assert_eq!(next.num_spaceships, 0.0);
        let next = peek(&small_planet(1000.0), 3000.0).expect("test: advance");
        assert_eq!(next.num_spaceships, 0.0);
    }

    #[test]
    fn debt_decays_linearly() {
        let mut s = planet(0.0);
        s.external_upkeep = 1000.0;
        s.external_upkeep_duration = 86_400.0;
        let next = peek(&s, 100.0).expect("test: advance");
        assert!(close(next.external_upkeep, 990.0));
        assert!(close(next.external_upkeep_duration, 86_300.0));
    }

    #[test]
    fn debt_clears_when_window_ends() {
        let mut s = planet(0.0);
        s.external_upkeep = 259_200.0;
        s.external_upkeep_duration = 100.0;
        let next = peek(&s, 500.0).expect("test: advance");
        assert_eq!(next.external_upkeep, 0.0);
        assert_eq!(next.external_upkeep_duration, 0.0);
    }

    #[test]
    fn debt_clears_when_paid_off() {
        let mut s = planet(0.0);
        s.external_upkeep = 5.0;
        s.external_upkeep_duration = 80_000.0;
        let next = peek(&s, 100.0).expect("test: advance");
        assert_eq!(next.external_upkeep, 0.0);
        assert_eq!(next.external_upkeep_duration, 0.0);
    }

    #[test]
    fn debt_throttles_growth() {
        let mut s = planet(0.0);
        s.external_upkeep = 129_600.0;
        s.external_upkeep_duration = 86_400.0;
        let next = peek(&s, 3600.0).expect("test: advance");
        // area = 129600*3600 + 360*3600/2, budget = 259200*3600
        let expected = 3600.0 * (259_200.0 * 3600.0 - 467_208_000.0) / (259_200.0 * 3600.0);
        assert!(close(next.num_spaceships, expected), "got {}", next.num_spaceships);
        assert!(next.num_spaceships < 3600.0);
    }

    #[test]
    fn full_debt_stalls_growth() {
        let mut s = planet(0.0);
        s.external_upkeep = 259_200.0;
        s.external_upkeep_duration = 86_400.0;
        let next = peek(&s, 43_200.0).expect("test: advance");
        assert_eq!(next.num_spaceships, 0.0);
    }

    #[test]
    fn send_starts_fresh_debt() {
        let next = send(&planet(500.0), 0.0, 200.0).expect("test: send");
        assert_eq!(next.num_spaceships, 300.0);
        assert_eq!(next.external_upkeep, 200.0);
        assert_eq!(next.external_upkeep_duration, 86_400.0);
    }

    #[test]
    fn send_zero_only_advances() {
        let s = planet(500.0);
        let next = send(&s, 10.0, 0.0).expect("test: send");
        assert_eq!(next, peek(&s, 10.0).expect("test: advance"));
    }

    #[test]
    fn send_counts_advance_before_checking_supply() {
        // 10 ships now, 3610 after an hour
        let next = send(&planet(10.0), 3600.0, 3000.0).expect("test: send");
        assert!(close(next.num_spaceships, 610.0));
    }

    #[test]
    fn send_too_many_rejected() {
        let s = planet(100.0);
        let err = send(&s, 0.0, 101.0).expect_err("test: should fail");
        assert!(matches!(err, EconomyError::InsufficientShips { .. }), "got {err}");
    }

    #[test]
    fn send_negative_rejected() {
        assert_eq!(
            send(&planet(100.0), 0.0, -1.0),
            Err(EconomyError::NegativeQuantity(-1.0))
        );
    }

    #[test]
    fn merge_keeps_remaining_area() {
        let mut s = planet(10_000.0);
        s.external_upkeep = 1000.0;
        s.external_upkeep_duration = 5000.0;
        let next = send(&s, 0.0, 100.0).expect("test: send");

        // quantity / rate = 1000s < 5000s, so the old window is kept
        assert_eq!(next.external_upkeep_duration, 5000.0);
        assert!(close(next.external_upkeep, 1100.0));
    }

    #[test]
    fn merge_extends_window_for_large_departures() {
        let mut s = planet(10_000.0);
        s.external_upkeep = 100.0;
        s.external_upkeep_duration = 500.0;
        let next = send(&s, 0.0, 2000.0).expect("test: send");

        // 2000 / 0.1 = 20000s
        assert_eq!(next.external_upkeep_duration, 20_000.0);
        let expected = (20_000.0f64.powi(2) * 0.1 - 0.1 * 500.0f64.powi(2)
            + 2.0 * 20_000.0 * 2000.0
            + 2.0 * 500.0 * 100.0)
            / 40_000.0;
        assert!(close(next.external_upkeep, expected));
    }

    #[test]
    fn merge_window_capped_by_world() {
        let mut s = planet(259_200.0);
        s.external_upkeep = 10.0;
        s.external_upkeep_duration = 50.0;
        let next = send(&s, 0.0, 200_000.0).expect("test: send");
        assert_eq!(next.external_upkeep_duration, 86_400.0);
    }

    #[test]
    fn arrival_redeems_remaining_area() {
        let mut s = planet(0.0);
        s.external_upkeep = 1000.0;
        s.external_upkeep_duration = 86_400.0;
        // departed at t=0, arrives immediately: 86400 * 1 ship left to owe
        let next = count_arrival(&s, 0.0, 1.0, 0.0).expect("test: arrival");
        assert!(close(next.external_upkeep, 999.0));
        assert_eq!(next.external_upkeep_duration, 86_400.0);
    }

    #[test]
    fn arrival_clears_pool_when_over_redeemed() {
        let mut s = planet(0.0);
        s.external_upkeep = 10.0;
        s.external_upkeep_duration = 86_400.0;
        let next = count_arrival(&s, 0.0, 50.0, 0.0).expect("test: arrival");
        assert_eq!(next.external_upkeep, 0.0);
        assert_eq!(next.external_upkeep_duration, 0.0);
    }

    #[test]
    fn arrival_without_debt_only_advances() {
        let s = planet(20.0);
        let next = count_arrival(&s, 10.0, 5.0, 0.0).expect("test: arrival");
        assert_eq!(next, peek(&s, 10.0).expect("test: advance"));
    }

    #[test]
    fn arrival_negative_rejected() {
        assert_eq!(
            count_arrival(&planet(0.0), 0.0, -2.0, 0.0),
            Err(EconomyError::NegativeQuantity(-2.0))
        );
    }

    #[test]
    fn receive_may_exceed_cap() {
        let next = receive_spaceships(&planet(259_200.0), 0.0, 1000.0).expect("test: receive");
        assert_eq!(next.num_spaceships, 260_200.0);
        let later = peek(&next, 1000.0).expect("test: advance");
        assert!(close(later.num_spaceships, 259_700.0));
    }

    #[test]
    fn receive_negative_rejected() {
        assert_eq!(
            receive_spaceships(&planet(0.0), 0.0, -0.5),
            Err(EconomyError::NegativeQuantity(-0.5))
        );
    }

    #[test]
    fn in_place_api_leaves_state_on_error() {
        let mut s = planet(100.0);
        let before = s;
        assert!(s.depart(0.0, 1000.0).is_err());
        assert_eq!(s, before);
        assert!(s.advance(-5.0).is_err());
        assert_eq!(s, before);
        s.depart(0.0, 40.0).expect("test: depart");
        assert_eq!(s.num_spaceships, 60.0);
    }
}
