//! Adapter layer: converts between the f64 predictor and the Decimal mirror.

use num_traits::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core_types::{FixedPlanetState, FixedStats, FixedWorld, Ships};
use crate::types::{PlanetEconomyState, PlanetStats, WorldConfig};

/// Convert f64 to Decimal (lossy; non-finite values map to zero).
pub fn to_decimal(v: f64) -> Decimal {
    Decimal::from_f64(v).unwrap_or(Decimal::ZERO)
}

/// Convert Decimal to f64.
pub fn from_decimal(d: Decimal) -> f64 {
    d.to_f64().unwrap_or(0.0)
}

pub fn to_ships(v: f64) -> Ships {
    Ships::from_decimal(to_decimal(v))
}

/// Float state → fixed-point state.
pub fn to_fixed(state: &PlanetEconomyState) -> FixedPlanetState {
    FixedPlanetState {
        num_spaceships: to_ships(state.num_spaceships),
        last_update: to_decimal(state.last_update),
        external_upkeep: to_ships(state.external_upkeep),
        external_upkeep_duration: to_decimal(state.external_upkeep_duration),
        stats: FixedStats {
            production: to_decimal(state.stats.production),
            max_upkeep: to_ships(state.stats.max_upkeep),
        },
        world: FixedWorld {
            external_upkeep_duration: to_decimal(state.world.external_upkeep_duration),
            external_upkeep_down_rate: to_decimal(state.world.external_upkeep_down_rate),
        },
    }
}

/// Fixed-point state → float state.
pub fn from_fixed(state: &FixedPlanetState) -> PlanetEconomyState {
    PlanetEconomyState {
        num_spaceships: from_decimal(state.num_spaceships.0),
        last_update: from_decimal(state.last_update),
        external_upkeep: from_decimal(state.external_upkeep.0),
        external_upkeep_duration: from_decimal(state.external_upkeep_duration),
        stats: PlanetStats {
            production: from_decimal(state.stats.production),
            max_upkeep: from_decimal(state.stats.max_upkeep.0),
        },
        world: WorldConfig {
            external_upkeep_duration: from_decimal(state.world.external_upkeep_duration),
            external_upkeep_down_rate: from_decimal(state.world.external_upkeep_down_rate),
        },
    }
}

/// Absolute per-field divergence between two predictions of the same planet.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateDelta {
    pub num_spaceships: f64,
    pub external_upkeep: f64,
    pub external_upkeep_duration: f64,
    pub last_update: f64,
}

impl StateDelta {
    pub fn between(a: &PlanetEconomyState, b: &PlanetEconomyState) -> Self {
        Self {
            num_spaceships: (a.num_spaceships - b.num_spaceships).abs(),
            external_upkeep: (a.external_upkeep - b.external_upkeep).abs(),
            external_upkeep_duration: (a.external_upkeep_duration - b.external_upkeep_duration).abs(),
            last_update: (a.last_update - b.last_update).abs(),
        }
    }

    /// Largest divergence among the ship-denominated fields.
    pub fn max_ships(&self) -> f64 {
        self.num_spaceships.max(self.external_upkeep)
    }

    /// Sum of the ship-denominated fields.
    pub fn total_ships(&self) -> f64 {
        self.num_spaceships + self.external_upkeep
    }
}

/// Compare the float prediction against the fixed-point reference.
/// This is a parallel check only; neither state is modified.
pub fn cross_check(float: &PlanetEconomyState, fixed: &FixedPlanetState) -> StateDelta {
    StateDelta::between(float, &from_fixed(fixed))
}
