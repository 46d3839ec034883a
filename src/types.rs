// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Planet Economy Engine - Type Definitions

use serde::{Deserialize, Serialize};

/// Production is quoted per hour; the clock runs in seconds.
pub const SECONDS_PER_HOUR: f64 = 3600.0;

// ─── Planet Stats ───────────────────────────────────────────────────────────

/// Per-planet production parameters, synchronized from the game contract.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanetStats {
    /// Ships produced per hour at full capacity.
    pub production: f64,
    /// Capacity cap ("MAX").
    pub max_upkeep: f64,
}

// ─── World Constants ────────────────────────────────────────────────────────

/// Game-wide upkeep constants, fixed per game instance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldConfig {
    /// Maximum decay window (seconds) for any upkeep debt.
    #[serde(rename = "externalUpKeepDuration")]
    pub external_upkeep_duration: f64,
    /// Maximum linear decay rate of upkeep debt (ships/second).
    pub external_upkeep_down_rate: f64,
}

// ─── Planet Economy State ───────────────────────────────────────────────────

/// The record advanced by every engine operation.
///
/// `Copy` on purpose: operations take a state and hand back a new one, so a
/// caller can keep the previous value as a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanetEconomyState {
    pub num_spaceships: f64,
    /// Simulation clock (seconds) of the last advance.
    pub last_update: f64,
    /// Remaining capacity debt owed by departed ships.
    pub external_upkeep: f64,
    /// Remaining seconds over which `external_upkeep` fully decays.
    pub external_upkeep_duration: f64,
    pub stats: PlanetStats,
    pub world: WorldConfig,
}

impl PlanetEconomyState {
    /// Fresh planet at genesis or acquisition time, with no upkeep debt.
    pub fn genesis(stats: PlanetStats, world: WorldConfig, time: f64, initial_grant: f64) -> Self {
        Self {
            num_spaceships: initial_grant.max(0.0),
            last_update: time,
            external_upkeep: 0.0,
            external_upkeep_duration: 0.0,
            stats,
            world,
        }
    }

    /// Current regime pair, recomputed from the continuous values.
    pub fn regime(&self) -> Regime {
        let population = if self.num_spaceships >= self.stats.max_upkeep {
            PopulationRegime::AboveCap
        } else {
            PopulationRegime::BelowCap
        };
        let upkeep = if self.external_upkeep > 0.0 {
            UpkeepRegime::DebtPresent
        } else {
            UpkeepRegime::DebtAbsent
        };
        Regime { population, upkeep }
    }

    pub fn has_debt(&self) -> bool {
        self.external_upkeep > 0.0
    }

    /// Ship count as shown to players (whole ships only).
    pub fn whole_spaceships(&self) -> u64 {
        self.num_spaceships.max(0.0).floor() as u64
    }

    pub(crate) fn clear_debt(&mut self) {
        self.external_upkeep = 0.0;
        self.external_upkeep_duration = 0.0;
    }
}

// ─── Regimes ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PopulationRegime {
    /// At or above the cap: decays back toward it at half production.
    AboveCap,
    /// Below the cap: grows, throttled by active upkeep debt.
    BelowCap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpkeepRegime {
    DebtPresent,
    DebtAbsent,
}

/// Classification a tick is evaluated under. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Regime {
    pub population: PopulationRegime,
    pub upkeep: UpkeepRegime,
}
