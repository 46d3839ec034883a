// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Planet Economy Engine - Game Configuration

use serde::{Deserialize, Serialize};

use crate::types::{PlanetEconomyState, PlanetStats, WorldConfig};

/// Reference production: one ship per second.
pub const DEFAULT_PRODUCTION: f64 = 3600.0;
/// Reference cap: three days of full production.
pub const DEFAULT_MAX_UPKEEP: f64 = 259_200.0;
/// One day.
pub const DEFAULT_EXTERNAL_UPKEEP_DURATION: f64 = 86_400.0;
pub const DEFAULT_EXTERNAL_UPKEEP_DOWN_RATE: f64 = 0.1;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{field} must be positive and finite, got {value}")]
    NotPositive { field: &'static str, value: f64 },

    #[error("malformed config: {0}")]
    Parse(String),
}

/// Game constants as read from the synchronized contract configuration.
///
/// Field names follow the contract's camelCase JSON; any field left out takes
/// the reference value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameConfig {
    pub production: f64,
    pub max_upkeep: f64,
    #[serde(rename = "externalUpKeepDuration")]
    pub external_upkeep_duration: f64,
    pub external_upkeep_down_rate: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            production: DEFAULT_PRODUCTION,
            max_upkeep: DEFAULT_MAX_UPKEEP,
            external_upkeep_duration: DEFAULT_EXTERNAL_UPKEEP_DURATION,
            external_upkeep_down_rate: DEFAULT_EXTERNAL_UPKEEP_DOWN_RATE,
        }
    }
}

impl GameConfig {
    /// Parse and validate a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("production", self.production),
            ("maxUpkeep", self.max_upkeep),
            ("externalUpKeepDuration", self.external_upkeep_duration),
            ("externalUpkeepDownRate", self.external_upkeep_down_rate),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NotPositive { field, value });
            }
        }
        Ok(())
    }

    pub fn stats(&self) -> PlanetStats {
        PlanetStats {
            production: self.production,
            max_upkeep: self.max_upkeep,
        }
    }

    pub fn world(&self) -> WorldConfig {
        WorldConfig {
            external_upkeep_duration: self.external_upkeep_duration,
            external_upkeep_down_rate: self.external_upkeep_down_rate,
        }
    }

    /// New planet state at `time`, holding `initial_grant` ships.
    pub fn genesis(&self, time: f64, initial_grant: f64) -> PlanetEconomyState {
        PlanetEconomyState::genesis(self.stats(), self.world(), time, initial_grant)
    }
}
