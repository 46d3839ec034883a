// Copyright (c) 2026 Hypermesh Foundation. All rights reserved.
// Licensed under the Business Source License 1.1.
// See the LICENSE file in the repository root for full license text.

//! Fixed-point state types mirroring the on-chain planet record.
//!
//! Every quantity is a `rust_decimal::Decimal`, so the arithmetic in
//! [`crate::core_economy`] is free of binary floating-point rounding.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// Production is quoted per hour; the clock runs in seconds.
pub const SECONDS_PER_HOUR: Decimal = dec!(3600);

// ---------------------------------------------------------------------------
// Ships
// ---------------------------------------------------------------------------

/// A (possibly fractional) spaceship quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Ships(pub Decimal);

impl Ships {
    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    pub fn from_decimal(d: Decimal) -> Self {
        Self(d)
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl Add for Ships {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Ships {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl fmt::Display for Ships {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ships", self.0)
    }
}

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

/// Fixed-point planet stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedStats {
    /// Ships per hour at full capacity.
    pub production: Decimal,
    /// Capacity cap.
    pub max_upkeep: Ships,
}

/// Fixed-point world constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedWorld {
    /// Maximum upkeep decay window, seconds.
    pub external_upkeep_duration: Decimal,
    /// Maximum upkeep decay rate, ships per second.
    pub external_upkeep_down_rate: Decimal,
}

// ---------------------------------------------------------------------------
// FixedPlanetState
// ---------------------------------------------------------------------------

/// Decimal counterpart of [`crate::types::PlanetEconomyState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedPlanetState {
    pub num_spaceships: Ships,
    pub last_update: Decimal,
    pub external_upkeep: Ships,
    pub external_upkeep_duration: Decimal,
    pub stats: FixedStats,
    pub world: FixedWorld,
}

impl FixedPlanetState {
    pub fn genesis(stats: FixedStats, world: FixedWorld, time: Decimal, initial_grant: Ships) -> Self {
        Self {
            num_spaceships: initial_grant.max(Ships::zero()),
            last_update: time,
            external_upkeep: Ships::zero(),
            external_upkeep_duration: Decimal::ZERO,
            stats,
            world,
        }
    }

    pub fn has_debt(&self) -> bool {
        self.external_upkeep.0 > Decimal::ZERO
    }

    pub(crate) fn clear_debt(&mut self) {
        self.external_upkeep = Ships::zero();
        self.external_upkeep_duration = Decimal::ZERO;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
