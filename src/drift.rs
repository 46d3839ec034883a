// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Planet Economy Engine - Resync & Drift Monitor
//
// Predictions only interpolate between confirmed contract reads. Each time a
// confirmed state arrives it replaces the prediction, and the divergence
// between the two is accumulated. A breaker trips when the cumulative drift
// exceeds its threshold.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::adapter::StateDelta;
use crate::conservation::{self, InvariantViolation};
use crate::economy::{self, EconomyError};
use crate::types::PlanetEconomyState;

/// Per-resync divergence (ships) below this is considered in agreement.
const RESYNC_TOLERANCE: f64 = 0.01;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DriftError {
    #[error("confirmed state at {confirmed} predates prediction at {predicted}")]
    StaleConfirmation { confirmed: f64, predicted: f64 },

    #[error("confirmed state is invalid: {0}")]
    InvalidConfirmation(#[from] InvariantViolation),

    /// The confirmation carries different planet or world constants, so it
    /// does not describe the planet being predicted.
    #[error("confirmed constants differ from the predicted planet's")]
    ConstantsMismatch,

    #[error("drift breaker tripped (cumulative drift: {0} ships)")]
    BreakerTripped(f64),

    #[error(transparent)]
    Economy(#[from] EconomyError),
}

/// Outcome of one resync.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResyncReport {
    /// Divergence between the prediction (advanced to the confirmation time)
    /// and the confirmed state.
    pub delta: StateDelta,
    pub agreed: bool,
    pub breaker_tripped: bool,
}

/// Tracks cumulative prediction drift against confirmed reads.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct DriftMonitor {
    pub cumulative_drift: f64,
    pub breaker_threshold: f64,
    pub breaker_tripped: bool,
    /// Consecutive resyncs outside tolerance.
    pub consecutive_disagreements: u32,
    pub resync_count: u64,
}

impl Default for DriftMonitor {
    fn default() -> Self {
        Self::new(100.0)
    }
}

impl DriftMonitor {
    pub fn new(threshold: f64) -> Self {
        Self {
            cumulative_drift: 0.0,
            breaker_threshold: threshold,
            breaker_tripped: false,
            consecutive_disagreements: 0,
            resync_count: 0,
        }
    }

    /// Replace `predicted` with `confirmed`, recording how far apart they were.
    ///
    /// The prediction is first advanced to the confirmation time so both are
    /// compared at the same instant. A rejected confirmation leaves
    /// `predicted` as-is; see [`DriftError`] for the rejection cases.
    pub fn resync(
        &mut self,
        predicted: &mut PlanetEconomyState,
        confirmed: PlanetEconomyState,
    ) -> Result<ResyncReport, DriftError> {
        if confirmed.last_update < predicted.last_update {
            return Err(DriftError::StaleConfirmation {
                confirmed: confirmed.last_update,
                predicted: predicted.last_update,
            });
        }
        conservation::check_invariants(&confirmed)?;
        if confirmed.stats != predicted.stats || confirmed.world != predicted.world {
            warn!(
                confirmed_cap = confirmed.stats.max_upkeep,
                predicted_cap = predicted.stats.max_upkeep,
                "confirmed state constants mismatch"
            );
            return Err(DriftError::ConstantsMismatch);
        }

        let at_confirmation = economy::peek(predicted, confirmed.last_update - predicted.last_update)?;
        let delta = StateDelta::between(&at_confirmation, &confirmed);
        let agreed = delta.max_ships() < RESYNC_TOLERANCE;

        if agreed {
            self.consecutive_disagreements = 0;
        } else {
            self.cumulative_drift += delta.total_ships();
            self.consecutive_disagreements += 1;
        }
        if self.cumulative_drift > self.breaker_threshold && !self.breaker_tripped {
            self.breaker_tripped = true;
            warn!(
                cumulative_drift = self.cumulative_drift,
                threshold = self.breaker_threshold,
                "prediction drift breaker tripped"
            );
        }

        self.resync_count += 1;
        *predicted = confirmed;
        debug!(agreed, drift = delta.total_ships(), at = confirmed.last_update, "resynced");

        Ok(ResyncReport {
            delta,
            agreed,
            breaker_tripped: self.breaker_tripped,
        })
    }

    /// Error out when predictions should no longer be trusted.
    pub fn ensure_trusted(&self) -> Result<(), DriftError> {
        if self.breaker_tripped {
            Err(DriftError::BreakerTripped(self.cumulative_drift))
        } else {
            Ok(())
        }
    }

    pub fn reset(&mut self) {
        self.cumulative_drift = 0.0;
        self.breaker_tripped = false;
        self.consecutive_disagreements = 0;
    }
}
