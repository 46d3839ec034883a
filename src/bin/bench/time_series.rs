// Per-Step JSONL Time Series Recorder
// Outputs one JSON line per event for independent analysis

use planet_engine::PlanetEconomyState;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
pub struct StepSnapshot {
    pub step: usize,
    pub event: &'static str,
    pub clock: f64,
    pub num_spaceships: f64,
    pub external_upkeep: f64,
    pub external_upkeep_duration: f64,
    pub above_cap: bool,
    pub fixed_drift: f64,
}

impl StepSnapshot {
    pub fn from_state(step: usize, event: &'static str, state: &PlanetEconomyState, fixed_drift: f64) -> Self {
        Self {
            step,
            event,
            clock: state.last_update,
            num_spaceships: state.num_spaceships,
            external_upkeep: state.external_upkeep,
            external_upkeep_duration: state.external_upkeep_duration,
            above_cap: state.num_spaceships >= state.stats.max_upkeep,
            fixed_drift,
        }
    }
}

/// Time series recorder that accumulates snapshots and writes JSONL
pub struct TimeSeriesRecorder {
    snapshots: Vec<StepSnapshot>,
}

impl TimeSeriesRecorder {
    pub fn new() -> Self {
        Self { snapshots: Vec::new() }
    }

    pub fn record(&mut self, step: usize, event: &'static str, state: &PlanetEconomyState, fixed_drift: f64) {
        self.snapshots.push(StepSnapshot::from_state(step, event, state, fixed_drift));
    }

    /// Write all snapshots to a JSONL file
    pub fn write_jsonl(&self, path: &std::path::Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = std::fs::File::create(path)?;
        for snapshot in &self.snapshots {
            let line = serde_json::to_string(snapshot)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
            writeln!(file, "{}", line)?;
        }
        Ok(())
    }
}
