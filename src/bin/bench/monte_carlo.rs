// Monte Carlo Infrastructure: N seeded runs per scenario with statistical aggregation
// Every step is applied to the float predictor and the fixed-point mirror side by side

use planet_engine::adapter::{self, to_decimal, to_ships};
use planet_engine::conservation::InvariantAudit;
use planet_engine::core_economy;
use planet_engine::core_types::FixedPlanetState;
use planet_engine::{economy, EconomyError, PlanetEconomyState};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::report::*;
use crate::scenarios::{Event, Scenario};
use crate::time_series::TimeSeriesRecorder;

use std::time::Instant;

fn apply_float(state: &PlanetEconomyState, event: Event) -> Result<PlanetEconomyState, EconomyError> {
    match event {
        Event::Advance { dt } => economy::peek(state, dt),
        Event::Send { dt, quantity } => economy::send(state, dt, quantity),
        Event::Arrive { dt, quantity, departed_ago } => {
            economy::count_arrival(state, dt, quantity, state.last_update + dt - departed_ago)
        }
        Event::Receive { dt, quantity } => economy::receive_spaceships(state, dt, quantity),
    }
}

/// Fixed-point result, or `None` when the mirror rejected the event.
fn apply_fixed(state: &FixedPlanetState, event: Event) -> Option<FixedPlanetState> {
    let result = match event {
        Event::Advance { dt } => core_economy::peek(state, to_decimal(dt)),
        Event::Send { dt, quantity } => core_economy::send(state, to_decimal(dt), to_ships(quantity)),
        Event::Arrive { dt, quantity, departed_ago } => {
            let start = state.last_update + to_decimal(dt) - to_decimal(departed_ago);
            core_economy::count_arrival(state, to_decimal(dt), to_ships(quantity), start)
        }
        Event::Receive { dt, quantity } => {
            core_economy::receive_spaceships(state, to_decimal(dt), to_ships(quantity))
        }
    };
    result.ok()
}

/// Run a single scenario iteration with a specific seed.
pub fn run_single(
    scenario: &Scenario,
    seed: u64,
    time_series_dir: Option<&std::path::Path>,
) -> BenchResult {
    let start = Instant::now();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let mut state = scenario.config.genesis(0.0, scenario.initial_ships);
    let mut fixed = adapter::to_fixed(&state);
    let mut audit = InvariantAudit::new();
    let mut time_series = time_series_dir.map(|_| TimeSeriesRecorder::new());

    let mut rejections: u32 = 0;
    let mut mirror_disagreements: u32 = 0;
    let mut max_fixed_drift: f64 = 0.0;
    let mut departed_total = 0.0;

    for step in 0..scenario.steps {
        let event = (scenario.step)(step, &mut rng, &state);
        let before = state;

        match apply_float(&state, event) {
            Ok(next) => {
                if let Event::Send { dt, quantity } = event {
                    if let Ok(advanced) = economy::peek(&before, dt) {
                        audit.record_departure(&advanced, &next, quantity);
                    }
                    departed_total += quantity;
                }
                audit.record(&before, &next);
                state = next;
                match apply_fixed(&fixed, event) {
                    Some(f) => fixed = f,
                    None => mirror_disagreements += 1,
                }
            }
            Err(e) => {
                debug!(step, kind = event.kind(), error = %e, "event rejected");
                rejections += 1;
                if apply_fixed(&fixed, event).is_some() {
                    mirror_disagreements += 1;
                }
            }
        }

        let delta = adapter::cross_check(&state, &fixed);
        max_fixed_drift = max_fixed_drift.max(delta.max_ships());
        if let Some(ts) = time_series.as_mut() {
            ts.record(step, event.kind(), &state, delta.max_ships());
        }
    }

    if let (Some(ts), Some(dir)) = (&time_series, time_series_dir) {
        let path = dir.join(format!("{}-seed{}.jsonl", scenario.name, seed));
        if let Err(e) = ts.write_jsonl(&path) {
            eprintln!("  time series write failed for {}: {}", path.display(), e);
        }
    }

    let mut pass = audit.is_clean()
        && mirror_disagreements == 0
        && max_fixed_drift <= scenario.criteria.max_fixed_drift;
    if let Some(expected) = scenario.criteria.expected_rejections {
        if rejections != expected {
            pass = false;
        }
    }
    if let Some(check) = scenario.criteria.final_check {
        if !check(&state) {
            pass = false;
        }
    }

    let elapsed = start.elapsed();
    BenchResult {
        scenario: scenario.label.to_string(),
        name: scenario.name.to_string(),
        category: scenario.category.to_string(),
        seed,
        pass,
        steps: scenario.steps,
        rejections,
        mirror_disagreements,
        invariant_violations: audit.violations,
        first_violation: audit.first_violation.clone(),
        max_ship_leak: audit.max_ship_leak,
        max_fixed_drift,
        departed_total,
        final_spaceships: state.num_spaceships,
        final_external_upkeep: state.external_upkeep,
        final_external_upkeep_duration: state.external_upkeep_duration,
        final_clock: state.last_update,
        elapsed_ms: elapsed.as_millis(),
    }
}

/// Run a scenario `n_runs` times with seeds `base_seed..base_seed + n_runs`.
pub fn run_monte_carlo(
    scenario: &Scenario,
    n_runs: usize,
    base_seed: u64,
    time_series_dir: Option<&std::path::Path>,
) -> MonteCarloReport {
    let runs = if scenario.deterministic { 1 } else { n_runs.max(1) };
    let results: Vec<BenchResult> = (0..runs as u64)
        .map(|i| run_single(scenario, base_seed + i, time_series_dir))
        .collect();
    info!(scenario = scenario.name, runs, "scenario complete");
    aggregate(scenario, results)
}

fn aggregate(scenario: &Scenario, results: Vec<BenchResult>) -> MonteCarloReport {
    let n = results.len();
    let passed = results.iter().filter(|r| r.pass).count();
    let pass_rate = passed as f64 / n as f64;

    let sample = |f: fn(&BenchResult) -> f64| -> Stats {
        Stats::from_samples(&results.iter().map(f).collect::<Vec<_>>())
    };

    MonteCarloReport {
        scenario_name: scenario.name.to_string(),
        label: scenario.label.to_string(),
        category: scenario.category.to_string(),
        n_runs: n,
        pass_rate,
        max_fixed_drift: sample(|r| r.max_fixed_drift),
        rejections: sample(|r| r.rejections as f64),
        final_spaceships: sample(|r| r.final_spaceships),
        final_external_upkeep: sample(|r| r.final_external_upkeep),
        departed_total: sample(|r| r.departed_total),
        elapsed_ms: sample(|r| r.elapsed_ms as f64),
        individual_runs: results,
    }
}
