// Scenario Definitions: reference trajectories plus seeded random workloads
// Each scenario is a step function producing one planet event per step

use planet_engine::{GameConfig, PlanetEconomyState};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

const DAY: f64 = 86_400.0;
const MAX: f64 = 259_200.0;

// ─── Events ─────────────────────────────────────────────────────────────────

/// One caller-observed planet event. Every variant carries the elapsed time
/// since the previous event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    Advance { dt: f64 },
    Send { dt: f64, quantity: f64 },
    /// `departed_ago` is measured back from the arrival time.
    Arrive { dt: f64, quantity: f64, departed_ago: f64 },
    Receive { dt: f64, quantity: f64 },
}

impl Event {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Advance { .. } => "advance",
            Self::Send { .. } => "send",
            Self::Arrive { .. } => "arrive",
            Self::Receive { .. } => "receive",
        }
    }
}

pub type StepFn = fn(usize, &mut ChaCha8Rng, &PlanetEconomyState) -> Event;
pub type FinalCheck = fn(&PlanetEconomyState) -> bool;

// ─── Scenario Configuration ─────────────────────────────────────────────────

pub struct Scenario {
    pub name: &'static str,
    pub label: &'static str,
    pub category: &'static str,
    pub config: GameConfig,
    pub initial_ships: f64,
    pub steps: usize,
    pub step: StepFn,
    /// Deterministic scenarios run once regardless of `--runs`.
    pub deterministic: bool,
    pub criteria: PassCriteria,
}

pub struct PassCriteria {
    /// Largest tolerated float vs fixed-point divergence, in ships.
    pub max_fixed_drift: f64,
    /// Exact number of rejected events, when the scenario expects some.
    pub expected_rejections: Option<u32>,
    pub final_check: Option<FinalCheck>,
}

impl Default for PassCriteria {
    fn default() -> Self {
        Self {
            max_fixed_drift: 1e-3,
            expected_rejections: Some(0),
            final_check: None,
        }
    }
}

// ─── Reference step functions ───────────────────────────────────────────────

fn daily_growth(_: usize, _: &mut ChaCha8Rng, _: &PlanetEconomyState) -> Event {
    Event::Advance { dt: DAY }
}

fn full_departure(step: usize, _: &mut ChaCha8Rng, _: &PlanetEconomyState) -> Event {
    match step {
        0 => Event::Advance { dt: 2.0 * DAY },
        1 => Event::Send { dt: DAY, quantity: MAX },
        _ => Event::Advance { dt: DAY / 2.0 },
    }
}

fn split_departure(step: usize, _: &mut ChaCha8Rng, _: &PlanetEconomyState) -> Event {
    match step {
        0 => Event::Advance { dt: 2.0 * DAY },
        1 => Event::Send { dt: DAY, quantity: MAX / 2.0 },
        2 => Event::Send { dt: 0.0, quantity: MAX / 2.0 },
        _ => Event::Advance { dt: DAY / 2.0 },
    }
}

fn oversized_departure(step: usize, _: &mut ChaCha8Rng, _: &PlanetEconomyState) -> Event {
    match step {
        0 => Event::Advance { dt: 3600.0 },
        _ => Event::Send { dt: 0.0, quantity: 10_000.0 },
    }
}

fn rewind(step: usize, _: &mut ChaCha8Rng, _: &PlanetEconomyState) -> Event {
    match step {
        0 => Event::Advance { dt: 3600.0 },
        _ => Event::Advance { dt: -1.0 },
    }
}

fn expired_arrival(step: usize, _: &mut ChaCha8Rng, _: &PlanetEconomyState) -> Event {
    match step {
        0 => Event::Advance { dt: DAY },
        1 => Event::Send { dt: 0.0, quantity: 1000.0 },
        _ => Event::Arrive { dt: 10.0, quantity: 1000.0, departed_ago: 2.0 * DAY },
    }
}

// ─── Random workloads ───────────────────────────────────────────────────────

fn fleet_traffic(_: usize, rng: &mut ChaCha8Rng, state: &PlanetEconomyState) -> Event {
    let dt = rng.gen_range(0.0..DAY / 8.0);
    match rng.gen_range(0..10) {
        0..=2 => Event::Send {
            dt,
            quantity: (rng.gen_range(0.0..0.6) * state.num_spaceships).floor(),
        },
        3..=4 => Event::Arrive {
            dt,
            quantity: rng.gen_range(0.0..20_000.0_f64).floor(),
            departed_ago: rng.gen_range(0.0..DAY * 1.5),
        },
        5 => Event::Receive { dt, quantity: rng.gen_range(0.0..50_000.0_f64).floor() },
        _ => Event::Advance { dt },
    }
}

fn gift_flood(_: usize, rng: &mut ChaCha8Rng, _: &PlanetEconomyState) -> Event {
    let dt = rng.gen_range(0.0..DAY / 4.0);
    if rng.gen_bool(0.5) {
        Event::Receive { dt, quantity: rng.gen_range(0.0..MAX).floor() }
    } else {
        Event::Advance { dt }
    }
}

fn drain(_: usize, rng: &mut ChaCha8Rng, state: &PlanetEconomyState) -> Event {
    let dt = rng.gen_range(0.0..3600.0);
    Event::Send { dt, quantity: (state.num_spaceships * 0.9).floor() }
}

// ─── Final checks ───────────────────────────────────────────────────────────

fn at_cap(s: &PlanetEconomyState) -> bool {
    (s.num_spaceships - s.stats.max_upkeep).abs() < 1e-6
}

fn recovered_and_clear(s: &PlanetEconomyState) -> bool {
    at_cap(s) && s.external_upkeep == 0.0 && s.external_upkeep_duration == 0.0
}

fn unchanged_after_hour(s: &PlanetEconomyState) -> bool {
    (s.num_spaceships - 3600.0).abs() < 1e-6 && s.last_update == 3600.0
}

fn debt_untouched(s: &PlanetEconomyState) -> bool {
    (s.external_upkeep - (1000.0 - 1.0)).abs() < 1e-6
}

// ─── Registry ───────────────────────────────────────────────────────────────

fn reference(
    name: &'static str,
    label: &'static str,
    steps: usize,
    step: StepFn,
    criteria: PassCriteria,
) -> Scenario {
    Scenario {
        name,
        label,
        category: "reference",
        config: GameConfig::default(),
        initial_ships: 0.0,
        steps,
        step,
        deterministic: true,
        criteria,
    }
}

fn workload(name: &'static str, label: &'static str, initial_ships: f64, steps: usize, step: StepFn) -> Scenario {
    Scenario {
        name,
        label,
        category: "workload",
        config: GameConfig::default(),
        initial_ships,
        steps,
        step,
        deterministic: false,
        criteria: PassCriteria { expected_rejections: None, ..PassCriteria::default() },
    }
}

pub fn scenarios() -> Vec<Scenario> {
    vec![
        reference("REF_DAILY_GROWTH", "Fresh planet saturates", 10, daily_growth, PassCriteria {
            final_check: Some(at_cap),
            ..PassCriteria::default()
        }),
        reference("REF_FULL_DEPARTURE", "Full departure recovers", 10, full_departure, PassCriteria {
            final_check: Some(recovered_and_clear),
            ..PassCriteria::default()
        }),
        reference("REF_SPLIT_DEPARTURE", "Split departure merges", 11, split_departure, PassCriteria {
            final_check: Some(recovered_and_clear),
            ..PassCriteria::default()
        }),
        reference("REF_OVERSIZED_SEND", "Oversized send rejected", 2, oversized_departure, PassCriteria {
            expected_rejections: Some(1),
            final_check: Some(unchanged_after_hour),
            ..PassCriteria::default()
        }),
        reference("REF_TIME_TRAVEL", "Negative advance rejected", 2, rewind, PassCriteria {
            expected_rejections: Some(1),
            final_check: Some(unchanged_after_hour),
            ..PassCriteria::default()
        }),
        reference("REF_EXPIRED_ARRIVAL", "Expired arrival ignored", 3, expired_arrival, PassCriteria {
            final_check: Some(debt_untouched),
            ..PassCriteria::default()
        }),
        workload("MC_FLEET_TRAFFIC", "Mixed fleet traffic", 0.0, 2000, fleet_traffic),
        workload("MC_GIFT_FLOOD", "Gifts above cap", MAX, 1000, gift_flood),
        workload("MC_DRAIN", "Repeated near-total sends", MAX, 500, drain),
    ]
}
