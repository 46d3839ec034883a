// Planet Engine Benchmark Runner: predictor accuracy and invariant sweep
// Reference trajectories + seeded Monte Carlo workloads, float vs fixed-point
//
// Usage:
//   cargo run --release --bin bench                     # Run all scenarios (30 runs each)
//   cargo run --release --bin bench -- --runs 5         # Quick mode (5 runs each)
//   cargo run --release --bin bench -- MC_DRAIN         # Filter by name
//   cargo run --release --bin bench -- --time-series    # Enable JSONL output
//   cargo run --release --bin bench -- --seed 42        # Custom base seed
//   RUST_LOG=planet_engine=debug cargo run --bin bench  # Per-event engine logging

mod report;
mod scenarios;
mod monte_carlo;
mod time_series;

use report::*;
use scenarios::*;
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tracing_subscriber::EnvFilter;

// ─── CLI Parsing ────────────────────────────────────────────────────────────

struct CliArgs {
    runs: usize,
    seed: u64,
    time_series: bool,
    filter: Option<String>,
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut cli = CliArgs {
        runs: 30,
        seed: 0,
        time_series: false,
        filter: None,
    };

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--runs" => {
                i += 1;
                if i < args.len() {
                    cli.runs = args[i].parse().unwrap_or(30);
                }
            }
            "--seed" => {
                i += 1;
                if i < args.len() {
                    cli.seed = args[i].parse().unwrap_or(0);
                }
            }
            "--time-series" => {
                cli.time_series = true;
            }
            arg if !arg.starts_with('-') => {
                cli.filter = Some(arg.to_string());
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
            }
        }
        i += 1;
    }

    cli
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).init();
}

fn write_report(report: &BenchReport, timestamp: &str) -> std::io::Result<std::path::PathBuf> {
    let dir = std::path::Path::new("benchmark-results");
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("bench-{}.json", timestamp));
    let json = serde_json::to_string_pretty(report)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    std::fs::write(&path, json)?;
    Ok(path)
}

// ─── Main ───────────────────────────────────────────────────────────────────

fn main() {
    init_logging();
    let cli = parse_args();
    let all_scenarios = scenarios();

    let to_run: Vec<&Scenario> = match &cli.filter {
        Some(f) => {
            let f_lower = f.to_lowercase();
            all_scenarios.iter()
                .filter(|s| s.name.to_lowercase().contains(&f_lower)
                          || s.label.to_lowercase().contains(&f_lower)
                          || s.category.to_lowercase().contains(&f_lower))
                .collect()
        }
        None => all_scenarios.iter().collect(),
    };

    if to_run.is_empty() {
        eprintln!("No scenarios match filter: {:?}", cli.filter);
        std::process::exit(1);
    }

    let ts_dir = if cli.time_series {
        Some(std::path::Path::new("benchmark-results/time-series").to_path_buf())
    } else {
        None
    };

    println!("\n  Planet Engine Benchmark Runner v0.1.0");
    println!("  PRNG: ChaCha8Rng | Runs/scenario: {} | Base seed: {}", cli.runs, cli.seed);
    println!("  Running {} scenario(s)...\n", to_run.len());
    println!("  {:<30} {:>5} {:>6} {:>12} {:>12} {:>7}",
        "Scenario", "Pass%", "Rej", "FixedDrift", "FinalShips", "Time");
    println!("  {}", "-".repeat(80));

    let suite_start = Instant::now();
    let mut mc_reports = Vec::new();

    for scenario in &to_run {
        let report = monte_carlo::run_monte_carlo(scenario, cli.runs, cli.seed, ts_dir.as_deref());
        let pass_pct = report.pass_rate * 100.0;
        let status = if report.pass_rate >= 1.0 { "PASS" } else { "FAIL" };

        println!("  {:<30} {:>4}% {:>6.1} {:>12.2e} {:>12.1} {:>5.0}ms  {}",
            report.label,
            pass_pct as u32,
            report.rejections.mean,
            report.max_fixed_drift.max,
            report.final_spaceships.mean,
            report.elapsed_ms.mean,
            status,
        );
        for run in report.individual_runs.iter().filter(|r| !r.pass).take(3) {
            if let Some(v) = &run.first_violation {
                println!("      seed {}: {}", run.seed, v);
            }
        }

        mc_reports.push(report);
    }

    let suite_elapsed = suite_start.elapsed();

    // ─── Summary ────────────────────────────────────────────────────────

    let total = mc_reports.len();
    let passed = mc_reports.iter().filter(|r| r.pass_rate >= 1.0).count();
    let failed = total - passed;
    let max_fixed_drift = mc_reports.iter()
        .map(|r| r.max_fixed_drift.max)
        .fold(0.0_f64, f64::max);

    println!("  {}", "-".repeat(80));
    println!("  Total: {}  Passed: {}  Failed: {}  Suite time: {:.1}s",
        total, passed, failed, suite_elapsed.as_secs_f64());
    println!("  Max float vs fixed drift: {:.2e} ships\n", max_fixed_drift);

    // ─── Write JSON Report ──────────────────────────────────────────────

    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let timestamp = format!("{}", ts);

    let report = BenchReport {
        timestamp: timestamp.clone(),
        version: "0.1.0",
        prng: "ChaCha8Rng",
        n_runs_per_scenario: cli.runs,
        summary: Summary {
            total,
            passed,
            failed,
            pass_rate: passed as f64 / total as f64,
        },
        max_fixed_drift,
        scenarios: mc_reports,
    };

    match write_report(&report, &timestamp) {
        Ok(path) => println!("  Results saved to: {}\n", path.display()),
        Err(e) => {
            eprintln!("  Failed to write benchmark report: {}", e);
            std::process::exit(2);
        }
    }

    if failed > 0 {
        std::process::exit(1);
    }
}
