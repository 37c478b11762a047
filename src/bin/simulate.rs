//! Batch-simulate sessions of one experiment kind and print the accuracy
//! distribution.
//!
//! Usage: `relint-simulate [kind] [sessions] [seed]`
//! where `kind` is one of: experiment1, experiment2, experiment3, adaptive,
//! progressive, speed, multirelational, nback, interference, wmload,
//! metacognitive.

use rand::rngs::SmallRng;
use rand::SeedableRng;

use relint::simulation::{simulate_batch, ResponderProfile};
use relint::types::{Condition, ExperimentConfig, SpeedMode, WmLoadMode};

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let kind = args.get(1).map(String::as_str).unwrap_or("experiment1");
    let sessions: usize = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(100);
    let seed: u64 = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(12345);

    let make_config = |rng: &mut SmallRng| build_config(kind, rng);
    // Fail fast on an unknown kind before burning a batch.
    build_config(kind, &mut SmallRng::seed_from_u64(0));

    let profile = ResponderProfile::default();
    println!(
        "Simulating {} sessions of '{}' (seed {}, detect {:.2}, guess {:.2})...",
        sessions, kind, seed, profile.detect_rate, profile.guess_rate
    );

    let stats = simulate_batch(make_config, &profile, sessions, seed);

    println!("Sessions:       {}", stats.sessions);
    println!("Mean trials:    {:.1}", stats.mean_trials);
    println!("Mean accuracy:  {:.4}", stats.mean_accuracy);
    println!("Min accuracy:   {:.4}", stats.min_accuracy);
    println!("Max accuracy:   {:.4}", stats.max_accuracy);
}

fn build_config(kind: &str, rng: &mut SmallRng) -> ExperimentConfig {
    let built = match kind {
        "experiment1" => ExperimentConfig::experiment1(Condition::ThreeSame),
        "experiment2" => ExperimentConfig::experiment2(rng),
        "experiment3" => ExperimentConfig::experiment3(rng),
        "adaptive" => ExperimentConfig::adaptive(),
        "progressive" => ExperimentConfig::progressive(1),
        "speed" => ExperimentConfig::speed(SpeedMode::Balanced),
        "multirelational" => ExperimentConfig::multirelational(),
        "nback" => ExperimentConfig::nback(),
        "interference" => ExperimentConfig::interference(2),
        "wmload" => ExperimentConfig::wm_load(WmLoadMode::Medium),
        "metacognitive" => ExperimentConfig::metacognitive(),
        other => {
            eprintln!("Unknown experiment kind: {}", other);
            std::process::exit(1);
        }
    };
    built.expect("builder tables are valid")
}
