//! Batch session simulation against a synthetic responder.
//!
//! The responder actually scans each grid with the relation detector, then
//! applies lapse and guess noise — so simulated accuracy tracks how
//! detectable the generated patterns are, not just the trial labels. Useful
//! for sanity-checking protocol tables and adaptation dynamics at scale.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::relation::detect_relation;
use crate::session::{Session, Step};
use crate::types::ExperimentConfig;

/// How the synthetic responder behaves.
#[derive(Clone, Copy, Debug)]
pub struct ResponderProfile {
    /// P(respond) when the detector finds the pattern.
    pub detect_rate: f64,
    /// P(respond) when it does not.
    pub guess_rate: f64,
}

impl Default for ResponderProfile {
    fn default() -> Self {
        // A solid but imperfect observer.
        ResponderProfile {
            detect_rate: 0.9,
            guess_rate: 0.08,
        }
    }
}

/// Outcome of one simulated session.
#[derive(Clone, Debug)]
pub struct SessionOutcome {
    /// Fraction correct over all scored trials.
    pub accuracy: f64,
    pub total_trials: u32,
    pub total_correct: u32,
    /// Final staircase level (1 for non-adaptive modes).
    pub final_level: u32,
}

/// Drive one session to completion with the synthetic responder.
pub fn simulate_session(
    config: ExperimentConfig,
    profile: &ResponderProfile,
    seed: u64,
) -> SessionOutcome {
    let mut session = Session::new(config, seed);
    let mut rng = SmallRng::seed_from_u64(seed ^ 0x5eed_5eed);

    loop {
        match session
            .request_next_trial()
            .expect("simulated driver keeps protocol order")
        {
            Step::Trial(trial) => {
                let detected = detect_relation(&trial.grid, trial.condition);
                let p = if detected {
                    profile.detect_rate
                } else {
                    profile.guess_rate
                };
                let respond = rng.random_bool(p);
                let rt = respond.then(|| rng.random_range(400..3200u32));
                session.report_response(respond, rt);
                if session.record_confidence(rng.random_range(1..=5)).is_ok() {
                    // metacognitive sessions consume the rating; other modes
                    // reject it before any state changes
                }
            }
            Step::PhaseComplete(_) => {}
            Step::AllComplete => break,
        }
    }

    let stats = session.session_stats();
    SessionOutcome {
        accuracy: stats.accuracy,
        total_trials: stats.total_trials,
        total_correct: stats.total_correct,
        final_level: session.adaptive().level,
    }
}

/// Accuracy distribution over a batch of simulated sessions.
#[derive(Clone, Debug)]
pub struct BatchStats {
    pub sessions: usize,
    pub mean_accuracy: f64,
    pub min_accuracy: f64,
    pub max_accuracy: f64,
    pub mean_trials: f64,
}

/// Run `sessions` independent sessions in parallel, one seed offset each.
pub fn simulate_batch<F>(
    make_config: F,
    profile: &ResponderProfile,
    sessions: usize,
    seed: u64,
) -> BatchStats
where
    F: Fn(&mut SmallRng) -> ExperimentConfig + Sync,
{
    let outcomes: Vec<SessionOutcome> = (0..sessions)
        .into_par_iter()
        .map(|i| {
            let session_seed = seed.wrapping_add(i as u64);
            let mut config_rng = SmallRng::seed_from_u64(session_seed ^ 0xc0f1_99);
            let config = make_config(&mut config_rng);
            simulate_session(config, profile, session_seed)
        })
        .collect();

    let n = outcomes.len().max(1) as f64;
    BatchStats {
        sessions: outcomes.len(),
        mean_accuracy: outcomes.iter().map(|o| o.accuracy).sum::<f64>() / n,
        min_accuracy: outcomes
            .iter()
            .map(|o| o.accuracy)
            .fold(f64::INFINITY, f64::min),
        max_accuracy: outcomes
            .iter()
            .map(|o| o.accuracy)
            .fold(f64::NEG_INFINITY, f64::max),
        mean_trials: outcomes.iter().map(|o| o.total_trials as f64).sum::<f64>() / n,
    }
}
