//! Trial construction: single trials and full phase batches.
//!
//! `generate_trial` is a pure constructor: 9 independently random cell
//! strings, then relation insertion when `has_relation`, then the
//! high-interference overlay when requested and the condition supports it.
//! No-relation trials are left as pure random fill; the small probability
//! that randomness spontaneously satisfies the pattern is part of the task
//! design.
//!
//! `generate_phase_trials` produces the phase batch: `floor(n/2)` relation
//! trials and the remainder no-relation trials (odd counts get one extra
//! no-relation trial), the second half of each group flagged
//! high-interference when the phase calls for it, and the whole batch
//! Fisher–Yates shuffled so presentation order reveals nothing.

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::alphabet::random_grid;
use crate::relation::{add_high_interference, insert_relation};
use crate::types::{Condition, ObjectCount, PhaseSpec, Trial};

/// Build one trial from scratch.
pub fn generate_trial(
    alphabet: &[u8],
    condition: Condition,
    has_relation: bool,
    high_interference: bool,
    rng: &mut SmallRng,
) -> Trial {
    let mut grid = random_grid(alphabet, rng);

    if has_relation {
        insert_relation(&mut grid, alphabet, condition, rng);
    }
    if high_interference && condition.supports_interference() {
        add_high_interference(&mut grid, alphabet, rng);
    }

    Trial {
        grid,
        has_relation,
        condition,
        high_interference,
        colors: None,
    }
}

/// Resolve the condition for one trial of a phase. `Mixed` object counts
/// draw three-same or five-same per trial; fixed counts map directly.
fn trial_condition(spec: &PhaseSpec, fallback: Condition, rng: &mut SmallRng) -> Condition {
    match spec.objects {
        Some(ObjectCount::Mixed) => {
            if rng.random_bool(0.5) {
                Condition::ThreeSame
            } else {
                Condition::FiveSame
            }
        }
        Some(objects) => objects.fixed_condition().unwrap_or(fallback),
        None => spec.condition.unwrap_or(fallback),
    }
}

/// Generate the shuffled trial batch for a phase.
///
/// `fallback` is the experiment-level condition used when the phase does not
/// carry its own.
pub fn generate_phase_trials(
    spec: &PhaseSpec,
    fallback: Condition,
    rng: &mut SmallRng,
) -> Vec<Trial> {
    let n = spec.trials as usize;
    let relation_count = n / 2;
    let no_relation_count = n - relation_count;

    let mut trials = Vec::with_capacity(n);

    for i in 0..relation_count {
        let condition = trial_condition(spec, fallback, rng);
        let high = spec.interference && 2 * i >= relation_count;
        trials.push(generate_trial(
            condition_alphabet(spec),
            condition,
            true,
            high,
            rng,
        ));
    }
    for i in 0..no_relation_count {
        let condition = trial_condition(spec, fallback, rng);
        let high = spec.interference && 2 * i >= no_relation_count;
        trials.push(generate_trial(
            condition_alphabet(spec),
            condition,
            false,
            high,
            rng,
        ));
    }

    trials.shuffle(rng);
    trials
}

#[inline]
fn condition_alphabet(spec: &PhaseSpec) -> &'static [u8; 10] {
    spec.task_type.alphabet()
}
