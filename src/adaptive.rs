//! Difficulty adaptation: the shared adaptive state, the checkpoint
//! policies, and the static progressive-week table.
//!
//! ## Architecture
//!
//! Each policy is a pure state transition invoked at a fixed cadence of
//! closed trials. A policy reads only the rolling window of correct flags
//! handed to it and writes only the knobs it is licensed to change — the
//! staircase owns duration, object count and level; the n-back policy owns
//! the n-back depth. Neither reaches into the scoring aggregates.
//!
//! The progressive week table is not accuracy-driven at all: it is advanced
//! externally, once per completed session, capped at week 4.

use std::collections::VecDeque;

use serde::Serialize;

use crate::constants::{
    NBACK_ADVANCE, NBACK_MAX_DEPTH, NBACK_WINDOW, STAIRCASE_DURATION_CEIL,
    STAIRCASE_DURATION_FLOOR, STAIRCASE_DURATION_RESET, STAIRCASE_DURATION_STEP, STAIRCASE_LOWER,
    STAIRCASE_OBJECT_CEIL, STAIRCASE_OBJECT_FLOOR, STAIRCASE_OBJECT_STEP, STAIRCASE_RAISE,
    STAIRCASE_WINDOW,
};
use crate::scoring::fraction_correct;
use crate::types::{Condition, ExperimentKind, Grid, ObjectCount};

/// Mutable controller state. Owned by the session, written only at
/// checkpoints.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdaptiveState {
    /// Current object count (3, 5, or 7).
    pub object_count: u32,
    /// Current response window in ms (staircase knob).
    pub trial_duration_ms: u32,
    /// Difficulty level, floored at 1.
    pub level: u32,
    /// Rolling accuracy observed at each checkpoint, oldest first.
    pub recent_accuracy: Vec<f64>,
    /// Current n-back depth (1–3).
    pub nback_depth: usize,
    /// Current distractor level (1–4).
    pub interference_level: u8,
}

impl Default for AdaptiveState {
    fn default() -> Self {
        AdaptiveState {
            object_count: STAIRCASE_OBJECT_FLOOR,
            trial_duration_ms: STAIRCASE_DURATION_RESET,
            level: 1,
            recent_accuracy: Vec::new(),
            nback_depth: 1,
            interference_level: 1,
        }
    }
}

/// A checkpoint policy: fires every `cadence()` closed trials and adjusts its
/// licensed knobs from the rolling window.
pub trait AdaptivePolicy: Send + Sync {
    /// Human-readable name for this policy.
    fn name(&self) -> &'static str;

    /// Closed trials between checkpoints, and the rolling window width.
    fn cadence(&self) -> usize;

    /// Apply one adjustment step.
    fn adjust(&self, state: &mut AdaptiveState, window: &[bool]);
}

// ── Staircase ───────────────────────────────────────────────────────────────

/// The adaptive-difficulty staircase.
///
/// At ≥0.8 rolling accuracy it first shortens the response window by 500 ms
/// down to a 3000 ms floor, then steps the object count up by 2 (to a
/// ceiling of 7) while resetting the window to 6000 ms; the level always
/// increments. Below 0.6 it first steps the object count down (floor 3),
/// then lengthens the window up to 8000 ms; the level decrements, floored at
/// 1. In between it leaves everything alone.
pub struct Staircase;

impl AdaptivePolicy for Staircase {
    fn name(&self) -> &'static str {
        "staircase"
    }

    fn cadence(&self) -> usize {
        STAIRCASE_WINDOW
    }

    fn adjust(&self, state: &mut AdaptiveState, window: &[bool]) {
        if window.len() < STAIRCASE_WINDOW {
            return;
        }
        let accuracy = fraction_correct(window);
        state.recent_accuracy.push(accuracy);

        if accuracy >= STAIRCASE_RAISE {
            if state.trial_duration_ms > STAIRCASE_DURATION_FLOOR {
                state.trial_duration_ms -= STAIRCASE_DURATION_STEP;
            } else if state.object_count < STAIRCASE_OBJECT_CEIL {
                state.object_count += STAIRCASE_OBJECT_STEP;
                state.trial_duration_ms = STAIRCASE_DURATION_RESET;
            }
            state.level += 1;
        } else if accuracy < STAIRCASE_LOWER {
            if state.object_count > STAIRCASE_OBJECT_FLOOR {
                state.object_count -= STAIRCASE_OBJECT_STEP;
            } else if state.trial_duration_ms < STAIRCASE_DURATION_CEIL {
                state.trial_duration_ms += STAIRCASE_DURATION_STEP;
            }
            state.level = state.level.saturating_sub(1).max(1);
        }
    }
}

/// The condition the staircase's object count selects for trial generation.
/// Only the 7-object tier switches shape; 3 and 5 keep the base condition.
pub fn adaptive_condition(base: Condition, object_count: u32) -> Condition {
    if object_count >= STAIRCASE_OBJECT_CEIL {
        Condition::SevenSame
    } else {
        base
    }
}

// ── N-back ──────────────────────────────────────────────────────────────────

/// The n-back depth controller: every 20 closed trials, while depth < 3, a
/// rolling accuracy of 0.75 or better advances the depth by one.
pub struct NBack;

impl AdaptivePolicy for NBack {
    fn name(&self) -> &'static str {
        "n-back"
    }

    fn cadence(&self) -> usize {
        NBACK_WINDOW
    }

    fn adjust(&self, state: &mut AdaptiveState, window: &[bool]) {
        if state.nback_depth >= NBACK_MAX_DEPTH || window.len() < NBACK_WINDOW {
            return;
        }
        if fraction_correct(window) >= NBACK_ADVANCE {
            state.nback_depth += 1;
        }
    }
}

/// The checkpoint policy for an experiment kind, if it has one.
pub fn policy_for(kind: ExperimentKind) -> Option<Box<dyn AdaptivePolicy>> {
    match kind {
        ExperimentKind::Adaptive => Some(Box::new(Staircase)),
        ExperimentKind::Nback => Some(Box::new(NBack)),
        _ => None,
    }
}

/// Grid history for the n-back secondary task. Retains only the last
/// `depth + 1` trials.
#[derive(Default)]
pub struct NBackHistory {
    entries: VecDeque<(Grid, bool)>,
}

impl NBackHistory {
    pub fn push(&mut self, grid: Grid, has_relation: bool, depth: usize) {
        self.entries.push_back((grid, has_relation));
        while self.entries.len() > depth + 1 {
            self.entries.pop_front();
        }
    }

    /// Whether the newest trial matches the one `depth` trials back (same
    /// relation status). `None` until the buffer is deep enough.
    pub fn is_match(&self, depth: usize) -> Option<bool> {
        if self.entries.len() <= depth {
            return None;
        }
        let newest = self.entries[self.entries.len() - 1].1;
        let compared = self.entries[self.entries.len() - 1 - depth].1;
        Some(newest == compared)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

// ── Progressive week table ──────────────────────────────────────────────────

/// One week of the 4-week progressive program.
#[derive(Clone, Copy, Debug)]
pub struct WeekConfig {
    pub objects: ObjectCount,
    pub duration_ms: u32,
    pub trials: u32,
    pub interference: bool,
}

/// The static progressive table, keyed by week 1–4.
pub fn week_config(week: u8) -> Option<WeekConfig> {
    match week {
        1 => Some(WeekConfig {
            objects: ObjectCount::Three,
            duration_ms: 7000,
            trials: 30,
            interference: false,
        }),
        2 => Some(WeekConfig {
            objects: ObjectCount::Mixed,
            duration_ms: 6000,
            trials: 40,
            interference: false,
        }),
        3 => Some(WeekConfig {
            objects: ObjectCount::Five,
            duration_ms: 5500,
            trials: 50,
            interference: true,
        }),
        4 => Some(WeekConfig {
            objects: ObjectCount::Seven,
            duration_ms: 5000,
            trials: 60,
            interference: true,
        }),
        _ => None,
    }
}

/// Advance the progressive week after a completed session, capped at 4.
pub fn next_week(week: u8) -> u8 {
    (week + 1).min(4)
}

// ── Confidence & calibration ────────────────────────────────────────────────

/// One confidence rating from the metacognitive mode.
#[derive(Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfidenceRecord {
    pub trial: u32,
    /// 1 (guessing) to 5 (certain).
    pub confidence: u8,
    pub correct: bool,
}

/// Calibration score: accuracy when confident (≥4) minus accuracy when
/// unconfident (≤2). Positive means confidence tracks correctness.
/// `None` when no ratings were collected.
pub fn calibration_score(records: &[ConfidenceRecord]) -> Option<f64> {
    if records.is_empty() {
        return None;
    }
    let acc = |pred: fn(u8) -> bool| {
        let total = records.iter().filter(|r| pred(r.confidence)).count();
        if total == 0 {
            return 0.0;
        }
        let correct = records
            .iter()
            .filter(|r| pred(r.confidence) && r.correct)
            .count();
        correct as f64 / total as f64
    };
    Some(acc(|c| c >= 4) - acc(|c| c <= 2))
}

/// Bucketed calibration verdict.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Calibration {
    Excellent,
    Good,
    Fair,
    NeedsImprovement,
}

pub fn calibration(records: &[ConfidenceRecord]) -> Option<Calibration> {
    let score = calibration_score(records)?;
    Some(if score > 0.3 {
        Calibration::Excellent
    } else if score > 0.1 {
        Calibration::Good
    } else if score > -0.1 {
        Calibration::Fair
    } else {
        Calibration::NeedsImprovement
    })
}
