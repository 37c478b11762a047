//! Signal-detection scoring: outcome classification and phase aggregates.
//!
//! Classification is deterministic given (hasRelation, responded):
//!
//! | hasRelation | responded | outcome |
//! |---|---|---|
//! | true | true | hit |
//! | true | false | miss |
//! | false | true | false alarm |
//! | false | false | correct rejection |
//!
//! The accuracy statistic is `hitRate − falseAlarmRate` with each rate
//! defined as 0 when its denominator is 0. It is signed and never clamped: a
//! responder with more false alarms than hits scores below zero.

use serde::{Deserialize, Serialize};

use crate::types::{Condition, PhaseKind, TaskType};

/// Signal-detection outcome class.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Outcome {
    Hit,
    Miss,
    FalseAlarm,
    CorrectRejection,
}

impl Outcome {
    /// Hits and correct rejections are correct responses.
    pub fn is_correct(self) -> bool {
        matches!(self, Outcome::Hit | Outcome::CorrectRejection)
    }
}

/// Classify one response.
pub fn classify(has_relation: bool, responded: bool) -> Outcome {
    match (has_relation, responded) {
        (true, true) => Outcome::Hit,
        (true, false) => Outcome::Miss,
        (false, true) => Outcome::FalseAlarm,
        (false, false) => Outcome::CorrectRejection,
    }
}

/// One scored trial, as exported in result files.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrialRecord {
    pub trial_number: u32,
    pub phase: PhaseKind,
    pub task_type: TaskType,
    pub condition: Condition,
    pub has_relation: bool,
    pub high_interference: bool,
    pub responded: bool,
    pub correct: bool,
    /// Milliseconds; present only for responded trials.
    pub reaction_time: Option<u32>,
}

/// Aggregated counts and per-trial records for one phase. Created fresh at
/// phase start, mutated once per trial, and frozen (cloned) at phase end —
/// never mutated after the copy.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseResult {
    pub hits: u32,
    pub misses: u32,
    pub false_alarms: u32,
    pub correct_rejections: u32,
    /// Reaction times of hits, in ms.
    pub reaction_times: Vec<u32>,
    pub trial_data: Vec<TrialRecord>,
}

impl PhaseResult {
    /// Record one classified trial.
    pub fn record(&mut self, record: TrialRecord) {
        match classify(record.has_relation, record.responded) {
            Outcome::Hit => {
                self.hits += 1;
                if let Some(rt) = record.reaction_time {
                    self.reaction_times.push(rt);
                }
            }
            Outcome::Miss => self.misses += 1,
            Outcome::FalseAlarm => self.false_alarms += 1,
            Outcome::CorrectRejection => self.correct_rejections += 1,
        }
        self.trial_data.push(record);
    }

    /// hits / (hits + misses), 0 when no relation trials were scored.
    pub fn hit_rate(&self) -> f64 {
        rate(self.hits, self.hits + self.misses)
    }

    /// falseAlarms / (falseAlarms + correctRejections), 0 when no
    /// no-relation trials were scored.
    pub fn false_alarm_rate(&self) -> f64 {
        rate(self.false_alarms, self.false_alarms + self.correct_rejections)
    }

    /// The signed accuracy statistic: hit rate minus false-alarm rate.
    pub fn accuracy(&self) -> f64 {
        self.hit_rate() - self.false_alarm_rate()
    }

    /// Mean hit reaction time in ms, 0 when there were no hits.
    pub fn mean_reaction_time(&self) -> f64 {
        if self.reaction_times.is_empty() {
            return 0.0;
        }
        let sum: u64 = self.reaction_times.iter().map(|&rt| rt as u64).sum();
        sum as f64 / self.reaction_times.len() as f64
    }

    pub fn total_trials(&self) -> u32 {
        self.hits + self.misses + self.false_alarms + self.correct_rejections
    }

    pub fn total_correct(&self) -> u32 {
        self.hits + self.correct_rejections
    }

    /// Correct flags of the last `k` scored trials, oldest first. The
    /// adaptation controllers read this window and nothing else.
    pub fn rolling_window(&self, k: usize) -> Vec<bool> {
        let start = self.trial_data.len().saturating_sub(k);
        self.trial_data[start..].iter().map(|t| t.correct).collect()
    }
}

fn rate(numerator: u32, denominator: u32) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Fraction of correct flags in a rolling window, 0 when empty.
pub fn fraction_correct(window: &[bool]) -> f64 {
    if window.is_empty() {
        return 0.0;
    }
    window.iter().filter(|&&c| c).count() as f64 / window.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(n: u32, has_relation: bool, responded: bool) -> TrialRecord {
        TrialRecord {
            trial_number: n,
            phase: PhaseKind::Test,
            task_type: TaskType::Letter,
            condition: Condition::ThreeSame,
            has_relation,
            high_interference: false,
            responded,
            correct: classify(has_relation, responded).is_correct(),
            reaction_time: responded.then_some(1200),
        }
    }

    #[test]
    fn test_classification_table() {
        assert_eq!(classify(true, true), Outcome::Hit);
        assert_eq!(classify(true, false), Outcome::Miss);
        assert_eq!(classify(false, true), Outcome::FalseAlarm);
        assert_eq!(classify(false, false), Outcome::CorrectRejection);
    }

    #[test]
    fn test_accuracy_statistic() {
        let mut r = PhaseResult::default();
        // hits=8, misses=2, falseAlarms=1, correctRejections=9
        let mut n = 0;
        for _ in 0..8 {
            n += 1;
            r.record(record(n, true, true));
        }
        for _ in 0..2 {
            n += 1;
            r.record(record(n, true, false));
        }
        n += 1;
        r.record(record(n, false, true));
        for _ in 0..9 {
            n += 1;
            r.record(record(n, false, false));
        }
        assert!((r.hit_rate() - 0.8).abs() < 1e-12);
        assert!((r.false_alarm_rate() - 0.1).abs() < 1e-12);
        assert!((r.accuracy() - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_accuracy_can_be_negative() {
        let mut r = PhaseResult::default();
        r.record(record(1, true, false)); // miss
        r.record(record(2, false, true)); // false alarm
        assert_eq!(r.accuracy(), -1.0);
    }

    #[test]
    fn test_empty_denominators() {
        let r = PhaseResult::default();
        assert_eq!(r.hit_rate(), 0.0);
        assert_eq!(r.false_alarm_rate(), 0.0);
        assert_eq!(r.accuracy(), 0.0);
        assert_eq!(r.mean_reaction_time(), 0.0);
    }

    #[test]
    fn test_reaction_times_only_for_hits() {
        let mut r = PhaseResult::default();
        r.record(record(1, true, true));
        r.record(record(2, false, true)); // false alarm RT not kept
        assert_eq!(r.reaction_times, vec![1200]);
    }

    #[test]
    fn test_rolling_window() {
        let mut r = PhaseResult::default();
        for n in 1..=15 {
            r.record(record(n, true, n % 3 != 0));
        }
        let w = r.rolling_window(10);
        assert_eq!(w.len(), 10);
        assert_eq!(r.rolling_window(100).len(), 15);
        let f = fraction_correct(&w);
        assert!((0.0..=1.0).contains(&f));
    }

    #[test]
    fn test_invariant_counts_partition() {
        let mut r = PhaseResult::default();
        for n in 1..=20 {
            r.record(record(n, n % 2 == 0, n % 3 == 0));
        }
        let relation = r
            .trial_data
            .iter()
            .filter(|t| t.has_relation)
            .count() as u32;
        let no_relation = r.trial_data.len() as u32 - relation;
        assert_eq!(r.hits + r.misses, relation);
        assert_eq!(r.false_alarms + r.correct_rejections, no_relation);
    }
}
