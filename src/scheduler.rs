//! Experiment configuration builders and phase scheduling.
//!
//! Builders validate up front — an impossible condition/alphabet combination
//! is a [`ConfigError`] at build time, never a mid-trial failure.
//!
//! ## Protocol tables
//!
//! | Kind | Phases |
//! |------|--------|
//! | experiment1 | training letter ×5, test letter ×50, test number ×50 (one caller-chosen condition) |
//! | experiment2 | per condition (three-same, five-same in random order): training number ×10, test number ×60, test letter ×60; interference on test phases |
//! | experiment3 | three-same first, then five-same/three-different in random order; per condition: test number ×40, test letter ×40 |
//! | training modes | one letter test phase (trial counts per mode) |
//!
//! Condition order is randomized once, at configuration time. Within each
//! condition, number-task phases always precede letter-task phases.
//!
//! Phase selection is "first incomplete in list order", not an index cursor,
//! so a reconfigured phase list resumes correctly.

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;

use crate::adaptive::week_config;
use crate::error::ConfigError;
use crate::scoring::PhaseResult;
use crate::types::{
    Condition, ExperimentConfig, ExperimentKind, PhaseKind, PhaseSpec, SpeedMode, TaskType,
    WmLoadMode,
};

impl ExperimentConfig {
    fn base(kind: ExperimentKind) -> Self {
        ExperimentConfig {
            kind,
            condition: None,
            conditions: Vec::new(),
            phases: Vec::new(),
            week: None,
            speed_mode: None,
            wm_load_mode: None,
            interference_level: None,
        }
    }

    /// Experiment 1 (between-subjects): one condition across training and
    /// both test phases.
    pub fn experiment1(condition: Condition) -> Result<Self, ConfigError> {
        let mut config = Self::base(ExperimentKind::Experiment1);
        config.condition = Some(condition);
        config.phases = vec![
            PhaseSpec::new(PhaseKind::Training, TaskType::Letter, 5),
            PhaseSpec::new(PhaseKind::Test, TaskType::Letter, 50),
            PhaseSpec::new(PhaseKind::Test, TaskType::Number, 50),
        ];
        config.validate()?;
        Ok(config)
    }

    /// Experiment 2 (within-subjects + interference): both conditions in
    /// randomized order, interference on test phases.
    pub fn experiment2(rng: &mut SmallRng) -> Result<Self, ConfigError> {
        let mut conditions = vec![Condition::ThreeSame, Condition::FiveSame];
        conditions.shuffle(rng);

        let mut config = Self::base(ExperimentKind::Experiment2);
        for &condition in &conditions {
            config.phases.push(
                PhaseSpec::new(PhaseKind::Training, TaskType::Number, 10)
                    .with_condition(condition),
            );
            let mut test_number =
                PhaseSpec::new(PhaseKind::Test, TaskType::Number, 60).with_condition(condition);
            test_number.interference = true;
            config.phases.push(test_number);
            let mut test_letter =
                PhaseSpec::new(PhaseKind::Test, TaskType::Letter, 60).with_condition(condition);
            test_letter.interference = true;
            config.phases.push(test_letter);
        }
        config.conditions = conditions;
        config.validate()?;
        Ok(config)
    }

    /// Experiment 3 (multi-condition): three-same is always the anchor, the
    /// remaining two conditions are randomized.
    pub fn experiment3(rng: &mut SmallRng) -> Result<Self, ConfigError> {
        let mut remaining = vec![Condition::FiveSame, Condition::ThreeDifferent];
        remaining.shuffle(rng);
        let mut conditions = vec![Condition::ThreeSame];
        conditions.extend(remaining);

        let mut config = Self::base(ExperimentKind::Experiment3);
        for &condition in &conditions {
            // Numbers always before letters within a condition.
            config.phases.push(
                PhaseSpec::new(PhaseKind::Test, TaskType::Number, 40).with_condition(condition),
            );
            config.phases.push(
                PhaseSpec::new(PhaseKind::Test, TaskType::Letter, 40).with_condition(condition),
            );
        }
        config.conditions = conditions;
        config.validate()?;
        Ok(config)
    }

    /// Staircase-controlled adaptive training: 50 trials.
    pub fn adaptive() -> Result<Self, ConfigError> {
        Self::single_phase_mode(ExperimentKind::Adaptive, 50)
    }

    /// One week of the progressive program.
    pub fn progressive(week: u8) -> Result<Self, ConfigError> {
        let cfg = week_config(week).ok_or(ConfigError::InvalidWeek(week))?;
        let mut config = Self::base(ExperimentKind::Progressive);
        config.week = Some(week);
        config.condition = Some(cfg.objects.fixed_condition().unwrap_or(Condition::ThreeSame));
        let mut phase = PhaseSpec::new(PhaseKind::Test, TaskType::Letter, cfg.trials);
        phase.objects = Some(cfg.objects);
        phase.duration_ms = Some(cfg.duration_ms);
        phase.interference = cfg.interference;
        config.phases.push(phase);
        config.validate()?;
        Ok(config)
    }

    /// Speed-accuracy training: 40 trials at the chosen window.
    pub fn speed(mode: SpeedMode) -> Result<Self, ConfigError> {
        let mut config = Self::single_phase_mode(ExperimentKind::Speed, 40)?;
        config.speed_mode = Some(mode);
        Ok(config)
    }

    /// Dual-dimension (symbol + color) training: 50 trials.
    pub fn multirelational() -> Result<Self, ConfigError> {
        Self::single_phase_mode(ExperimentKind::Multirelational, 50)
    }

    /// Relational n-back hybrid: 60 trials with depth adaptation.
    pub fn nback() -> Result<Self, ConfigError> {
        Self::single_phase_mode(ExperimentKind::Nback, 60)
    }

    /// Distractor training at a fixed level 1–4: 40 trials.
    pub fn interference(level: u8) -> Result<Self, ConfigError> {
        if !(1..=4).contains(&level) {
            return Err(ConfigError::InvalidInterferenceLevel(level));
        }
        let mut config = Self::single_phase_mode(ExperimentKind::Interference, 40)?;
        config.interference_level = Some(level);
        Ok(config)
    }

    /// Working-memory-load training: 50 trials under the chosen carryover
    /// policy.
    pub fn wm_load(mode: WmLoadMode) -> Result<Self, ConfigError> {
        let mut config = Self::single_phase_mode(ExperimentKind::Wmload, 50)?;
        config.wm_load_mode = Some(mode);
        Ok(config)
    }

    /// Metacognitive training: 40 trials, each followed by a confidence
    /// rating.
    pub fn metacognitive() -> Result<Self, ConfigError> {
        Self::single_phase_mode(ExperimentKind::Metacognitive, 40)
    }

    fn single_phase_mode(kind: ExperimentKind, trials: u32) -> Result<Self, ConfigError> {
        let mut config = Self::base(kind);
        config.condition = Some(Condition::ThreeSame);
        config
            .phases
            .push(PhaseSpec::new(PhaseKind::Test, TaskType::Letter, trials));
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for phase in &self.phases {
            if phase.trials == 0 {
                return Err(ConfigError::EmptyPhase);
            }
            let condition = self.condition_for(phase);
            let alphabet = phase.task_type.alphabet();
            // Distinct-symbol conditions sample without replacement.
            if condition.requires_distinct() && condition.pattern_len() > alphabet.len() {
                return Err(ConfigError::AlphabetTooSmall {
                    condition: condition.to_string(),
                    task: format!("{:?}", phase.task_type).to_lowercase(),
                    needed: condition.pattern_len(),
                    available: alphabet.len(),
                });
            }
        }
        Ok(())
    }

    /// The condition a phase runs under: its own, else the experiment-level
    /// one. Three-same is the last-resort default.
    pub fn condition_for(&self, phase: &PhaseSpec) -> Condition {
        phase
            .condition
            .or(self.condition)
            .unwrap_or(Condition::ThreeSame)
    }

    /// Index of the first incomplete phase in list order.
    pub fn next_incomplete(&self) -> Option<usize> {
        self.phases.iter().position(|p| !p.completed)
    }

    /// Mark a phase complete and freeze its results onto it.
    pub fn complete_phase(&mut self, index: usize, results: PhaseResult) {
        let phase = &mut self.phases[index];
        phase.completed = true;
        phase.results = Some(results);
    }

    /// Clear all completion state (abort / restart).
    pub fn reset_completion(&mut self) {
        for phase in &mut self.phases {
            phase.completed = false;
            phase.results = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_experiment1_phases() {
        let config = ExperimentConfig::experiment1(Condition::FiveDifferent).unwrap();
        assert_eq!(config.phases.len(), 3);
        assert_eq!(config.phases[0].phase, PhaseKind::Training);
        assert_eq!(config.phases[0].trials, 5);
        assert_eq!(config.phases[1].task_type, TaskType::Letter);
        assert_eq!(config.phases[2].task_type, TaskType::Number);
        assert_eq!(
            config.condition_for(&config.phases[1]),
            Condition::FiveDifferent
        );
    }

    #[test]
    fn test_experiment2_structure() {
        let mut rng = SmallRng::seed_from_u64(30);
        let config = ExperimentConfig::experiment2(&mut rng).unwrap();
        assert_eq!(config.phases.len(), 6);
        assert_eq!(config.conditions.len(), 2);
        assert!(config.conditions.contains(&Condition::ThreeSame));
        assert!(config.conditions.contains(&Condition::FiveSame));
        // Per condition: training (no interference), then two test phases
        // with interference; numbers before letters.
        for chunk in config.phases.chunks(3) {
            assert_eq!(chunk[0].phase, PhaseKind::Training);
            assert!(!chunk[0].interference);
            assert_eq!(chunk[0].task_type, TaskType::Number);
            assert!(chunk[1].interference && chunk[2].interference);
            assert_eq!(chunk[1].task_type, TaskType::Number);
            assert_eq!(chunk[2].task_type, TaskType::Letter);
        }
    }

    #[test]
    fn test_experiment3_anchor_condition_first() {
        for seed in 0..20 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let config = ExperimentConfig::experiment3(&mut rng).unwrap();
            assert_eq!(config.conditions[0], Condition::ThreeSame);
            assert_eq!(config.phases.len(), 6);
            assert_eq!(config.phases[0].condition, Some(Condition::ThreeSame));
            assert_eq!(config.phases[0].task_type, TaskType::Number);
            assert_eq!(config.phases[1].task_type, TaskType::Letter);
        }
    }

    #[test]
    fn test_experiment3_randomizes_tail() {
        let mut seen_five_second = false;
        let mut seen_diff_second = false;
        for seed in 0..40 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let config = ExperimentConfig::experiment3(&mut rng).unwrap();
            match config.conditions[1] {
                Condition::FiveSame => seen_five_second = true,
                Condition::ThreeDifferent => seen_diff_second = true,
                other => panic!("unexpected condition {:?}", other),
            }
        }
        assert!(seen_five_second && seen_diff_second);
    }

    #[test]
    fn test_progressive_weeks() {
        let w3 = ExperimentConfig::progressive(3).unwrap();
        assert_eq!(w3.phases[0].trials, 50);
        assert!(w3.phases[0].interference);
        assert_eq!(w3.phases[0].duration_ms, Some(5500));
        assert_eq!(w3.condition, Some(Condition::FiveSame));
        assert_eq!(
            ExperimentConfig::progressive(5).unwrap_err(),
            ConfigError::InvalidWeek(5)
        );
    }

    #[test]
    fn test_interference_level_validation() {
        assert!(ExperimentConfig::interference(4).is_ok());
        assert_eq!(
            ExperimentConfig::interference(0).unwrap_err(),
            ConfigError::InvalidInterferenceLevel(0)
        );
        assert_eq!(
            ExperimentConfig::interference(9).unwrap_err(),
            ConfigError::InvalidInterferenceLevel(9)
        );
    }

    #[test]
    fn test_next_incomplete_follows_list_order() {
        let mut config = ExperimentConfig::experiment1(Condition::ThreeSame).unwrap();
        assert_eq!(config.next_incomplete(), Some(0));
        config.complete_phase(0, PhaseResult::default());
        assert_eq!(config.next_incomplete(), Some(1));
        config.complete_phase(1, PhaseResult::default());
        config.complete_phase(2, PhaseResult::default());
        assert_eq!(config.next_incomplete(), None);
        config.reset_completion();
        assert_eq!(config.next_incomplete(), Some(0));
        assert!(config.phases.iter().all(|p| p.results.is_none()));
    }
}
