//! The session engine: drives one configured experiment from the first
//! trial to `AllComplete`.
//!
//! The engine is single-threaded and event-driven. The presentation layer
//! owns all wall-clock timing and calls in on exactly two events:
//!
//! 1. **Trial window opened** — [`Session::request_next_trial`] returns the
//!    next [`Trial`] to render, a [`Step::PhaseComplete`] marker when a phase
//!    boundary was crossed (so instructions can be shown before the next
//!    call), or [`Step::AllComplete`].
//! 2. **Trial window closed** — [`Session::report_response`] reports whether
//!    a response occurred and its reaction time. First response wins; a
//!    report with no trial open is a logged no-op, never a crash.
//!
//! In the metacognitive mode a confidence rating gates the next trial:
//! `request_next_trial` refuses until [`Session::record_confidence`] is
//! called. [`Session::abort`] discards all in-progress state back to the
//! configured baseline without committing a partial phase.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::adaptive::{
    adaptive_condition, policy_for, AdaptivePolicy, AdaptiveState, ConfidenceRecord, NBackHistory,
};
use crate::carryover::{apply_carryover, carryover_count};
use crate::constants::{COLOR_NAMES, GRID_CELLS, TRIAL_DURATION_MS};
use crate::error::StateError;
use crate::relation::{apply_interference_level, insert_color_pattern};
use crate::scoring::{classify, PhaseResult, TrialRecord};
use crate::trial_gen::{generate_phase_trials, generate_trial};
use crate::types::{
    Condition, ExperimentConfig, ExperimentKind, Grid, PhaseInfo, PhaseKind, PhaseSpec, SpeedMode,
    TaskType, Trial, WmLoadMode,
};

/// What a `request_next_trial` call produced.
#[derive(Debug)]
pub enum Step {
    /// Render this trial and report its outcome when the window closes.
    Trial(Trial),
    /// A phase just finished; `PhaseInfo` describes the next one. Show
    /// instructions, then call `request_next_trial` again.
    PhaseComplete(PhaseInfo),
    /// Every phase is complete; results are frozen.
    AllComplete,
}

/// One frozen phase in the session result list.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedPhase {
    pub phase: PhaseKind,
    pub task_type: TaskType,
    pub condition: Condition,
    pub results: PhaseResult,
}

/// Whole-session statistics fed to the cross-session progress tracker.
/// `accuracy` here is the plain fraction correct over every scored trial,
/// not the signed signal-detection statistic.
#[derive(Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    pub mode: ExperimentKind,
    pub accuracy: f64,
    pub total_trials: u32,
    pub total_correct: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peak_adaptive_level: Option<u32>,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum SessionState {
    /// Configured; no phase active.
    Idle,
    /// A phase is active and the next trial can be requested.
    InPhase,
    /// A trial has been handed out and awaits its outcome report.
    TrialOpen,
    /// Metacognitive mode: the last outcome awaits its confidence rating.
    AwaitingConfidence,
    /// All phases complete.
    Complete,
}

/// A configured, running experiment session.
pub struct Session {
    config: ExperimentConfig,
    state: SessionState,
    active_phase: Option<usize>,
    phase_trials: Vec<Trial>,
    trial_index: usize,
    previous_grid: Option<Grid>,
    current_results: PhaseResult,
    all_results: Vec<CompletedPhase>,
    pending: Option<Trial>,
    adaptive: AdaptiveState,
    policy: Option<Box<dyn AdaptivePolicy>>,
    peak_level: u32,
    nback_history: NBackHistory,
    confidence: Vec<ConfidenceRecord>,
    trial_duration_ms: Option<u32>,
    rng: SmallRng,
}

impl Session {
    pub fn new(config: ExperimentConfig, seed: u64) -> Self {
        Self::from_rng(config, SmallRng::seed_from_u64(seed))
    }

    pub fn from_rng(config: ExperimentConfig, rng: SmallRng) -> Self {
        let adaptive = initial_adaptive_state(&config);
        let policy = policy_for(config.kind);
        let duration = baseline_duration(&config, &adaptive);
        Session {
            peak_level: adaptive.level,
            state: SessionState::Idle,
            active_phase: None,
            phase_trials: Vec::new(),
            trial_index: 0,
            previous_grid: None,
            current_results: PhaseResult::default(),
            all_results: Vec::new(),
            pending: None,
            adaptive,
            policy,
            nback_history: NBackHistory::default(),
            confidence: Vec::new(),
            trial_duration_ms: duration,
            config,
            rng,
        }
    }

    // ── Inbound events ──────────────────────────────────────────────────

    /// Advance the session: the next trial, a phase boundary, or completion.
    pub fn request_next_trial(&mut self) -> Result<Step, StateError> {
        match self.state {
            SessionState::TrialOpen => return Err(StateError::TrialAlreadyOpen),
            SessionState::AwaitingConfidence => return Err(StateError::AwaitingConfidence),
            SessionState::Complete => return Ok(Step::AllComplete),
            SessionState::Idle => match self.config.next_incomplete() {
                None => {
                    self.state = SessionState::Complete;
                    return Ok(Step::AllComplete);
                }
                Some(index) => self.begin_phase(index),
            },
            SessionState::InPhase => {}
        }

        if self.trial_index >= self.phase_trials.len() {
            self.finish_phase();
            return Ok(match self.config.next_incomplete() {
                Some(index) => Step::PhaseComplete(self.phase_info(index)),
                None => {
                    self.state = SessionState::Complete;
                    Step::AllComplete
                }
            });
        }

        let trial = self.prepare_trial();
        self.pending = Some(trial.clone());
        self.state = SessionState::TrialOpen;
        Ok(Step::Trial(trial))
    }

    /// Close the open trial window with its outcome. Returns whether a trial
    /// was actually scored — a report with no trial open (including a second
    /// report for the same trial) is a no-op.
    pub fn report_response(&mut self, responded: bool, reaction_time_ms: Option<u32>) -> bool {
        if self.state != SessionState::TrialOpen {
            log::debug!("response report ignored: no trial open");
            return false;
        }
        let trial = self.pending.take().expect("pending trial while open");
        let active = self.active_phase.expect("active phase while trial open");
        let (phase_kind, task_type) = {
            let spec = &self.config.phases[active];
            (spec.phase, spec.task_type)
        };

        let outcome = classify(trial.has_relation, responded);
        self.current_results.record(TrialRecord {
            trial_number: self.trial_index as u32 + 1,
            phase: phase_kind,
            task_type,
            condition: trial.condition,
            has_relation: trial.has_relation,
            high_interference: trial.high_interference,
            responded,
            correct: outcome.is_correct(),
            reaction_time: if responded { reaction_time_ms } else { None },
        });

        if self.config.kind == ExperimentKind::Nback {
            self.nback_history
                .push(trial.grid, trial.has_relation, self.adaptive.nback_depth);
        }

        self.trial_index += 1;
        self.run_checkpoint();

        self.state = if self.config.kind == ExperimentKind::Metacognitive {
            SessionState::AwaitingConfidence
        } else {
            SessionState::InPhase
        };
        true
    }

    /// Metacognitive mode: attach a 1–5 confidence rating to the trial that
    /// just closed, releasing the next trial.
    pub fn record_confidence(&mut self, confidence: u8) -> Result<(), StateError> {
        if self.state != SessionState::AwaitingConfidence {
            return Err(StateError::NoConfidenceExpected);
        }
        if !(1..=5).contains(&confidence) {
            return Err(StateError::ConfidenceOutOfRange(confidence));
        }
        let correct = self
            .current_results
            .trial_data
            .last()
            .expect("scored trial before confidence")
            .correct;
        self.confidence.push(ConfidenceRecord {
            trial: self.trial_index as u32,
            confidence,
            correct,
        });
        self.state = SessionState::InPhase;
        Ok(())
    }

    /// Abandon the session: drop all in-progress and frozen results and
    /// return to the configured baseline. Nothing partial is committed.
    pub fn abort(&mut self) {
        log::debug!("session aborted");
        self.config.reset_completion();
        self.all_results.clear();
        self.current_results = PhaseResult::default();
        self.phase_trials.clear();
        self.trial_index = 0;
        self.active_phase = None;
        self.pending = None;
        self.previous_grid = None;
        self.confidence.clear();
        self.nback_history.clear();
        self.adaptive = initial_adaptive_state(&self.config);
        self.peak_level = self.adaptive.level;
        self.trial_duration_ms = baseline_duration(&self.config, &self.adaptive);
        self.state = SessionState::Idle;
    }

    // ── Observers ───────────────────────────────────────────────────────

    /// The response window the presentation layer should enforce, `None` for
    /// untimed trials.
    pub fn trial_duration_ms(&self) -> Option<u32> {
        self.trial_duration_ms
    }

    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    pub fn all_results(&self) -> &[CompletedPhase] {
        &self.all_results
    }

    pub fn adaptive(&self) -> &AdaptiveState {
        &self.adaptive
    }

    pub fn confidence_records(&self) -> &[ConfidenceRecord] {
        &self.confidence
    }

    /// Highest staircase level reached this session.
    pub fn peak_level(&self) -> u32 {
        self.peak_level
    }

    /// N-back secondary task: does the newest grid's relation status match
    /// the one `depth` trials back?
    pub fn nback_match(&self) -> Option<bool> {
        self.nback_history.is_match(self.adaptive.nback_depth)
    }

    pub fn is_complete(&self) -> bool {
        self.state == SessionState::Complete
    }

    /// 1-based number of the trial currently open (or next to open) within
    /// its phase, and the phase's trial count.
    pub fn trial_position(&self) -> (usize, usize) {
        (self.trial_index + 1, self.phase_trials.len())
    }

    /// Whole-session totals for the progress tracker.
    pub fn session_stats(&self) -> SessionStats {
        let mut total_trials = 0u32;
        let mut total_correct = 0u32;
        for phase in &self.all_results {
            total_trials += phase.results.total_trials();
            total_correct += phase.results.total_correct();
        }
        SessionStats {
            mode: self.config.kind,
            accuracy: if total_trials > 0 {
                total_correct as f64 / total_trials as f64
            } else {
                0.0
            },
            total_trials,
            total_correct,
            peak_adaptive_level: (self.config.kind == ExperimentKind::Adaptive)
                .then_some(self.peak_level),
        }
    }

    // ── Internals ───────────────────────────────────────────────────────

    fn begin_phase(&mut self, index: usize) {
        let spec = &self.config.phases[index];
        let fallback = self.config.condition_for(spec);
        let duration = self.phase_duration(spec);
        let trials = generate_phase_trials(spec, fallback, &mut self.rng);
        log::debug!(
            "phase {} started: {:?} {:?} ×{}",
            index,
            spec.phase,
            spec.task_type,
            trials.len()
        );
        self.phase_trials = trials;
        self.trial_index = 0;
        self.previous_grid = None;
        self.current_results = PhaseResult::default();
        self.trial_duration_ms = duration;
        self.active_phase = Some(index);
        self.state = SessionState::InPhase;
    }

    fn finish_phase(&mut self) {
        if let Some(index) = self.active_phase.take() {
            let results = std::mem::take(&mut self.current_results);
            let (phase, task_type, condition) = {
                let spec = &self.config.phases[index];
                (spec.phase, spec.task_type, self.config.condition_for(spec))
            };
            self.all_results.push(CompletedPhase {
                phase,
                task_type,
                condition,
                results: results.clone(),
            });
            self.config.complete_phase(index, results);
            log::debug!("phase {} complete", index);
        }
        self.previous_grid = None;
        self.state = SessionState::Idle;
    }

    fn phase_info(&self, index: usize) -> PhaseInfo {
        let spec = &self.config.phases[index];
        PhaseInfo {
            phase: spec.phase,
            task_type: spec.task_type,
            condition: self.config.condition_for(spec),
            trials: spec.trials,
        }
    }

    /// Decorate the pending trial: adaptive condition switch, mode overlays,
    /// then carryover — in that order, so carryover can disturb everything
    /// that came before it.
    fn prepare_trial(&mut self) -> Trial {
        let active = self.active_phase.expect("active phase");
        let (task_type, base_condition) = {
            let spec = &self.config.phases[active];
            (spec.task_type, self.config.condition_for(spec))
        };
        let alphabet = task_type.alphabet();
        let mut trial = self.phase_trials[self.trial_index].clone();

        match self.config.kind {
            ExperimentKind::Adaptive => {
                let condition = adaptive_condition(base_condition, self.adaptive.object_count);
                if condition != trial.condition {
                    trial = generate_trial(
                        alphabet,
                        condition,
                        trial.has_relation,
                        trial.high_interference,
                        &mut self.rng,
                    );
                }
            }
            ExperimentKind::Multirelational => {
                let mut colors: [u8; GRID_CELLS] =
                    std::array::from_fn(|_| self.rng.random_range(0..COLOR_NAMES.len()) as u8);
                if trial.has_relation && self.rng.random_bool(0.5) {
                    insert_color_pattern(&mut colors, &mut self.rng);
                }
                trial.colors = Some(colors);
            }
            ExperimentKind::Interference => {
                apply_interference_level(
                    &mut trial.grid,
                    alphabet,
                    self.adaptive.interference_level,
                    &mut self.rng,
                );
            }
            _ => {}
        }

        if self.trial_index > 0 {
            if let Some(previous) = self.previous_grid {
                let count = carryover_count(self.wm_mode(), &mut self.rng);
                if count > 0 {
                    apply_carryover(&mut trial.grid, &previous, count, &mut self.rng);
                }
            }
        }
        self.previous_grid = Some(trial.grid);
        trial
    }

    /// Run the adaptation checkpoint if this closed trial crossed a cadence
    /// boundary. Evaluated strictly after the append, so the policy always
    /// observes a fully-appended window.
    fn run_checkpoint(&mut self) {
        let closed = self.trial_index;
        if let Some(policy) = &self.policy {
            if closed % policy.cadence() == 0 {
                let window = self.current_results.rolling_window(policy.cadence());
                policy.adjust(&mut self.adaptive, &window);
                self.peak_level = self.peak_level.max(self.adaptive.level);
                if self.config.kind == ExperimentKind::Adaptive {
                    self.trial_duration_ms = Some(self.adaptive.trial_duration_ms);
                }
                log::debug!(
                    "{} checkpoint after {} trials: level {}",
                    policy.name(),
                    closed,
                    self.adaptive.level
                );
            }
        }
    }

    fn phase_duration(&self, spec: &PhaseSpec) -> Option<u32> {
        if let Some(ms) = spec.duration_ms {
            return Some(ms);
        }
        match self.config.kind {
            ExperimentKind::Adaptive => Some(self.adaptive.trial_duration_ms),
            ExperimentKind::Speed => self
                .config
                .speed_mode
                .unwrap_or(SpeedMode::Balanced)
                .duration_ms(),
            ExperimentKind::Interference if self.adaptive.interference_level >= 4 => Some(4000),
            _ => Some(TRIAL_DURATION_MS),
        }
    }

    fn wm_mode(&self) -> WmLoadMode {
        if self.config.kind == ExperimentKind::Wmload {
            self.config.wm_load_mode.unwrap_or(WmLoadMode::Medium)
        } else {
            WmLoadMode::Medium
        }
    }
}

fn initial_adaptive_state(config: &ExperimentConfig) -> AdaptiveState {
    AdaptiveState {
        interference_level: config.interference_level.unwrap_or(1),
        ..AdaptiveState::default()
    }
}

fn baseline_duration(config: &ExperimentConfig, adaptive: &AdaptiveState) -> Option<u32> {
    match config.kind {
        ExperimentKind::Adaptive => Some(adaptive.trial_duration_ms),
        ExperimentKind::Speed => config
            .speed_mode
            .unwrap_or(SpeedMode::Balanced)
            .duration_ms(),
        ExperimentKind::Progressive => config
            .phases
            .first()
            .and_then(|p| p.duration_ms)
            .or(Some(TRIAL_DURATION_MS)),
        ExperimentKind::Interference if adaptive.interference_level >= 4 => Some(4000),
        _ => Some(TRIAL_DURATION_MS),
    }
}
