//! Cross-session progress: streaks, badges, and capped histories.
//!
//! `ProgressData` is the long-lived aggregate a caller loads once at startup
//! and saves back after each completed training session. Every field has a
//! serde default so partially-written or older files still deserialize.
//!
//! Day streaks compare calendar dates: a session on the day after the last
//! one extends the streak, a same-day session leaves it alone, anything else
//! resets it to 1.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::adaptive::next_week;
use crate::constants::{ACCURACY_HISTORY_CAP, SESSION_HISTORY_CAP};
use crate::session::SessionStats;
use crate::types::ExperimentKind;

/// Earned-badge flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Badges {
    pub bronze: bool,
    pub silver: bool,
    pub gold: bool,
    pub platinum: bool,
    pub diamond: bool,
}

/// One line of the session history.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// ISO-8601 UTC timestamp.
    pub date: String,
    pub mode: ExperimentKind,
    pub accuracy: f64,
    pub total_trials: u32,
    pub total_correct: u32,
}

/// The persisted cross-session aggregate.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProgressData {
    pub sessions_completed: u32,
    pub total_trials: u64,
    /// Session accuracies, oldest first, capped at 20 entries.
    pub overall_accuracy: Vec<f64>,
    /// Calendar date (`YYYY-MM-DD`) of the most recent session.
    pub last_session_date: Option<NaiveDate>,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub badges: Badges,
    pub progressive_week: u8,
    pub interference_level: u8,
    pub adaptive_highest_level: u32,
    /// Capped at 50 entries, oldest dropped first.
    pub session_history: Vec<HistoryEntry>,
}

impl Default for ProgressData {
    fn default() -> Self {
        ProgressData {
            sessions_completed: 0,
            total_trials: 0,
            overall_accuracy: Vec::new(),
            last_session_date: None,
            current_streak: 0,
            longest_streak: 0,
            badges: Badges::default(),
            progressive_week: 1,
            interference_level: 1,
            adaptive_highest_level: 1,
            session_history: Vec::new(),
        }
    }
}

impl ProgressData {
    /// Fold one completed session into the aggregate.
    pub fn update(&mut self, stats: &SessionStats, now: DateTime<Utc>) {
        let today = now.date_naive();

        self.sessions_completed += 1;
        self.total_trials += stats.total_trials as u64;

        self.overall_accuracy.push(stats.accuracy);
        if self.overall_accuracy.len() > ACCURACY_HISTORY_CAP {
            self.overall_accuracy.remove(0);
        }

        self.update_streak(today);

        if let Some(level) = stats.peak_adaptive_level {
            self.adaptive_highest_level = self.adaptive_highest_level.max(level);
        }
        if stats.mode == ExperimentKind::Progressive {
            self.progressive_week = next_week(self.progressive_week);
        }

        self.update_badges();

        self.session_history.push(HistoryEntry {
            date: now.to_rfc3339(),
            mode: stats.mode,
            accuracy: stats.accuracy,
            total_trials: stats.total_trials,
            total_correct: stats.total_correct,
        });
        if self.session_history.len() > SESSION_HISTORY_CAP {
            self.session_history.remove(0);
        }
    }

    fn update_streak(&mut self, today: NaiveDate) {
        match self.last_session_date {
            Some(last) if last == today => {} // same day: no change
            Some(last) if last.succ_opt() == Some(today) => self.current_streak += 1,
            _ => self.current_streak = 1,
        }
        self.longest_streak = self.longest_streak.max(self.current_streak);
        self.last_session_date = Some(today);
    }

    /// Mean of the rolling accuracy history, 0 when empty.
    pub fn average_accuracy(&self) -> f64 {
        if self.overall_accuracy.is_empty() {
            return 0.0;
        }
        self.overall_accuracy.iter().sum::<f64>() / self.overall_accuracy.len() as f64
    }

    fn update_badges(&mut self) {
        let sessions = self.sessions_completed;
        let avg = self.average_accuracy();
        if sessions >= 5 {
            self.badges.bronze = true;
        }
        if sessions >= 15 && avg >= 0.5 {
            self.badges.silver = true;
        }
        if sessions >= 30 && avg >= 0.6 {
            self.badges.gold = true;
        }
        if sessions >= 50 && avg >= 0.7 {
            self.badges.platinum = true;
        }
        if sessions >= 100 && avg >= 0.75 {
            self.badges.diamond = true;
        }
    }
}
