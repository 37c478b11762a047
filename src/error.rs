//! Error taxonomy.
//!
//! Configuration problems fail fast when an experiment is built, never
//! mid-trial. Session misuse (responding with no trial open, advancing past a
//! pending confidence rating) surfaces as [`StateError`]. Storage corruption
//! is not represented here at all — progress reads recover to defaults
//! locally (see [`crate::storage`]).

use thiserror::Error;

/// Invalid experiment configuration, detected at build time.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("condition {condition} needs {needed} distinct symbols but the {task} alphabet holds {available}")]
    AlphabetTooSmall {
        condition: String,
        task: String,
        needed: usize,
        available: usize,
    },
    #[error("phase trial count must be nonzero")]
    EmptyPhase,
    #[error("progressive week must be 1-4, got {0}")]
    InvalidWeek(u8),
    #[error("interference level must be 1-4, got {0}")]
    InvalidInterferenceLevel(u8),
}

/// Session driven out of protocol order.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StateError {
    #[error("a trial is already open; report its outcome first")]
    TrialAlreadyOpen,
    #[error("a confidence rating is required before the next trial")]
    AwaitingConfidence,
    #[error("no trial outcome is awaiting a confidence rating")]
    NoConfidenceExpected,
    #[error("confidence must be 1-5, got {0}")]
    ConfidenceOutOfRange(u8),
}
