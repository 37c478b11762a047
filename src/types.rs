//! Core data types: grid cells, conditions, phase specifications, and the
//! experiment configuration.
//!
//! Serde renames mirror the JSON shape of the task's result exports, so a
//! serialized configuration or phase result is field-compatible with
//! previously downloaded result files (`taskType`, `hasRelation`,
//! `three-same`, …).

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::constants::{CONSONANTS, DIGITS, GRID_CELLS};

// ── Cells and grids ─────────────────────────────────────────────────────────

/// One 3-symbol cell string. Symbols are ASCII members of the active
/// alphabet; only the last symbol carries relation information.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellString(pub [u8; 3]);

impl CellString {
    /// The relation-carrying last symbol.
    #[inline(always)]
    pub fn last(&self) -> u8 {
        self.0[2]
    }

    /// Replace the last symbol, preserving the two-symbol prefix.
    #[inline(always)]
    pub fn with_last(self, symbol: u8) -> Self {
        CellString([self.0[0], self.0[1], symbol])
    }
}

impl fmt::Display for CellString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.0 {
            write!(f, "{}", b as char)?;
        }
        Ok(())
    }
}

impl fmt::Debug for CellString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", self)
    }
}

impl Serialize for CellString {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for CellString {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CellVisitor;
        impl Visitor<'_> for CellVisitor {
            type Value = CellString;
            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a 3-character ASCII cell string")
            }
            fn visit_str<E: de::Error>(self, v: &str) -> Result<CellString, E> {
                let bytes = v.as_bytes();
                if bytes.len() != 3 {
                    return Err(E::custom(format!("cell string must be 3 chars, got {:?}", v)));
                }
                Ok(CellString([bytes[0], bytes[1], bytes[2]]))
            }
        }
        deserializer.deserialize_str(CellVisitor)
    }
}

/// A 3×3 grid in row-major order.
pub type Grid = [CellString; GRID_CELLS];

// ── Task discriminators ─────────────────────────────────────────────────────

/// Which alphabet a phase draws its cell strings from.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    Letter,
    Number,
}

impl TaskType {
    /// The 10-symbol alphabet for this task type.
    pub fn alphabet(self) -> &'static [u8; 10] {
        match self {
            TaskType::Letter => &CONSONANTS,
            TaskType::Number => &DIGITS,
        }
    }
}

/// Training phases exist to practice the rule; test phases are scored the
/// same way but are the ones an analysis would use.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseKind {
    Training,
    Test,
}

/// Relation condition: pattern shape × same-vs-distinct constraint on the
/// pattern cells' last symbols.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Condition {
    ThreeSame,
    FiveSame,
    SevenSame,
    ThreeDifferent,
    FiveDifferent,
}

impl Condition {
    /// Number of cells in this condition's patterns.
    pub fn pattern_len(self) -> usize {
        match self {
            Condition::ThreeSame | Condition::ThreeDifferent => 3,
            Condition::FiveSame | Condition::FiveDifferent => 5,
            Condition::SevenSame => 7,
        }
    }

    /// Whether the pattern cells must all end in distinct symbols (as opposed
    /// to one shared symbol).
    pub fn requires_distinct(self) -> bool {
        matches!(self, Condition::ThreeDifferent | Condition::FiveDifferent)
    }

    /// Whether the high-interference overlay applies to this condition.
    pub fn supports_interference(self) -> bool {
        matches!(self, Condition::ThreeSame | Condition::FiveSame)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Condition::ThreeSame => "three-same",
            Condition::FiveSame => "five-same",
            Condition::SevenSame => "seven-same",
            Condition::ThreeDifferent => "three-different",
            Condition::FiveDifferent => "five-different",
        };
        f.write_str(s)
    }
}

/// Object count for progressive weeks. `Mixed` draws a three- or five-object
/// condition per trial.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectCount {
    Three,
    Five,
    Seven,
    Mixed,
}

impl ObjectCount {
    /// The fixed condition this object count maps to, if it has one.
    pub fn fixed_condition(self) -> Option<Condition> {
        match self {
            ObjectCount::Three => Some(Condition::ThreeSame),
            ObjectCount::Five => Some(Condition::FiveSame),
            ObjectCount::Seven => Some(Condition::SevenSame),
            ObjectCount::Mixed => None,
        }
    }
}

/// Speed-accuracy tradeoff setting. `Accuracy` removes the response window.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeedMode {
    Accuracy,
    Balanced,
    Speed,
    Blitz,
}

impl SpeedMode {
    /// Response window for this mode, `None` = untimed.
    pub fn duration_ms(self) -> Option<u32> {
        match self {
            SpeedMode::Accuracy => None,
            SpeedMode::Balanced => Some(5500),
            SpeedMode::Speed => Some(3000),
            SpeedMode::Blitz => Some(2000),
        }
    }
}

/// Working-memory-load setting controlling trial-to-trial carryover.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WmLoadMode {
    Easy,
    Medium,
    Hard,
    Extreme,
}

/// Experiment family: the three replication protocols plus the training
/// modes.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperimentKind {
    Experiment1,
    Experiment2,
    Experiment3,
    Adaptive,
    Progressive,
    Speed,
    Multirelational,
    Nback,
    Interference,
    Wmload,
    Metacognitive,
}

impl ExperimentKind {
    /// Training modes feed the cross-session progress tracker; the three
    /// replication protocols do not.
    pub fn is_training_mode(self) -> bool {
        !matches!(
            self,
            ExperimentKind::Experiment1 | ExperimentKind::Experiment2 | ExperimentKind::Experiment3
        )
    }
}

// ── Trials ──────────────────────────────────────────────────────────────────

/// One generated trial. Immutable once scored.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Trial {
    pub grid: Grid,
    pub has_relation: bool,
    pub condition: Condition,
    pub high_interference: bool,
    /// Color-overlay indices into [`crate::constants::COLOR_NAMES`]
    /// (multirelational mode only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colors: Option<[u8; GRID_CELLS]>,
}

// ── Phase specifications ────────────────────────────────────────────────────

/// One scheduled phase: kind, task type, trial count, and condition, plus the
/// completion bookkeeping the scheduler maintains.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseSpec {
    pub phase: PhaseKind,
    pub task_type: TaskType,
    pub trials: u32,
    /// Per-phase condition; `None` falls back to the experiment-level one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
    /// Object count override (progressive weeks).
    #[serde(
        rename = "numObjects",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub objects: Option<ObjectCount>,
    /// Response-window override in ms (progressive weeks).
    #[serde(rename = "duration", default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u32>,
    /// Whether the second half of each relation/no-relation group carries the
    /// high-interference overlay.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub interference: bool,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<crate::scoring::PhaseResult>,
}

impl PhaseSpec {
    pub fn new(phase: PhaseKind, task_type: TaskType, trials: u32) -> Self {
        PhaseSpec {
            phase,
            task_type,
            trials,
            condition: None,
            objects: None,
            duration_ms: None,
            interference: false,
            completed: false,
            results: None,
        }
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }
}

/// What a caller needs to render phase instructions.
#[derive(Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseInfo {
    pub phase: PhaseKind,
    pub task_type: TaskType,
    pub condition: Condition,
    pub trials: u32,
}

// ── Experiment configuration ────────────────────────────────────────────────

/// Full experiment configuration: family discriminator, condition order, and
/// the ordered phase list. Built by the constructors in
/// [`crate::scheduler`]; phase completion state accumulates in place.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperimentConfig {
    #[serde(rename = "type")]
    pub kind: ExperimentKind,
    /// Experiment-level condition (experiment 1 and the training modes).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
    /// Randomized condition order (experiments 2 and 3).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
    pub phases: Vec<PhaseSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub week: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed_mode: Option<SpeedMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wm_load_mode: Option<WmLoadMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interference_level: Option<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_string_roundtrip() {
        let c = CellString(*b"ABX");
        assert_eq!(c.to_string(), "ABX");
        assert_eq!(c.last(), b'X');
        assert_eq!(c.with_last(b'Q').to_string(), "ABQ");
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(json, "\"ABX\"");
        let back: CellString = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn test_condition_serde_names() {
        assert_eq!(
            serde_json::to_string(&Condition::ThreeSame).unwrap(),
            "\"three-same\""
        );
        assert_eq!(
            serde_json::to_string(&Condition::FiveDifferent).unwrap(),
            "\"five-different\""
        );
        assert_eq!(
            serde_json::to_string(&ExperimentKind::Experiment2).unwrap(),
            "\"experiment2\""
        );
        assert_eq!(
            serde_json::to_string(&TaskType::Letter).unwrap(),
            "\"letter\""
        );
    }

    #[test]
    fn test_condition_properties() {
        assert_eq!(Condition::ThreeSame.pattern_len(), 3);
        assert_eq!(Condition::SevenSame.pattern_len(), 7);
        assert!(Condition::FiveDifferent.requires_distinct());
        assert!(!Condition::FiveSame.requires_distinct());
        assert!(Condition::FiveSame.supports_interference());
        assert!(!Condition::ThreeDifferent.supports_interference());
    }

    #[test]
    fn test_speed_mode_durations() {
        assert_eq!(SpeedMode::Accuracy.duration_ms(), None);
        assert_eq!(SpeedMode::Balanced.duration_ms(), Some(5500));
        assert_eq!(SpeedMode::Speed.duration_ms(), Some(3000));
        assert_eq!(SpeedMode::Blitz.duration_ms(), Some(2000));
    }
}
