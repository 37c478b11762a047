//! Structured result export.
//!
//! The export object is `{experiment, timestamp, configuration, allResults,
//! summary}` — field names and nesting match the files the task has always
//! produced, so downstream analysis scripts keep working. The timestamp is
//! injected by the caller; the engine never reads a clock.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::session::{CompletedPhase, Session};
use crate::types::{ExperimentConfig, ExperimentKind};

/// Per-condition/task summary line.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryEntry {
    pub accuracy: f64,
    pub hits: u32,
    pub misses: u32,
    pub false_alarms: u32,
    pub correct_rejections: u32,
    #[serde(rename = "meanRT")]
    pub mean_rt: f64,
}

/// The full downloadable result object.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsExport {
    pub experiment: ExperimentKind,
    /// ISO-8601 UTC timestamp.
    pub timestamp: String,
    pub configuration: ExperimentConfig,
    pub all_results: Vec<CompletedPhase>,
    /// Keyed by `"{condition}_{taskType}"`, e.g. `"three-same_letter"`.
    pub summary: BTreeMap<String, SummaryEntry>,
}

/// Build the export object from a session's frozen results.
pub fn build_export(session: &Session, timestamp: DateTime<Utc>) -> ResultsExport {
    ResultsExport {
        experiment: session.config().kind,
        timestamp: timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
        configuration: session.config().clone(),
        all_results: session.all_results().to_vec(),
        summary: build_summary(session.all_results()),
    }
}

fn build_summary(all_results: &[CompletedPhase]) -> BTreeMap<String, SummaryEntry> {
    let mut summary = BTreeMap::new();
    for phase in all_results {
        let task = match phase.task_type {
            crate::types::TaskType::Letter => "letter",
            crate::types::TaskType::Number => "number",
        };
        let key = format!("{}_{}", phase.condition, task);
        let r = &phase.results;
        summary.insert(
            key,
            SummaryEntry {
                accuracy: r.accuracy(),
                hits: r.hits,
                misses: r.misses,
                false_alarms: r.false_alarms,
                correct_rejections: r.correct_rejections,
                mean_rt: r.mean_reaction_time(),
            },
        );
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Step;
    use crate::types::Condition;
    use chrono::TimeZone;

    fn completed_session() -> Session {
        let config = ExperimentConfig::experiment1(Condition::ThreeSame).unwrap();
        let mut session = Session::new(config, 99);
        loop {
            match session.request_next_trial().unwrap() {
                Step::Trial(trial) => {
                    let respond = trial.has_relation;
                    session.report_response(respond, respond.then_some(1100));
                }
                Step::PhaseComplete(_) => {}
                Step::AllComplete => break,
            }
        }
        session
    }

    #[test]
    fn test_export_field_names() {
        let session = completed_session();
        let ts = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let export = build_export(&session, ts);
        let json = serde_json::to_value(&export).unwrap();

        assert!(json.get("experiment").is_some());
        assert_eq!(json["experiment"], "experiment1");
        assert!(json.get("timestamp").is_some());
        assert!(json.get("configuration").is_some());
        assert!(json.get("allResults").is_some());
        assert!(json.get("summary").is_some());

        let first = &json["allResults"][0];
        assert!(first.get("taskType").is_some());
        let results = &first["results"];
        for key in [
            "hits",
            "misses",
            "falseAlarms",
            "correctRejections",
            "reactionTimes",
            "trialData",
        ] {
            assert!(results.get(key).is_some(), "missing key {key}");
        }
        let record = &results["trialData"][0];
        for key in [
            "trialNumber",
            "phase",
            "taskType",
            "condition",
            "hasRelation",
            "highInterference",
            "responded",
            "correct",
            "reactionTime",
        ] {
            assert!(record.get(key).is_some(), "missing key {key}");
        }
    }

    #[test]
    fn test_summary_keys_and_stats() {
        let session = completed_session();
        let ts = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let export = build_export(&session, ts);
        assert!(export.summary.contains_key("three-same_letter"));
        assert!(export.summary.contains_key("three-same_number"));
        let entry = &export.summary["three-same_number"];
        assert!((entry.accuracy - 1.0).abs() < 1e-12);
        assert_eq!(entry.misses, 0);
        let json = serde_json::to_value(&export.summary["three-same_letter"]).unwrap();
        assert!(json.get("falseAlarms").is_some());
        assert!(json.get("meanRT").is_some());
    }
}
