//! Axum HTTP server: drives one session on behalf of a browser front-end.
//!
//! The front-end owns rendering and wall-clock timing; it calls in on the
//! engine's two events and renders whatever comes back.
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | POST | `/configure` | Build an experiment and start a fresh session |
//! | POST | `/trial/next` | Request the next trial / phase marker |
//! | POST | `/trial/response` | Report the closed trial's outcome |
//! | POST | `/confidence` | Metacognitive confidence rating |
//! | POST | `/abort` | Discard the session's in-progress state |
//! | GET | `/export` | Download the structured result object |
//! | GET | `/progress` | Cross-session progress snapshot |

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};

use crate::error::ConfigError;
use crate::export::build_export;
use crate::progress::ProgressData;
use crate::session::{Session, Step};
use crate::storage::{load_progress, save_progress};
use crate::types::{Condition, ExperimentConfig, ExperimentKind, SpeedMode, WmLoadMode};

/// Shared server state: at most one live session, plus the progress store.
pub struct ServerState {
    pub session: Mutex<Option<Session>>,
    pub progress_path: PathBuf,
}

pub type AppState = Arc<ServerState>;

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/configure", post(handle_configure))
        .route("/trial/next", post(handle_next_trial))
        .route("/trial/response", post(handle_response))
        .route("/confidence", post(handle_confidence))
        .route("/abort", post(handle_abort))
        .route("/export", get(handle_export))
        .route("/progress", get(handle_progress))
        .layer(cors)
        .with_state(state)
}

// ── Request types ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigureRequest {
    #[serde(rename = "type")]
    kind: ExperimentKind,
    condition: Option<Condition>,
    speed_mode: Option<SpeedMode>,
    wm_load_mode: Option<WmLoadMode>,
    week: Option<u8>,
    interference_level: Option<u8>,
    seed: Option<u64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponseRequest {
    responded: bool,
    reaction_time_ms: Option<u32>,
}

#[derive(Deserialize)]
struct ConfidenceRequest {
    confidence: u8,
}

fn error_response(status: StatusCode, msg: &str) -> (StatusCode, Json<serde_json::Value>) {
    (status, Json(serde_json::json!({ "error": msg })))
}

type HandlerResult = Result<Json<serde_json::Value>, (StatusCode, Json<serde_json::Value>)>;

// ── Handlers ────────────────────────────────────────────────────────────────

async fn handle_health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "OK" }))
}

fn build_config(req: &ConfigureRequest, rng: &mut SmallRng) -> Result<ExperimentConfig, ConfigError> {
    match req.kind {
        ExperimentKind::Experiment1 => {
            ExperimentConfig::experiment1(req.condition.unwrap_or(Condition::ThreeSame))
        }
        ExperimentKind::Experiment2 => ExperimentConfig::experiment2(rng),
        ExperimentKind::Experiment3 => ExperimentConfig::experiment3(rng),
        ExperimentKind::Adaptive => ExperimentConfig::adaptive(),
        ExperimentKind::Progressive => ExperimentConfig::progressive(req.week.unwrap_or(1)),
        ExperimentKind::Speed => {
            ExperimentConfig::speed(req.speed_mode.unwrap_or(SpeedMode::Balanced))
        }
        ExperimentKind::Multirelational => ExperimentConfig::multirelational(),
        ExperimentKind::Nback => ExperimentConfig::nback(),
        ExperimentKind::Interference => {
            ExperimentConfig::interference(req.interference_level.unwrap_or(1))
        }
        ExperimentKind::Wmload => {
            ExperimentConfig::wm_load(req.wm_load_mode.unwrap_or(WmLoadMode::Medium))
        }
        ExperimentKind::Metacognitive => ExperimentConfig::metacognitive(),
    }
}

async fn handle_configure(
    State(state): State<AppState>,
    Json(req): Json<ConfigureRequest>,
) -> HandlerResult {
    let seed = req.seed.unwrap_or_else(|| SmallRng::from_os_rng().random());
    let mut rng = SmallRng::seed_from_u64(seed);
    let config = build_config(&req, &mut rng)
        .map_err(|e| error_response(StatusCode::BAD_REQUEST, &e.to_string()))?;

    let session = Session::from_rng(config, rng);
    let duration = session.trial_duration_ms();
    let config_json = serde_json::to_value(session.config()).expect("config serializes");
    *state.session.lock().expect("session lock") = Some(session);

    Ok(Json(serde_json::json!({
        "configured": true,
        "seed": seed,
        "durationMs": duration,
        "configuration": config_json,
    })))
}

async fn handle_next_trial(State(state): State<AppState>) -> HandlerResult {
    let mut guard = state.session.lock().expect("session lock");
    let session = guard
        .as_mut()
        .ok_or_else(|| error_response(StatusCode::CONFLICT, "no session configured"))?;

    let was_complete = session.is_complete();
    let step = session
        .request_next_trial()
        .map_err(|e| error_response(StatusCode::CONFLICT, &e.to_string()))?;

    let body = match step {
        Step::Trial(trial) => {
            let (number, total) = session.trial_position();
            serde_json::json!({
                "step": "trial",
                "trial": trial,
                "trialNumber": number,
                "totalTrials": total,
                "durationMs": session.trial_duration_ms(),
                "nbackMatch": session.nback_match(),
            })
        }
        Step::PhaseComplete(info) => serde_json::json!({
            "step": "phaseComplete",
            "next": info,
        }),
        Step::AllComplete => serde_json::json!({
            "step": "allComplete",
            "results": session.all_results(),
            "stats": session.session_stats(),
        }),
    };

    // Fold a finished training session into the progress store exactly once,
    // on the call that completed it.
    if !was_complete && session.is_complete() && session.config().kind.is_training_mode() {
        let stats = session.session_stats();
        let mut progress = load_progress(&state.progress_path);
        progress.update(&stats, Utc::now());
        if let Err(e) = save_progress(&state.progress_path, &progress) {
            log::warn!("failed to save progress: {}", e);
        }
    }

    Ok(Json(body))
}

async fn handle_response(
    State(state): State<AppState>,
    Json(req): Json<ResponseRequest>,
) -> HandlerResult {
    let mut guard = state.session.lock().expect("session lock");
    let session = guard
        .as_mut()
        .ok_or_else(|| error_response(StatusCode::CONFLICT, "no session configured"))?;
    let scored = session.report_response(req.responded, req.reaction_time_ms);
    Ok(Json(serde_json::json!({ "scored": scored })))
}

async fn handle_confidence(
    State(state): State<AppState>,
    Json(req): Json<ConfidenceRequest>,
) -> HandlerResult {
    let mut guard = state.session.lock().expect("session lock");
    let session = guard
        .as_mut()
        .ok_or_else(|| error_response(StatusCode::CONFLICT, "no session configured"))?;
    session
        .record_confidence(req.confidence)
        .map_err(|e| error_response(StatusCode::CONFLICT, &e.to_string()))?;
    Ok(Json(serde_json::json!({ "recorded": true })))
}

async fn handle_abort(State(state): State<AppState>) -> HandlerResult {
    let mut guard = state.session.lock().expect("session lock");
    let session = guard
        .as_mut()
        .ok_or_else(|| error_response(StatusCode::CONFLICT, "no session configured"))?;
    session.abort();
    Ok(Json(serde_json::json!({ "aborted": true })))
}

async fn handle_export(State(state): State<AppState>) -> HandlerResult {
    let guard = state.session.lock().expect("session lock");
    let session = guard
        .as_ref()
        .ok_or_else(|| error_response(StatusCode::CONFLICT, "no session configured"))?;
    let export = build_export(session, Utc::now());
    Ok(Json(
        serde_json::to_value(&export)
            .map_err(|_| error_response(StatusCode::INTERNAL_SERVER_ERROR, "export failed"))?,
    ))
}

async fn handle_progress(State(state): State<AppState>) -> impl IntoResponse {
    let progress: ProgressData = load_progress(&state.progress_path);
    let average = progress.average_accuracy();
    Json(serde_json::json!({
        "progress": progress,
        "averageAccuracy": average,
    }))
}
