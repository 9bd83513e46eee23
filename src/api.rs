// src/api.rs
//! HTTP boundary under `/gyu/reward`.
//!
//! Handlers validate input, hand the work to the engine on the blocking
//! pool, and wrap results as `{status, ...}` JSON. Validation failures are
//! 400 with a Korean message in `error`.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

use crate::engine::{AnalysisResult, RecommendationEngine};
use crate::history::{History, HistoryEntry};
use crate::keywords::DEFAULT_TOP_N;
use crate::logging::anon_hash;
use crate::matcher::Policy;
use crate::metrics;
use crate::text::join_texts;

pub const API_PREFIX: &str = "/gyu/reward";
pub const API_VERSION: &str = "1.0.0";

pub const ERR_NO_BODY: &str = "요청 데이터가 없습니다.";
pub const ERR_NO_COMMENTS: &str = "평가 코멘트가 없습니다.";
pub const ERR_NO_POLICIES: &str = "포상 정책이 없습니다.";
pub const ERR_NO_TEXT: &str = "텍스트가 없습니다.";

const DEFAULT_HISTORY_LIMIT: usize = 20;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<RecommendationEngine>,
    pub history: Arc<History>,
}

impl AppState {
    pub fn new(engine: RecommendationEngine) -> Self {
        Self {
            engine: Arc::new(engine),
            history: Arc::new(History::default()),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(health))
        .route("/recommend", post(recommend))
        .route("/keywords", post(keywords))
        .route("/similarity", post(similarity))
        .route("/debug/history", get(debug_history));

    Router::new()
        .nest(API_PREFIX, api)
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let body = json!({ "status": "error", "error": message.into() });
    (status, Json(body)).into_response()
}

fn bad_request(message: &str) -> Response {
    error_response(StatusCode::BAD_REQUEST, message)
}

/// Run engine work on the blocking pool; a panicked task becomes a 500.
async fn blocking<T, F>(f: F) -> Result<T, Response>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        error!(error = %e, "engine task failed");
        error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })
}

#[derive(Serialize)]
struct HealthOut {
    status: &'static str,
    model_type: &'static str,
    config_type: &'static str,
    version: &'static str,
}

async fn health(State(state): State<AppState>) -> Json<HealthOut> {
    Json(HealthOut {
        status: "ok",
        model_type: state.engine.model_type(),
        config_type: state.engine.strategy_kind().as_str(),
        version: API_VERSION,
    })
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    #[serde(default)]
    pub emp_id: Option<Value>,
    #[serde(default)]
    pub emp_name: Option<String>,
    #[serde(default)]
    pub avg_score: Option<f64>,
    /// Non-string entries (including `null`) are dropped before analysis.
    #[serde(default)]
    pub comments: Option<Vec<Value>>,
}

/// Absent and `null` fields are treated alike: both fail validation below.
/// Policies stay untyped here so one malformed entry cannot reject the batch.
#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    #[serde(default)]
    pub employee: Option<Employee>,
    #[serde(default)]
    pub policies: Option<Vec<Value>>,
}

/// String comments only, in order.
fn usable_comments(raw: Vec<Value>) -> Vec<String> {
    raw.into_iter()
        .filter_map(|v| match v {
            Value::String(s) => Some(s),
            _ => None,
        })
        .collect()
}

/// Typed policies; entries that do not deserialize are logged, counted and skipped.
fn usable_policies(raw: Vec<Value>) -> Vec<Policy> {
    raw.into_iter()
        .enumerate()
        .filter_map(|(index, v)| match serde_json::from_value::<Policy>(v) {
            Ok(p) => Some(p),
            Err(e) => {
                warn!(index, error = %e, "skipping malformed policy");
                metrics::record_policy_error();
                None
            }
        })
        .collect()
}

#[derive(Serialize)]
struct RecommendOut {
    status: &'static str,
    #[serde(flatten)]
    result: AnalysisResult,
}

async fn recommend(State(state): State<AppState>, payload: Result<Json<RecommendRequest>, JsonRejection>) -> Response {
    let Ok(Json(req)) = payload else {
        return bad_request(ERR_NO_BODY);
    };
    let employee = req.employee.unwrap_or_default();
    let raw_comments = employee.comments.unwrap_or_default();
    if raw_comments.is_empty() {
        return bad_request(ERR_NO_COMMENTS);
    }
    let raw_policies = req.policies.unwrap_or_default();
    if raw_policies.is_empty() {
        return bad_request(ERR_NO_POLICIES);
    }
    let comments = usable_comments(raw_comments);
    let policies = usable_policies(raw_policies);

    // Employee ids are personal data: log only their hash.
    let emp = employee
        .emp_id
        .as_ref()
        .map(|v| anon_hash(&v.to_string()))
        .unwrap_or_else(|| "unknown".to_string());
    info!(%emp, comments = comments.len(), policies = policies.len(), "recommend request");

    let engine = state.engine.clone();
    let outcome = blocking(move || {
        let result = engine.analyze(&comments, &policies);
        let text_id = anon_hash(&join_texts(&comments));
        (result, text_id)
    })
    .await;

    match outcome {
        Ok((result, text_id)) => {
            state.history.push(HistoryEntry::from_result(text_id, &result));
            Json(RecommendOut {
                status: "success",
                result,
            })
            .into_response()
        }
        Err(resp) => resp,
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct KeywordsReq {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    top_n: Option<usize>,
}

async fn keywords(State(state): State<AppState>, payload: Result<Json<KeywordsReq>, JsonRejection>) -> Response {
    let Ok(Json(req)) = payload else {
        return bad_request(ERR_NO_BODY);
    };
    let text = req.text.unwrap_or_default();
    if text.is_empty() {
        return bad_request(ERR_NO_TEXT);
    }
    let top_n = req.top_n.unwrap_or(DEFAULT_TOP_N);
    let keywords = state.engine.extract_keywords(&text, top_n);
    Json(json!({ "status": "success", "keywords": keywords })).into_response()
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SimilarityReq {
    #[serde(default)]
    text_a: String,
    #[serde(default)]
    text_b: String,
}

async fn similarity(State(state): State<AppState>, payload: Result<Json<SimilarityReq>, JsonRejection>) -> Response {
    let Ok(Json(req)) = payload else {
        return bad_request(ERR_NO_BODY);
    };
    let engine = state.engine.clone();
    match blocking(move || engine.similarity(&req.text_a, &req.text_b)).await {
        Ok(s) => Json(json!({ "status": "success", "similarity": s })).into_response(),
        Err(resp) => resp,
    }
}

#[derive(Deserialize)]
struct HistoryQuery {
    limit: Option<usize>,
}

async fn debug_history(State(state): State<AppState>, Query(q): Query<HistoryQuery>) -> Json<Vec<HistoryEntry>> {
    let limit = q.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    Json(state.history.snapshot_last_n(limit))
}
