// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.
//
// Covered:
// - GET  /gyu/reward/health
// - POST /gyu/reward/recommend  (success, veto, 400s, malformed entries)
// - POST /gyu/reward/keywords
// - POST /gyu/reward/similarity
// - GET  /gyu/reward/debug/history

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value as Json};
use tower::ServiceExt as _; // for `oneshot`

use reward_recommender::api::{self, AppState, ERR_NO_BODY, ERR_NO_COMMENTS, ERR_NO_POLICIES, ERR_NO_TEXT};
use reward_recommender::config::RecommenderConfig;
use reward_recommender::RecommendationEngine;

const BODY_LIMIT: usize = 1024 * 1024; // 1MB, safe for tests

fn test_state() -> AppState {
    let engine = RecommendationEngine::from_config(&RecommenderConfig::default()).expect("engine");
    AppState::new(engine)
}

/// Build the same Router the binary uses (minus `/metrics`).
fn test_router() -> Router {
    api::create_router(test_state())
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Json) {
    let resp = app.oneshot(req).await.expect("oneshot");
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT).await.expect("read body");
    let v = serde_json::from_slice(&bytes).unwrap_or(Json::Null);
    (status, v)
}

fn post_json(uri: &str, payload: &Json) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .expect("build POST")
}

fn recommend_payload() -> Json {
    json!({
        "employee": {
            "empId": "E001",
            "empName": "홍길동",
            "avgScore": 92.5,
            "comments": ["프로젝트 완료에 크게 기여함", "팀원들과 협업이 뛰어남"]
        },
        "policies": [
            {"policyId": 1, "policyName": "프로젝트 MVP", "description": "프로젝트 성공에 기여한 직원"},
            {"policyId": 2, "policyName": "팀워크상", "description": "협업과 소통이 뛰어난 직원"}
        ]
    })
}

#[tokio::test]
async fn health_reports_model_type() {
    let req = Request::builder()
        .method("GET")
        .uri("/gyu/reward/health")
        .body(Body::empty())
        .expect("build GET /health");
    let (status, v) = send(test_router(), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["status"], "ok");
    assert_eq!(v["model_type"], "TfidfRecommender");
    assert_eq!(v["config_type"], "lexical");
    assert_eq!(v["version"], "1.0.0");
}

#[tokio::test]
async fn recommend_returns_success_with_flattened_result() {
    let (status, v) = send(test_router(), post_json("/gyu/reward/recommend", &recommend_payload())).await;
    assert_eq!(status, StatusCode::OK, "body: {v}");
    assert_eq!(v["status"], "success");
    assert_eq!(v["overallSentiment"], "positive");
    let recs = v["recommendations"].as_array().expect("recommendations array");
    assert!(!recs.is_empty());
    assert!(recs.len() <= 3);
    assert!(v["extractedKeywords"].is_array());
    assert!(v.get("skipReason").is_none());
}

#[tokio::test]
async fn recommend_negative_comments_include_skip_reason() {
    let mut payload = recommend_payload();
    payload["employee"]["comments"] = json!(["업무 미흡, 지각과 실수가 잦음", "개선 필요"]);
    let (status, v) = send(test_router(), post_json("/gyu/reward/recommend", &payload)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["overallSentiment"], "negative");
    assert_eq!(v["recommendations"], json!([]));
    assert!(v["skipReason"].is_string());
}

#[tokio::test]
async fn recommend_validation_errors_are_400() {
    let cases = [
        (json!({"employee": {"comments": []}, "policies": [{"policyId": 1, "policyName": "팀워크상"}]}), ERR_NO_COMMENTS),
        (json!({"policies": [{"policyId": 1, "policyName": "팀워크상"}]}), ERR_NO_COMMENTS),
        (json!({"employee": {"comments": ["협업 우수"]}, "policies": []}), ERR_NO_POLICIES),
        (json!({"employee": {"comments": ["협업 우수"]}}), ERR_NO_POLICIES),
    ];
    for (payload, message) in cases {
        let (status, v) = send(test_router(), post_json("/gyu/reward/recommend", &payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "payload {payload}");
        assert_eq!(v["status"], "error");
        assert_eq!(v["error"], message);
    }
}

#[tokio::test]
async fn recommend_skips_malformed_policy_and_null_comment() {
    let mut cfg = RecommenderConfig::default();
    cfg.recommendation.min_match_score = 0;
    let engine = RecommendationEngine::from_config(&cfg).expect("engine");
    let app = api::create_router(AppState::new(engine));

    let payload = json!({
        "employee": { "comments": ["팀원들과 협업이 뛰어남", null, 7] },
        "policies": [
            {"policyId": 1, "policyName": 123},
            "not a policy",
            {"policyId": 2, "policyName": "팀워크상", "description": "협업과 소통이 뛰어난 직원"}
        ]
    });
    let (status, v) = send(app, post_json("/gyu/reward/recommend", &payload)).await;
    assert_eq!(status, StatusCode::OK, "body: {v}");
    assert_eq!(v["status"], "success");
    let ids: Vec<&Json> = v["recommendations"]
        .as_array()
        .expect("recommendations array")
        .iter()
        .map(|r| &r["policyId"])
        .collect();
    assert_eq!(ids, vec![&json!(2)]);
}

#[tokio::test]
async fn recommend_with_only_null_comments_is_empty_not_error() {
    let payload = json!({
        "employee": { "comments": [null] },
        "policies": [{"policyId": 1, "policyName": "팀워크상"}]
    });
    let (status, v) = send(test_router(), post_json("/gyu/reward/recommend", &payload)).await;
    assert_eq!(status, StatusCode::OK, "body: {v}");
    assert_eq!(v["recommendations"], json!([]));
    assert_eq!(v["overallSentiment"], "neutral");
}

#[tokio::test]
async fn recommend_unparseable_body_is_400() {
    let req = Request::builder()
        .method("POST")
        .uri("/gyu/reward/recommend")
        .header("content-type", "application/json")
        .body(Body::from("not json"))
        .expect("build POST");
    let (status, v) = send(test_router(), req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(v["error"], ERR_NO_BODY);
}

#[tokio::test]
async fn keywords_endpoint() {
    let (status, v) = send(
        test_router(),
        post_json("/gyu/reward/keywords", &json!({"text": "고객 응대 친절 고객 만족"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["status"], "success");
    assert_eq!(v["keywords"][0], "고객");

    let (status, v) = send(
        test_router(),
        post_json("/gyu/reward/keywords", &json!({"text": "고객 응대 친절 고객 만족", "topN": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["keywords"], json!(["고객"]));

    let (status, v) = send(test_router(), post_json("/gyu/reward/keywords", &json!({"text": ""}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(v["error"], ERR_NO_TEXT);
}

#[tokio::test]
async fn similarity_endpoint() {
    let (status, v) = send(
        test_router(),
        post_json("/gyu/reward/similarity", &json!({"textA": "협업 소통", "textB": "협업 소통"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let s = v["similarity"].as_f64().expect("similarity number");
    assert!((s - 1.0).abs() < 1e-9);
}

#[tokio::test]
async fn history_records_recent_analyses() {
    let state = test_state();
    let app = api::create_router(state.clone());
    let (status, _) = send(app.clone(), post_json("/gyu/reward/recommend", &recommend_payload())).await;
    assert_eq!(status, StatusCode::OK);

    let req = Request::builder()
        .method("GET")
        .uri("/gyu/reward/debug/history?limit=5")
        .body(Body::empty())
        .expect("build GET /debug/history");
    let (status, v) = send(app, req).await;
    assert_eq!(status, StatusCode::OK);
    let rows = v.as_array().expect("array");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["sentiment"], "positive");
    assert_eq!(rows[0]["text_id"].as_str().map(str::len), Some(12));
    // Raw comment text never lands in history.
    assert!(!v.to_string().contains("협업이"));
    assert_eq!(state.history.len(), 1);
}
