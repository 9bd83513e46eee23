// tests/metrics.rs
use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use reward_recommender::api::{self, AppState};
use reward_recommender::config::RecommenderConfig;
use reward_recommender::metrics::{Metrics, ANALYSES_TOTAL, RECOMMENDATIONS_TOTAL, VETOED_TOTAL};
use reward_recommender::RecommendationEngine;

// Full in-process app. The engine is built before the recorder exists so
// descriptions must not depend on construction order.
fn build_app() -> Router {
    let engine = RecommendationEngine::from_config(&RecommenderConfig::default()).expect("engine");
    let metrics = Metrics::init().expect("install recorder");
    api::create_router(AppState::new(engine)).merge(metrics.router())
}

fn recommend(comments: &[&str]) -> Request<Body> {
    let payload = serde_json::json!({
        "employee": { "comments": comments },
        "policies": [{ "policyId": 1, "policyName": "팀워크상", "description": "협업과 소통" }]
    });
    Request::post("/gyu/reward/recommend")
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap()
}

#[tokio::test]
async fn metrics_endpoint_contains_pipeline_counters() {
    let app = build_app();

    let resp = app.clone().oneshot(recommend(&["팀원과 협업이 우수함"])).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = app.clone().oneshot(recommend(&["지각과 실수가 잦고 미흡함"])).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    // axum::body::to_bytes requires an explicit limit
    let body = body::to_bytes(resp.into_body(), 1_048_576).await.unwrap(); // 1 MiB
    let text = String::from_utf8(body.to_vec()).unwrap();

    for needle in [ANALYSES_TOTAL, VETOED_TOTAL, RECOMMENDATIONS_TOTAL, "strategy=\"lexical\""] {
        assert!(text.contains(needle), "missing `{needle}` in /metrics output:\n{text}");
    }
    for name in [ANALYSES_TOTAL, VETOED_TOTAL, RECOMMENDATIONS_TOTAL] {
        let help = format!("# HELP {name} ");
        assert!(text.contains(&help), "missing `{help}` in /metrics output:\n{text}");
    }
}

#[test]
fn init_is_reentrant() {
    // A second install would fail; init hands back the first handle instead.
    assert!(Metrics::init().is_ok());
    assert!(Metrics::init().is_ok());
}
