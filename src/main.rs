//! Reward Recommender: binary entrypoint
//! Loads configuration, builds the recommendation engine once, and serves the
//! Axum router (API + `/metrics`).

use anyhow::Context;
use shuttle_axum::ShuttleAxum;
use tracing::info;

use reward_recommender::api::{self, AppState};
use reward_recommender::config::RecommenderConfig;
use reward_recommender::engine::RecommendationEngine;
use reward_recommender::logging;
use reward_recommender::metrics::Metrics;

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    logging::init_tracing();

    let metrics = Metrics::init()?;
    let cfg = RecommenderConfig::load()?;

    // The embedding warm-up uses a blocking HTTP client; keep it off the
    // async workers.
    let engine = tokio::task::spawn_blocking(move || RecommendationEngine::from_config(&cfg))
        .await
        .context("engine construction task failed")?
        .context("building recommendation engine")?;
    info!(model_type = engine.model_type(), "engine loaded");

    let router = api::create_router(AppState::new(engine)).merge(metrics.router());

    Ok(router.into())
}
