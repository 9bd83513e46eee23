// src/metrics.rs
//! Prometheus counters for the recommendation pipeline.

use anyhow::{Context, Result};
use axum::{routing::get, Router};
use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

pub const ANALYSES_TOTAL: &str = "reward_analyses_total";
pub const VETOED_TOTAL: &str = "reward_analyses_vetoed_total";
pub const RECOMMENDATIONS_TOTAL: &str = "reward_recommendations_total";
pub const POLICY_ERRORS_TOTAL: &str = "reward_policy_errors_total";
pub const ANALYZE_MS: &str = "reward_analyze_ms";

/// Metric descriptions; only land once a recorder is installed.
fn describe_all() {
    describe_counter!(ANALYSES_TOTAL, "Analyses run, by strategy.");
    describe_counter!(VETOED_TOTAL, "Analyses skipped by the negative-sentiment gate.");
    describe_counter!(RECOMMENDATIONS_TOTAL, "Recommendations returned after filtering.");
    describe_counter!(POLICY_ERRORS_TOTAL, "Malformed policies skipped during matching.");
    describe_histogram!(ANALYZE_MS, "Wall time of one analysis in milliseconds.");
}

pub(crate) fn record_analysis(strategy: &'static str, vetoed: bool, recommendations: usize, elapsed_ms: f64) {
    counter!(ANALYSES_TOTAL, "strategy" => strategy).increment(1);
    if vetoed {
        counter!(VETOED_TOTAL).increment(1);
    }
    counter!(RECOMMENDATIONS_TOTAL).increment(recommendations as u64);
    histogram!(ANALYZE_MS).record(elapsed_ms);
}

pub(crate) fn record_policy_error() {
    counter!(POLICY_ERRORS_TOTAL).increment(1);
}

#[derive(Clone)]
pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the process-wide Prometheus recorder and describe the metrics
    /// against it. Later calls reuse the first handle instead of failing.
    pub fn init() -> Result<Self> {
        static HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();
        let handle = HANDLE
            .get_or_try_init(|| {
                let handle = PrometheusBuilder::new()
                    .install_recorder()
                    .context("prometheus: install recorder")?;
                describe_all();
                Ok::<_, anyhow::Error>(handle)
            })?
            .clone();
        Ok(Self { handle })
    }

    /// Router exposing `/metrics` in the Prometheus exposition format.
    pub fn router<S>(&self) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}
