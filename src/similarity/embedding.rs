//! Dense sentence-embedding similarity.
//!
//! The encoder is loaded once when the engine is built and reused for every
//! request. `RemoteEncoder` talks to an embedding server over HTTP; tests and
//! embedders of this crate can plug in any other `SentenceEncoder`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info};

use crate::config::EmbeddingConfig;
use crate::error::{EngineError, SimilarityError};

/// Turns sentences into fixed-size vectors. One output row per input.
pub trait SentenceEncoder: Send + Sync {
    fn encode(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, SimilarityError>;
    fn model_name(&self) -> &str;
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

/// Client for an embedding server exposing `POST /api/embed`.
pub struct RemoteEncoder {
    client: reqwest::blocking::Client,
    endpoint: String,
    model: String,
}

impl fmt::Debug for RemoteEncoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteEncoder")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .finish()
    }
}

impl RemoteEncoder {
    /// Build the client and run a warm-up encode, so an unreachable server or
    /// unknown model fails here rather than on the first request.
    ///
    /// Uses the blocking client: call from a blocking context, never from
    /// inside an async task.
    pub fn connect(cfg: &EmbeddingConfig) -> Result<Self, EngineError> {
        let unavailable = |reason: String| EngineError::ModelUnavailable {
            model: cfg.model.clone(),
            reason,
        };
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .map_err(|e| unavailable(e.to_string()))?;
        let encoder = Self {
            client,
            endpoint: format!("{}/api/embed", cfg.base_url.trim_end_matches('/')),
            model: cfg.model.clone(),
        };

        let probe = encoder.encode(&["워밍업"]).map_err(|e| unavailable(e.to_string()))?;
        let dim = probe.first().map(Vec::len).unwrap_or(0);
        if dim == 0 {
            return Err(unavailable("server returned an empty embedding".into()));
        }
        info!(model = %encoder.model, endpoint = %encoder.endpoint, dim, "sentence encoder ready");
        Ok(encoder)
    }
}

impl SentenceEncoder for RemoteEncoder {
    fn encode(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, SimilarityError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let body = EmbedRequest {
            model: &self.model,
            input: texts,
        };
        let resp = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| SimilarityError::Encoder(e.to_string()))?;
        let parsed: EmbedResponse = resp
            .json()
            .map_err(|e| SimilarityError::Encoder(format!("bad response body: {e}")))?;
        if parsed.embeddings.len() != texts.len() {
            return Err(SimilarityError::Encoder(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                parsed.embeddings.len()
            )));
        }
        Ok(parsed.embeddings)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Wraps a non-reentrant encoder so only one `encode` runs at a time.
pub struct SerializedEncoder<E> {
    inner: Mutex<E>,
    model: String,
}

impl<E: SentenceEncoder> SerializedEncoder<E> {
    pub fn new(inner: E) -> Self {
        let model = inner.model_name().to_string();
        Self {
            inner: Mutex::new(inner),
            model,
        }
    }
}

impl<E: SentenceEncoder> SentenceEncoder for SerializedEncoder<E> {
    fn encode(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, SimilarityError> {
        let guard = self
            .inner
            .lock()
            .map_err(|_| SimilarityError::Encoder("encoder mutex poisoned".into()))?;
        guard.encode(texts)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Cosine of two sentence embeddings, nominally in [-1, 1].
#[derive(Clone)]
pub struct EmbeddingSimilarity {
    encoder: Arc<dyn SentenceEncoder>,
}

impl fmt::Debug for EmbeddingSimilarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbeddingSimilarity")
            .field("model", &self.encoder.model_name())
            .finish()
    }
}

impl EmbeddingSimilarity {
    pub fn new(encoder: Arc<dyn SentenceEncoder>) -> Self {
        Self { encoder }
    }

    /// Connect to the configured server, serializing calls if asked to.
    pub fn from_config(cfg: &EmbeddingConfig) -> Result<Self, EngineError> {
        let remote = RemoteEncoder::connect(cfg)?;
        let encoder: Arc<dyn SentenceEncoder> = if cfg.serialize {
            Arc::new(SerializedEncoder::new(remote))
        } else {
            Arc::new(remote)
        };
        Ok(Self::new(encoder))
    }

    pub fn model_name(&self) -> &str {
        self.encoder.model_name()
    }

    pub fn score(&self, a: &str, b: &str) -> Result<f64, SimilarityError> {
        let rows = self.encoder.encode(&[a, b])?;
        let (left, right) = match rows.as_slice() {
            [l, r] => (l, r),
            other => {
                return Err(SimilarityError::Encoder(format!(
                    "expected 2 embeddings, got {}",
                    other.len()
                )))
            }
        };
        if left.len() != right.len() {
            return Err(SimilarityError::DimensionMismatch {
                left: left.len(),
                right: right.len(),
            });
        }
        let l: Vec<f64> = left.iter().map(|&x| f64::from(x)).collect();
        let r: Vec<f64> = right.iter().map(|&x| f64::from(x)).collect();
        let s = super::cosine_similarity(&l, &r);
        debug!(model = self.encoder.model_name(), dim = l.len(), similarity = s, "embedding similarity");
        Ok(s)
    }
}
