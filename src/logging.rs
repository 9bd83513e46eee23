// src/logging.rs
//! Tracing setup and log redaction helpers.
//!
//! Comment text is personal data. Logs identify a text only by
//! `anon_hash`, never by content.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const DEFAULT_FILTER: &str = "reward_recommender=info,warn";

/// Install the global subscriber. `RUST_LOG` controls filtering
/// (default `reward_recommender=info,warn`); `LOG_FORMAT=json` switches to
/// JSON lines. Safe to call more than once: later calls are no-ops.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    let result = if json {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer().compact()).try_init()
    };
    if result.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

/// Short stable id for a text: first 6 bytes of SHA-256, hex.
pub fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    use std::fmt::Write as _;

    let digest = Sha256::digest(text.as_bytes());
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        let _ = write!(&mut out, "{b:02x}");
    }
    out
}

/// First `max` items rendered as strings, for bounded log fields.
pub fn truncate_vec<T: ToString>(v: &[T], max: usize) -> Vec<String> {
    v.iter().take(max).map(ToString::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anon_hash_is_short_stable_and_opaque() {
        let a = anon_hash("프로젝트를 성공적으로 완료했습니다");
        assert_eq!(a.len(), 12);
        assert_eq!(a, anon_hash("프로젝트를 성공적으로 완료했습니다"));
        assert_ne!(a, anon_hash("다른 텍스트"));
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn truncate_vec_caps_length() {
        assert_eq!(truncate_vec(&[1, 2, 3], 2), vec!["1", "2"]);
        assert!(truncate_vec::<u8>(&[], 3).is_empty());
    }

    #[test]
    fn init_twice_does_not_panic() {
        init_tracing();
        init_tracing();
    }
}
