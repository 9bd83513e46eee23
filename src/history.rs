//! Bounded in-memory log of recent analyses, for `/debug/history`.
//!
//! Entries hold only anonymized text ids and result summaries.

use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::engine::AnalysisResult;
use crate::sentiment::Sentiment;

pub const DEFAULT_CAPACITY: usize = 500;
const MAX_CAPACITY: usize = 10_000;

#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub ts_unix: u64,
    pub text_id: String,
    pub sentiment: Sentiment,
    pub skipped: bool,
    pub top_policies: Vec<String>,
    pub top_scores: Vec<u32>,
}

impl HistoryEntry {
    pub fn from_result(text_id: String, result: &AnalysisResult) -> Self {
        let (top_policies, top_scores) = result
            .recommendations
            .iter()
            .take(3)
            .map(|r| (r.policy_name.clone(), r.match_score))
            .unzip();
        Self {
            ts_unix: now_unix(),
            text_id,
            sentiment: result.overall_sentiment,
            skipped: result.skip_reason.is_some(),
            top_policies,
            top_scores,
        }
    }
}

#[derive(Debug)]
pub struct History {
    inner: Mutex<VecDeque<HistoryEntry>>,
    cap: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl History {
    pub fn with_capacity(cap: usize) -> Self {
        let cap = cap.clamp(1, MAX_CAPACITY);
        Self {
            inner: Mutex::new(VecDeque::with_capacity(cap)),
            cap,
        }
    }

    pub fn capacity(&self) -> usize {
        self.cap
    }

    /// Append, evicting the oldest entry when full.
    pub fn push(&self, entry: HistoryEntry) {
        // A poisoned lock only means another push panicked; the deque is intact.
        let mut q = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        if q.len() == self.cap {
            q.pop_front();
        }
        q.push_back(entry);
    }

    /// Up to `n` most recent entries, oldest first.
    pub fn snapshot_last_n(&self, n: usize) -> Vec<HistoryEntry> {
        let q = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        let start = q.len().saturating_sub(n);
        q.iter().skip(start).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map(|q| q.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
