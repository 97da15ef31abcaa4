// Trait abstractions for the collaborators a simulated session talks to.
//
// SearchBackend: issues queries and fetches documents.
// QueryStrategy: supplies the next query text, or None when exhausted.
// RelevanceClassifier: one instance judges snippets, another documents.
// JudgmentOracle: ground-truth qrels lookups with the topic "0" fallback.
// InteractionLogger: action costs, the finished check, and the session clock.
//
// Everything is synchronous: a session performs one blocking action per tick.
// Mocks for all of these live in `crate::testing`.

use anyhow::Result;

use serpsim_common::{ActionEvent, Document, InteractionEntry, ResultItem, SearchHit};

use crate::memory::SessionMemory;

// ---------------------------------------------------------------------------
// SearchBackend
// ---------------------------------------------------------------------------

pub trait SearchBackend {
    /// Run a query and return up to `limit` ranked hits starting at `offset`.
    fn issue_query(&self, text: &str, offset: usize, limit: usize) -> Result<Vec<SearchHit>>;

    /// Fetch the full document behind a hit's `doc_ref`.
    fn fetch_document(&self, doc_ref: &str) -> Result<Document>;
}

// ---------------------------------------------------------------------------
// QueryStrategy
// ---------------------------------------------------------------------------

pub trait QueryStrategy {
    /// Next query to issue. `None` means the strategy is exhausted.
    fn next_query(&mut self, memory: &SessionMemory) -> Option<String>;

    /// Queries left to issue, if the strategy knows.
    fn remaining(&self) -> Option<usize> {
        None
    }
}

// ---------------------------------------------------------------------------
// RelevanceClassifier
// ---------------------------------------------------------------------------

pub trait RelevanceClassifier {
    fn is_relevant(&mut self, item: &ResultItem) -> bool;
}

// ---------------------------------------------------------------------------
// JudgmentOracle
// ---------------------------------------------------------------------------

/// Topic id holding pre-rolled judgments used when a topic has none.
pub const FALLBACK_TOPIC: &str = "0";

pub trait JudgmentOracle: Send + Sync {
    /// Raw judgment for a (topic, document) pair, if one exists.
    fn lookup(&self, topic_id: &str, doc_id: &str) -> Option<i32>;

    /// Topic judgment, then the fallback topic, then nonrelevant.
    fn judgment_with_fallback(&self, topic_id: &str, doc_id: &str) -> i32 {
        self.lookup(topic_id, doc_id)
            .or_else(|| self.lookup(FALLBACK_TOPIC, doc_id))
            .unwrap_or(0)
    }

    /// Fallback judgment clamped to {0, 1}.
    fn binary_judgment(&self, topic_id: &str, doc_id: &str) -> u32 {
        self.judgment_with_fallback(topic_id, doc_id).clamp(0, 1) as u32
    }
}

// ---------------------------------------------------------------------------
// InteractionLogger
// ---------------------------------------------------------------------------

pub trait InteractionLogger {
    fn log_action(&mut self, event: &ActionEvent);

    /// Free-text informational entry (e.g. SERP_END_REACHED).
    fn log_info(&mut self, info_type: &str, text: &str);

    /// Whether the session should stop (budget spent, goal met, queries exhausted).
    fn is_finished(&self) -> bool;

    /// Progress through the session in [0, 1], if it can be determined.
    fn progress(&self) -> Option<f64>;

    /// Called by the state machine when the query strategy has nothing left.
    fn queries_exhausted(&mut self);

    // --- Session clock (seconds since the session started) ---

    fn last_query_time(&self) -> f64;

    fn last_interaction_time(&self) -> f64;

    fn last_marked_time(&self) -> f64;

    fn last_relevant_snippet_time(&self) -> f64;

    /// Everything logged so far, in order.
    fn entries(&self) -> &[InteractionEntry];
}
