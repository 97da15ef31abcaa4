// Test mocks for simulated sessions.
//
// One mock per collaborator trait:
// - MockBackend (SearchBackend): HashMap-based query→hits, doc_ref→document
// - ScriptedQueries (QueryStrategy): fixed queue of query texts
// - ScriptedClassifier (RelevanceClassifier): doc_id allow-list
// - RecordingLogger (InteractionLogger): one second per action, settable clock
//
// Plus fixture helpers for hits, topics, and memories with pre-judged snippets.
// The judgment oracle needs no mock: build a `Qrels` with `qrels()`.

use std::collections::{HashMap, HashSet, VecDeque};

use anyhow::{bail, Result};

use serpsim_common::{
    Action, ActionEvent, Document, InteractionEntry, Judgment, ResultItem, RevisionPolicy,
    SearchHit, SnippetStatus, Topic,
};

use crate::memory::SessionMemory;
use crate::qrels::Qrels;
use crate::traits::{InteractionLogger, QueryStrategy, RelevanceClassifier, SearchBackend};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub const TEST_TOPIC: &str = "303";

pub fn topic() -> Topic {
    Topic {
        id: TEST_TOPIC.to_string(),
        title: "Hubble Telescope Achievements".to_string(),
        description: "Identify positive accomplishments of the Hubble telescope.".to_string(),
    }
}

pub fn hit(doc_id: &str) -> SearchHit {
    SearchHit {
        doc_id: doc_id.to_string(),
        title: format!("Title of {doc_id}"),
        summary: format!("Summary of {doc_id}"),
        doc_ref: format!("ref-{doc_id}"),
    }
}

/// `n` hits with ids `{prefix}0 .. {prefix}{n-1}`.
pub fn hits(prefix: &str, n: usize) -> Vec<SearchHit> {
    (0..n).map(|i| hit(&format!("{prefix}{i}"))).collect()
}

/// Qrels from `(topic, doc_id, relevance)` triples.
pub fn qrels(judgments: &[(&str, &str, i32)]) -> Qrels {
    let mut qrels = Qrels::new();
    for (topic, doc, rel) in judgments {
        qrels.insert(topic, doc, *rel);
    }
    qrels
}

pub fn memory_with(backend: MockBackend, policy: RevisionPolicy) -> SessionMemory {
    SessionMemory::new(topic(), Box::new(backend), policy)
}

/// Memory with one issued query whose first snippets were examined and judged
/// in order (1 relevant, 0 nonrelevant, -1 unjudged). The SERP holds ten more
/// hits than were examined.
pub fn judged_memory(judgments: &[i8]) -> SessionMemory {
    build_judged_memory(judgments, false)
}

/// Like `judged_memory`, but every snippet's document is also read and marked
/// the way the state machine would (relevant snippets marked relevant).
pub fn judged_memory_with_documents(judgments: &[i8]) -> SessionMemory {
    build_judged_memory(judgments, true)
}

fn build_judged_memory(judgments: &[i8], read_documents: bool) -> SessionMemory {
    let backend = MockBackend::new().on_query("q", hits("d", judgments.len() + 10));
    let mut memory = memory_with(backend, RevisionPolicy::None);
    memory.record_action(Action::Query);
    memory.add_issued_query("q").unwrap();
    for &j in judgments {
        examine_next(&mut memory, judgment(j), read_documents);
    }
    memory
}

/// Examine the snippet under the cursor and record `judgment` for it.
pub fn examine_next(memory: &mut SessionMemory, judgment: Judgment, read_document: bool) {
    memory.record_action(Action::Snippet);
    memory.examine_snippet().unwrap();
    memory.advance_serp_cursor().unwrap();
    if judgment != Judgment::Unjudged {
        memory.judge_current_snippet(judgment).unwrap();
    }
    if read_document && judgment != Judgment::Unjudged {
        memory.record_action(Action::Doc);
        memory.examine_document().unwrap();
        let doc_id = memory.current_document().unwrap().doc_id.clone();
        if judgment.is_relevant() {
            memory.mark_relevant(&doc_id).unwrap();
        } else {
            memory.mark_irrelevant(&doc_id).unwrap();
        }
    }
}

pub fn judgment(value: i8) -> Judgment {
    match value {
        v if v > 0 => Judgment::Relevant,
        0 => Judgment::NonRelevant,
        _ => Judgment::Unjudged,
    }
}

// ---------------------------------------------------------------------------
// MockBackend
// ---------------------------------------------------------------------------

/// Returns registered hits per query text and an empty SERP for anything else.
/// Documents are synthesized for every registered hit unless removed.
pub struct MockBackend {
    results: HashMap<String, Vec<SearchHit>>,
    documents: HashMap<String, Document>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            results: HashMap::new(),
            documents: HashMap::new(),
        }
    }

    pub fn on_query(mut self, text: &str, hits: Vec<SearchHit>) -> Self {
        for hit in &hits {
            self.documents
                .entry(hit.doc_ref.clone())
                .or_insert_with(|| Document {
                    doc_id: hit.doc_id.clone(),
                    title: hit.title.clone(),
                    content: format!("Full text of {}", hit.doc_id),
                });
        }
        self.results.insert(text.to_string(), hits);
        self
    }

    pub fn on_document(mut self, doc_ref: &str, document: Document) -> Self {
        self.documents.insert(doc_ref.to_string(), document);
        self
    }

    /// Make `fetch_document` fail for this reference.
    pub fn without_document(mut self, doc_ref: &str) -> Self {
        self.documents.remove(doc_ref);
        self
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchBackend for MockBackend {
    fn issue_query(&self, text: &str, offset: usize, limit: usize) -> Result<Vec<SearchHit>> {
        Ok(self
            .results
            .get(text)
            .map(|hits| hits.iter().skip(offset).take(limit).cloned().collect())
            .unwrap_or_default())
    }

    fn fetch_document(&self, doc_ref: &str) -> Result<Document> {
        match self.documents.get(doc_ref) {
            Some(doc) => Ok(doc.clone()),
            None => bail!("MockBackend: no document registered for {doc_ref}"),
        }
    }
}

// ---------------------------------------------------------------------------
// ScriptedQueries
// ---------------------------------------------------------------------------

pub struct ScriptedQueries {
    queue: VecDeque<String>,
}

impl ScriptedQueries {
    pub fn new<I, S>(queries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            queue: queries.into_iter().map(Into::into).collect(),
        }
    }
}

impl QueryStrategy for ScriptedQueries {
    fn next_query(&mut self, _memory: &SessionMemory) -> Option<String> {
        self.queue.pop_front()
    }

    fn remaining(&self) -> Option<usize> {
        Some(self.queue.len())
    }
}

// ---------------------------------------------------------------------------
// ScriptedClassifier
// ---------------------------------------------------------------------------

/// Judges an item relevant iff its doc_id is in the allow-list.
pub struct ScriptedClassifier {
    relevant: HashSet<String>,
    calls: usize,
}

impl ScriptedClassifier {
    pub fn relevant<I, S>(doc_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            relevant: doc_ids.into_iter().map(Into::into).collect(),
            calls: 0,
        }
    }

    pub fn none() -> Self {
        Self::relevant(Vec::<String>::new())
    }

    pub fn calls(&self) -> usize {
        self.calls
    }
}

impl RelevanceClassifier for ScriptedClassifier {
    fn is_relevant(&mut self, item: &ResultItem) -> bool {
        self.calls += 1;
        self.relevant.contains(&item.doc_id)
    }
}

// ---------------------------------------------------------------------------
// RecordingLogger
// ---------------------------------------------------------------------------

/// Every action costs one second. Finishes after a fixed number of actions
/// or when queries run out. The clock can be overridden for stopping tests.
pub struct RecordingLogger {
    entries: Vec<InteractionEntry>,
    events: Vec<ActionEvent>,
    action_limit: usize,
    exhausted: bool,
    elapsed: f64,
    last_query: f64,
    last_interaction: f64,
    last_marked: f64,
    last_relevant_snippet: f64,
}

impl RecordingLogger {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            events: Vec::new(),
            action_limit: usize::MAX,
            exhausted: false,
            elapsed: 0.0,
            last_query: 0.0,
            last_interaction: 0.0,
            last_marked: 0.0,
            last_relevant_snippet: 0.0,
        }
    }

    pub fn finish_after(mut self, actions: usize) -> Self {
        self.action_limit = actions;
        self
    }

    /// Set the query and interaction clocks directly.
    pub fn with_clock(mut self, last_query: f64, last_interaction: f64) -> Self {
        self.last_query = last_query;
        self.last_interaction = last_interaction;
        self.elapsed = last_interaction;
        self
    }

    pub fn with_last_marked(mut self, time: f64) -> Self {
        self.last_marked = time;
        self
    }

    pub fn with_last_relevant_snippet(mut self, time: f64) -> Self {
        self.last_relevant_snippet = time;
        self
    }

    pub fn events(&self) -> &[ActionEvent] {
        &self.events
    }

    pub fn was_exhausted(&self) -> bool {
        self.exhausted
    }
}

impl Default for RecordingLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl InteractionLogger for RecordingLogger {
    fn log_action(&mut self, event: &ActionEvent) {
        self.elapsed += 1.0;
        self.last_interaction = self.elapsed;
        match event {
            ActionEvent::Query { .. } => self.last_query = self.elapsed,
            ActionEvent::Mark { .. } => self.last_marked = self.elapsed,
            ActionEvent::Snippet {
                status: SnippetStatus::SnippetRelevant,
                ..
            } => self.last_relevant_snippet = self.elapsed,
            _ => {}
        }
        self.entries.push(InteractionEntry::Action {
            action: event.action(),
            time_limit: self.action_limit as f64,
            elapsed: self.elapsed,
            detail: event.detail(),
        });
        self.events.push(event.clone());
    }

    fn log_info(&mut self, info_type: &str, text: &str) {
        self.entries.push(InteractionEntry::Info {
            info_type: info_type.to_string(),
            text: text.to_string(),
        });
    }

    fn is_finished(&self) -> bool {
        self.exhausted || self.events.len() >= self.action_limit
    }

    fn progress(&self) -> Option<f64> {
        None
    }

    fn queries_exhausted(&mut self) {
        self.exhausted = true;
    }

    fn last_query_time(&self) -> f64 {
        self.last_query
    }

    fn last_interaction_time(&self) -> f64 {
        self.last_interaction
    }

    fn last_marked_time(&self) -> f64 {
        self.last_marked
    }

    fn last_relevant_snippet_time(&self) -> f64 {
        self.last_relevant_snippet
    }

    fn entries(&self) -> &[InteractionEntry] {
        &self.entries
    }
}
