//! SessionMemory: everything a simulated searcher has observed in a session.
//!
//! Lifetime snippet/document accumulators are single vectors; the
//! "current query" views are the suffixes that start where the current query
//! cycle began. Retroactive judgment revisions are therefore visible through
//! both views.

use tracing::debug;

use serpsim_common::error::SimResult;
use serpsim_common::{
    Action, Document, Judgment, Query, QueryDepth, ResultItem, RevisionPolicy, SearchHit,
    SerpImpression, SessionReport, SimError, Topic,
};

use crate::traits::SearchBackend;

/// Page size requested from the backend for every query.
pub const DEFAULT_PAGE_SIZE: usize = 1000;

pub struct SessionMemory {
    topic: Topic,
    backend: Box<dyn SearchBackend>,
    revision_policy: RevisionPolicy,
    page_size: usize,

    actions: Vec<Action>,
    issued_queries: Vec<Query>,
    depths: Vec<QueryDepth>,

    snippets: Vec<ResultItem>,
    documents: Vec<ResultItem>,
    /// Index into `snippets` where the current query's snippets start.
    snippets_from: usize,
    /// Index into `documents` where the current query's documents start.
    documents_from: usize,

    current_snippet: Option<usize>,
    current_document: Option<Document>,

    relevant_documents: Vec<String>,
    irrelevant_documents: Vec<String>,

    serp_cursor: usize,
    impressions: Vec<SerpImpression>,
}

impl SessionMemory {
    pub fn new(topic: Topic, backend: Box<dyn SearchBackend>, revision_policy: RevisionPolicy) -> Self {
        Self {
            topic,
            backend,
            revision_policy,
            page_size: DEFAULT_PAGE_SIZE,
            actions: Vec::new(),
            issued_queries: Vec::new(),
            depths: Vec::new(),
            snippets: Vec::new(),
            documents: Vec::new(),
            snippets_from: 0,
            documents_from: 0,
            current_snippet: None,
            current_document: None,
            relevant_documents: Vec::new(),
            irrelevant_documents: Vec::new(),
            serp_cursor: 0,
            impressions: Vec::new(),
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    // --- Actions ---

    /// Append an action to the history. QUERY starts a new query cycle:
    /// the previous cycle's depth is archived and current views are reset.
    pub fn record_action(&mut self, action: Action) {
        self.actions.push(action);
        if action == Action::Query {
            self.begin_query_cycle();
        }
    }

    fn begin_query_cycle(&mut self) {
        if self.issued_queries.len() > self.depths.len() {
            let depth = self.current_depth();
            debug!(snippets = depth.snippets, documents = depth.documents, "Archived query depth");
            self.depths.push(depth);
        }
        self.snippets_from = self.snippets.len();
        self.documents_from = self.documents.len();
        self.current_snippet = None;
        self.current_document = None;
        self.serp_cursor = 0;
    }

    pub fn last_action(&self) -> Option<Action> {
        self.actions.last().copied()
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    // --- Queries ---

    /// Issue `text` to the backend and make its results the current SERP.
    pub fn add_issued_query(&mut self, text: &str) -> SimResult<()> {
        let hits = self
            .backend
            .issue_query(text, 0, self.page_size)
            .map_err(|e| SimError::Backend(format!("query '{text}' failed: {e:#}")))?;
        debug!(query = text, hits = hits.len(), "Query issued");
        self.issued_queries.push(Query {
            text: text.to_string(),
            offset: 0,
            page_size: self.page_size,
            hits,
            patch_type: None,
        });
        self.current_snippet = None;
        self.current_document = None;
        self.serp_cursor = 0;
        Ok(())
    }

    pub fn issued_queries(&self) -> &[Query] {
        &self.issued_queries
    }

    pub fn last_query(&self) -> Option<&Query> {
        self.issued_queries.last()
    }

    /// Hits of the current SERP; empty before the first query.
    pub fn current_results(&self) -> &[SearchHit] {
        self.issued_queries
            .last()
            .map(|q| q.hits.as_slice())
            .unwrap_or(&[])
    }

    pub fn current_result_count(&self) -> usize {
        self.current_results().len()
    }

    /// Depths of every finished query cycle, oldest first.
    pub fn query_depths(&self) -> &[QueryDepth] {
        &self.depths
    }

    pub fn current_depth(&self) -> QueryDepth {
        QueryDepth {
            snippets: self.examined_snippets().len(),
            documents: self.examined_documents().len(),
        }
    }

    // --- SERP cursor ---

    pub fn serp_cursor(&self) -> usize {
        self.serp_cursor
    }

    pub fn advance_serp_cursor(&mut self) -> SimResult<()> {
        let len = self.current_result_count();
        if self.serp_cursor >= len {
            return Err(SimError::Precondition(format!(
                "cannot advance SERP cursor past the end ({} of {len})",
                self.serp_cursor
            )));
        }
        self.serp_cursor += 1;
        Ok(())
    }

    pub fn at_end_of_serp(&self) -> bool {
        self.serp_cursor == self.current_result_count()
    }

    // --- Examination ---

    /// Materialize the hit under the cursor as the current snippet and fetch
    /// its document as the current document.
    pub fn examine_snippet(&mut self) -> SimResult<()> {
        let query = self
            .issued_queries
            .last()
            .ok_or_else(|| SimError::precondition("examine_snippet called before any query was issued"))?;
        let hit = query.hits.get(self.serp_cursor).cloned().ok_or_else(|| {
            SimError::Precondition(format!(
                "no hit at SERP position {} ({} results)",
                self.serp_cursor,
                query.hits.len()
            ))
        })?;

        let document = self
            .backend
            .fetch_document(&hit.doc_ref)
            .map_err(|e| SimError::Backend(format!("fetch '{}' failed: {e:#}", hit.doc_ref)))?;

        let prior = self.historical_judgment_of(&hit.doc_id);
        let rank = self.serp_cursor + 1;
        self.snippets.push(ResultItem::snippet(&hit, rank, prior));
        self.current_snippet = Some(self.snippets.len() - 1);
        self.current_document = Some(document);
        debug!(doc_id = hit.doc_id.as_str(), rank, "Snippet examined");
        Ok(())
    }

    /// Append the current document to the document accumulators.
    pub fn examine_document(&mut self) -> SimResult<()> {
        let document = self
            .current_document
            .as_ref()
            .ok_or_else(|| SimError::precondition("examine_document called with no current document"))?;
        let rank = self.current_snippet()?.rank;
        let item = ResultItem::document(document, rank);
        debug!(doc_id = item.doc_id.as_str(), rank, "Document examined");
        self.documents.push(item);
        Ok(())
    }

    pub fn current_snippet(&self) -> SimResult<&ResultItem> {
        self.current_snippet
            .map(|i| &self.snippets[i])
            .ok_or_else(|| SimError::precondition("no current snippet; no snippet examined for this query"))
    }

    pub fn current_document(&self) -> SimResult<&Document> {
        self.current_document
            .as_ref()
            .ok_or_else(|| SimError::precondition("no current document; no snippet examined for this query"))
    }

    /// Record the snippet classifier's outcome on the current snippet.
    pub fn judge_current_snippet(&mut self, judgment: Judgment) -> SimResult<()> {
        let idx = self
            .current_snippet
            .ok_or_else(|| SimError::precondition("judge_current_snippet with no current snippet"))?;
        let snippet = &mut self.snippets[idx];
        if snippet.judgment != Judgment::Unjudged {
            return Err(SimError::Precondition(format!(
                "snippet {} was already judged for this examination",
                snippet.doc_id
            )));
        }
        snippet.judgment = judgment;
        Ok(())
    }

    /// Snippets examined for the current query, in examination order.
    pub fn examined_snippets(&self) -> &[ResultItem] {
        &self.snippets[self.snippets_from..]
    }

    /// Documents examined for the current query, in examination order.
    pub fn examined_documents(&self) -> &[ResultItem] {
        &self.documents[self.documents_from..]
    }

    pub fn all_examined_snippets(&self) -> &[ResultItem] {
        &self.snippets
    }

    pub fn all_examined_documents(&self) -> &[ResultItem] {
        &self.documents
    }

    // --- Judgments ---

    pub fn mark_relevant(&mut self, doc_id: &str) -> SimResult<()> {
        self.set_document_judgment(doc_id, Judgment::Relevant)?;
        self.irrelevant_documents.retain(|d| d != doc_id);
        if !self.relevant_documents.iter().any(|d| d == doc_id) {
            self.relevant_documents.push(doc_id.to_string());
        }
        debug!(doc_id, "Document marked relevant");
        Ok(())
    }

    pub fn mark_irrelevant(&mut self, doc_id: &str) -> SimResult<()> {
        self.set_document_judgment(doc_id, Judgment::NonRelevant)?;
        self.relevant_documents.retain(|d| d != doc_id);
        if !self.irrelevant_documents.iter().any(|d| d == doc_id) {
            self.irrelevant_documents.push(doc_id.to_string());
        }
        let revised = revise_snippets(self.revision_policy, &mut self.snippets, doc_id);
        debug!(doc_id, revised, "Document marked irrelevant");
        Ok(())
    }

    fn set_document_judgment(&mut self, doc_id: &str, judgment: Judgment) -> SimResult<()> {
        let doc = self
            .documents
            .iter_mut()
            .rev()
            .find(|d| d.doc_id == doc_id)
            .ok_or_else(|| {
                SimError::Precondition(format!("document {doc_id} has not been examined"))
            })?;
        doc.judgment = judgment;
        Ok(())
    }

    pub fn relevant_documents(&self) -> &[String] {
        &self.relevant_documents
    }

    pub fn irrelevant_documents(&self) -> &[String] {
        &self.irrelevant_documents
    }

    pub fn revision_policy(&self) -> RevisionPolicy {
        self.revision_policy
    }

    /// How many times this item's document has been examined this session (0 = novel).
    pub fn observation_count(&self, item: &ResultItem) -> usize {
        self.documents.iter().filter(|d| d.doc_id == item.doc_id).count()
    }

    /// How many times a snippet with this item's identity has been examined.
    pub fn snippet_observation_count(&self, item: &ResultItem) -> usize {
        self.snippets.iter().filter(|s| s.doc_id == item.doc_id).count()
    }

    /// Most recent judgment recorded for a snippet with this identity.
    pub fn historical_judgment(&self, item: &ResultItem) -> Judgment {
        self.historical_judgment_of(&item.doc_id)
    }

    fn historical_judgment_of(&self, doc_id: &str) -> Judgment {
        self.snippets
            .iter()
            .rev()
            .filter(|s| s.doc_id == doc_id)
            .map(|s| s.judgment)
            .find(|j| *j != Judgment::Unjudged)
            .unwrap_or(Judgment::Unjudged)
    }

    // --- SERP impressions ---

    /// Append an impression and tag the current query with its patch type.
    pub fn record_serp_impression(&mut self, impression: SerpImpression) {
        if let Some(query) = self.issued_queries.last_mut() {
            query.patch_type = Some(impression.patch_type);
        }
        debug!(
            attractive = impression.attractive,
            patch_type = %impression.patch_type,
            "SERP impression recorded"
        );
        self.impressions.push(impression);
    }

    pub fn serp_impressions(&self) -> &[SerpImpression] {
        &self.impressions
    }

    /// Patch type judged for the current query, if its SERP has been judged.
    pub fn last_patch_type(&self) -> Option<serpsim_common::PatchType> {
        self.issued_queries.last().and_then(|q| q.patch_type)
    }

    // --- Misc ---

    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    pub fn report(&self) -> SessionReport {
        let attractive = self.impressions.iter().filter(|i| i.attractive).count();
        SessionReport {
            queries_issued: self.issued_queries.len(),
            snippets_examined: self.snippets.len(),
            documents_examined: self.documents.len(),
            documents_marked_relevant: self.relevant_documents.len(),
            serps_attractive: attractive,
            serps_unattractive: self.impressions.len() - attractive,
        }
    }
}

/// Apply the revision policy for a document judged not relevant.
/// Returns how many snippet judgments changed.
fn revise_snippets(policy: RevisionPolicy, snippets: &mut [ResultItem], doc_id: &str) -> usize {
    match policy {
        RevisionPolicy::None => 0,
        RevisionPolicy::ReviseOnIrrelevant => {
            let mut revised = 0;
            for snippet in snippets.iter_mut().filter(|s| s.doc_id == doc_id) {
                if snippet.judgment != Judgment::NonRelevant {
                    snippet.judgment = Judgment::NonRelevant;
                    revised += 1;
                }
            }
            revised
        }
    }
}
