use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// --- Actions ---

/// The primitive actions a simulated searcher can perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    Query,
    Serp,
    Snippet,
    Doc,
    Mark,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Query => "QUERY",
            Action::Serp => "SERP",
            Action::Snippet => "SNIPPET",
            Action::Doc => "DOC",
            Action::Mark => "MARK",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a stopping decision: keep reading the SERP or reformulate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Snippet,
    Query,
}

impl Decision {
    pub fn is_query(&self) -> bool {
        matches!(self, Decision::Query)
    }
}

impl From<Decision> for Action {
    fn from(d: Decision) -> Self {
        match d {
            Decision::Snippet => Action::Snippet,
            Decision::Query => Action::Query,
        }
    }
}

// --- Judgments ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Judgment {
    #[default]
    Unjudged,
    NonRelevant,
    Relevant,
}

impl Judgment {
    /// -1 / 0 / 1, as written in judgment files.
    pub fn value(&self) -> i8 {
        match self {
            Judgment::Unjudged => -1,
            Judgment::NonRelevant => 0,
            Judgment::Relevant => 1,
        }
    }

    /// Binary gain; unjudged content counts as not relevant.
    pub fn gain(&self) -> u32 {
        match self {
            Judgment::Relevant => 1,
            _ => 0,
        }
    }

    pub fn is_relevant(&self) -> bool {
        matches!(self, Judgment::Relevant)
    }

    pub fn from_relevance(relevant: bool) -> Self {
        if relevant {
            Judgment::Relevant
        } else {
            Judgment::NonRelevant
        }
    }
}

/// What happens to snippet judgments when the underlying document turns out
/// to be not relevant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RevisionPolicy {
    #[default]
    None,
    ReviseOnIrrelevant,
}

// --- Patch types ---

/// Single-patch foraging classification of a SERP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PatchType {
    EarlyGain,
    GradualIncrease,
    Undefined,
}

impl fmt::Display for PatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PatchType::EarlyGain => "EARLY_GAIN",
            PatchType::GradualIncrease => "GRADUAL_INCREASE",
            PatchType::Undefined => "UNDEFINED",
        };
        f.write_str(s)
    }
}

/// One SERP impression: was the page worth entering, and what patch it looked like.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerpImpression {
    pub attractive: bool,
    pub patch_type: PatchType,
}

// --- Retrieval types ---

/// A ranked hit as returned by a search backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Collection identifier; the identity used for judgments and observation counts.
    pub doc_id: String,
    pub title: String,
    pub summary: String,
    /// Opaque backend handle passed back to `fetch_document`.
    pub doc_ref: String,
}

/// A full document fetched from the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub doc_id: String,
    pub title: String,
    pub content: String,
}

/// An examined snippet or document, with the searcher's judgment of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultItem {
    pub doc_id: String,
    pub title: String,
    pub text: String,
    /// 1-based rank in the SERP the item was examined from.
    pub rank: usize,
    pub judgment: Judgment,
    /// Historical judgment of the same identity at the time this item was examined.
    #[serde(default)]
    pub prior_judgment: Judgment,
}

impl ResultItem {
    pub fn snippet(hit: &SearchHit, rank: usize, prior_judgment: Judgment) -> Self {
        Self {
            doc_id: hit.doc_id.clone(),
            title: hit.title.clone(),
            text: hit.summary.clone(),
            rank,
            judgment: Judgment::Unjudged,
            prior_judgment,
        }
    }

    pub fn document(doc: &Document, rank: usize) -> Self {
        Self {
            doc_id: doc.doc_id.clone(),
            title: doc.title.clone(),
            text: doc.content.clone(),
            rank,
            judgment: Judgment::Unjudged,
            prior_judgment: Judgment::Unjudged,
        }
    }

    /// True if this identity had been judged nonrelevant before this examination.
    pub fn seen_as_nonrelevant(&self) -> bool {
        self.prior_judgment == Judgment::NonRelevant
    }
}

/// An issued query together with the results page it produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub text: String,
    pub offset: usize,
    pub page_size: usize,
    pub hits: Vec<SearchHit>,
    pub patch_type: Option<PatchType>,
}

/// How deep the searcher went on a query before moving on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryDepth {
    pub snippets: usize,
    pub documents: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Topic {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
}

// --- Logged events ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SerpStatus {
    EmptySerp,
    ExamineSerp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SnippetStatus {
    SeenPreviously,
    SnippetRelevant,
    SnippetNotRelevant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocStatus {
    ExaminingDocument,
    ConsideredRelevant,
    ConsideredNotRelevant,
}

/// A logged action with the fields the loggers need.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionEvent {
    Query { text: String },
    Serp { status: SerpStatus },
    Snippet { status: SnippetStatus, doc_id: String },
    Doc { status: DocStatus, doc_id: String },
    Mark { doc_id: String },
}

impl ActionEvent {
    pub fn action(&self) -> Action {
        match self {
            ActionEvent::Query { .. } => Action::Query,
            ActionEvent::Serp { .. } => Action::Serp,
            ActionEvent::Snippet { .. } => Action::Snippet,
            ActionEvent::Doc { .. } => Action::Doc,
            ActionEvent::Mark { .. } => Action::Mark,
        }
    }

    /// Human-readable detail column of an interaction log line.
    pub fn detail(&self) -> String {
        fn status<T: Serialize>(s: &T) -> String {
            serde_json::to_value(s)
                .ok()
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_default()
        }
        match self {
            ActionEvent::Query { text } => text.clone(),
            ActionEvent::Serp { status: s } => status(s),
            ActionEvent::Snippet { status: s, doc_id } => format!("{} {doc_id}", status(s)),
            ActionEvent::Doc { status: s, doc_id } => format!("{} {doc_id}", status(s)),
            ActionEvent::Mark { doc_id } => doc_id.clone(),
        }
    }
}

/// One line of a session's interaction log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InteractionEntry {
    Action {
        action: Action,
        time_limit: f64,
        elapsed: f64,
        detail: String,
    },
    Info {
        info_type: String,
        text: String,
    },
}

impl fmt::Display for InteractionEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InteractionEntry::Action {
                action,
                time_limit,
                elapsed,
                detail,
            } => write!(f, "ACTION {action} {time_limit} {elapsed} {detail}"),
            InteractionEntry::Info { info_type, text } => write!(f, "INFO {info_type} {text}"),
        }
    }
}

// --- Reports ---

/// Summary statistics of a session, read at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionReport {
    pub queries_issued: usize,
    pub snippets_examined: usize,
    pub documents_examined: usize,
    pub documents_marked_relevant: usize,
    pub serps_attractive: usize,
    pub serps_unattractive: usize,
}

impl fmt::Display for SessionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "queries={} snippets={} documents={} marked_relevant={} serps_attractive={} serps_unattractive={}",
            self.queries_issued,
            self.snippets_examined,
            self.documents_examined,
            self.documents_marked_relevant,
            self.serps_attractive,
            self.serps_unattractive,
        )
    }
}
