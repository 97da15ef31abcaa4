use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use serpsim_common::{ActionEvent, DocStatus, InteractionEntry, SnippetStatus};
use serpsim_core::InteractionLogger;

/// Seconds charged for each kind of interaction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct ActionCosts {
    pub query: f64,
    pub serp: f64,
    pub snippet: f64,
    /// Charged once per document read, when examination starts.
    pub document: f64,
    pub mark: f64,
}

impl Default for ActionCosts {
    fn default() -> Self {
        Self {
            query: 10.0,
            serp: 5.0,
            snippet: 3.0,
            document: 20.0,
            mark: 3.0,
        }
    }
}

impl ActionCosts {
    /// Cost of one logged event. The verdict line that follows a document
    /// read is free; the read itself was already charged.
    pub fn cost_of(&self, event: &ActionEvent) -> f64 {
        match event {
            ActionEvent::Query { .. } => self.query,
            ActionEvent::Serp { .. } => self.serp,
            ActionEvent::Snippet { .. } => self.snippet,
            ActionEvent::Doc {
                status: DocStatus::ExaminingDocument,
                ..
            } => self.document,
            ActionEvent::Doc { .. } => 0.0,
            ActionEvent::Mark { .. } => self.mark,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        let all = [self.query, self.serp, self.snippet, self.document, self.mark];
        if all.iter().any(|c| !c.is_finite() || *c < 0.0) {
            return Err("interaction costs must be finite and non-negative".to_string());
        }
        Ok(())
    }
}

/// When a fixed-cost session is over. Query exhaustion always ends it.
#[derive(Debug, Clone, Copy, PartialEq)]
enum FinishRule {
    TimeLimit,
    TimeLimitOrMarkedGoal(usize),
    QueriesOnly,
}

/// Charges a fixed cost per action against a session time limit.
pub struct FixedCostLogger {
    costs: ActionCosts,
    time_limit: f64,
    rule: FinishRule,
    /// Queries the strategy had available at session start, if known.
    total_queries: Option<usize>,

    elapsed: f64,
    queries_issued: usize,
    marked: usize,
    exhausted: bool,

    last_query: f64,
    last_interaction: f64,
    last_marked: f64,
    last_relevant_snippet: f64,

    entries: Vec<InteractionEntry>,
}

impl FixedCostLogger {
    /// Finished once the accumulated cost reaches `time_limit`. The action that
    /// crosses the limit is still completed and logged.
    pub fn new(costs: ActionCosts, time_limit: f64) -> Self {
        Self::with_rule(costs, time_limit, FinishRule::TimeLimit)
    }

    /// Also finished once `marked_goal` documents have been marked relevant.
    pub fn with_marked_goal(costs: ActionCosts, time_limit: f64, marked_goal: usize) -> Self {
        Self::with_rule(costs, time_limit, FinishRule::TimeLimitOrMarkedGoal(marked_goal))
    }

    /// Costs are still accumulated and logged, but only running out of
    /// queries ends the session. Progress is the share of queries issued.
    pub fn without_time_limit(costs: ActionCosts, total_queries: Option<usize>) -> Self {
        let mut logger = Self::with_rule(costs, 0.0, FinishRule::QueriesOnly);
        logger.total_queries = total_queries;
        logger
    }

    fn with_rule(costs: ActionCosts, time_limit: f64, rule: FinishRule) -> Self {
        Self {
            costs,
            time_limit,
            rule,
            total_queries: None,
            elapsed: 0.0,
            queries_issued: 0,
            marked: 0,
            exhausted: false,
            last_query: 0.0,
            last_interaction: 0.0,
            last_marked: 0.0,
            last_relevant_snippet: 0.0,
            entries: Vec::new(),
        }
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn time_limit(&self) -> f64 {
        self.time_limit
    }

    pub fn marked(&self) -> usize {
        self.marked
    }

    fn time_spent(&self) -> bool {
        self.elapsed >= self.time_limit
    }
}

impl InteractionLogger for FixedCostLogger {
    fn log_action(&mut self, event: &ActionEvent) {
        self.elapsed += self.costs.cost_of(event);
        self.last_interaction = self.elapsed;
        match event {
            ActionEvent::Query { .. } => {
                self.queries_issued += 1;
                self.last_query = self.elapsed;
            }
            ActionEvent::Snippet {
                status: SnippetStatus::SnippetRelevant,
                ..
            } => self.last_relevant_snippet = self.elapsed,
            ActionEvent::Mark { .. } => {
                self.marked += 1;
                self.last_marked = self.elapsed;
            }
            _ => {}
        }
        debug!(action = %event.action(), elapsed = self.elapsed, "Action charged");
        self.entries.push(InteractionEntry::Action {
            action: event.action(),
            time_limit: self.time_limit,
            elapsed: self.elapsed,
            detail: event.detail(),
        });
    }

    fn log_info(&mut self, info_type: &str, text: &str) {
        self.entries.push(InteractionEntry::Info {
            info_type: info_type.to_string(),
            text: text.to_string(),
        });
    }

    fn is_finished(&self) -> bool {
        if self.exhausted {
            return true;
        }
        match self.rule {
            FinishRule::TimeLimit => self.time_spent(),
            FinishRule::TimeLimitOrMarkedGoal(goal) => self.marked >= goal || self.time_spent(),
            FinishRule::QueriesOnly => false,
        }
    }

    fn progress(&self) -> Option<f64> {
        match self.rule {
            FinishRule::QueriesOnly => match self.total_queries {
                Some(0) | None => None,
                Some(total) => Some((self.queries_issued as f64 / total as f64).min(1.0)),
            },
            _ if self.time_limit > 0.0 => Some((self.elapsed / self.time_limit).min(1.0)),
            _ => None,
        }
    }

    fn queries_exhausted(&mut self) {
        if !self.exhausted {
            info!(
                elapsed = self.elapsed,
                queries_issued = self.queries_issued,
                "Queries exhausted"
            );
        }
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
