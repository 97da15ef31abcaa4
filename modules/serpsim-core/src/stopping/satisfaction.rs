use tracing::debug;

use serpsim_common::error::SimResult;
use serpsim_common::{Decision, ResultItem};

use super::{query_if, require_non_negative, require_positive, DecisionContext, StoppingStrategy};

fn relevant_count(items: &[ResultItem]) -> usize {
    items.iter().filter(|i| i.judgment.is_relevant()).count()
}

/// Abandon the SERP once `relevant_threshold` snippets for the current query
/// were judged relevant.
#[derive(Debug, Clone)]
pub struct Satisfaction {
    relevant_threshold: usize,
}

impl Satisfaction {
    pub fn new(relevant_threshold: usize) -> SimResult<Self> {
        require_positive("relevant_threshold", relevant_threshold)?;
        Ok(Self { relevant_threshold })
    }

    fn satisfied(&self, ctx: &DecisionContext<'_>) -> bool {
        relevant_count(ctx.memory.examined_snippets()) >= self.relevant_threshold
    }
}

impl StoppingStrategy for Satisfaction {
    fn decide(&mut self, ctx: &DecisionContext<'_>) -> SimResult<Decision> {
        Ok(query_if(self.satisfied(ctx)))
    }

    fn name(&self) -> &'static str {
        "satisfaction"
    }
}

/// Satisfaction, with a failsafe: give up once `timeout_threshold` seconds
/// have passed since the query was issued.
#[derive(Debug, Clone)]
pub struct TimeLimitedSatisfaction {
    satisfaction: Satisfaction,
    timeout_threshold: f64,
}

impl TimeLimitedSatisfaction {
    pub fn new(relevant_threshold: usize, timeout_threshold: f64) -> SimResult<Self> {
        require_non_negative("timeout_threshold", timeout_threshold)?;
        Ok(Self {
            satisfaction: Satisfaction::new(relevant_threshold)?,
            timeout_threshold,
        })
    }
}

impl StoppingStrategy for TimeLimitedSatisfaction {
    fn decide(&mut self, ctx: &DecisionContext<'_>) -> SimResult<Decision> {
        let on_serp = ctx.logger.last_interaction_time() - ctx.logger.last_query_time();
        if on_serp >= self.timeout_threshold {
            debug!(on_serp, timeout = self.timeout_threshold, "SERP time limit reached");
            return Ok(Decision::Query);
        }
        self.satisfaction.decide(ctx)
    }

    fn name(&self) -> &'static str {
        "time_limited_satisfaction"
    }
}

/// Satisfaction, overridden to abandon a poor SERP: nothing relevant on the
/// whole first page, or `nonrelevant_threshold` ranks read since the last
/// relevant item.
#[derive(Debug, Clone)]
pub struct LimitedSatisfaction {
    satisfaction: Satisfaction,
    serp_size: usize,
    nonrelevant_threshold: usize,
    /// Count relevant documents rather than relevant snippets.
    consider_documents: bool,
}

impl LimitedSatisfaction {
    pub fn new(
        relevant_threshold: usize,
        serp_size: usize,
        nonrelevant_threshold: usize,
        consider_documents: bool,
    ) -> SimResult<Self> {
        require_positive("serp_size", serp_size)?;
        require_positive("nonrelevant_threshold", nonrelevant_threshold)?;
        Ok(Self {
            satisfaction: Satisfaction::new(relevant_threshold)?,
            serp_size,
            nonrelevant_threshold,
            consider_documents,
        })
    }
}

impl StoppingStrategy for LimitedSatisfaction {
    fn decide(&mut self, ctx: &DecisionContext<'_>) -> SimResult<Decision> {
        let satisfied = self.satisfaction.satisfied(ctx);
        let cursor = ctx.memory.serp_cursor();
        if cursor < self.serp_size {
            return Ok(query_if(satisfied));
        }

        let items = if self.consider_documents {
            ctx.memory.examined_documents()
        } else {
            ctx.memory.examined_snippets()
        };
        let relevant = relevant_count(items);
        let last_relevant_rank = items
            .iter()
            .rev()
            .find(|i| i.judgment.is_relevant())
            .map(|i| i.rank)
            .unwrap_or(0);

        if relevant == 0 {
            debug!(cursor, serp_size = self.serp_size, "Nothing relevant on first page");
            return Ok(Decision::Query);
        }
        if cursor.saturating_sub(last_relevant_rank) >= self.nonrelevant_threshold {
            debug!(cursor, last_relevant_rank, "Too long since last relevant item");
            return Ok(Decision::Query);
        }
        Ok(query_if(satisfied))
    }

    fn name(&self) -> &'static str {
        "limited_satisfaction"
    }
}
