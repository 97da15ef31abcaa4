use tracing::debug;

use serpsim_common::error::SimResult;
use serpsim_common::Decision;

use super::{query_if, require_non_negative, DecisionContext, StoppingStrategy};

/// Abandon the SERP `timeout_threshold` seconds after the query was issued.
#[derive(Debug, Clone)]
pub struct TimeLimit {
    timeout_threshold: f64,
}

impl TimeLimit {
    pub fn new(timeout_threshold: f64) -> SimResult<Self> {
        require_non_negative("timeout_threshold", timeout_threshold)?;
        Ok(Self { timeout_threshold })
    }
}

impl StoppingStrategy for TimeLimit {
    fn decide(&mut self, ctx: &DecisionContext<'_>) -> SimResult<Decision> {
        let on_serp = ctx.logger.last_interaction_time() - ctx.logger.last_query_time();
        Ok(query_if(on_serp >= self.timeout_threshold))
    }

    fn name(&self) -> &'static str {
        "time"
    }
}

/// Abandon the SERP `timeout_threshold` seconds after the searcher last found
/// something relevant: a marked document when `on_mark`, otherwise a relevant
/// snippet. Measured from session start if nothing was found yet.
#[derive(Debug, Clone)]
pub struct TimeSinceRelevancy {
    timeout_threshold: f64,
    on_mark: bool,
}

impl TimeSinceRelevancy {
    pub fn new(timeout_threshold: f64, on_mark: bool) -> SimResult<Self> {
        require_non_negative("timeout_threshold", timeout_threshold)?;
        Ok(Self {
            timeout_threshold,
            on_mark,
        })
    }
}

impl StoppingStrategy for TimeSinceRelevancy {
    fn decide(&mut self, ctx: &DecisionContext<'_>) -> SimResult<Decision> {
        let last_relevant = if self.on_mark {
            ctx.logger.last_marked_time()
        } else {
            ctx.logger.last_relevant_snippet_time()
        };
        let since = ctx.logger.last_interaction_time() - last_relevant;
        debug!(since, timeout = self.timeout_threshold, on_mark = self.on_mark, "Time since relevancy");
        Ok(query_if(since >= self.timeout_threshold))
    }

    fn name(&self) -> &'static str {
        "time_since_relevancy"
    }
}
