use serpsim_common::error::SimResult;
use serpsim_common::{Decision, Judgment, ResultItem};

use super::{query_if, require_positive, DecisionContext, StoppingStrategy};

/// A nonrelevant snippet counts towards frustration unless `skip_seen` is set
/// and the same document had already been judged nonrelevant.
fn counts_as_nonrelevant(item: &ResultItem, skip_seen: bool) -> bool {
    item.judgment == Judgment::NonRelevant && !(skip_seen && item.seen_as_nonrelevant())
}

/// Abandon after `nonrelevant_threshold` consecutive nonrelevant snippets.
/// A relevant (or unjudged) snippet resets the run.
#[derive(Debug, Clone)]
pub struct SequentialNonrelevant {
    nonrelevant_threshold: usize,
    skip_seen: bool,
}

impl SequentialNonrelevant {
    pub fn new(nonrelevant_threshold: usize, skip_seen: bool) -> SimResult<Self> {
        require_positive("nonrelevant_threshold", nonrelevant_threshold)?;
        Ok(Self {
            nonrelevant_threshold,
            skip_seen,
        })
    }
}

impl StoppingStrategy for SequentialNonrelevant {
    fn decide(&mut self, ctx: &DecisionContext<'_>) -> SimResult<Decision> {
        let mut run = 0;
        for snippet in ctx.memory.examined_snippets() {
            if counts_as_nonrelevant(snippet, self.skip_seen) {
                run += 1;
                if run >= self.nonrelevant_threshold {
                    return Ok(Decision::Query);
                }
            } else if !(self.skip_seen && snippet.judgment == Judgment::NonRelevant) {
                run = 0;
            }
        }
        Ok(Decision::Snippet)
    }

    fn name(&self) -> &'static str {
        if self.skip_seen {
            "sequential_nonrelevant_skip"
        } else {
            "sequential_nonrelevant"
        }
    }
}

/// Abandon once `nonrelevant_threshold` snippets for the current query were
/// judged nonrelevant, consecutive or not.
#[derive(Debug, Clone)]
pub struct TotalNonrelevant {
    nonrelevant_threshold: usize,
    skip_seen: bool,
}

impl TotalNonrelevant {
    pub fn new(nonrelevant_threshold: usize, skip_seen: bool) -> SimResult<Self> {
        require_positive("nonrelevant_threshold", nonrelevant_threshold)?;
        Ok(Self {
            nonrelevant_threshold,
            skip_seen,
        })
    }
}

impl StoppingStrategy for TotalNonrelevant {
    fn decide(&mut self, ctx: &DecisionContext<'_>) -> SimResult<Decision> {
        let total = ctx
            .memory
            .examined_snippets()
            .iter()
            .filter(|s| counts_as_nonrelevant(s, self.skip_seen))
            .count();
        Ok(query_if(total >= self.nonrelevant_threshold))
    }

    fn name(&self) -> &'static str {
        if self.skip_seen {
            "total_nonrelevant_skip"
        } else {
            "total_nonrelevant"
        }
    }
}
