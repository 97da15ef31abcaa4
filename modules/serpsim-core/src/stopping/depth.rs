use tracing::debug;

use serpsim_common::error::SimResult;
use serpsim_common::Decision;

use super::{query_if, require_positive, DecisionContext, StoppingStrategy};

/// Read exactly `depth` snippets per query.
#[derive(Debug, Clone)]
pub struct FixedDepth {
    depth: usize,
}

impl FixedDepth {
    pub fn new(depth: usize) -> SimResult<Self> {
        require_positive("depth", depth)?;
        Ok(Self { depth })
    }
}

impl StoppingStrategy for FixedDepth {
    fn decide(&mut self, ctx: &DecisionContext<'_>) -> SimResult<Decision> {
        let cursor = ctx.memory.serp_cursor();
        debug!(cursor, depth = self.depth, "Fixed depth check");
        Ok(query_if(cursor >= self.depth))
    }

    fn name(&self) -> &'static str {
        "fixed_depth"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stopping::test_support::decide;
    use crate::testing::judged_memory;

    #[test]
    fn queries_once_depth_is_reached() {
        let mut s = FixedDepth::new(3).unwrap();
        assert_eq!(decide(&mut s, &judged_memory(&[0, 0])), Decision::Snippet);
        assert_eq!(decide(&mut s, &judged_memory(&[0, 0, 0])), Decision::Query);
        assert_eq!(decide(&mut s, &judged_memory(&[1, 1, 1, 1])), Decision::Query);
    }

    #[test]
    fn zero_depth_is_rejected() {
        assert!(FixedDepth::new(0).is_err());
    }
}
