//! Stopping strategies: at each decision point, keep reading the SERP or
//! abandon it and reformulate.
//!
//! Strategies only read the session. Anything they own (random streams, the
//! patch-adaptive active rule) is the reason `decide` takes `&mut self`.

mod combination;
mod depth;
mod frustration;
mod gain;
mod satisfaction;
mod stochastic;
mod time;

pub use combination::{satisfaction_frustration, AnyOf, PatchAdaptive, PatchFirstResult, PatchRuleParams};
pub use depth::FixedDepth;
pub use frustration::{SequentialNonrelevant, TotalNonrelevant};
pub use gain::{GainVariant, IftRateOfGain, IftParams};
pub use satisfaction::{LimitedSatisfaction, Satisfaction, TimeLimitedSatisfaction};
pub use stochastic::{Inst, RandomStop, RankBiasedPrecision};
pub use time::{TimeLimit, TimeSinceRelevancy};

use serpsim_common::error::SimResult;
use serpsim_common::{Decision, SimError};

use crate::memory::SessionMemory;
use crate::traits::InteractionLogger;

/// What a stopping strategy may look at when deciding.
#[derive(Clone, Copy)]
pub struct DecisionContext<'a> {
    pub memory: &'a SessionMemory,
    pub logger: &'a dyn InteractionLogger,
}

pub trait StoppingStrategy {
    fn decide(&mut self, ctx: &DecisionContext<'_>) -> SimResult<Decision>;

    /// Registry kind, used in traces.
    fn name(&self) -> &'static str;
}

pub(crate) fn require_positive(param: &str, value: usize) -> SimResult<()> {
    if value == 0 {
        return Err(SimError::Config(format!("{param} must be at least 1")));
    }
    Ok(())
}

pub(crate) fn require_probability(param: &str, value: f64) -> SimResult<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(SimError::Config(format!("{param} must lie in [0, 1], got {value}")));
    }
    Ok(())
}

pub(crate) fn require_non_negative(param: &str, value: f64) -> SimResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(SimError::Config(format!("{param} must be a non-negative number, got {value}")));
    }
    Ok(())
}

fn query_if(condition: bool) -> Decision {
    if condition {
        Decision::Query
    } else {
        Decision::Snippet
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::testing::RecordingLogger;

    /// Decide with a fresh logger whose clock reads zero.
    pub fn decide(strategy: &mut dyn StoppingStrategy, memory: &SessionMemory) -> Decision {
        let logger = RecordingLogger::new();
        decide_with(strategy, memory, &logger)
    }

    pub fn decide_with(
        strategy: &mut dyn StoppingStrategy,
        memory: &SessionMemory,
        logger: &RecordingLogger,
    ) -> Decision {
        strategy
            .decide(&DecisionContext { memory, logger })
            .unwrap()
    }
}
