use std::sync::Arc;

use rand::rngs::StdRng;
use rand::Rng;
use tracing::debug;

use serpsim_common::error::SimResult;
use serpsim_common::{SerpImpression, SimError};

use super::{judge_viewport, SerpImpressionModel, ViewportConfig};
use crate::memory::SessionMemory;
use crate::traits::JudgmentOracle;

/// Abandon probabilities of the stochastic impression model.
#[derive(Debug, Clone, Copy)]
pub struct AbandonProbabilities {
    /// Used when viewport precision is above the threshold.
    pub good: f64,
    /// Used when viewport precision is at or below the threshold.
    pub bad: f64,
}

/// Rolls a die against a precision-dependent abandon probability.
pub struct StochasticImpression {
    viewport: ViewportConfig,
    threshold: f64,
    abandon: AbandonProbabilities,
    oracle: Arc<dyn JudgmentOracle>,
    rng: StdRng,
}

impl StochasticImpression {
    pub fn new(
        viewport: ViewportConfig,
        threshold: f64,
        abandon: AbandonProbabilities,
        oracle: Arc<dyn JudgmentOracle>,
        rng: StdRng,
    ) -> SimResult<Self> {
        viewport.validate()?;
        for (name, p) in [
            ("viewport_precision_threshold", threshold),
            ("good_abandon_probability", abandon.good),
            ("bad_abandon_probability", abandon.bad),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(SimError::Config(format!("{name} must lie in [0, 1], got {p}")));
            }
        }
        Ok(Self {
            viewport,
            threshold,
            abandon,
            oracle,
            rng,
        })
    }
}

impl SerpImpressionModel for StochasticImpression {
    fn assess(&mut self, memory: &SessionMemory) -> SimResult<SerpImpression> {
        let view = judge_viewport(memory, &self.oracle, &self.viewport);
        let precision = view.precision();
        let abandon = if precision <= self.threshold {
            self.abandon.bad
        } else {
            self.abandon.good
        };
        let draw: f64 = self.rng.random();
        debug!(precision, abandon, draw, "Stochastic SERP impression");
        Ok(SerpImpression {
            attractive: draw > abandon,
            patch_type: view.patch_type,
        })
    }

    fn name(&self) -> &'static str {
        "stochastic"
    }
}
