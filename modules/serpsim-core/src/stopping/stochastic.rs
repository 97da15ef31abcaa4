//! Stopping rules that roll a seeded die at every decision point.

use rand::rngs::StdRng;
use rand::Rng;
use tracing::debug;

use serpsim_common::error::SimResult;
use serpsim_common::{Decision, SimError};

use super::{query_if, require_probability, DecisionContext, StoppingStrategy};

/// Rank-biased precision: continue past rank `r` with probability
/// `patience^(r-1)`.
#[derive(Debug)]
pub struct RankBiasedPrecision {
    patience: f64,
    rng: StdRng,
}

impl RankBiasedPrecision {
    pub fn new(patience: f64, rng: StdRng) -> SimResult<Self> {
        require_probability("patience", patience)?;
        Ok(Self { patience, rng })
    }
}

impl StoppingStrategy for RankBiasedPrecision {
    fn decide(&mut self, ctx: &DecisionContext<'_>) -> SimResult<Decision> {
        let rank = ctx.memory.serp_cursor().max(1);
        let score = self.patience.powi(rank as i32 - 1);
        let draw: f64 = self.rng.random();
        debug!(rank, score, draw, "RBP decision");
        Ok(query_if(draw > score))
    }

    fn name(&self) -> &'static str {
        "rbp"
    }
}

/// INST (Moffat et al.): the continuation probability adapts to how much of
/// the `target` relevant documents has been found so far.
#[derive(Debug)]
pub struct Inst {
    target: f64,
    rng: StdRng,
}

impl Inst {
    pub fn new(target: f64, rng: StdRng) -> SimResult<Self> {
        if !target.is_finite() || target <= 0.0 {
            return Err(SimError::Config(format!("INST target must be positive, got {target}")));
        }
        Ok(Self { target, rng })
    }

    /// `W(rank) = 1 / (rank + T + T_i)^2` with `T_i = T - R_i`.
    fn weight(&self, rank: usize, gain_so_far: f64) -> f64 {
        let remaining = self.target - gain_so_far;
        1.0 / (rank as f64 + self.target + remaining).powi(2)
    }
}

impl StoppingStrategy for Inst {
    fn decide(&mut self, ctx: &DecisionContext<'_>) -> SimResult<Decision> {
        let snippets = ctx.memory.examined_snippets();
        let Some(first) = snippets.first() else {
            return Ok(Decision::Snippet);
        };
        let rank = snippets.len();
        let gain: f64 = snippets.iter().map(|s| s.judgment.gain() as f64).sum();

        let w_i = self.weight(rank, gain);
        let w_1 = self.weight(1, first.judgment.gain() as f64);
        let draw: f64 = self.rng.random();
        debug!(rank, gain, continuation = w_i / w_1, draw, "INST decision");
        Ok(query_if(draw > w_i / w_1))
    }

    fn name(&self) -> &'static str {
        "inst"
    }
}

/// Abandon the SERP with a fixed probability at every decision point.
#[derive(Debug)]
pub struct RandomStop {
    probability: f64,
    rng: StdRng,
}

impl RandomStop {
    pub fn new(probability: f64, rng: StdRng) -> SimResult<Self> {
        require_probability("probability", probability)?;
        Ok(Self { probability, rng })
    }
}

impl StoppingStrategy for RandomStop {
    fn decide(&mut self, _ctx: &DecisionContext<'_>) -> SimResult<Decision> {
        let draw: f64 = self.rng.random();
        Ok(query_if(draw < self.probability))
    }

    fn name(&self) -> &'static str {
        "random"
    }
}
