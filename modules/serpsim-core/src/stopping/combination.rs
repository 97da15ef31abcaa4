//! Strategies built from other strategies.

use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use serpsim_common::error::SimResult;
use serpsim_common::{Decision, PatchType, SimError};

use super::{
    DecisionContext, LimitedSatisfaction, StoppingStrategy, TimeLimitedSatisfaction, TimeSinceRelevancy,
    TotalNonrelevant,
};
use crate::traits::JudgmentOracle;

// ---------------------------------------------------------------------------
// AnyOf
// ---------------------------------------------------------------------------

/// QUERY as soon as any member says QUERY. Every member is consulted on
/// every decision so stochastic members draw at a steady rate.
pub struct AnyOf {
    label: &'static str,
    strategies: Vec<Box<dyn StoppingStrategy>>,
}

impl AnyOf {
    pub fn new(strategies: Vec<Box<dyn StoppingStrategy>>) -> SimResult<Self> {
        Self::named("any_of", strategies)
    }

    pub fn named(label: &'static str, strategies: Vec<Box<dyn StoppingStrategy>>) -> SimResult<Self> {
        if strategies.is_empty() {
            return Err(SimError::config("any_of needs at least one strategy"));
        }
        Ok(Self { label, strategies })
    }
}

impl StoppingStrategy for AnyOf {
    fn decide(&mut self, ctx: &DecisionContext<'_>) -> SimResult<Decision> {
        let mut decision = Decision::Snippet;
        for strategy in &mut self.strategies {
            if strategy.decide(ctx)?.is_query() {
                debug!(member = strategy.name(), "Combined rule triggered");
                decision = Decision::Query;
            }
        }
        Ok(decision)
    }

    fn name(&self) -> &'static str {
        self.label
    }
}

/// Frustration (total nonrelevant) OR time-limited satisfaction.
pub fn satisfaction_frustration(
    relevant_threshold: usize,
    nonrelevant_threshold: usize,
    timeout_threshold: f64,
) -> SimResult<AnyOf> {
    AnyOf::named(
        "satisfaction_frustration",
        vec![
            Box::new(TotalNonrelevant::new(nonrelevant_threshold, false)?),
            Box::new(TimeLimitedSatisfaction::new(relevant_threshold, timeout_threshold)?),
        ],
    )
}

// ---------------------------------------------------------------------------
// Patch-driven rules
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct PatchRuleParams {
    pub relevant_threshold: usize,
    pub timeout_threshold: f64,
    /// Time-since-relevancy measures from the last mark rather than the last relevant snippet.
    pub on_mark: bool,
    pub serp_size: usize,
    pub nonrelevant_threshold: usize,
}

impl Default for PatchRuleParams {
    fn default() -> Self {
        Self {
            relevant_threshold: 3,
            timeout_threshold: 60.0,
            on_mark: true,
            serp_size: 10,
            nonrelevant_threshold: 10,
        }
    }
}

/// Foraging single-patch rule: limited satisfaction for an early-gain SERP,
/// the giving-up time rule otherwise. Re-selected whenever the judged patch
/// type of the current query changes. An `Undefined` patch type falls back
/// to the time rule.
#[derive(Debug, Clone)]
pub struct PatchAdaptive {
    satisfaction: LimitedSatisfaction,
    time: TimeSinceRelevancy,
    active: Option<PatchType>,
}

impl PatchAdaptive {
    pub fn new(params: &PatchRuleParams) -> SimResult<Self> {
        Ok(Self {
            satisfaction: LimitedSatisfaction::new(
                params.relevant_threshold,
                params.serp_size,
                params.nonrelevant_threshold,
                params.on_mark,
            )?,
            time: TimeSinceRelevancy::new(params.timeout_threshold, params.on_mark)?,
            active: None,
        })
    }
}

impl StoppingStrategy for PatchAdaptive {
    fn decide(&mut self, ctx: &DecisionContext<'_>) -> SimResult<Decision> {
        let patch = ctx
            .memory
            .last_patch_type()
            .ok_or(SimError::PatchTypeUnavailable)?;
        if self.active != Some(patch) {
            info!(from = ?self.active, to = %patch, "Switching patch stopping rule");
            self.active = Some(patch);
        }
        match patch {
            PatchType::EarlyGain => self.satisfaction.decide(ctx),
            PatchType::GradualIncrease | PatchType::Undefined => self.time.decide(ctx),
        }
    }

    fn name(&self) -> &'static str {
        "patch_adaptive"
    }
}

/// Chooses the rule from the true relevance of the SERP's first result:
/// limited satisfaction if it is relevant, the time rule otherwise.
/// A zero `relevant_threshold` always selects the time rule.
pub struct PatchFirstResult {
    satisfaction: Option<LimitedSatisfaction>,
    time: TimeSinceRelevancy,
    oracle: Arc<dyn JudgmentOracle>,
}

impl PatchFirstResult {
    pub fn new(params: &PatchRuleParams, oracle: Arc<dyn JudgmentOracle>) -> SimResult<Self> {
        let satisfaction = if params.relevant_threshold == 0 {
            None
        } else {
            Some(LimitedSatisfaction::new(
                params.relevant_threshold,
                params.serp_size,
                params.nonrelevant_threshold,
                !params.on_mark,
            )?)
        };
        Ok(Self {
            satisfaction,
            time: TimeSinceRelevancy::new(params.timeout_threshold, params.on_mark)?,
            oracle,
        })
    }
}

impl StoppingStrategy for PatchFirstResult {
    fn decide(&mut self, ctx: &DecisionContext<'_>) -> SimResult<Decision> {
        let topic = &ctx.memory.topic().id;
        let first_relevant = ctx
            .memory
            .current_results()
            .first()
            .is_some_and(|hit| self.oracle.binary_judgment(topic, &hit.doc_id) > 0);
        match (&mut self.satisfaction, first_relevant) {
            (Some(satisfaction), true) => satisfaction.decide(ctx),
            _ => self.time.decide(ctx),
        }
    }

    fn name(&self) -> &'static str {
        "patch_first_result"
    }
}
