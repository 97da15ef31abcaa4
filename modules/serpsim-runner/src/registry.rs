//! Component registry: maps each config `kind` to a factory for its family.
//!
//! Every factory parses the component's inline parameters into a typed struct that
//! rejects unknown fields, then hands them to the component's constructor,
//! which validates ranges. Nothing is looked up by name after session setup.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;
use typed_builder::TypedBuilder;

use serpsim_common::config::resolve_path;
use serpsim_common::error::SimResult;
use serpsim_common::{ComponentSpec, SimError, SimulationConfig, Topic};
use serpsim_core::impression::{
    AbandonProbabilities, AlwaysAttractive, PrecisionThreshold, StochasticImpression,
    ViewportConfig,
};
use serpsim_core::rng::{
    seeded_rng, CLASSIFIER_SEED_OFFSET, INST_SEED_OFFSET, RANDOM_STOPPING_SEED_OFFSET,
    RBP_SEED_OFFSET, SERP_IMPRESSION_SEED_OFFSET,
};
use serpsim_core::stopping::{
    satisfaction_frustration, AnyOf, FixedDepth, GainVariant, IftParams, IftRateOfGain, Inst,
    LimitedSatisfaction, PatchAdaptive, PatchFirstResult, PatchRuleParams, RandomStop,
    RankBiasedPrecision, Satisfaction, SequentialNonrelevant, TimeLimit, TimeLimitedSatisfaction,
    TimeSinceRelevancy, TotalNonrelevant,
};
use serpsim_core::{
    InteractionLogger, JudgmentOracle, Qrels, QueryStrategy, RelevanceClassifier,
    SerpImpressionModel, StoppingStrategy,
};

use crate::classifiers::{
    ConstantClassifier, InformedClassifier, PerfectClassifier, StochasticClassifier,
};
use crate::loggers::{ActionCosts, FixedCostLogger};
use crate::queries::{load_predetermined, QueryList};

/// What a factory may draw on besides the component spec.
#[derive(Clone, TypedBuilder)]
pub struct BuildContext {
    pub topic: Topic,
    pub oracle: Arc<dyn JudgmentOracle>,
    #[builder(default)]
    pub base_seed: u64,
    #[builder(setter(into))]
    pub user_id: String,
    /// Relative paths in component parameters resolve against this directory.
    #[builder(default)]
    pub config_dir: PathBuf,
    #[builder(default)]
    pub query_limit: Option<usize>,
    /// Queries the session's query strategy holds, once it has been built.
    #[builder(default)]
    pub total_queries: Option<usize>,
}

pub type Factory<T> = fn(&ComponentSpec, &BuildContext, &Registries) -> SimResult<Box<T>>;

pub struct Registry<T: ?Sized> {
    family: &'static str,
    factories: BTreeMap<&'static str, Factory<T>>,
}

impl<T: ?Sized> Registry<T> {
    pub fn new(family: &'static str) -> Self {
        Self {
            family,
            factories: BTreeMap::new(),
        }
    }

    pub fn register(&mut self, kind: &'static str, factory: Factory<T>) -> &mut Self {
        self.factories.insert(kind, factory);
        self
    }

    pub fn family(&self) -> &'static str {
        self.family
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.factories.contains_key(kind)
    }

    /// Registered kinds in sorted order.
    pub fn kinds(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.factories.keys().copied()
    }

    pub fn build(
        &self,
        spec: &ComponentSpec,
        ctx: &BuildContext,
        registries: &Registries,
    ) -> SimResult<Box<T>> {
        let factory = self
            .factories
            .get(spec.kind.as_str())
            .ok_or_else(|| SimError::UnknownComponent {
                family: self.family,
                kind: spec.kind.clone(),
            })?;
        debug!(family = self.family, kind = spec.kind.as_str(), "Building component");
        factory(spec, ctx, registries)
    }
}

/// One registry per component family.
pub struct Registries {
    pub stopping: Registry<dyn StoppingStrategy>,
    pub serp_impression: Registry<dyn SerpImpressionModel>,
    pub classifier: Registry<dyn RelevanceClassifier>,
    pub query_strategy: Registry<dyn QueryStrategy>,
    pub logger: Registry<dyn InteractionLogger>,
}

impl Registries {
    /// Every built-in component.
    pub fn standard() -> Self {
        let mut stopping: Registry<dyn StoppingStrategy> = Registry::new("stopping");
        stopping
            .register("fixed_depth", build_fixed_depth)
            .register("satisfaction", build_satisfaction)
            .register("time_limited_satisfaction", build_time_limited_satisfaction)
            .register("limited_satisfaction", build_limited_satisfaction)
            .register("sequential_nonrelevant", |s, _, _| build_sequential(s, false))
            .register("sequential_nonrelevant_skip", |s, _, _| build_sequential(s, true))
            .register("total_nonrelevant", |s, _, _| build_total(s, false))
            .register("total_nonrelevant_skip", |s, _, _| build_total(s, true))
            .register("time", build_time)
            .register("time_since_relevancy", build_time_since_relevancy)
            .register("rbp", build_rbp)
            .register("inst", build_inst)
            .register("random", build_random)
            .register("ift", |s, _, _| build_ift(s, GainVariant::Snippets))
            .register("ift2", |s, _, _| build_ift(s, GainVariant::Documents))
            .register("any_of", build_any_of)
            .register("satisfaction_frustration", build_satisfaction_frustration)
            .register("patch_adaptive", build_patch_adaptive)
            .register("patch_first_result", build_patch_first_result);

        let mut serp_impression: Registry<dyn SerpImpressionModel> = Registry::new("serp_impression");
        serp_impression
            .register("always_attractive", build_always_attractive)
            .register("precision_threshold", build_precision_threshold)
            .register("stochastic", build_stochastic_impression);

        let mut classifier: Registry<dyn RelevanceClassifier> = Registry::new("classifier");
        classifier
            .register("perfect", build_perfect)
            .register("informed", build_informed)
            .register("stochastic", build_stochastic_classifier)
            .register("constant", build_constant);

        let mut query_strategy: Registry<dyn QueryStrategy> = Registry::new("query_strategy");
        query_strategy
            .register("predetermined", build_predetermined)
            .register("fixed_list", build_fixed_list);

        let mut logger: Registry<dyn InteractionLogger> = Registry::new("logger");
        logger
            .register("fixed_cost", build_fixed_cost)
            .register("fixed_cost_goal", build_fixed_cost_goal)
            .register("fixed_cost_no_time", build_fixed_cost_no_time);

        Self {
            stopping,
            serp_impression,
            classifier,
            query_strategy,
            logger,
        }
    }

    /// Build every user's components once against each topic, with no
    /// judgments loaded, so unknown kinds and bad parameters fail before any
    /// session runs.
    pub fn validate(&self, config: &SimulationConfig) -> SimResult<()> {
        let oracle: Arc<dyn JudgmentOracle> = Arc::new(Qrels::new());
        for topic in &config.topics {
            for user in &config.users {
                let ctx = BuildContext::builder()
                    .topic(topic.topic())
                    .oracle(oracle.clone())
                    .base_seed(config.base_seed)
                    .user_id(user.id.as_str())
                    .config_dir(config.base_dir.clone())
                    .query_limit(user.query_limit)
                    .build();
                let in_user = |e: SimError| match e {
                    SimError::Config(msg) => SimError::Config(format!("user '{}': {msg}", user.id)),
                    other => other,
                };
                let queries = self.query_strategy.build(&user.query_strategy, &ctx, self).map_err(in_user)?;
                let ctx = BuildContext {
                    total_queries: queries.remaining(),
                    ..ctx
                };
                self.classifier.build(&user.snippet_classifier, &ctx, self).map_err(in_user)?;
                self.classifier.build(&user.document_classifier, &ctx, self).map_err(in_user)?;
                self.stopping.build(&user.stopping, &ctx, self).map_err(in_user)?;
                self.serp_impression.build(&user.serp_impression, &ctx, self).map_err(in_user)?;
                self.logger.build(&user.logger, &ctx, self).map_err(in_user)?;
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Stopping strategies
// ---------------------------------------------------------------------------

const STOPPING: &str = "stopping";

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct FixedDepthParams {
    depth: usize,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct SatisfactionParams {
    relevant_threshold: usize,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TimeLimitedSatisfactionParams {
    relevant_threshold: usize,
    timeout_threshold: f64,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct LimitedSatisfactionParams {
    relevant_threshold: usize,
    #[serde(default = "default_serp_size")]
    serp_size: usize,
    #[serde(default = "default_serp_size")]
    nonrelevant_threshold: usize,
    #[serde(default = "default_true")]
    consider_documents: bool,
}

fn default_serp_size() -> usize {
    10
}

fn default_true() -> bool {
    true
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct NonrelevantParams {
    nonrelevant_threshold: usize,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TimeParams {
    timeout_threshold: f64,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TimeSinceRelevancyParams {
    timeout_threshold: f64,
    #[serde(default = "default_true")]
    on_mark: bool,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RbpParams {
    patience: f64,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct InstParams {
    target: f64,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RandomParams {
    probability: f64,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct AnyOfParams {
    strategies: Vec<ComponentSpec>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct SatisfactionFrustrationParams {
    relevant_threshold: usize,
    nonrelevant_threshold: usize,
    timeout_threshold: f64,
}

fn build_fixed_depth(spec: &ComponentSpec, _: &BuildContext, _: &Registries) -> SimResult<Box<dyn StoppingStrategy>> {
    let p: FixedDepthParams = spec.parse_params(STOPPING)?;
    Ok(Box::new(FixedDepth::new(p.depth)?))
}

fn build_satisfaction(spec: &ComponentSpec, _: &BuildContext, _: &Registries) -> SimResult<Box<dyn StoppingStrategy>> {
    let p: SatisfactionParams = spec.parse_params(STOPPING)?;
    Ok(Box::new(Satisfaction::new(p.relevant_threshold)?))
}

fn build_time_limited_satisfaction(
    spec: &ComponentSpec,
    _: &BuildContext,
    _: &Registries,
) -> SimResult<Box<dyn StoppingStrategy>> {
    let p: TimeLimitedSatisfactionParams = spec.parse_params(STOPPING)?;
    Ok(Box::new(TimeLimitedSatisfaction::new(p.relevant_threshold, p.timeout_threshold)?))
}

fn build_limited_satisfaction(
    spec: &ComponentSpec,
    _: &BuildContext,
    _: &Registries,
) -> SimResult<Box<dyn StoppingStrategy>> {
    let p: LimitedSatisfactionParams = spec.parse_params(STOPPING)?;
    Ok(Box::new(LimitedSatisfaction::new(
        p.relevant_threshold,
        p.serp_size,
        p.nonrelevant_threshold,
        p.consider_documents,
    )?))
}

fn build_sequential(spec: &ComponentSpec, skip_seen: bool) -> SimResult<Box<dyn StoppingStrategy>> {
    let p: NonrelevantParams = spec.parse_params(STOPPING)?;
    Ok(Box::new(SequentialNonrelevant::new(p.nonrelevant_threshold, skip_seen)?))
}

fn build_total(spec: &ComponentSpec, skip_seen: bool) -> SimResult<Box<dyn StoppingStrategy>> {
    let p: NonrelevantParams = spec.parse_params(STOPPING)?;
    Ok(Box::new(TotalNonrelevant::new(p.nonrelevant_threshold, skip_seen)?))
}

fn build_time(spec: &ComponentSpec, _: &BuildContext, _: &Registries) -> SimResult<Box<dyn StoppingStrategy>> {
    let p: TimeParams = spec.parse_params(STOPPING)?;
    Ok(Box::new(TimeLimit::new(p.timeout_threshold)?))
}

fn build_time_since_relevancy(
    spec: &ComponentSpec,
    _: &BuildContext,
    _: &Registries,
) -> SimResult<Box<dyn StoppingStrategy>> {
    let p: TimeSinceRelevancyParams = spec.parse_params(STOPPING)?;
    Ok(Box::new(TimeSinceRelevancy::new(p.timeout_threshold, p.on_mark)?))
}

fn build_rbp(spec: &ComponentSpec, ctx: &BuildContext, _: &Registries) -> SimResult<Box<dyn StoppingStrategy>> {
    let p: RbpParams = spec.parse_params(STOPPING)?;
    let rng = seeded_rng(ctx.base_seed, RBP_SEED_OFFSET);
    Ok(Box::new(RankBiasedPrecision::new(p.patience, rng)?))
}

fn build_inst(spec: &ComponentSpec, ctx: &BuildContext, _: &Registries) -> SimResult<Box<dyn StoppingStrategy>> {
    let p: InstParams = spec.parse_params(STOPPING)?;
    let rng = seeded_rng(ctx.base_seed, INST_SEED_OFFSET);
    Ok(Box::new(Inst::new(p.target, rng)?))
}

fn build_random(spec: &ComponentSpec, ctx: &BuildContext, _: &Registries) -> SimResult<Box<dyn StoppingStrategy>> {
    let p: RandomParams = spec.parse_params(STOPPING)?;
    let rng = seeded_rng(ctx.base_seed, RANDOM_STOPPING_SEED_OFFSET);
    Ok(Box::new(RandomStop::new(p.probability, rng)?))
}

fn build_ift(spec: &ComponentSpec, variant: GainVariant) -> SimResult<Box<dyn StoppingStrategy>> {
    let p: IftParams = spec.parse_params(STOPPING)?;
    Ok(Box::new(IftRateOfGain::new(variant, p)?))
}

fn build_any_of(
    spec: &ComponentSpec,
    ctx: &BuildContext,
    registries: &Registries,
) -> SimResult<Box<dyn StoppingStrategy>> {
    let p: AnyOfParams = spec.parse_params(STOPPING)?;
    let members = p
        .strategies
        .iter()
        .map(|member| registries.stopping.build(member, ctx, registries))
        .collect::<SimResult<Vec<_>>>()?;
    Ok(Box::new(AnyOf::new(members)?))
}

fn build_satisfaction_frustration(
    spec: &ComponentSpec,
    _: &BuildContext,
    _: &Registries,
) -> SimResult<Box<dyn StoppingStrategy>> {
    let p: SatisfactionFrustrationParams = spec.parse_params(STOPPING)?;
    Ok(Box::new(satisfaction_frustration(
        p.relevant_threshold,
        p.nonrelevant_threshold,
        p.timeout_threshold,
    )?))
}

fn build_patch_adaptive(spec: &ComponentSpec, _: &BuildContext, _: &Registries) -> SimResult<Box<dyn StoppingStrategy>> {
    let p: PatchRuleParams = spec.parse_params(STOPPING)?;
    Ok(Box::new(PatchAdaptive::new(&p)?))
}

fn build_patch_first_result(
    spec: &ComponentSpec,
    ctx: &BuildContext,
    _: &Registries,
) -> SimResult<Box<dyn StoppingStrategy>> {
    let p: PatchRuleParams = spec.parse_params(STOPPING)?;
    Ok(Box::new(PatchFirstResult::new(&p, ctx.oracle.clone())?))
}

// ---------------------------------------------------------------------------
// SERP impression models
// ---------------------------------------------------------------------------

const SERP_IMPRESSION: &str = "serp_impression";

fn default_precision_threshold() -> f64 {
    0.1
}

fn default_abandon_probability() -> f64 {
    0.5
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct PrecisionParams {
    #[serde(default)]
    viewport_size: Option<usize>,
    #[serde(default)]
    patch_type_threshold: Option<f64>,
    #[serde(default)]
    novel_snippets_only: bool,
    #[serde(default = "default_precision_threshold")]
    viewport_precision_threshold: f64,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct StochasticImpressionParams {
    #[serde(default)]
    viewport_size: Option<usize>,
    #[serde(default)]
    patch_type_threshold: Option<f64>,
    #[serde(default)]
    novel_snippets_only: bool,
    #[serde(default = "default_precision_threshold")]
    viewport_precision_threshold: f64,
    #[serde(default = "default_abandon_probability")]
    good_abandon_probability: f64,
    #[serde(default = "default_abandon_probability")]
    bad_abandon_probability: f64,
}

fn viewport(size: Option<usize>, patch_type_threshold: Option<f64>, novel_snippets_only: bool) -> ViewportConfig {
    let defaults = ViewportConfig::default();
    ViewportConfig {
        viewport_size: size.unwrap_or(defaults.viewport_size),
        patch_type_threshold: patch_type_threshold.unwrap_or(defaults.patch_type_threshold),
        novel_snippets_only,
    }
}

fn build_always_attractive(
    spec: &ComponentSpec,
    ctx: &BuildContext,
    _: &Registries,
) -> SimResult<Box<dyn SerpImpressionModel>> {
    let viewport: ViewportConfig = spec.parse_params(SERP_IMPRESSION)?;
    Ok(Box::new(AlwaysAttractive::new(viewport, ctx.oracle.clone())?))
}

fn build_precision_threshold(
    spec: &ComponentSpec,
    ctx: &BuildContext,
    _: &Registries,
) -> SimResult<Box<dyn SerpImpressionModel>> {
    let p: PrecisionParams = spec.parse_params(SERP_IMPRESSION)?;
    Ok(Box::new(PrecisionThreshold::new(
        viewport(p.viewport_size, p.patch_type_threshold, p.novel_snippets_only),
        p.viewport_precision_threshold,
        ctx.oracle.clone(),
    )?))
}

fn build_stochastic_impression(
    spec: &ComponentSpec,
    ctx: &BuildContext,
    _: &Registries,
) -> SimResult<Box<dyn SerpImpressionModel>> {
    let p: StochasticImpressionParams = spec.parse_params(SERP_IMPRESSION)?;
    Ok(Box::new(StochasticImpression::new(
        viewport(p.viewport_size, p.patch_type_threshold, p.novel_snippets_only),
        p.viewport_precision_threshold,
        AbandonProbabilities {
            good: p.good_abandon_probability,
            bad: p.bad_abandon_probability,
        },
        ctx.oracle.clone(),
        seeded_rng(ctx.base_seed, SERP_IMPRESSION_SEED_OFFSET),
    )?))
}

// ---------------------------------------------------------------------------
// Relevance classifiers
// ---------------------------------------------------------------------------

const CLASSIFIER: &str = "classifier";

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct NoParams {}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct StochasticClassifierParams {
    rprob: f64,
    nprob: f64,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ConstantParams {
    relevant: bool,
}

fn build_perfect(spec: &ComponentSpec, ctx: &BuildContext, _: &Registries) -> SimResult<Box<dyn RelevanceClassifier>> {
    let _: NoParams = spec.parse_params(CLASSIFIER)?;
    Ok(Box::new(PerfectClassifier::new(ctx.topic.id.as_str(), ctx.oracle.clone())))
}

fn build_informed(spec: &ComponentSpec, ctx: &BuildContext, _: &Registries) -> SimResult<Box<dyn RelevanceClassifier>> {
    let _: NoParams = spec.parse_params(CLASSIFIER)?;
    Ok(Box::new(InformedClassifier::new(ctx.topic.id.as_str(), ctx.oracle.clone())))
}

fn build_stochastic_classifier(
    spec: &ComponentSpec,
    ctx: &BuildContext,
    _: &Registries,
) -> SimResult<Box<dyn RelevanceClassifier>> {
    let p: StochasticClassifierParams = spec.parse_params(CLASSIFIER)?;
    for (name, value) in [("rprob", p.rprob), ("nprob", p.nprob)] {
        if !(0.0..=1.0).contains(&value) {
            return Err(SimError::Config(format!("{name} must lie in [0, 1], got {value}")));
        }
    }
    Ok(Box::new(StochasticClassifier::new(
        ctx.topic.id.as_str(),
        ctx.oracle.clone(),
        p.rprob,
        p.nprob,
        seeded_rng(ctx.base_seed, CLASSIFIER_SEED_OFFSET),
    )))
}

fn build_constant(spec: &ComponentSpec, _: &BuildContext, _: &Registries) -> SimResult<Box<dyn RelevanceClassifier>> {
    let p: ConstantParams = spec.parse_params(CLASSIFIER)?;
    Ok(Box::new(ConstantClassifier::new(p.relevant)))
}

// ---------------------------------------------------------------------------
// Query strategies
// ---------------------------------------------------------------------------

const QUERY_STRATEGY: &str = "query_strategy";

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct PredeterminedParams {
    path: PathBuf,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct FixedListParams {
    queries: Vec<String>,
}

fn build_predetermined(spec: &ComponentSpec, ctx: &BuildContext, _: &Registries) -> SimResult<Box<dyn QueryStrategy>> {
    let p: PredeterminedParams = spec.parse_params(QUERY_STRATEGY)?;
    let path = resolve_path(&ctx.config_dir, &p.path);
    let queries = load_predetermined(&path, &ctx.user_id, &ctx.topic.id)?;
    Ok(Box::new(QueryList::new(queries, ctx.query_limit)))
}

fn build_fixed_list(spec: &ComponentSpec, ctx: &BuildContext, _: &Registries) -> SimResult<Box<dyn QueryStrategy>> {
    let p: FixedListParams = spec.parse_params(QUERY_STRATEGY)?;
    Ok(Box::new(QueryList::new(p.queries, ctx.query_limit)))
}

// ---------------------------------------------------------------------------
// Loggers
// ---------------------------------------------------------------------------

const LOGGER: &str = "logger";

fn default_time_limit() -> f64 {
    300.0
}

fn default_marked_goal() -> usize {
    3
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct FixedCostParams {
    #[serde(default = "default_time_limit")]
    time_limit: f64,
    #[serde(default)]
    costs: ActionCosts,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct FixedCostGoalParams {
    #[serde(default = "default_time_limit")]
    time_limit: f64,
    #[serde(default = "default_marked_goal")]
    marked_goal: usize,
    #[serde(default)]
    costs: ActionCosts,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct FixedCostNoTimeParams {
    #[serde(default)]
    costs: ActionCosts,
}

fn check_costs(costs: &ActionCosts, time_limit: f64) -> SimResult<()> {
    costs.validate().map_err(SimError::Config)?;
    if !time_limit.is_finite() || time_limit <= 0.0 {
        return Err(SimError::Config(format!("time_limit must be positive, got {time_limit}")));
    }
    Ok(())
}

fn build_fixed_cost(spec: &ComponentSpec, _: &BuildContext, _: &Registries) -> SimResult<Box<dyn InteractionLogger>> {
    let p: FixedCostParams = spec.parse_params(LOGGER)?;
    check_costs(&p.costs, p.time_limit)?;
    Ok(Box::new(FixedCostLogger::new(p.costs, p.time_limit)))
}

fn build_fixed_cost_goal(spec: &ComponentSpec, _: &BuildContext, _: &Registries) -> SimResult<Box<dyn InteractionLogger>> {
    let p: FixedCostGoalParams = spec.parse_params(LOGGER)?;
    check_costs(&p.costs, p.time_limit)?;
    if p.marked_goal == 0 {
        return Err(SimError::config("marked_goal must be positive"));
    }
    Ok(Box::new(FixedCostLogger::with_marked_goal(p.costs, p.time_limit, p.marked_goal)))
}

fn build_fixed_cost_no_time(
    spec: &ComponentSpec,
    ctx: &BuildContext,
    _: &Registries,
) -> SimResult<Box<dyn InteractionLogger>> {
    let p: FixedCostNoTimeParams = spec.parse_params(LOGGER)?;
    p.costs.validate().map_err(SimError::Config)?;
    Ok(Box::new(FixedCostLogger::without_time_limit(p.costs, ctx.total_queries)))
}
