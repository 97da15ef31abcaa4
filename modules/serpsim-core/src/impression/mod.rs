//! SERP impressions: is a fresh results page worth entering, and what kind
//! of patch does it look like?
//!
//! Every model judges the same viewport: the first `viewport_size` results,
//! scored with oracle judgments. Models only read the session; the state
//! machine records the returned impression.

mod always;
mod precision;
mod stochastic;

pub use always::AlwaysAttractive;
pub use precision::PrecisionThreshold;
pub use stochastic::{AbandonProbabilities, StochasticImpression};

use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use serpsim_common::error::SimResult;
use serpsim_common::{PatchType, SerpImpression, SimError};

use crate::memory::SessionMemory;
use crate::traits::JudgmentOracle;

pub trait SerpImpressionModel {
    fn assess(&mut self, memory: &SessionMemory) -> SimResult<SerpImpression>;

    /// Registry kind, used in traces.
    fn name(&self) -> &'static str;
}

/// Classify a same-query judgment sequence by how early its gain arrives.
///
/// The cumulative gain curve of the first `viewport_size` judgments is summed
/// and normalised by the curve of an all-relevant viewport of the same length.
pub fn patch_type(judgments: &[u32], viewport_size: usize, threshold: f64) -> PatchType {
    if judgments.len() < 2 {
        return PatchType::Undefined;
    }
    let viewport = &judgments[..judgments.len().min(viewport_size)];
    if viewport.is_empty() {
        return PatchType::Undefined;
    }
    let judged = cumulative_area(viewport.iter().copied());
    let perfect = cumulative_area(std::iter::repeat(1).take(viewport.len()));
    if judged as f64 / perfect as f64 >= threshold {
        PatchType::EarlyGain
    } else {
        PatchType::GradualIncrease
    }
}

fn cumulative_area(judgments: impl Iterator<Item = u32>) -> u64 {
    judgments
        .scan(0u64, |running, j| {
            *running += u64::from(j);
            Some(*running)
        })
        .sum()
}

/// Viewport settings shared by every impression model.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct ViewportConfig {
    pub viewport_size: usize,
    pub patch_type_threshold: f64,
    /// Results already examined as snippets this session count as not relevant.
    pub novel_snippets_only: bool,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            viewport_size: 10,
            patch_type_threshold: 0.6,
            novel_snippets_only: false,
        }
    }
}

impl ViewportConfig {
    pub fn validate(&self) -> SimResult<()> {
        if self.viewport_size == 0 {
            return Err(SimError::config("viewport_size must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.patch_type_threshold) {
            return Err(SimError::Config(format!(
                "patch_type_threshold must lie in [0, 1], got {}",
                self.patch_type_threshold
            )));
        }
        Ok(())
    }
}

/// Oracle judgments of the current viewport.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportJudgment {
    pub judgments: Vec<u32>,
    pub patch_type: PatchType,
}

impl ViewportJudgment {
    /// Fraction of viewport results judged relevant; 0 for an empty viewport.
    pub fn precision(&self) -> f64 {
        if self.judgments.is_empty() {
            return 0.0;
        }
        self.judgments.iter().sum::<u32>() as f64 / self.judgments.len() as f64
    }
}

pub fn judge_viewport(
    memory: &SessionMemory,
    oracle: &Arc<dyn JudgmentOracle>,
    config: &ViewportConfig,
) -> ViewportJudgment {
    let topic = &memory.topic().id;
    let seen = memory.all_examined_snippets();
    let judgments: Vec<u32> = memory
        .current_results()
        .iter()
        .take(config.viewport_size)
        .map(|hit| {
            if config.novel_snippets_only && seen.iter().any(|s| s.doc_id == hit.doc_id) {
                0
            } else {
                oracle.binary_judgment(topic, &hit.doc_id)
            }
        })
        .collect();
    let patch_type = patch_type(&judgments, config.viewport_size, config.patch_type_threshold);
    debug!(?judgments, %patch_type, "Viewport judged");
    ViewportJudgment {
        judgments,
        patch_type,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{hits, memory_with, qrels, examine_next, MockBackend, TEST_TOPIC};
    use serpsim_common::{Action, Judgment, RevisionPolicy};

    #[test]
    fn single_early_hit_is_gradual() {
        let judgments = [1, 0, 0, 0, 0, 0, 0, 0, 0, 0];
        assert_eq!(patch_type(&judgments, 10, 0.6), PatchType::GradualIncrease);
    }

    #[test]
    fn all_relevant_is_early_gain() {
        assert_eq!(patch_type(&[1; 10], 10, 0.6), PatchType::EarlyGain);
    }

    #[test]
    fn fewer_than_two_judgments_is_undefined() {
        assert_eq!(patch_type(&[1], 10, 0.6), PatchType::Undefined);
        assert_eq!(patch_type(&[], 10, 0.6), PatchType::Undefined);
    }

    #[test]
    fn front_loaded_gain_beats_back_loaded() {
        // cumsum [1,2,3,3,3] = 12 of 15 vs [0,0,1,2,3] = 6 of 15
        assert_eq!(patch_type(&[1, 1, 1, 0, 0], 5, 0.6), PatchType::EarlyGain);
        assert_eq!(patch_type(&[0, 0, 1, 1, 1], 5, 0.6), PatchType::GradualIncrease);
    }

    #[test]
    fn only_the_viewport_is_scored() {
        let judgments = [1, 1, 0, 0, 0, 0];
        assert_eq!(patch_type(&judgments, 2, 0.6), PatchType::EarlyGain);
        assert_eq!(patch_type(&judgments, 6, 0.6), PatchType::GradualIncrease);
    }

    #[test]
    fn viewport_uses_oracle_with_fallback_and_clamping() {
        let backend = MockBackend::new().on_query("q", hits("d", 4));
        let mut memory = memory_with(backend, RevisionPolicy::None);
        memory.record_action(Action::Query);
        memory.add_issued_query("q").unwrap();
        let oracle: Arc<dyn JudgmentOracle> =
            Arc::new(qrels(&[(TEST_TOPIC, "d0", 2), ("0", "d2", 1), (TEST_TOPIC, "d3", 0)]));

        let config = ViewportConfig {
            viewport_size: 3,
            ..ViewportConfig::default()
        };
        let view = judge_viewport(&memory, &oracle, &config);
        assert_eq!(view.judgments, vec![1, 0, 1]);
        assert!((view.precision() - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn novel_snippets_only_discounts_seen_results() {
        let backend = MockBackend::new()
            .on_query("q1", hits("d", 1))
            .on_query("q2", hits("d", 2));
        let mut memory = memory_with(backend, RevisionPolicy::None);
        memory.record_action(Action::Query);
        memory.add_issued_query("q1").unwrap();
        examine_next(&mut memory, Judgment::Relevant, false);
        memory.record_action(Action::Query);
        memory.add_issued_query("q2").unwrap();

        let oracle: Arc<dyn JudgmentOracle> = Arc::new(qrels(&[(TEST_TOPIC, "d0", 1), (TEST_TOPIC, "d1", 1)]));
        let novel = ViewportConfig {
            novel_snippets_only: true,
            ..ViewportConfig::default()
        };
        assert_eq!(judge_viewport(&memory, &oracle, &novel).judgments, vec![0, 1]);
        assert_eq!(
            judge_viewport(&memory, &oracle, &ViewportConfig::default()).judgments,
            vec![1, 1]
        );
    }

    #[test]
    fn empty_viewport_has_zero_precision() {
        let view = ViewportJudgment {
            judgments: Vec::new(),
            patch_type: PatchType::Undefined,
        };
        assert_eq!(view.precision(), 0.0);
    }
}
