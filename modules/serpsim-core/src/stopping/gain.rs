use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use serpsim_common::error::SimResult;
use serpsim_common::{Decision, ResultItem};

use super::{require_non_negative, DecisionContext, StoppingStrategy};

/// Which items the rate of gain is computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GainVariant {
    /// Gain of examined snippets; time = query + doc_time per snippet.
    Snippets,
    /// Gain of examined documents; time = query + documents + snippets.
    Documents,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct IftParams {
    /// Minimum acceptable discounted gain per second.
    pub gain_threshold: f64,
    pub query_time: f64,
    pub doc_time: f64,
    pub snippet_time: f64,
    /// Exponent of the positional discount `1 / pos^discount`.
    pub discount: f64,
    /// Ranks to read before the rate of gain is trusted.
    pub rank_threshold: usize,
}

impl Default for IftParams {
    fn default() -> Self {
        Self {
            gain_threshold: 0.015,
            query_time: 15.0,
            doc_time: 20.0,
            snippet_time: 3.0,
            discount: 0.5,
            rank_threshold: 1,
        }
    }
}

/// Information-foraging stopping: leave the patch once its discounted rate
/// of gain drops below `gain_threshold`.
#[derive(Debug, Clone)]
pub struct IftRateOfGain {
    variant: GainVariant,
    params: IftParams,
}

impl IftRateOfGain {
    pub fn new(variant: GainVariant, params: IftParams) -> SimResult<Self> {
        require_non_negative("gain_threshold", params.gain_threshold)?;
        require_non_negative("query_time", params.query_time)?;
        require_non_negative("doc_time", params.doc_time)?;
        require_non_negative("snippet_time", params.snippet_time)?;
        require_non_negative("discount", params.discount)?;
        Ok(Self { variant, params })
    }

    fn discounted_gain(&self, items: &[ResultItem]) -> f64 {
        items
            .iter()
            .enumerate()
            .map(|(i, item)| item.judgment.gain() as f64 / ((i + 1) as f64).powf(self.params.discount))
            .sum()
    }
}

impl StoppingStrategy for IftRateOfGain {
    fn decide(&mut self, ctx: &DecisionContext<'_>) -> SimResult<Decision> {
        if ctx.memory.serp_cursor() < self.params.rank_threshold {
            return Ok(Decision::Snippet);
        }
        let snippets = ctx.memory.examined_snippets();
        let documents = ctx.memory.examined_documents();
        let p = &self.params;
        let (gain, elapsed) = match self.variant {
            GainVariant::Snippets => (
                self.discounted_gain(snippets),
                p.query_time + p.doc_time * snippets.len() as f64,
            ),
            GainVariant::Documents => (
                self.discounted_gain(documents),
                p.query_time
                    + p.doc_time * documents.len() as f64
                    + p.snippet_time * snippets.len() as f64,
            ),
        };
        // All costs zero: nothing has been spent, so the patch is still worth reading.
        if elapsed <= 0.0 {
            return Ok(Decision::Snippet);
        }
        let rate = gain / elapsed;
        debug!(variant = ?self.variant, gain, elapsed, rate, "IFT rate of gain");
        if rate >= p.gain_threshold {
            Ok(Decision::Snippet)
        } else {
            Ok(Decision::Query)
        }
    }

    fn name(&self) -> &'static str {
        match self.variant {
            GainVariant::Snippets => "ift",
            GainVariant::Documents => "ift2",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stopping::test_support::decide;
    use crate::testing::{judged_memory, judged_memory_with_documents};

    fn ift(variant: GainVariant) -> IftRateOfGain {
        IftRateOfGain::new(variant, IftParams::default()).unwrap()
    }

    #[test]
    fn snippet_rate_above_threshold_keeps_reading() {
        // 1 / (15 + 20) ≈ 0.029
        assert_eq!(decide(&mut ift(GainVariant::Snippets), &judged_memory(&[1])), Decision::Snippet);
    }

    #[test]
    fn snippet_rate_decays_with_depth() {
        // 1 / (15 + 100) ≈ 0.0087
        assert_eq!(
            decide(&mut ift(GainVariant::Snippets), &judged_memory(&[1, 0, 0, 0, 0])),
            Decision::Query
        );
        assert_eq!(decide(&mut ift(GainVariant::Snippets), &judged_memory(&[0])), Decision::Query);
    }

    #[test]
    fn document_variant_counts_only_read_documents() {
        // 1 / (15 + 20 + 3) ≈ 0.026
        assert_eq!(
            decide(&mut ift(GainVariant::Documents), &judged_memory_with_documents(&[1])),
            Decision::Snippet
        );
        assert_eq!(decide(&mut ift(GainVariant::Documents), &judged_memory(&[1])), Decision::Query);
    }

    #[test]
    fn rank_threshold_delays_the_estimate() {
        let params = IftParams {
            rank_threshold: 3,
            ..IftParams::default()
        };
        let mut s = IftRateOfGain::new(GainVariant::Snippets, params).unwrap();
        assert_eq!(decide(&mut s, &judged_memory(&[0, 0])), Decision::Snippet);
        assert_eq!(decide(&mut s, &judged_memory(&[0, 0, 0])), Decision::Query);
    }

    #[test]
    fn params_deserialize_with_defaults() {
        let p: IftParams = serde_json::from_str(r#"{"gain_threshold": 0.02}"#).unwrap();
        assert_eq!(p.gain_threshold, 0.02);
        assert_eq!(p.query_time, 15.0);
        assert!(serde_json::from_str::<IftParams>(r#"{"gain": 1}"#).is_err());
    }
}
