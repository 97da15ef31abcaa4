use std::sync::Arc;

use tracing::debug;

use serpsim_common::error::SimResult;
use serpsim_common::{SerpImpression, SimError};

use super::{judge_viewport, SerpImpressionModel, ViewportConfig};
use crate::memory::SessionMemory;
use crate::traits::JudgmentOracle;

/// Enter the SERP only if the viewport's judged precision exceeds `threshold`.
pub struct PrecisionThreshold {
    viewport: ViewportConfig,
    threshold: f64,
    oracle: Arc<dyn JudgmentOracle>,
}

impl PrecisionThreshold {
    pub fn new(viewport: ViewportConfig, threshold: f64, oracle: Arc<dyn JudgmentOracle>) -> SimResult<Self> {
        viewport.validate()?;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(SimError::Config(format!(
                "viewport_precision_threshold must lie in [0, 1], got {threshold}"
            )));
        }
        Ok(Self {
            viewport,
            threshold,
            oracle,
        })
    }
}

impl SerpImpressionModel for PrecisionThreshold {
    fn assess(&mut self, memory: &SessionMemory) -> SimResult<SerpImpression> {
        let view = judge_viewport(memory, &self.oracle, &self.viewport);
        let precision = view.precision();
        debug!(precision, threshold = self.threshold, "Viewport precision");
        Ok(SerpImpression {
            attractive: precision > self.threshold,
            patch_type: view.patch_type,
        })
    }

    fn name(&self) -> &'static str {
        "precision_threshold"
    }
}
