use std::sync::Arc;

use serpsim_common::error::SimResult;
use serpsim_common::SerpImpression;

use super::{judge_viewport, SerpImpressionModel, ViewportConfig};
use crate::memory::SessionMemory;
use crate::traits::JudgmentOracle;

/// Every SERP is entered. The patch type is still judged so patch-driven
/// stopping rules can use it.
pub struct AlwaysAttractive {
    viewport: ViewportConfig,
    oracle: Arc<dyn JudgmentOracle>,
}

impl AlwaysAttractive {
    pub fn new(viewport: ViewportConfig, oracle: Arc<dyn JudgmentOracle>) -> SimResult<Self> {
        viewport.validate()?;
        Ok(Self { viewport, oracle })
    }
}

impl SerpImpressionModel for AlwaysAttractive {
    fn assess(&mut self, memory: &SessionMemory) -> SimResult<SerpImpression> {
        let view = judge_viewport(memory, &self.oracle, &self.viewport);
        Ok(SerpImpression {
            attractive: true,
            patch_type: view.patch_type,
        })
    }

    fn name(&self) -> &'static str {
        "always_attractive"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{hits, memory_with, qrels, MockBackend, TEST_TOPIC};
    use serpsim_common::{Action, PatchType, RevisionPolicy};

    #[test]
    fn attractive_even_when_nothing_is_relevant() {
        let backend = MockBackend::new().on_query("q", hits("d", 5));
        let mut memory = memory_with(backend, RevisionPolicy::None);
        memory.record_action(Action::Query);
        memory.add_issued_query("q").unwrap();

        let mut model = AlwaysAttractive::new(ViewportConfig::default(), Arc::new(qrels(&[]))).unwrap();
        let impression = model.assess(&memory).unwrap();
        assert!(impression.attractive);
        assert_eq!(impression.patch_type, PatchType::GradualIncrease);

        let mut model = AlwaysAttractive::new(
            ViewportConfig::default(),
            Arc::new(qrels(&[(TEST_TOPIC, "d0", 1), (TEST_TOPIC, "d1", 1), (TEST_TOPIC, "d2", 1)])),
        )
        .unwrap();
        assert_eq!(model.assess(&memory).unwrap().patch_type, PatchType::EarlyGain);
    }
}
