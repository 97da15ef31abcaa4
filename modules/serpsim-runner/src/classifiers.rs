//! Relevance classifiers backed by the qrels oracle.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::Rng;
use tracing::debug;

use serpsim_common::ResultItem;
use serpsim_core::{JudgmentOracle, RelevanceClassifier};

/// Relevant iff the oracle (with the topic "0" fallback) says so.
pub struct PerfectClassifier {
    topic_id: String,
    oracle: Arc<dyn JudgmentOracle>,
}

impl PerfectClassifier {
    pub fn new(topic_id: impl Into<String>, oracle: Arc<dyn JudgmentOracle>) -> Self {
        Self {
            topic_id: topic_id.into(),
            oracle,
        }
    }
}

impl RelevanceClassifier for PerfectClassifier {
    fn is_relevant(&mut self, item: &ResultItem) -> bool {
        self.oracle.judgment_with_fallback(&self.topic_id, &item.doc_id) > 0
    }
}

/// Relevant iff the topic's own judgments say so. No fallback topic.
pub struct InformedClassifier {
    topic_id: String,
    oracle: Arc<dyn JudgmentOracle>,
}

impl InformedClassifier {
    pub fn new(topic_id: impl Into<String>, oracle: Arc<dyn JudgmentOracle>) -> Self {
        Self {
            topic_id: topic_id.into(),
            oracle,
        }
    }
}

impl RelevanceClassifier for InformedClassifier {
    fn is_relevant(&mut self, item: &ResultItem) -> bool {
        self.oracle
            .lookup(&self.topic_id, &item.doc_id)
            .is_some_and(|j| j > 0)
    }
}

/// Oracle judgment, kept with probability `rprob` for relevant documents and
/// `nprob` for nonrelevant ones; otherwise flipped. `nprob` is the chance of
/// keeping a nonrelevant verdict, not of misjudging it as relevant.
pub struct StochasticClassifier {
    topic_id: String,
    oracle: Arc<dyn JudgmentOracle>,
    rprob: f64,
    nprob: f64,
    rng: StdRng,
}

impl StochasticClassifier {
    pub fn new(
        topic_id: impl Into<String>,
        oracle: Arc<dyn JudgmentOracle>,
        rprob: f64,
        nprob: f64,
        rng: StdRng,
    ) -> Self {
        Self {
            topic_id: topic_id.into(),
            oracle,
            rprob,
            nprob,
            rng,
        }
    }
}

impl RelevanceClassifier for StochasticClassifier {
    fn is_relevant(&mut self, item: &ResultItem) -> bool {
        let truly_relevant = self.oracle.judgment_with_fallback(&self.topic_id, &item.doc_id) > 0;
        let keep = if truly_relevant { self.rprob } else { self.nprob };
        let draw: f64 = self.rng.random();
        let judged = if draw <= keep { truly_relevant } else { !truly_relevant };
        debug!(doc_id = item.doc_id.as_str(), truly_relevant, judged, "Stochastic judgment");
        judged
    }
}

/// Always gives the same answer.
pub struct ConstantClassifier {
    relevant: bool,
}

impl ConstantClassifier {
    pub fn new(relevant: bool) -> Self {
        Self { relevant }
    }
}

impl RelevanceClassifier for ConstantClassifier {
    fn is_relevant(&mut self, _item: &ResultItem) -> bool {
        self.relevant
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serpsim_common::Judgment;
    use serpsim_core::rng::{seeded_rng, CLASSIFIER_SEED_OFFSET};
    use serpsim_core::testing::{hit, qrels};

    fn item(doc_id: &str) -> ResultItem {
        ResultItem::snippet(&hit(doc_id), 1, Judgment::Unjudged)
    }

    fn oracle() -> Arc<dyn JudgmentOracle> {
        Arc::new(qrels(&[("303", "rel", 1), ("303", "non", 0), ("0", "fallback", 1)]))
    }

    #[test]
    fn perfect_uses_fallback_topic() {
        let mut c = PerfectClassifier::new("303", oracle());
        assert!(c.is_relevant(&item("rel")));
        assert!(!c.is_relevant(&item("non")));
        assert!(c.is_relevant(&item("fallback")));
        assert!(!c.is_relevant(&item("unknown")));
    }

    #[test]
    fn informed_ignores_fallback_topic() {
        let mut c = InformedClassifier::new("303", oracle());
        assert!(c.is_relevant(&item("rel")));
        assert!(!c.is_relevant(&item("fallback")));
    }

    #[test]
    fn stochastic_with_certain_probabilities_is_perfect() {
        let mut c = StochasticClassifier::new("303", oracle(), 1.0, 1.0, seeded_rng(0, CLASSIFIER_SEED_OFFSET));
        for _ in 0..100 {
            assert!(c.is_relevant(&item("rel")));
            assert!(!c.is_relevant(&item("non")));
        }
    }

    #[test]
    fn stochastic_with_zero_probabilities_always_flips() {
        let mut c = StochasticClassifier::new("303", oracle(), 0.0, 0.0, seeded_rng(0, CLASSIFIER_SEED_OFFSET));
        let flips = (0..200).filter(|_| !c.is_relevant(&item("rel"))).count();
        // draw <= 0.0 only for an exact zero draw.
        assert!(flips >= 199);
    }

    #[test]
    fn nprob_keeps_nonrelevant_verdicts() {
        let mut c = StochasticClassifier::new("303", oracle(), 0.0, 1.0, seeded_rng(7, CLASSIFIER_SEED_OFFSET));
        for _ in 0..100 {
            assert!(!c.is_relevant(&item("non")));
        }
    }

    #[test]
    fn constant_ignores_the_item() {
        assert!(ConstantClassifier::new(true).is_relevant(&item("non")));
        assert!(!ConstantClassifier::new(false).is_relevant(&item("rel")));
    }
}
