use std::collections::HashMap;
use std::path::Path;

use tracing::info;

use serpsim_common::error::SimResult;
use serpsim_common::SimError;

use crate::traits::JudgmentOracle;

/// In-memory TREC qrels: `topic iteration doc_id relevance` per line.
#[derive(Debug, Clone, Default)]
pub struct Qrels {
    judgments: HashMap<String, HashMap<String, i32>>,
    len: usize,
}

impl Qrels {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(text: &str) -> SimResult<Self> {
        let mut qrels = Self::new();
        for (lineno, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let fields: Vec<&str> = line.split_whitespace().collect();
            let [topic, _iteration, doc_id, relevance] = fields.as_slice() else {
                return Err(SimError::Config(format!(
                    "qrels line {}: expected 4 fields, found {}",
                    lineno + 1,
                    fields.len()
                )));
            };
            let relevance: i32 = relevance.parse().map_err(|_| {
                SimError::Config(format!(
                    "qrels line {}: invalid relevance '{relevance}'",
                    lineno + 1
                ))
            })?;
            qrels.insert(topic, doc_id, relevance);
        }
        Ok(qrels)
    }

    pub fn load(path: &Path) -> SimResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| SimError::Config(format!("cannot read qrels {}: {e}", path.display())))?;
        let qrels = Self::parse(&text)?;
        info!(
            path = %path.display(),
            topics = qrels.judgments.len(),
            judgments = qrels.len,
            "Qrels loaded"
        );
        Ok(qrels)
    }

    /// Later judgments for the same pair replace earlier ones.
    pub fn insert(&mut self, topic_id: &str, doc_id: &str, relevance: i32) {
        let previous = self
            .judgments
            .entry(topic_id.to_string())
            .or_default()
            .insert(doc_id.to_string(), relevance);
        if previous.is_none() {
            self.len += 1;
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn has_topic(&self, topic_id: &str) -> bool {
        self.judgments.contains_key(topic_id)
    }
}

impl JudgmentOracle for Qrels {
    fn lookup(&self, topic_id: &str, doc_id: &str) -> Option<i32> {
        self.judgments.get(topic_id)?.get(doc_id).copied()
    }
}
