//! In-memory corpus backend: ranks documents by query-term overlap.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use serpsim_common::{Document, SearchHit};
use serpsim_core::SearchBackend;

/// Number of content words shown in a snippet after the title.
const SNIPPET_WORDS: usize = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusDocument {
    pub doc_id: String,
    pub title: String,
    pub content: String,
}

/// Cheap to clone; every session shares one index.
#[derive(Clone)]
pub struct CorpusBackend {
    index: Arc<CorpusIndex>,
}

struct CorpusIndex {
    documents: Vec<CorpusDocument>,
    /// Lowercased terms of each document's title and content.
    terms: Vec<HashSet<String>>,
    by_id: HashMap<String, usize>,
}

impl CorpusBackend {
    pub fn new(documents: Vec<CorpusDocument>) -> Result<Self> {
        let mut by_id = HashMap::with_capacity(documents.len());
        for (i, doc) in documents.iter().enumerate() {
            if by_id.insert(doc.doc_id.clone(), i).is_some() {
                anyhow::bail!("duplicate document id '{}' in corpus", doc.doc_id);
            }
        }
        let terms = documents
            .iter()
            .map(|d| tokenize(&d.title).chain(tokenize(&d.content)).collect())
            .collect();
        Ok(Self {
            index: Arc::new(CorpusIndex {
                documents,
                terms,
                by_id,
            }),
        })
    }

    /// Load a JSON array of `{ doc_id, title, content }` objects.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read corpus {}", path.display()))?;
        let documents: Vec<CorpusDocument> = serde_json::from_str(&json)
            .with_context(|| format!("cannot parse corpus {}", path.display()))?;
        let backend = Self::new(documents)?;
        info!(path = %path.display(), documents = backend.len(), "Corpus loaded");
        Ok(backend)
    }

    pub fn len(&self) -> usize {
        self.index.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.documents.is_empty()
    }

    fn snippet(doc: &CorpusDocument) -> SearchHit {
        let summary = doc
            .content
            .split_whitespace()
            .take(SNIPPET_WORDS)
            .collect::<Vec<_>>()
            .join(" ");
        SearchHit {
            doc_id: doc.doc_id.clone(),
            title: doc.title.clone(),
            summary,
            doc_ref: doc.doc_id.clone(),
        }
    }
}

impl SearchBackend for CorpusBackend {
    fn issue_query(&self, text: &str, offset: usize, limit: usize) -> Result<Vec<SearchHit>> {
        let query: HashSet<String> = tokenize(text).collect();
        let mut scored: Vec<(usize, usize)> = self
            .index
            .terms
            .iter()
            .enumerate()
            .filter_map(|(i, terms)| {
                let overlap = query.iter().filter(|t| terms.contains(*t)).count();
                (overlap > 0).then_some((i, overlap))
            })
            .collect();
        // Stable sort keeps corpus order among equal scores.
        scored.sort_by(|a, b| b.1.cmp(&a.1));

        let hits: Vec<SearchHit> = scored
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|(i, _)| Self::snippet(&self.index.documents[i]))
            .collect();
        debug!(query = text, hits = hits.len(), "Corpus search");
        Ok(hits)
    }

    fn fetch_document(&self, doc_ref: &str) -> Result<Document> {
        let i = self
            .index
            .by_id
            .get(doc_ref)
            .ok_or_else(|| anyhow!("document '{doc_ref}' is not in the corpus"))?;
        let doc = &self.index.documents[*i];
        Ok(Document {
            doc_id: doc.doc_id.clone(),
            title: doc.title.clone(),
            content: doc.content.clone(),
        })
    }
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: &str, title: &str, content: &str) -> CorpusDocument {
        CorpusDocument {
            doc_id: id.into(),
            title: title.into(),
            content: content.into(),
        }
    }

    fn corpus() -> CorpusBackend {
        CorpusBackend::new(vec![
            doc("d1", "Space news", "The Hubble telescope was launched in 1990."),
            doc("d2", "Hubble Telescope achievements", "Hubble imaged distant galaxies."),
            doc("d3", "Gardening", "Tomatoes need sun."),
            doc("d4", "Telescopes", "A telescope gathers light."),
        ])
        .unwrap()
    }

    fn ids(hits: &[SearchHit]) -> Vec<&str> {
        hits.iter().map(|h| h.doc_id.as_str()).collect()
    }

    #[test]
    fn ranks_by_overlap_then_corpus_order() {
        let hits = corpus().issue_query("HUBBLE telescope", 0, 10).unwrap();
        assert_eq!(ids(&hits), vec!["d1", "d2", "d4"]);
    }

    #[test]
    fn offset_and_limit_page_the_ranking() {
        let backend = corpus();
        let hits = backend.issue_query("hubble telescope", 1, 1).unwrap();
        assert_eq!(ids(&hits), vec!["d2"]);
        assert!(backend.issue_query("zebra", 0, 10).unwrap().is_empty());
    }

    #[test]
    fn snippet_truncates_content() {
        let long = (0..50).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ");
        let backend = CorpusBackend::new(vec![doc("d1", "w0 title", &long)]).unwrap();
        let hit = &backend.issue_query("w0", 0, 10).unwrap()[0];
        assert_eq!(hit.summary.split_whitespace().count(), SNIPPET_WORDS);
        assert_eq!(hit.title, "w0 title");
        assert_eq!(hit.doc_ref, "d1");
    }

    #[test]
    fn fetch_returns_full_document() {
        let backend = corpus();
        let d = backend.fetch_document("d3").unwrap();
        assert_eq!(d.content, "Tomatoes need sun.");
        assert!(backend.fetch_document("missing").is_err());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        assert!(CorpusBackend::new(vec![doc("d1", "a", "b"), doc("d1", "c", "d")]).is_err());
    }
}
