//! Query strategies that replay a fixed list of queries.

use std::collections::VecDeque;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info};

use serpsim_core::{QueryStrategy, SessionMemory};

/// Issues queries in order until the list runs out.
pub struct QueryList {
    queries: VecDeque<String>,
}

impl QueryList {
    /// `limit` truncates the list to its first `limit` queries.
    pub fn new(mut queries: Vec<String>, limit: Option<usize>) -> Self {
        if let Some(limit) = limit {
            queries.truncate(limit);
        }
        debug!(queries = queries.len(), "Query list prepared");
        Self {
            queries: queries.into(),
        }
    }
}

impl QueryStrategy for QueryList {
    fn next_query(&mut self, _memory: &SessionMemory) -> Option<String> {
        self.queries.pop_front()
    }

    fn remaining(&self) -> Option<usize> {
        Some(self.queries.len())
    }
}

/// Parse a predetermined query file: `query_id,user,topic,terms...`.
///
/// Only lines for `user` and `topic` are kept, ordered by query id. Terms that
/// themselves contained commas are rejoined with spaces.
pub fn parse_predetermined(text: &str, user: &str, topic: &str) -> Result<Vec<String>> {
    let mut queries = Vec::new();
    for (lineno, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() < 4 {
            anyhow::bail!("query file line {}: expected query_id,user,topic,terms", lineno + 1);
        }
        if fields[1].trim() != user || fields[2].trim() != topic {
            continue;
        }
        let qid: i64 = fields[0]
            .trim()
            .parse()
            .with_context(|| format!("query file line {}: invalid query id '{}'", lineno + 1, fields[0]))?;
        let terms = fields[3..]
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        queries.push((qid, terms));
    }
    queries.sort_by_key(|(qid, _)| *qid);
    Ok(queries.into_iter().map(|(_, terms)| terms).collect())
}

pub fn load_predetermined(path: &Path, user: &str, topic: &str) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read query file {}", path.display()))?;
    let queries = parse_predetermined(&text, user, topic)?;
    info!(path = %path.display(), user, topic, queries = queries.len(), "Predetermined queries loaded");
    Ok(queries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serpsim_common::RevisionPolicy;
    use serpsim_core::testing::{memory_with, MockBackend};

    const QUERIES: &str = "\
3,u1,303,hubble,achievements
1,u1,303,hubble telescope
2,u2,303,space telescope
7,u1,344,abuses of e-mail
2,u1,303,hubble discoveries
";

    #[test]
    fn predetermined_filters_and_orders_by_id() {
        let queries = parse_predetermined(QUERIES, "u1", "303").unwrap();
        assert_eq!(
            queries,
            vec!["hubble telescope", "hubble discoveries", "hubble achievements"]
        );
    }

    #[test]
    fn malformed_lines_are_rejected() {
        assert!(parse_predetermined("1,u1,303\n", "u1", "303").is_err());
        assert!(parse_predetermined("x,u1,303,terms\n", "u1", "303").is_err());
    }

    #[test]
    fn query_list_honours_limit_and_reports_remaining() {
        let memory = memory_with(MockBackend::new(), RevisionPolicy::None);
        let mut list = QueryList::new(vec!["a".into(), "b".into(), "c".into()], Some(2));
        assert_eq!(list.remaining(), Some(2));
        assert_eq!(list.next_query(&memory).as_deref(), Some("a"));
        assert_eq!(list.next_query(&memory).as_deref(), Some("b"));
        assert_eq!(list.next_query(&memory), None);
        assert_eq!(list.remaining(), Some(0));
    }
}
