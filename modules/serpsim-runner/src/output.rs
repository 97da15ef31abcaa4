//! Per-session output files (interaction log, relevance judgments, query log,
//! JSON session record) and the run's COMPLETED marker.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use serpsim_common::config::OutputConfig;
use serpsim_common::{InteractionEntry, SessionReport};
use serpsim_core::SessionMemory;

pub const COMPLETED_MARKER: &str = "COMPLETED";

/// Persisted summary of one topic × user session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub run_id: Uuid,
    pub base_id: String,
    pub topic_id: String,
    pub user_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub steps: usize,
    pub report: SessionReport,
    pub issued_queries: Vec<String>,
    pub relevant_documents: Vec<String>,
}

impl SessionRecord {
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read session record {}", path.display()))?;
        Ok(serde_json::from_str(&json)?)
    }
}

/// Summary written into the COMPLETED marker once every session is saved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub base_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub sessions: usize,
}

pub struct OutputWriter {
    directory: PathBuf,
    base_id: String,
    save_interaction_log: bool,
    save_relevance_judgments: bool,
}

impl OutputWriter {
    pub fn new(config: &OutputConfig, directory: PathBuf, base_id: &str) -> Result<Self> {
        std::fs::create_dir_all(&directory)
            .with_context(|| format!("cannot create output directory {}", directory.display()))?;
        Ok(Self {
            directory,
            base_id: base_id.to_string(),
            save_interaction_log: config.save_interaction_log,
            save_relevance_judgments: config.save_relevance_judgments,
        })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// `<dir>/<base_id>-<topic>-<user>.<extension>`
    pub fn session_path(&self, topic_id: &str, user_id: &str, extension: &str) -> PathBuf {
        self.directory
            .join(format!("{}-{topic_id}-{user_id}.{extension}", self.base_id))
    }

    pub fn write_session(
        &self,
        record: &SessionRecord,
        entries: &[InteractionEntry],
        memory: &SessionMemory,
    ) -> Result<()> {
        let topic = record.topic_id.as_str();
        let user = record.user_id.as_str();

        if self.save_interaction_log {
            write_lines(&self.session_path(topic, user, "log"), entries.iter())?;
        }
        if self.save_relevance_judgments {
            let rels = memory
                .relevant_documents()
                .iter()
                .enumerate()
                .map(|(i, doc_id)| format!("{topic} Q0 {doc_id} {rank} {rank} Exp", rank = i + 1));
            write_lines(&self.session_path(topic, user, "rels"), rels)?;
        }
        write_lines(&self.session_path(topic, user, "queries"), memory.issued_queries().iter().map(|q| &q.text))?;

        let json = serde_json::to_string_pretty(record)?;
        let path = self.session_path(topic, user, "json");
        std::fs::write(&path, json).with_context(|| format!("cannot write {}", path.display()))?;

        info!(topic, user, dir = %self.directory.display(), "Session output saved");
        Ok(())
    }

    pub fn mark_completed(&self, summary: &RunSummary) -> Result<()> {
        let path = self.directory.join(COMPLETED_MARKER);
        let json = serde_json::to_string_pretty(summary)?;
        std::fs::write(&path, json).with_context(|| format!("cannot write {}", path.display()))?;
        Ok(())
    }
}

fn write_lines<T: std::fmt::Display>(path: &Path, lines: impl Iterator<Item = T>) -> Result<()> {
    let mut out = String::new();
    for line in lines {
        writeln!(out, "{line}")?;
    }
    std::fs::write(path, out).with_context(|| format!("cannot write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serpsim_common::{Action, Judgment, RevisionPolicy};
    use serpsim_core::testing::{examine_next, hits, memory_with, MockBackend, TEST_TOPIC};

    fn session_memory() -> SessionMemory {
        let backend = MockBackend::new().on_query("hubble", hits("d", 3));
        let mut memory = memory_with(backend, RevisionPolicy::None);
        memory.record_action(Action::Query);
        memory.add_issued_query("hubble").unwrap();
        examine_next(&mut memory, Judgment::Relevant, true);
        examine_next(&mut memory, Judgment::Relevant, true);
        memory
    }

    fn record(memory: &SessionMemory) -> SessionRecord {
        let now = Utc::now();
        SessionRecord {
            run_id: Uuid::new_v4(),
            base_id: "trec".into(),
            topic_id: TEST_TOPIC.into(),
            user_id: "u1".into(),
            started_at: now,
            finished_at: now,
            steps: 7,
            report: memory.report(),
            issued_queries: vec!["hubble".into()],
            relevant_documents: memory.relevant_documents().to_vec(),
        }
    }

    #[test]
    fn writes_all_session_files() {
        let dir = tempfile::tempdir().unwrap();
        let writer = OutputWriter::new(&OutputConfig::default(), dir.path().join("out"), "trec").unwrap();
        let memory = session_memory();
        let entries = vec![InteractionEntry::Info {
            info_type: "OUT_OF_QUERIES".into(),
            text: "done".into(),
        }];
        writer.write_session(&record(&memory), &entries, &memory).unwrap();

        let log = std::fs::read_to_string(writer.session_path("303", "u1", "log")).unwrap();
        assert_eq!(log, "INFO OUT_OF_QUERIES done\n");
        let rels = std::fs::read_to_string(writer.session_path("303", "u1", "rels")).unwrap();
        assert_eq!(rels, "303 Q0 d0 1 1 Exp\n303 Q0 d1 2 2 Exp\n");
        let queries = std::fs::read_to_string(writer.session_path("303", "u1", "queries")).unwrap();
        assert_eq!(queries, "hubble\n");

        let saved = SessionRecord::load(&writer.session_path("303", "u1", "json")).unwrap();
        assert_eq!(saved.steps, 7);
        assert_eq!(saved.report.documents_marked_relevant, 2);
    }

    #[test]
    fn disabled_outputs_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let config = OutputConfig {
            save_interaction_log: false,
            save_relevance_judgments: false,
            ..OutputConfig::default()
        };
        let writer = OutputWriter::new(&config, dir.path().to_path_buf(), "trec").unwrap();
        let memory = session_memory();
        writer.write_session(&record(&memory), &[], &memory).unwrap();

        assert!(!writer.session_path("303", "u1", "log").exists());
        assert!(!writer.session_path("303", "u1", "rels").exists());
        assert!(writer.session_path("303", "u1", "queries").exists());
    }

    #[test]
    fn completed_marker_records_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let writer = OutputWriter::new(&OutputConfig::default(), dir.path().to_path_buf(), "trec").unwrap();
        let now = Utc::now();
        writer
            .mark_completed(&RunSummary {
                run_id: Uuid::new_v4(),
                base_id: "trec".into(),
                started_at: now,
                finished_at: now,
                sessions: 2,
            })
            .unwrap();
        let marker = std::fs::read_to_string(dir.path().join(COMPLETED_MARKER)).unwrap();
        assert!(marker.contains("\"sessions\": 2"));
    }
}
