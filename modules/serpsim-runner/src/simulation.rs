//! Runs every configured user against every configured topic, one session
//! at a time, and saves each session's output.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use serpsim_common::error::SimResult;
use serpsim_common::{Action, SimulationConfig, TopicConfig, UserConfig};
use serpsim_core::{ActionStateMachine, JudgmentOracle, Qrels, SessionComponents, SessionMemory};

use crate::backend::CorpusBackend;
use crate::output::{OutputWriter, RunSummary, SessionRecord};
use crate::registry::{BuildContext, Registries};

/// Steps after which a session that never finishes is cut off.
pub const MAX_SESSION_STEPS: usize = 1_000_000;

pub struct Simulation {
    config: SimulationConfig,
    registries: Registries,
    backend: CorpusBackend,
    output: OutputWriter,
}

impl Simulation {
    /// Resolve every component up front; `output_dir` overrides the configured directory.
    pub fn new(config: SimulationConfig, output_dir: Option<PathBuf>) -> Result<Self> {
        let registries = Registries::standard();
        registries
            .validate(&config)
            .context("invalid component configuration")?;
        let backend = CorpusBackend::load(&config.resolve(&config.backend.corpus))?;
        let directory = output_dir.unwrap_or_else(|| config.resolve(&config.output.directory));
        let output = OutputWriter::new(&config.output, directory, &config.base_id)?;
        Ok(Self {
            config,
            registries,
            backend,
            output,
        })
    }

    pub fn run(&self) -> Result<RunSummary> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        info!(
            run_id = %run_id,
            base_id = self.config.base_id.as_str(),
            topics = self.config.topics.len(),
            users = self.config.users.len(),
            "Simulation starting"
        );

        let mut sessions = 0;
        for topic in &self.config.topics {
            let qrels_path = self.config.resolve(&topic.qrels);
            let oracle: Arc<dyn JudgmentOracle> = Arc::new(Qrels::load(&qrels_path)?);
            for user in &self.config.users {
                self.run_one(run_id, topic, user, oracle.clone())
                    .with_context(|| format!("session topic={} user={} failed", topic.id, user.id))?;
                sessions += 1;
            }
        }

        let summary = RunSummary {
            run_id,
            base_id: self.config.base_id.clone(),
            started_at,
            finished_at: Utc::now(),
            sessions,
        };
        self.output.mark_completed(&summary)?;
        info!(run_id = %run_id, sessions, dir = %self.output.directory().display(), "Simulation complete");
        Ok(summary)
    }

    fn run_one(
        &self,
        run_id: Uuid,
        topic: &TopicConfig,
        user: &UserConfig,
        oracle: Arc<dyn JudgmentOracle>,
    ) -> Result<()> {
        let started_at = Utc::now();
        let ctx = BuildContext::builder()
            .topic(topic.topic())
            .oracle(oracle)
            .base_seed(self.config.base_seed)
            .user_id(user.id.as_str())
            .config_dir(self.config.base_dir.clone())
            .query_limit(user.query_limit)
            .build();
        let mut machine = build_machine(&self.registries, &ctx, user, self.backend.clone())?;

        info!(topic = topic.id.as_str(), user = user.id.as_str(), "Session starting");
        let steps = run_session(&mut machine)?;

        let (memory, components) = machine.into_parts();
        let record = SessionRecord {
            run_id,
            base_id: self.config.base_id.clone(),
            topic_id: topic.id.clone(),
            user_id: user.id.clone(),
            started_at,
            finished_at: Utc::now(),
            steps,
            report: memory.report(),
            issued_queries: memory.issued_queries().iter().map(|q| q.text.clone()).collect(),
            relevant_documents: memory.relevant_documents().to_vec(),
        };
        self.output
            .write_session(&record, components.logger.entries(), &memory)
    }
}

/// Assemble one user's components for one topic around a fresh session memory.
pub fn build_machine(
    registries: &Registries,
    ctx: &BuildContext,
    user: &UserConfig,
    backend: CorpusBackend,
) -> SimResult<ActionStateMachine> {
    let query_strategy = registries
        .query_strategy
        .build(&user.query_strategy, ctx, registries)?;
    let ctx = BuildContext {
        total_queries: query_strategy.remaining(),
        ..ctx.clone()
    };
    let components = SessionComponents::builder()
        .query_strategy(query_strategy)
        .snippet_classifier(registries.classifier.build(&user.snippet_classifier, &ctx, registries)?)
        .document_classifier(registries.classifier.build(&user.document_classifier, &ctx, registries)?)
        .stopping(registries.stopping.build(&user.stopping, &ctx, registries)?)
        .impression(registries.serp_impression.build(&user.serp_impression, &ctx, registries)?)
        .logger(registries.logger.build(&user.logger, &ctx, registries)?)
        .build();
    let memory = SessionMemory::new(ctx.topic.clone(), Box::new(backend), user.revision_policy);
    Ok(ActionStateMachine::new(memory, components))
}

/// Step the machine until its logger reports the session finished. Returns
/// the number of actions performed.
pub fn run_session(machine: &mut ActionStateMachine) -> SimResult<usize> {
    let mut steps = 0;
    while !machine.is_finished() {
        if steps >= MAX_SESSION_STEPS {
            warn!(steps, "Session did not finish; stopping it");
            break;
        }
        let action = machine.step()?;
        steps += 1;
        if action == Action::Query {
            if let Some(progress) = machine.logger().progress() {
                info!(
                    queries = machine.memory().issued_queries().len(),
                    progress_pct = (progress * 1000.0).round() / 10.0,
                    "Session progress"
                );
            }
        }
    }
    let report = machine.report();
    info!(
        topic = machine.memory().topic().id.as_str(),
        steps,
        queries = report.queries_issued,
        snippets = report.snippets_examined,
        documents = report.documents_examined,
        marked_relevant = report.documents_marked_relevant,
        "Session finished"
    );
    Ok(steps)
}
