//! ActionStateMachine: sequences QUERY → SERP → SNIPPET → DOC → MARK.
//!
//! One `step()` picks the next action from the last one and its outcome,
//! records it, and performs it. Whether the session is over is the driver's
//! call (`InteractionLogger::is_finished`), not the machine's.

use tracing::{debug, info};
use typed_builder::TypedBuilder;

use serpsim_common::error::SimResult;
use serpsim_common::{
    Action, ActionEvent, DocStatus, Judgment, PatchType, SerpImpression, SerpStatus, SessionReport, SimError,
    SnippetStatus,
};

use crate::impression::SerpImpressionModel;
use crate::memory::SessionMemory;
use crate::stopping::{DecisionContext, StoppingStrategy};
use crate::traits::{InteractionLogger, QueryStrategy, RelevanceClassifier};

/// The pluggable parts of one simulated searcher.
#[derive(TypedBuilder)]
pub struct SessionComponents {
    pub query_strategy: Box<dyn QueryStrategy>,
    pub snippet_classifier: Box<dyn RelevanceClassifier>,
    pub document_classifier: Box<dyn RelevanceClassifier>,
    pub stopping: Box<dyn StoppingStrategy>,
    pub impression: Box<dyn SerpImpressionModel>,
    pub logger: Box<dyn InteractionLogger>,
}

pub struct ActionStateMachine {
    memory: SessionMemory,
    components: SessionComponents,
    /// Outcome of the last performed action.
    last_outcome: bool,
}

impl ActionStateMachine {
    pub fn new(memory: SessionMemory, components: SessionComponents) -> Self {
        Self {
            memory,
            components,
            last_outcome: false,
        }
    }

    /// Perform exactly one action and return it.
    pub fn step(&mut self) -> SimResult<Action> {
        let next = self.next_action()?;
        self.memory.record_action(next);
        let outcome = match next {
            Action::Query => self.do_query()?,
            Action::Serp => self.do_serp()?,
            Action::Snippet => self.do_snippet()?,
            Action::Doc => self.do_document()?,
            Action::Mark => self.do_mark()?,
        };
        debug!(action = %next, outcome, "Action performed");
        self.last_outcome = outcome;
        Ok(next)
    }

    fn next_action(&mut self) -> SimResult<Action> {
        let Some(last) = self.memory.last_action() else {
            return Ok(Action::Query);
        };
        match (last, self.last_outcome) {
            (Action::Query, true) => Ok(Action::Serp),
            // Exhausted query strategy: keep asking so the logger sees it again.
            (Action::Query, false) => Ok(Action::Query),
            (Action::Serp, true) => Ok(Action::Snippet),
            (Action::Serp, false) => Ok(Action::Query),
            (Action::Snippet, true) => Ok(Action::Doc),
            (Action::Doc, true) => Ok(Action::Mark),
            (Action::Snippet, false) | (Action::Doc, false) | (Action::Mark, _) => self.decision_point(),
        }
    }

    /// End of the SERP forces a new query; otherwise the stopping strategy decides.
    fn decision_point(&mut self) -> SimResult<Action> {
        if self.memory.at_end_of_serp() {
            debug!(cursor = self.memory.serp_cursor(), "End of SERP reached");
            self.components
                .logger
                .log_info("SERP_END_REACHED", "Reached the end of the SERP; issuing the next query");
            return Ok(Action::Query);
        }
        let ctx = DecisionContext {
            memory: &self.memory,
            logger: &*self.components.logger,
        };
        let decision = self.components.stopping.decide(&ctx)?;
        debug!(strategy = self.components.stopping.name(), ?decision, "Stopping decision");
        Ok(decision.into())
    }

    fn do_query(&mut self) -> SimResult<bool> {
        let Some(text) = self.components.query_strategy.next_query(&self.memory) else {
            info!(
                queries_issued = self.memory.issued_queries().len(),
                "Query strategy exhausted"
            );
            self.components.logger.queries_exhausted();
            self.components
                .logger
                .log_info("OUT_OF_QUERIES", "The simulated user has run out of queries");
            return Ok(false);
        };
        self.memory.add_issued_query(&text)?;
        self.components.logger.log_action(&ActionEvent::Query { text });
        Ok(true)
    }

    fn do_serp(&mut self) -> SimResult<bool> {
        if self.memory.current_result_count() == 0 {
            self.components.logger.log_action(&ActionEvent::Serp {
                status: SerpStatus::EmptySerp,
            });
            self.memory.record_serp_impression(SerpImpression {
                attractive: false,
                patch_type: PatchType::Undefined,
            });
            return Ok(false);
        }
        self.components.logger.log_action(&ActionEvent::Serp {
            status: SerpStatus::ExamineSerp,
        });
        let impression = self.components.impression.assess(&self.memory)?;
        debug!(
            model = self.components.impression.name(),
            attractive = impression.attractive,
            patch_type = %impression.patch_type,
            "SERP assessed"
        );
        self.memory.record_serp_impression(impression);
        Ok(impression.attractive)
    }

    fn do_snippet(&mut self) -> SimResult<bool> {
        self.memory.examine_snippet()?;
        self.memory.advance_serp_cursor()?;
        let snippet = self.memory.current_snippet()?.clone();

        if self.memory.observation_count(&snippet) > 0 {
            self.components.logger.log_action(&ActionEvent::Snippet {
                status: SnippetStatus::SeenPreviously,
                doc_id: snippet.doc_id,
            });
            return Ok(false);
        }

        let relevant = self.components.snippet_classifier.is_relevant(&snippet);
        self.memory
            .judge_current_snippet(Judgment::from_relevance(relevant))?;
        let status = if relevant {
            SnippetStatus::SnippetRelevant
        } else {
            SnippetStatus::SnippetNotRelevant
        };
        self.components.logger.log_action(&ActionEvent::Snippet {
            status,
            doc_id: snippet.doc_id,
        });
        Ok(relevant)
    }

    fn do_document(&mut self) -> SimResult<bool> {
        self.memory.examine_document()?;
        let document = self
            .memory
            .examined_documents()
            .last()
            .cloned()
            .ok_or_else(|| SimError::precondition("document was not recorded"))?;
        self.components.logger.log_action(&ActionEvent::Doc {
            status: DocStatus::ExaminingDocument,
            doc_id: document.doc_id.clone(),
        });

        let relevant = self.components.document_classifier.is_relevant(&document);
        let status = if relevant {
            self.memory.mark_relevant(&document.doc_id)?;
            DocStatus::ConsideredRelevant
        } else {
            self.memory.mark_irrelevant(&document.doc_id)?;
            DocStatus::ConsideredNotRelevant
        };
        self.components.logger.log_action(&ActionEvent::Doc {
            status,
            doc_id: document.doc_id,
        });
        Ok(relevant)
    }

    fn do_mark(&mut self) -> SimResult<bool> {
        let doc_id = self.memory.current_document()?.doc_id.clone();
        self.components.logger.log_action(&ActionEvent::Mark { doc_id });
        Ok(true)
    }

    pub fn memory(&self) -> &SessionMemory {
        &self.memory
    }

    pub fn logger(&self) -> &dyn InteractionLogger {
        &*self.components.logger
    }

    pub fn query_strategy(&self) -> &dyn QueryStrategy {
        &*self.components.query_strategy
    }

    pub fn is_finished(&self) -> bool {
        self.components.logger.is_finished()
    }

    pub fn report(&self) -> SessionReport {
        self.memory.report()
    }

    pub fn into_parts(self) -> (SessionMemory, SessionComponents) {
        (self.memory, self.components)
    }
}
