//! End-to-end tests of the action cycle against mock collaborators.

use std::sync::Arc;

use serpsim_common::{Action, InteractionEntry, PatchType, RevisionPolicy};
use serpsim_core::impression::{AlwaysAttractive, PrecisionThreshold, ViewportConfig};
use serpsim_core::stopping::{FixedDepth, Satisfaction};
use serpsim_core::testing::{
    hits, memory_with, qrels, MockBackend, RecordingLogger, ScriptedClassifier, ScriptedQueries,
};
use serpsim_core::{ActionStateMachine, SerpImpressionModel, SessionComponents, StoppingStrategy};

fn always_attractive() -> Box<dyn SerpImpressionModel> {
    Box::new(AlwaysAttractive::new(ViewportConfig::default(), Arc::new(qrels(&[]))).unwrap())
}

fn machine(
    backend: MockBackend,
    queries: &[&str],
    relevant: &[&str],
    stopping: Box<dyn StoppingStrategy>,
    impression: Box<dyn SerpImpressionModel>,
) -> ActionStateMachine {
    let components = SessionComponents::builder()
        .query_strategy(Box::new(ScriptedQueries::new(queries.iter().copied())))
        .snippet_classifier(Box::new(ScriptedClassifier::relevant(relevant.iter().copied())))
        .document_classifier(Box::new(ScriptedClassifier::relevant(relevant.iter().copied())))
        .stopping(stopping)
        .impression(impression)
        .logger(Box::new(RecordingLogger::new()))
        .build();
    ActionStateMachine::new(memory_with(backend, RevisionPolicy::None), components)
}

fn run(machine: &mut ActionStateMachine, steps: usize) -> Vec<Action> {
    (0..steps).map(|_| machine.step().unwrap()).collect()
}

fn action_details(machine: &ActionStateMachine) -> Vec<String> {
    machine
        .logger()
        .entries()
        .iter()
        .filter_map(|e| match e {
            InteractionEntry::Action { action, detail, .. } => Some(format!("{action} {detail}")),
            InteractionEntry::Info { .. } => None,
        })
        .collect()
}

fn info_types(machine: &ActionStateMachine) -> Vec<String> {
    machine
        .logger()
        .entries()
        .iter()
        .filter_map(|e| match e {
            InteractionEntry::Info { info_type, .. } => Some(info_type.clone()),
            InteractionEntry::Action { .. } => None,
        })
        .collect()
}

#[test]
fn satisfied_searcher_marks_then_reformulates() {
    let backend = MockBackend::new()
        .on_query("hubble", hits("a", 5))
        .on_query("hubble telescope", hits("b", 5));
    let mut m = machine(
        backend,
        &["hubble", "hubble telescope"],
        &["a0"],
        Box::new(Satisfaction::new(1).unwrap()),
        always_attractive(),
    );

    let actions = run(&mut m, 6);
    assert_eq!(
        actions,
        vec![
            Action::Query,
            Action::Serp,
            Action::Snippet,
            Action::Doc,
            Action::Mark,
            Action::Query,
        ]
    );
    assert_eq!(m.memory().issued_queries().len(), 2);
    assert_eq!(m.report().documents_marked_relevant, 1);
    assert_eq!(m.memory().relevant_documents(), &["a0".to_string()]);

    let details = action_details(&m);
    assert_eq!(
        details,
        vec![
            "QUERY hubble",
            "SERP EXAMINE_SERP",
            "SNIPPET SNIPPET_RELEVANT a0",
            "DOC EXAMINING_DOCUMENT a0",
            "DOC CONSIDERED_RELEVANT a0",
            "MARK a0",
            "QUERY hubble telescope",
        ]
    );
}

#[test]
fn first_action_is_always_query() {
    let mut m = machine(
        MockBackend::new(),
        &["q"],
        &[],
        Box::new(FixedDepth::new(1).unwrap()),
        always_attractive(),
    );
    assert_eq!(m.step().unwrap(), Action::Query);
}

#[test]
fn mark_only_follows_a_relevant_document() {
    let backend = MockBackend::new()
        .on_query("q1", hits("a", 6))
        .on_query("q2", hits("a", 8));
    let mut m = machine(
        backend,
        &["q1", "q2"],
        &["a1", "a3", "a6"],
        Box::new(FixedDepth::new(4).unwrap()),
        always_attractive(),
    );
    let actions = run(&mut m, 40);

    for (i, action) in actions.iter().enumerate() {
        if *action == Action::Mark {
            assert!(i > 0 && actions[i - 1] == Action::Doc, "MARK at {i} not after DOC");
        }
    }
    let marks = actions.iter().filter(|a| **a == Action::Mark).count();
    // a1 and a3 on q1; a6 is below the depth limit of q2 and a1/a3 are repeats.
    assert_eq!(marks, 2);
    assert_eq!(m.report().documents_marked_relevant, 2);
}

#[test]
fn previously_seen_documents_are_skipped() {
    let backend = MockBackend::new()
        .on_query("q1", hits("a", 5))
        .on_query("q2", hits("a", 5));
    let mut m = machine(
        backend,
        &["q1", "q2"],
        &["a0", "a1"],
        Box::new(FixedDepth::new(2).unwrap()),
        always_attractive(),
    );
    run(&mut m, 12);

    let details = action_details(&m);
    assert!(details.contains(&"SNIPPET SEEN_PREVIOUSLY a0".to_string()));
    assert!(details.contains(&"SNIPPET SEEN_PREVIOUSLY a1".to_string()));
    let report = m.report();
    assert_eq!(report.queries_issued, 2);
    assert_eq!(report.snippets_examined, 4);
    assert_eq!(report.documents_examined, 2);
}

#[test]
fn end_of_serp_forces_a_new_query() {
    let backend = MockBackend::new().on_query("q1", hits("a", 3)).on_query("q2", hits("b", 3));
    let mut m = machine(
        backend,
        &["q1", "q2"],
        &[],
        Box::new(FixedDepth::new(100).unwrap()),
        always_attractive(),
    );
    let actions = run(&mut m, 6);
    assert_eq!(
        actions,
        vec![
            Action::Query,
            Action::Serp,
            Action::Snippet,
            Action::Snippet,
            Action::Snippet,
            Action::Query,
        ]
    );
    assert_eq!(info_types(&m), vec!["SERP_END_REACHED"]);
}

#[test]
fn empty_serp_leads_straight_to_the_next_query() {
    let backend = MockBackend::new().on_query("q2", hits("b", 3));
    let mut m = machine(
        backend,
        &["nothing", "q2"],
        &[],
        Box::new(FixedDepth::new(1).unwrap()),
        always_attractive(),
    );
    let actions = run(&mut m, 4);
    assert_eq!(actions, vec![Action::Query, Action::Serp, Action::Query, Action::Serp]);

    let impressions = m.memory().serp_impressions();
    assert!(!impressions[0].attractive);
    assert_eq!(impressions[0].patch_type, PatchType::Undefined);
    assert!(action_details(&m).contains(&"SERP EMPTY_SERP".to_string()));
}

#[test]
fn unattractive_serp_is_abandoned_unread() {
    let backend = MockBackend::new().on_query("q1", hits("a", 10));
    let impression = Box::new(
        PrecisionThreshold::new(ViewportConfig::default(), 0.1, Arc::new(qrels(&[]))).unwrap(),
    );
    let mut m = machine(
        backend,
        &["q1", "q1"],
        &[],
        Box::new(FixedDepth::new(3).unwrap()),
        impression,
    );
    let actions = run(&mut m, 3);
    assert_eq!(actions, vec![Action::Query, Action::Serp, Action::Query]);
    assert!(m.memory().all_examined_snippets().is_empty());
}

#[test]
fn exhausted_queries_finish_the_session() {
    let backend = MockBackend::new().on_query("q1", hits("a", 2));
    let mut m = machine(
        backend,
        &["q1"],
        &[],
        Box::new(FixedDepth::new(5).unwrap()),
        always_attractive(),
    );

    let mut steps = 0;
    while !m.is_finished() {
        m.step().unwrap();
        steps += 1;
        assert!(steps < 50, "session did not finish");
    }
    // QUERY, SERP, SNIPPET, SNIPPET, QUERY (exhausted)
    assert_eq!(steps, 5);
    assert_eq!(info_types(&m), vec!["SERP_END_REACHED", "OUT_OF_QUERIES"]);

    // Further ticks keep retrying the query rather than re-reading the SERP.
    assert_eq!(m.step().unwrap(), Action::Query);
}

#[test]
fn revision_policy_flows_through_the_machine() {
    let backend = MockBackend::new().on_query("q1", hits("a", 3));
    let components = SessionComponents::builder()
        .query_strategy(Box::new(ScriptedQueries::new(["q1"])))
        .snippet_classifier(Box::new(ScriptedClassifier::relevant(["a0"])))
        .document_classifier(Box::new(ScriptedClassifier::none()))
        .stopping(Box::new(FixedDepth::new(3).unwrap()))
        .impression(always_attractive())
        .logger(Box::new(RecordingLogger::new()))
        .build();
    let memory = memory_with(backend, RevisionPolicy::ReviseOnIrrelevant);
    let mut m = ActionStateMachine::new(memory, components);

    // QUERY, SERP, SNIPPET (relevant), DOC (not relevant)
    run(&mut m, 4);
    let snippet = &m.memory().examined_snippets()[0];
    assert_eq!(snippet.judgment.value(), 0);
    assert_eq!(m.memory().irrelevant_documents(), &["a0".to_string()]);
}
