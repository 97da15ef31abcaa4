//! Full runs from a config file on disk to the session output files.

use std::path::Path;

use serpsim_common::{SimError, SimulationConfig};
use serpsim_runner::output::{SessionRecord, COMPLETED_MARKER};
use serpsim_runner::{Registries, Simulation};

const CORPUS: &str = r#"[
    { "doc_id": "FT1", "title": "Hubble images", "content": "The Hubble telescope returned sharp images of distant galaxies." },
    { "doc_id": "FT2", "title": "Mirror flaw", "content": "A flaw in the Hubble mirror was corrected by a servicing mission." },
    { "doc_id": "FT3", "title": "Budget", "content": "Space agency budget cuts threaten the Hubble program." },
    { "doc_id": "FT4", "title": "Gardening", "content": "Tomatoes and peppers need plenty of sun." }
]"#;

const QRELS: &str = "\
303 0 FT1 1
303 0 FT2 1
303 0 FT3 0
";

const QUERIES: &str = "\
1,u1,303,hubble images
2,u1,303,hubble mirror
1,u2,303,hubble
";

fn config_json(stopping: &str, logger: &str) -> String {
    format!(
        r#"{{
        "base_id": "trec",
        "base_seed": 42,
        "output": {{ "directory": "out" }},
        "backend": {{ "corpus": "corpus.json" }},
        "topics": [ {{ "id": "303", "title": "Hubble Telescope Achievements", "qrels": "qrels.txt" }} ],
        "users": [
            {{
                "id": "u1",
                "query_strategy": {{ "kind": "predetermined", "path": "queries.csv" }},
                "snippet_classifier": {{ "kind": "perfect" }},
                "document_classifier": {{ "kind": "perfect" }},
                "stopping": {stopping},
                "serp_impression": {{ "kind": "always_attractive" }},
                "logger": {logger}
            }},
            {{
                "id": "u2",
                "query_strategy": {{ "kind": "predetermined", "path": "queries.csv" }},
                "snippet_classifier": {{ "kind": "informed" }},
                "document_classifier": {{ "kind": "perfect" }},
                "stopping": {{ "kind": "total_nonrelevant", "nonrelevant_threshold": 2 }},
                "serp_impression": {{ "kind": "precision_threshold", "viewport_size": 3 }},
                "logger": {{ "kind": "fixed_cost_goal", "marked_goal": 1 }}
            }}
        ]
    }}"#
    )
}

fn write_inputs(dir: &Path, config: &str) -> std::path::PathBuf {
    std::fs::write(dir.join("corpus.json"), CORPUS).unwrap();
    std::fs::write(dir.join("qrels.txt"), QRELS).unwrap();
    std::fs::write(dir.join("queries.csv"), QUERIES).unwrap();
    let path = dir.join("sim.json");
    std::fs::write(&path, config).unwrap();
    path
}

#[test]
fn run_writes_every_session_and_the_completed_marker() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_inputs(
        dir.path(),
        &config_json(
            r#"{ "kind": "fixed_depth", "depth": 2 }"#,
            r#"{ "kind": "fixed_cost", "time_limit": 1000 }"#,
        ),
    );

    let config = SimulationConfig::load(&path).unwrap();
    let summary = Simulation::new(config, None).unwrap().run().unwrap();
    assert_eq!(summary.sessions, 2);

    let out = dir.path().join("out");
    assert!(out.join(COMPLETED_MARKER).exists());

    // u1: "hubble images" ranks FT1 first; "hubble mirror" ranks FT2 first.
    let record = SessionRecord::load(&out.join("trec-303-u1.json")).unwrap();
    assert_eq!(record.issued_queries, vec!["hubble images", "hubble mirror"]);
    assert_eq!(record.relevant_documents, vec!["FT1", "FT2"]);
    assert_eq!(record.report.documents_marked_relevant, 2);

    let rels = std::fs::read_to_string(out.join("trec-303-u1.rels")).unwrap();
    assert_eq!(rels, "303 Q0 FT1 1 1 Exp\n303 Q0 FT2 2 2 Exp\n");
    let queries = std::fs::read_to_string(out.join("trec-303-u1.queries")).unwrap();
    assert_eq!(queries, "hubble images\nhubble mirror\n");

    let log = std::fs::read_to_string(out.join("trec-303-u1.log")).unwrap();
    let first = log.lines().next().unwrap();
    assert_eq!(first, "ACTION QUERY 1000 10 hubble images");
    assert!(log.contains("ACTION MARK"));
    assert!(log.lines().any(|l| l.starts_with("INFO OUT_OF_QUERIES")));

    // u2 stops as soon as one document is marked.
    let record = SessionRecord::load(&out.join("trec-303-u2.json")).unwrap();
    assert_eq!(record.report.documents_marked_relevant, 1);
}

#[test]
fn output_dir_override_wins() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_inputs(
        dir.path(),
        &config_json(
            r#"{ "kind": "satisfaction", "relevant_threshold": 1 }"#,
            r#"{ "kind": "fixed_cost_no_time" }"#,
        ),
    );
    let elsewhere = dir.path().join("elsewhere");

    let config = SimulationConfig::load(&path).unwrap();
    Simulation::new(config, Some(elsewhere.clone())).unwrap().run().unwrap();

    assert!(elsewhere.join(COMPLETED_MARKER).exists());
    assert!(elsewhere.join("trec-303-u2.log").exists());
    assert!(!dir.path().join("out").exists());
}

#[test]
fn unknown_component_kind_fails_before_any_session() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_inputs(
        dir.path(),
        &config_json(
            r#"{ "kind": "coin_flip" }"#,
            r#"{ "kind": "fixed_cost" }"#,
        ),
    );
    let config = SimulationConfig::load(&path).unwrap();

    let err = Registries::standard().validate(&config).unwrap_err();
    assert!(matches!(err, SimError::UnknownComponent { family: "stopping", .. }));
    assert!(Simulation::new(config, None).is_err());
    assert!(!dir.path().join("out").exists());
}

#[test]
fn invalid_parameters_name_the_user() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_inputs(
        dir.path(),
        &config_json(
            r#"{ "kind": "rbp", "patience": 2.0 }"#,
            r#"{ "kind": "fixed_cost" }"#,
        ),
    );
    let config = SimulationConfig::load(&path).unwrap();
    let err = Registries::standard().validate(&config).unwrap_err();
    assert!(err.to_string().contains("user 'u1'"), "{err}");
}
