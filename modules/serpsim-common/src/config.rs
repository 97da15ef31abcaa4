use std::collections::HashSet;
use std::path::{Path, PathBuf};

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{SimError, SimResult};
use crate::types::{RevisionPolicy, Topic};

/// A simulation: every configured user is run against every configured topic.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SimulationConfig {
    pub base_id: String,
    #[serde(default)]
    pub base_seed: u64,
    #[serde(default)]
    pub output: OutputConfig,
    pub backend: BackendConfig,
    pub topics: Vec<TopicConfig>,
    pub users: Vec<UserConfig>,
    /// Directory the config was loaded from; relative paths resolve against it.
    #[serde(skip)]
    #[schemars(skip)]
    pub base_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub directory: PathBuf,
    #[serde(default = "default_true")]
    pub save_interaction_log: bool,
    #[serde(default = "default_true")]
    pub save_relevance_judgments: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
            save_interaction_log: true,
            save_relevance_judgments: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct BackendConfig {
    /// JSON corpus file for the in-memory backend.
    pub corpus: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct TopicConfig {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// TREC qrels file with the judgments for this topic.
    pub qrels: PathBuf,
}

impl TopicConfig {
    pub fn topic(&self) -> Topic {
        Topic {
            id: self.id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct UserConfig {
    pub id: String,
    #[serde(default)]
    pub revision_policy: RevisionPolicy,
    /// Truncate the query list to this many queries.
    #[serde(default)]
    pub query_limit: Option<usize>,
    pub query_strategy: ComponentSpec,
    pub snippet_classifier: ComponentSpec,
    pub document_classifier: ComponentSpec,
    pub stopping: ComponentSpec,
    pub serp_impression: ComponentSpec,
    pub logger: ComponentSpec,
}

/// A pluggable component selected by `kind`, with its parameters inline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ComponentSpec {
    pub kind: String,
    #[serde(flatten)]
    pub params: serde_json::Map<String, serde_json::Value>,
}

impl ComponentSpec {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            params: serde_json::Map::new(),
        }
    }

    pub fn with_param(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }

    /// Deserialize the inline parameters into a typed params struct.
    pub fn parse_params<T: DeserializeOwned>(&self, family: &str) -> SimResult<T> {
        serde_json::from_value(serde_json::Value::Object(self.params.clone())).map_err(|e| {
            SimError::Config(format!("invalid parameters for {family} '{}': {e}", self.kind))
        })
    }
}

impl SimulationConfig {
    /// Load and structurally validate a simulation config from a JSON file.
    pub fn load(path: &Path) -> SimResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            SimError::Config(format!("cannot read config {}: {e}", path.display()))
        })?;
        let mut config: Self = serde_json::from_str(&json)
            .map_err(|e| SimError::Config(format!("cannot parse config {}: {e}", path.display())))?;
        config.base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        config.validate()?;
        info!(
            base_id = config.base_id.as_str(),
            topics = config.topics.len(),
            users = config.users.len(),
            "Simulation config loaded"
        );
        Ok(config)
    }

    pub fn validate(&self) -> SimResult<()> {
        if self.base_id.trim().is_empty() {
            return Err(SimError::config("base_id must not be empty"));
        }
        if self.topics.is_empty() {
            return Err(SimError::config("at least one topic is required"));
        }
        if self.users.is_empty() {
            return Err(SimError::config("at least one user is required"));
        }
        let mut seen = HashSet::new();
        for user in &self.users {
            if !seen.insert(user.id.as_str()) {
                return Err(SimError::Config(format!("duplicate user id '{}'", user.id)));
            }
            if user.query_limit == Some(0) {
                return Err(SimError::Config(format!(
                    "user '{}': query_limit must be positive",
                    user.id
                )));
            }
        }
        let mut topic_ids = HashSet::new();
        for topic in &self.topics {
            if !topic_ids.insert(topic.id.as_str()) {
                return Err(SimError::Config(format!("duplicate topic id '{}'", topic.id)));
            }
        }
        Ok(())
    }

    /// Resolve a possibly relative path against the config's directory.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        resolve_path(&self.base_dir, path)
    }
}

pub fn resolve_path(base_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "base_id": "trec-sim",
        "base_seed": 7,
        "backend": { "corpus": "corpus.json" },
        "topics": [ { "id": "303", "title": "Hubble telescope", "qrels": "qrels.txt" } ],
        "users": [ {
            "id": "u1",
            "revision_policy": "revise_on_irrelevant",
            "query_strategy": { "kind": "fixed_list", "queries": ["hubble"] },
            "snippet_classifier": { "kind": "perfect" },
            "document_classifier": { "kind": "perfect" },
            "stopping": { "kind": "satisfaction", "relevant_threshold": 2 },
            "serp_impression": { "kind": "always_attractive" },
            "logger": { "kind": "fixed_cost", "time_limit": 120 }
        } ]
    }"#;

    #[test]
    fn load_resolves_base_dir_and_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sim.json");
        std::fs::write(&path, SAMPLE).unwrap();

        let config = SimulationConfig::load(&path).unwrap();
        assert_eq!(config.base_seed, 7);
        assert_eq!(config.base_dir, dir.path());
        assert!(config.output.save_interaction_log);
        assert_eq!(config.resolve(Path::new("qrels.txt")), dir.path().join("qrels.txt"));
        assert_eq!(config.users[0].revision_policy, RevisionPolicy::ReviseOnIrrelevant);
    }

    #[test]
    fn component_params_are_flattened() {
        let config: SimulationConfig = serde_json::from_str(SAMPLE).unwrap();
        let stopping = &config.users[0].stopping;
        assert_eq!(stopping.kind, "satisfaction");
        assert_eq!(stopping.params["relevant_threshold"], 2);
    }

    #[test]
    fn parse_params_reports_component_kind() {
        #[derive(Deserialize, Debug)]
        #[serde(deny_unknown_fields)]
        struct Depth {
            #[allow(dead_code)]
            depth: usize,
        }
        let spec = ComponentSpec::new("fixed_depth").with_param("depht", 3);
        let err = spec.parse_params::<Depth>("stopping").unwrap_err();
        assert!(err.to_string().contains("fixed_depth"));
    }

    #[test]
    fn duplicate_users_are_rejected() {
        let mut config: SimulationConfig = serde_json::from_str(SAMPLE).unwrap();
        let dup = config.users[0].clone();
        config.users.push(dup);
        assert!(matches!(config.validate(), Err(SimError::Config(_))));
    }

    #[test]
    fn unknown_top_level_fields_fail_to_parse() {
        let bad = SAMPLE.replacen("\"base_seed\"", "\"seed\"", 1);
        assert!(serde_json::from_str::<SimulationConfig>(&bad).is_err());
    }
}
