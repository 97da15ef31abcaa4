use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Precondition failed: {0}")]
    Precondition(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown {family} component: {kind}")]
    UnknownComponent { family: &'static str, kind: String },

    #[error("No SERP patch type has been judged for the current query")]
    PatchTypeUnavailable,

    #[error("Search backend error: {0}")]
    Backend(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl SimError {
    pub fn precondition(msg: impl Into<String>) -> Self {
        SimError::Precondition(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        SimError::Config(msg.into())
    }
}

pub type SimResult<T> = Result<T, SimError>;
