//! Session model and action-decision cycle for simulated search sessions.
//!
//! `SessionMemory` records what the searcher has seen, `ActionStateMachine`
//! sequences the primitive actions, and the pluggable `StoppingStrategy` and
//! `SerpImpressionModel` families decide when to keep reading a results page.

pub mod impression;
pub mod machine;
pub mod memory;
pub mod qrels;
pub mod rng;
pub mod stopping;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod traits;

pub use impression::{patch_type, SerpImpressionModel};
pub use machine::{ActionStateMachine, SessionComponents};
pub use memory::SessionMemory;
pub use qrels::Qrels;
pub use stopping::{DecisionContext, StoppingStrategy};
pub use traits::{InteractionLogger, JudgmentOracle, QueryStrategy, RelevanceClassifier, SearchBackend};
