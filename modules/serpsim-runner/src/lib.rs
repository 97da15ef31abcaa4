//! Batch runner for simulated search sessions: concrete collaborators, the
//! component registry, the session driver and output files.

pub mod backend;
pub mod classifiers;
pub mod loggers;
pub mod output;
pub mod queries;
pub mod registry;
pub mod simulation;

pub use backend::CorpusBackend;
pub use registry::{BuildContext, Registries};
pub use simulation::{build_machine, run_session, Simulation};
