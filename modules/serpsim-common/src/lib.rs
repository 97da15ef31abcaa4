pub mod config;
pub mod error;
pub mod types;

pub use config::{ComponentSpec, SimulationConfig, TopicConfig, UserConfig};
pub use error::SimError;
pub use types::*;
