pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod server;
pub mod utils;

pub use crate::core::agent::AgentEngine;
pub use adapters::HttpKnowledgeSource;
pub use config::{AgentConfig, CliConfig};
pub use server::{build_router, AppState};
pub use utils::error::{AgentError, Result};
