pub mod agent;
pub mod math;
pub mod pool;
pub mod science;
pub mod text;

pub use crate::domain::model::{AgentResponse, ModelKind, ModelRun, StreamEvent};
pub use crate::domain::ports::KnowledgeSource;
pub use crate::utils::error::Result;
