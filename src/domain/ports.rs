use crate::domain::model::{Article, Track};
use crate::utils::error::Result;
use async_trait::async_trait;

/// External lookups backing the pseudo-models. Each method is one best-effort
/// attempt; callers decide how to degrade on error.
#[async_trait]
pub trait KnowledgeSource: Send + Sync {
    /// Raw encyclopedia extract (or description) for a topic.
    async fn encyclopedia_summary(&self, topic: &str) -> Result<Option<String>>;

    async fn random_fact(&self) -> Result<Option<String>>;

    /// Trivia about a number, or about a random one when `number` is `"random"`.
    async fn number_trivia(&self, number: &str) -> Result<Option<String>>;

    async fn headlines(&self, query: &str, limit: usize) -> Result<Vec<Article>>;

    async fn top_tracks(&self, term: &str, limit: usize) -> Result<Vec<Track>>;
}
