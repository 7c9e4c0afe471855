use crate::adapters::rss;
use crate::config::UpstreamConfig;
use crate::domain::model::{Article, Track};
use crate::domain::ports::KnowledgeSource;
use crate::utils::error::{AgentError, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use url::Url;

#[derive(Debug, Deserialize)]
struct SummaryPayload {
    extract: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TextPayload {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchPayload {
    #[serde(default)]
    results: Vec<Track>,
}

/// [`KnowledgeSource`] backed by the public encyclopedia, fact, trivia, news
/// and music endpoints. One GET per call, bounded by the configured timeout.
#[derive(Debug, Clone)]
pub struct HttpKnowledgeSource {
    client: Client,
    config: UpstreamConfig,
}

impl HttpKnowledgeSource {
    pub fn new(config: UpstreamConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout())
            .build()?;
        Ok(Self { client, config })
    }

    fn ensure_success(service: &'static str, response: &Response) -> Result<()> {
        let status = response.status();
        tracing::debug!("{} response status: {}", service, status);
        if status.is_success() {
            Ok(())
        } else {
            Err(AgentError::UpstreamStatus {
                service,
                status: status.as_u16(),
            })
        }
    }

    fn summary_url(&self, slug: &str) -> Result<Url> {
        let mut url = Url::parse(&self.config.encyclopedia_endpoint)?;
        url.path_segments_mut()
            .map_err(|_| AgentError::ConfigError {
                message: format!(
                    "encyclopedia endpoint cannot take a path: {}",
                    self.config.encyclopedia_endpoint
                ),
            })?
            .pop_if_empty()
            .push(slug);
        Ok(url)
    }
}

fn non_empty(text: Option<String>) -> Option<String> {
    text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}

#[async_trait]
impl KnowledgeSource for HttpKnowledgeSource {
    async fn encyclopedia_summary(&self, topic: &str) -> Result<Option<String>> {
        let slug = topic.trim().replace(' ', "_");
        if slug.is_empty() {
            return Ok(None);
        }

        let url = self.summary_url(&slug)?;
        tracing::debug!("Requesting encyclopedia summary: {}", url);
        let response = self.client.get(url).send().await?;
        Self::ensure_success("encyclopedia", &response)?;

        let payload: SummaryPayload = response.json().await?;
        Ok(non_empty(payload.extract).or_else(|| non_empty(payload.description)))
    }

    async fn random_fact(&self) -> Result<Option<String>> {
        let response = self
            .client
            .get(&self.config.random_fact_endpoint)
            .send()
            .await?;
        Self::ensure_success("random-fact", &response)?;

        let payload: TextPayload = response.json().await?;
        Ok(non_empty(payload.text))
    }

    async fn number_trivia(&self, number: &str) -> Result<Option<String>> {
        let url = format!(
            "{}/{}?json",
            self.config.numbers_endpoint.trim_end_matches('/'),
            number
        );
        let response = self.client.get(url).send().await?;
        Self::ensure_success("numbers", &response)?;

        let payload: TextPayload = response.json().await?;
        Ok(non_empty(payload.text))
    }

    async fn headlines(&self, query: &str, limit: usize) -> Result<Vec<Article>> {
        let response = self
            .client
            .get(&self.config.news_endpoint)
            .query(&[
                ("q", query),
                ("hl", "en-US"),
                ("gl", "US"),
                ("ceid", "US:en"),
            ])
            .send()
            .await?;
        Self::ensure_success("news", &response)?;

        let body = response.text().await?;
        rss::parse_items(&body, limit)
    }

    async fn top_tracks(&self, term: &str, limit: usize) -> Result<Vec<Track>> {
        let limit = limit.to_string();
        let response = self
            .client
            .get(&self.config.music_endpoint)
            .query(&[
                ("term", term),
                ("media", "music"),
                ("entity", "song"),
                ("limit", limit.as_str()),
            ])
            .send()
            .await?;
        Self::ensure_success("music", &response)?;

        // the catalog answers with a javascript content type, so decode the text
        let body = response.text().await?;
        let payload: SearchPayload = serde_json::from_str(&body)?;
        Ok(payload.results)
    }
}
