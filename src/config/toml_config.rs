use crate::utils::error::{AgentError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_positive_number, validate_range, validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub limits: LimitsConfig,
    pub stream: StreamConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub encyclopedia_endpoint: String,
    pub random_fact_endpoint: String,
    pub numbers_endpoint: String,
    pub news_endpoint: String,
    pub music_endpoint: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            user_agent: "multi-llm-agent-demo/1.0".to_string(),
            timeout_seconds: 6,
            encyclopedia_endpoint: "https://en.wikipedia.org/api/rest_v1/page/summary".to_string(),
            random_fact_endpoint: "https://uselessfacts.jsph.pl/random.json?language=en"
                .to_string(),
            numbers_endpoint: "http://numbersapi.com".to_string(),
            news_endpoint: "https://news.google.com/rss/search".to_string(),
            music_endpoint: "https://itunes.apple.com/search".to_string(),
        }
    }
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub headline_limit: usize,
    pub track_limit: usize,
    pub summary_max_chars: usize,
    pub excerpt_chars: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            headline_limit: 3,
            track_limit: 5,
            summary_max_chars: 1200,
            excerpt_chars: 140,
        }
    }
}

/// Cosmetic pauses between staged events.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    pub assignment_delay_ms: u64,
    pub model_delay_ms: u64,
    pub review_delay_ms: u64,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            assignment_delay_ms: 300,
            model_delay_ms: 200,
            review_delay_ms: 500,
        }
    }
}

impl StreamConfig {
    /// No pauses at all, handy for tests.
    pub fn immediate() -> Self {
        Self {
            assignment_delay_ms: 0,
            model_delay_ms: 0,
            review_delay_ms: 0,
        }
    }

    pub fn assignment_delay(&self) -> Duration {
        Duration::from_millis(self.assignment_delay_ms)
    }

    pub fn model_delay(&self) -> Duration {
        Duration::from_millis(self.model_delay_ms)
    }

    pub fn review_delay(&self) -> Duration {
        Duration::from_millis(self.review_delay_ms)
    }
}

impl AgentConfig {
    /// Loads the configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(AgentError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// Parses the configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| AgentError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR_NAME}` placeholders with environment values. Unset
    /// variables are left untouched.
    fn substitute_env_vars(content: &str) -> String {
        static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
        let re = PLACEHOLDER.get_or_init(|| {
            Regex::new(r"\$\{([^}]+)\}").expect("placeholder pattern is valid")
        });

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_non_empty_string("server.host", &self.server.host)?;

        let upstream = &self.upstream;
        validate_non_empty_string("upstream.user_agent", &upstream.user_agent)?;
        validate_range("upstream.timeout_seconds", upstream.timeout_seconds, 1, 120)?;
        validate_url("upstream.encyclopedia_endpoint", &upstream.encyclopedia_endpoint)?;
        validate_url("upstream.random_fact_endpoint", &upstream.random_fact_endpoint)?;
        validate_url("upstream.numbers_endpoint", &upstream.numbers_endpoint)?;
        validate_url("upstream.news_endpoint", &upstream.news_endpoint)?;
        validate_url("upstream.music_endpoint", &upstream.music_endpoint)?;

        let limits = &self.limits;
        validate_range("limits.headline_limit", limits.headline_limit, 1, 50)?;
        // the music catalog caps search results at 200
        validate_range("limits.track_limit", limits.track_limit, 1, 200)?;
        validate_positive_number("limits.summary_max_chars", limits.summary_max_chars as u64, 1)?;
        validate_positive_number("limits.excerpt_chars", limits.excerpt_chars as u64, 1)?;

        Ok(())
    }
}

impl Validate for AgentConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
