use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("{service} responded with status {status}")]
    UpstreamStatus { service: &'static str, status: u16 },

    #[error("Feed parsing error: {0}")]
    FeedError(#[from] quick_xml::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

impl AgentError {
    /// Short hint printed next to startup failures.
    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            AgentError::ConfigError { .. } => "Check the TOML syntax and the ${VAR} placeholders",
            AgentError::InvalidConfigValueError { .. } => {
                "Fix the highlighted field in the config file or CLI flags"
            }
            AgentError::IoError(_) => "Make sure the config file exists and is readable",
            AgentError::UrlError(_) => "Upstream endpoints must be absolute http(s) URLs",
            AgentError::ApiError(_)
            | AgentError::UpstreamStatus { .. }
            | AgentError::FeedError(_)
            | AgentError::SerializationError(_) => "The upstream service may be down; retry later",
        }
    }
}

pub type Result<T> = std::result::Result<T, AgentError>;
