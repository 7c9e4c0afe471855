pub mod toml_config;

use crate::utils::error::Result;
use clap::Parser;
pub use toml_config::{AgentConfig, LimitsConfig, ServerConfig, StreamConfig, UpstreamConfig};

#[derive(Debug, Clone, Parser)]
#[command(name = "multi-model-agent")]
#[command(about = "Demo backend fanning a query out to a pool of pseudo-models")]
pub struct CliConfig {
    #[arg(long, help = "Path to a TOML configuration file")]
    pub config: Option<String>,

    #[arg(long, help = "Override the listen host")]
    pub host: Option<String>,

    #[arg(long, help = "Override the listen port")]
    pub port: Option<u16>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

impl CliConfig {
    /// Builds the effective configuration: file (or defaults), then CLI overrides.
    pub fn load(&self) -> Result<AgentConfig> {
        let mut config = match &self.config {
            Some(path) => AgentConfig::from_file(path)?,
            None => AgentConfig::default(),
        };

        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }

        Ok(config)
    }
}
