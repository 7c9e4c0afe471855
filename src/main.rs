use std::sync::Arc;

use clap::Parser;
use multi_model_agent::utils::{logger, validation::Validate};
use multi_model_agent::{
    build_router, AgentConfig, AgentEngine, AppState, CliConfig, HttpKnowledgeSource,
};

fn exit_with(context: &str, e: multi_model_agent::AgentError) -> ! {
    tracing::error!("❌ {}: {}", context, e);
    tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}: {}", context, e);
    std::process::exit(1);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_logger(cli.verbose);
    }

    tracing::info!("Starting multi-model-agent");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let config: AgentConfig = cli
        .load()
        .unwrap_or_else(|e| exit_with("Failed to load configuration", e));
    if let Err(e) = config.validate() {
        exit_with("Configuration validation failed", e);
    }

    let source = HttpKnowledgeSource::new(config.upstream.clone())
        .unwrap_or_else(|e| exit_with("Failed to build HTTP client", e));
    let engine = AgentEngine::new(Arc::new(source), config.limits.clone());
    let app = build_router(AppState::new(engine, config.stream.clone()));

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("🌐 Listening on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
