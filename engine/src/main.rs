// ACE prompt optimizer
// Main entry point for the ace binary

use clap::Parser;
use ace_engine::cli::{Cli, Command, ConfigAction};
use ace_engine::config::Config;
use ace_engine::handlers::{
    handle_agent, handle_batch, handle_bootstrap, handle_config_path, handle_config_show,
    handle_optimize, OutputFormat,
};
use ace_engine::telemetry::init_telemetry_with_level;
use sdk::errors::{EngineError, ErrorExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Determine output format
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    // Load configuration (or use custom path if provided)
    let config = match &cli.config {
        Some(config_path) => Config::load_from_path(config_path)?,
        None => Config::load_or_create()?,
    };

    // --log beats the config level; RUST_LOG beats both
    let log_level = cli.log.as_deref().unwrap_or(&config.core.log_level);
    init_telemetry_with_level(log_level);

    let version = env!("CARGO_PKG_VERSION");
    let commit = env!("GIT_COMMIT_HASH");
    let timestamp = env!("BUILD_TIMESTAMP");
    tracing::info!("ACE Engine v{} ({} - {})", version, commit, timestamp);
    tracing::debug!(
        "Provider: {} / model: {}",
        config.llm.provider,
        config.llm.model
    );

    let outcome = match cli.command {
        Command::Optimize {
            system_prompt,
            system_prompt_file,
            query,
            iterations,
        } => {
            tracing::info!("Optimizing for query: {}", query);
            handle_optimize(
                system_prompt,
                system_prompt_file,
                query,
                iterations,
                &config,
                format,
            )
            .await
        }
        Command::Bootstrap { trainset, profile } => {
            tracing::info!("Bootstrapping {} with profile {}", trainset.display(), profile);
            handle_bootstrap(trainset, profile, &config, format).await
        }
        Command::Batch {
            tasks,
            concurrency,
            isolate,
        } => {
            tracing::info!("Running batch from {}", tasks.display());
            handle_batch(tasks, concurrency, isolate, &config, format).await
        }
        Command::Agent { action } => {
            tracing::info!("Agent action: {:?}", action);
            handle_agent(action, &config, format).await
        }
        Command::Config { action } => match action {
            ConfigAction::Show => handle_config_show(&config, format),
            ConfigAction::Path => handle_config_path(cli.config.as_deref(), format),
        },
    };

    if let Err(e) = &outcome {
        tracing::error!("{:#}", e);
        if let Some(engine_err) = e.downcast_ref::<EngineError>() {
            eprintln!("Hint: {}", engine_err.user_hint());
        }
    }
    outcome
}
