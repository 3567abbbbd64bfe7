//! Command handlers for CLI operations
//!
//! This module implements the handlers for all CLI commands:
//! - optimize: Run the ACE loop for one system prompt and query
//! - bootstrap: Bucket predictions over a training set
//! - batch: Optimize many tasks under a concurrency ceiling
//! - agent: Optimize agents held in a JSON store
//! - config: Show configuration or its path

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::ace::{AceOrchestrator, OptimizationResult};
use crate::agents::{AgentService, InMemoryAgentRepository};
use crate::bootstrap::{total_predictions, BootstrapBatches, Bootstrapper, CompletionPredictor};
use crate::cli::AgentAction;
use crate::config::Config;
use crate::harness::{BatchEvaluator, BatchTask};
use crate::llm::{self, CompletionClient, ModelSettings};
use sdk::types::TrainingExample;

/// Output format for command results
#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for machine consumption
    Json,
}

/// Optimize a single system prompt against a query
pub async fn handle_optimize(
    system_prompt: Option<String>,
    system_prompt_file: Option<PathBuf>,
    query: String,
    iterations: Option<usize>,
    config: &Config,
    format: OutputFormat,
) -> Result<()> {
    let system_prompt = match (system_prompt, system_prompt_file) {
        (Some(text), _) => text,
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read system prompt from {}", path.display()))?,
        (None, None) => anyhow::bail!("Either --system-prompt or --system-prompt-file is required"),
    };

    let (_, orchestrator) = build_orchestrator(config)?;
    let iterations = iterations.unwrap_or(config.optimizer.max_iterations);

    let result = orchestrator
        .optimize(&system_prompt, &query, iterations)
        .await
        .context("Optimization failed")?;

    match format {
        OutputFormat::Text => print_result(&result),
        OutputFormat::Json => print_json(&result)?,
    }
    Ok(())
}

/// Bootstrap a trainset file through a named predictor profile
pub async fn handle_bootstrap(
    trainset: PathBuf,
    profile: String,
    config: &Config,
    format: OutputFormat,
) -> Result<()> {
    let examples: Vec<TrainingExample> = read_json(&trainset)?;
    let client = llm::build_client(&config.llm)?;
    let predictor =
        CompletionPredictor::with_profile_name(client, ModelSettings::from(&config.llm), &profile)?;

    let batches = bootstrapper(config)
        .bootstrap(&predictor, &examples)
        .await
        .context("Bootstrap failed")?;

    print_batches(&batches, format)
}

/// Optimize every task in a JSON task file
pub async fn handle_batch(
    tasks: PathBuf,
    concurrency: Option<usize>,
    isolate: bool,
    config: &Config,
    format: OutputFormat,
) -> Result<()> {
    let tasks: Vec<BatchTask> = read_json(&tasks)?;
    let limit = concurrency.unwrap_or(config.batch.concurrency_limit);

    let (_, orchestrator) = build_orchestrator(config)?;
    let evaluator = BatchEvaluator::from_config(orchestrator, config);
    cancel_on_ctrl_c(&evaluator);

    if isolate {
        let outcomes = evaluator.evaluate_batch_isolated(tasks, limit).await?;
        match format {
            OutputFormat::Text => {
                for (index, outcome) in outcomes.iter().enumerate() {
                    println!("── Task {} ──", index);
                    match outcome {
                        Ok(result) => print_result(result),
                        Err(e) => println!("✗ Failed: {}", e),
                    }
                    println!();
                }
            }
            OutputFormat::Json => {
                let output: Vec<_> = outcomes
                    .iter()
                    .map(|outcome| match outcome {
                        Ok(result) => json!({ "ok": result }),
                        Err(e) => json!({ "error": e.to_string() }),
                    })
                    .collect();
                print_json(&output)?;
            }
        }
    } else {
        let results = evaluator
            .evaluate_batch(tasks, limit)
            .await
            .context("Batch failed")?;
        match format {
            OutputFormat::Text => {
                for (index, result) in results.iter().enumerate() {
                    println!("── Task {} ──", index);
                    print_result(result);
                    println!();
                }
            }
            OutputFormat::Json => print_json(&results)?,
        }
    }
    Ok(())
}

/// Run an agent store action, saving the store afterwards
pub async fn handle_agent(action: AgentAction, config: &Config, format: OutputFormat) -> Result<()> {
    let (client, orchestrator) = build_orchestrator(config)?;

    match action {
        AgentAction::Optimize {
            store,
            id,
            query,
            iterations,
        } => {
            let path = store_path(store, config);
            let (repo, service) = open_store(&path, orchestrator, config).await?;
            let result = service.optimize_agent(&id, &query, iterations).await?;
            repo.save(&path).await.context("Failed to save agent store")?;

            match format {
                OutputFormat::Text => {
                    print_result(&result);
                    println!("✓ Agent {} updated", id);
                }
                OutputFormat::Json => print_json(&result)?,
            }
        }
        AgentAction::ChatTurn { store, id, query } => {
            let path = store_path(store, config);
            let (repo, service) = open_store(&path, orchestrator, config).await?;
            let outcome = service.after_chat_turn(&id, &query).await?;

            match (&outcome, format) {
                (Some(result), OutputFormat::Text) => {
                    print_result(result);
                    println!("✓ Agent {} updated", id);
                }
                (None, OutputFormat::Text) => {
                    println!("Optimization is toggled off for agent {}", id)
                }
                (_, OutputFormat::Json) => {
                    print_json(&json!({ "optimized": outcome.is_some(), "result": outcome }))?
                }
            }
            if outcome.is_some() {
                repo.save(&path).await.context("Failed to save agent store")?;
            }
        }
        AgentAction::Due {
            store,
            id,
            max_count,
        } => {
            let path = store_path(store, config);
            let (repo, service) = open_store(&path, orchestrator, config).await?;
            let outcomes = service.optimize_due_prompts(&id, max_count).await?;
            repo.save(&path).await.context("Failed to save agent store")?;

            match format {
                OutputFormat::Text => {
                    if outcomes.is_empty() {
                        println!("No due prompts for agent {}", id);
                    }
                    for outcome in &outcomes {
                        println!("── Prompt {} ──", outcome.prompt.id);
                        print_result(&outcome.result);
                        println!();
                    }
                }
                OutputFormat::Json => print_json(&outcomes)?,
            }
        }
        AgentAction::Bootstrap { store, id, profile } => {
            let path = store_path(store, config);
            let (_, service) = open_store(&path, orchestrator, config).await?;
            let predictor = CompletionPredictor::with_profile_name(
                client,
                ModelSettings::from(&config.llm),
                &profile,
            )?;
            let batches = service
                .bootstrap_agent(&id, &predictor, &mut bootstrapper(config))
                .await?;
            print_batches(&batches, format)?;
        }
    }
    Ok(())
}

/// Show current configuration
pub fn handle_config_show(config: &Config, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            let toml = toml::to_string_pretty(config).context("Failed to serialize config")?;
            println!("{}", toml);
        }
        OutputFormat::Json => print_json(config)?,
    }
    Ok(())
}

/// Print the configuration file path in use
pub fn handle_config_path(override_path: Option<&Path>, format: OutputFormat) -> Result<()> {
    let path = match override_path {
        Some(path) => path.to_path_buf(),
        None => Config::default_config_path()?,
    };
    match format {
        OutputFormat::Text => println!("{}", path.display()),
        OutputFormat::Json => print_json(&json!({ "path": path }))?,
    }
    Ok(())
}

fn build_orchestrator(
    config: &Config,
) -> Result<(Arc<dyn CompletionClient>, Arc<AceOrchestrator>)> {
    let client = llm::build_client(&config.llm).context("Failed to create completion client")?;
    let orchestrator = Arc::new(AceOrchestrator::from_config(client.clone(), config));
    Ok((client, orchestrator))
}

fn bootstrapper(config: &Config) -> Bootstrapper {
    match config.bootstrap.seed {
        Some(seed) => Bootstrapper::from_seed(seed),
        None => Bootstrapper::new(),
    }
}

fn store_path(store: Option<PathBuf>, config: &Config) -> PathBuf {
    store.unwrap_or_else(|| config.core.data_dir.join("agents.json"))
}

async fn open_store(
    path: &Path,
    orchestrator: Arc<AceOrchestrator>,
    config: &Config,
) -> Result<(Arc<InMemoryAgentRepository>, AgentService)> {
    let repo = Arc::new(
        InMemoryAgentRepository::load(path)
            .await
            .with_context(|| format!("Failed to open agent store {}", path.display()))?,
    );
    let evaluator = BatchEvaluator::from_config(orchestrator.clone(), config);
    cancel_on_ctrl_c(&evaluator);

    let service = AgentService::new(
        repo.clone(),
        orchestrator,
        evaluator,
        config.optimizer.max_iterations,
        config.batch.concurrency_limit,
    );
    Ok((repo, service))
}

fn cancel_on_ctrl_c(evaluator: &BatchEvaluator) {
    let token = evaluator.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted; cancelling outstanding tasks");
            token.cancel();
        }
    });
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("Invalid JSON in {}", path.display()))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_result(result: &OptimizationResult) {
    println!("Final response:");
    println!("{}", result.final_response);
    println!();
    println!("Revised system prompt:");
    println!("{}", result.revised_system_prompt);
    println!();
    println!(
        "Context memory ({} items, {} iterations):",
        result.context_memory.len(),
        result.iterations
    );
    for item in result.context_memory.items() {
        println!("  [{}] {}", item.kind(), item.content());
    }
}

fn print_batches(batches: &BootstrapBatches, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            println!(
                "Bootstrapped {} predictions into {} buckets",
                total_predictions(batches),
                batches.len()
            );
            for (bucket, predictions) in batches {
                println!("  Bucket {}: {} predictions", bucket, predictions.len());
                for prediction in predictions {
                    println!("    ({:.2}) {}", prediction.score, prediction.response);
                }
            }
        }
        OutputFormat::Json => print_json(batches)?,
    }
    Ok(())
}
