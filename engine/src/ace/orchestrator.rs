//! ACE Orchestrator
//!
//! Drives the generate → reflect → curate loop for a fixed number of iterations,
//! accumulating curated items into a run-local `ContextMemory`, then makes two
//! synthesis calls: the final response and the revised system prompt.
//!
//! Stages run strictly in sequence. Any failure aborts the run; there are no
//! retries and no partial results.

use sdk::errors::{EngineError, Result, Stage};
use std::sync::Arc;

use super::curator::Curator;
use super::generator::Generator;
use super::memory::ContextMemory;
use super::parse::ParsePolicy;
use super::prompts;
use super::reflector::Reflector;
use super::types::OptimizationResult;
use crate::config::Config;
use crate::llm::{CompletionClient, ModelSettings};

#[derive(Clone)]
pub struct AceOrchestrator {
    client: Arc<dyn CompletionClient>,
    settings: ModelSettings,
    generator: Generator,
    reflector: Reflector,
    curator: Curator,
}

impl AceOrchestrator {
    /// Create an orchestrator using the default (raw) parse policy
    pub fn new(client: Arc<dyn CompletionClient>, settings: ModelSettings) -> Self {
        Self::with_parse_policy(client, settings, ParsePolicy::default())
    }

    pub fn with_parse_policy(
        client: Arc<dyn CompletionClient>,
        settings: ModelSettings,
        parse_policy: ParsePolicy,
    ) -> Self {
        Self {
            generator: Generator::new(client.clone(), settings.clone(), parse_policy),
            reflector: Reflector::new(client.clone(), settings.clone(), parse_policy),
            curator: Curator::new(client.clone(), settings.clone(), parse_policy),
            client,
            settings,
        }
    }

    /// Build from loaded configuration
    pub fn from_config(client: Arc<dyn CompletionClient>, config: &Config) -> Self {
        Self::with_parse_policy(
            client,
            ModelSettings::from(&config.llm),
            config.optimizer.parse_policy,
        )
    }

    pub fn settings(&self) -> &ModelSettings {
        &self.settings
    }

    /// Run the ACE loop and synthesize the final response and revised prompt
    ///
    /// Makes `3 * max_iterations + 2` completion calls on success. With
    /// `max_iterations == 0` the loop is skipped and both synthesis calls see
    /// an empty memory.
    #[tracing::instrument(skip(self, system_prompt, query), fields(provider = self.client.name()))]
    pub async fn optimize(
        &self,
        system_prompt: &str,
        query: &str,
        max_iterations: usize,
    ) -> Result<OptimizationResult> {
        let mut memory = ContextMemory::new();

        for iteration in 0..max_iterations {
            let trajectory = self
                .generator
                .generate(system_prompt, query, &memory)
                .await
                .map_err(|e| log_failure(e, Some(iteration)))?;

            let insights = self
                .reflector
                .reflect(system_prompt, &trajectory)
                .await
                .map_err(|e| log_failure(e, Some(iteration)))?;

            let delta = self
                .curator
                .curate(system_prompt, &insights)
                .await
                .map_err(|e| log_failure(e, Some(iteration)))?;

            let added = delta.len();
            memory.extend(delta);
            tracing::info!(
                "ACE iteration {}/{} added {} items (memory size {})",
                iteration + 1,
                max_iterations,
                added,
                memory.len()
            );
        }

        let final_response = self
            .synthesize(
                Stage::FinalResponse,
                prompts::final_response_prompt(system_prompt, query, &memory),
            )
            .await
            .map_err(|e| log_failure(e, None))?;

        let revised_system_prompt = self
            .synthesize(
                Stage::RevisedPrompt,
                prompts::revised_prompt_prompt(system_prompt, query, &memory, &final_response),
            )
            .await
            .map_err(|e| log_failure(e, None))?;

        tracing::info!(
            "ACE run complete after {} iterations ({} context items)",
            max_iterations,
            memory.len()
        );

        Ok(OptimizationResult {
            final_response,
            revised_system_prompt,
            context_memory: memory,
            iterations: max_iterations,
        })
    }

    async fn synthesize(&self, stage: Stage, prompt: String) -> Result<String> {
        let completion = self
            .client
            .complete(&self.settings.request(prompt))
            .await
            .map_err(|e| EngineError::completion(stage, e))?;
        tracing::debug!("{} synthesized {} chars", stage, completion.text.len());
        Ok(completion.text)
    }
}

fn log_failure(err: EngineError, iteration: Option<usize>) -> EngineError {
    let stage = err
        .stage()
        .map(|s| s.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    match iteration {
        Some(i) => tracing::error!(stage = %stage, iteration = i, "ACE stage failed: {}", err),
        None => tracing::error!(stage = %stage, "ACE synthesis failed: {}", err),
    }
    err
}
