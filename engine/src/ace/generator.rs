//! ACE Generator
//!
//! Asks the model for a trajectory, a list of candidate strategies for answering
//! the query, given the context accumulated so far.

use sdk::errors::{EngineError, Result, Stage};
use std::sync::Arc;

use super::memory::ContextMemory;
use super::parse::{split_list, ParsePolicy};
use super::prompts;
use super::types::Trajectory;
use crate::llm::{CompletionClient, ModelSettings};

#[derive(Clone)]
pub struct Generator {
    client: Arc<dyn CompletionClient>,
    settings: ModelSettings,
    parse_policy: ParsePolicy,
}

impl Generator {
    pub fn new(
        client: Arc<dyn CompletionClient>,
        settings: ModelSettings,
        parse_policy: ParsePolicy,
    ) -> Self {
        Self {
            client,
            settings,
            parse_policy,
        }
    }

    /// Produce a trajectory for `query`
    ///
    /// Exactly one completion call; failures are returned as-is, never retried.
    pub async fn generate(
        &self,
        system_prompt: &str,
        query: &str,
        memory: &ContextMemory,
    ) -> Result<Trajectory> {
        let prompt = prompts::generator_prompt(system_prompt, query, memory);
        let completion = self
            .client
            .complete(&self.settings.request(prompt))
            .await
            .map_err(|e| EngineError::completion(Stage::Generator, e))?;

        let reasoning = split_list(Stage::Generator, &completion.text, self.parse_policy)?;
        tracing::debug!(
            "Generator produced {} strategies (memory size {})",
            reasoning.len(),
            memory.len()
        );

        Ok(Trajectory::new(reasoning))
    }
}
