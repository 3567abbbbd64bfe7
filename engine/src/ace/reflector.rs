//! ACE Reflector
//!
//! Distills a trajectory into insights the curator can turn into context items.

use sdk::errors::{EngineError, Result, Stage};
use std::sync::Arc;

use super::parse::{split_list, ParsePolicy};
use super::prompts;
use super::types::{Insights, Trajectory};
use crate::llm::{CompletionClient, ModelSettings};

#[derive(Clone)]
pub struct Reflector {
    client: Arc<dyn CompletionClient>,
    settings: ModelSettings,
    parse_policy: ParsePolicy,
}

impl Reflector {
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

    pub async fn reflect(&self, system_prompt: &str, trajectory: &Trajectory) -> Result<Insights> {
        let prompt = prompts::reflector_prompt(system_prompt, trajectory);
        let completion = self
            .client
            .complete(&self.settings.request(prompt))
            .await
            .map_err(|e| EngineError::completion(Stage::Reflector, e))?;

        let insights = split_list(Stage::Reflector, &completion.text, self.parse_policy)?;
        tracing::debug!(
            "Reflector produced {} insights from {} strategies",
            insights.len(),
            trajectory.reasoning.len()
        );

        Ok(Insights::new(insights))
    }
}
