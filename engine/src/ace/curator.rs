//! ACE Curator
//!
//! Synthesizes insights into delta context items. Every item the curator emits
//! is tagged `ContextKind::Concept`; facts and observations are never produced here.

use sdk::errors::{EngineError, Result, Stage};
use std::sync::Arc;

use super::parse::{split_list, ParsePolicy};
use super::prompts;
use super::types::{ContextItem, Insights};
use crate::llm::{CompletionClient, ModelSettings};

#[derive(Clone)]
pub struct Curator {
    client: Arc<dyn CompletionClient>,
    settings: ModelSettings,
    parse_policy: ParsePolicy,
}

impl Curator {
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

    pub async fn curate(&self, system_prompt: &str, insights: &Insights) -> Result<Vec<ContextItem>> {
        let prompt = prompts::curator_prompt(system_prompt, insights);
        let completion = self
            .client
            .complete(&self.settings.request(prompt))
            .await
            .map_err(|e| EngineError::completion(Stage::Curator, e))?;

        let items: Vec<ContextItem> = split_list(Stage::Curator, &completion.text, self.parse_policy)?
            .into_iter()
            .map(ContextItem::concept)
            .collect();

        tracing::debug!(
            "Curator produced {} context items from {} insights",
            items.len(),
            insights.len()
        );

        Ok(items)
    }
}
