//! Agent storage collaborator
//!
//! The optimizer does not own storage. `AgentRepository` is the seam a real
//! database plugs into; `InMemoryAgentRepository` backs tests and the CLI,
//! which loads it from and saves it to a JSON snapshot file.

use async_trait::async_trait;
use sdk::errors::{EngineError, Result};
use sdk::types::{Agent, DuePrompt, OptimizerState, TrainingExample};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tokio::sync::RwLock;

#[async_trait]
pub trait AgentRepository: Send + Sync {
    async fn get_agent(&self, id: &str) -> Result<Agent>;

    /// Replace the agent's current prompt
    async fn edit_agent(&self, id: &str, new_prompt: &str) -> Result<()>;

    async fn fetch_training_examples(&self, agent_id: &str) -> Result<Vec<TrainingExample>>;

    /// Up to `max_count` stored prompts awaiting optimization, oldest first
    async fn fetch_due_prompts(&self, agent_id: &str, max_count: usize) -> Result<Vec<DuePrompt>>;

    /// Record the context deltas of the latest optimization
    async fn update_optimizer_state(&self, state: OptimizerState) -> Result<()>;
}

/// Everything the in-memory repository holds, as written to disk
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentSnapshot {
    #[serde(default)]
    pub agents: Vec<Agent>,

    /// Training examples keyed by agent id
    #[serde(default)]
    pub training_examples: BTreeMap<String, Vec<TrainingExample>>,

    #[serde(default)]
    pub due_prompts: Vec<DuePrompt>,

    #[serde(default)]
    pub optimizer_states: Vec<OptimizerState>,
}

#[derive(Default)]
pub struct InMemoryAgentRepository {
    state: RwLock<AgentSnapshot>,
}

impl InMemoryAgentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: AgentSnapshot) -> Self {
        Self {
            state: RwLock::new(snapshot),
        }
    }

    /// Load a JSON snapshot file
    pub async fn load(path: &Path) -> Result<Self> {
        let contents = tokio::fs::read_to_string(path).await?;
        let snapshot: AgentSnapshot = serde_json::from_str(&contents).map_err(|e| {
            EngineError::Storage(format!("Invalid agent store {}: {}", path.display(), e))
        })?;
        tracing::debug!(
            "Loaded {} agents from {}",
            snapshot.agents.len(),
            path.display()
        );
        Ok(Self::from_snapshot(snapshot))
    }

    /// Write the current state back as pretty JSON
    pub async fn save(&self, path: &Path) -> Result<()> {
        let json = {
            let state = self.state.read().await;
            serde_json::to_string_pretty(&*state)
                .map_err(|e| EngineError::Storage(format!("Failed to serialize agent store: {}", e)))?
        };
        tokio::fs::write(path, json).await?;
        tracing::debug!("Saved agent store to {}", path.display());
        Ok(())
    }

    pub async fn snapshot(&self) -> AgentSnapshot {
        self.state.read().await.clone()
    }

    pub async fn insert_agent(&self, agent: Agent) {
        let mut state = self.state.write().await;
        state.agents.retain(|a| a.id != agent.id);
        state.agents.push(agent);
    }

    pub async fn add_training_examples(&self, agent_id: &str, examples: Vec<TrainingExample>) {
        let mut state = self.state.write().await;
        state
            .training_examples
            .entry(agent_id.to_string())
            .or_default()
            .extend(examples);
    }

    pub async fn add_due_prompt(&self, prompt: DuePrompt) {
        self.state.write().await.due_prompts.push(prompt);
    }

    pub async fn optimizer_state(&self, agent_id: &str) -> Option<OptimizerState> {
        self.state
            .read()
            .await
            .optimizer_states
            .iter()
            .find(|s| s.agent_id == agent_id)
            .cloned()
    }
}

fn agent_not_found(id: &str) -> EngineError {
    EngineError::Storage(format!("Agent not found: {}", id))
}

#[async_trait]
impl AgentRepository for InMemoryAgentRepository {
    async fn get_agent(&self, id: &str) -> Result<Agent> {
        self.state
            .read()
            .await
            .agents
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or_else(|| agent_not_found(id))
    }

    async fn edit_agent(&self, id: &str, new_prompt: &str) -> Result<()> {
        let mut state = self.state.write().await;
        let agent = state
            .agents
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| agent_not_found(id))?;
        agent.current_prompt = new_prompt.to_string();
        Ok(())
    }

    async fn fetch_training_examples(&self, agent_id: &str) -> Result<Vec<TrainingExample>> {
        let state = self.state.read().await;
        Ok(state
            .training_examples
            .get(agent_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch_due_prompts(&self, agent_id: &str, max_count: usize) -> Result<Vec<DuePrompt>> {
        let state = self.state.read().await;
        Ok(state
            .due_prompts
            .iter()
            .filter(|p| p.agent_id == agent_id)
            .take(max_count)
            .cloned()
            .collect())
    }

    async fn update_optimizer_state(&self, new_state: OptimizerState) -> Result<()> {
        let mut state = self.state.write().await;
        if !state.agents.iter().any(|a| a.id == new_state.agent_id) {
            return Err(agent_not_found(&new_state.agent_id));
        }
        state
            .optimizer_states
            .retain(|s| s.agent_id != new_state.agent_id);
        state.optimizer_states.push(new_state);
        Ok(())
    }
}
