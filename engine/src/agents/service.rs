//! Agent-level optimization flows
//!
//! Ties the optimizer to stored agents: optimize on demand, optimize after a
//! chat turn when the agent's toggle is on, and sweep an agent's due prompts
//! through the batch harness.

use sdk::errors::{EngineError, Result};
use sdk::types::{DuePrompt, OptimizerState};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::repository::AgentRepository;
use crate::ace::{AceOrchestrator, OptimizationResult};
use crate::bootstrap::{BootstrapBatches, Bootstrapper, Predictor};
use crate::harness::{BatchEvaluator, BatchTask};

/// A due prompt together with the run it produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuePromptOutcome {
    pub prompt: DuePrompt,
    pub result: OptimizationResult,
}

pub struct AgentService {
    repository: Arc<dyn AgentRepository>,
    orchestrator: Arc<AceOrchestrator>,
    evaluator: BatchEvaluator,
    default_iterations: usize,
    concurrency_limit: usize,
}

impl AgentService {
    pub fn new(
        repository: Arc<dyn AgentRepository>,
        orchestrator: Arc<AceOrchestrator>,
        evaluator: BatchEvaluator,
        default_iterations: usize,
        concurrency_limit: usize,
    ) -> Self {
        Self {
            repository,
            orchestrator,
            evaluator,
            default_iterations,
            concurrency_limit,
        }
    }

    /// Optimize the agent's current prompt against `query` and persist the outcome
    ///
    /// On success the revised prompt replaces the agent's current prompt and
    /// the curated context contents are recorded as its optimizer state.
    #[tracing::instrument(skip(self, query))]
    pub async fn optimize_agent(
        &self,
        agent_id: &str,
        query: &str,
        max_iterations: Option<usize>,
    ) -> Result<OptimizationResult> {
        require_id(agent_id)?;
        let agent = self.repository.get_agent(agent_id).await?;

        let iterations = max_iterations.unwrap_or(self.default_iterations);
        let result = self
            .orchestrator
            .optimize(&agent.current_prompt, query, iterations)
            .await?;

        self.repository
            .edit_agent(agent_id, &result.revised_system_prompt)
            .await?;
        self.repository
            .update_optimizer_state(OptimizerState {
                agent_id: agent_id.to_string(),
                deltas: result.context_memory.contents(),
            })
            .await?;

        tracing::info!("Agent {} ({}) prompt revised", agent.id, agent.name);
        Ok(result)
    }

    /// Run the optimizer after a chat turn, only if the agent opted in
    pub async fn after_chat_turn(
        &self,
        agent_id: &str,
        query: &str,
    ) -> Result<Option<OptimizationResult>> {
        require_id(agent_id)?;
        let agent = self.repository.get_agent(agent_id).await?;

        if !agent.toggle {
            tracing::debug!("Agent {} has optimization toggled off; skipping", agent_id);
            return Ok(None);
        }

        self.optimize_agent(agent_id, query, None).await.map(Some)
    }

    /// Optimize up to `max_count` of the agent's due prompts concurrently
    ///
    /// The agent's prompt is left untouched; the deltas of every run are
    /// recorded, in due-prompt order, as the agent's optimizer state.
    #[tracing::instrument(skip(self))]
    pub async fn optimize_due_prompts(
        &self,
        agent_id: &str,
        max_count: usize,
    ) -> Result<Vec<DuePromptOutcome>> {
        require_id(agent_id)?;
        let agent = self.repository.get_agent(agent_id).await?;
        let due = self
            .repository
            .fetch_due_prompts(agent_id, max_count)
            .await?;

        if due.is_empty() {
            tracing::info!("No due prompts for agent {}", agent_id);
            return Ok(Vec::new());
        }

        let tasks = due
            .iter()
            .map(|p| {
                BatchTask::new(agent.current_prompt.clone(), p.prompt.clone())
                    .with_max_iterations(self.default_iterations)
            })
            .collect();
        let results = self
            .evaluator
            .evaluate_batch(tasks, self.concurrency_limit)
            .await?;

        let deltas = results
            .iter()
            .flat_map(|r| r.context_memory.contents())
            .collect();
        self.repository
            .update_optimizer_state(OptimizerState {
                agent_id: agent_id.to_string(),
                deltas,
            })
            .await?;

        Ok(due
            .into_iter()
            .zip(results)
            .map(|(prompt, result)| DuePromptOutcome { prompt, result })
            .collect())
    }

    /// Bootstrap the agent's stored training examples through `predictor`
    pub async fn bootstrap_agent(
        &self,
        agent_id: &str,
        predictor: &dyn Predictor,
        bootstrapper: &mut Bootstrapper,
    ) -> Result<BootstrapBatches> {
        require_id(agent_id)?;
        let trainset = self.repository.fetch_training_examples(agent_id).await?;
        if trainset.is_empty() {
            tracing::warn!("Agent {} has no training examples", agent_id);
        }
        bootstrapper.bootstrap(predictor, &trainset).await
    }
}

fn require_id(agent_id: &str) -> Result<()> {
    if agent_id.trim().is_empty() {
        return Err(EngineError::Validation("Agent id is required".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::InMemoryAgentRepository;
    use crate::bootstrap::{total_predictions, CompletionPredictor, PredictorProfile};
    use crate::llm::mock::MockClient;
    use crate::llm::ModelSettings;
    use sdk::types::{Agent, TrainingExample};

    async fn setup(
        toggle: bool,
    ) -> (Arc<InMemoryAgentRepository>, Arc<MockClient>, AgentService) {
        let repo = Arc::new(InMemoryAgentRepository::new());
        repo.insert_agent(Agent::new("a1", "tutor", "You are a tutor.").with_toggle(toggle))
            .await;

        let client = Arc::new(MockClient::by_stage("g", "r", "check units", "Be a precise tutor."));
        let orchestrator = Arc::new(AceOrchestrator::new(client.clone(), ModelSettings::new("m")));
        let evaluator = BatchEvaluator::new(orchestrator.clone(), 1);
        let service = AgentService::new(repo.clone(), orchestrator, evaluator, 1, 4);
        (repo, client, service)
    }

    #[tokio::test]
    async fn test_empty_id_is_rejected_before_any_call() {
        let (_, client, service) = setup(true).await;

        let err = service.optimize_agent("  ", "q", None).await.unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
        assert!(matches!(
            service.after_chat_turn("", "q").await,
            Err(EngineError::Validation(_))
        ));
        assert_eq!(client.calls(), 0);
    }

    #[tokio::test]
    async fn test_optimize_persists_prompt_and_state() {
        let (repo, _, service) = setup(false).await;

        let result = service.optimize_agent("a1", "What is 2+2?", None).await.unwrap();
        assert_eq!(result.iterations, 1);

        let agent = repo.get_agent("a1").await.unwrap();
        assert_eq!(agent.current_prompt, "Be a precise tutor.");
        assert_eq!(agent.original_prompt, "You are a tutor.");

        let state = repo.optimizer_state("a1").await.unwrap();
        assert_eq!(state.deltas, vec!["check units"]);
    }

    #[tokio::test]
    async fn test_toggle_off_skips_optimization() {
        let (repo, client, service) = setup(false).await;

        let outcome = service.after_chat_turn("a1", "hi").await.unwrap();
        assert!(outcome.is_none());
        assert_eq!(client.calls(), 0);
        assert_eq!(repo.get_agent("a1").await.unwrap().current_prompt, "You are a tutor.");
    }

    #[tokio::test]
    async fn test_toggle_on_runs_optimization() {
        let (_, client, service) = setup(true).await;

        let outcome = service.after_chat_turn("a1", "hi").await.unwrap();
        assert!(outcome.is_some());
        assert_eq!(client.calls(), 3 + 2);
    }

    #[tokio::test]
    async fn test_due_prompts_run_through_harness() {
        let (repo, _, service) = setup(false).await;
        for (id, text) in [("p1", "first"), ("p2", "second"), ("p3", "third")] {
            repo.add_due_prompt(DuePrompt {
                id: id.to_string(),
                agent_id: "a1".to_string(),
                prompt: text.to_string(),
            })
            .await;
        }

        let outcomes = service.optimize_due_prompts("a1", 2).await.unwrap();
        let ids: Vec<_> = outcomes.iter().map(|o| o.prompt.id.as_str()).collect();
        assert_eq!(ids, ["p1", "p2"]);

        let state = repo.optimizer_state("a1").await.unwrap();
        assert_eq!(state.deltas, vec!["check units", "check units"]);
        assert_eq!(repo.get_agent("a1").await.unwrap().current_prompt, "You are a tutor.");
    }

    #[tokio::test]
    async fn test_no_due_prompts_is_empty() {
        let (repo, _, service) = setup(false).await;
        assert!(service.optimize_due_prompts("a1", 5).await.unwrap().is_empty());
        assert!(repo.optimizer_state("a1").await.is_none());
    }

    #[tokio::test]
    async fn test_bootstrap_agent_uses_stored_examples() {
        let (repo, client, service) = setup(false).await;
        repo.add_training_examples(
            "a1",
            vec![TrainingExample::new("a", "1"), TrainingExample::new("b", "2")],
        )
        .await;

        let predictor = CompletionPredictor::new(client, ModelSettings::new("m"), PredictorProfile::Direct);
        let batches = service
            .bootstrap_agent("a1", &predictor, &mut Bootstrapper::from_seed(1))
            .await
            .unwrap();
        assert_eq!(total_predictions(&batches), 2);
    }
}
