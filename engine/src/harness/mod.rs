//! Batch Evaluation Harness
//!
//! Runs many independent optimizer (or bootstrap) invocations under a
//! concurrency ceiling. Every task owns its own context memory; nothing is
//! shared between tasks except the completion client.
//!
//! Two failure policies are offered:
//! - `evaluate_batch` is fail-fast: the first error aborts every outstanding task.
//! - `evaluate_batch_isolated` reports one outcome per task.
//!
//! Results always come back in task order, whatever order the tasks finish in.

use futures::future::BoxFuture;
use futures::FutureExt;
use sdk::errors::{EngineError, Result};
use sdk::types::TrainingExample;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::ace::{AceOrchestrator, OptimizationResult};
use crate::bootstrap::{BootstrapBatches, Bootstrapper, Predictor};
use crate::config::Config;

/// Default ceiling on concurrently running tasks
pub const DEFAULT_CONCURRENCY_LIMIT: usize = 10;

/// One optimizer invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchTask {
    pub system_prompt: String,
    pub query: String,
    /// Falls back to the evaluator's default when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_iterations: Option<usize>,
}

impl BatchTask {
    pub fn new(system_prompt: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            query: query.into(),
            max_iterations: None,
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }
}

pub struct BatchEvaluator {
    orchestrator: Arc<AceOrchestrator>,
    default_iterations: usize,
    task_timeout: Option<Duration>,
    bootstrap_seed: Option<u64>,
    cancel: CancellationToken,
}

impl BatchEvaluator {
    pub fn new(orchestrator: Arc<AceOrchestrator>, default_iterations: usize) -> Self {
        Self {
            orchestrator,
            default_iterations,
            task_timeout: None,
            bootstrap_seed: None,
            cancel: CancellationToken::new(),
        }
    }

    pub fn from_config(orchestrator: Arc<AceOrchestrator>, config: &Config) -> Self {
        let mut evaluator = Self::new(orchestrator, config.optimizer.max_iterations);
        evaluator.task_timeout = config.batch.task_timeout_secs.map(Duration::from_secs);
        evaluator.bootstrap_seed = config.bootstrap.seed;
        evaluator
    }

    /// Give up on any single task that runs longer than `timeout`
    pub fn with_task_timeout(mut self, timeout: Duration) -> Self {
        self.task_timeout = Some(timeout);
        self
    }

    /// Seed bucket assignment; predictor `i` uses `seed + i`
    pub fn with_bootstrap_seed(mut self, seed: u64) -> Self {
        self.bootstrap_seed = Some(seed);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Token that cancels outstanding tasks of any running batch
    ///
    /// Cancellation is final: once the token fires, every later batch on this
    /// evaluator fails with `EngineError::Cancelled` before spawning anything.
    /// Build a new evaluator to run again.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Optimize every task, failing fast
    ///
    /// Returns results in task order, or the first error observed. Once an
    /// error is seen the remaining tasks are aborted.
    #[tracing::instrument(skip_all, fields(tasks = tasks.len(), limit = concurrency_limit))]
    pub async fn evaluate_batch(
        &self,
        tasks: Vec<BatchTask>,
        concurrency_limit: usize,
    ) -> Result<Vec<OptimizationResult>> {
        let jobs = self.optimize_jobs(tasks);
        let outcomes = self.run(jobs, concurrency_limit, true).await?;
        outcomes.into_iter().collect()
    }

    /// Optimize every task, reporting one outcome per task
    ///
    /// A failing task does not affect the others. Tasks still outstanding when
    /// the cancellation token fires report `EngineError::Cancelled`.
    #[tracing::instrument(skip_all, fields(tasks = tasks.len(), limit = concurrency_limit))]
    pub async fn evaluate_batch_isolated(
        &self,
        tasks: Vec<BatchTask>,
        concurrency_limit: usize,
    ) -> Result<Vec<Result<OptimizationResult>>> {
        let jobs = self.optimize_jobs(tasks);
        self.run(jobs, concurrency_limit, false).await
    }

    /// Bootstrap one trainset against several predictors, failing fast
    #[tracing::instrument(skip_all, fields(predictors = predictors.len(), limit = concurrency_limit))]
    pub async fn bootstrap_batch(
        &self,
        predictors: Vec<Arc<dyn Predictor>>,
        trainset: Vec<TrainingExample>,
        concurrency_limit: usize,
    ) -> Result<Vec<BootstrapBatches>> {
        let trainset: Arc<[TrainingExample]> = trainset.into();
        let jobs = predictors
            .into_iter()
            .enumerate()
            .map(|(index, predictor)| {
                let trainset = trainset.clone();
                let mut bootstrapper = match self.bootstrap_seed {
                    Some(seed) => Bootstrapper::from_seed(seed.wrapping_add(index as u64)),
                    None => Bootstrapper::new(),
                };
                async move { bootstrapper.bootstrap(predictor.as_ref(), &trainset).await }.boxed()
            })
            .collect();

        let outcomes = self.run(jobs, concurrency_limit, true).await?;
        outcomes.into_iter().collect()
    }

    fn optimize_jobs(
        &self,
        tasks: Vec<BatchTask>,
    ) -> Vec<BoxFuture<'static, Result<OptimizationResult>>> {
        tasks
            .into_iter()
            .map(|task| {
                let orchestrator = self.orchestrator.clone();
                let iterations = task.max_iterations.unwrap_or(self.default_iterations);
                async move {
                    orchestrator
                        .optimize(&task.system_prompt, &task.query, iterations)
                        .await
                }
                .boxed()
            })
            .collect()
    }

    /// Spawn `jobs` behind a semaphore and gather their outcomes in job order
    async fn run<T>(
        &self,
        jobs: Vec<BoxFuture<'static, Result<T>>>,
        concurrency_limit: usize,
        fail_fast: bool,
    ) -> Result<Vec<Result<T>>>
    where
        T: Send + 'static,
    {
        if concurrency_limit == 0 {
            return Err(EngineError::Validation(
                "Concurrency limit must be at least 1".to_string(),
            ));
        }

        if self.cancel.is_cancelled() {
            return Err(EngineError::Cancelled);
        }

        let total = jobs.len();
        let permits = concurrency_limit
            .min(total.max(1))
            .min(Semaphore::MAX_PERMITS);
        let semaphore = Arc::new(Semaphore::new(permits));
        let mut set = JoinSet::new();

        for (index, job) in jobs.into_iter().enumerate() {
            let semaphore = semaphore.clone();
            let cancel = self.cancel.clone();
            let timeout = self.task_timeout;

            set.spawn(async move {
                let outcome = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => Err(EngineError::Cancelled),
                    outcome = run_job(index, job, semaphore, timeout) => outcome,
                };
                (index, outcome)
            });
        }

        let mut slots: Vec<Option<Result<T>>> = (0..total).map(|_| None).collect();

        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((index, outcome)) => {
                    if let Err(e) = &outcome {
                        tracing::warn!("Batch task {} failed: {}", index, e);
                    }
                    if fail_fast {
                        if let Err(e) = outcome {
                            set.abort_all();
                            return Err(e);
                        }
                    }
                    slots[index] = Some(outcome);
                }
                Err(join_err) => {
                    tracing::error!("Batch task did not complete: {}", join_err);
                    if fail_fast {
                        set.abort_all();
                        return Err(EngineError::TaskFailed(join_err.to_string()));
                    }
                }
            }
        }

        let outcomes: Vec<Result<T>> = slots
            .into_iter()
            .map(|slot| {
                slot.unwrap_or_else(|| Err(EngineError::TaskFailed("Task panicked".to_string())))
            })
            .collect();

        tracing::info!(
            "Batch finished: {}/{} tasks succeeded",
            outcomes.iter().filter(|o| o.is_ok()).count(),
            total
        );
        Ok(outcomes)
    }
}

/// Wait for a permit, then run `job` under the optional timeout
async fn run_job<T>(
    index: usize,
    job: BoxFuture<'static, Result<T>>,
    semaphore: Arc<Semaphore>,
    timeout: Option<Duration>,
) -> Result<T> {
    let _permit = semaphore
        .acquire_owned()
        .await
        .map_err(|_| EngineError::Cancelled)?;

    match timeout {
        Some(limit) => tokio::time::timeout(limit, job).await.map_err(|_| {
            EngineError::TaskFailed(format!("Task {} timed out after {:?}", index, limit))
        })?,
        None => job.await,
    }
}
