//! Bootstrap Partitioner
//!
//! Runs a predictor over a training set and scatters the predictions into
//! randomly chosen buckets. Bucket choice is uniform over `0..BUCKET_COUNT`
//! and independent of the prediction's score.
//!
//! # Examples
//!
//! ```no_run
//! use ace_engine::bootstrap::{Bootstrapper, CompletionPredictor};
//! # async fn run(predictor: CompletionPredictor, trainset: Vec<sdk::TrainingExample>) -> sdk::errors::Result<()> {
//! let mut bootstrapper = Bootstrapper::from_seed(7);
//! let batches = bootstrapper.bootstrap(&predictor, &trainset).await?;
//! println!("{} buckets filled", batches.len());
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sdk::errors::{EngineError, Result, Stage};
use sdk::types::{Prediction, TrainingExample};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::llm::{CompletionClient, ModelSettings};

/// Number of buckets predictions are scattered into
pub const BUCKET_COUNT: usize = 10;

/// Predictions grouped by bucket id; only non-empty buckets are present
pub type BootstrapBatches = BTreeMap<u8, Vec<Prediction>>;

/// Total number of predictions across all buckets
pub fn total_predictions(batches: &BootstrapBatches) -> usize {
    batches.values().map(Vec::len).sum()
}

/// Anything that turns an input into a scored response
#[async_trait]
pub trait Predictor: Send + Sync {
    /// Label used in logs
    fn name(&self) -> &str {
        "predictor"
    }

    async fn predict(&self, input: &str) -> Result<Prediction>;
}

pub struct Bootstrapper {
    rng: StdRng,
}

impl Default for Bootstrapper {
    fn default() -> Self {
        Self::new()
    }
}

impl Bootstrapper {
    /// Entropy-seeded bucket assignment
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_rng(rng: StdRng) -> Self {
        Self { rng }
    }

    /// Deterministic bucket assignment
    pub fn from_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    /// Predict every example in order and bucket the results
    ///
    /// The first prediction failure aborts the whole call.
    #[tracing::instrument(skip_all, fields(predictor = predictor.name(), examples = trainset.len()))]
    pub async fn bootstrap(
        &mut self,
        predictor: &dyn Predictor,
        trainset: &[TrainingExample],
    ) -> Result<BootstrapBatches> {
        let mut batches = BootstrapBatches::new();

        for example in trainset {
            let prediction = predictor.predict(&example.input).await.map_err(|e| {
                tracing::error!("Prediction failed for input {:?}: {}", example.input, e);
                e
            })?;

            let bucket = self.rng.gen_range(0..BUCKET_COUNT as u8);
            tracing::debug!(
                "Inserting response (score {:.3}) into batch {}",
                prediction.score,
                bucket
            );
            batches.entry(bucket).or_default().push(prediction);
        }

        tracing::info!(
            "Bootstrapped {} predictions into {} buckets",
            total_predictions(&batches),
            batches.len()
        );
        Ok(batches)
    }
}

/// How a `CompletionPredictor` scores its responses
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scoring {
    Fixed(f64),
    /// Uniform in `[0, 1)`
    Random,
}

/// Instruction template wrapped around each input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictorProfile {
    Default,
    Direct,
    Reasoned,
}

impl PredictorProfile {
    pub const NAMES: [&'static str; 3] = ["default", "direct", "reasoned"];

    pub fn from_name(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "default" => Ok(Self::Default),
            "direct" => Ok(Self::Direct),
            "reasoned" => Ok(Self::Reasoned),
            other => Err(EngineError::Validation(format!(
                "Unknown predictor profile '{}' (expected one of: {})",
                other,
                Self::NAMES.join(", ")
            ))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Direct => "direct",
            Self::Reasoned => "reasoned",
        }
    }

    fn render(&self, input: &str) -> String {
        match self {
            Self::Default | Self::Direct => format!(
                "Answer the following prompt to the best of your ability: {}",
                input
            ),
            Self::Reasoned => format!(
                "Answer the prompt, and provide reasoning for your answer in a numbered list: {}",
                input
            ),
        }
    }
}

/// Predictor backed by a single completion call per input
pub struct CompletionPredictor {
    client: Arc<dyn CompletionClient>,
    settings: ModelSettings,
    profile: PredictorProfile,
    scoring: Scoring,
}

impl CompletionPredictor {
    pub fn new(
        client: Arc<dyn CompletionClient>,
        settings: ModelSettings,
        profile: PredictorProfile,
    ) -> Self {
        Self {
            client,
            settings,
            profile,
            scoring: Scoring::Fixed(1.0),
        }
    }

    /// Look up a profile by name
    pub fn with_profile_name(
        client: Arc<dyn CompletionClient>,
        settings: ModelSettings,
        profile: &str,
    ) -> Result<Self> {
        Ok(Self::new(client, settings, PredictorProfile::from_name(profile)?))
    }

    pub fn with_scoring(mut self, scoring: Scoring) -> Self {
        self.scoring = scoring;
        self
    }

    pub fn profile(&self) -> PredictorProfile {
        self.profile
    }
}

#[async_trait]
impl Predictor for CompletionPredictor {
    fn name(&self) -> &str {
        self.profile.name()
    }

    async fn predict(&self, input: &str) -> Result<Prediction> {
        let request = self.settings.request(self.profile.render(input));
        let completion = self
            .client
            .complete(&request)
            .await
            .map_err(|e| EngineError::completion(Stage::Predictor, e))?;

        let score = match self.scoring {
            Scoring::Fixed(score) => score,
            Scoring::Random => rand::random::<f64>(),
        };
        Ok(Prediction::new(score, completion.text))
    }
}
