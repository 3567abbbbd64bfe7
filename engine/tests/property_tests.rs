mod common;

use ace_engine::ace::AceOrchestrator;
use ace_engine::bootstrap::{total_predictions, Bootstrapper, Predictor, BUCKET_COUNT};
use ace_engine::llm::ModelSettings;
use async_trait::async_trait;
use common::ScriptedClient;
use proptest::prelude::*;
use sdk::errors::Result;
use sdk::types::{Prediction, TrainingExample};
use std::sync::Arc;

struct EchoPredictor;

#[async_trait]
impl Predictor for EchoPredictor {
    async fn predict(&self, input: &str) -> Result<Prediction> {
        Ok(Prediction::new(1.0, input))
    }
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    // Memory length is the sum of every curator's item count, in curator order
    #[test]
    fn test_memory_grows_by_curated_items(
        answers in prop::collection::vec(prop::collection::vec("[a-z]{1,8}", 1..4), 1..5),
    ) {
        let joined: Vec<String> = answers.iter().map(|items| items.join(",")).collect();
        let refs: Vec<&str> = joined.iter().map(String::as_str).collect();
        let client = Arc::new(ScriptedClient::new("g", "r", &refs, "final"));
        let orchestrator = AceOrchestrator::new(client, ModelSettings::new("m"));

        let result = runtime()
            .block_on(orchestrator.optimize("sp", "q", answers.len()))
            .unwrap();

        let expected: Vec<String> = answers.into_iter().flatten().collect();
        prop_assert_eq!(result.context_memory.len(), expected.len());
        prop_assert_eq!(result.context_memory.contents(), expected);
    }

    // Every prediction lands in exactly one bucket in 0..10
    #[test]
    fn test_bucket_domain_and_total(
        inputs in prop::collection::vec("[a-zA-Z ?]{0,20}", 0..40),
        seed in any::<u64>(),
    ) {
        let trainset: Vec<TrainingExample> = inputs
            .iter()
            .map(|input| TrainingExample::new(input.clone(), "expected"))
            .collect();

        let batches = runtime()
            .block_on(Bootstrapper::from_seed(seed).bootstrap(&EchoPredictor, &trainset))
            .unwrap();

        prop_assert_eq!(total_predictions(&batches), trainset.len());
        prop_assert!(batches.keys().all(|bucket| (*bucket as usize) < BUCKET_COUNT));
        prop_assert!(batches.values().all(|bucket| !bucket.is_empty()));
    }
}
