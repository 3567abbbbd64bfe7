//! Shared helpers for integration tests

#![allow(dead_code)]

use ace_engine::llm::{Completion, CompletionClient, CompletionError, CompletionRequest};
use async_trait::async_trait;
use std::sync::Mutex;

/// Completion client that answers by pipeline stage and records every prompt
///
/// Stages are recognised from the tags their prompts carry. The curator
/// answer is taken from `curator_answers` in call order, repeating the last.
pub struct ScriptedClient {
    pub generator: String,
    pub reflector: String,
    pub curator_answers: Vec<String>,
    pub synthesis: String,
    /// Fail the generator call with this (zero-based) index
    pub fail_generator_call: Option<usize>,
    prompts: Mutex<Vec<String>>,
    generator_calls: Mutex<usize>,
    curator_calls: Mutex<usize>,
}

impl ScriptedClient {
    pub fn new(generator: &str, reflector: &str, curator_answers: &[&str], synthesis: &str) -> Self {
        Self {
            generator: generator.to_string(),
            reflector: reflector.to_string(),
            curator_answers: curator_answers.iter().map(|s| s.to_string()).collect(),
            synthesis: synthesis.to_string(),
            fail_generator_call: None,
            prompts: Mutex::new(Vec::new()),
            generator_calls: Mutex::new(0),
            curator_calls: Mutex::new(0),
        }
    }

    pub fn failing_generator_call(mut self, index: usize) -> Self {
        self.fail_generator_call = Some(index);
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, CompletionError> {
        self.prompts.lock().unwrap().push(request.prompt.clone());
        let prompt = &request.prompt;

        let text = if prompt.contains("<CONTEXT_MEMORY>") {
            let mut calls = self.generator_calls.lock().unwrap();
            let index = *calls;
            *calls += 1;
            if self.fail_generator_call == Some(index) {
                return Err(CompletionError::ProviderUnavailable(
                    "scripted outage".to_string(),
                ));
            }
            self.generator.clone()
        } else if prompt.contains("<TRAJECTORY>") {
            self.reflector.clone()
        } else if prompt.contains("<INSIGHTS>") {
            let mut calls = self.curator_calls.lock().unwrap();
            let index = (*calls).min(self.curator_answers.len().saturating_sub(1));
            *calls += 1;
            self.curator_answers.get(index).cloned().unwrap_or_default()
        } else {
            self.synthesis.clone()
        };

        Ok(Completion::new(text, request.model.clone()))
    }
}
