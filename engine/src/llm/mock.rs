//! In-process completion client for unit tests

use async_trait::async_trait;
use std::sync::Mutex;

use super::{Completion, CompletionClient, CompletionError, CompletionRequest, Result};

type Responder = dyn Fn(usize, &CompletionRequest) -> Result<String> + Send + Sync;

/// Answers every call through a closure and records the prompts it saw
pub struct MockClient {
    responder: Box<Responder>,
    prompts: Mutex<Vec<String>>,
}

impl MockClient {
    pub fn new(
        responder: impl Fn(usize, &CompletionRequest) -> Result<String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            responder: Box::new(responder),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Always answer with the same text
    pub fn constant(text: &str) -> Self {
        let text = text.to_string();
        Self::new(move |_, _| Ok(text.clone()))
    }

    /// Answer by stage, recognised from the prompt tags
    pub fn by_stage(generator: &str, reflector: &str, curator: &str, other: &str) -> Self {
        let (g, r, c, o) = (
            generator.to_string(),
            reflector.to_string(),
            curator.to_string(),
            other.to_string(),
        );
        Self::new(move |_, request| {
            let prompt = &request.prompt;
            if prompt.contains("<CONTEXT_MEMORY>") {
                Ok(g.clone())
            } else if prompt.contains("<TRAJECTORY>") {
                Ok(r.clone())
            } else if prompt.contains("<INSIGHTS>") {
                Ok(c.clone())
            } else {
                Ok(o.clone())
            }
        })
    }

    /// Always fail
    pub fn failing(error: CompletionError) -> Self {
        Self::new(move |_, _| Err(error.clone()))
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionClient for MockClient {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<Completion> {
        let index = {
            let mut prompts = self.prompts.lock().unwrap();
            prompts.push(request.prompt.clone());
            prompts.len() - 1
        };
        let text = (self.responder)(index, request)?;
        Ok(Completion::new(text, request.model.clone()))
    }
}
