//! Plain data records exchanged with callers and the storage collaborator

use serde::{Deserialize, Serialize};

/// A labeled example used to evaluate a predictor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingExample {
    /// Input fed to the predictor
    pub input: String,

    /// Expected/reference output
    pub output: String,
}

impl TrainingExample {
    pub fn new(input: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
        }
    }
}

/// A single predictor output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub score: f64,
    pub response: String,
}

impl Prediction {
    pub fn new(score: f64, response: impl Into<String>) -> Self {
        Self {
            score,
            response: response.into(),
        }
    }
}

/// Agent record owned by the storage collaborator
///
/// `toggle` gates whether the ACE loop runs automatically after a chat turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: String,
    pub name: String,
    pub original_prompt: String,
    pub current_prompt: String,
    #[serde(default)]
    pub toggle: bool,
}

impl Agent {
    /// Create an agent whose current prompt starts as its original prompt
    pub fn new(id: impl Into<String>, name: impl Into<String>, prompt: impl Into<String>) -> Self {
        let prompt = prompt.into();
        Self {
            id: id.into(),
            name: name.into(),
            original_prompt: prompt.clone(),
            current_prompt: prompt,
            toggle: false,
        }
    }

    pub fn with_toggle(mut self, toggle: bool) -> Self {
        self.toggle = toggle;
        self
    }
}

/// A stored user message that has not been run through the optimizer yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuePrompt {
    pub id: String,
    pub agent_id: String,
    pub prompt: String,
}

/// Context deltas recorded against an agent after an optimization run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizerState {
    pub agent_id: String,
    pub deltas: Vec<String>,
}
