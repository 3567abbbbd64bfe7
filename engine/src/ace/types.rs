//! Typed artifacts passed between ACE stages

use serde::{Deserialize, Serialize};
use std::fmt;

use super::memory::ContextMemory;

/// Category of a context item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextKind {
    Fact,
    Concept,
    Observation,
}

impl fmt::Display for ContextKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextKind::Fact => write!(f, "fact"),
            ContextKind::Concept => write!(f, "concept"),
            ContextKind::Observation => write!(f, "observation"),
        }
    }
}

/// An atomic unit of accumulated knowledge
///
/// Items are immutable once created: fields are only reachable through accessors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextItem {
    #[serde(rename = "type")]
    kind: ContextKind,
    content: String,
}

impl ContextItem {
    pub fn new(kind: ContextKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
        }
    }

    pub fn concept(content: impl Into<String>) -> Self {
        Self::new(ContextKind::Concept, content)
    }

    pub fn fact(content: impl Into<String>) -> Self {
        Self::new(ContextKind::Fact, content)
    }

    pub fn observation(content: impl Into<String>) -> Self {
        Self::new(ContextKind::Observation, content)
    }

    pub fn kind(&self) -> ContextKind {
        self.kind
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Candidate reasoning strategies produced by the generator for one iteration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trajectory {
    pub reasoning: Vec<String>,
}

impl Trajectory {
    pub fn new(reasoning: Vec<String>) -> Self {
        Self { reasoning }
    }

    /// Strategies joined the way they are embedded into the reflector prompt
    pub fn joined(&self) -> String {
        self.reasoning.join(", ")
    }
}

/// Lessons extracted from one trajectory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Insights(Vec<String>);

impl Insights {
    pub fn new(insights: Vec<String>) -> Self {
        Self(insights)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn joined(&self) -> String {
        self.0.join(", ")
    }
}

impl From<Vec<String>> for Insights {
    fn from(insights: Vec<String>) -> Self {
        Self(insights)
    }
}

/// Outcome of one successful `optimize()` call
///
/// The caller is responsible for persisting `revised_system_prompt` back onto
/// the agent record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationResult {
    pub final_response: String,
    pub revised_system_prompt: String,
    pub context_memory: ContextMemory,
    pub iterations: usize,
}
