//! Agents
//!
//! Storage seam for agent records and the service that runs the optimizer
//! against them.

pub mod repository;
pub mod service;

pub use repository::{AgentRepository, AgentSnapshot, InMemoryAgentRepository};
pub use service::{AgentService, DuePromptOutcome};
