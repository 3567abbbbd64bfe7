//! ACE Engine Library
//!
//! This library provides the core functionality of the ACE prompt optimizer.
//! It is used by both the main binary and integration tests.

/// Configuration management module
pub mod config;

/// Completion client abstraction layer
pub mod llm;

/// Generator, reflector, curator and the orchestrator loop
pub mod ace;

/// Randomized bucketing of predictions over a training set
pub mod bootstrap;

/// Concurrent batch evaluation
pub mod harness;

/// Agent storage seam and agent-level optimization flows
pub mod agents;

/// Telemetry and Observability
pub mod telemetry;

/// CLI interface module
pub mod cli;

/// Command handlers module
pub mod handlers;
