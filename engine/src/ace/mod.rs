//! ACE Optimizer
//!
//! Agentic Context Engineering: generator, reflector and curator stages plus the
//! orchestrator that loops over them and synthesizes the final outputs.

pub mod curator;
pub mod generator;
pub mod memory;
pub mod orchestrator;
pub mod parse;
pub mod prompts;
pub mod reflector;
pub mod types;

pub use curator::Curator;
pub use generator::Generator;
pub use memory::ContextMemory;
pub use orchestrator::AceOrchestrator;
pub use parse::ParsePolicy;
pub use reflector::Reflector;
pub use types::{ContextItem, ContextKind, Insights, OptimizationResult, Trajectory};
