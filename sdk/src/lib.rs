//! ACE SDK
//!
//! Shared error types and plain data records used by the engine and by
//! whatever transport or storage layer drives it.

/// Error types and handling
pub mod errors;

/// Records exchanged with callers and storage
pub mod types;

// Re-export commonly used types
pub use errors::{CompletionError, EngineError, ErrorExt, Stage};
pub use types::{Agent, DuePrompt, OptimizerState, Prediction, TrainingExample};
