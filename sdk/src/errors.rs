//! Error types and handling
//!
//! This module provides the error types used throughout the ACE engine.
//! All errors implement the `ErrorExt` trait which provides user-friendly
//! hints and indicates whether errors are recoverable.
//!
//! Stage errors are never retried inside the engine: they propagate unmodified
//! up through the orchestrator, the partitioner and the batch harness to the
//! caller, which is expected to log the full cause chain.

use std::fmt;
use thiserror::Error;

/// Result type used by every engine operation
pub type Result<T> = std::result::Result<T, EngineError>;

/// Trait for engine error extensions
pub trait ErrorExt {
    /// Returns a user-friendly hint for the error
    ///
    /// The hint is safe to display to end users and never contains
    /// prompts, API keys or raw provider responses.
    fn user_hint(&self) -> &str;

    /// Returns whether the error is recoverable
    ///
    /// Recoverable errors may succeed when the caller tries again later.
    /// The engine itself never retries.
    fn is_recoverable(&self) -> bool;
}

/// Pipeline stage that issued a completion call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Generator,
    Reflector,
    Curator,
    FinalResponse,
    RevisedPrompt,
    Predictor,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Generator => write!(f, "generator"),
            Stage::Reflector => write!(f, "reflector"),
            Stage::Curator => write!(f, "curator"),
            Stage::FinalResponse => write!(f, "final_response"),
            Stage::RevisedPrompt => write!(f, "revised_prompt"),
            Stage::Predictor => write!(f, "predictor"),
        }
    }
}

/// Errors raised by a completion client
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompletionError {
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Timeout")]
    Timeout,

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Main engine error type
///
/// # Error Categories
///
/// - **Completion**: the language-model call failed (network, rate limit, malformed body)
/// - **Parse**: a response could not be decomposed into a comma-delimited list
/// - **Validation**: caller supplied missing or invalid identifiers/arguments
/// - **Storage**: the agent repository rejected a read or write
/// - **Batch**: cancellation and task failures inside the batch harness
///
/// # Examples
///
/// ```
/// use sdk::errors::{CompletionError, EngineError, ErrorExt, Stage};
///
/// let error = EngineError::Completion {
///     stage: Stage::Generator,
///     source: CompletionError::RateLimitExceeded,
/// };
/// assert!(error.is_recoverable());
///
/// let invalid = EngineError::Validation("agent id is required".to_string());
/// assert!(!invalid.is_recoverable());
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Completion failed in {stage} stage: {source}")]
    Completion {
        stage: Stage,
        #[source]
        source: CompletionError,
    },

    #[error("Could not parse {stage} response: {message}")]
    Parse { stage: Stage, message: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Batch cancelled")]
    Cancelled,

    #[error("Batch task failed: {0}")]
    TaskFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// Wrap a completion failure with the stage that issued the call
    pub fn completion(stage: Stage, source: CompletionError) -> Self {
        Self::Completion { stage, source }
    }

    /// The stage this error originated from, if any
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::Completion { stage, .. } | Self::Parse { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

impl ErrorExt for EngineError {
    fn user_hint(&self) -> &str {
        match self {
            Self::Completion { source, .. } => match source {
                CompletionError::AuthenticationFailed(_) => {
                    "Completion provider rejected the credentials. Check your API key"
                }
                CompletionError::RateLimitExceeded => {
                    "Completion provider is rate limiting requests. Try again later"
                }
                CompletionError::Timeout => "Completion provider took too long to respond",
                _ => "Completion provider unavailable. Check configuration and network",
            },
            Self::Parse { .. } => "The model returned output that could not be parsed",
            Self::Validation(_) => "Check the identifiers and arguments you supplied",
            Self::Storage(_) => "Agent storage operation failed",
            Self::Config(_) => "Check your config.toml file for errors",
            Self::Cancelled => "The batch was cancelled before this task finished",
            Self::TaskFailed(_) => "A batch task stopped unexpectedly",
            Self::Io(_) => "File system operation failed",
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            Self::Completion { source, .. } => {
                !matches!(source, CompletionError::AuthenticationFailed(_))
            }
            Self::Validation(_) | Self::Config(_) => false,
            _ => true,
        }
    }
}
