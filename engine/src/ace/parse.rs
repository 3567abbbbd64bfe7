//! Comma-delimited response parsing
//!
//! Every ACE stage asks the model for a comma-delimited list and splits the
//! raw text on `,`. Models do not always comply, so the policy is configurable.

use sdk::errors::{EngineError, Result, Stage};
use serde::{Deserialize, Serialize};

/// How a stage decomposes a comma-delimited response
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParsePolicy {
    /// Split on `,` and keep every fragment untouched, whitespace and empties included
    #[default]
    Raw,

    /// Split on `,`, trim whitespace and drop empty fragments
    Trimmed,

    /// Like `Trimmed`, but a response with no usable fragment is a parse error
    Strict,
}

/// Split `text` into list fragments according to `policy`
///
/// A response without any comma yields a single-element list under every
/// policy (as long as it is not blank for `Trimmed`/`Strict`).
pub fn split_list(stage: Stage, text: &str, policy: ParsePolicy) -> Result<Vec<String>> {
    match policy {
        ParsePolicy::Raw => Ok(text.split(',').map(String::from).collect()),
        ParsePolicy::Trimmed => Ok(trimmed_fragments(text)),
        ParsePolicy::Strict => {
            let fragments = trimmed_fragments(text);
            if fragments.is_empty() {
                return Err(EngineError::Parse {
                    stage,
                    message: "response contained no list items".to_string(),
                });
            }
            Ok(fragments)
        }
    }
}

fn trimmed_fragments(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
