//! CLI interface for ACE
//!
//! This module provides the command-line interface using clap's derive API.
//! It defines all commands and global flags for driving the optimizer.

use clap::{ArgGroup, Parser, Subcommand};
use std::path::PathBuf;

/// ACE prompt optimizer
///
/// Iteratively builds a context memory for a query with a generator, reflector
/// and curator, then synthesizes a final response and a revised system prompt.
#[derive(Parser, Debug)]
#[command(name = "ace")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log: Option<String>,

    /// Specify alternate configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Optimize a system prompt against a single query
    #[command(group(ArgGroup::new("prompt").required(true).args(["system_prompt", "system_prompt_file"])))]
    Optimize {
        /// System prompt text
        #[arg(long)]
        system_prompt: Option<String>,

        /// Read the system prompt from a file
        #[arg(long, value_name = "PATH")]
        system_prompt_file: Option<PathBuf>,

        /// Query to optimize for
        #[arg(long)]
        query: String,

        /// Number of ACE iterations (default: from config)
        #[arg(short, long)]
        iterations: Option<usize>,
    },

    /// Bucket predictions over a training set
    Bootstrap {
        /// JSON array of {"input", "output"} examples
        #[arg(long, value_name = "FILE")]
        trainset: PathBuf,

        /// Predictor profile (default, direct, reasoned)
        #[arg(long, default_value = "default")]
        profile: String,
    },

    /// Optimize many (system prompt, query) tasks concurrently
    Batch {
        /// JSON array of {"systemPrompt", "query", "maxIterations"?} tasks
        #[arg(long, value_name = "FILE")]
        tasks: PathBuf,

        /// Maximum tasks in flight (default: from config)
        #[arg(long)]
        concurrency: Option<usize>,

        /// Report every task's outcome instead of stopping at the first failure
        #[arg(long)]
        isolate: bool,
    },

    /// Optimize stored agents
    Agent {
        #[command(subcommand)]
        action: AgentAction,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Agent store actions
#[derive(Subcommand, Debug)]
pub enum AgentAction {
    /// Optimize an agent's prompt and save the revision
    Optimize {
        /// JSON agent store file (default: <data_dir>/agents.json)
        #[arg(long, value_name = "FILE")]
        store: Option<PathBuf>,

        /// Agent ID
        #[arg(long)]
        id: String,

        /// Query to optimize for
        #[arg(long)]
        query: String,

        /// Number of ACE iterations (default: from config)
        #[arg(short, long)]
        iterations: Option<usize>,
    },

    /// Record a chat turn; optimizes only when the agent's toggle is on
    ChatTurn {
        #[arg(long, value_name = "FILE")]
        store: Option<PathBuf>,

        #[arg(long)]
        id: String,

        #[arg(long)]
        query: String,
    },

    /// Optimize the agent's due prompts
    Due {
        #[arg(long, value_name = "FILE")]
        store: Option<PathBuf>,

        #[arg(long)]
        id: String,

        /// Maximum prompts to process
        #[arg(long, default_value = "10")]
        max_count: usize,
    },

    /// Bootstrap the agent's stored training examples
    Bootstrap {
        #[arg(long, value_name = "FILE")]
        store: Option<PathBuf>,

        #[arg(long)]
        id: String,

        /// Predictor profile (default, direct, reasoned)
        #[arg(long, default_value = "default")]
        profile: String,
    },
}

/// Configuration actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Print the configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from(["ace", "--json", "--log", "debug", "config", "show"]);
        assert!(cli.json);
        assert_eq!(cli.log, Some("debug".to_string()));
        assert!(matches!(
            cli.command,
            Command::Config {
                action: ConfigAction::Show
            }
        ));
    }

    #[test]
    fn test_optimize_command() {
        let cli = Cli::parse_from([
            "ace",
            "optimize",
            "--system-prompt",
            "You are helpful.",
            "--query",
            "What is 2+2?",
            "-i",
            "2",
        ]);
        if let Command::Optimize {
            system_prompt,
            query,
            iterations,
            ..
        } = cli.command
        {
            assert_eq!(system_prompt.as_deref(), Some("You are helpful."));
            assert_eq!(query, "What is 2+2?");
            assert_eq!(iterations, Some(2));
        } else {
            panic!("Expected Optimize command");
        }
    }

    #[test]
    fn test_optimize_requires_a_prompt_source() {
        let result = Cli::try_parse_from(["ace", "optimize", "--query", "q"]);
        assert!(result.is_err());

        let result = Cli::try_parse_from([
            "ace",
            "optimize",
            "--system-prompt",
            "a",
            "--system-prompt-file",
            "b.txt",
            "--query",
            "q",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_batch_command() {
        let cli = Cli::parse_from(["ace", "batch", "--tasks", "tasks.json", "--isolate"]);
        if let Command::Batch {
            tasks,
            concurrency,
            isolate,
        } = cli.command
        {
            assert_eq!(tasks, PathBuf::from("tasks.json"));
            assert_eq!(concurrency, None);
            assert!(isolate);
        } else {
            panic!("Expected Batch command");
        }
    }

    #[test]
    fn test_bootstrap_default_profile() {
        let cli = Cli::parse_from(["ace", "bootstrap", "--trainset", "train.json"]);
        if let Command::Bootstrap { profile, .. } = cli.command {
            assert_eq!(profile, "default");
        } else {
            panic!("Expected Bootstrap command");
        }
    }

    #[test]
    fn test_agent_due() {
        let cli = Cli::parse_from([
            "ace", "agent", "due", "--store", "agents.json", "--id", "a1", "--max-count", "3",
        ]);
        if let Command::Agent {
            action: AgentAction::Due { id, max_count, .. },
        } = cli.command
        {
            assert_eq!(id, "a1");
            assert_eq!(max_count, 3);
        } else {
            panic!("Expected Agent Due command");
        }
    }

    #[test]
    fn test_agent_chat_turn() {
        let cli = Cli::parse_from([
            "ace", "agent", "chat-turn", "--store", "s.json", "--id", "a1", "--query", "hi",
        ]);
        assert!(matches!(
            cli.command,
            Command::Agent {
                action: AgentAction::ChatTurn { .. }
            }
        ));
    }
}
