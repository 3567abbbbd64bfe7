//! Integration tests for configuration management
//!
//! These tests verify that the Config struct can be properly loaded from
//! disk, validated, and written back.

use ace_engine::ace::ParsePolicy;
use ace_engine::config::{Config, ProviderKind};
use sdk::errors::EngineError;
use std::fs;

#[test]
fn test_config_file_loading() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
[core]
log_level = "debug"
data_dir = "/tmp/ace-data"

[llm]
provider = "ollama"
model = "llama3.1:8b"
temperature = 0.2
max_tokens = 512

[llm.ollama]
base_url = "http://localhost:11434"

[optimizer]
max_iterations = 5
parse_policy = "strict"

[bootstrap]
seed = 42

[batch]
concurrency_limit = 4
task_timeout_secs = 300
"#,
    )
    .unwrap();

    let config = Config::load_from_path(&path).unwrap();
    assert_eq!(config.core.log_level, "debug");
    assert_eq!(config.llm.provider, ProviderKind::Ollama);
    assert_eq!(config.llm.model, "llama3.1:8b");
    assert_eq!(config.llm.max_tokens, 512);
    assert_eq!(config.optimizer.max_iterations, 5);
    assert_eq!(config.optimizer.parse_policy, ParsePolicy::Strict);
    assert_eq!(config.bootstrap.seed, Some(42));
    assert_eq!(config.batch.concurrency_limit, 4);
    assert_eq!(config.batch.task_timeout_secs, Some(300));
}

#[test]
fn test_defaults_fill_missing_sections() {
    let config = Config::from_toml_str("").unwrap();
    assert_eq!(config.llm.provider, ProviderKind::OpenAI);
    assert_eq!(config.llm.openai.base_url, "https://openrouter.ai/api/v1");
    assert_eq!(config.llm.openai.api_key_env, "OPENROUTER_API_KEY");
    assert_eq!(config.llm.temperature, 0.7);
    assert_eq!(config.llm.max_tokens, 1000);
    assert_eq!(config.optimizer.max_iterations, 3);
    assert_eq!(config.optimizer.parse_policy, ParsePolicy::Raw);
    assert_eq!(config.bootstrap.buckets, 10);
    assert_eq!(config.batch.concurrency_limit, 10);
    assert_eq!(config.batch.task_timeout_secs, None);
}

#[test]
fn test_written_config_reloads() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");

    let mut config = Config::default();
    config.llm.model = "gpt-4o-mini".to_string();
    config.batch.concurrency_limit = 2;
    fs::write(&path, toml::to_string_pretty(&config).unwrap()).unwrap();

    let reloaded = Config::load_from_path(&path).unwrap();
    assert_eq!(reloaded.llm.model, "gpt-4o-mini");
    assert_eq!(reloaded.batch.concurrency_limit, 2);
}

#[test]
fn test_invalid_values_are_config_errors() {
    let cases = [
        "[core]\nlog_level = \"loud\"",
        "[llm]\ntemperature = 3.5",
        "[llm]\nmax_tokens = 0",
        "[llm]\nmodel = \"  \"",
        "[bootstrap]\nbuckets = 12",
        "[batch]\nconcurrency_limit = 0",
        "[optimizer]\nparse_policy = \"fuzzy\"",
        "[llm]\nprovider = \"anthropic\"",
    ];

    for toml in cases {
        let result = Config::from_toml_str(toml);
        assert!(
            matches!(result, Err(EngineError::Config(_))),
            "expected config error for {:?}",
            toml
        );
    }
}

#[test]
fn test_missing_file_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = Config::load_from_path(&dir.path().join("absent.toml"));
    assert!(matches!(result, Err(EngineError::Config(_))));
}
