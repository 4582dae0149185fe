//! Command handlers; each returns the process exit code

use super::commands::{ClassifyArgs, ConfigArgs, GenerateArgs};
use super::output::OutputFormatter;
use crate::classify::ContentClassifier;
use crate::config::DemoforgeConfig;
use crate::generation::{LlmGenerationPort, TranscriptLogger};
use crate::llm::LLMClient;
use crate::progress::LoggingHandler;
use crate::workflow::{WorkflowEngine, WorkflowState};
use anyhow::{Context, Result};
use std::io::Read;
use std::sync::Arc;
use tracing::{error, info};

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_RUN_FAILED: i32 = 1;
pub const EXIT_CONFIG_ERROR: i32 = 2;

/// Layers `generate` flags over the environment-derived configuration
pub fn apply_overrides(mut config: DemoforgeConfig, args: &GenerateArgs) -> DemoforgeConfig {
    if let Some(provider) = args.backend {
        config.provider = provider;
        config.unknown_provider = None;
    }
    if let Some(ref model) = args.model {
        config.model = model.clone();
    }
    if let Some(timeout) = args.timeout {
        config.request_timeout_secs = timeout;
    }
    if let Some(timeout) = args.generation_timeout {
        config.generation_timeout_secs = Some(timeout);
    }
    if let Some(max_retries) = args.max_retries {
        config.max_retries = max_retries;
    }
    if let Some(ref dir) = args.output_dir {
        config.output_dir = dir.clone();
    }
    if let Some(ref path) = args.transcript {
        config.transcript_log = Some(path.clone());
    }
    config
}

/// Wires the client into a port and engine, then runs one description
pub async fn run_workflow(
    config: &DemoforgeConfig,
    client: Arc<dyn LLMClient>,
    description: &str,
) -> WorkflowState {
    let port = LlmGenerationPort::new(client)
        .with_transcript(TranscriptLogger::new(config.transcript_log.clone()))
        .with_temperature(config.temperature)
        .with_max_tokens(config.max_tokens);

    let engine = WorkflowEngine::new(Arc::new(port), config.workflow_config())
        .with_progress(Arc::new(LoggingHandler));

    engine.run(description).await
}

pub fn exit_code(state: &WorkflowState) -> i32 {
    if state.is_success() {
        EXIT_SUCCESS
    } else {
        EXIT_RUN_FAILED
    }
}

pub async fn handle_generate(args: &GenerateArgs) -> i32 {
    let config = apply_overrides(DemoforgeConfig::default(), args);
    if let Err(e) = config.validate() {
        eprintln!("Configuration error: {}", e);
        return EXIT_CONFIG_ERROR;
    }

    info!(
        provider = config.provider.as_lower_str(),
        model = %config.model,
        max_retries = config.max_retries,
        "Starting demo generation"
    );

    let client = match config.create_client().await {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return EXIT_CONFIG_ERROR;
        }
    };

    let state = run_workflow(&config, client, &args.description).await;

    let formatter = OutputFormatter::new(args.format.into());
    match formatter.format_run(&state) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            error!("Failed to format run: {:#}", e);
            return EXIT_RUN_FAILED;
        }
    }

    exit_code(&state)
}

fn read_input(args: &ClassifyArgs) -> Result<String> {
    match args.file {
        Some(ref path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut input = String::new();
            std::io::stdin()
                .read_to_string(&mut input)
                .context("Failed to read stdin")?;
            Ok(input)
        }
    }
}

pub fn handle_classify(args: &ClassifyArgs) -> i32 {
    let input = match read_input(args) {
        Ok(input) => input,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return EXIT_RUN_FAILED;
        }
    };

    let blocks = ContentClassifier::new().extract(&input);
    match OutputFormatter::new(args.format.into()).format_blocks(&blocks) {
        Ok(output) => {
            println!("{}", output);
            EXIT_SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            EXIT_RUN_FAILED
        }
    }
}

pub fn handle_config(args: &ConfigArgs) -> i32 {
    let config = DemoforgeConfig::default();
    if let Err(e) = config.validate() {
        eprintln!("Configuration error: {}", e);
        return EXIT_CONFIG_ERROR;
    }

    match OutputFormatter::new(args.format.into()).format_config(&config) {
        Ok(output) => {
            println!("{}", output);
            EXIT_SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            EXIT_RUN_FAILED
        }
    }
}
