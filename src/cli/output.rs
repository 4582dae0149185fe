//! Output formatting for command results
//!
//! Every command result can be rendered as JSON, YAML or human-readable text.
//!
//! ```ignore
//! use demoforge::cli::output::{OutputFormat, OutputFormatter};
//!
//! let formatter = OutputFormatter::new(OutputFormat::Json);
//! println!("{}", formatter.format_run(&state)?);
//! ```

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::classify::ExtractedBlock;
use crate::config::DemoforgeConfig;
use crate::workflow::{Stage, WorkflowError, WorkflowState};

const RULE: &str = "\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}";

/// Lines of a block shown in human output before truncating
const PREVIEW_LINES: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON format (machine-readable)
    Json,
    /// YAML format
    Yaml,
    /// Human-readable formatted text
    Human,
}

/// Condensed view of a finished run; file contents stay on disk
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: String,
    pub status: Stage,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
    pub coding_attempts: u32,
    pub phases: Vec<Stage>,
    pub files: Vec<String>,
    pub errors: Vec<WorkflowError>,
}

impl From<&WorkflowState> for RunSummary {
    fn from(state: &WorkflowState) -> Self {
        Self {
            run_id: state.run_id.clone(),
            status: state.stage,
            description: state.description.clone(),
            output_dir: state.output_dir.clone(),
            coding_attempts: state.retry_count(Stage::Coding),
            phases: state.reports.keys().copied().collect(),
            files: state.files.paths(),
            errors: state.errors.clone(),
        }
    }
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format_run(&self, state: &WorkflowState) -> Result<String> {
        let summary = RunSummary::from(state);
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(&summary).context("Failed to serialize run to JSON")
            }
            OutputFormat::Yaml => {
                serde_yaml::to_string(&summary).context("Failed to serialize run to YAML")
            }
            OutputFormat::Human => Ok(self.format_run_human(&summary)),
        }
    }

    pub fn format_blocks(&self, blocks: &[ExtractedBlock]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(blocks).context("Failed to serialize blocks to JSON")
            }
            OutputFormat::Yaml => {
                serde_yaml::to_string(blocks).context("Failed to serialize blocks to YAML")
            }
            OutputFormat::Human => Ok(self.format_blocks_human(blocks)),
        }
    }

    pub fn format_config(&self, config: &DemoforgeConfig) -> Result<String> {
        // Sorted so repeated invocations print identically
        let map: BTreeMap<String, String> = config.to_display_map().into_iter().collect();
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(&map).context("Failed to serialize config to JSON")
            }
            OutputFormat::Yaml => {
                serde_yaml::to_string(&map).context("Failed to serialize config to YAML")
            }
            OutputFormat::Human => Ok(config.to_string()),
        }
    }

    fn format_run_human(&self, summary: &RunSummary) -> String {
        let mut output = String::new();

        if summary.status == Stage::Success {
            output.push_str("\u{2713} Demo Generated\n");
        } else {
            output.push_str("\u{2717} Demo Generation Failed\n");
        }
        output.push_str(RULE);
        output.push_str("\n\n");

        output.push_str(&format!("Run:          {}\n", summary.run_id));
        output.push_str(&format!("Description:  {}\n", summary.description));
        output.push_str(&format!("Status:       {}\n", summary.status));
        output.push_str(&format!("Coding Runs:  {}\n", summary.coding_attempts));
        if let Some(ref dir) = summary.output_dir {
            output.push_str(&format!("Output:       {}\n", dir.display()));
        }
        output.push('\n');

        if summary.files.is_empty() {
            output.push_str("Files: (none)\n");
        } else {
            output.push_str("Files:\n");
            for (i, path) in summary.files.iter().enumerate() {
                let connector = if i + 1 == summary.files.len() {
                    "\u{2514}\u{2500}"
                } else {
                    "\u{251C}\u{2500}"
                };
                output.push_str(&format!("{} {}\n", connector, path));
            }
        }

        if !summary.errors.is_empty() {
            output.push_str("\n\u{26A0} Errors:\n");
            for error in &summary.errors {
                output.push_str(&format!("  - {}\n", error));
            }
        }

        output
    }

    fn format_blocks_human(&self, blocks: &[ExtractedBlock]) -> String {
        if blocks.is_empty() {
            return "No code blocks found\n".to_string();
        }

        let mut output = format!("Found {} code block(s)\n", blocks.len());
        output.push_str(RULE);
        output.push('\n');

        for (i, block) in blocks.iter().enumerate() {
            output.push_str(&format!("\n[{}] {}", i + 1, block.category));
            if let Some(ref language) = block.language {
                output.push_str(&format!(" ({})", language));
            }
            output.push('\n');

            let signals: Vec<String> = block.signals.iter().map(|s| s.to_string()).collect();
            if !signals.is_empty() {
                output.push_str(&format!("Signals: {}\n", signals.join(", ")));
            }

            let total = block.text.lines().count();
            for line in block.text.lines().take(PREVIEW_LINES) {
                output.push_str(&format!("  \u{2502} {}\n", line));
            }
            if total > PREVIEW_LINES {
                output.push_str(&format!("  \u{2502} ... ({} more lines)\n", total - PREVIEW_LINES));
            }
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::ContentClassifier;
    use crate::workflow::WorkflowConfig;

    fn failed_state() -> WorkflowState {
        let mut state = WorkflowState::new("A todo app", WorkflowConfig::default());
        state.stage = Stage::Failed;
        state.reports.insert(Stage::Requirement, "needs".to_string());
        state.errors.push(WorkflowError::Exhausted { attempts: 3 });
        state.retries.insert(Stage::Coding, 3);
        state
    }

    #[test]
    fn test_json_run_format() {
        let formatter = OutputFormatter::new(OutputFormat::Json);
        let output = formatter.format_run(&failed_state()).unwrap();

        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["status"], "failed");
        assert_eq!(value["coding_attempts"], 3);
        assert_eq!(value["errors"][0]["type"], "exhausted");
        assert_eq!(value["phases"][0], "requirement");
        assert!(value.get("output_dir").is_none());
    }

    #[test]
    fn test_yaml_run_format() {
        let formatter = OutputFormatter::new(OutputFormat::Yaml);
        let output = formatter.format_run(&failed_state()).unwrap();

        assert!(output.contains("status: failed"));
        assert!(output.contains("description: A todo app"));
    }

    #[test]
    fn test_human_run_format() {
        let formatter = OutputFormatter::new(OutputFormat::Human);
        let output = formatter.format_run(&failed_state()).unwrap();

        assert!(output.contains("Demo Generation Failed"));
        assert!(output.contains("Files: (none)"));
        assert!(output.contains("Workflow exhausted after 3 coding attempts"));
    }

    #[test]
    fn test_blocks_formats() {
        let blocks = ContentClassifier::new()
            .extract("```sql\nCREATE TABLE users (id INTEGER PRIMARY KEY);\n```");
        assert_eq!(blocks.len(), 1);

        let json = OutputFormatter::new(OutputFormat::Json)
            .format_blocks(&blocks)
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["category"], "database");

        let human = OutputFormatter::new(OutputFormat::Human)
            .format_blocks(&blocks)
            .unwrap();
        assert!(human.contains("Found 1 code block(s)"));
        assert!(human.contains("[1] database (sql)"));
        assert!(human.contains("CREATE TABLE users"));
    }

    #[test]
    fn test_empty_blocks_human() {
        let output = OutputFormatter::new(OutputFormat::Human)
            .format_blocks(&[])
            .unwrap();
        assert_eq!(output, "No code blocks found\n");
    }
}
