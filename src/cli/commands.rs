use crate::config::parse_provider;
use clap::{Parser, Subcommand, ValueEnum};
use genai::adapter::AdapterKind;
use std::path::PathBuf;

/// Staged LLM workflow that turns a one-line description into a runnable demo
#[derive(Parser, Debug)]
#[command(
    name = "demoforge",
    about = "Turn a one-line description into a runnable demo project",
    version,
    author,
    long_about = "demoforge drives a language model through requirement, design, coding, \
                  testing and deployment phases, classifies the code it writes into \
                  frontend, backend, database, test and deployment artifacts, validates \
                  the result and writes a self-contained project directory."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,

    #[arg(long, global = true, help = "Emit logs as JSON lines")]
    pub log_json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Generate a demo project from a description",
        long_about = "Runs every workflow phase against the configured provider and writes \
                      the generated project under the output directory.\n\n\
                      Examples:\n  \
                      demoforge generate \"A todo list with a REST API\"\n  \
                      demoforge generate \"Weather dashboard\" -o out --max-retries 5\n  \
                      demoforge generate \"Chat app\" -b openai -m gpt-4o -f json"
    )]
    Generate(GenerateArgs),

    #[command(
        about = "Classify code blocks in a file or stdin",
        long_about = "Extracts code blocks from free-form text and prints the category and \
                      signals assigned to each.\n\n\
                      Examples:\n  \
                      demoforge classify reply.md\n  \
                      cat reply.md | demoforge classify -f json"
    )]
    Classify(ClassifyArgs),

    #[command(about = "Show the resolved configuration")]
    Config(ConfigArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct GenerateArgs {
    #[arg(value_name = "DESCRIPTION", help = "What the demo should do")]
    pub description: String,

    #[arg(
        short = 'o',
        long,
        value_name = "DIR",
        help = "Directory receiving generated runs"
    )]
    pub output_dir: Option<PathBuf>,

    #[arg(
        short = 'b',
        long,
        value_parser = parse_backend,
        help = "LLM provider (ollama, openai, claude, gemini, grok, groq)"
    )]
    pub backend: Option<AdapterKind>,

    #[arg(short = 'm', long, value_name = "MODEL", help = "Model name")]
    pub model: Option<String>,

    #[arg(long, value_name = "SECONDS", help = "Provider request timeout")]
    pub timeout: Option<u64>,

    #[arg(long, value_name = "SECONDS", help = "Time limit for each phase")]
    pub generation_timeout: Option<u64>,

    #[arg(long, value_name = "N", help = "Coding attempts before giving up")]
    pub max_retries: Option<u32>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,

    #[arg(long, value_name = "FILE", help = "Append every prompt and reply to a JSONL file")]
    pub transcript: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
pub struct ClassifyArgs {
    #[arg(value_name = "FILE", help = "Input file (reads stdin when omitted)")]
    pub file: Option<PathBuf>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct ConfigArgs {
    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}

fn parse_backend(s: &str) -> Result<AdapterKind, String> {
    parse_provider(s).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_args_verify() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn test_default_generate_args() {
        let args = CliArgs::parse_from(["demoforge", "generate", "A todo app"]);
        match args.command {
            Commands::Generate(generate) => {
                assert_eq!(generate.description, "A todo app");
                assert_eq!(generate.format, OutputFormatArg::Human);
                assert!(generate.backend.is_none());
                assert!(generate.model.is_none());
                assert!(generate.output_dir.is_none());
                assert!(generate.max_retries.is_none());
                assert!(generate.transcript.is_none());
            }
            _ => panic!("Expected Generate command"),
        }
    }

    #[test]
    fn test_generate_with_all_options() {
        let args = CliArgs::parse_from([
            "demoforge",
            "generate",
            "Weather dashboard",
            "-o",
            "/tmp/out",
            "-b",
            "claude",
            "-m",
            "claude-sonnet",
            "--timeout",
            "30",
            "--generation-timeout",
            "45",
            "--max-retries",
            "5",
            "-f",
            "json",
            "--transcript",
            "/tmp/log.jsonl",
        ]);
        match args.command {
            Commands::Generate(generate) => {
                assert_eq!(generate.output_dir, Some(PathBuf::from("/tmp/out")));
                assert_eq!(generate.backend, Some(AdapterKind::Anthropic));
                assert_eq!(generate.model.as_deref(), Some("claude-sonnet"));
                assert_eq!(generate.timeout, Some(30));
                assert_eq!(generate.generation_timeout, Some(45));
                assert_eq!(generate.max_retries, Some(5));
                assert_eq!(generate.format, OutputFormatArg::Json);
                assert_eq!(generate.transcript, Some(PathBuf::from("/tmp/log.jsonl")));
            }
            _ => panic!("Expected Generate command"),
        }
    }

    #[test]
    fn test_invalid_backend_rejected() {
        let result = CliArgs::try_parse_from(["demoforge", "generate", "x", "-b", "watson"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_generate_requires_description() {
        assert!(CliArgs::try_parse_from(["demoforge", "generate"]).is_err());
    }

    #[test]
    fn test_classify_stdin_default() {
        let args = CliArgs::parse_from(["demoforge", "classify", "-f", "yaml"]);
        match args.command {
            Commands::Classify(classify) => {
                assert!(classify.file.is_none());
                assert_eq!(classify.format, OutputFormatArg::Yaml);
            }
            _ => panic!("Expected Classify command"),
        }
    }

    #[test]
    fn test_global_flags() {
        let args = CliArgs::parse_from(["demoforge", "config", "--verbose", "--log-json"]);
        assert!(args.verbose);
        assert!(args.log_json);
        assert!(!args.quiet);
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        let result = CliArgs::try_parse_from(["demoforge", "-v", "-q", "config"]);
        assert!(result.is_err());
    }
}
