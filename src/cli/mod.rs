pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{ClassifyArgs, CliArgs, Commands, ConfigArgs, GenerateArgs, OutputFormatArg};
pub use handlers::{EXIT_CONFIG_ERROR, EXIT_RUN_FAILED, EXIT_SUCCESS};
pub use output::{OutputFormat, OutputFormatter, RunSummary};
