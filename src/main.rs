use demoforge::cli::commands::{CliArgs, Commands};
use demoforge::cli::handlers::{handle_classify, handle_config, handle_generate};
use demoforge::util::{init_logging, parse_level, LoggingConfig};
use demoforge::VERSION;

use clap::Parser;
use tracing::{debug, Level};

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();
    init_logging_from_args(&args);

    debug!("demoforge v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match &args.command {
        Commands::Generate(generate_args) => handle_generate(generate_args).await,
        Commands::Classify(classify_args) => handle_classify(classify_args),
        Commands::Config(config_args) => handle_config(config_args),
    };

    std::process::exit(exit_code);
}

/// `--log-level` beats `-v`/`-q`, which beat the environment
fn init_logging_from_args(args: &CliArgs) {
    let mut config = LoggingConfig::from_env();

    if let Some(ref level_str) = args.log_level {
        match parse_level(level_str) {
            Some(level) => config.level = level,
            None => {
                eprintln!(
                    "Invalid log level '{}', defaulting to INFO. Valid levels: trace, debug, info, warn, error",
                    level_str
                );
                config.level = Level::INFO;
            }
        }
    } else if args.verbose {
        config.level = Level::DEBUG;
    } else if args.quiet {
        config.level = Level::ERROR;
    }

    if args.log_json {
        config.use_json = true;
    }

    init_logging(config);
}
