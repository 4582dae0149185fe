//! Structured logging setup
//!
//! Installs a `tracing` subscriber once per process. Console output is the
//! default; JSON lines can be enabled for machine consumption. `RUST_LOG`, when
//! set, takes precedence over the configured level for other crates.
//!
//! ```no_run
//! use demoforge::util::{init_logging, LoggingConfig};
//! use tracing::Level;
//!
//! init_logging(LoggingConfig::with_level(Level::DEBUG));
//! tracing::info!(phase = "coding", "Phase started");
//! ```

use std::env;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_LEVEL_ENV: &str = "DEMOFORGE_LOG_LEVEL";
pub const LOG_JSON_ENV: &str = "DEMOFORGE_LOG_JSON";

static INIT: Once = Once::new();

/// Dependencies whose debug output drowns the workflow's own events
const NOISY_TARGETS: &[&str] = &["genai=warn", "hyper=warn", "hyper_util=warn", "reqwest=warn"];

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: Level,
    /// Emit one JSON object per line instead of pretty console output
    pub use_json: bool,
    pub include_target: bool,
    /// File and line of the call site
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            use_json: false,
            include_target: false,
            include_location: false,
        }
    }
}

impl LoggingConfig {
    pub fn with_level(level: Level) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }

    pub fn json(mut self, use_json: bool) -> Self {
        self.use_json = use_json;
        self
    }

    /// Reads `DEMOFORGE_LOG_LEVEL` and `DEMOFORGE_LOG_JSON`
    pub fn from_env() -> Self {
        let level = env::var(LOG_LEVEL_ENV)
            .ok()
            .and_then(|v| parse_level(&v))
            .unwrap_or(Level::INFO);
        let use_json = env::var(LOG_JSON_ENV)
            .ok()
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(false);

        Self {
            level,
            use_json,
            ..Default::default()
        }
    }
}

/// Case-insensitive level name; `None` for anything unknown
pub fn parse_level(level: &str) -> Option<Level> {
    match level.trim().to_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" | "warning" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}

fn build_filter(level: Level) -> EnvFilter {
    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = format!("demoforge={}", level).parse() {
        filter = filter.add_directive(directive);
    }

    if env::var("RUST_LOG").is_err() {
        for target in NOISY_TARGETS {
            if let Ok(directive) = target.parse() {
                filter = filter.add_directive(directive);
            }
        }
    }
    filter
}

/// Installs the global subscriber; later calls are ignored
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = build_filter(config.level);
        let layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(config.include_target)
            .with_file(config.include_location)
            .with_line_number(config.include_location);

        if config.use_json {
            tracing_subscriber::registry()
                .with(filter)
                .with(layer.json())
                .init();
        } else {
            tracing_subscriber::registry().with(filter).with(layer).init();
        }
    });
}

pub fn init_from_env() {
    init_logging(LoggingConfig::from_env());
}
