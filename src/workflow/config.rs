use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_MAX_RETRIES: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowConfig {
    /// Upper bound on `coding` attempts when validation keeps failing
    pub max_retries: u32,
    /// Engine-level bound on each generation call; `None` leaves it to the client
    pub generation_timeout: Option<Duration>,
    /// Runs are persisted under this directory when set
    pub output_root: Option<PathBuf>,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            generation_timeout: None,
            output_root: None,
        }
    }
}

impl WorkflowConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Values below one are raised to one so `coding` always runs
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    pub fn with_generation_timeout(mut self, timeout: Duration) -> Self {
        self.generation_timeout = Some(timeout);
        self
    }

    pub fn with_output_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.output_root = Some(root.into());
        self
    }
}
