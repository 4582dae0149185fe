//! Ordered event stream for workflow runs

mod channel;
mod handler;
mod logging;

pub use channel::ChannelHandler;
pub use handler::{EventStatus, NoOpHandler, ProgressHandler, WorkflowEvent};
pub use logging::LoggingHandler;
