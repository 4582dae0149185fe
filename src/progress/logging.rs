//! Logging-based progress handler

use super::{EventStatus, ProgressHandler, WorkflowEvent};
use tracing::{debug, error, info, warn};

/// Handler that logs workflow events using tracing
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHandler;

impl ProgressHandler for LoggingHandler {
    fn on_event(&self, event: &WorkflowEvent) {
        let WorkflowEvent {
            phase,
            status,
            message,
        } = event;

        match status {
            EventStatus::Started => {
                info!(phase = %phase, "Starting phase");
            }
            EventStatus::Completed => {
                if message.is_empty() {
                    info!(phase = %phase, "Phase complete");
                } else {
                    info!(phase = %phase, detail = %message, "Phase complete");
                }
            }
            EventStatus::Retrying => {
                warn!(phase = %phase, detail = %message, "Validation failed, retrying");
            }
            EventStatus::Failed => {
                error!(phase = %phase, error = %message, "Phase failed");
            }
            EventStatus::Succeeded => {
                info!(summary = %message, "Workflow complete");
            }
        }
        debug!(phase = %phase, status = %status, "Workflow event");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_all_statuses() {
        let handler = LoggingHandler;
        for status in [
            EventStatus::Started,
            EventStatus::Completed,
            EventStatus::Retrying,
            EventStatus::Failed,
            EventStatus::Succeeded,
        ] {
            handler.on_event(&WorkflowEvent::new("coding", status, "message"));
        }
        handler.on_event(&WorkflowEvent::new("design", EventStatus::Completed, ""));
    }
}
