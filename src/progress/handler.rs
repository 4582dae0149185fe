//! Progress handler trait and events

use serde::Serialize;
use std::fmt;

/// Status carried by a workflow event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    /// Phase started
    Started,
    /// Phase finished and the run advances
    Completed,
    /// Validation failed and `coding` runs again
    Retrying,
    /// Phase or run failed
    Failed,
    /// Run reached `success`
    Succeeded,
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EventStatus::Started => "started",
            EventStatus::Completed => "completed",
            EventStatus::Retrying => "retrying",
            EventStatus::Failed => "failed",
            EventStatus::Succeeded => "succeeded",
        };
        f.write_str(s)
    }
}

/// One entry of the ordered event stream emitted by the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkflowEvent {
    pub phase: String,
    pub status: EventStatus,
    pub message: String,
}

impl WorkflowEvent {
    pub fn new(phase: impl Into<String>, status: EventStatus, message: impl Into<String>) -> Self {
        Self {
            phase: phase.into(),
            status,
            message: message.into(),
        }
    }
}

/// Trait for handling events during a workflow run
pub trait ProgressHandler: Send + Sync {
    /// Called for every event, in emission order
    fn on_event(&self, event: &WorkflowEvent);
}

/// No-op handler that ignores all events
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpHandler;

impl ProgressHandler for NoOpHandler {
    fn on_event(&self, _event: &WorkflowEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingHandler {
        count: Arc<AtomicUsize>,
    }

    impl ProgressHandler for CountingHandler {
        fn on_event(&self, _event: &WorkflowEvent) {
            self.count.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_noop_handler() {
        NoOpHandler.on_event(&WorkflowEvent::new("coding", EventStatus::Started, ""));
    }

    #[test]
    fn test_events_are_delivered() {
        let count = Arc::new(AtomicUsize::new(0));
        let handler = CountingHandler {
            count: count.clone(),
        };

        handler.on_event(&WorkflowEvent::new("requirement", EventStatus::Started, ""));
        handler.on_event(&WorkflowEvent::new("requirement", EventStatus::Completed, "ok"));
        handler.on_event(&WorkflowEvent::new("run", EventStatus::Succeeded, "done"));

        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_event_serialization() {
        let event = WorkflowEvent::new("testing", EventStatus::Retrying, "attempt 1 of 3");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["status"], "retrying");
        assert_eq!(json["phase"], "testing");
    }
}
