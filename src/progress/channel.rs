//! Forwards events to an async subscriber

use super::{ProgressHandler, WorkflowEvent};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::trace;

/// Sends every event into an unbounded channel
///
/// A dropped receiver is not an error; events are discarded from then on.
#[derive(Debug, Clone)]
pub struct ChannelHandler {
    sender: UnboundedSender<WorkflowEvent>,
}

impl ChannelHandler {
    pub fn new(sender: UnboundedSender<WorkflowEvent>) -> Self {
        Self { sender }
    }

    /// Handler plus the receiving end for a UI to drain
    pub fn channel() -> (Self, UnboundedReceiver<WorkflowEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self::new(sender), receiver)
    }
}

impl ProgressHandler for ChannelHandler {
    fn on_event(&self, event: &WorkflowEvent) {
        if self.sender.send(event.clone()).is_err() {
            trace!(phase = %event.phase, "Event receiver dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::EventStatus;

    #[tokio::test]
    async fn test_channel_preserves_order() {
        let (handler, mut rx) = ChannelHandler::channel();
        handler.on_event(&WorkflowEvent::new("requirement", EventStatus::Started, ""));
        handler.on_event(&WorkflowEvent::new("requirement", EventStatus::Completed, ""));

        assert_eq!(rx.recv().await.unwrap().status, EventStatus::Started);
        assert_eq!(rx.recv().await.unwrap().status, EventStatus::Completed);
    }

    #[test]
    fn test_dropped_receiver_is_ignored() {
        let (handler, rx) = ChannelHandler::channel();
        drop(rx);
        handler.on_event(&WorkflowEvent::new("coding", EventStatus::Failed, "boom"));
    }
}
