use super::error::BackendError;
use super::types::{LLMRequest, LLMResponse};
use async_trait::async_trait;

/// A chat-completion backend.
///
/// Implementations own their transport timeout and map every provider
/// failure onto [`BackendError`]; they never retry on their own.
#[async_trait]
pub trait LLMClient: Send + Sync {
    async fn complete(&self, request: LLMRequest) -> Result<LLMResponse, BackendError>;

    fn name(&self) -> &str;

    fn model(&self) -> Option<&str> {
        None
    }

    /// `name/model` for logs
    fn describe(&self) -> String {
        match self.model() {
            Some(model) => format!("{}/{}", self.name(), model),
            None => self.name().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ChatMessage;
    use std::time::Duration;

    /// Answers with the phase it was asked about
    struct EchoPhase;

    #[async_trait]
    impl LLMClient for EchoPhase {
        async fn complete(&self, request: LLMRequest) -> Result<LLMResponse, BackendError> {
            Ok(LLMResponse::text(
                format!("{} report", request.phase_label()),
                Duration::from_millis(1),
            ))
        }

        fn name(&self) -> &str {
            "echo"
        }
    }

    #[tokio::test]
    async fn test_default_methods() {
        let client = EchoPhase;
        assert!(client.model().is_none());
        assert_eq!(client.describe(), "echo");

        let request = LLMRequest::new(vec![ChatMessage::user("A blog")]).for_phase("design");
        let response = client.complete(request).await.unwrap();
        assert_eq!(response.content, "design report");
    }
}
