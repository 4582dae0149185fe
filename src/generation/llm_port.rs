use super::port::{Generation, GenerationErrorKind, GenerationPort, PhaseContext};
use super::prompt::PromptBuilder;
use super::transcript::{Exchange, TranscriptLogger};
use crate::llm::{LLMClient, LLMRequest};
use crate::workflow::Stage;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Generation port backed by an injected [`LLMClient`]
pub struct LlmGenerationPort {
    client: Arc<dyn LLMClient>,
    prompts: PromptBuilder,
    transcript: TranscriptLogger,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

impl LlmGenerationPort {
    pub fn new(client: Arc<dyn LLMClient>) -> Self {
        Self {
            client,
            prompts: PromptBuilder::new(),
            transcript: TranscriptLogger::disabled(),
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_transcript(mut self, transcript: TranscriptLogger) -> Self {
        self.transcript = transcript;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

#[async_trait]
impl GenerationPort for LlmGenerationPort {
    async fn generate(&self, phase: Stage, context: &PhaseContext) -> Generation {
        if phase.is_terminal() {
            return Generation::error(
                GenerationErrorKind::MalformedResponse,
                format!("no prompt for terminal stage {}", phase),
            );
        }

        let messages = self.prompts.messages(phase, context);
        let mut request = LLMRequest::new(messages.clone()).for_phase(phase.as_str());
        if let Some(temperature) = self.temperature {
            request = request.with_temperature(temperature);
        }
        if let Some(max_tokens) = self.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }

        debug!(
            phase = %phase,
            attempt = context.attempt,
            client = %self.client.describe(),
            prompt_chars = request.prompt_chars(),
            "Requesting generation"
        );

        let start = Instant::now();
        let result = self.client.complete(request).await;
        let latency_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(response) => {
                if response.is_blank() {
                    warn!(phase = %phase, "Model returned an empty report");
                }
                self.transcript.record(
                    phase.as_str(),
                    context.attempt,
                    &messages,
                    Exchange::Response(&response.content),
                    latency_ms,
                );
                debug!(
                    phase = %phase,
                    chars = response.content.len(),
                    duration_ms = latency_ms,
                    "Generation complete"
                );
                Generation::Text(response.content)
            }
            Err(e) => {
                let detail = e.to_string();
                self.transcript.record(
                    phase.as_str(),
                    context.attempt,
                    &messages,
                    Exchange::Error(&detail),
                    latency_ms,
                );
                warn!(phase = %phase, error = %detail, "Generation failed");
                Generation::from(e)
            }
        }
    }

    fn name(&self) -> &str {
        self.client.name()
    }
}

impl std::fmt::Debug for LlmGenerationPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmGenerationPort")
            .field("client", &self.client.describe())
            .field("transcript", &self.transcript)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{BackendError, MockLLMClient, MockResponse};

    fn context() -> PhaseContext {
        PhaseContext {
            description: "A chat app".to_string(),
            attempt: 1,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_text_response() {
        let client = Arc::new(MockLLMClient::new());
        client.add_response(MockResponse::text("requirements here"));
        let port = LlmGenerationPort::new(client.clone())
            .with_temperature(0.2)
            .with_max_tokens(512);

        let generation = port.generate(Stage::Requirement, &context()).await;

        assert_eq!(generation, Generation::Text("requirements here".to_string()));
        let requests = client.recorded_requests();
        assert_eq!(requests[0].phase.as_deref(), Some("requirement"));
        assert_eq!(requests[0].temperature, Some(0.2));
        assert_eq!(requests[0].max_tokens, Some(512));
        assert!(requests[0].messages[1].content.contains("A chat app"));
    }

    #[tokio::test]
    async fn test_error_is_normalized() {
        let client = Arc::new(MockLLMClient::new());
        client.add_response(MockResponse::error(BackendError::AuthenticationError {
            message: "invalid api key".to_string(),
        }));
        let port = LlmGenerationPort::new(client);

        match port.generate(Stage::Design, &context()).await {
            Generation::Error { kind, detail } => {
                assert_eq!(kind, GenerationErrorKind::Auth);
                assert!(detail.contains("invalid api key"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_terminal_stage_rejected() {
        let port = LlmGenerationPort::new(Arc::new(MockLLMClient::new()));
        assert!(matches!(
            port.generate(Stage::Success, &context()).await,
            Generation::Error { .. }
        ));
    }

    #[test]
    fn test_name_is_client_name() {
        let port = LlmGenerationPort::new(Arc::new(MockLLMClient::with_name("scripted")));
        assert_eq!(port.name(), "scripted");
    }
}
