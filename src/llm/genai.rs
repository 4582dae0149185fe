//! Provider client built on the `genai` crate
//!
//! One client talks to one provider and model. Credentials come from the
//! provider's usual environment variables; `DEMOFORGE_API_BASE_URL` points the
//! client at a compatible self-hosted endpoint instead.

use super::client::LLMClient;
use super::error::BackendError;
use super::types::{ChatMessage, LLMRequest, LLMResponse, MessageRole};
use async_trait::async_trait;
use genai::adapter::AdapterKind;
use genai::chat::{ChatMessage as GenAIChatMessage, ChatOptions, ChatRequest as GenAIChatRequest};
use genai::resolver::{AuthData, Endpoint, ServiceTargetResolver};
use genai::{Client, ModelIden, ServiceTarget};
use std::time::{Duration, Instant};
use tracing::{debug, error};

pub const API_BASE_URL_ENV: &str = "DEMOFORGE_API_BASE_URL";

pub struct GenAIClient {
    client: Client,
    model: String,
    provider: AdapterKind,
    /// Hard bound on a single provider round trip
    timeout: Duration,
}

impl GenAIClient {
    /// Fails only on an empty model name; unreachable providers surface on
    /// the first request.
    pub async fn new(
        provider: AdapterKind,
        model: String,
        timeout: Duration,
    ) -> Result<Self, BackendError> {
        if model.trim().is_empty() {
            return Err(BackendError::ConfigurationError {
                message: "model name cannot be empty".to_string(),
            });
        }

        let client = match std::env::var(API_BASE_URL_ENV) {
            Ok(endpoint_url) => {
                debug!(
                    provider = provider.as_lower_str(),
                    endpoint = %endpoint_url,
                    "Using custom provider endpoint"
                );
                Client::builder()
                    .with_service_target_resolver(Self::fixed_endpoint(
                        provider,
                        model.clone(),
                        endpoint_url,
                    ))
                    .build()
            }
            Err(_) => Client::default(),
        };

        debug!(
            provider = provider.as_lower_str(),
            model = %model,
            timeout_secs = timeout.as_secs(),
            "Created provider client"
        );

        Ok(Self {
            client,
            model,
            provider,
            timeout,
        })
    }

    fn fixed_endpoint(provider: AdapterKind, model: String, url: String) -> ServiceTargetResolver {
        ServiceTargetResolver::from_resolver_fn(
            move |_target: ServiceTarget| -> Result<ServiceTarget, genai::resolver::Error> {
                let auth = match provider.default_key_env_name() {
                    Some(key_env) => AuthData::from_env(key_env),
                    None => AuthData::from_single(""),
                };
                Ok(ServiceTarget {
                    endpoint: Endpoint::from_owned(url.clone()),
                    auth,
                    model: ModelIden::new(provider, &model),
                })
            },
        )
    }

    fn convert_message(msg: &ChatMessage) -> GenAIChatMessage {
        match msg.role {
            MessageRole::System => GenAIChatMessage::system(&msg.content),
            MessageRole::User => GenAIChatMessage::user(&msg.content),
            MessageRole::Assistant => GenAIChatMessage::assistant(&msg.content),
        }
    }
}

#[async_trait]
impl LLMClient for GenAIClient {
    async fn complete(&self, request: LLMRequest) -> Result<LLMResponse, BackendError> {
        let start = Instant::now();
        let provider = self.provider.as_lower_str();

        let messages: Vec<GenAIChatMessage> =
            request.messages.iter().map(Self::convert_message).collect();

        let mut options = ChatOptions::default();
        if let Some(temp) = request.temperature {
            options = options.with_temperature(temp as f64);
        }
        if let Some(max_tokens) = request.max_tokens {
            options = options.with_max_tokens(max_tokens);
        }

        debug!(
            provider,
            model = %self.model,
            phase = request.phase_label(),
            prompt_chars = request.prompt_chars(),
            "Sending completion request"
        );

        let call = self
            .client
            .exec_chat(&self.model, GenAIChatRequest::new(messages), Some(&options));
        let response = match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(resp)) => resp,
            Ok(Err(e)) => {
                error!(provider, phase = request.phase_label(), error = %e, "Provider call failed");
                return Err(BackendError::from_provider_message(format!(
                    "{} request failed: {}",
                    provider, e
                )));
            }
            Err(_) => {
                error!(
                    provider,
                    phase = request.phase_label(),
                    timeout_secs = self.timeout.as_secs(),
                    "Provider call timed out"
                );
                return Err(BackendError::TimeoutError {
                    seconds: self.timeout.as_secs(),
                });
            }
        };

        let content = response
            .first_text()
            .map(str::to_string)
            .ok_or_else(|| BackendError::InvalidResponse {
                message: format!("{} returned no text content", provider),
                raw_response: None,
            })?;

        Ok(LLMResponse::text(content, start.elapsed()).with_model(self.model.clone()))
    }

    fn name(&self) -> &str {
        self.provider.as_lower_str()
    }

    fn model(&self) -> Option<&str> {
        Some(&self.model)
    }
}

impl std::fmt::Debug for GenAIClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenAIClient")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_genai_client_creation() {
        let client = GenAIClient::new(
            AdapterKind::Ollama,
            "qwen2.5-coder:7b".to_string(),
            Duration::from_secs(30),
        )
        .await
        .unwrap();

        assert_eq!(client.name(), "ollama");
        assert_eq!(client.describe(), "ollama/qwen2.5-coder:7b");
    }

    #[tokio::test]
    async fn test_genai_client_rejects_empty_model() {
        let result = GenAIClient::new(AdapterKind::Ollama, "  ".to_string(), Duration::from_secs(5)).await;
        assert!(matches!(
            result,
            Err(BackendError::ConfigurationError { .. })
        ));
    }

    #[test]
    fn test_debug_impl() {
        fn assert_debug<T: std::fmt::Debug>() {}
        assert_debug::<GenAIClient>();
    }
}
