//! Scripted client for driving the workflow without a provider

use super::client::LLMClient;
use super::error::BackendError;
use super::types::{LLMRequest, LLMResponse};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

const MOCK_MODEL: &str = "mock-model";

#[derive(Debug, Clone)]
pub struct MockResponse {
    pub content: String,
    pub error: Option<BackendError>,
    /// Simulated provider latency
    pub delay: Option<Duration>,
}

impl MockResponse {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            error: None,
            delay: None,
        }
    }

    pub fn error(error: BackendError) -> Self {
        Self {
            content: String::new(),
            error: Some(error),
            delay: None,
        }
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[derive(Default)]
struct Script {
    /// Answers reserved for requests labelled with a given phase
    by_phase: HashMap<String, VecDeque<MockResponse>>,
    queue: VecDeque<MockResponse>,
    fallback: Option<MockResponse>,
    requests: Vec<LLMRequest>,
}

impl Script {
    fn next_for(&mut self, request: &LLMRequest) -> Option<MockResponse> {
        request
            .phase
            .as_ref()
            .and_then(|phase| self.by_phase.get_mut(phase))
            .and_then(VecDeque::pop_front)
            .or_else(|| self.queue.pop_front())
            .or_else(|| self.fallback.clone())
    }
}

/// Replays scripted replies.
///
/// A request labelled with a phase first consumes that phase's queue, then the
/// shared queue, then the fallback. With nothing left the call fails.
pub struct MockLLMClient {
    script: Mutex<Script>,
    name: String,
}

impl MockLLMClient {
    pub fn new() -> Self {
        Self::with_name("MockLLM")
    }

    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            script: Mutex::new(Script::default()),
            name: name.into(),
        }
    }

    /// Reply used whenever every queue is empty
    pub fn with_fallback(self, response: MockResponse) -> Self {
        if let Ok(mut script) = self.script.lock() {
            script.fallback = Some(response);
        }
        self
    }

    pub fn add_response(&self, response: MockResponse) {
        self.add_responses([response]);
    }

    pub fn add_responses(&self, responses: impl IntoIterator<Item = MockResponse>) {
        if let Ok(mut script) = self.script.lock() {
            script.queue.extend(responses);
        }
    }

    pub fn add_phase_response(&self, phase: impl Into<String>, response: MockResponse) {
        if let Ok(mut script) = self.script.lock() {
            script
                .by_phase
                .entry(phase.into())
                .or_default()
                .push_back(response);
        }
    }

    /// Queued replies not yet consumed, fallback excluded
    pub fn remaining_responses(&self) -> usize {
        self.script
            .lock()
            .map(|s| s.queue.len() + s.by_phase.values().map(VecDeque::len).sum::<usize>())
            .unwrap_or(0)
    }

    /// Requests received so far, oldest first
    pub fn recorded_requests(&self) -> Vec<LLMRequest> {
        self.script
            .lock()
            .map(|s| s.requests.clone())
            .unwrap_or_default()
    }

    pub fn requests_for(&self, phase: &str) -> usize {
        self.script
            .lock()
            .map(|s| {
                s.requests
                    .iter()
                    .filter(|r| r.phase.as_deref() == Some(phase))
                    .count()
            })
            .unwrap_or(0)
    }
}

impl Default for MockLLMClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LLMClient for MockLLMClient {
    async fn complete(&self, request: LLMRequest) -> Result<LLMResponse, BackendError> {
        let phase = request.phase_label().to_string();
        // The lock must not be held across the simulated delay
        let next = match self.script.lock() {
            Ok(mut script) => {
                let next = script.next_for(&request);
                script.requests.push(request);
                next
            }
            Err(_) => None,
        };

        let response = next.ok_or_else(|| BackendError::Other {
            message: format!("MockLLMClient: no scripted reply for phase {}", phase),
        })?;

        if let Some(delay) = response.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(error) = response.error {
            return Err(error);
        }

        Ok(LLMResponse::text(
            response.content,
            response.delay.unwrap_or(Duration::from_millis(1)),
        )
        .with_model(MOCK_MODEL))
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn model(&self) -> Option<&str> {
        Some(MOCK_MODEL)
    }
}

impl std::fmt::Debug for MockLLMClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockLLMClient")
            .field("name", &self.name)
            .field("remaining_responses", &self.remaining_responses())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ChatMessage;

    fn phase_request(phase: &str) -> LLMRequest {
        LLMRequest::new(vec![ChatMessage::user("A todo app")]).for_phase(phase)
    }

    #[tokio::test]
    async fn test_queue_replays_in_order() {
        let client = MockLLMClient::new();
        client.add_responses([MockResponse::text("first"), MockResponse::text("second")]);

        let r1 = client.complete(phase_request("requirement")).await.unwrap();
        assert_eq!(r1.content, "first");
        assert_eq!(r1.model.as_deref(), Some(MOCK_MODEL));
        assert_eq!(client.remaining_responses(), 1);

        let r2 = client.complete(phase_request("design")).await.unwrap();
        assert_eq!(r2.content, "second");
    }

    #[tokio::test]
    async fn test_phase_queue_takes_precedence() {
        let client = MockLLMClient::new();
        client.add_response(MockResponse::text("shared"));
        client.add_phase_response("coding", MockResponse::text("code"));

        let coding = client.complete(phase_request("coding")).await.unwrap();
        assert_eq!(coding.content, "code");

        let testing = client.complete(phase_request("testing")).await.unwrap();
        assert_eq!(testing.content, "shared");
        assert_eq!(client.requests_for("coding"), 1);
    }

    #[tokio::test]
    async fn test_scripted_error() {
        let client = MockLLMClient::new();
        client.add_response(MockResponse::error(BackendError::TimeoutError { seconds: 30 }));

        let result = client.complete(phase_request("design")).await;
        assert!(matches!(result, Err(BackendError::TimeoutError { seconds: 30 })));
    }

    #[tokio::test]
    async fn test_exhausted_script_fails() {
        let client = MockLLMClient::new();
        let err = client.complete(phase_request("testing")).await.unwrap_err();
        assert!(err.to_string().contains("testing"));
        assert_eq!(client.recorded_requests().len(), 1);
    }

    #[tokio::test]
    async fn test_fallback_never_runs_out() {
        let client = MockLLMClient::new().with_fallback(MockResponse::text("same"));
        for _ in 0..4 {
            let response = client.complete(phase_request("coding")).await.unwrap();
            assert_eq!(response.content, "same");
        }
        assert_eq!(client.remaining_responses(), 0);
    }

    #[tokio::test]
    async fn test_delay_is_reported_as_latency() {
        let client = MockLLMClient::new();
        client.add_response(MockResponse::text("slow").after(Duration::from_millis(20)));

        let response = client.complete(phase_request("design")).await.unwrap();
        assert_eq!(response.latency, Duration::from_millis(20));
    }

    #[test]
    fn test_describe() {
        let client = MockLLMClient::with_name("scripted");
        assert_eq!(client.describe(), "scripted/mock-model");
    }
}
