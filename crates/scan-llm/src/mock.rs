//! Mock completion client for tests: scripted responses, optional delay, no network.

use crate::{CompletionClient, LLMError, Message};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

type Responder = dyn Fn(&[Message]) -> Result<String, LLMError> + Send + Sync;

/// Mock client whose answer is computed by a closure over the request messages.
pub struct MockCompletionClient {
    responder: Box<Responder>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl MockCompletionClient {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&[Message]) -> Result<String, LLMError> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Always answer with `text`.
    pub fn replying(text: impl Into<String>) -> Self {
        let text = text.into();
        Self::new(move |_| Ok(text.clone()))
    }

    /// Always fail with an API error.
    pub fn failing() -> Self {
        Self::new(|_| Err(LLMError::Api("mock failure".to_string())))
    }

    /// Sleep before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of completed or in-flight calls.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl CompletionClient for MockCompletionClient {
    async fn complete_with_messages(&self, messages: &[Message]) -> Result<String, LLMError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        (self.responder)(messages)
    }
}
