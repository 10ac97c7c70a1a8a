//! Mock AI Provider for testing.
//!
//! Provides a scripted implementation of the AIProvider port, allowing tests
//! to run without calling a real upstream.
//!
//! # Features
//!
//! - Scripted fragment sequences
//! - Error injection at setup or mid-stream
//! - Streams that never finish, for disconnect testing
//! - Call tracking and open-stream tracking for verification
//!
//! # Example
//!
//! ```ignore
//! let provider = MockAIProvider::new()
//!     .with_fragments(["Hel", "lo"])
//!     .with_mid_stream_error(["Hel"], MockError::Network { message: "reset".into() });
//!
//! let mut stream = provider.stream_complete(request).await?;
//! ```

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::ports::{
    AIError, AIProvider, ChunkStream, CompletionRequest, FinishReason, ProviderInfo, StreamChunk,
};

/// Mock AI provider for testing.
#[derive(Debug, Clone)]
pub struct MockAIProvider {
    /// Scripted responses (consumed in order).
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    /// Provider info to return.
    info: ProviderInfo,
    /// Call history for verification.
    calls: Arc<Mutex<Vec<CompletionRequest>>>,
    /// Streams handed out and not yet dropped.
    open_streams: Arc<AtomicUsize>,
}

/// A scripted mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Stream the given events in order.
    Stream(Vec<MockEvent>),
    /// Fail before any stream is returned.
    Error(MockError),
}

/// One scripted stream event.
#[derive(Debug, Clone)]
pub enum MockEvent {
    /// A text fragment.
    Fragment(String),
    /// The completion signal.
    Finish,
    /// A mid-stream failure.
    Fail(MockError),
    /// Stop producing items without ever ending.
    Hang,
}

/// Mock error types for testing error handling.
#[derive(Debug, Clone)]
pub enum MockError {
    /// Simulate rate limiting.
    RateLimited { retry_after_secs: u32 },
    /// Simulate provider unavailable.
    Unavailable { message: String },
    /// Simulate authentication failure.
    AuthenticationFailed,
    /// Simulate network error.
    Network { message: String },
    /// Simulate timeout.
    Timeout { timeout_secs: u32 },
}

impl From<MockError> for AIError {
    fn from(err: MockError) -> Self {
        match err {
            MockError::RateLimited { retry_after_secs } => AIError::rate_limited(retry_after_secs),
            MockError::Unavailable { message } => AIError::unavailable(message),
            MockError::AuthenticationFailed => AIError::AuthenticationFailed,
            MockError::Network { message } => AIError::network(message),
            MockError::Timeout { timeout_secs } => AIError::Timeout { timeout_secs },
        }
    }
}

impl Default for MockAIProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAIProvider {
    /// Creates a new mock provider with default settings.
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            info: ProviderInfo::new("mock", "mock://upstream"),
            calls: Arc::new(Mutex::new(Vec::new())),
            open_streams: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Queues a stream of fragments followed by the completion signal.
    pub fn with_fragments<I, S>(self, fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut events: Vec<MockEvent> = fragments
            .into_iter()
            .map(|f| MockEvent::Fragment(f.into()))
            .collect();
        events.push(MockEvent::Finish);
        self.with_events(events)
    }

    /// Queues a stream of fragments followed by a failure.
    pub fn with_mid_stream_error<I, S>(self, fragments: I, error: MockError) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut events: Vec<MockEvent> = fragments
            .into_iter()
            .map(|f| MockEvent::Fragment(f.into()))
            .collect();
        events.push(MockEvent::Fail(error));
        self.with_events(events)
    }

    /// Queues a stream of fragments that then stalls forever.
    pub fn with_hanging_stream<I, S>(self, fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut events: Vec<MockEvent> = fragments
            .into_iter()
            .map(|f| MockEvent::Fragment(f.into()))
            .collect();
        events.push(MockEvent::Hang);
        self.with_events(events)
    }

    /// Queues an arbitrary event script.
    pub fn with_events(self, events: Vec<MockEvent>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(MockResponse::Stream(events));
        self
    }

    /// Queues a setup failure.
    pub fn with_error(self, error: MockError) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(MockResponse::Error(error));
        self
    }

    /// Sets the provider info.
    pub fn with_provider_info(mut self, info: ProviderInfo) -> Self {
        self.info = info;
        self
    }

    /// Returns the number of calls made to this provider.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Returns all recorded calls.
    pub fn get_calls(&self) -> Vec<CompletionRequest> {
        self.calls.lock().unwrap().clone()
    }

    /// Returns the number of streams handed out and not yet dropped.
    pub fn open_streams(&self) -> usize {
        self.open_streams.load(Ordering::SeqCst)
    }

    /// Gets the next response or a default.
    fn next_response(&self) -> MockResponse {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                MockResponse::Stream(vec![
                    MockEvent::Fragment("Mock ".to_string()),
                    MockEvent::Fragment("response".to_string()),
                    MockEvent::Finish,
                ])
            })
    }
}

/// Decrements the open-stream count when the stream is dropped.
struct OpenStreamGuard(Arc<AtomicUsize>);

impl OpenStreamGuard {
    fn open(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(counter))
    }
}

impl Drop for OpenStreamGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl AIProvider for MockAIProvider {
    async fn stream_complete(&self, request: CompletionRequest) -> Result<ChunkStream, AIError> {
        self.calls.lock().unwrap().push(request);

        let events = match self.next_response() {
            MockResponse::Stream(events) => events,
            MockResponse::Error(err) => return Err(err.into()),
        };

        let mut items = Vec::new();
        let mut hang = false;
        for event in events {
            match event {
                MockEvent::Fragment(text) => items.push(Ok(StreamChunk::content(text))),
                MockEvent::Finish => {
                    items.push(Ok(StreamChunk::final_chunk("", FinishReason::Stop)))
                }
                MockEvent::Fail(err) => items.push(Err(err.into())),
                MockEvent::Hang => {
                    hang = true;
                    break;
                }
            }
        }

        let tail: stream::BoxStream<'static, Result<StreamChunk, AIError>> = if hang {
            stream::pending().boxed()
        } else {
            stream::empty().boxed()
        };

        // Held by the outermost adapter; `chain` drops its first half early.
        let guard = OpenStreamGuard::open(&self.open_streams);
        let scripted = stream::iter(items).chain(tail).map(move |item| {
            let _open = &guard;
            item
        });

        Ok(Box::pin(scripted))
    }

    fn provider_info(&self) -> ProviderInfo {
        self.info.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chat::Message;
    use futures::FutureExt;

    fn test_request() -> CompletionRequest {
        CompletionRequest::new("mock/model:free", vec![Message::user("Hello")])
    }

    async fn collect(provider: &MockAIProvider) -> Vec<Result<StreamChunk, AIError>> {
        provider
            .stream_complete(test_request())
            .await
            .unwrap()
            .collect()
            .await
    }

    #[tokio::test]
    async fn streams_fragments_then_final_chunk() {
        let provider = MockAIProvider::new().with_fragments(["Hel", "lo"]);

        let chunks = collect(&provider).await;

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0], Ok(StreamChunk::content("Hel")));
        assert_eq!(chunks[1], Ok(StreamChunk::content("lo")));
        assert!(chunks[2].as_ref().unwrap().is_final());
    }

    #[tokio::test]
    async fn returns_responses_in_order_then_default() {
        let provider = MockAIProvider::new()
            .with_fragments(["First"])
            .with_fragments(["Second"]);

        assert_eq!(collect(&provider).await[0], Ok(StreamChunk::content("First")));
        assert_eq!(collect(&provider).await[0], Ok(StreamChunk::content("Second")));
        assert_eq!(collect(&provider).await[0], Ok(StreamChunk::content("Mock ")));
    }

    #[tokio::test]
    async fn setup_error_is_returned_directly() {
        let provider = MockAIProvider::new().with_error(MockError::AuthenticationFailed);

        let result = provider.stream_complete(test_request()).await;

        assert!(matches!(result, Err(AIError::AuthenticationFailed)));
    }

    #[tokio::test]
    async fn mid_stream_error_follows_fragments() {
        let provider = MockAIProvider::new().with_mid_stream_error(
            ["Hel"],
            MockError::Network {
                message: "reset".to_string(),
            },
        );

        let chunks = collect(&provider).await;

        assert_eq!(chunks[0], Ok(StreamChunk::content("Hel")));
        assert_eq!(chunks[1], Err(AIError::network("reset")));
    }

    #[tokio::test]
    async fn hanging_stream_never_ends() {
        let provider = MockAIProvider::new().with_hanging_stream(["Hel"]);
        let mut stream = provider.stream_complete(test_request()).await.unwrap();

        assert_eq!(stream.next().await, Some(Ok(StreamChunk::content("Hel"))));
        assert!(stream.next().now_or_never().is_none());
    }

    #[tokio::test]
    async fn tracks_calls_and_open_streams() {
        let provider = MockAIProvider::new().with_hanging_stream(["Hel"]);

        let stream = provider.stream_complete(test_request()).await.unwrap();
        assert_eq!(provider.call_count(), 1);
        assert_eq!(provider.get_calls()[0].model, "mock/model:free");
        assert_eq!(provider.open_streams(), 1);

        drop(stream);
        assert_eq!(provider.open_streams(), 0);
    }

    #[tokio::test]
    async fn hanging_stream_stays_open_after_scripted_items() {
        let provider = MockAIProvider::new().with_hanging_stream(["Hel"]);
        let mut stream = provider.stream_complete(test_request()).await.unwrap();

        assert_eq!(stream.next().await, Some(Ok(StreamChunk::content("Hel"))));
        assert!(stream.next().now_or_never().is_none());
        assert_eq!(provider.open_streams(), 1);

        drop(stream);
        assert_eq!(provider.open_streams(), 0);
    }

    #[tokio::test]
    async fn finished_stream_releases_when_dropped() {
        let provider = MockAIProvider::new().with_fragments(["a"]);
        let chunks = collect(&provider).await;

        assert_eq!(chunks.len(), 2);
        assert_eq!(provider.open_streams(), 0);
    }

    #[test]
    fn mock_error_converts_to_ai_error() {
        let err: AIError = MockError::RateLimited {
            retry_after_secs: 60,
        }
        .into();
        assert!(matches!(err, AIError::RateLimited { retry_after_secs: 60 }));

        let err: AIError = MockError::Timeout { timeout_secs: 30 }.into();
        assert!(matches!(err, AIError::Timeout { timeout_secs: 30 }));
    }
}
