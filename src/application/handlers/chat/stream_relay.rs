//! StreamRelay - Turns one upstream completion into outbound stream frames.
//!
//! The relay is a lazy stream. Nothing is sent upstream until it is first
//! polled, which lets the HTTP layer commit the response headers before the
//! upstream call starts.
//!
//! ```text
//! Started ──open ok──▶ Streaming ──fragment──▶ Streaming
//!    │                    │  │
//!    │ open failed        │  └─finish / upstream exhausted──▶ {"end":true}
//!    └────────────────────┴──────upstream error─────────────▶ {"error":...}
//! ```
//!
//! Exactly one terminal frame is produced. The upstream stream is dropped as
//! soon as the terminal frame is decided, and dropping the relay (client
//! disconnect) drops the upstream with it.

use futures::stream::{self, Stream, StreamExt};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tracing::Span;

use crate::domain::chat::StreamFrame;
use crate::ports::{AIError, AIProvider, ChunkStream, CompletionRequest};

/// Outbound frame stream for one upstream completion.
pub struct StreamRelay {
    frames: Pin<Box<dyn Stream<Item = StreamFrame> + Send>>,
}

impl StreamRelay {
    /// Prepares a relay for `request`. Log events are emitted under `span`.
    pub fn start(provider: Arc<dyn AIProvider>, request: CompletionRequest, span: Span) -> Self {
        let relay = RelayMachine {
            state: RelayState::Started { provider, request },
            progress: RelayProgress {
                span,
                fragments: 0,
                terminated: false,
            },
        };

        let frames = stream::unfold(relay, |mut relay| async move {
            let frame = relay.next_frame().await?;
            Some((frame, relay))
        });

        Self {
            frames: Box::pin(frames),
        }
    }
}

impl Stream for StreamRelay {
    type Item = StreamFrame;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.frames.poll_next_unpin(cx)
    }
}

enum RelayState {
    Started {
        provider: Arc<dyn AIProvider>,
        request: CompletionRequest,
    },
    Streaming {
        upstream: ChunkStream,
    },
    /// A final chunk carried content; its token went out, the end frame is next.
    Finishing,
    Terminated,
}

struct RelayMachine {
    state: RelayState,
    progress: RelayProgress,
}

impl RelayMachine {
    async fn next_frame(&mut self) -> Option<StreamFrame> {
        loop {
            match std::mem::replace(&mut self.state, RelayState::Terminated) {
                RelayState::Started { provider, request } => {
                    tracing::info!(
                        parent: &self.progress.span,
                        messages = request.messages.len(),
                        "Opening upstream stream"
                    );
                    match provider.stream_complete(request).await {
                        Ok(upstream) => self.state = RelayState::Streaming { upstream },
                        Err(err) => return Some(self.progress.fail(err)),
                    }
                }

                RelayState::Streaming { mut upstream } => {
                    let next = upstream.next().await;
                    match next {
                        Some(Ok(chunk)) => {
                            let is_final = chunk.is_final();
                            if !chunk.delta.is_empty() {
                                self.progress.fragments += 1;
                                self.state = if is_final {
                                    RelayState::Finishing
                                } else {
                                    RelayState::Streaming { upstream }
                                };
                                return Some(StreamFrame::token(chunk.delta));
                            }
                            if is_final {
                                return Some(self.progress.finish());
                            }
                            self.state = RelayState::Streaming { upstream };
                        }
                        Some(Err(err)) => return Some(self.progress.fail(err)),
                        None => return Some(self.progress.finish()),
                    }
                }

                RelayState::Finishing => return Some(self.progress.finish()),

                RelayState::Terminated => return None,
            }
        }
    }
}

/// Bookkeeping that outlives every state, including an abandoned relay.
struct RelayProgress {
    span: Span,
    fragments: usize,
    terminated: bool,
}

impl RelayProgress {
    fn finish(&mut self) -> StreamFrame {
        self.terminated = true;
        tracing::info!(
            parent: &self.span,
            fragments = self.fragments,
            "Stream completed"
        );
        StreamFrame::end()
    }

    fn fail(&mut self, err: AIError) -> StreamFrame {
        self.terminated = true;
        tracing::error!(
            parent: &self.span,
            error = %err,
            fragments = self.fragments,
            "Upstream failed; stream errored"
        );
        StreamFrame::upstream_error(err.to_string())
    }
}

impl Drop for RelayProgress {
    fn drop(&mut self) {
        if !self.terminated {
            tracing::warn!(
                parent: &self.span,
                fragments = self.fragments,
                "Client disconnected before completion; upstream abandoned"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::{MockAIProvider, MockError, MockEvent};
    use crate::domain::chat::Message;
    use futures::FutureExt;

    fn request() -> CompletionRequest {
        CompletionRequest::new("mock/model:free", vec![Message::user("Hi")])
    }

    fn relay(provider: &MockAIProvider) -> StreamRelay {
        StreamRelay::start(Arc::new(provider.clone()), request(), Span::none())
    }

    fn network(message: &str) -> MockError {
        MockError::Network {
            message: message.to_string(),
        }
    }

    #[tokio::test]
    async fn relays_fragments_in_order_then_end() {
        let provider = MockAIProvider::new().with_fragments(["Hel", "lo"]);

        let frames: Vec<StreamFrame> = relay(&provider).collect().await;

        assert_eq!(
            frames,
            vec![
                StreamFrame::token("Hel"),
                StreamFrame::token("lo"),
                StreamFrame::end(),
            ]
        );
    }

    #[tokio::test]
    async fn mid_stream_failure_yields_one_error_frame() {
        let provider = MockAIProvider::new().with_mid_stream_error(["Hel"], network("reset"));

        let frames: Vec<StreamFrame> = relay(&provider).collect().await;

        assert_eq!(
            frames,
            vec![
                StreamFrame::token("Hel"),
                StreamFrame::upstream_error("network error: reset"),
            ]
        );
    }

    #[tokio::test]
    async fn setup_failure_yields_only_an_error_frame() {
        let provider = MockAIProvider::new().with_error(MockError::AuthenticationFailed);

        let frames: Vec<StreamFrame> = relay(&provider).collect().await;

        assert_eq!(frames, vec![StreamFrame::upstream_error("authentication failed")]);
    }

    #[tokio::test]
    async fn empty_fragments_are_not_relayed() {
        let provider = MockAIProvider::new().with_fragments(["", "a", "", "b"]);

        let frames: Vec<StreamFrame> = relay(&provider).collect().await;

        assert_eq!(
            frames,
            vec![StreamFrame::token("a"), StreamFrame::token("b"), StreamFrame::end()]
        );
    }

    #[tokio::test]
    async fn nothing_follows_the_terminal_frame() {
        let provider = MockAIProvider::new().with_events(vec![
            MockEvent::Fragment("a".to_string()),
            MockEvent::Finish,
            MockEvent::Fragment("late".to_string()),
            MockEvent::Fail(network("late failure")),
        ]);

        let frames: Vec<StreamFrame> = relay(&provider).collect().await;

        assert_eq!(frames, vec![StreamFrame::token("a"), StreamFrame::end()]);
    }

    #[tokio::test]
    async fn upstream_ending_without_finish_signal_still_ends() {
        let provider =
            MockAIProvider::new().with_events(vec![MockEvent::Fragment("a".to_string())]);

        let frames: Vec<StreamFrame> = relay(&provider).collect().await;

        assert_eq!(frames, vec![StreamFrame::token("a"), StreamFrame::end()]);
    }

    #[tokio::test]
    async fn exactly_one_terminal_frame() {
        let provider = MockAIProvider::new().with_fragments(["x", "y", "z"]);

        let frames: Vec<StreamFrame> = relay(&provider).collect().await;

        assert_eq!(frames.iter().filter(|f| f.is_terminal()).count(), 1);
        assert!(frames.last().unwrap().is_terminal());
    }

    #[tokio::test]
    async fn upstream_is_not_called_until_polled() {
        let provider = MockAIProvider::new().with_fragments(["a"]);

        let mut relay = relay(&provider);
        assert_eq!(provider.call_count(), 0);

        relay.next().await;
        assert_eq!(provider.call_count(), 1);
        assert_eq!(provider.get_calls()[0], request());
    }

    #[tokio::test]
    async fn upstream_is_released_after_terminal_frame() {
        let provider = MockAIProvider::new().with_fragments(["a"]);
        let mut relay = relay(&provider);

        assert_eq!(relay.next().await, Some(StreamFrame::token("a")));
        assert_eq!(provider.open_streams(), 1);

        assert_eq!(relay.next().await, Some(StreamFrame::end()));
        assert_eq!(provider.open_streams(), 0);
        assert_eq!(relay.next().await, None);
    }

    #[tokio::test]
    async fn dropping_the_relay_abandons_the_upstream() {
        let provider = MockAIProvider::new().with_hanging_stream(["Hel"]);
        let mut relay = relay(&provider);

        assert_eq!(relay.next().await, Some(StreamFrame::token("Hel")));
        assert!(relay.next().now_or_never().is_none());
        assert_eq!(provider.open_streams(), 1);

        drop(relay);
        assert_eq!(provider.open_streams(), 0);
    }
}
