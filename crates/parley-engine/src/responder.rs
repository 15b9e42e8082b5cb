//! Response producers.
//!
//! A [`Responder`] turns a prompt into either a single [`Response`] or an
//! ordered stream of [`ResponseChunk`]s delivered through a callback. Streams
//! are controlled through a [`StreamHandle`], which is both the cancellation
//! capability and the explicit completion signal.
//!
//! # Cancellation
//!
//! Fragment delivery and cancellation are serialized through a delivery
//! gate: once [`StreamHandle::cancel`] returns, the callback is never invoked
//! again for that stream. A callback that is already running is not
//! interrupted; `cancel` waits for it to return. For the same reason the
//! callback must not cancel its own stream.

use async_trait::async_trait;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::ResponderConfig;

/// One fragment of a streamed response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseChunk {
    /// Position of the fragment within its stream, starting at 0.
    pub index: usize,
    /// Fragment text.
    pub text: String,
}

/// Terminal status of a non-streamed response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseStatus {
    Completed,
    Error,
}

/// A fully resolved response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Response text, or a description of the failure.
    pub content: String,
    /// Whether the response completed.
    pub status: ResponseStatus,
}

impl Response {
    /// A successful response.
    pub fn completed(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            status: ResponseStatus::Completed,
        }
    }

    /// A failed response.
    pub fn error(reason: impl Into<String>) -> Self {
        Self {
            content: reason.into(),
            status: ResponseStatus::Error,
        }
    }

    /// Whether the response failed.
    pub fn is_error(&self) -> bool {
        self.status == ResponseStatus::Error
    }
}

/// Lifecycle of a single stream.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StreamState {
    /// Created, no fragment scheduled yet.
    #[default]
    Idle,
    /// Delivering fragments.
    Streaming,
    /// All fragments delivered.
    Completed,
    /// Stopped through the handle.
    Cancelled,
    /// The responder could not produce the stream.
    Failed(String),
}

impl StreamState {
    /// Whether the state is absorbing.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Failed(_))
    }

    /// The outcome, once terminal.
    pub fn outcome(&self) -> Option<StreamOutcome> {
        match self {
            Self::Idle | Self::Streaming => None,
            Self::Completed => Some(StreamOutcome::Completed),
            Self::Cancelled => Some(StreamOutcome::Cancelled),
            Self::Failed(reason) => Some(StreamOutcome::Failed(reason.clone())),
        }
    }
}

/// How a stream ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamOutcome {
    Completed,
    Cancelled,
    Failed(String),
}

/// Callback invoked once per delivered fragment.
pub type ChunkCallback = Box<dyn FnMut(ResponseChunk) + Send + 'static>;

/// A source of responses.
///
/// Implementations may generate text locally or relay a remote backend; the
/// conversation only sees this contract. Failures are reported as data
/// ([`ResponseStatus::Error`], [`StreamOutcome::Failed`]), never as panics.
#[async_trait]
pub trait Responder: Send + Sync {
    /// Produce the whole response at once.
    async fn complete(&self, prompt: &str) -> Response;

    /// Start delivering the response incrementally.
    ///
    /// Must be called from within a tokio runtime.
    fn stream(&self, prompt: &str, on_chunk: ChunkCallback) -> StreamHandle;

    /// Short name for status displays.
    fn name(&self) -> &str {
        "responder"
    }
}

struct StreamShared {
    state: watch::Sender<StreamState>,
    gate: Mutex<()>,
    token: CancellationToken,
}

impl StreamShared {
    /// Move to `next` unless already terminal. Returns whether it changed.
    fn transition(&self, next: StreamState) -> bool {
        self.state.send_if_modified(|state| {
            if state.is_terminal() {
                false
            } else {
                *state = next;
                true
            }
        })
    }
}

/// Consumer side of a stream: cancellation and completion.
///
/// Cheap to clone; all clones control the same stream.
#[derive(Clone)]
pub struct StreamHandle {
    shared: Arc<StreamShared>,
}

impl std::fmt::Debug for StreamHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamHandle")
            .field("state", &self.state())
            .finish()
    }
}

impl StreamHandle {
    /// Stop delivery. No callback starts after this returns.
    ///
    /// Returns `true` if this call cancelled the stream, `false` if it was
    /// already terminal.
    pub fn cancel(&self) -> bool {
        let changed = {
            let _gate = self
                .shared
                .gate
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            self.shared.transition(StreamState::Cancelled)
        };
        if changed {
            self.shared.token.cancel();
            debug!("stream cancelled");
        }
        changed
    }

    /// Current state.
    pub fn state(&self) -> StreamState {
        self.shared.state.borrow().clone()
    }

    /// Whether the stream has reached a terminal state.
    pub fn is_finished(&self) -> bool {
        self.shared.state.borrow().is_terminal()
    }

    /// Wait for the stream's terminal signal.
    pub async fn finished(&self) -> StreamOutcome {
        let mut rx = self.shared.state.subscribe();
        let outcome = match rx.wait_for(StreamState::is_terminal).await {
            Ok(state) => state.outcome().unwrap_or(StreamOutcome::Cancelled),
            Err(_) => StreamOutcome::Cancelled,
        };
        outcome
    }
}

/// Producer side of a stream, used by [`Responder`] implementations.
///
/// Dropping a driver that never reached a terminal state fails the stream,
/// so [`StreamHandle::finished`] always resolves.
pub struct StreamDriver {
    shared: Arc<StreamShared>,
    on_chunk: ChunkCallback,
    next_index: usize,
}

/// Create a connected driver/handle pair in the `Idle` state.
pub fn stream_channel(on_chunk: ChunkCallback) -> (StreamDriver, StreamHandle) {
    let (state, _) = watch::channel(StreamState::Idle);
    let shared = Arc::new(StreamShared {
        state,
        gate: Mutex::new(()),
        token: CancellationToken::new(),
    });
    let driver = StreamDriver {
        shared: Arc::clone(&shared),
        on_chunk,
        next_index: 0,
    };
    (driver, StreamHandle { shared })
}

impl StreamDriver {
    /// Move from `Idle` to `Streaming`. Returns `false` if already cancelled.
    pub fn start(&self) -> bool {
        self.shared.state.send_if_modified(|state| {
            if *state == StreamState::Idle {
                *state = StreamState::Streaming;
                true
            } else {
                false
            }
        })
    }

    /// Deliver one fragment. Returns `false` (without calling back) once the
    /// stream is no longer streaming.
    pub fn deliver(&mut self, text: impl Into<String>) -> bool {
        let _gate = self
            .shared
            .gate
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if *self.shared.state.borrow() != StreamState::Streaming {
            return false;
        }
        let chunk = ResponseChunk {
            index: self.next_index,
            text: text.into(),
        };
        self.next_index += 1;
        (self.on_chunk)(chunk);
        true
    }

    /// Sleep between fragments. Resolves to `false` if cancelled meanwhile.
    ///
    /// The returned future does not borrow the driver.
    pub fn pause(&self, delay: Duration) -> impl Future<Output = bool> + Send + 'static {
        let shared = Arc::clone(&self.shared);
        async move {
            tokio::select! {
                () = shared.token.cancelled() => false,
                () = tokio::time::sleep(delay) => *shared.state.borrow() != StreamState::Cancelled,
            }
        }
    }

    /// Whether the consumer cancelled the stream.
    pub fn is_cancelled(&self) -> bool {
        *self.shared.state.borrow() == StreamState::Cancelled
    }

    /// Number of fragments delivered so far.
    pub fn delivered(&self) -> usize {
        self.next_index
    }

    /// Signal natural completion.
    pub fn complete(self) {
        if self.shared.transition(StreamState::Completed) {
            debug!(fragments = self.next_index, "stream completed");
        }
    }

    /// Signal failure.
    pub fn fail(self, reason: impl Into<String>) {
        let reason = reason.into();
        debug!(%reason, "stream failed");
        self.shared.transition(StreamState::Failed(reason));
    }
}

impl Drop for StreamDriver {
    fn drop(&mut self) {
        self.shared
            .transition(StreamState::Failed("stream ended unexpectedly".into()));
    }
}

/// Stand-in responder that echoes the prompt inside a canned sentence.
#[derive(Debug, Clone)]
pub struct SimulatedResponder {
    chunk_delay: Duration,
    completion_delay: Duration,
}

impl Default for SimulatedResponder {
    fn default() -> Self {
        Self::new(&ResponderConfig::default())
    }
}

impl SimulatedResponder {
    /// Create a responder with the configured delays.
    pub fn new(config: &ResponderConfig) -> Self {
        Self::with_delays(config.chunk_delay(), config.completion_delay())
    }

    /// Create a responder with explicit delays.
    pub fn with_delays(chunk_delay: Duration, completion_delay: Duration) -> Self {
        Self {
            chunk_delay,
            completion_delay,
        }
    }
}

/// Full text of a simulated completed response.
pub fn simulated_response(prompt: &str) -> String {
    format!(
        "This is a simulated response to: \"{prompt}\". In a real implementation, \
         this would connect to a remote agent API."
    )
}

/// Full text of a simulated streamed response.
pub fn simulated_stream_text(prompt: &str) -> String {
    format!(
        "This is a simulated streaming response to: \"{prompt}\". In a real implementation, \
         this would connect to a remote agent API and stream the response token by token."
    )
}

/// Split text into word fragments, each followed by a single space.
pub fn split_fragments(text: &str) -> Vec<String> {
    text.split(' ').map(|word| format!("{word} ")).collect()
}

fn validate_prompt(prompt: &str) -> Result<&str, String> {
    if prompt.trim().is_empty() {
        Err("Prompt is empty".into())
    } else {
        Ok(prompt)
    }
}

#[async_trait]
impl Responder for SimulatedResponder {
    async fn complete(&self, prompt: &str) -> Response {
        let prompt = match validate_prompt(prompt) {
            Ok(p) => p,
            Err(reason) => return Response::error(reason),
        };
        tokio::time::sleep(self.completion_delay).await;
        Response::completed(simulated_response(prompt))
    }

    fn stream(&self, prompt: &str, on_chunk: ChunkCallback) -> StreamHandle {
        let (mut driver, handle) = stream_channel(on_chunk);

        let fragments = match validate_prompt(prompt) {
            Ok(p) => split_fragments(&simulated_stream_text(p)),
            Err(reason) => {
                driver.fail(reason);
                return handle;
            }
        };

        driver.start();
        debug!(fragments = fragments.len(), "stream started");

        let delay = self.chunk_delay;
        tokio::spawn(async move {
            for fragment in fragments {
                if !driver.deliver(fragment) {
                    return;
                }
                if !driver.pause(delay).await {
                    return;
                }
            }
            driver.complete();
        });

        handle
    }

    fn name(&self) -> &str {
        "simulated"
    }
}
