//! Conversation state and responder wiring.
//!
//! A [`Conversation`] owns the message log and at most one in-flight
//! request. Responder output arrives as [`ConversationEvent`]s on an
//! internal channel and is applied to the log by message id, either
//! non-blocking via [`Conversation::pump`] (UI tick) or by awaiting
//! [`Conversation::next_event`].

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tracing::{debug, info};

use crate::config::{BusyPolicy, Config, ResponseMode};
use crate::message::{Message, MessageId};
use crate::responder::{
    Responder, Response, ResponseChunk, ResponseStatus, StreamHandle, StreamOutcome,
};
use crate::store::{MessageStore, StoreError};

/// Responder output addressed to an agent message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationEvent {
    /// A streamed fragment.
    Chunk {
        message_id: MessageId,
        chunk: ResponseChunk,
    },
    /// A stream reached its terminal state.
    StreamFinished {
        message_id: MessageId,
        outcome: StreamOutcome,
    },
    /// A non-streamed response resolved.
    Resolved {
        message_id: MessageId,
        response: Response,
    },
}

impl ConversationEvent {
    /// The agent message this event targets.
    pub fn message_id(&self) -> MessageId {
        match self {
            Self::Chunk { message_id, .. }
            | Self::StreamFinished { message_id, .. }
            | Self::Resolved { message_id, .. } => *message_id,
        }
    }
}

/// Behavior switches for a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConversationOptions {
    /// Stream fragments or wait for a complete response.
    pub mode: ResponseMode,
    /// What `submit` does while busy.
    pub busy_policy: BusyPolicy,
}

impl From<&Config> for ConversationOptions {
    fn from(config: &Config) -> Self {
        Self {
            mode: config.responder.mode,
            busy_policy: config.busy_policy,
        }
    }
}

enum RequestKind {
    Stream(StreamHandle),
    Complete(AbortHandle),
}

struct ActiveRequest {
    message_id: MessageId,
    kind: RequestKind,
}

impl ActiveRequest {
    fn cancel(&self) {
        match &self.kind {
            RequestKind::Stream(handle) => {
                handle.cancel();
            }
            RequestKind::Complete(task) => task.abort(),
        }
    }
}

/// A single chat session.
///
/// Dropping the conversation cancels any in-flight response.
pub struct Conversation {
    store: MessageStore,
    responder: Arc<dyn Responder>,
    options: ConversationOptions,
    active: Option<ActiveRequest>,
    events_tx: mpsc::UnboundedSender<ConversationEvent>,
    events_rx: mpsc::UnboundedReceiver<ConversationEvent>,
}

impl std::fmt::Debug for Conversation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Conversation")
            .field("responder", &self.responder.name())
            .field("messages", &self.store.len())
            .field("active", &self.active_message_id())
            .field("options", &self.options)
            .finish()
    }
}

impl Conversation {
    /// Create a conversation around a shared responder.
    pub fn new(responder: Arc<dyn Responder>, options: ConversationOptions) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            store: MessageStore::new(),
            responder,
            options,
            active: None,
            events_tx,
            events_rx,
        }
    }

    /// Submit a prompt.
    ///
    /// Appends the user message and an empty streaming agent message, then
    /// starts the request. Returns the agent message id. Must be called from
    /// within a tokio runtime.
    pub fn submit(&mut self, prompt: &str) -> Result<MessageId, ConversationError> {
        if prompt.trim().is_empty() {
            return Err(ConversationError::EmptyPrompt);
        }

        if self.is_busy() {
            match self.options.busy_policy {
                BusyPolicy::Reject => return Err(ConversationError::Busy),
                BusyPolicy::CancelPrevious => {
                    self.cancel();
                }
            }
        }

        self.store.push_user(prompt);
        let message_id = self.store.push_agent_placeholder()?;

        let kind = match self.options.mode {
            ResponseMode::Stream => self.start_stream(message_id, prompt),
            ResponseMode::Complete => self.start_complete(message_id, prompt),
        };
        self.active = Some(ActiveRequest { message_id, kind });

        info!(%message_id, mode = ?self.options.mode, "prompt submitted");
        Ok(message_id)
    }

    fn start_stream(&self, message_id: MessageId, prompt: &str) -> RequestKind {
        let chunk_tx = self.events_tx.clone();
        let handle = self.responder.stream(
            prompt,
            Box::new(move |chunk| {
                let _ = chunk_tx.send(ConversationEvent::Chunk { message_id, chunk });
            }),
        );

        // Forward the terminal signal after the last fragment.
        let waiter = handle.clone();
        let done_tx = self.events_tx.clone();
        tokio::spawn(async move {
            let outcome = waiter.finished().await;
            let _ = done_tx.send(ConversationEvent::StreamFinished {
                message_id,
                outcome,
            });
        });

        RequestKind::Stream(handle)
    }

    fn start_complete(&self, message_id: MessageId, prompt: &str) -> RequestKind {
        let responder = Arc::clone(&self.responder);
        let prompt = prompt.to_string();
        let tx = self.events_tx.clone();
        let task = tokio::spawn(async move {
            let response = responder.complete(&prompt).await;
            let _ = tx.send(ConversationEvent::Resolved {
                message_id,
                response,
            });
        });
        RequestKind::Complete(task.abort_handle())
    }

    /// Cancel the in-flight request, keeping any content received so far.
    ///
    /// Returns `false` if nothing was in flight.
    pub fn cancel(&mut self) -> bool {
        let Some(active) = self.active.take() else {
            return false;
        };
        active.cancel();
        if let Err(e) = self.store.cancel(active.message_id) {
            debug!(error = %e, "cancelled request had already settled");
        }
        info!(message_id = %active.message_id, "response cancelled");
        true
    }

    /// Apply one responder event to the log.
    ///
    /// Events for messages that are no longer streaming are dropped.
    pub fn apply(&mut self, event: ConversationEvent) {
        match event {
            ConversationEvent::Chunk { message_id, chunk } => {
                if let Err(e) = self.store.append(message_id, &chunk.text) {
                    debug!(error = %e, index = chunk.index, "dropping late fragment");
                }
            }
            ConversationEvent::StreamFinished {
                message_id,
                outcome,
            } => {
                let result = match outcome {
                    StreamOutcome::Completed => self.store.finish(message_id),
                    StreamOutcome::Cancelled => self.store.cancel(message_id),
                    StreamOutcome::Failed(reason) => self.store.fail(message_id, reason),
                };
                self.settle(message_id, result);
            }
            ConversationEvent::Resolved {
                message_id,
                response,
            } => {
                let result = match response.status {
                    ResponseStatus::Completed => self
                        .store
                        .set_content(message_id, response.content)
                        .and_then(|()| self.store.finish(message_id)),
                    ResponseStatus::Error => self.store.fail(message_id, response.content),
                };
                self.settle(message_id, result);
            }
        }
    }

    fn settle(&mut self, message_id: MessageId, result: Result<(), StoreError>) {
        if let Err(e) = result {
            debug!(error = %e, "ignoring terminal event for settled message");
        }
        if self.active_message_id() == Some(message_id) {
            self.active = None;
        }
    }

    /// Apply all pending events without waiting. Returns how many were applied.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.apply(event);
            applied += 1;
        }
        applied
    }

    /// Wait for the next event, apply it, and return it.
    ///
    /// Waits forever when nothing is in flight; check [`Self::is_busy`] first.
    pub async fn next_event(&mut self) -> Option<ConversationEvent> {
        let event = self.events_rx.recv().await?;
        self.apply(event.clone());
        Some(event)
    }

    /// Apply events until no request is in flight.
    pub async fn wait_idle(&mut self) {
        while self.is_busy() {
            if self.next_event().await.is_none() {
                break;
            }
        }
    }

    /// Whether a response is in flight.
    pub fn is_busy(&self) -> bool {
        self.active.is_some()
    }

    /// The agent message currently receiving output.
    pub fn active_message_id(&self) -> Option<MessageId> {
        self.active.as_ref().map(|a| a.message_id)
    }

    /// Messages in submission order.
    pub fn messages(&self) -> &[Message] {
        self.store.as_slice()
    }

    /// Look up a message by id.
    pub fn message(&self, id: MessageId) -> Option<&Message> {
        self.store.get(id)
    }

    /// Name of the responder backing this conversation.
    pub fn responder_name(&self) -> &str {
        self.responder.name()
    }

    /// Current options.
    pub fn options(&self) -> ConversationOptions {
        self.options
    }
}

impl Drop for Conversation {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Errors returned by [`Conversation::submit`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversationError {
    /// The prompt has no visible characters.
    #[error("Prompt is empty")]
    EmptyPrompt,

    /// A response is still in flight.
    #[error("A response is already in progress")]
    Busy,

    /// The message log refused the update.
    #[error(transparent)]
    Store(#[from] StoreError),
}
