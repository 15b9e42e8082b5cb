//! Ordered, session-scoped message log.
//!
//! Messages are addressed by [`MessageId`] rather than by position, and the
//! store guarantees that at most one agent message is streaming at a time.

use crate::message::{Message, MessageId, MessageStatus, Sender};

/// The message log for one conversation.
#[derive(Debug, Clone, Default)]
pub struct MessageStore {
    messages: Vec<Message>,
}

impl MessageStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a finished user message.
    pub fn push_user(&mut self, content: impl Into<String>) -> MessageId {
        let message = Message::user(content);
        let id = message.id;
        self.messages.push(message);
        id
    }

    /// Append an empty streaming agent message.
    ///
    /// Fails if another agent message is still streaming.
    pub fn push_agent_placeholder(&mut self) -> Result<MessageId, StoreError> {
        if let Some(active) = self.active() {
            return Err(StoreError::StreamAlreadyActive(active.id));
        }
        let message = Message::agent_placeholder();
        let id = message.id;
        self.messages.push(message);
        Ok(id)
    }

    /// Append a fragment to a streaming message.
    pub fn append(&mut self, id: MessageId, text: &str) -> Result<(), StoreError> {
        let message = self.streaming_mut(id)?;
        message.content.push_str(text);
        Ok(())
    }

    /// Replace the content of a streaming message.
    pub fn set_content(&mut self, id: MessageId, text: impl Into<String>) -> Result<(), StoreError> {
        let message = self.streaming_mut(id)?;
        message.content = text.into();
        Ok(())
    }

    /// Mark a streaming message as done.
    pub fn finish(&mut self, id: MessageId) -> Result<(), StoreError> {
        self.transition(id, MessageStatus::Done)
    }

    /// Mark a streaming message as cancelled, keeping what arrived so far.
    pub fn cancel(&mut self, id: MessageId) -> Result<(), StoreError> {
        self.transition(id, MessageStatus::Cancelled)
    }

    /// Mark a streaming message as failed.
    pub fn fail(&mut self, id: MessageId, reason: impl Into<String>) -> Result<(), StoreError> {
        self.transition(
            id,
            MessageStatus::Failed {
                reason: reason.into(),
            },
        )
    }

    /// Look up a message by id.
    pub fn get(&self, id: MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    /// The streaming agent message, if any.
    pub fn active(&self) -> Option<&Message> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.sender == Sender::Agent && m.is_streaming())
    }

    /// Most recent message.
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Iterate messages in submission order.
    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    /// All messages as a slice.
    pub fn as_slice(&self) -> &[Message] {
        &self.messages
    }

    /// Number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the store has no messages.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    fn transition(&mut self, id: MessageId, status: MessageStatus) -> Result<(), StoreError> {
        let message = self.streaming_mut(id)?;
        message.status = status;
        Ok(())
    }

    fn streaming_mut(&mut self, id: MessageId) -> Result<&mut Message, StoreError> {
        let message = self
            .messages
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(StoreError::UnknownMessage(id))?;
        if !message.is_streaming() {
            return Err(StoreError::NotStreaming(id));
        }
        Ok(message)
    }
}

/// Errors from message store updates.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// No message with this id.
    #[error("Unknown message: {0}")]
    UnknownMessage(MessageId),

    /// The message is no longer accepting content.
    #[error("Message {0} is not streaming")]
    NotStreaming(MessageId),

    /// Another agent message is already the delivery target.
    #[error("Message {0} is already streaming")]
    StreamAlreadyActive(MessageId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_append_by_id() {
        let mut store = MessageStore::new();
        store.push_user("hi");
        let id = store.push_agent_placeholder().unwrap();

        store.append(id, "Hello ").unwrap();
        store.append(id, "there").unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.get(id).unwrap().content, "Hello there");
        assert_eq!(store.active().map(|m| m.id), Some(id));
    }

    #[test]
    fn test_single_active_agent_message() {
        let mut store = MessageStore::new();
        let first = store.push_agent_placeholder().unwrap();

        assert_eq!(
            store.push_agent_placeholder(),
            Err(StoreError::StreamAlreadyActive(first))
        );

        store.finish(first).unwrap();
        assert!(store.active().is_none());
        assert!(store.push_agent_placeholder().is_ok());
    }

    #[test]
    fn test_terminal_messages_reject_updates() {
        let mut store = MessageStore::new();
        let id = store.push_agent_placeholder().unwrap();
        store.append(id, "partial").unwrap();
        store.cancel(id).unwrap();

        assert_eq!(store.append(id, " late"), Err(StoreError::NotStreaming(id)));
        assert_eq!(store.finish(id), Err(StoreError::NotStreaming(id)));
        assert_eq!(store.get(id).unwrap().content, "partial");
        assert_eq!(store.get(id).unwrap().status, MessageStatus::Cancelled);
    }

    #[test]
    fn test_user_messages_are_not_streaming() {
        let mut store = MessageStore::new();
        let id = store.push_user("question");
        assert_eq!(store.append(id, "x"), Err(StoreError::NotStreaming(id)));
    }

    #[test]
    fn test_unknown_message() {
        let mut store = MessageStore::new();
        let stray = MessageId::new();
        assert_eq!(
            store.append(stray, "x"),
            Err(StoreError::UnknownMessage(stray))
        );
    }

    #[test]
    fn test_fail_and_set_content() {
        let mut store = MessageStore::new();
        let id = store.push_agent_placeholder().unwrap();
        store.set_content(id, "whole response").unwrap();
        store.fail(id, "backend unavailable").unwrap();

        let msg = store.get(id).unwrap();
        assert_eq!(msg.content, "whole response");
        assert_eq!(msg.error(), Some("backend unavailable"));
        assert_eq!(store.last().map(|m| m.id), Some(id));
    }
}
