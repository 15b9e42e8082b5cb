//! parley-engine: Headless conversation engine for parley
//!
//! This crate provides the core chat logic, including:
//! - Message types and the id-addressed message store
//! - The `Responder` contract with streaming and cancellation
//! - A simulated responder standing in for a remote agent API
//! - Conversation state that wires responder output into the log
//! - Configuration loading

pub mod config;
pub mod conversation;
pub mod message;
pub mod responder;
pub mod store;

// Re-export commonly used types
pub use config::{
    BusyPolicy, Config, ConfigError, ResponderConfig, ResponseMode, ThemeName, UiConfig,
    DEFAULT_CONFIG_PATH, MIN_TICK_RATE_MS,
};
pub use conversation::{Conversation, ConversationError, ConversationEvent, ConversationOptions};
pub use message::{Message, MessageId, MessageStatus, Sender};
pub use responder::{
    stream_channel, ChunkCallback, Responder, Response, ResponseChunk, ResponseStatus,
    SimulatedResponder, StreamDriver, StreamHandle, StreamOutcome, StreamState,
};
pub use store::{MessageStore, StoreError};

/// Returns the engine version.
pub fn engine_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_version() {
        let version = engine_version();
        assert!(!version.is_empty());
        assert!(version.starts_with("0."));
    }
}
