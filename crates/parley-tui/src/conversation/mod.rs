//! Conversation transcript.
//!
//! Renders the message log with role labels, the streaming cursor and
//! terminal-state markers, plus the placeholder text for the input bar.

mod placeholder;
mod widget;

pub use placeholder::input_placeholder;
pub use widget::TranscriptWidget;
