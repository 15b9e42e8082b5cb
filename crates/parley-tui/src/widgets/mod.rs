//! Composite widgets for the chat screen.

mod input_bar;

pub use input_bar::InputBar;
