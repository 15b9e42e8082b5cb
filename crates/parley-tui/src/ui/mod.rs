//! Shared layout helpers and low-level widgets.

pub mod layout;
pub mod widgets;

pub use layout::*;
pub use widgets::*;
