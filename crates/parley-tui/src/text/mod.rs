//! Text layout utilities.

mod wrap;

pub use wrap::wrap_text;
