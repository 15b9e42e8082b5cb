//! Text wrapping for transcript content.

/// Wrap text to the specified width.
///
/// Explicit newlines are kept, including blank lines. Empty input yields a
/// single empty line so callers can always attach decorations to the last
/// line.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }
    let lines: Vec<String> = textwrap::wrap(text, width)
        .into_iter()
        .map(std::borrow::Cow::into_owned)
        .collect();
    if lines.is_empty() {
        vec![String::new()]
    } else {
        lines
    }
}
