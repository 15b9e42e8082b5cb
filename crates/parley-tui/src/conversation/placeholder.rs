//! Placeholder text for the input area.

use parley_engine::BusyPolicy;

/// Get placeholder text for the input area.
///
/// Only reachable while busy when new prompts replace the current response.
#[must_use]
pub fn input_placeholder(busy: bool, policy: BusyPolicy) -> &'static str {
    match (busy, policy) {
        (true, BusyPolicy::CancelPrevious) => "Type to replace the current response...",
        _ => "Type a message, Enter to send, Ctrl+J for a new line",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_placeholder() {
        assert_eq!(
            input_placeholder(false, BusyPolicy::Reject),
            "Type a message, Enter to send, Ctrl+J for a new line"
        );
        assert_eq!(
            input_placeholder(false, BusyPolicy::CancelPrevious),
            input_placeholder(false, BusyPolicy::Reject)
        );
    }

    #[test]
    fn test_replace_placeholder() {
        assert_eq!(
            input_placeholder(true, BusyPolicy::CancelPrevious),
            "Type to replace the current response..."
        );
    }
}
