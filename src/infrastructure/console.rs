use crate::domain::ports::Notifier;

/// Prints notifications to stderr, one line each, tagged by kind.
///
/// Stdout is reserved for command output (CSV), so messages never mix with it.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl ConsoleNotifier {
    pub fn new() -> Self {
        Self
    }
}

impl Notifier for ConsoleNotifier {
    fn success(&self, text: &str) {
        tracing::debug!(kind = "success", "{text}");
        eprintln!("SUCCESS: {}", text);
    }

    fn error(&self, text: &str) {
        tracing::debug!(kind = "error", "{text}");
        eprintln!("ERROR: {}", text);
    }

    fn info(&self, text: &str) {
        tracing::debug!(kind = "info", "{text}");
        eprintln!("INFO: {}", text);
    }
}
