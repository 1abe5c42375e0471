use crate::error::ConsoleError;

/// Where confirmations and failures of user actions are surfaced.
pub trait Notifier: Send + Sync {
    fn notice(&self, message: &str);
    fn error(&self, error: &ConsoleError);
}

/// Prints notices to stdout and errors to stderr, and logs both.
pub struct TerminalNotifier;

impl TerminalNotifier {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TerminalNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for TerminalNotifier {
    fn notice(&self, message: &str) {
        log::info!("{}", message);
        println!("{}", message);
    }

    fn error(&self, error: &ConsoleError) {
        log::error!("{}", error);
        eprintln!("Error: {}", error);
    }
}
