use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Input ended (EOF on stdin, script exhausted in tests).
    #[error("input closed")]
    Closed,
}

/// A titled group of menu entries.
#[derive(Debug, Clone)]
pub struct MenuGroup {
    pub title: String,
    pub items: Vec<String>,
}

/// Everything the command loop needs from the terminal.
///
/// Implementations decide how things look; the core only relies on each call
/// having finished before the next statement runs.
#[async_trait]
pub trait Console: Send {
    async fn prompt_text(&mut self, label: &str) -> Result<String, ConsoleError>;

    async fn confirm(&mut self, label: &str) -> Result<bool, ConsoleError>;

    /// Pick one entry. The returned index counts across all groups in order.
    async fn select(&mut self, title: &str, groups: &[MenuGroup]) -> Result<usize, ConsoleError>;

    /// Resolves when the operator asks to stop a running check, one-shot or interval.
    async fn wait_for_stop(&mut self) -> Result<(), ConsoleError>;

    /// Opens a live status line; `status` replaces its text until `end_status`.
    fn begin_status(&mut self, title: &str);
    fn status(&mut self, text: &str);
    fn end_status(&mut self);

    fn table(&mut self, title: &str, headers: &[&str], rows: &[Vec<String>]);
    fn text(&mut self, text: &str);
    fn error(&mut self, text: &str);
}
