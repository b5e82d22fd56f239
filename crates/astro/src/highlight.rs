//! Boundary to the external syntax highlighter.
//!
//! The highlighter is a black box: it receives the raw source and a language
//! tag and either returns markup, reports that it has nothing for that
//! language, or fails. Only the last case aborts the document.

use neohome_core::HighlightError;
use std::sync::Arc;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

/// Result of a successful highlighter call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Highlight {
    /// HTML markup for the block, typically a single `<code>` root.
    Markup(String),
    /// No grammar is available for the language.
    Unsupported,
}

/// An external syntax highlighter.
pub trait Highlighter: Send + Sync {
    /// Highlights `source` written in `language`.
    fn highlight(&self, source: &str, language: &str) -> Result<Highlight, HighlightError>;
}

impl<F> Highlighter for F
where
    F: Fn(&str, &str) -> Result<Highlight, HighlightError> + Send + Sync,
{
    fn highlight(&self, source: &str, language: &str) -> Result<Highlight, HighlightError> {
        (self)(source, language)
    }
}

/// Why a highlighter call did not produce a [`Highlight`].
#[derive(Debug)]
pub enum CallError {
    /// The highlighter returned an error or panicked.
    Failed(HighlightError),
    /// The highlighter did not answer within the timeout.
    TimedOut(Duration),
}

/// Calls a shared highlighter with a deadline.
///
/// Each call runs on its own thread so a hanging highlighter cannot stall
/// the build; on timeout the thread is abandoned.
#[derive(Clone)]
pub struct HighlightAdapter {
    highlighter: Arc<dyn Highlighter>,
    timeout: Duration,
}

impl HighlightAdapter {
    /// Wraps a highlighter.
    pub fn new(highlighter: Arc<dyn Highlighter>, timeout: Duration) -> Self {
        Self {
            highlighter,
            timeout,
        }
    }

    /// Configured timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Runs the highlighter for one block.
    pub fn call(&self, source: &str, language: &str) -> Result<Highlight, CallError> {
        let (sender, receiver) = mpsc::sync_channel(1);
        let highlighter = Arc::clone(&self.highlighter);
        let source = source.to_string();
        let language = language.to_string();

        let spawned = thread::Builder::new()
            .name("neohome-highlight".into())
            .spawn(move || {
                let result = highlighter.highlight(&source, &language);
                let _ = sender.send(result);
            });
        if let Err(err) = spawned {
            return Err(CallError::Failed(HighlightError::new(format!(
                "could not start highlighter thread: {err}"
            ))));
        }

        match receiver.recv_timeout(self.timeout) {
            Ok(result) => result.map_err(CallError::Failed),
            Err(mpsc::RecvTimeoutError::Timeout) => Err(CallError::TimedOut(self.timeout)),
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(CallError::Failed(
                HighlightError::new("highlighter panicked"),
            )),
        }
    }
}

impl std::fmt::Debug for HighlightAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HighlightAdapter")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
