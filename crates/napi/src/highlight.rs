//! Highlighting through a callback that must stay on the calling thread.
//!
//! A JavaScript function can only be called on the thread that received it.
//! The pipeline therefore runs on a scoped worker while the calling thread
//! answers highlight requests sent over a channel.

use std::sync::mpsc;
use std::sync::Arc;
use std::thread;

use neohome_astro::{Highlight, Highlighter};
use neohome_core::HighlightError;

type Reply = Result<Highlight, HighlightError>;

struct Request {
    source: String,
    language: String,
    reply: mpsc::SyncSender<Reply>,
}

/// Forwards each call to the thread serving the channel and waits for the answer.
struct ChannelHighlighter {
    requests: mpsc::Sender<Request>,
}

impl Highlighter for ChannelHighlighter {
    fn highlight(&self, source: &str, language: &str) -> Reply {
        let (reply, answer) = mpsc::sync_channel(1);
        self.requests
            .send(Request {
                source: source.to_string(),
                language: language.to_string(),
                reply,
            })
            .map_err(|_| HighlightError::new("highlighter is no longer running"))?;
        answer
            .recv()
            .map_err(|_| HighlightError::new("highlighter dropped the request"))?
    }
}

/// Runs `work` on a worker thread with a highlighter backed by `highlight`.
///
/// `highlight` runs on the current thread, one request at a time, until every
/// handle given to `work` is dropped. Returns `Err` when `work` panicked.
pub fn with_local_highlighter<H, W, T>(mut highlight: H, work: W) -> thread::Result<T>
where
    H: FnMut(&str, &str) -> Reply,
    W: FnOnce(Arc<dyn Highlighter>) -> T + Send,
    T: Send,
{
    let (sender, requests) = mpsc::channel::<Request>();
    let highlighter: Arc<dyn Highlighter> = Arc::new(ChannelHighlighter { requests: sender });
    thread::scope(|scope| {
        let worker = scope.spawn(move || work(highlighter));
        for request in requests {
            let result = highlight(&request.source, &request.language);
            let _ = request.reply.send(result);
        }
        worker.join()
    })
}

/// Maps a JavaScript answer onto a [`Highlight`]: markup, or `null` for no grammar.
pub fn highlight_from_js(answer: napi::Result<Option<String>>) -> Reply {
    match answer {
        Ok(Some(markup)) => Ok(Highlight::Markup(markup)),
        Ok(None) => Ok(Highlight::Unsupported),
        Err(err) => Err(HighlightError::new(err.reason.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn answers_come_from_the_calling_thread() {
        let caller = thread::current().id();
        let seen = RefCell::new(Vec::new());
        let result = with_local_highlighter(
            |source: &str, language: &str| {
                assert_eq!(thread::current().id(), caller);
                seen.borrow_mut().push(language.to_string());
                Ok(Highlight::Markup(format!("<code>{source}</code>")))
            },
            |highlighter| {
                assert_ne!(thread::current().id(), caller);
                highlighter.highlight("x", "rust")
            },
        )
        .unwrap();
        assert_eq!(result.unwrap(), Highlight::Markup("<code>x</code>".into()));
        assert_eq!(seen.into_inner(), vec!["rust".to_string()]);
    }

    #[test]
    fn worker_panic_is_reported() {
        let result = with_local_highlighter(
            |_: &str, _: &str| Ok(Highlight::Unsupported),
            |_highlighter| -> () { panic!("boom") },
        );
        assert!(result.is_err());
    }

    #[test]
    fn js_answers_map_to_highlights() {
        assert_eq!(
            highlight_from_js(Ok(None)).unwrap(),
            Highlight::Unsupported
        );
        assert_eq!(
            highlight_from_js(Ok(Some("<code/>".into()))).unwrap(),
            Highlight::Markup("<code/>".into())
        );
        let err = highlight_from_js(Err(napi::Error::from_reason("grammar crashed"))).unwrap_err();
        assert_eq!(err.message, "grammar crashed");
    }
}
