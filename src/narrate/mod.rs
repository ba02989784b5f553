//! Narration boundary (verb)
//!
//! Narration text comes from an external collaborator (usually a language
//! model). The engine only hands it a query result and waits a bounded time
//! for the answer.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

use crate::error::ErrorKind;
use crate::executor::QueryResult;
use crate::plan::NarrationHint;

/// What the narrator is asked to describe
#[derive(Debug, Clone)]
pub struct NarrationRequest {
    /// Index of the query step being narrated
    pub source: usize,
    pub result: QueryResult,
    pub hint: NarrationHint,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NarrationError {
    #[error("Narrator failed: {0}")]
    Failed(String),
    #[error("Narrator did not answer within {0:?}")]
    TimedOut(Duration),
    #[error("No narrator configured")]
    NotConfigured,
    /// The narrator thread went away without answering
    #[error("Narrator stopped without answering")]
    Disconnected,
}

impl NarrationError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::NarrationUnavailable
    }
}

/// Turns a query result into prose
pub trait Narrator: Send + Sync {
    fn narrate(&self, request: &NarrationRequest) -> Result<String, NarrationError>;
}

impl<F> Narrator for F
where
    F: Fn(&NarrationRequest) -> Result<String, NarrationError> + Send + Sync,
{
    fn narrate(&self, request: &NarrationRequest) -> Result<String, NarrationError> {
        self(request)
    }
}

/// Run the narrator on a helper thread and wait at most `timeout`
///
/// A narrator that overruns is abandoned; whatever it returns later is
/// dropped with the channel.
pub fn narrate_with_timeout(
    narrator: Arc<dyn Narrator>,
    request: NarrationRequest,
    timeout: Duration,
) -> Result<String, NarrationError> {
    let (tx, rx) = mpsc::channel();
    let source = request.source;

    std::thread::Builder::new()
        .name("narrator".to_string())
        .spawn(move || {
            let reply = narrator.narrate(&request);
            // the receiver is gone if we timed out
            let _ = tx.send(reply);
        })
        .map_err(|e| NarrationError::Failed(format!("could not start narrator: {e}")))?;

    match rx.recv_timeout(timeout) {
        Ok(reply) => {
            debug!(source, ok = reply.is_ok(), "narrator replied");
            reply
        }
        Err(RecvTimeoutError::Timeout) => {
            warn!(source, ?timeout, "narrator timed out");
            Err(NarrationError::TimedOut(timeout))
        }
        Err(RecvTimeoutError::Disconnected) => Err(NarrationError::Disconnected),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;

    fn request() -> NarrationRequest {
        NarrationRequest {
            source: 0,
            result: QueryResult::new(Dataset::empty(vec![])),
            hint: NarrationHint::default(),
        }
    }

    #[test]
    fn test_closure_narrator() {
        let narrator: Arc<dyn Narrator> =
            Arc::new(|req: &NarrationRequest| -> Result<String, NarrationError> {
                Ok(format!("{} rows", req.result.rows.len()))
            });
        let text = narrate_with_timeout(narrator, request(), Duration::from_secs(5)).unwrap();
        assert_eq!(text, "0 rows");
    }

    #[test]
    fn test_timeout() {
        let narrator: Arc<dyn Narrator> =
            Arc::new(|_: &NarrationRequest| -> Result<String, NarrationError> {
                std::thread::sleep(Duration::from_millis(500));
                Ok("late".to_string())
            });
        let err = narrate_with_timeout(narrator, request(), Duration::from_millis(20)).unwrap_err();
        assert_eq!(err, NarrationError::TimedOut(Duration::from_millis(20)));
        assert_eq!(err.kind(), ErrorKind::NarrationUnavailable);
    }

    #[test]
    fn test_panicking_narrator_is_disconnected() {
        let narrator: Arc<dyn Narrator> =
            Arc::new(|_: &NarrationRequest| -> Result<String, NarrationError> { panic!("boom") });
        let err = narrate_with_timeout(narrator, request(), Duration::from_secs(5)).unwrap_err();
        assert_eq!(err, NarrationError::Disconnected);
    }
}
