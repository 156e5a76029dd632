//! # Operation Context
//!
//! The caller-supplied seam for cooperative cancellation and progress
//! reporting. The engine only asks "was cancellation requested?" and pushes
//! progress messages; it never blocks on either.

use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Cancellation and progress capability injected by the caller
pub trait OperationContext: Send + Sync {
    fn is_cancelled(&self) -> bool;

    /// `increment_percent` is this step's share of the whole run
    fn report_progress(&self, message: &str, increment_percent: f64);
}

/// Progress sink receiving `(message, increment_percent)`
pub type ProgressSink = Arc<dyn Fn(&str, f64) + Send + Sync>;

/// [`OperationContext`] backed by a [`CancellationToken`]
///
/// Clones share the token, so a UI "cancel" affordance can hold one clone
/// while the engine holds another.
#[derive(Clone, Default)]
pub struct TokenContext {
    token: CancellationToken,
    sink: Option<ProgressSink>,
}

impl TokenContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: CancellationToken) -> Self {
        Self { token, sink: None }
    }

    pub fn with_progress(mut self, sink: ProgressSink) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

impl fmt::Debug for TokenContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenContext")
            .field("cancelled", &self.token.is_cancelled())
            .field("has_progress_sink", &self.sink.is_some())
            .finish()
    }
}

impl OperationContext for TokenContext {
    fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    fn report_progress(&self, message: &str, increment_percent: f64) {
        debug!(increment_percent, "📊 {}", message);
        if let Some(sink) = &self.sink {
            sink(message, increment_percent);
        }
    }
}
