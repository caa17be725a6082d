//! Loading-state reporting for dashboard refreshes.
//!
//! Defines a [`LoadingReporter`] trait that decouples refresh progress
//! from any specific rendering backend (an `indicatif` spinner in the
//! CLI, silence in tests and in the server).

use std::sync::Arc;

/// Receives loading messages while a refresh is in flight.
///
/// Implementations must be `Send + Sync` so a reporter can be shared with
/// the concurrent dataset fetches.
pub trait LoadingReporter: Send + Sync {
    /// A refresh started; `msg` describes the full-loading state.
    fn start(&self, msg: String);

    /// Some datasets finished; `msg` describes what is still pending.
    fn set_message(&self, msg: String);

    /// The refresh is over, with a final message.
    fn finish(&self, msg: String);

    /// The refresh is over and the indicator should disappear.
    fn finish_and_clear(&self);
}

/// A [`LoadingReporter`] that ignores every update.
pub struct NullReporter;

impl LoadingReporter for NullReporter {
    fn start(&self, _msg: String) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
    fn finish_and_clear(&self) {}
}

/// Returns a shared [`NullReporter`].
#[must_use]
pub fn null_reporter() -> Arc<dyn LoadingReporter> {
    Arc::new(NullReporter)
}
