//! Progress reporting for dataset loading and report generation.
//!
//! [`ProgressCallback`] keeps the loader independent of how progress is
//! shown. The CLI plugs in `indicatif` bars; tests use [`NullProgress`].

use std::sync::Arc;

/// Receives progress updates from long-running steps.
///
/// Implementations must be `Send + Sync` so one callback can be shared
/// across concurrently loading datasets.
pub trait ProgressCallback: Send + Sync {
    /// Set the total expected units of work.
    fn set_total(&self, total: u64);

    /// Advance progress by `delta` units.
    fn inc(&self, delta: u64);

    /// Update the message displayed alongside the indicator.
    fn set_message(&self, msg: String);

    /// Mark progress as complete with a final message.
    fn finish(&self, msg: String);
}

/// Ignores every update.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
}

/// Returns a shared [`NullProgress`].
#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}
