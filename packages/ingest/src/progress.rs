//! Progress reporting trait for long-running loads.
//!
//! Defines a [`ProgressCallback`] trait that decouples progress reporting
//! from any specific rendering backend (e.g., `indicatif` progress bars or
//! silence). Rendering implementations live with the binaries.

use std::sync::Arc;

/// Trait for reporting progress from long-running operations.
pub trait ProgressCallback: Send + Sync {
    /// Advance progress by `delta` rows.
    fn inc(&self, delta: u64);

    /// Mark progress as complete with a final message.
    fn finish(&self, msg: String);

    /// Mark progress as complete and remove the progress indicator.
    fn finish_and_clear(&self);
}

/// A no-op [`ProgressCallback`] that ignores all updates.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn inc(&self, _delta: u64) {}
    fn finish(&self, _msg: String) {}
    fn finish_and_clear(&self) {}
}

/// Returns a shared [`NullProgress`] instance for convenient use.
#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}
