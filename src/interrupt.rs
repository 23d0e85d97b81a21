//! Cancellation flag shared between a kernel front end and the
//! long-running evaluation loops on its worker thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cloneable cancellation handle. Clones share one flag, so the copy held
/// by a kernel reaches `range` and the continuous-plot loops running in
/// its environment; separate kernels carry separate flags.
#[derive(Clone, Default)]
pub struct InterruptFlag {
    raised: Arc<AtomicBool>,
}

impl InterruptFlag {
    pub fn new() -> Self {
        InterruptFlag::default()
    }

    /// Request cancellation of the evaluation currently in flight.
    pub fn raise(&self) {
        self.raised.store(true, Ordering::SeqCst);
    }

    /// Clear the flag before starting a new program.
    pub fn clear(&self) {
        self.raised.store(false, Ordering::SeqCst);
    }

    /// True once [`raise`](Self::raise) has been called and not yet cleared.
    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::SeqCst)
    }
}
