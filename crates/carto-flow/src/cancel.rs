//! Cooperative cancellation shared between a caller and a running pass.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A cloneable flag the integrator polls between steps.
///
/// Raising it from any thread makes the current pass return
/// [`IntegrationError::Cancelled`](carto_core::IntegrationError::Cancelled)
/// before its next step attempt. Points keep the positions of the last
/// accepted step.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag {
    raised: Arc<AtomicBool>,
}

impl CancelFlag {
    /// A lowered flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.raised.store(true, Ordering::Release);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.raised.load(Ordering::Acquire)
    }

    /// Lower the flag so it can be reused for another pass.
    pub fn reset(&self) {
        self.raised.store(false, Ordering::Release);
    }
}
