//! Cooperative cancellation for long-running simulations.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::domain::error::FinbytesError;

/// A cloneable flag shared between a caller and the runs it started.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// `Err(Cancelled)` once the flag is set.
    pub fn check(&self) -> Result<(), FinbytesError> {
        if self.is_cancelled() {
            Err(FinbytesError::Cancelled)
        } else {
            Ok(())
        }
    }
}
