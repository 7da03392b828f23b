//! Per-run cooperative cancellation.
//!
//! A [`CancellationToken`] is the single writer; it is deliberately not
//! `Clone`. Readers get a [`CancelObserver`], which can only look at the flag.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the run as cancelled. Idempotent.
    pub fn request(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn is_requested(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    /// A read-only handle for the worker side.
    pub fn observer(&self) -> CancelObserver {
        CancelObserver {
            flag: Arc::clone(&self.flag),
        }
    }
}

/// Read side of a [`CancellationToken`]. Cheap to clone and `Send`.
#[derive(Debug, Clone)]
pub struct CancelObserver {
    flag: Arc<AtomicBool>,
}

impl CancelObserver {
    /// An observer with no token behind it; never reports cancellation.
    pub fn never() -> Self {
        CancelObserver {
            flag: Arc::new(AtomicBool::new(false)),
        }
    }

    #[inline]
    pub fn is_requested(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}
