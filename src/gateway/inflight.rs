//! Single-outstanding guards for network operations.

use std::sync::atomic::{AtomicBool, Ordering};

/// A flag that at most one caller can hold at a time.
#[derive(Debug, Default)]
pub struct InFlightFlag {
    busy: AtomicBool,
}

impl InFlightFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the flag, or `None` if another caller holds it. The flag is
    /// released when the guard drops, including when its future is cancelled.
    pub fn try_acquire(&self) -> Option<InFlightGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlightGuard { flag: &self.busy })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Holds an [`InFlightFlag`] until dropped.
#[derive(Debug)]
pub struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
