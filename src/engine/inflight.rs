//! "In progress" indicators for the two suspension points.
//!
//! Palette-level generation and single-color regeneration each own a flag.
//! The flags are independent: holding one never blocks the other. Handles are
//! cheap clones sharing the same flags, so the HTTP layer can read them while
//! an action holds the orchestrator.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared pair of in-flight flags.
#[derive(Clone, Debug, Default)]
pub struct InFlight {
    palette: Arc<AtomicBool>,
    single: Arc<AtomicBool>,
}

impl InFlight {
    /// Both flags cleared.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a palette generation is running.
    #[must_use]
    pub fn palette_busy(&self) -> bool {
        self.palette.load(Ordering::Acquire)
    }

    /// Whether a single-color regeneration is running.
    #[must_use]
    pub fn single_busy(&self) -> bool {
        self.single.load(Ordering::Acquire)
    }

    /// Mark a palette generation as started. `None` if one is already running.
    #[must_use]
    pub fn begin_palette(&self) -> Option<InFlightGuard> {
        InFlightGuard::acquire(&self.palette)
    }

    /// Mark a single-color regeneration as started. `None` if one is already running.
    #[must_use]
    pub fn begin_single(&self) -> Option<InFlightGuard> {
        InFlightGuard::acquire(&self.single)
    }
}

/// Clears its flag when dropped, including on early return.
#[derive(Debug)]
pub struct InFlightGuard {
    flag: Arc<AtomicBool>,
}

impl InFlightGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self {
                flag: Arc::clone(flag),
            })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
