//! External stop signal checked between cycles.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Asked once per cycle whether the loop should end.
pub trait StopSignal {
    fn should_stop(&self) -> bool;
}

impl<F> StopSignal for F
where
    F: Fn() -> bool,
{
    fn should_stop(&self) -> bool {
        self()
    }
}

/// Shareable flag, typically raised from a signal handler.
#[derive(Debug, Clone, Default)]
pub struct StopFlag {
    raised: Arc<AtomicBool>,
}

impl StopFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.raised.store(true, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::SeqCst)
    }
}

impl StopSignal for StopFlag {
    fn should_stop(&self) -> bool {
        self.is_raised()
    }
}
