use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Run-wide abort flag shared by every role.
///
/// Once any role fails the flag is raised, and long-running work such as channel parsing
/// stops at its next check.
#[derive(Debug, Clone, Default)]
pub struct Cancellation(Arc<AtomicBool>);

impl Cancellation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
