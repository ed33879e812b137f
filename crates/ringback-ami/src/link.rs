use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared liveness flag for the manager connection.
///
/// The embedding transport flips it on connect/disconnect; the scheduler reads
/// it before each sweep so no originations are issued against a dead link.
/// Cloning hands out another handle to the same flag.
#[derive(Debug, Clone, Default)]
pub struct ManagerLink {
    up: Arc<AtomicBool>,
}

impl ManagerLink {
    /// A new link handle, initially down.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_up(&self) {
        self.up.store(true, Ordering::SeqCst);
    }

    pub fn set_down(&self) {
        self.up.store(false, Ordering::SeqCst);
    }

    pub fn is_up(&self) -> bool {
        self.up.load(Ordering::SeqCst)
    }
}
