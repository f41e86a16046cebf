use crate::error::{RedmarkError, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation handle.
///
/// Comparers check the token at phase boundaries (canonicalize, match,
/// diff, markup) and at every sheet/slide boundary. Once cancelled, no
/// partial output document is produced.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Returns `Err(Cancelled)` once `cancel()` has been observed.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(RedmarkError::Cancelled)
        } else {
            Ok(())
        }
    }
}
