//! Cooperative cancellation shared between the preview queue and the work it
//! schedules.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::PreviewError;

/// Cancellation hook polled at page granularity by long-running work.
pub trait CancelToken: Send + Sync {
    fn is_cancelled(&self) -> bool;

    /// `Err(PreviewError::Cancelled)` once cancellation was requested.
    fn check(&self) -> Result<(), PreviewError> {
        if self.is_cancelled() {
            Err(PreviewError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Never-cancel token for callers that run to completion.
#[derive(Clone, Copy, Debug, Default)]
pub struct NeverCancel;

impl CancelToken for NeverCancel {
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Owned cancellation handle for one preview request.
///
/// Clones share the same flag; the request id identifies which request the
/// token belongs to.
#[derive(Clone)]
pub struct CancellationToken {
    request: u64,
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new(request: u64) -> Self {
        Self {
            request,
            flag: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn request(&self) -> u64 {
        self.request
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// True when both handles refer to the same request.
    pub fn same_request(&self, other: &CancellationToken) -> bool {
        Arc::ptr_eq(&self.flag, &other.flag)
    }
}

impl CancelToken for CancellationToken {
    fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

impl fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancellationToken")
            .field("request", &self.request)
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
