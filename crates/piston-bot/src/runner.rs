//! Deferred follow-up runner
//!
//! The platform gives an interaction handler seconds to answer, while
//! code execution can take far longer. Handlers answer with a deferred
//! acknowledgement and hand the real work to [`spawn`], which detaches
//! it onto the runtime. Tokio keeps detached tasks alive independent
//! of the originating request cycle, so nothing awaits the result. The
//! task's whole contract is one edit-or-follow-up call, or a logged
//! failure.

use std::future::Future;

use tracing::error;

use crate::error::Result;

/// Detach a follow-up delivery task from the request cycle. Errors are
/// logged and dropped; they must never reach the dispatcher.
pub fn spawn<F>(task: F)
where
    F: Future<Output = Result<()>> + Send + 'static,
{
    tokio::spawn(async move {
        if let Err(e) = task.await {
            error!(error = %e, "Deferred follow-up failed");
        }
    });
}
