//! Rate-limited execution queue
//!
//! The backend enforces concurrency 1 and a minimum spacing between
//! requests, and signals throttling inside nominally-successful
//! responses. This queue is the single cross-task shared resource in
//! the process: callers suspend on `submit` until a terminal outcome
//! exists, admission is FIFO, and a throttled job is retried in place
//! without readmitting anyone else.

#[path = "queue_tests.rs"]
mod queue_tests;

use std::time::Duration;

use piston_types::{ExecOutcome, ExecRequest, ExecSuccess};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

use crate::error::{Error, Result};
use crate::piston::PistonClient;

/// Serializes all calls to the execution backend.
#[derive(Debug)]
pub struct ExecQueue {
    client: PistonClient,
    min_interval: Duration,
    /// Start time of the most recent backend call. The mutex doubles
    /// as the admission slot: tokio's `Mutex` queues waiters in FIFO
    /// order, which gives submission-order service for free.
    last_dispatch: Mutex<Option<Instant>>,
}

impl ExecQueue {
    pub fn new(client: PistonClient, min_interval: Duration) -> Self {
        Self {
            client,
            min_interval,
            last_dispatch: Mutex::new(None),
        }
    }

    /// Run one job through the backend. Suspends until the job reaches
    /// a terminal outcome: throttled responses are retried indefinitely
    /// (with the same spacing) and never escape to the caller.
    pub async fn submit(&self, request: &ExecRequest) -> Result<ExecSuccess> {
        let mut last = self.last_dispatch.lock().await;
        loop {
            if let Some(previous) = *last {
                tokio::time::sleep_until(previous + self.min_interval).await;
            }
            *last = Some(Instant::now());

            match self.client.execute(request).await? {
                ExecOutcome::Success(success) => return Ok(success),
                ExecOutcome::Error(message) => return Err(Error::Backend(message)),
                ExecOutcome::Throttled => {
                    debug!(language = %request.language, "Backend throttled request, retrying");
                }
            }
        }
    }
}
