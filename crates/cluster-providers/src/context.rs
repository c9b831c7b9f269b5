//! Per-call request context
//!
//! Every provider operation receives a `RequestContext`. It carries an
//! optional deadline; operations that pass it fail with
//! [`ProviderError::DeadlineExceeded`].

use crate::error::{ProviderError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// Deadline shared by the backend calls of one provider operation
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestContext {
    deadline: Option<Instant>,
}

impl RequestContext {
    /// Context without a deadline
    pub fn background() -> Self {
        Self::default()
    }

    /// Context that expires `timeout` from now
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            deadline: Some(Instant::now() + timeout),
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline, `None` when there is no deadline
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    /// Run `fut`, failing with `DeadlineExceeded` if the deadline passes first
    pub async fn run<T, F>(&self, operation: &str, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match self.deadline {
            Some(deadline) => tokio::time::timeout_at(deadline, fut)
                .await
                .map_err(|_elapsed| ProviderError::DeadlineExceeded(operation.to_string()))?,
            None => fut.await,
        }
    }
}
