//! Deadline for the rest of the chain.

use std::time::Duration;

use async_trait::async_trait;

use crate::pipeline::{Context, Handler, HandlerError, HandlerResult, Next};

/// Fails the run with [`HandlerError::Timeout`] when the handlers after it
/// take longer than the configured duration. The inner work is dropped at
/// the deadline.
#[derive(Debug, Clone, Copy)]
pub struct TimeoutHandler {
    timeout: Duration,
}

impl TimeoutHandler {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for TimeoutHandler {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

#[async_trait]
impl Handler for TimeoutHandler {
    fn name(&self) -> &'static str {
        "timeout"
    }

    async fn handle(&self, ctx: &mut Context, next: Next<'_>) -> HandlerResult {
        match tokio::time::timeout(self.timeout, next.run(ctx)).await {
            Ok(result) => result,
            Err(_elapsed) => {
                #[allow(clippy::cast_possible_truncation)]
                let timeout_ms = self.timeout.as_millis() as u64;
                Err(HandlerError::Timeout { timeout_ms })
            }
        }
    }
}
