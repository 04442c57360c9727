//! Failure boundary: catches faults from the rest of the chain.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::FutureExt;

use crate::notify::{LogNotifier, Notice, Notifier};
use crate::pipeline::{Context, Handler, HandlerError, HandlerResult, Next};

/// Catches any fault raised further down the chain, including panics.
///
/// A caught fault is recorded as the run's failure, the run is marked
/// handled and the user is notified. The run then completes normally from
/// the caller's point of view. Register it first so it encloses every other
/// handler.
pub struct ExceptionHandler {
    notifier: Arc<dyn Notifier>,
}

impl ExceptionHandler {
    #[must_use]
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }
}

impl Default for ExceptionHandler {
    fn default() -> Self {
        Self::new(Arc::new(LogNotifier))
    }
}

#[async_trait]
impl Handler for ExceptionHandler {
    fn name(&self) -> &'static str {
        "exception"
    }

    async fn handle(&self, ctx: &mut Context, next: Next<'_>) -> HandlerResult {
        let error = match AssertUnwindSafe(next.run(ctx)).catch_unwind().await {
            Ok(Ok(())) => return Ok(()),
            Ok(Err(error)) => error,
            Err(panic) => HandlerError::Panicked {
                message: panic_message(panic.as_ref()),
            },
        };

        tracing::error!(
            kind = %ctx.request_kind(),
            run_id = %ctx.run_id(),
            error = %error,
            "operation failed"
        );
        self.notifier
            .notify(Notice::error(
                format!("{} failed", ctx.request_kind()),
                error.to_string(),
            ))
            .await;
        ctx.record_failure(error);
        ctx.mark_handled();
        Ok(())
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
