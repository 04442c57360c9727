//! Cooperative cancellation for runs that carry a token.

use async_trait::async_trait;

use crate::pipeline::{Context, Handler, HandlerError, HandlerResult, Next};

/// Stops a run whose [`Context`] carries a cancelled token.
///
/// A token cancelled before this handler runs prevents `next` from being
/// called; one cancelled while the rest of the chain runs drops that work.
/// Both fail the run with [`HandlerError::Cancelled`]. Runs without a token
/// pass straight through.
#[derive(Debug, Clone, Copy, Default)]
pub struct CancellationHandler;

#[async_trait]
impl Handler for CancellationHandler {
    fn name(&self) -> &'static str {
        "cancellation"
    }

    async fn handle(&self, ctx: &mut Context, next: Next<'_>) -> HandlerResult {
        let Some(token) = ctx.cancellation().cloned() else {
            return next.run(ctx).await;
        };
        if token.is_cancelled() {
            return Err(HandlerError::Cancelled);
        }

        let run_id = ctx.run_id();
        tokio::select! {
            biased;
            () = token.cancelled() => {
                tracing::debug!(run_id = %run_id, "run cancelled in flight");
                Err(HandlerError::Cancelled)
            }
            result = next.run(ctx) => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio_util::sync::CancellationToken;

    use super::*;
    use crate::pipeline::Pipeline;

    fn pipeline() -> Pipeline {
        let mut pipeline = Pipeline::new();
        pipeline
            .push(CancellationHandler)
            .push_fn("work", |ctx, _next| {
                Box::pin(async move {
                    tokio::time::sleep(Duration::from_millis(100)).await;
                    ctx.set_payload(1_u32);
                    Ok(())
                })
            });
        pipeline
    }

    #[tokio::test(start_paused = true)]
    async fn without_token_runs_normally() {
        let mut ctx = Context::new("test");
        pipeline().execute(&mut ctx).await.unwrap();
        assert_eq!(ctx.payload::<u32>(), Some(&1));
    }

    #[tokio::test]
    async fn cancelled_before_start_skips_the_rest() {
        let token = CancellationToken::new();
        token.cancel();
        let mut ctx = Context::new("test").with_cancellation(token);

        let err = pipeline().execute(&mut ctx).await.unwrap_err();
        assert!(matches!(err, HandlerError::Cancelled));
        assert!(!ctx.has_payload());
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_in_flight() {
        let token = CancellationToken::new();
        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            canceller.cancel();
        });

        let mut ctx = Context::new("test").with_cancellation(token);
        let err = pipeline().execute(&mut ctx).await.unwrap_err();
        assert!(matches!(err, HandlerError::Cancelled));
        assert!(!ctx.has_payload());
    }
}
