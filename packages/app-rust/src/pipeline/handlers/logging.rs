//! Start/completion logging with timing.

use std::time::Instant;

use async_trait::async_trait;
use metrics::{counter, histogram};
use tracing::info;

use crate::pipeline::{Context, Handler, HandlerResult, Next};

/// Logs the start of a run, always continues, then logs completion with the
/// elapsed time and outcome. Records an operation counter and a duration
/// histogram. Never touches the context.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingHandler;

#[async_trait]
impl Handler for LoggingHandler {
    fn name(&self) -> &'static str {
        "logging"
    }

    async fn handle(&self, ctx: &mut Context, next: Next<'_>) -> HandlerResult {
        let kind = ctx.request_kind().to_string();
        let run_id = ctx.run_id();
        let start = Instant::now();

        info!(kind = %kind, run_id = %run_id, "operation started");

        let result = next.run(ctx).await;

        let elapsed = start.elapsed();
        let outcome = match &result {
            Err(_) => "error",
            Ok(()) if ctx.is_handled() => "handled",
            Ok(()) => "ok",
        };

        #[allow(clippy::cast_possible_truncation)]
        let duration_ms = elapsed.as_millis() as u64;
        info!(
            kind = %kind,
            run_id = %run_id,
            duration_ms = duration_ms,
            outcome = outcome,
            "operation completed"
        );

        counter!("fleetline_operations_total", "kind" => kind.clone(), "outcome" => outcome)
            .increment(1);
        histogram!("fleetline_operation_duration_seconds", "kind" => kind)
            .record(elapsed.as_secs_f64());

        result
    }
}
