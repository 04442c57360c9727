//! Fluent composition of pipelines.

use std::sync::Arc;

use super::context::Context;
use super::engine::Pipeline;
use super::handler::{BoxFuture, Handler, HandlerResult, Next};
use super::handlers::{
    AuthHandler, CancellationHandler, ExceptionHandler, LoggingHandler, TimeoutHandler,
};
use crate::config::PipelineConfig;
use crate::identity::IdentitySource;
use crate::notify::Notifier;

/// Owned-value builder over [`Pipeline`], for one-expression wiring.
#[derive(Debug, Default)]
pub struct PipelineBuilder {
    pipeline: Pipeline,
}

impl PipelineBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with<H: Handler + 'static>(mut self, handler: H) -> Self {
        self.pipeline.push(handler);
        self
    }

    #[must_use]
    pub fn with_arc(mut self, handler: Arc<dyn Handler>) -> Self {
        self.pipeline.push_arc(handler);
        self
    }

    #[must_use]
    pub fn with_fn<F>(mut self, name: &'static str, f: F) -> Self
    where
        F: for<'a> Fn(&'a mut Context, Next<'a>) -> BoxFuture<'a, HandlerResult>
            + Send
            + Sync
            + 'static,
    {
        self.pipeline.push_fn(name, f);
        self
    }

    #[must_use]
    pub fn with_default<H: Handler + Default + 'static>(mut self) -> Self {
        self.pipeline.push_default::<H>();
        self
    }

    #[must_use]
    pub fn build(self) -> Pipeline {
        self.pipeline
    }
}

/// Builds the application's standard pipeline.
///
/// Handler order (outermost to innermost):
/// 1. `ExceptionHandler` -- catches every fault raised below it
/// 2. `LoggingHandler` -- start/completion lines around everything else
/// 3. `AuthHandler` -- stops anonymous runs before any work is done
/// 4. `TimeoutHandler` -- deadline for the operation itself
/// 5. `CancellationHandler` -- honours a token carried by the context
#[must_use]
pub fn build_fleet_pipeline(
    config: &PipelineConfig,
    identity: Arc<dyn IdentitySource>,
    notifier: Arc<dyn Notifier>,
) -> Pipeline {
    PipelineBuilder::new()
        .with(ExceptionHandler::new(Arc::clone(&notifier)))
        .with(LoggingHandler)
        .with(AuthHandler::new(identity, notifier))
        .with(TimeoutHandler::new(config.operation_timeout))
        .with(CancellationHandler)
        .build()
}
