//! The handler contract and the continuation passed to each handler.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;

use super::context::Context;
use super::error::HandlerError;

pub type HandlerResult = Result<(), HandlerError>;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

// ---------------------------------------------------------------------------
// Handler trait
// ---------------------------------------------------------------------------

/// One unit of cross-cutting behaviour in a [`Pipeline`](super::Pipeline).
///
/// A handler may do work before and after calling `next.run(ctx)`, or return
/// without calling it to stop the chain. Handlers are shared by every run of
/// the pipeline they are registered with, so they hold configuration only and
/// keep per-run state in the [`Context`].
#[async_trait]
pub trait Handler: Send + Sync {
    /// Short name used in logs (e.g. `"logging"`).
    fn name(&self) -> &'static str;

    /// Processes one run.
    ///
    /// # Errors
    ///
    /// Returns the handler's own fault, or the fault returned by `next.run`
    /// when the handler does not recover from it.
    async fn handle(&self, ctx: &mut Context, next: Next<'_>) -> HandlerResult;
}

// ---------------------------------------------------------------------------
// Next
// ---------------------------------------------------------------------------

/// Continuation to the rest of the chain.
///
/// Holds the run's cursor: a borrowed view of the registered handlers, an
/// optional terminal endpoint, and the index of the handler to call next.
/// A fresh `Next` is created for every execution, so concurrent runs through
/// one pipeline never share a cursor. `run` consumes the continuation, so a
/// handler can continue the chain at most once; dropping it short-circuits.
pub struct Next<'a> {
    chain: &'a [Arc<dyn Handler>],
    endpoint: Option<&'a dyn Handler>,
    index: usize,
}

impl<'a> Next<'a> {
    pub(crate) fn start(chain: &'a [Arc<dyn Handler>], endpoint: Option<&'a dyn Handler>) -> Self {
        Self {
            chain,
            endpoint,
            index: 0,
        }
    }

    /// Position of the handler this continuation will call.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Whether calling [`run`](Self::run) would invoke anything.
    #[must_use]
    pub fn is_end(&self) -> bool {
        self.index >= self.chain.len() && self.endpoint.is_none()
    }

    /// Invokes the next handler, or does nothing at the end of the chain.
    ///
    /// # Errors
    ///
    /// Propagates whatever the rest of the chain returns.
    pub async fn run(self, ctx: &mut Context) -> HandlerResult {
        if let Some(handler) = self.chain.get(self.index) {
            let rest = Next {
                chain: self.chain,
                endpoint: self.endpoint,
                index: self.index + 1,
            };
            tracing::trace!(handler = handler.name(), index = self.index, "entering handler");
            return handler.handle(ctx, rest).await;
        }

        match self.endpoint {
            Some(endpoint) => {
                let rest = Next {
                    chain: self.chain,
                    endpoint: None,
                    index: self.index + 1,
                };
                tracing::trace!(endpoint = endpoint.name(), "entering endpoint");
                endpoint.handle(ctx, rest).await
            }
            None => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Closure handlers
// ---------------------------------------------------------------------------

/// Handler backed by a closure; see [`handler_fn`].
pub struct FnHandler<F> {
    name: &'static str,
    f: F,
}

/// Wraps a closure as a [`Handler`].
///
/// ```ignore
/// let stamp = handler_fn("stamp", |ctx, next| {
///     Box::pin(async move {
///         ctx.set_payload("X".to_string());
///         next.run(ctx).await
///     })
/// });
/// ```
pub fn handler_fn<F>(name: &'static str, f: F) -> FnHandler<F>
where
    F: for<'a> Fn(&'a mut Context, Next<'a>) -> BoxFuture<'a, HandlerResult> + Send + Sync,
{
    FnHandler { name, f }
}

#[async_trait]
impl<F> Handler for FnHandler<F>
where
    F: for<'a> Fn(&'a mut Context, Next<'a>) -> BoxFuture<'a, HandlerResult> + Send + Sync,
{
    fn name(&self) -> &'static str {
        self.name
    }

    async fn handle(&self, ctx: &mut Context, next: Next<'_>) -> HandlerResult {
        (self.f)(ctx, next).await
    }
}
