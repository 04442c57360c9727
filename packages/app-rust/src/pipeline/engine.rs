//! Chain execution: an ordered list of handlers run as nested continuations.

use std::sync::Arc;

use super::context::Context;
use super::handler::{handler_fn, BoxFuture, Handler, HandlerResult, Next};

/// Ordered sequence of [`Handler`]s.
///
/// Insertion order is execution order on the way in; the code each handler
/// runs after `next` executes in reverse order on the way out. Registration
/// takes `&mut self` and execution takes `&self`, so once a pipeline is
/// shared (typically as `Arc<Pipeline>`) its handler list is frozen and any
/// number of runs may read it concurrently.
#[derive(Default)]
pub struct Pipeline {
    handlers: Vec<Arc<dyn Handler>>,
}

impl Pipeline {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a handler. Duplicates are allowed.
    pub fn push<H: Handler + 'static>(&mut self, handler: H) -> &mut Self {
        self.handlers.push(Arc::new(handler));
        self
    }

    /// Appends a handler that is already shared with other pipelines.
    pub fn push_arc(&mut self, handler: Arc<dyn Handler>) -> &mut Self {
        self.handlers.push(handler);
        self
    }

    /// Appends a closure handler; see [`handler_fn`].
    pub fn push_fn<F>(&mut self, name: &'static str, f: F) -> &mut Self
    where
        F: for<'a> Fn(&'a mut Context, Next<'a>) -> BoxFuture<'a, HandlerResult>
            + Send
            + Sync
            + 'static,
    {
        self.push(handler_fn(name, f))
    }

    /// Appends a default-constructed `H`.
    pub fn push_default<H: Handler + Default + 'static>(&mut self) -> &mut Self {
        self.push(H::default())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Handler names in execution order.
    #[must_use]
    pub fn handler_names(&self) -> Vec<&'static str> {
        self.handlers.iter().map(|h| h.name()).collect()
    }

    /// Runs the chain from the first handler.
    ///
    /// # Errors
    ///
    /// Returns the first fault that no handler recovered from.
    pub async fn execute(&self, ctx: &mut Context) -> HandlerResult {
        Next::start(&self.handlers, None).run(ctx).await
    }

    /// Runs the chain with `endpoint` as its innermost step.
    ///
    /// The endpoint only runs if every registered handler continued the chain.
    ///
    /// # Errors
    ///
    /// Returns the first fault that no handler recovered from.
    pub async fn execute_with(&self, ctx: &mut Context, endpoint: &dyn Handler) -> HandlerResult {
        Next::start(&self.handlers, Some(endpoint)).run(ctx).await
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("handlers", &self.handler_names())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
