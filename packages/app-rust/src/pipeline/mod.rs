//! Handler pipeline: ordered chain-of-responsibility over a per-run [`Context`].
//!
//! - [`context`]: per-run state shared by all handlers
//! - [`handler`]: the [`Handler`] contract and the [`Next`] continuation
//! - [`engine`]: [`Pipeline`], which owns the handlers and drives a run
//! - [`builder`]: fluent composition and the standard application chain
//! - [`handlers`]: exception, logging, auth, timeout, and cancellation
//!
//! A run enters handlers in registration order and unwinds in reverse. Any
//! handler can stop the run by not calling `next`.

pub mod builder;
pub mod context;
pub mod engine;
pub mod error;
pub mod handler;
pub mod handlers;

pub use builder::{build_fleet_pipeline, PipelineBuilder};
pub use context::Context;
pub use engine::Pipeline;
pub use error::HandlerError;
pub use handler::{handler_fn, BoxFuture, FnHandler, Handler, HandlerResult, Next};
