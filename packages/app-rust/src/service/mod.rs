//! Fleet operations exposed to the shell.
//!
//! - [`operation`]: request kinds, CRUD verbs, and [`Outcome`]
//! - [`endpoints`]: terminal steps that touch the store or the AI client
//! - [`fleet`]: [`FleetService`], which runs each call through the pipeline

pub mod endpoints;
pub mod fleet;
pub mod operation;

pub use endpoints::{AnalyzeEndpoint, CrudEndpoint, Reply};
pub use fleet::FleetService;
pub use operation::{request_kind, CrudOp, Outcome, AI_ANALYZE};
