//! Cross-cutting handlers.
//!
//! - [`exception`]: failure boundary that records and reports faults
//! - [`logging`]: start/completion log lines with timing
//! - [`auth`]: stops runs when nobody is signed in
//! - [`timeout`]: deadline for the rest of the chain
//! - [`cancel`]: cooperative cancellation via the context's token

pub mod auth;
pub mod cancel;
pub mod exception;
pub mod logging;
pub mod timeout;

pub use auth::AuthHandler;
pub use cancel::CancellationHandler;
pub use exception::ExceptionHandler;
pub use logging::LoggingHandler;
pub use timeout::TimeoutHandler;
