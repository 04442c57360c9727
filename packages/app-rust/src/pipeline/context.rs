//! Per-run state threaded through every handler of a pipeline execution.

use std::any::Any;
use std::fmt;
use std::time::SystemTime;

use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::error::HandlerError;

type Payload = Box<dyn Any + Send + Sync>;

/// Mutable record passed by reference through one pipeline run.
///
/// The caller owns the context for the duration of the run; handlers only
/// borrow it and cannot keep it past their `handle` call.
pub struct Context {
    request_kind: String,
    payload: Option<Payload>,
    failure: Option<HandlerError>,
    handled: bool,
    timestamp: SystemTime,
    run_id: Uuid,
    cancellation: Option<CancellationToken>,
}

impl Context {
    /// Creates a context for the operation identified by `request_kind`
    /// (e.g. `"route.create"`). The creation timestamp is fixed here.
    #[must_use]
    pub fn new(request_kind: impl Into<String>) -> Self {
        Self {
            request_kind: request_kind.into(),
            payload: None,
            failure: None,
            handled: false,
            timestamp: SystemTime::now(),
            run_id: Uuid::new_v4(),
            cancellation: None,
        }
    }

    #[must_use]
    pub fn with_payload<T: Any + Send + Sync>(mut self, payload: T) -> Self {
        self.set_payload(payload);
        self
    }

    /// Attaches a token that [`CancellationHandler`](super::handlers::CancellationHandler)
    /// watches while the rest of the chain runs.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    #[must_use]
    pub fn request_kind(&self) -> &str {
        &self.request_kind
    }

    /// Correlation id for log lines emitted during this run.
    #[must_use]
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    #[must_use]
    pub fn timestamp(&self) -> SystemTime {
        self.timestamp
    }

    #[must_use]
    pub fn cancellation(&self) -> Option<&CancellationToken> {
        self.cancellation.as_ref()
    }

    // -- payload --------------------------------------------------------

    #[must_use]
    pub fn has_payload(&self) -> bool {
        self.payload.is_some()
    }

    /// Borrows the payload if it is a `T`.
    #[must_use]
    pub fn payload<T: Any>(&self) -> Option<&T> {
        self.payload.as_ref()?.downcast_ref::<T>()
    }

    pub fn payload_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.payload.as_mut()?.downcast_mut::<T>()
    }

    /// Replaces any existing payload.
    pub fn set_payload<T: Any + Send + Sync>(&mut self, payload: T) {
        self.payload = Some(Box::new(payload));
    }

    /// Moves the payload out if it is a `T`. A payload of another type stays in place.
    pub fn take_payload<T: Any>(&mut self) -> Option<T> {
        match self.payload.take()?.downcast::<T>() {
            Ok(value) => Some(*value),
            Err(other) => {
                self.payload = Some(other);
                None
            }
        }
    }

    pub fn clear_payload(&mut self) {
        self.payload = None;
    }

    // -- failure / handled ----------------------------------------------

    #[must_use]
    pub fn failure(&self) -> Option<&HandlerError> {
        self.failure.as_ref()
    }

    pub fn take_failure(&mut self) -> Option<HandlerError> {
        self.failure.take()
    }

    /// Records a caught fault. The first failure of a run is kept; a later
    /// one is logged and dropped. Returns whether `error` was recorded.
    pub fn record_failure(&mut self, error: HandlerError) -> bool {
        if let Some(existing) = &self.failure {
            tracing::warn!(
                kind = %self.request_kind,
                run_id = %self.run_id,
                existing = %existing,
                dropped = %error,
                "failure already recorded for this run"
            );
            return false;
        }
        self.failure = Some(error);
        true
    }

    #[must_use]
    pub fn is_handled(&self) -> bool {
        self.handled
    }

    /// Marks that terminal handling (a notice to the user) has happened.
    /// This does not stop traversal; only skipping `next` does.
    pub fn mark_handled(&mut self) {
        self.handled = true;
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("request_kind", &self.request_kind)
            .field("has_payload", &self.payload.is_some())
            .field("failure", &self.failure)
            .field("handled", &self.handled)
            .field("timestamp", &self.timestamp)
            .field("run_id", &self.run_id)
            .finish_non_exhaustive()
    }
}
