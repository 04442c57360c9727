use fleetline_core::Entity;

use crate::pipeline::HandlerError;

/// Request kind of the AI analytics operation.
pub const AI_ANALYZE: &str = "ai.analyze";

/// The CRUD operations every entity kind supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrudOp {
    Create,
    Read,
    List,
    Update,
    Delete,
    Count,
}

impl CrudOp {
    #[must_use]
    pub fn verb(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::List => "list",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Count => "count",
        }
    }
}

/// `"<entity>.<verb>"`, e.g. `"route.create"`.
#[must_use]
pub fn request_kind<E: Entity>(op: CrudOp) -> String {
    format!("{}.{}", E::KIND.as_str(), op.verb())
}

/// How a service call ended.
#[derive(Debug)]
pub enum Outcome<T> {
    /// The operation ran and produced a value.
    Completed(T),
    /// A handler stopped the run before the operation ran (e.g. sign-in required).
    ShortCircuited,
    /// A fault was caught by a failure boundary and already reported to the user.
    Failed(HandlerError),
}

impl<T> Outcome<T> {
    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    /// The value, if the operation completed.
    pub fn completed(self) -> Option<T> {
        match self {
            Self::Completed(value) => Some(value),
            Self::ShortCircuited | Self::Failed(_) => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Self::Completed(value) => Outcome::Completed(f(value)),
            Self::ShortCircuited => Outcome::ShortCircuited,
            Self::Failed(e) => Outcome::Failed(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use fleetline_core::{Driver, Route};

    use super::*;

    #[test]
    fn request_kinds() {
        assert_eq!(request_kind::<Route>(CrudOp::Create), "route.create");
        assert_eq!(request_kind::<Driver>(CrudOp::List), "driver.list");
    }

    #[test]
    fn outcome_helpers() {
        assert_eq!(Outcome::Completed(2).map(|n| n * 2).completed(), Some(4));
        assert!(Outcome::<u8>::ShortCircuited.completed().is_none());
        assert!(!Outcome::<u8>::Failed(HandlerError::Cancelled).is_completed());
    }
}
