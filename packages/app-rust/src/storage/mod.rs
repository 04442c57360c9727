//! Entity persistence.
//!
//! The pipeline treats the store as a black box exposing CRUD operations per
//! entity kind. [`Repository`] is that contract; [`MemoryRepository`] is the
//! bundled backend and [`FleetStore`] groups one repository per kind.

pub mod fleet_store;
pub mod memory;
pub mod repository;

use fleetline_core::EntityKind;

pub use fleet_store::{FleetEntity, FleetStore, Snapshot, StoreHealth};
pub use memory::MemoryRepository;
pub use repository::Repository;

/// Errors returned by repositories and snapshot I/O.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: u64 },
    #[error("cannot restore {kind} rows: {reason}")]
    InvalidRows { kind: EntityKind, reason: String },
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("snapshot i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot is not valid JSON: {0}")]
    Serde(#[from] serde_json::Error),
}
