//! Fleetline core: fleet entities (routes, drivers, vehicles), validation rules, and paging.

pub mod paging;
pub mod schema;
pub mod traits;
pub mod types;

pub use paging::{Page, PageRequest};
pub use schema::{ValidationResult, Violations};
pub use traits::Entity;
pub use types::{
    Driver, DriverStatus, EntityKind, Principal, Route, RouteStatus, Vehicle, VehicleStatus,
};
