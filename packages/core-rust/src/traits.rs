use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::schema::{validate_driver, validate_route, validate_vehicle, ValidationResult};
use crate::types::{Driver, EntityKind, Route, Vehicle};

/// A persistable fleet record with a store-assigned numeric id.
pub trait Entity: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// Which kind of record this is; prefixes request kinds.
    const KIND: EntityKind;

    /// Store-assigned id, `0` for records that have not been created yet.
    fn id(&self) -> u64;

    fn set_id(&mut self, id: u64);

    /// Checks the record against its validation rules.
    fn validate(&self) -> ValidationResult;
}

impl Entity for Route {
    const KIND: EntityKind = EntityKind::Route;

    fn id(&self) -> u64 {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = id;
    }

    fn validate(&self) -> ValidationResult {
        validate_route(self)
    }
}

impl Entity for Driver {
    const KIND: EntityKind = EntityKind::Driver;

    fn id(&self) -> u64 {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = id;
    }

    fn validate(&self) -> ValidationResult {
        validate_driver(self)
    }
}

impl Entity for Vehicle {
    const KIND: EntityKind = EntityKind::Vehicle;

    fn id(&self) -> u64 {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = id;
    }

    fn validate(&self) -> ValidationResult {
        validate_vehicle(self)
    }
}
