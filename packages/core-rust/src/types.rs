use std::fmt;

use serde::{Deserialize, Serialize};

/// Discriminant for the three entity kinds the fleet store manages.
///
/// The lowercase name doubles as the prefix of every request kind routed
/// through the handler pipeline (`"route.create"`, `"driver.list"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Route,
    Driver,
    Vehicle,
}

impl EntityKind {
    /// Stable lowercase name used in request kinds and log fields.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Route => "route",
            Self::Driver => "driver",
            Self::Vehicle => "vehicle",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of a planned route.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteStatus {
    #[default]
    Planned,
    Active,
    Completed,
    Cancelled,
}

/// A delivery route between two named locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// Store-assigned identifier. `0` until the route has been created.
    #[serde(default)]
    pub id: u64,
    pub name: String,
    pub origin: String,
    pub destination: String,
    pub distance_km: f64,
    pub estimated_minutes: u32,
    /// Driver assigned to the route, if any.
    #[serde(default)]
    pub driver_id: Option<u64>,
    /// Vehicle assigned to the route, if any.
    #[serde(default)]
    pub vehicle_id: Option<u64>,
    #[serde(default)]
    pub status: RouteStatus,
}

impl Route {
    /// Creates an unsaved, unassigned route in the `Planned` state.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        origin: impl Into<String>,
        destination: impl Into<String>,
        distance_km: f64,
        estimated_minutes: u32,
    ) -> Self {
        Self {
            id: 0,
            name: name.into(),
            origin: origin.into(),
            destination: destination.into(),
            distance_km,
            estimated_minutes,
            driver_id: None,
            vehicle_id: None,
            status: RouteStatus::Planned,
        }
    }
}

/// Availability of a driver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriverStatus {
    #[default]
    Available,
    OnRoute,
    OffDuty,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Driver {
    #[serde(default)]
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
    /// Upper-case licence number, e.g. `"DL-40021"`.
    pub license_number: String,
    pub phone: String,
    #[serde(default)]
    pub status: DriverStatus,
}

impl Driver {
    #[must_use]
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        license_number: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            id: 0,
            first_name: first_name.into(),
            last_name: last_name.into(),
            license_number: license_number.into(),
            phone: phone.into(),
            status: DriverStatus::Available,
        }
    }

    /// `"First Last"`, as shown in listings.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Service state of a vehicle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleStatus {
    #[default]
    Active,
    Maintenance,
    Retired,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    #[serde(default)]
    pub id: u64,
    pub plate_number: String,
    pub make: String,
    pub model: String,
    pub year: u16,
    pub capacity_kg: u32,
    #[serde(default)]
    pub status: VehicleStatus,
}

impl Vehicle {
    #[must_use]
    pub fn new(
        plate_number: impl Into<String>,
        make: impl Into<String>,
        model: impl Into<String>,
        year: u16,
        capacity_kg: u32,
    ) -> Self {
        Self {
            id: 0,
            plate_number: plate_number.into(),
            make: make.into(),
            model: model.into(),
            year,
            capacity_kg,
            status: VehicleStatus::Active,
        }
    }
}

/// Signed-in user on whose behalf operations run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Unique identifier of the user (login name).
    pub id: String,
    /// Name shown in notices and logs.
    pub display_name: String,
    /// Roles assigned to this principal for authorization checks.
    pub roles: Vec<String>,
}

impl Principal {
    /// Creates a principal without roles whose display name equals its id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            display_name: id.clone(),
            id,
            roles: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles = roles.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_kind_names_are_lowercase() {
        assert_eq!(EntityKind::Route.as_str(), "route");
        assert_eq!(EntityKind::Driver.to_string(), "driver");
        assert_eq!(
            serde_json::to_string(&EntityKind::Vehicle).unwrap(),
            "\"vehicle\""
        );
    }

    #[test]
    fn route_deserializes_without_optional_fields() {
        let json = r#"{
            "name": "North loop",
            "origin": "Depot A",
            "destination": "Harbour",
            "distance_km": 42.5,
            "estimated_minutes": 55
        }"#;
        let route: Route = serde_json::from_str(json).unwrap();
        assert_eq!(route.id, 0);
        assert_eq!(route.status, RouteStatus::Planned);
        assert!(route.driver_id.is_none());
    }

    #[test]
    fn principal_roles() {
        let p = Principal::new("dana").with_roles(["dispatcher"]);
        assert_eq!(p.display_name, "dana");
        assert!(p.has_role("dispatcher"));
        assert!(!p.has_role("admin"));
    }

    #[test]
    fn driver_full_name() {
        let d = Driver::new("Ada", "Moreno", "DL-40021", "+1 555 0100");
        assert_eq!(d.full_name(), "Ada Moreno");
    }
}
