//! Validation rules for fleet entities.
//!
//! Every entity is checked before it is written to the store. Rules collect
//! all violations instead of stopping at the first one so the shell can show
//! the user a complete list.

use std::sync::LazyLock;

use regex::Regex;

use crate::types::{Driver, Route, Vehicle};

/// Maximum length of free-text fields (names, locations, makes).
pub const MAX_TEXT_LEN: usize = 100;

/// Oldest model year accepted for a vehicle.
pub const MIN_VEHICLE_YEAR: u16 = 1980;

/// Newest model year accepted for a vehicle.
pub const MAX_VEHICLE_YEAR: u16 = 2100;

static LICENSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z0-9-]{5,20}$").expect("valid licence pattern"));
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9 ()-]{7,20}$").expect("valid phone pattern"));
static PLATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z0-9 -]{2,10}$").expect("valid plate pattern"));

/// Result of validating a value against its rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    /// The value conforms to every rule.
    Valid,
    /// The value violates one or more rules.
    Invalid {
        /// Human-readable descriptions of each validation failure.
        errors: Vec<String>,
    },
}

impl ValidationResult {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Violations, empty when valid.
    #[must_use]
    pub fn errors(&self) -> &[String] {
        match self {
            Self::Valid => &[],
            Self::Invalid { errors } => errors,
        }
    }
}

/// Accumulates rule violations for one value.
#[derive(Debug, Default)]
pub struct Violations {
    errors: Vec<String>,
}

impl Violations {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `message` unless `ok` holds.
    pub fn check(&mut self, ok: bool, message: impl Into<String>) -> &mut Self {
        if !ok {
            self.errors.push(message.into());
        }
        self
    }

    /// Requires a non-blank value of at most [`MAX_TEXT_LEN`] characters.
    pub fn required_text(&mut self, field: &str, value: &str) -> &mut Self {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            self.errors.push(format!("{field} is required"));
        } else if trimmed.chars().count() > MAX_TEXT_LEN {
            self.errors
                .push(format!("{field} must be at most {MAX_TEXT_LEN} characters"));
        }
        self
    }

    /// Requires `value` to match `pattern`. Blank values only report as required.
    pub fn pattern(&mut self, field: &str, value: &str, pattern: &Regex) -> &mut Self {
        if value.trim().is_empty() {
            self.errors.push(format!("{field} is required"));
        } else if !pattern.is_match(value) {
            self.errors.push(format!("{field} has an invalid format"));
        }
        self
    }

    #[must_use]
    pub fn finish(&mut self) -> ValidationResult {
        if self.errors.is_empty() {
            ValidationResult::Valid
        } else {
            ValidationResult::Invalid {
                errors: std::mem::take(&mut self.errors),
            }
        }
    }
}

#[must_use]
pub fn validate_route(route: &Route) -> ValidationResult {
    Violations::new()
        .required_text("name", &route.name)
        .required_text("origin", &route.origin)
        .required_text("destination", &route.destination)
        .check(
            route.origin.trim().is_empty()
                || !route
                    .origin
                    .trim()
                    .eq_ignore_ascii_case(route.destination.trim()),
            "origin and destination must differ",
        )
        .check(
            route.distance_km.is_finite() && route.distance_km > 0.0,
            "distance_km must be a positive number",
        )
        .check(
            route.estimated_minutes > 0,
            "estimated_minutes must be greater than zero",
        )
        .finish()
}

#[must_use]
pub fn validate_driver(driver: &Driver) -> ValidationResult {
    Violations::new()
        .required_text("first_name", &driver.first_name)
        .required_text("last_name", &driver.last_name)
        .pattern("license_number", &driver.license_number, &LICENSE_RE)
        .pattern("phone", &driver.phone, &PHONE_RE)
        .finish()
}

#[must_use]
pub fn validate_vehicle(vehicle: &Vehicle) -> ValidationResult {
    Violations::new()
        .pattern("plate_number", &vehicle.plate_number, &PLATE_RE)
        .required_text("make", &vehicle.make)
        .required_text("model", &vehicle.model)
        .check(
            (MIN_VEHICLE_YEAR..=MAX_VEHICLE_YEAR).contains(&vehicle.year),
            format!("year must be between {MIN_VEHICLE_YEAR} and {MAX_VEHICLE_YEAR}"),
        )
        .check(
            vehicle.capacity_kg > 0,
            "capacity_kg must be greater than zero",
        )
        .finish()
}
