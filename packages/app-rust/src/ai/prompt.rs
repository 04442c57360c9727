//! Fleet summary fed to the analytics prompt.

use std::fmt::Write as _;

use fleetline_core::{DriverStatus, RouteStatus, VehicleStatus};
use serde::Serialize;

use crate::storage::repository::read_all;
use crate::storage::{FleetStore, StoreError};

/// Page size used while aggregating.
const SUMMARY_PAGE_SIZE: u32 = 500;

/// Aggregate figures describing the fleet.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FleetSummary {
    pub routes: u64,
    pub active_routes: u64,
    pub planned_routes: u64,
    pub total_distance_km: f64,
    pub drivers: u64,
    pub available_drivers: u64,
    pub vehicles: u64,
    pub vehicles_in_maintenance: u64,
    pub unassigned_routes: u64,
}

impl FleetSummary {
    /// Walks the store and aggregates the figures.
    ///
    /// # Errors
    ///
    /// Returns the first repository error.
    pub async fn collect(store: &FleetStore) -> Result<Self, StoreError> {
        let routes = read_all(store.routes().as_ref(), SUMMARY_PAGE_SIZE).await?;
        let drivers = read_all(store.drivers().as_ref(), SUMMARY_PAGE_SIZE).await?;
        let vehicles = read_all(store.vehicles().as_ref(), SUMMARY_PAGE_SIZE).await?;

        let count = |n: usize| n as u64;
        Ok(Self {
            routes: count(routes.len()),
            active_routes: count(routes.iter().filter(|r| r.status == RouteStatus::Active).count()),
            planned_routes: count(routes.iter().filter(|r| r.status == RouteStatus::Planned).count()),
            total_distance_km: routes.iter().map(|r| r.distance_km).sum(),
            drivers: count(drivers.len()),
            available_drivers: count(
                drivers
                    .iter()
                    .filter(|d| d.status == DriverStatus::Available)
                    .count(),
            ),
            vehicles: count(vehicles.len()),
            vehicles_in_maintenance: count(
                vehicles
                    .iter()
                    .filter(|v| v.status == VehicleStatus::Maintenance)
                    .count(),
            ),
            unassigned_routes: count(
                routes
                    .iter()
                    .filter(|r| r.driver_id.is_none() || r.vehicle_id.is_none())
                    .count(),
            ),
        })
    }
}

/// Renders the summary and the user's question as a single prompt.
#[must_use]
pub fn build_analysis_prompt(summary: &FleetSummary, question: &str) -> String {
    let mut prompt = String::from("Fleet data:\n");
    let _ = writeln!(
        prompt,
        "- routes: {} ({} active, {} planned, {} without driver or vehicle)",
        summary.routes, summary.active_routes, summary.planned_routes, summary.unassigned_routes
    );
    let _ = writeln!(
        prompt,
        "- total planned distance: {:.1} km",
        summary.total_distance_km
    );
    let _ = writeln!(
        prompt,
        "- drivers: {} ({} available)",
        summary.drivers, summary.available_drivers
    );
    let _ = writeln!(
        prompt,
        "- vehicles: {} ({} in maintenance)",
        summary.vehicles, summary.vehicles_in_maintenance
    );
    let _ = write!(prompt, "\nQuestion: {}", question.trim());
    prompt
}
