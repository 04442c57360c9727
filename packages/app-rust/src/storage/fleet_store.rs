//! One repository per entity kind, plus health checks and JSON snapshots.

use std::path::Path;
use std::sync::Arc;
use std::time::SystemTime;

use fleetline_core::{Driver, Entity, Route, Vehicle};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::memory::MemoryRepository;
use super::repository::{read_all, Repository};
use super::StoreError;

/// Page size used when walking a repository for a snapshot.
const SNAPSHOT_PAGE_SIZE: u32 = 500;

/// The application's store: routes, drivers, and vehicles.
#[derive(Clone)]
pub struct FleetStore {
    routes: Arc<dyn Repository<Route>>,
    drivers: Arc<dyn Repository<Driver>>,
    vehicles: Arc<dyn Repository<Vehicle>>,
}

impl FleetStore {
    #[must_use]
    pub fn new(
        routes: Arc<dyn Repository<Route>>,
        drivers: Arc<dyn Repository<Driver>>,
        vehicles: Arc<dyn Repository<Vehicle>>,
    ) -> Self {
        Self {
            routes,
            drivers,
            vehicles,
        }
    }

    /// Empty store backed by [`MemoryRepository`].
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(MemoryRepository::<Route>::new()),
            Arc::new(MemoryRepository::<Driver>::new()),
            Arc::new(MemoryRepository::<Vehicle>::new()),
        )
    }

    /// In-memory store holding the snapshot's entities with their ids.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidRows`] if any entity list cannot be
    /// restored as-is (missing or duplicate ids).
    pub fn from_snapshot(snapshot: Snapshot) -> Result<Self, StoreError> {
        Ok(Self::new(
            Arc::new(MemoryRepository::from_rows(snapshot.routes)?),
            Arc::new(MemoryRepository::from_rows(snapshot.drivers)?),
            Arc::new(MemoryRepository::from_rows(snapshot.vehicles)?),
        ))
    }

    #[must_use]
    pub fn routes(&self) -> &Arc<dyn Repository<Route>> {
        &self.routes
    }

    #[must_use]
    pub fn drivers(&self) -> &Arc<dyn Repository<Driver>> {
        &self.drivers
    }

    #[must_use]
    pub fn vehicles(&self) -> &Arc<dyn Repository<Vehicle>> {
        &self.vehicles
    }

    /// Probes every repository with a count.
    ///
    /// Never fails: an unreachable repository is reported in the result.
    pub async fn health(&self) -> StoreHealth {
        let checked_at = SystemTime::now();
        let counts = async {
            Ok::<_, StoreError>((
                self.routes.count().await?,
                self.drivers.count().await?,
                self.vehicles.count().await?,
            ))
        }
        .await;

        match counts {
            Ok((routes, drivers, vehicles)) => StoreHealth {
                ok: true,
                routes,
                drivers,
                vehicles,
                checked_at,
                error: None,
            },
            Err(e) => {
                warn!(error = %e, "store health check failed");
                StoreHealth {
                    ok: false,
                    routes: 0,
                    drivers: 0,
                    vehicles: 0,
                    checked_at,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    /// Copies every entity out of the store.
    ///
    /// # Errors
    ///
    /// Returns the first repository error.
    pub async fn snapshot(&self) -> Result<Snapshot, StoreError> {
        Ok(Snapshot {
            routes: read_all(self.routes.as_ref(), SNAPSHOT_PAGE_SIZE).await?,
            drivers: read_all(self.drivers.as_ref(), SNAPSHOT_PAGE_SIZE).await?,
            vehicles: read_all(self.vehicles.as_ref(), SNAPSHOT_PAGE_SIZE).await?,
        })
    }

    /// Writes the store to `path` as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if reading the store, serializing, or writing fails.
    pub async fn save_snapshot(&self, path: &Path) -> Result<(), StoreError> {
        let snapshot = self.snapshot().await?;
        let json = serde_json::to_vec_pretty(&snapshot)?;
        tokio::fs::write(path, json).await?;
        info!(
            path = %path.display(),
            routes = snapshot.routes.len(),
            drivers = snapshot.drivers.len(),
            vehicles = snapshot.vehicles.len(),
            "snapshot saved"
        );
        Ok(())
    }

    /// Loads an in-memory store from `path`; a missing file yields an empty store.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read, parsed, or
    /// restored without losing rows.
    pub async fn load_snapshot(path: &Path) -> Result<Self, StoreError> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "no snapshot yet, starting empty");
                return Ok(Self::in_memory());
            }
            Err(e) => return Err(e.into()),
        };
        let snapshot: Snapshot = serde_json::from_slice(&bytes)?;
        Self::from_snapshot(snapshot)
    }
}

impl std::fmt::Debug for FleetStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FleetStore").finish_non_exhaustive()
    }
}

/// Result of [`FleetStore::health`].
#[derive(Debug, Clone, Serialize)]
pub struct StoreHealth {
    pub ok: bool,
    pub routes: u64,
    pub drivers: u64,
    pub vehicles: u64,
    pub checked_at: SystemTime,
    pub error: Option<String>,
}

/// Serialized form of the whole store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub routes: Vec<Route>,
    #[serde(default)]
    pub drivers: Vec<Driver>,
    #[serde(default)]
    pub vehicles: Vec<Vehicle>,
}

/// Binds an entity type to its repository in a [`FleetStore`].
pub trait FleetEntity: Entity {
    fn repository(store: &FleetStore) -> Arc<dyn Repository<Self>>;
}

impl FleetEntity for Route {
    fn repository(store: &FleetStore) -> Arc<dyn Repository<Self>> {
        Arc::clone(&store.routes)
    }
}

impl FleetEntity for Driver {
    fn repository(store: &FleetStore) -> Arc<dyn Repository<Self>> {
        Arc::clone(&store.drivers)
    }
}

impl FleetEntity for Vehicle {
    fn repository(store: &FleetStore) -> Arc<dyn Repository<Self>> {
        Arc::clone(&store.vehicles)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use fleetline_core::{Page, PageRequest};

    use super::*;

    async fn seeded() -> FleetStore {
        let store = FleetStore::in_memory();
        store
            .routes()
            .create(Route::new("North loop", "Depot A", "Harbour", 42.5, 55))
            .await
            .unwrap();
        store
            .drivers()
            .create(Driver::new("Ada", "Moreno", "DL-40021", "+1 555 0100"))
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn health_reports_counts() {
        let health = seeded().await.health().await;
        assert!(health.ok);
        assert_eq!((health.routes, health.drivers, health.vehicles), (1, 1, 0));
        assert!(health.error.is_none());
    }

    struct DownRepository;

    #[async_trait]
    impl Repository<Vehicle> for DownRepository {
        async fn create(&self, _entity: Vehicle) -> Result<Vehicle, StoreError> {
            Err(StoreError::Unavailable("down".into()))
        }
        async fn read(&self, _id: u64) -> Result<Option<Vehicle>, StoreError> {
            Err(StoreError::Unavailable("down".into()))
        }
        async fn read_page(&self, _request: PageRequest) -> Result<Page<Vehicle>, StoreError> {
            Err(StoreError::Unavailable("down".into()))
        }
        async fn update(&self, _entity: Vehicle) -> Result<Vehicle, StoreError> {
            Err(StoreError::Unavailable("down".into()))
        }
        async fn delete(&self, _id: u64) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("down".into()))
        }
        async fn count(&self) -> Result<u64, StoreError> {
            Err(StoreError::Unavailable("down".into()))
        }
    }

    #[tokio::test]
    async fn health_reports_unreachable_repository() {
        let healthy = FleetStore::in_memory();
        let store = FleetStore::new(
            Arc::clone(healthy.routes()),
            Arc::clone(healthy.drivers()),
            Arc::new(DownRepository),
        );
        let health = store.health().await;
        assert!(!health.ok);
        assert_eq!(health.error.as_deref(), Some("store unavailable: down"));
    }

    #[tokio::test]
    async fn snapshot_survives_a_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fleet.json");

        let store = seeded().await;
        store.save_snapshot(&path).await.unwrap();

        let restored = FleetStore::load_snapshot(&path).await.unwrap();
        assert_eq!(restored.snapshot().await.unwrap(), store.snapshot().await.unwrap());
        // Ids continue after the restored ones.
        let next = restored
            .routes()
            .create(Route::new("South loop", "Depot B", "Airport", 12.0, 20))
            .await
            .unwrap();
        assert_eq!(next.id, 2);
    }

    #[tokio::test]
    async fn missing_snapshot_file_means_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = FleetStore::load_snapshot(&dir.path().join("absent.json"))
            .await
            .unwrap();
        assert_eq!(store.snapshot().await.unwrap(), Snapshot::default());
    }

    #[tokio::test]
    async fn snapshot_rows_without_ids_are_not_collapsed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fleet.json");
        let json = serde_json::json!({
            "routes": [
                { "name": "A", "origin": "Depot A", "destination": "Harbour",
                  "distance_km": 10.0, "estimated_minutes": 15 },
                { "name": "B", "origin": "Depot B", "destination": "Airport",
                  "distance_km": 20.0, "estimated_minutes": 25 }
            ]
        });
        std::fs::write(&path, serde_json::to_vec(&json).unwrap()).unwrap();

        let err = FleetStore::load_snapshot(&path).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::InvalidRows {
                kind: fleetline_core::EntityKind::Route,
                ..
            }
        ));
        // The file is left untouched for the user to repair.
        let on_disk: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(on_disk, json);
    }

    #[test]
    fn snapshot_with_largest_id_is_rejected_without_panicking() {
        let mut route = Route::new("Edge", "Depot A", "Harbour", 1.0, 1);
        route.id = u64::MAX;
        let snapshot = Snapshot {
            routes: vec![route],
            ..Snapshot::default()
        };
        assert!(matches!(
            FleetStore::from_snapshot(snapshot).unwrap_err(),
            StoreError::InvalidRows { .. }
        ));
    }

    #[tokio::test]
    async fn corrupt_snapshot_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fleet.json");
        std::fs::write(&path, b"{ not json").unwrap();
        assert!(matches!(
            FleetStore::load_snapshot(&path).await.unwrap_err(),
            StoreError::Serde(_)
        ));
    }
}
