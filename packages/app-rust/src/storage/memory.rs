//! In-memory [`Repository`] backed by an ordered map.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use fleetline_core::{Entity, Page, PageRequest};
use parking_lot::RwLock;

use super::repository::Repository;
use super::StoreError;

/// Repository holding entities in a `BTreeMap` keyed by id.
///
/// Ids start at 1 and are never reused. Readers share the lock; writers
/// take it exclusively for the duration of a single call.
pub struct MemoryRepository<E> {
    rows: RwLock<BTreeMap<u64, E>>,
    next_id: AtomicU64,
}

impl<E: Entity> MemoryRepository<E> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Restores previously stored entities, keeping their ids.
    /// New ids continue after the largest restored one.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidRows`] if a row has id 0 (never assigned),
    /// two rows share an id, or the largest id leaves no room for new ones.
    pub fn from_rows(rows: impl IntoIterator<Item = E>) -> Result<Self, StoreError> {
        let invalid = |reason: String| StoreError::InvalidRows {
            kind: E::KIND,
            reason,
        };

        let mut restored = BTreeMap::new();
        for entity in rows {
            let id = entity.id();
            if id == 0 {
                return Err(invalid("row without an id".to_string()));
            }
            if restored.insert(id, entity).is_some() {
                return Err(invalid(format!("duplicate id {id}")));
            }
        }

        let next_id = match restored.keys().next_back() {
            Some(max) => max
                .checked_add(1)
                .ok_or_else(|| invalid(format!("id {max} exhausts the id space")))?,
            None => 1,
        };
        Ok(Self {
            rows: RwLock::new(restored),
            next_id: AtomicU64::new(next_id),
        })
    }
}

impl<E: Entity> Default for MemoryRepository<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<E: Entity> Repository<E> for MemoryRepository<E> {
    async fn create(&self, mut entity: E) -> Result<E, StoreError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        entity.set_id(id);
        self.rows.write().insert(id, entity.clone());
        Ok(entity)
    }

    async fn read(&self, id: u64) -> Result<Option<E>, StoreError> {
        Ok(self.rows.read().get(&id).cloned())
    }

    async fn read_page(&self, request: PageRequest) -> Result<Page<E>, StoreError> {
        let rows = self.rows.read();
        let items = rows
            .values()
            .skip(request.offset())
            .take(request.size as usize)
            .cloned()
            .collect();
        Ok(Page::new(items, request, rows.len() as u64))
    }

    async fn update(&self, entity: E) -> Result<E, StoreError> {
        let mut rows = self.rows.write();
        match rows.get_mut(&entity.id()) {
            Some(slot) => {
                *slot = entity.clone();
                Ok(entity)
            }
            None => Err(StoreError::NotFound {
                kind: E::KIND,
                id: entity.id(),
            }),
        }
    }

    async fn delete(&self, id: u64) -> Result<(), StoreError> {
        match self.rows.write().remove(&id) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound { kind: E::KIND, id }),
        }
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.rows.read().len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use fleetline_core::{EntityKind, Vehicle};

    use super::*;

    fn vehicle(plate: &str) -> Vehicle {
        Vehicle::new(plate, "Volvo", "FH16", 2021, 18_000)
    }

    #[tokio::test]
    async fn create_assigns_sequential_ids() {
        let repo = MemoryRepository::new();
        let mut v = vehicle("AB 100");
        v.id = 99;
        let first = repo.create(v).await.unwrap();
        let second = repo.create(vehicle("AB 101")).await.unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn read_missing_is_none() {
        let repo: MemoryRepository<Vehicle> = MemoryRepository::new();
        assert!(repo.read(7).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_and_delete_missing_are_not_found() {
        let repo: MemoryRepository<Vehicle> = MemoryRepository::new();
        let mut ghost = vehicle("AB 100");
        ghost.id = 5;

        let err = repo.update(ghost).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::NotFound {
                kind: EntityKind::Vehicle,
                id: 5
            }
        ));
        assert!(matches!(
            repo.delete(5).await.unwrap_err(),
            StoreError::NotFound { id: 5, .. }
        ));
    }

    #[tokio::test]
    async fn update_replaces_stored_entity() {
        let repo = MemoryRepository::new();
        let mut v = repo.create(vehicle("AB 100")).await.unwrap();
        v.capacity_kg = 9_000;
        repo.update(v).await.unwrap();
        assert_eq!(repo.read(1).await.unwrap().unwrap().capacity_kg, 9_000);
    }

    #[tokio::test]
    async fn pages_follow_id_order() {
        let repo = MemoryRepository::new();
        for i in 0..5 {
            repo.create(vehicle(&format!("AB {i}"))).await.unwrap();
        }
        repo.delete(2).await.unwrap();

        let page = repo.read_page(PageRequest::new(2, 2)).await.unwrap();
        let ids: Vec<u64> = page.items.iter().map(|v| v.id).collect();
        assert_eq!(ids, [4, 5]);
        assert_eq!(page.total, 4);
        assert!(!page.has_next());

        let beyond = repo.read_page(PageRequest::new(9, 2)).await.unwrap();
        assert!(beyond.items.is_empty());
    }

    #[tokio::test]
    async fn restored_rows_keep_ids() {
        let mut a = vehicle("AB 1");
        a.id = 3;
        let mut b = vehicle("AB 2");
        b.id = 8;
        let repo = MemoryRepository::from_rows([a, b]).unwrap();
        assert_eq!(repo.read(8).await.unwrap().unwrap().plate_number, "AB 2");
        assert_eq!(repo.create(vehicle("AB 3")).await.unwrap().id, 9);
    }

    #[test]
    fn restoring_rows_without_ids_is_rejected() {
        let err = MemoryRepository::from_rows([vehicle("AB 1"), vehicle("AB 2")])
            .err()
            .unwrap();
        assert!(matches!(
            err,
            StoreError::InvalidRows {
                kind: EntityKind::Vehicle,
                ..
            }
        ));
    }

    #[test]
    fn restoring_duplicate_ids_is_rejected() {
        let mut a = vehicle("AB 1");
        a.id = 4;
        let mut b = vehicle("AB 2");
        b.id = 4;
        let err = MemoryRepository::from_rows([a, b]).err().unwrap();
        assert_eq!(err.to_string(), "cannot restore vehicle rows: duplicate id 4");
    }

    #[test]
    fn restoring_the_largest_id_is_rejected() {
        let mut v = vehicle("AB 1");
        v.id = u64::MAX;
        let err = MemoryRepository::from_rows([v]).err().unwrap();
        assert!(matches!(err, StoreError::InvalidRows { .. }));
    }
}
