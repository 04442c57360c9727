use async_trait::async_trait;
use fleetline_core::{Entity, Page, PageRequest};

use super::StoreError;

/// CRUD access to one kind of entity.
///
/// Implementations provide their own consistency guarantees; callers only
/// rely on each call being atomic.
#[async_trait]
pub trait Repository<E: Entity>: Send + Sync {
    /// Stores a new entity under a freshly assigned id and returns it.
    /// Any id already set on `entity` is ignored.
    async fn create(&self, entity: E) -> Result<E, StoreError>;

    /// Loads an entity, or `None` if no entity has this id.
    async fn read(&self, id: u64) -> Result<Option<E>, StoreError>;

    /// Loads one page of entities in id order.
    async fn read_page(&self, request: PageRequest) -> Result<Page<E>, StoreError>;

    /// Replaces the stored entity with the same id.
    ///
    /// Fails with [`StoreError::NotFound`] if there is none.
    async fn update(&self, entity: E) -> Result<E, StoreError>;

    /// Removes an entity.
    ///
    /// Fails with [`StoreError::NotFound`] if there is none.
    async fn delete(&self, id: u64) -> Result<(), StoreError>;

    async fn count(&self) -> Result<u64, StoreError>;
}

/// Reads every entity by walking pages of `page_size`.
///
/// # Errors
///
/// Returns the first repository error.
pub async fn read_all<E: Entity>(
    repo: &dyn Repository<E>,
    page_size: u32,
) -> Result<Vec<E>, StoreError> {
    let mut all = Vec::new();
    let mut request = PageRequest::new(1, page_size);
    loop {
        let page = repo.read_page(request).await?;
        let more = page.has_next();
        all.extend(page.items);
        if !more {
            return Ok(all);
        }
        request = PageRequest::new(request.page + 1, request.size);
    }
}
