use async_trait::async_trait;
use thiserror::Error;

use tours_catalog::{
    NewSalida, NewTour, NewUser, NewZone, Salida, Tour, TourPatch, User, UserPatch, Zone,
    ZonePatch, ZoneRole,
};
use tours_core::{TourId, UserId, ZoneId};

/// Result type for record store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Record store failure.
///
/// Missing records are not errors: lookups return `Option`, deletes return
/// whether a row was removed.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A write would break a relation (e.g. a tour pointing at a missing zone).
    #[error("integrity error: {0}")]
    Integrity(String),

    /// The backing database rejected or failed the operation.
    #[error("database error in {operation}: {source}")]
    Database {
        operation: &'static str,
        #[source]
        source: sqlx::Error,
    },

    /// The in-memory store's lock was poisoned by a panicking writer.
    #[error("record store lock poisoned")]
    Poisoned,
}

impl StoreError {
    pub fn integrity(msg: impl Into<String>) -> Self {
        Self::Integrity(msg.into())
    }
}

/// Persistence boundary for the catalog records.
///
/// All list operations return rows ordered by id ascending. Updates take a
/// patch and return `None` when the id does not exist. Deletes return `true`
/// only when a row was removed; deleting a zone removes the tours that
/// reference it, and deleting a tour removes its salidas.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn list_users(&self) -> StoreResult<Vec<User>>;
    async fn get_user(&self, id: UserId) -> StoreResult<Option<User>>;
    async fn create_user(&self, new: NewUser) -> StoreResult<User>;
    async fn update_user(&self, id: UserId, patch: &UserPatch) -> StoreResult<Option<User>>;
    async fn delete_user(&self, id: UserId) -> StoreResult<bool>;

    async fn list_zones(&self) -> StoreResult<Vec<Zone>>;
    async fn get_zone(&self, id: ZoneId) -> StoreResult<Option<Zone>>;
    async fn create_zone(&self, new: NewZone) -> StoreResult<Zone>;
    async fn update_zone(&self, id: ZoneId, patch: &ZonePatch) -> StoreResult<Option<Zone>>;
    async fn delete_zone(&self, id: ZoneId) -> StoreResult<bool>;

    async fn list_tours(&self) -> StoreResult<Vec<Tour>>;
    async fn get_tour(&self, id: TourId) -> StoreResult<Option<Tour>>;
    /// Fails with [`StoreError::Integrity`] when a referenced zone is missing.
    async fn create_tour(&self, new: NewTour) -> StoreResult<Tour>;
    /// Fails with [`StoreError::Integrity`] when a referenced zone is missing.
    async fn update_tour(&self, id: TourId, patch: &TourPatch) -> StoreResult<Option<Tour>>;
    async fn delete_tour(&self, id: TourId) -> StoreResult<bool>;
    /// Tours whose departure (or arrival) zone is `zone`.
    async fn tours_for_zone(&self, zone: ZoneId, role: ZoneRole) -> StoreResult<Vec<Tour>>;

    async fn list_salidas(&self) -> StoreResult<Vec<Salida>>;
    async fn salidas_for_tour(&self, tour: TourId) -> StoreResult<Vec<Salida>>;
    /// Fails with [`StoreError::Integrity`] when the tour is missing.
    async fn create_salida(&self, new: NewSalida) -> StoreResult<Salida>;
}
