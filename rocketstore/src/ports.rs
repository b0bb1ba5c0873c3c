use crate::domain::{Coordinates, Customer, CustomerFilter, CustomerPage, GeocodingErrorCode, PageRequest};
use crate::result::OpResult;
use async_trait::async_trait;
use std::any::Any;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

// Ports are the pluggable extension points the request handlers run against

/// A response stored in the [`ResponseCache`].
///
/// Entries are type-erased so one process-wide cache can hold responses of
/// every cacheable request type; readers downcast to the response they expect.
pub type CachedResponse = Arc<dyn Any + Send + Sync>;

/// Port for the shared response cache with per-entry sliding expiration
#[async_trait]
pub trait ResponseCache: Send + Sync + 'static {
    async fn try_get(&self, key: &str) -> Option<CachedResponse>;

    /// Stores `value`; every later hit on `key` restarts its `sliding` window.
    async fn set(&self, key: String, value: CachedResponse, sliding: Duration);

    /// Invalidation generation of `key`, advanced by every [`remove`](Self::remove).
    fn generation(&self, key: &str) -> u64;

    /// Like [`set`](Self::set), but only while `key` is still at `generation`.
    ///
    /// A `remove` that lands at any point during the call wins: the entry is
    /// either never stored or evicted again, and `false` is returned.
    async fn set_if_current(
        &self,
        key: String,
        value: CachedResponse,
        sliding: Duration,
        generation: u64,
    ) -> bool;

    /// Advances the generation of `key`, then evicts it. Returns whether an
    /// entry was present.
    async fn remove(&self, key: &str) -> bool;

    fn entry_count(&self) -> u64;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("a customer with email '{0}' already exists")]
    DuplicateEmail(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<RepositoryError> for shared::Error {
    fn from(err: RepositoryError) -> Self {
        shared::Error::Storage(err.to_string())
    }
}

/// Port for customer persistence
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    /// Insert a new customer, rejecting a duplicate email
    async fn insert(&self, customer: Customer) -> Result<Customer, RepositoryError>;

    /// Find a customer by ID
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Customer>, RepositoryError>;

    /// Check if an email is already taken (case-insensitive)
    async fn email_exists(&self, email: &str) -> Result<bool, RepositoryError>;

    /// Filtered page ordered by id, with the unpaginated match count
    async fn list(
        &self,
        filter: &CustomerFilter,
        page: PageRequest,
    ) -> Result<CustomerPage, RepositoryError>;

    /// Delete a customer by ID, returning whether it existed
    async fn remove(&self, id: Uuid) -> Result<bool, RepositoryError>;
}

/// Port for turning an address into coordinates
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(
        &self,
        address: &str,
        cancel: &CancellationToken,
    ) -> OpResult<Coordinates, GeocodingErrorCode>;
}
