//! Spy doubles for the ports, shared by the unit tests of this crate.

use crate::domain::{
    Coordinates, Customer, CustomerFilter, CustomerPage, CustomerSummary, GeocodingErrorCode,
    PageRequest, normalize_email,
};
use crate::ports::{CachedResponse, CustomerRepository, Geocoder, RepositoryError, ResponseCache};
use crate::result::OpResult;
use async_trait::async_trait;
use fake::Fake;
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Cache that records every call it receives
#[derive(Default)]
pub struct SpyCache {
    entries: Mutex<HashMap<String, (CachedResponse, Duration)>>,
    generations: Mutex<HashMap<String, u64>>,
    pub gets: AtomicUsize,
    pub sets: AtomicUsize,
    pub removes: AtomicUsize,
}

impl SpyCache {
    pub fn touched(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
            + self.sets.load(Ordering::SeqCst)
            + self.removes.load(Ordering::SeqCst)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.lock().contains_key(key)
    }

    pub fn sliding_for(&self, key: &str) -> Option<Duration> {
        self.entries.lock().get(key).map(|(_, sliding)| *sliding)
    }

    pub fn seed(&self, key: &str, value: CachedResponse) {
        self.entries
            .lock()
            .insert(key.to_string(), (value, Duration::from_secs(60)));
    }
}

#[async_trait]
impl ResponseCache for SpyCache {
    async fn try_get(&self, key: &str) -> Option<CachedResponse> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.entries.lock().get(key).map(|(value, _)| value.clone())
    }

    async fn set(&self, key: String, value: CachedResponse, sliding: Duration) {
        self.sets.fetch_add(1, Ordering::SeqCst);
        self.entries.lock().insert(key, (value, sliding));
    }

    fn generation(&self, key: &str) -> u64 {
        self.generations.lock().get(key).copied().unwrap_or_default()
    }

    async fn set_if_current(
        &self,
        key: String,
        value: CachedResponse,
        sliding: Duration,
        generation: u64,
    ) -> bool {
        self.sets.fetch_add(1, Ordering::SeqCst);
        let generations = self.generations.lock();
        if generations.get(&key).copied().unwrap_or_default() != generation {
            return false;
        }
        self.entries.lock().insert(key, (value, sliding));
        true
    }

    async fn remove(&self, key: &str) -> bool {
        self.removes.fetch_add(1, Ordering::SeqCst);
        let mut generations = self.generations.lock();
        *generations.entry(key.to_string()).or_default() += 1;
        self.entries.lock().remove(key).is_some()
    }

    fn entry_count(&self) -> u64 {
        self.entries.lock().len() as u64
    }
}

/// Minimal repository keyed by id
#[derive(Default)]
pub struct MemoryRepository {
    customers: Mutex<BTreeMap<Uuid, Customer>>,
    pub fail_with_storage_error: bool,
}

impl MemoryRepository {
    pub fn failing() -> Self {
        Self {
            fail_with_storage_error: true,
            ..Self::default()
        }
    }

    fn check(&self) -> Result<(), RepositoryError> {
        if self.fail_with_storage_error {
            return Err(RepositoryError::Storage("disk unavailable".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl CustomerRepository for MemoryRepository {
    async fn insert(&self, customer: Customer) -> Result<Customer, RepositoryError> {
        self.check()?;
        let mut customers = self.customers.lock();
        let email = normalize_email(&customer.email);
        if customers.values().any(|c| normalize_email(&c.email) == email) {
            return Err(RepositoryError::DuplicateEmail(customer.email));
        }
        customers.insert(customer.id, customer.clone());
        Ok(customer)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Customer>, RepositoryError> {
        self.check()?;
        Ok(self.customers.lock().get(&id).cloned())
    }

    async fn email_exists(&self, email: &str) -> Result<bool, RepositoryError> {
        self.check()?;
        let email = normalize_email(email);
        Ok(self
            .customers
            .lock()
            .values()
            .any(|c| normalize_email(&c.email) == email))
    }

    async fn list(
        &self,
        filter: &CustomerFilter,
        page: PageRequest,
    ) -> Result<CustomerPage, RepositoryError> {
        self.check()?;
        let customers = self.customers.lock();
        let matching: Vec<&Customer> = customers.values().filter(|c| filter.matches(c)).collect();
        Ok(CustomerPage {
            total_count: matching.len(),
            customers: matching
                .into_iter()
                .skip(page.skip())
                .take(page.take())
                .cloned()
                .map(CustomerSummary::from)
                .collect(),
            page_number: page.page_number,
            page_size: page.page_size,
        })
    }

    async fn remove(&self, id: Uuid) -> Result<bool, RepositoryError> {
        self.check()?;
        Ok(self.customers.lock().remove(&id).is_some())
    }
}

/// Geocoder returning a canned outcome and counting calls
pub struct CountingGeocoder {
    pub calls: AtomicUsize,
    outcome: OpResult<Coordinates, GeocodingErrorCode>,
}

impl CountingGeocoder {
    pub fn returning(latitude: f64, longitude: f64) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            outcome: OpResult::success(Coordinates {
                latitude,
                longitude,
            }),
        }
    }

    pub fn failing(description: &str) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            outcome: OpResult::failure(GeocodingErrorCode::RequestFailed, description),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Geocoder for CountingGeocoder {
    async fn geocode(
        &self,
        _address: &str,
        _cancel: &CancellationToken,
    ) -> OpResult<Coordinates, GeocodingErrorCode> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone()
    }
}

/// Geocoder that signals `entered` and then waits for `release` before answering
#[derive(Default)]
pub struct GatedGeocoder {
    pub entered: Notify,
    pub release: Notify,
}

#[async_trait]
impl Geocoder for GatedGeocoder {
    async fn geocode(
        &self,
        _address: &str,
        _cancel: &CancellationToken,
    ) -> OpResult<Coordinates, GeocodingErrorCode> {
        self.entered.notify_one();
        self.release.notified().await;
        OpResult::success(Coordinates {
            latitude: 52.37,
            longitude: 4.89,
        })
    }
}

pub fn fake_name() -> String {
    Name().fake()
}

pub fn fake_email() -> String {
    SafeEmail().fake()
}
