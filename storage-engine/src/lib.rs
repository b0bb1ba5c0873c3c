//! Storage adapters: the response cache and the customer repositories.

pub mod memory_repository;
pub mod moka_cache;
pub mod sled_repository;

pub use memory_repository::InMemoryCustomerRepository;
pub use moka_cache::MokaResponseCache;
pub use sled_repository::SledCustomerRepository;

use rocketstore::ports::{CustomerRepository, ResponseCache};
use shared::config::Config;
use std::sync::Arc;
use tracing::info;

/// Sled-backed store when a data directory is configured, in-memory otherwise.
pub fn repository_from_config(config: &Config) -> shared::Result<Arc<dyn CustomerRepository>> {
    match config.data_dir.as_deref() {
        Some(dir) => {
            let repository = SledCustomerRepository::new(dir)?;
            Ok(Arc::new(repository))
        }
        None => {
            info!("No data directory configured, customers are kept in memory");
            Ok(Arc::new(InMemoryCustomerRepository::new()))
        }
    }
}

/// Response cache bounded by `cache_max_entries`; zero leaves it unbounded.
pub fn response_cache_from_config(config: &Config) -> Arc<dyn ResponseCache> {
    let max_entries = Some(config.cache_max_entries).filter(|n| *n > 0);
    info!("Response cache max entries: {:?}", max_entries);
    Arc::new(MokaResponseCache::new("responses", max_entries))
}
