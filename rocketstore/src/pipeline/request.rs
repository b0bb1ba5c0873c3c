use crate::result::Outcome;
use async_trait::async_trait;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// A typed command or query dispatched through the [`Mediator`](super::Mediator).
pub trait Request: Send + 'static {
    type Response: Outcome + Clone + Send + Sync + 'static;
}

/// Capability of requests whose successful responses may be served from cache.
///
/// Both values are read at dispatch time, so keys may be computed from the
/// request's fields. Identical identifying fields must yield the same key.
pub trait Cacheable {
    fn cache_key(&self) -> String;

    fn sliding_expiration_minutes(&self) -> u32;

    /// Sliding window as a duration; a zero-minute window is raised to one minute.
    fn sliding_expiration(&self) -> Duration {
        Duration::from_secs(u64::from(self.sliding_expiration_minutes().max(1)) * 60)
    }
}

/// Business logic for exactly one request type.
///
/// Expected failures belong in the response (an `OpResult::Failure`); `Err` is
/// for infrastructure faults only.
#[async_trait]
pub trait RequestHandler<R: Request>: Send + Sync {
    async fn handle(&self, request: R, cancel: &CancellationToken) -> shared::Result<R::Response>;
}

/// Last path segment of a request's type name, for logs and errors.
pub fn request_name<R: ?Sized>() -> &'static str {
    let full = std::any::type_name::<R>();
    full.rsplit("::").next().unwrap_or(full)
}
