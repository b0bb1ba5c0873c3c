use super::behavior::{Next, PipelineBehavior};
use super::request::{Cacheable, Request, request_name};
use crate::ports::ResponseCache;
use crate::result::Outcome;
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Serves cacheable requests from the shared [`ResponseCache`].
///
/// A hit returns the stored response without running anything further down
/// the chain. On a miss the rest of the chain runs, and the response is
/// stored only when it reports success; failures and responses without a
/// success indicator are passed through uncached. A response is also dropped
/// when its key is removed while the chain runs, so an invalidation issued
/// mid-flight is never overwritten by the older result.
pub struct CachingBehavior {
    cache: Arc<dyn ResponseCache>,
}

impl CachingBehavior {
    pub fn new(cache: Arc<dyn ResponseCache>) -> Self {
        Self { cache }
    }
}

#[async_trait]
impl<R> PipelineBehavior<R> for CachingBehavior
where
    R: Request + Cacheable,
{
    async fn handle(
        &self,
        request: R,
        cancel: &CancellationToken,
        next: Next<'_, R>,
    ) -> shared::Result<R::Response> {
        let key = request.cache_key();

        if let Some(cached) = self.cache.try_get(&key).await {
            match cached.downcast_ref::<R::Response>() {
                Some(response) => {
                    debug!("Fetched from cache with key: {}", key);
                    return Ok(response.clone());
                }
                None => warn!(
                    "Cache entry '{}' does not hold a {} response, treating as a miss",
                    key,
                    request_name::<R>()
                ),
            }
        }

        if request.sliding_expiration_minutes() == 0 {
            warn!("{} declares a zero sliding expiration, using one minute", request_name::<R>());
        }
        let sliding = request.sliding_expiration();
        let generation = self.cache.generation(&key);

        let response = next.run(request, cancel).await?;

        if response.succeeded() == Some(true) {
            let stored = self
                .cache
                .set_if_current(key.clone(), Arc::new(response.clone()), sliding, generation)
                .await;
            if stored {
                info!("Cached response with key: {}", key);
            } else {
                debug!("Key {} was invalidated while the response was built, not cached", key);
            }
        } else {
            warn!(
                "Response with key {} not cached as the response was not successful.",
                key
            );
        }

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::request::RequestHandler;
    use crate::result::{OpResult, Outcome};
    use crate::testing::SpyCache;
    use strum_macros::{EnumMessage, IntoStaticStr};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, IntoStaticStr, EnumMessage)]
    enum LookupError {
        #[strum(message = "missing")]
        Missing,
    }

    crate::result::impl_error_code!(LookupError);

    struct Lookup {
        id: u32,
        minutes: u32,
    }

    impl Request for Lookup {
        type Response = OpResult<String, LookupError>;
    }

    impl Cacheable for Lookup {
        fn cache_key(&self) -> String {
            format!("Lookup_{}", self.id)
        }

        fn sliding_expiration_minutes(&self) -> u32 {
            self.minutes
        }
    }

    struct CountingHandler {
        calls: AtomicUsize,
        fail: bool,
    }

    impl CountingHandler {
        fn new(fail: bool) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail,
            }
        }
    }

    #[async_trait]
    impl RequestHandler<Lookup> for CountingHandler {
        async fn handle(
            &self,
            request: Lookup,
            _cancel: &CancellationToken,
        ) -> shared::Result<OpResult<String, LookupError>> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Ok(OpResult::failure(LookupError::Missing, "missing"));
            }
            Ok(OpResult::success(format!("value-{}-{}", request.id, n)))
        }
    }

    async fn run(
        behavior: &CachingBehavior,
        handler: &CountingHandler,
        request: Lookup,
    ) -> OpResult<String, LookupError> {
        let cancel = CancellationToken::new();
        let behaviors: Vec<Arc<dyn PipelineBehavior<Lookup>>> = Vec::new();
        PipelineBehavior::<Lookup>::handle(behavior, request, &cancel, Next::new(&behaviors, handler))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_hit_short_circuits_handler() {
        let cache = Arc::new(SpyCache::default());
        let cached: OpResult<String, LookupError> = OpResult::success("from-cache".into());
        cache.seed("Lookup_1", Arc::new(cached.clone()));

        let behavior = CachingBehavior::new(cache.clone());
        let handler = CountingHandler::new(false);

        let response = run(&behavior, &handler, Lookup { id: 1, minutes: 30 }).await;

        assert_eq!(response, cached);
        assert_eq!(handler.calls.load(Ordering::SeqCst), 0);
        assert_eq!(cache.sets.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_miss_runs_handler_and_caches_success() {
        let cache = Arc::new(SpyCache::default());
        let behavior = CachingBehavior::new(cache.clone());
        let handler = CountingHandler::new(false);

        let response = run(&behavior, &handler, Lookup { id: 2, minutes: 30 }).await;

        assert_eq!(response, OpResult::success("value-2-0".to_string()));
        assert_eq!(handler.calls.load(Ordering::SeqCst), 1);
        assert!(cache.contains("Lookup_2"));
        assert_eq!(cache.sliding_for("Lookup_2"), Some(Duration::from_secs(30 * 60)));

        let stored = cache.try_get("Lookup_2").await.unwrap();
        assert_eq!(
            stored.downcast_ref::<OpResult<String, LookupError>>(),
            Some(&response)
        );
    }

    #[tokio::test]
    async fn test_repeated_requests_return_identical_responses() {
        let cache = Arc::new(SpyCache::default());
        let behavior = CachingBehavior::new(cache.clone());
        let handler = CountingHandler::new(false);

        let first = run(&behavior, &handler, Lookup { id: 3, minutes: 5 }).await;
        let second = run(&behavior, &handler, Lookup { id: 3, minutes: 5 }).await;

        // the handler embeds its call count, so a second execution would differ
        assert_eq!(first, second);
        assert_eq!(handler.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failure_is_never_cached() {
        let cache = Arc::new(SpyCache::default());
        let behavior = CachingBehavior::new(cache.clone());
        let handler = CountingHandler::new(true);

        let response = run(&behavior, &handler, Lookup { id: 4, minutes: 30 }).await;
        assert!(response.failed_with(LookupError::Missing));
        assert!(!cache.contains("Lookup_4"));

        // a failure is re-evaluated on the next call
        run(&behavior, &handler, Lookup { id: 4, minutes: 30 }).await;
        assert_eq!(handler.calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.sets.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_foreign_entry_under_key_is_a_miss() {
        let cache = Arc::new(SpyCache::default());
        cache.seed("Lookup_5", Arc::new(42_u64));
        let behavior = CachingBehavior::new(cache.clone());
        let handler = CountingHandler::new(false);

        let response = run(&behavior, &handler, Lookup { id: 5, minutes: 1 }).await;

        assert_eq!(response.value().map(String::as_str), Some("value-5-0"));
        assert_eq!(handler.calls.load(Ordering::SeqCst), 1);
        assert_eq!(response.succeeded(), Some(true));
    }

    /// Evicts its own key while building the response, like a concurrent delete
    struct InvalidatingHandler {
        cache: Arc<SpyCache>,
    }

    #[async_trait]
    impl RequestHandler<Lookup> for InvalidatingHandler {
        async fn handle(
            &self,
            request: Lookup,
            _cancel: &CancellationToken,
        ) -> shared::Result<OpResult<String, LookupError>> {
            self.cache.remove(&request.cache_key()).await;
            Ok(OpResult::success("loaded-before-removal".into()))
        }
    }

    #[tokio::test]
    async fn test_removal_while_handling_is_not_overwritten() {
        let cache = Arc::new(SpyCache::default());
        let behavior = CachingBehavior::new(cache.clone());
        let handler = InvalidatingHandler {
            cache: cache.clone(),
        };
        let behaviors: Vec<Arc<dyn PipelineBehavior<Lookup>>> = Vec::new();

        let response = PipelineBehavior::<Lookup>::handle(
            &behavior,
            Lookup { id: 7, minutes: 30 },
            &CancellationToken::new(),
            Next::new(&behaviors, &handler),
        )
        .await
        .unwrap();

        assert!(response.is_success());
        assert!(!cache.contains("Lookup_7"));
    }

    #[tokio::test]
    async fn test_zero_minutes_falls_back_to_one_minute() {
        let cache = Arc::new(SpyCache::default());
        let behavior = CachingBehavior::new(cache.clone());
        let handler = CountingHandler::new(false);

        run(&behavior, &handler, Lookup { id: 6, minutes: 0 }).await;
        assert_eq!(cache.sliding_for("Lookup_6"), Some(Duration::from_secs(60)));
    }
}
