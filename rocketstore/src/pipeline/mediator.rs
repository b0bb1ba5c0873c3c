use super::behavior::{Next, PipelineBehavior};
use super::caching::CachingBehavior;
use super::logging::LoggingBehavior;
use super::request::{Cacheable, Request, RequestHandler, request_name};
use crate::ports::ResponseCache;
use shared::{Error, Result};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Behaviors and handler registered for one request type
struct Pipeline<R: Request> {
    behaviors: Vec<Arc<dyn PipelineBehavior<R>>>,
    handler: Arc<dyn RequestHandler<R>>,
}

impl<R: Request> Pipeline<R> {
    async fn run(&self, request: R, cancel: &CancellationToken) -> Result<R::Response> {
        Next::new(&self.behaviors, self.handler.as_ref())
            .run(request, cancel)
            .await
    }
}

/// Routes each request to the single pipeline registered for its type.
///
/// The routing table is fixed when [`MediatorBuilder::build`] runs and is only
/// read afterwards, so a `Mediator` is shared behind an `Arc` without locking.
pub struct Mediator {
    pipelines: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
    names: Vec<&'static str>,
}

impl Mediator {
    pub fn builder(cache: Arc<dyn ResponseCache>) -> MediatorBuilder {
        MediatorBuilder::new(cache)
    }

    /// Dispatch `request` through its pipeline.
    ///
    /// Fails with [`Error::HandlerNotRegistered`] for unknown request types and
    /// with [`Error::Cancelled`] when `cancel` fires before the pipeline finishes.
    pub async fn send<R: Request>(&self, request: R, cancel: &CancellationToken) -> Result<R::Response> {
        let pipeline = self.pipeline::<R>()?;

        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("{} cancelled during dispatch", request_name::<R>());
                Err(Error::Cancelled)
            }
            response = pipeline.run(request, cancel) => response,
        }
    }

    /// Startup check that a handler exists for `R`.
    pub fn ensure_registered<R: Request>(&self) -> Result<()> {
        self.pipeline::<R>().map(|_| ())
    }

    pub fn is_registered<R: Request>(&self) -> bool {
        self.pipelines.contains_key(&TypeId::of::<R>())
    }

    pub fn registered_requests(&self) -> &[&'static str] {
        &self.names
    }

    fn pipeline<R: Request>(&self) -> Result<&Pipeline<R>> {
        self.pipelines
            .get(&TypeId::of::<R>())
            .and_then(|entry| entry.downcast_ref::<Pipeline<R>>())
            .ok_or(Error::HandlerNotRegistered(request_name::<R>()))
    }
}

impl std::fmt::Debug for Mediator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mediator")
            .field("requests", &self.names)
            .finish()
    }
}

/// Startup-time registration of request handlers
pub struct MediatorBuilder {
    cache: Arc<dyn ResponseCache>,
    pipelines: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
    names: Vec<&'static str>,
}

impl MediatorBuilder {
    pub fn new(cache: Arc<dyn ResponseCache>) -> Self {
        Self {
            cache,
            pipelines: HashMap::new(),
            names: Vec::new(),
        }
    }

    /// The response cache shared by every cacheable pipeline.
    pub fn cache(&self) -> Arc<dyn ResponseCache> {
        self.cache.clone()
    }

    /// Register a handler for a request that is never cached.
    pub fn register<R, H>(self, handler: H) -> Self
    where
        R: Request,
        H: RequestHandler<R> + 'static,
    {
        let behaviors: Vec<Arc<dyn PipelineBehavior<R>>> = vec![Arc::new(LoggingBehavior)];
        self.register_with(Arc::new(handler), behaviors)
    }

    /// Register a handler whose successful responses are served from the shared cache.
    pub fn register_cached<R, H>(self, handler: H) -> Self
    where
        R: Request + Cacheable,
        H: RequestHandler<R> + 'static,
    {
        let behaviors: Vec<Arc<dyn PipelineBehavior<R>>> = vec![
            Arc::new(LoggingBehavior),
            Arc::new(CachingBehavior::new(self.cache.clone())),
        ];
        self.register_with(Arc::new(handler), behaviors)
    }

    /// Register a handler behind an explicit, ordered behavior chain.
    ///
    /// A second registration for the same request type replaces the first.
    pub fn register_with<R: Request>(
        mut self,
        handler: Arc<dyn RequestHandler<R>>,
        behaviors: Vec<Arc<dyn PipelineBehavior<R>>>,
    ) -> Self {
        let name = request_name::<R>();
        let previous = self
            .pipelines
            .insert(TypeId::of::<R>(), Box::new(Pipeline { behaviors, handler }));
        if previous.is_none() {
            self.names.push(name);
        } else {
            debug!("Replacing handler registered for {}", name);
        }
        self
    }

    pub fn build(self) -> Mediator {
        info!("Mediator built with {} request handler(s)", self.names.len());
        Mediator {
            pipelines: self.pipelines,
            names: self.names,
        }
    }
}
