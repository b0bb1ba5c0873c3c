use rocketstore::Mediator;
use rocketstore::customers::{ensure_customer_handlers, register_customer_handlers};
use rocketstore::ports::{CustomerRepository, Geocoder, ResponseCache};
use std::sync::Arc;
use tracing::info;

/// Server state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub mediator: Arc<Mediator>,
}

impl AppState {
    /// Wires every customer handler into one mediator.
    ///
    /// Fails when a request type the endpoints dispatch has no handler, so a
    /// misconfigured process stops before it binds a port.
    pub fn new(
        repository: Arc<dyn CustomerRepository>,
        cache: Arc<dyn ResponseCache>,
        geocoder: Arc<dyn Geocoder>,
    ) -> shared::Result<Self> {
        let mediator =
            register_customer_handlers(Mediator::builder(cache), repository, geocoder).build();
        ensure_customer_handlers(&mediator)?;
        info!("Registered requests: {:?}", mediator.registered_requests());

        Ok(Self {
            mediator: Arc::new(mediator),
        })
    }
}
