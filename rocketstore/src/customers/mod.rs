//! Customer commands and queries, and the handlers that serve them.

mod create;
mod delete;
mod get_by_id;
mod list;

pub use create::{CreateCustomerCommand, CreateCustomerHandler, CreateCustomerResult};
pub use delete::{DeleteCustomerCommand, DeleteCustomerHandler};
pub use get_by_id::{CUSTOMER_SLIDING_EXPIRATION_MINUTES, GetCustomerByIdHandler, GetCustomerByIdQuery};
pub use list::{GetCustomersHandler, GetCustomersQuery};

use crate::pipeline::{Mediator, MediatorBuilder};
use crate::ports::{CustomerRepository, Geocoder};
use std::sync::Arc;

/// Registers every customer request; only the by-id query is cached.
pub fn register_customer_handlers(
    builder: MediatorBuilder,
    repository: Arc<dyn CustomerRepository>,
    geocoder: Arc<dyn Geocoder>,
) -> MediatorBuilder {
    let cache = builder.cache();
    builder
        .register::<CreateCustomerCommand, _>(CreateCustomerHandler::new(repository.clone()))
        .register::<GetCustomersQuery, _>(GetCustomersHandler::new(repository.clone()))
        .register_cached::<GetCustomerByIdQuery, _>(GetCustomerByIdHandler::new(
            repository.clone(),
            geocoder,
        ))
        .register::<DeleteCustomerCommand, _>(DeleteCustomerHandler::new(repository, cache))
}

/// Fails when any customer request has no handler.
pub fn ensure_customer_handlers(mediator: &Mediator) -> shared::Result<()> {
    mediator.ensure_registered::<CreateCustomerCommand>()?;
    mediator.ensure_registered::<GetCustomersQuery>()?;
    mediator.ensure_registered::<GetCustomerByIdQuery>()?;
    mediator.ensure_registered::<DeleteCustomerCommand>()
}
