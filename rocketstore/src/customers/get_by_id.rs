use crate::domain::{CustomerDetail, GetCustomerByIdErrorCode, cache_key_for_customer};
use crate::pipeline::{Cacheable, Request, RequestHandler};
use crate::ports::{CustomerRepository, Geocoder};
use crate::result::OpResult;
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::warn;
use uuid::Uuid;

pub const CUSTOMER_SLIDING_EXPIRATION_MINUTES: u32 = 30;

#[derive(Clone, Copy, Debug)]
pub struct GetCustomerByIdQuery {
    pub id: Uuid,
}

impl Request for GetCustomerByIdQuery {
    type Response = OpResult<CustomerDetail, GetCustomerByIdErrorCode>;
}

impl Cacheable for GetCustomerByIdQuery {
    fn cache_key(&self) -> String {
        cache_key_for_customer(self.id)
    }

    fn sliding_expiration_minutes(&self) -> u32 {
        CUSTOMER_SLIDING_EXPIRATION_MINUTES
    }
}

/// Loads one customer and resolves the coordinates of its address.
#[derive(Clone)]
pub struct GetCustomerByIdHandler {
    repository: Arc<dyn CustomerRepository>,
    geocoder: Arc<dyn Geocoder>,
}

impl GetCustomerByIdHandler {
    pub fn new(repository: Arc<dyn CustomerRepository>, geocoder: Arc<dyn Geocoder>) -> Self {
        Self {
            repository,
            geocoder,
        }
    }
}

#[async_trait]
impl RequestHandler<GetCustomerByIdQuery> for GetCustomerByIdHandler {
    async fn handle(
        &self,
        query: GetCustomerByIdQuery,
        cancel: &CancellationToken,
    ) -> shared::Result<OpResult<CustomerDetail, GetCustomerByIdErrorCode>> {
        let Some(customer) = self.repository.find_by_id(query.id).await? else {
            return Ok(OpResult::failure(
                GetCustomerByIdErrorCode::InvalidCustomer,
                format!("The customer with id {} is invalid", query.id),
            ));
        };

        let Some(address) = customer.geocodable_address() else {
            return Ok(OpResult::success(CustomerDetail::new(customer, None)));
        };

        match self.geocoder.geocode(address, cancel).await {
            OpResult::Success(coordinates) => Ok(OpResult::success(CustomerDetail::new(
                customer,
                Some(coordinates),
            ))),
            OpResult::Failure { code, description } => {
                warn!("Geocoding customer {} failed ({:?}): {}", query.id, code, description);
                Ok(OpResult::failure(GetCustomerByIdErrorCode::ApiError, description))
            }
        }
    }
}
