use crate::domain::{DeleteCustomerErrorCode, cache_key_for_customer};
use crate::pipeline::{Request, RequestHandler};
use crate::ports::{CustomerRepository, ResponseCache};
use crate::result::OpResult;
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Clone, Copy, Debug)]
pub struct DeleteCustomerCommand {
    pub id: Uuid,
}

impl Request for DeleteCustomerCommand {
    type Response = OpResult<(), DeleteCustomerErrorCode>;
}

/// Deletes a customer and evicts its cached detail view.
#[derive(Clone)]
pub struct DeleteCustomerHandler {
    repository: Arc<dyn CustomerRepository>,
    cache: Arc<dyn ResponseCache>,
}

impl DeleteCustomerHandler {
    pub fn new(repository: Arc<dyn CustomerRepository>, cache: Arc<dyn ResponseCache>) -> Self {
        Self { repository, cache }
    }
}

#[async_trait]
impl RequestHandler<DeleteCustomerCommand> for DeleteCustomerHandler {
    async fn handle(
        &self,
        command: DeleteCustomerCommand,
        _cancel: &CancellationToken,
    ) -> shared::Result<OpResult<(), DeleteCustomerErrorCode>> {
        if !self.repository.remove(command.id).await? {
            return Ok(OpResult::failure(
                DeleteCustomerErrorCode::InvalidCustomer,
                format!("Customer with id '{}' not found.", command.id),
            ));
        }

        let key = cache_key_for_customer(command.id);
        if self.cache.remove(&key).await {
            debug!("Evicted cache entry {}", key);
        }
        info!("Deleted customer {}", command.id);
        Ok(OpResult::success(()))
    }
}
