use crate::domain::{CreateCustomerErrorCode, Customer};
use crate::pipeline::{Request, RequestHandler};
use crate::ports::{CustomerRepository, RepositoryError};
use crate::result::OpResult;
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Clone, Debug)]
pub struct CreateCustomerCommand {
    pub name: String,
    pub email: String,
    pub vat_number: Option<String>,
    pub address: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateCustomerResult {
    pub id: Uuid,
}

impl Request for CreateCustomerCommand {
    type Response = OpResult<CreateCustomerResult, CreateCustomerErrorCode>;
}

fn already_exists(email: &str) -> OpResult<CreateCustomerResult, CreateCustomerErrorCode> {
    OpResult::failure(
        CreateCustomerErrorCode::CustomerAlreadyExists,
        format!("A customer with email '{}' already exists.", email),
    )
}

#[derive(Clone)]
pub struct CreateCustomerHandler {
    repository: Arc<dyn CustomerRepository>,
}

impl CreateCustomerHandler {
    pub fn new(repository: Arc<dyn CustomerRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl RequestHandler<CreateCustomerCommand> for CreateCustomerHandler {
    async fn handle(
        &self,
        command: CreateCustomerCommand,
        _cancel: &CancellationToken,
    ) -> shared::Result<OpResult<CreateCustomerResult, CreateCustomerErrorCode>> {
        if self.repository.email_exists(&command.email).await? {
            warn!("Rejected customer with duplicate email {}", command.email);
            return Ok(already_exists(&command.email));
        }

        let customer = Customer::new(
            command.name,
            command.email,
            command.vat_number,
            command.address,
        );

        match self.repository.insert(customer).await {
            Ok(created) => {
                info!("Created customer {}", created.id);
                Ok(OpResult::success(CreateCustomerResult { id: created.id }))
            }
            // lost a race against a concurrent create with the same email
            Err(RepositoryError::DuplicateEmail(email)) => {
                warn!("Rejected customer with duplicate email {}", email);
                Ok(already_exists(&email))
            }
            Err(e) => Err(e.into()),
        }
    }
}
