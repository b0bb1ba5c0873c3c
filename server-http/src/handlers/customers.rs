use crate::api::problem::{ApiError, ProblemDetails};
use crate::api::requests::{CreateCustomerRequest, ListCustomersParams};
use crate::api::responses::{
    CreateCustomerResponse, CustomerDetailResponse, ListCustomersResponse,
};
use crate::state::AppState;
use crate::validation::CustomerValidator;
use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use rocketstore::OpResult;
use rocketstore::customers::{DeleteCustomerCommand, GetCustomerByIdQuery, GetCustomersQuery};
use rocketstore::domain::{
    CreateCustomerErrorCode, DeleteCustomerErrorCode, GetCustomerByIdErrorCode,
    GetCustomersErrorCode, PageRequest,
};
use tokio_util::sync::CancellationToken;
use tracing::info;
use uuid::Uuid;

/// Token for one HTTP request, cancelled when the returned guard drops.
///
/// Axum drops the handler future when the client disconnects, which drops the
/// guard and cancels any dispatch still in flight.
fn request_token() -> (CancellationToken, tokio_util::sync::DropGuard) {
    let token = CancellationToken::new();
    let guard = token.clone().drop_guard();
    (token, guard)
}

fn customer_id(path: Result<Path<Uuid>, PathRejection>) -> Result<Uuid, ApiError> {
    match path {
        Ok(Path(id)) => Ok(id),
        Err(rejection) => Err(ApiError::failure(
            StatusCode::NOT_FOUND,
            GetCustomerByIdErrorCode::InvalidCustomer,
            format!("The customer id is not a valid identifier: {}", rejection.body_text()),
        )),
    }
}

/// Create a new customer
#[utoipa::path(
    post,
    path = "/api/customers",
    request_body = CreateCustomerRequest,
    responses(
        (status = 201, description = "Customer created", body = CreateCustomerResponse,
            headers(("Location" = String, description = "Relative URL of the new customer"))),
        (status = 400, description = "Validation failed", body = ProblemDetails, content_type = "application/problem+json"),
        (status = 409, description = "The customer already exists", body = ProblemDetails, content_type = "application/problem+json"),
        (status = 500, description = "Internal server error", body = ProblemDetails, content_type = "application/problem+json")
    ),
    tag = "customers",
    operation_id = "CreateCustomer"
)]
pub async fn create_customer(
    State(state): State<AppState>,
    payload: Result<Json<CreateCustomerRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let command = CustomerValidator::to_command(request.customer)
        .map_err(|errors| ApiError::validation(&errors))?;

    info!("CREATE_CUSTOMER: email={}", command.email);
    let (cancel, _guard) = request_token();

    match state.mediator.send(command, &cancel).await? {
        OpResult::Success(created) => Ok((
            StatusCode::CREATED,
            [(header::LOCATION, format!("api/customers/{}", created.id))],
            Json(CreateCustomerResponse { id: created.id }),
        )),
        OpResult::Failure { code, description } => Err(match code {
            CreateCustomerErrorCode::CustomerAlreadyExists => {
                ApiError::failure(StatusCode::CONFLICT, code, description)
            }
        }),
    }
}

/// Get a list of customers with pagination.
#[utoipa::path(
    get,
    path = "/api/customers",
    params(ListCustomersParams),
    responses(
        (status = 200, description = "One page of customers", body = ListCustomersResponse),
        (status = 400, description = "Invalid page values", body = ProblemDetails, content_type = "application/problem+json"),
        (status = 500, description = "Internal server error", body = ProblemDetails, content_type = "application/problem+json")
    ),
    tag = "customers",
    operation_id = "GetCustomers"
)]
pub async fn list_customers(
    State(state): State<AppState>,
    params: Result<Query<ListCustomersParams>, QueryRejection>,
) -> Result<Json<ListCustomersResponse>, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let query = GetCustomersQuery {
        name: params.name,
        email: params.email,
        page_number: params
            .page_number
            .unwrap_or(i64::from(PageRequest::DEFAULT_PAGE_NUMBER)),
        page_size: params
            .page_size
            .unwrap_or(i64::from(PageRequest::DEFAULT_PAGE_SIZE)),
    };
    let (cancel, _guard) = request_token();

    match state.mediator.send(query, &cancel).await? {
        OpResult::Success(page) => Ok(Json(page.into())),
        OpResult::Failure { code, description } => Err(match code {
            GetCustomersErrorCode::InvalidPage => {
                ApiError::failure(StatusCode::BAD_REQUEST, code, description)
            }
        }),
    }
}

/// Get customer by id
#[utoipa::path(
    get,
    path = "/api/customers/{id}",
    params(("id" = Uuid, Path, description = "The customer's identifier")),
    responses(
        (status = 200, description = "The customer with its coordinates", body = CustomerDetailResponse),
        (status = 404, description = "The customer is invalid", body = ProblemDetails, content_type = "application/problem+json"),
        (status = 502, description = "Error calling PositionStack API", body = ProblemDetails, content_type = "application/problem+json"),
        (status = 500, description = "Internal server error", body = ProblemDetails, content_type = "application/problem+json")
    ),
    tag = "customers",
    operation_id = "GetCustomerById"
)]
pub async fn get_customer(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<CustomerDetailResponse>, ApiError> {
    let id = customer_id(path)?;
    let (cancel, _guard) = request_token();

    match state.mediator.send(GetCustomerByIdQuery { id }, &cancel).await? {
        OpResult::Success(detail) => Ok(Json(detail.into())),
        OpResult::Failure { code, description } => Err(match code {
            GetCustomerByIdErrorCode::InvalidCustomer => {
                ApiError::failure(StatusCode::NOT_FOUND, code, description)
            }
            GetCustomerByIdErrorCode::ApiError => {
                ApiError::failure(StatusCode::BAD_GATEWAY, code, description)
            }
        }),
    }
}

/// Delete a customer
#[utoipa::path(
    delete,
    path = "/api/customers/{id}",
    params(("id" = Uuid, Path, description = "The customer's identifier")),
    responses(
        (status = 204, description = "Customer deleted"),
        (status = 404, description = "The customer is invalid", body = ProblemDetails, content_type = "application/problem+json"),
        (status = 500, description = "Internal server error", body = ProblemDetails, content_type = "application/problem+json")
    ),
    tag = "customers",
    operation_id = "DeleteCustomer"
)]
pub async fn delete_customer(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let id = customer_id(path)?;
    info!("DELETE_CUSTOMER: id={}", id);
    let (cancel, _guard) = request_token();

    match state.mediator.send(DeleteCustomerCommand { id }, &cancel).await? {
        OpResult::Success(()) => Ok(StatusCode::NO_CONTENT),
        OpResult::Failure { code, description } => Err(match code {
            DeleteCustomerErrorCode::InvalidCustomer => {
                ApiError::failure(StatusCode::NOT_FOUND, code, description)
            }
        }),
    }
}
