//! OpenAPI document for the customer API.
//!
//! Served as JSON at `/api-docs/openapi.json` with Swagger UI under `/docs`.

use crate::api::problem::ProblemDetails;
use crate::api::requests::{CreateCustomerRequest, CustomerInput};
use crate::api::responses::{
    CreateCustomerResponse, CustomerDetailResponse, CustomerResponse, HealthResponse,
    ListCustomersResponse,
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "RocketStore customers API",
        description = "Create, list, look up and delete customers."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::handlers::customers::create_customer,
        crate::handlers::customers::list_customers,
        crate::handlers::customers::get_customer,
        crate::handlers::customers::delete_customer,
        crate::handlers::health::health_check,
    ),
    components(schemas(
        CreateCustomerRequest,
        CustomerInput,
        CreateCustomerResponse,
        CustomerResponse,
        ListCustomersResponse,
        CustomerDetailResponse,
        HealthResponse,
        ProblemDetails,
    )),
    tags(
        (name = "customers", description = "Customer management"),
        (name = "health", description = "Liveness probe")
    )
)]
pub struct ApiDoc;
