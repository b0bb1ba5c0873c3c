use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

/// Body of `POST /api/customers`
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCustomerRequest {
    pub customer: CustomerInput,
}

/// Customer fields as submitted; presence and format are checked by validation.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInput {
    /// Required, at most 200 characters
    #[serde(default)]
    pub name: Option<String>,
    /// Required, at most 200 characters
    #[serde(default)]
    pub email_address: Option<String>,
    /// Nine digits when present
    #[serde(default)]
    pub vat_number: Option<String>,
    /// At most 500 characters; geocoded on lookup
    #[serde(default)]
    pub address: Option<String>,
}

/// Query string of `GET /api/customers`
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListCustomersParams {
    /// The name of the customer to filter by
    pub name: Option<String>,
    /// The email of the customer to filter by
    pub email: Option<String>,
    /// The page number for pagination, from 1
    #[param(default = 1, minimum = 1)]
    pub page_number: Option<i64>,
    /// The number of customers per page
    #[param(default = 50, minimum = 1, maximum = 1000)]
    pub page_size: Option<i64>,
}
