use rocketstore::domain::{CustomerDetail, CustomerPage, CustomerSummary};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreateCustomerResponse {
    pub id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerResponse {
    pub id: Uuid,
    pub name: String,
    pub email_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vat_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl From<CustomerSummary> for CustomerResponse {
    fn from(customer: CustomerSummary) -> Self {
        Self {
            id: customer.id,
            name: customer.name,
            email_address: customer.email,
            vat_number: customer.vat_number,
            address: customer.address,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListCustomersResponse {
    pub customers: Vec<CustomerResponse>,
    pub total_count: usize,
    pub page_number: u32,
    pub page_size: u32,
}

impl From<CustomerPage> for ListCustomersResponse {
    fn from(page: CustomerPage) -> Self {
        Self {
            customers: page.customers.into_iter().map(CustomerResponse::from).collect(),
            total_count: page.total_count,
            page_number: page.page_number,
            page_size: page.page_size,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDetailResponse {
    pub id: Uuid,
    pub name: String,
    pub email_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vat_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

impl From<CustomerDetail> for CustomerDetailResponse {
    fn from(detail: CustomerDetail) -> Self {
        Self {
            id: detail.id,
            name: detail.name,
            email_address: detail.email,
            vat_number: detail.vat_number,
            address: detail.address,
            latitude: detail.latitude,
            longitude: detail.longitude,
        }
    }
}
