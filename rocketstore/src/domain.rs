use crate::result::impl_error_code;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{EnumMessage, IntoStaticStr};
use uuid::Uuid;

pub const CUSTOMER_CACHE_KEY_PREFIX: &str = "Customer_";

/// Cache slot for the detail view of one customer.
pub fn cache_key_for_customer(id: Uuid) -> String {
    format!("{CUSTOMER_CACHE_KEY_PREFIX}{id}")
}

/// A stored customer record
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub vat_number: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Customer {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        vat_number: Option<String>,
        address: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            email: email.into(),
            vat_number,
            address,
            created_at: Utc::now(),
        }
    }

    /// Address worth geocoding, if any.
    pub fn geocodable_address(&self) -> Option<&str> {
        self.address
            .as_deref()
            .map(str::trim)
            .filter(|address| !address.is_empty())
    }
}

/// Key used to enforce email uniqueness.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Listing projection of a customer
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CustomerSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub vat_number: Option<String>,
    pub address: Option<String>,
}

impl From<Customer> for CustomerSummary {
    fn from(customer: Customer) -> Self {
        Self {
            id: customer.id,
            name: customer.name,
            email: customer.email,
            vat_number: customer.vat_number,
            address: customer.address,
        }
    }
}

/// Customer enriched with the coordinates of its address
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CustomerDetail {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub vat_number: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl CustomerDetail {
    pub fn new(customer: Customer, coordinates: Option<Coordinates>) -> Self {
        Self {
            id: customer.id,
            name: customer.name,
            email: customer.email,
            vat_number: customer.vat_number,
            address: customer.address,
            latitude: coordinates.map(|c| c.latitude),
            longitude: coordinates.map(|c| c.longitude),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Optional substring filters for listing customers
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CustomerFilter {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl CustomerFilter {
    pub fn new(name: Option<String>, email: Option<String>) -> Self {
        let clean = |value: Option<String>| {
            value
                .map(|v| v.trim().to_lowercase())
                .filter(|v| !v.is_empty())
        };
        Self {
            name: clean(name),
            email: clean(email),
        }
    }

    pub fn matches(&self, customer: &Customer) -> bool {
        let name_ok = self
            .name
            .as_deref()
            .is_none_or(|needle| customer.name.to_lowercase().contains(needle));
        let email_ok = self
            .email
            .as_deref()
            .is_none_or(|needle| customer.email.to_lowercase().contains(needle));
        name_ok && email_ok
    }
}

/// One-based page selection
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    pub page_number: u32,
    pub page_size: u32,
}

impl PageRequest {
    pub const DEFAULT_PAGE_NUMBER: u32 = 1;
    pub const DEFAULT_PAGE_SIZE: u32 = 50;
    pub const MAX_PAGE_SIZE: u32 = 1000;

    pub fn new(page_number: u32, page_size: u32) -> Self {
        Self {
            page_number: page_number.max(1),
            page_size: page_size.clamp(1, Self::MAX_PAGE_SIZE),
        }
    }

    /// Number of matching records that precede this page.
    pub fn skip(&self) -> usize {
        (self.page_number as usize - 1) * self.page_size as usize
    }

    pub fn take(&self) -> usize {
        self.page_size as usize
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PAGE_NUMBER, Self::DEFAULT_PAGE_SIZE)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CustomerPage {
    pub customers: Vec<CustomerSummary>,
    pub total_count: usize,
    pub page_number: u32,
    pub page_size: u32,
}

// Error codes, one enumeration per operation

#[derive(Clone, Copy, Debug, PartialEq, Eq, IntoStaticStr, EnumMessage)]
pub enum CreateCustomerErrorCode {
    #[strum(message = "The customer already exists")]
    CustomerAlreadyExists,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, IntoStaticStr, EnumMessage)]
pub enum GetCustomersErrorCode {
    #[strum(message = "The page request is invalid")]
    InvalidPage,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, IntoStaticStr, EnumMessage)]
pub enum GetCustomerByIdErrorCode {
    #[strum(message = "The customer is invalid")]
    InvalidCustomer,
    #[strum(message = "Error calling PositionStack API")]
    ApiError,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, IntoStaticStr, EnumMessage)]
pub enum DeleteCustomerErrorCode {
    #[strum(message = "The customer is invalid")]
    InvalidCustomer,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, IntoStaticStr, EnumMessage)]
pub enum GeocodingErrorCode {
    #[strum(message = "The geocoding request failed")]
    RequestFailed,
    #[strum(message = "The geocoding request timed out")]
    TimedOut,
    #[strum(message = "The geocoding response could not be used")]
    InvalidResponse,
}

impl_error_code!(
    CreateCustomerErrorCode,
    GetCustomersErrorCode,
    GetCustomerByIdErrorCode,
    DeleteCustomerErrorCode,
    GeocodingErrorCode,
);
