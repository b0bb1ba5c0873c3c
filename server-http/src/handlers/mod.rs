pub mod customers;
pub mod health;

pub use customers::{create_customer, delete_customer, get_customer, list_customers};
pub use health::health_check;
