// shared/src/lib.rs

/// Infrastructure-level failures.
///
/// Expected business outcomes (duplicate email, unknown customer, geocoding
/// failure) never travel through this type; they are carried by
/// `rocketstore::OpResult` instead.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("no handler registered for request type {0}")]
    HandlerNotRegistered(&'static str),
    #[error("request was cancelled")]
    Cancelled,
    #[error("storage: {0}")]
    Storage(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl Error {
    /// True for errors caused by a misconfigured process rather than a single request.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::HandlerNotRegistered(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

pub mod config;
