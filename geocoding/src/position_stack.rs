//! Reqwest-backed PositionStack geocoder.
//!
//! Owns transport details only: query encoding, timeout and HTTP error
//! mapping, and JSON decoding into domain coordinates.

use crate::dto::PositionStackResponseDto;
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use rocketstore::domain::{Coordinates, GeocodingErrorCode};
use rocketstore::ports::Geocoder;
use rocketstore::result::OpResult;
use shared::config::GeocodingConfig;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

const RESULT_FIELDS: &str = "results.latitude,results.longitude";
const INVALID_RESPONSE: &str = "Invalid response from PositionStack API.";

type GeocodeResult = OpResult<Coordinates, GeocodingErrorCode>;

pub struct PositionStackGeocoder {
    client: Client,
    endpoint: Url,
    access_key: String,
}

impl PositionStackGeocoder {
    /// Build a geocoder whose client enforces the configured request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the endpoint is not a valid URL or the reqwest
    /// client cannot be constructed.
    pub fn new(config: &GeocodingConfig) -> shared::Result<Self> {
        let endpoint = Url::parse(&config.url).map_err(|e| {
            shared::Error::Internal(format!("invalid PositionStack URL '{}': {}", config.url, e))
        })?;
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| shared::Error::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint,
            access_key: config.access_key.clone(),
        })
    }

    fn request_url(&self, address: &str) -> Url {
        build_request_url(&self.endpoint, &self.access_key, address)
    }

    async fn fetch(&self, address: &str) -> GeocodeResult {
        let response = match self.client.get(self.request_url(address)).send().await {
            Ok(response) => response,
            Err(e) => return map_transport_error(e),
        };

        let status = response.status();
        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => return map_transport_error(e),
        };
        if !status.is_success() {
            return map_status_error(status);
        }

        parse_coordinates(body.as_ref())
    }
}

#[async_trait]
impl Geocoder for PositionStackGeocoder {
    async fn geocode(&self, address: &str, cancel: &CancellationToken) -> GeocodeResult {
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => OpResult::failure(
                GeocodingErrorCode::RequestFailed,
                "The request to PositionStack API was cancelled.",
            ),
            result = self.fetch(address) => result,
        };

        match &result {
            OpResult::Success(coordinates) => debug!(
                "Geocoded address to {}, {}",
                coordinates.latitude, coordinates.longitude
            ),
            OpResult::Failure { code, description } => {
                warn!("PositionStack lookup failed ({:?}): {}", code, description)
            }
        }
        result
    }
}

fn build_request_url(endpoint: &Url, access_key: &str, address: &str) -> Url {
    let mut url = endpoint.clone();
    url.query_pairs_mut()
        .append_pair("access_key", access_key)
        .append_pair("query", address)
        .append_pair("fields", RESULT_FIELDS);
    url
}

fn parse_coordinates(body: &[u8]) -> GeocodeResult {
    let decoded: PositionStackResponseDto = match serde_json::from_slice(body) {
        Ok(decoded) => decoded,
        Err(e) => {
            return OpResult::failure(
                GeocodingErrorCode::InvalidResponse,
                format!("Error deserializing PositionStack response: {e}"),
            );
        }
    };

    match decoded.into_coordinates() {
        Some(coordinates) => OpResult::success(coordinates),
        None => OpResult::failure(GeocodingErrorCode::InvalidResponse, INVALID_RESPONSE),
    }
}

fn map_transport_error(error: reqwest::Error) -> GeocodeResult {
    if error.is_timeout() {
        OpResult::failure(
            GeocodingErrorCode::TimedOut,
            "The request to PositionStack API timed out.",
        )
    } else {
        OpResult::failure(
            GeocodingErrorCode::RequestFailed,
            format!("Error calling PositionStack API: {error}"),
        )
    }
}

fn map_status_error(status: StatusCode) -> GeocodeResult {
    match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => OpResult::failure(
            GeocodingErrorCode::TimedOut,
            "The request to PositionStack API timed out.",
        ),
        _ => OpResult::failure(
            GeocodingErrorCode::RequestFailed,
            format!(
                "Error calling PositionStack API: status {}",
                status.as_u16()
            ),
        ),
    }
}
