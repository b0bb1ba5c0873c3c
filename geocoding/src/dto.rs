//! DTOs for decoding PositionStack forward-geocoding responses.

use rocketstore::domain::Coordinates;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct PositionStackResponseDto {
    #[serde(default)]
    pub(crate) data: Option<Vec<PositionStackResultDto>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PositionStackResultDto {
    pub(crate) latitude: Option<f64>,
    pub(crate) longitude: Option<f64>,
}

impl PositionStackResponseDto {
    /// Coordinates of the best (first) match, if it carries usable values.
    pub(crate) fn into_coordinates(self) -> Option<Coordinates> {
        let first = self.data?.into_iter().next()?;
        let latitude = first.latitude.filter(|v| v.is_finite())?;
        let longitude = first.longitude.filter(|v| v.is_finite())?;
        Some(Coordinates {
            latitude,
            longitude,
        })
    }
}
