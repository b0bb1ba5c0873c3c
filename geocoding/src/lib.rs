//! Outbound geocoding adapters.

mod dto;
pub mod position_stack;

pub use position_stack::PositionStackGeocoder;
