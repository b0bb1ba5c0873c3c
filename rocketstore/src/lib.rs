//! Application core: domain model, ports, and the request pipeline that
//! dispatches customer commands and queries to their handlers.

pub mod customers;
pub mod domain;
pub mod pipeline;
pub mod ports;
pub mod result;

#[cfg(test)]
mod testing;

pub use pipeline::{Mediator, MediatorBuilder};
pub use result::{ErrorCode, OpResult, Outcome};
