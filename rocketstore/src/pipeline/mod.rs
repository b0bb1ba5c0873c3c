mod behavior;
mod caching;
mod logging;
mod mediator;
mod request;

pub use behavior::{Next, PipelineBehavior};
pub use caching::CachingBehavior;
pub use logging::LoggingBehavior;
pub use mediator::{Mediator, MediatorBuilder};
pub use request::{Cacheable, Request, RequestHandler, request_name};
