use super::behavior::{Next, PipelineBehavior};
use super::request::{Request, request_name};
use crate::result::Outcome;
use async_trait::async_trait;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, info_span, warn};

/// Outermost stage of every chain: one span per dispatched request, plus its outcome and latency
#[derive(Clone, Copy, Debug, Default)]
pub struct LoggingBehavior;

#[async_trait]
impl<R: Request> PipelineBehavior<R> for LoggingBehavior {
    async fn handle(
        &self,
        request: R,
        cancel: &CancellationToken,
        next: Next<'_, R>,
    ) -> shared::Result<R::Response> {
        let name = request_name::<R>();
        let started = Instant::now();

        let response = next
            .run(request, cancel)
            .instrument(info_span!("request", request = name))
            .await;

        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &response {
            Ok(value) if value.succeeded() == Some(false) => {
                warn!(request = name, elapsed_ms, "request completed with a failure result")
            }
            Ok(_) => debug!(request = name, elapsed_ms, "request completed"),
            Err(e) => error!(request = name, elapsed_ms, "request failed: {}", e),
        }

        response
    }
}
