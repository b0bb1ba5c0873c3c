use super::request::{Request, RequestHandler};
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// A cross-cutting stage wrapped around handler execution.
///
/// A behavior either answers on its own (short-circuit) or hands the request
/// to `next`, which runs the remaining behaviors and finally the handler.
#[async_trait]
pub trait PipelineBehavior<R: Request>: Send + Sync {
    async fn handle(
        &self,
        request: R,
        cancel: &CancellationToken,
        next: Next<'_, R>,
    ) -> shared::Result<R::Response>;
}

/// Continuation over the rest of a request's chain
pub struct Next<'a, R: Request> {
    behaviors: &'a [Arc<dyn PipelineBehavior<R>>],
    handler: &'a dyn RequestHandler<R>,
}

impl<'a, R: Request> Next<'a, R> {
    pub fn new(
        behaviors: &'a [Arc<dyn PipelineBehavior<R>>],
        handler: &'a dyn RequestHandler<R>,
    ) -> Self {
        Self { behaviors, handler }
    }

    pub async fn run(self, request: R, cancel: &CancellationToken) -> shared::Result<R::Response> {
        match self.behaviors.split_first() {
            Some((behavior, rest)) => {
                let next = Next::new(rest, self.handler);
                behavior.handle(request, cancel, next).await
            }
            None => self.handler.handle(request, cancel).await,
        }
    }
}
