//! Build step: point the request at the resolved endpoint.

use tracing::trace;

use crate::context::HttpContext;
use crate::endpoint::Endpoint;
use crate::error::ClientError;
use crate::handler::{Handler, HandlerFuture};
use crate::middleware::Middleware;
use crate::request::HttpRequest;
use crate::response::OperationOutput;

/// Applies the context endpoint and host prefix to the request.
///
/// The endpoint's base path is joined in front of the operation path, and the endpoint's own
/// query items go before the operation's. A request that already has a host is left pointed
/// at it when the context carries no endpoint.
#[derive(Debug, Default, Clone, Copy)]
pub struct EndpointMiddleware;

impl EndpointMiddleware {
    /// Create the middleware.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn apply(endpoint: &Endpoint, request: &mut HttpRequest) {
    request.protocol = endpoint.protocol;
    request.host.clone_from(&endpoint.host);
    request.port = endpoint.port;

    let base = endpoint.path.trim_end_matches('/');
    if !base.is_empty() {
        let sep = if request.path.starts_with('/') { "" } else { "/" };
        request.path = format!("{base}{sep}{}", request.path);
    }

    if !endpoint.query_items.is_empty() {
        let operation_items = std::mem::take(&mut request.query_items);
        request.query_items = endpoint
            .query_items
            .iter()
            .cloned()
            .chain(operation_items)
            .collect();
    }
}

impl<O> Middleware<HttpRequest, OperationOutput<O>> for EndpointMiddleware
where
    O: Send + 'static,
{
    fn id(&self) -> &str {
        "Endpoint"
    }

    fn handle<'a>(
        &'a self,
        ctx: &'a HttpContext,
        mut request: HttpRequest,
        next: &'a dyn Handler<HttpRequest, OperationOutput<O>>,
    ) -> HandlerFuture<'a, OperationOutput<O>> {
        if let Some(endpoint) = ctx.endpoint() {
            apply(endpoint, &mut request);
        } else if request.host.is_empty() {
            let operation = ctx.operation().to_owned();
            return Box::pin(async move {
                Err(ClientError::InvalidEndpoint(format!(
                    "no endpoint configured for {operation}"
                )))
            });
        }

        if let Some(prefix) = ctx.host_prefix() {
            request.host = format!("{prefix}{}", request.host);
        }
        trace!(operation = ctx.operation(), url = %request.url(), "resolved endpoint");
        next.handle(ctx, request)
    }
}
