//! Deserialize step: log requests and responses around the transport.

use tracing::debug;

use crate::body::ByteStream;
use crate::context::HttpContext;
use crate::handler::{Handler, HandlerFuture};
use crate::middleware::Middleware;
use crate::request::HttpRequest;
use crate::response::OperationOutput;

/// Logs the outgoing request and the incoming response per the context's
/// [`ClientLogMode`](crate::config::ClientLogMode).
///
/// Bodies are logged only when they are already buffered. A streaming body is reported as
/// such and left untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggerMiddleware;

impl LoggerMiddleware {
    /// Create the middleware.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn describe(body: &ByteStream) -> String {
    match body {
        ByteStream::Stream(_) => "<stream>".to_owned(),
        ByteStream::Consumed => "<consumed>".to_owned(),
        buffered => buffered
            .bytes()
            .map(|b| String::from_utf8_lossy(b).into_owned())
            .unwrap_or_default(),
    }
}

impl<O> Middleware<HttpRequest, OperationOutput<O>> for LoggerMiddleware
where
    O: Send + 'static,
{
    fn id(&self) -> &str {
        "Logger"
    }

    fn handle<'a>(
        &'a self,
        ctx: &'a HttpContext,
        request: HttpRequest,
        next: &'a dyn Handler<HttpRequest, OperationOutput<O>>,
    ) -> HandlerFuture<'a, OperationOutput<O>> {
        Box::pin(async move {
            let mode = ctx.log_mode();
            if mode.logs_request() {
                let body = if mode.logs_request_body() {
                    describe(&request.body)
                } else {
                    String::new()
                };
                debug!(
                    service = ctx.service(),
                    operation = ctx.operation(),
                    invocation_id = %ctx.invocation_id(),
                    method = %request.method,
                    url = %request.url(),
                    headers = ?request.headers,
                    body = %body,
                    "sending request"
                );
            }

            let out = next.handle(ctx, request).await?;

            if mode.logs_response() {
                let body = if mode.logs_response_body() {
                    describe(&out.response.body)
                } else {
                    String::new()
                };
                debug!(
                    service = ctx.service(),
                    operation = ctx.operation(),
                    invocation_id = %ctx.invocation_id(),
                    status = %out.response.status,
                    headers = ?out.response.headers,
                    body = %body,
                    "received response"
                );
            }
            Ok(out)
        })
    }
}
