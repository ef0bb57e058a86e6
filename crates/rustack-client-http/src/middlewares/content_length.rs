//! Finalize step: frame the request body.

use http::HeaderValue;
use http::header::{CONTENT_LENGTH, TRANSFER_ENCODING};

use crate::body::ByteStream;
use crate::context::HttpContext;
use crate::error::ClientError;
use crate::handler::{Handler, HandlerFuture};
use crate::middleware::Middleware;
use crate::request::HttpRequest;
use crate::response::OperationOutput;

/// Sets `Content-Length` when the body size is known, `Transfer-Encoding: chunked` otherwise.
///
/// An explicit `Content-Length` set by an earlier middleware is kept.
#[derive(Debug, Default, Clone, Copy)]
pub struct ContentLengthMiddleware;

impl ContentLengthMiddleware {
    /// Create the middleware.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl<O> Middleware<HttpRequest, OperationOutput<O>> for ContentLengthMiddleware
where
    O: Send + 'static,
{
    fn id(&self) -> &str {
        "ContentLength"
    }

    fn handle<'a>(
        &'a self,
        ctx: &'a HttpContext,
        mut request: HttpRequest,
        next: &'a dyn Handler<HttpRequest, OperationOutput<O>>,
    ) -> HandlerFuture<'a, OperationOutput<O>> {
        if matches!(request.body, ByteStream::Consumed) {
            return Box::pin(async { Err(ClientError::StreamConsumed) });
        }

        if !request.headers.contains_key(CONTENT_LENGTH) {
            match request.body.size_hint().exact() {
                Some(len) => {
                    request.headers.insert(CONTENT_LENGTH, HeaderValue::from(len));
                }
                None => {
                    request
                        .headers
                        .insert(TRANSFER_ENCODING, HeaderValue::from_static("chunked"));
                }
            }
        }
        next.handle(ctx, request)
    }
}
