//! Deserialize step: turn the response into the operation output or a service error.
//!
//! On a 2xx status the success closure runs once and may read the body stream directly. On
//! any other status the body is first buffered in full, so the error closure can parse it as
//! many times as it needs: once for the protocol envelope ([`RestXmlError`]) and again for the
//! shape of the specific error.

use futures::future::BoxFuture;
use http::StatusCode;
use rustack_client_xml::RestXmlError;
use tracing::debug;

use crate::context::HttpContext;
use crate::error::ClientError;
use crate::handler::{Handler, HandlerFuture};
use crate::middleware::Middleware;
use crate::request::HttpRequest;
use crate::response::{HttpResponse, OperationOutput};

type OutputFn<O> = Box<
    dyn for<'r> Fn(&'r mut HttpResponse) -> BoxFuture<'r, Result<O, ClientError>> + Send + Sync,
>;
type ErrorFn = Box<dyn for<'r> Fn(&'r HttpResponse) -> BoxFuture<'r, ClientError> + Send + Sync>;

/// Decodes responses with generated success and error closures.
pub struct DeserializeMiddleware<O> {
    output: OutputFn<O>,
    error: ErrorFn,
    error_body_limit: Option<usize>,
}

impl<O> std::fmt::Debug for DeserializeMiddleware<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeserializeMiddleware")
            .field("error_body_limit", &self.error_body_limit)
            .finish_non_exhaustive()
    }
}

impl<O> DeserializeMiddleware<O> {
    /// Create the middleware from a success closure and an error closure.
    ///
    /// The error closure always produces an error; it never yields an output.
    pub fn new<S, E>(output: S, error: E) -> Self
    where
        S: for<'r> Fn(&'r mut HttpResponse) -> BoxFuture<'r, Result<O, ClientError>>
            + Send
            + Sync
            + 'static,
        E: for<'r> Fn(&'r HttpResponse) -> BoxFuture<'r, ClientError> + Send + Sync + 'static,
    {
        Self {
            output: Box::new(output),
            error: Box::new(error),
            error_body_limit: None,
        }
    }

    /// Cap the bytes buffered from an error body. Overrides the context's limit.
    #[must_use]
    pub fn with_error_body_limit(mut self, limit: usize) -> Self {
        self.error_body_limit = Some(limit);
        self
    }
}

impl<O> Middleware<HttpRequest, OperationOutput<O>> for DeserializeMiddleware<O>
where
    O: Send + 'static,
{
    fn id(&self) -> &str {
        "Deserialize"
    }

    fn handle<'a>(
        &'a self,
        ctx: &'a HttpContext,
        request: HttpRequest,
        next: &'a dyn Handler<HttpRequest, OperationOutput<O>>,
    ) -> HandlerFuture<'a, OperationOutput<O>> {
        Box::pin(async move {
            let mut out = next.handle(ctx, request).await?;
            let status = out.response.status;

            if out.response.is_success() {
                let output = (self.output)(&mut out.response).await?;
                out.output = Some(output);
                debug!(
                    operation = ctx.operation(),
                    invocation_id = %ctx.invocation_id(),
                    %status,
                    "decoded operation output"
                );
                return Ok(out);
            }

            let body = match self.error_body_limit.or(ctx.max_error_body_size()) {
                Some(limit) => out.response.body.read_data_limited(limit).await?,
                None => out.response.body.read_data().await?,
            };
            debug!(
                operation = ctx.operation(),
                invocation_id = %ctx.invocation_id(),
                %status,
                bytes = body.len(),
                "buffered error response"
            );
            Err((self.error)(&out.response).await)
        })
    }
}

/// Parse the RestXml error envelope out of a buffered error response.
///
/// # Errors
///
/// `Deserialization` if the body is still an unread stream or is not a valid envelope.
pub fn rest_xml_envelope(response: &HttpResponse) -> Result<RestXmlError, ClientError> {
    let body = response.body.bytes().ok_or_else(|| {
        ClientError::Deserialization("error response body has not been buffered".to_owned())
    })?;
    RestXmlError::parse(body).map_err(|e| ClientError::Deserialization(e.to_string()))
}

/// An error response whose code matches no error modeled for the operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{status}: {}: {}", code.as_deref().unwrap_or("Unknown"), message.as_deref().unwrap_or("no message"))]
pub struct UnknownServiceError {
    /// HTTP status of the response.
    pub status: StatusCode,
    /// Error code from the envelope.
    pub code: Option<String>,
    /// Error message from the envelope.
    pub message: Option<String>,
    /// Request id from the envelope or the `x-amz-request-id` header.
    pub request_id: Option<String>,
}

impl UnknownServiceError {
    /// Build from a response and its parsed envelope.
    #[must_use]
    pub fn new(response: &HttpResponse, envelope: RestXmlError) -> Self {
        Self {
            status: response.status,
            code: envelope.code,
            message: envelope.message,
            request_id: envelope
                .request_id
                .or_else(|| response.header("x-amz-request-id").map(str::to_owned)),
        }
    }
}
