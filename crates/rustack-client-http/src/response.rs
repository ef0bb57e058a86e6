//! Wire-level response type and the operation output wrapper.

use bytes::Bytes;
use http::{HeaderMap, StatusCode};

use crate::body::ByteStream;
use crate::error::BoxError;

/// A response as received from the transport.
#[derive(Debug)]
pub struct HttpResponse {
    /// Status code.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Response body; a stream until something materializes it.
    pub body: ByteStream,
}

impl HttpResponse {
    /// Create a response with no headers.
    pub fn new(status: StatusCode, body: impl Into<ByteStream>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Adapt an `http::Response` with any body type. The body is kept as an unread stream.
    pub fn from_http<B>(response: http::Response<B>) -> Self
    where
        B: http_body::Body<Data = Bytes> + Send + Sync + 'static,
        B::Error: Into<BoxError>,
    {
        let (parts, body) = response.into_parts();
        Self {
            status: parts.status,
            headers: parts.headers,
            body: ByteStream::from_body(body),
        }
    }

    /// Whether the status is in `200..300`.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// The first value of a header as a string.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// The result of running an operation stack: the wire response plus the decoded output.
///
/// `output` is set by the deserialize step on success and stays `None` otherwise.
#[derive(Debug)]
pub struct OperationOutput<O> {
    /// The raw response.
    pub response: HttpResponse,
    /// The decoded output, if deserialization ran and succeeded.
    pub output: Option<O>,
}

impl<O> OperationOutput<O> {
    /// Wrap a response with no output yet.
    #[must_use]
    pub fn new(response: HttpResponse) -> Self {
        Self {
            response,
            output: None,
        }
    }
}
