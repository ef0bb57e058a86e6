//! In-memory transport with scripted replies.

use std::collections::VecDeque;
use std::io;
use std::time::Duration;

use bytes::Bytes;
use futures::stream;
use http::{HeaderMap, Method, StatusCode};
use http_body::Frame;
use http_body_util::{BodyExt, StreamBody};
use parking_lot::Mutex;
use rustack_client_http::{
    BoxError, ByteStream, ClientError, Handler, HandlerFuture, HttpContext, HttpRequest,
    HttpResponse,
};

/// A request as it reached the wire.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// Method.
    pub method: Method,
    /// Full URI.
    pub uri: String,
    /// Headers.
    pub headers: HeaderMap,
    /// Fully read body.
    pub body: Bytes,
}

impl RecordedRequest {
    /// The body as UTF-8 text.
    #[must_use]
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// The first value of a header.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// What the transport does with the next request.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Respond with a buffered body.
    Buffered(StatusCode, &'static str),
    /// Respond with a body delivered chunk by chunk as a stream.
    Streamed(StatusCode, Vec<&'static str>),
    /// Respond with a stream that fails after the given chunks.
    Broken(StatusCode, Vec<&'static str>),
    /// Never respond; fail once the deadline passes.
    Timeout(Duration),
}

/// A transport that records requests and answers from a queue of replies.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MemoryTransport {
    /// A transport that answers the first request with `reply`.
    #[must_use]
    pub fn new(reply: Reply) -> Self {
        let transport = Self::default();
        transport.push(reply);
        transport
    }

    /// Queue another reply.
    pub fn push(&self, reply: Reply) {
        self.replies.lock().push_back(reply);
    }

    /// Requests received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    fn respond(reply: Reply) -> HandlerFuture<'static, HttpResponse> {
        Box::pin(async move {
            match reply {
                Reply::Buffered(status, body) => {
                    Ok(with_request_id(HttpResponse::new(status, body)))
                }
                Reply::Streamed(status, chunks) => {
                    Ok(with_request_id(HttpResponse::new(status, streamed(chunks, false))))
                }
                Reply::Broken(status, chunks) => {
                    Ok(with_request_id(HttpResponse::new(status, streamed(chunks, true))))
                }
                Reply::Timeout(deadline) => {
                    let never = futures::future::pending::<()>();
                    let _ = tokio::time::timeout(deadline, never).await;
                    Err(ClientError::transport(io::Error::new(
                        io::ErrorKind::TimedOut,
                        format!("no response within {deadline:?}"),
                    )))
                }
            }
        })
    }
}

fn with_request_id(mut response: HttpResponse) -> HttpResponse {
    response.headers.insert(
        "x-amz-request-id",
        http::HeaderValue::from_static("memory-0001"),
    );
    response
}

fn streamed(chunks: Vec<&'static str>, broken: bool) -> ByteStream {
    let mut frames: Vec<Result<Frame<Bytes>, BoxError>> = chunks
        .into_iter()
        .map(|c| Ok(Frame::data(Bytes::from_static(c.as_bytes()))))
        .collect();
    if broken {
        frames.push(Err(
            io::Error::new(io::ErrorKind::ConnectionReset, "connection reset").into(),
        ));
    }
    ByteStream::from_body(StreamBody::new(stream::iter(frames)))
}

impl Handler<HttpRequest, HttpResponse> for MemoryTransport {
    fn handle<'a>(
        &'a self,
        _ctx: &'a HttpContext,
        request: HttpRequest,
    ) -> HandlerFuture<'a, HttpResponse> {
        Box::pin(async move {
            let (parts, body) = request.to_http()?.into_parts();
            let body = body
                .collect()
                .await
                .map_err(ClientError::BodyMaterialization)?
                .to_bytes();
            tracing::debug!(
                method = %parts.method,
                uri = %parts.uri,
                bytes = body.len(),
                "memory transport received request"
            );
            self.requests.lock().push(RecordedRequest {
                method: parts.method,
                uri: parts.uri.to_string(),
                headers: parts.headers,
                body,
            });

            let reply = self.replies.lock().pop_front().ok_or_else(|| {
                ClientError::transport(io::Error::new(
                    io::ErrorKind::ConnectionRefused,
                    "no scripted reply left",
                ))
            })?;
            Self::respond(reply).await
        })
    }
}
