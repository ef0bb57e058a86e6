//! Request and response body type.
//!
//! [`ByteStream`] is either empty, an in-memory buffer, or a single-use stream. A stream can
//! be read exactly once: [`ByteStream::read_data`] drains it into a buffer and replaces the
//! stream with that buffer, after which the bytes are replayable. Reading a stream that was
//! already taken fails with [`ClientError::StreamConsumed`] instead of yielding partial or
//! empty data.

use std::fmt;

use bytes::Bytes;
use futures::future::BoxFuture;
use http_body::{Body, SizeHint};
use http_body_util::combinators::BoxBody;
use http_body_util::{BodyExt, Collected, Empty, Full, Limited};

use crate::error::{BoxError, ClientError};

static EMPTY: Bytes = Bytes::new();

/// A body that is empty, buffered, or a single-use stream.
///
/// `ByteStream` is not itself an `http_body::Body`: frames can only be pulled after handing the
/// whole value over with [`ByteStream::into_body`].
#[derive(Default)]
pub enum ByteStream {
    /// No body.
    #[default]
    Empty,
    /// Fully buffered bytes; may be read any number of times.
    Data(Bytes),
    /// A lazily produced body; may be read once.
    Stream(BoxBody<Bytes, BoxError>),
    /// The stream was taken and nothing replaced it.
    Consumed,
}

impl fmt::Debug for ByteStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("Empty"),
            Self::Data(data) => f.debug_tuple("Data").field(&data.len()).finish(),
            Self::Stream(body) => f
                .debug_struct("Stream")
                .field("size_hint", &body.size_hint().exact())
                .finish(),
            Self::Consumed => f.write_str("Consumed"),
        }
    }
}

impl ByteStream {
    /// Wrap any `http_body::Body` as a single-use stream.
    pub fn from_body<B>(body: B) -> Self
    where
        B: Body<Data = Bytes> + Send + Sync + 'static,
        B::Error: Into<BoxError>,
    {
        Self::Stream(body.map_err(Into::into).boxed())
    }

    /// The buffered bytes, if the body is replayable.
    ///
    /// `Empty` yields an empty buffer; a stream or a consumed body yields `None`.
    #[must_use]
    pub fn bytes(&self) -> Option<&Bytes> {
        match self {
            Self::Empty => Some(&EMPTY),
            Self::Data(data) => Some(data),
            Self::Stream(_) | Self::Consumed => None,
        }
    }

    /// Whether the body can be read more than once.
    #[must_use]
    pub fn is_replayable(&self) -> bool {
        matches!(self, Self::Empty | Self::Data(_))
    }

    /// Whether the body is a stream that has not been read yet.
    #[must_use]
    pub fn is_stream(&self) -> bool {
        matches!(self, Self::Stream(_))
    }

    /// Size bounds of the body. A consumed body reports zero.
    #[must_use]
    pub fn size_hint(&self) -> SizeHint {
        match self {
            Self::Empty | Self::Consumed => SizeHint::with_exact(0),
            Self::Data(data) => SizeHint::with_exact(data.len() as u64),
            Self::Stream(body) => body.size_hint(),
        }
    }

    /// Materialize the body into a buffer and return it.
    ///
    /// A stream is drained once and replaced by the buffer; later calls return the same bytes.
    /// If draining fails or the future is dropped mid-read, the partial bytes are discarded and
    /// the body is left `Consumed`.
    ///
    /// # Errors
    ///
    /// `BodyMaterialization` if the stream yields an error, `StreamConsumed` if it was taken.
    pub fn read_data(&mut self) -> BoxFuture<'_, Result<Bytes, ClientError>> {
        self.materialize(None)
    }

    /// Like [`read_data`](Self::read_data), failing with `BodyMaterialization` when the body
    /// holds more than `limit` bytes. A buffered body over the limit is left as it was.
    ///
    /// # Errors
    ///
    /// `BodyMaterialization` on stream errors or when the limit is exceeded, `StreamConsumed` if
    /// the stream was taken.
    pub fn read_data_limited(&mut self, limit: usize) -> BoxFuture<'_, Result<Bytes, ClientError>> {
        self.materialize(Some(limit))
    }

    fn materialize(&mut self, limit: Option<usize>) -> BoxFuture<'_, Result<Bytes, ClientError>> {
        Box::pin(async move {
            match std::mem::replace(self, Self::Consumed) {
                Self::Empty => {
                    *self = Self::Empty;
                    Ok(Bytes::new())
                }
                Self::Data(data) => {
                    let len = data.len();
                    *self = Self::Data(data.clone());
                    match limit {
                        Some(limit) if len > limit => Err(ClientError::BodyMaterialization(
                            format!("buffered body of {len} bytes exceeds the {limit} byte limit")
                                .into(),
                        )),
                        _ => Ok(data),
                    }
                }
                Self::Consumed => Err(ClientError::StreamConsumed),
                Self::Stream(body) => {
                    let collect: BoxFuture<'static, Result<Collected<Bytes>, BoxError>> =
                        match limit {
                            Some(limit) => Box::pin(Limited::new(body, limit).collect()),
                            None => Box::pin(body.collect()),
                        };
                    let data = collect
                        .await
                        .map_err(ClientError::BodyMaterialization)?
                        .to_bytes();
                    tracing::trace!(bytes = data.len(), "materialized body stream");
                    *self = Self::Data(data.clone());
                    Ok(data)
                }
            }
        })
    }

    /// Consume the body and return all of its bytes.
    ///
    /// Intended for single-pass readers that have no further use for the body.
    ///
    /// # Errors
    ///
    /// Same as [`read_data`](Self::read_data).
    pub async fn collect(mut self) -> Result<Bytes, ClientError> {
        self.materialize(None).await
    }

    /// Hand the body over as an `http_body::Body` for a transport.
    ///
    /// # Errors
    ///
    /// `StreamConsumed` if the stream was already taken.
    pub fn into_body(self) -> Result<BoxBody<Bytes, BoxError>, ClientError> {
        match self {
            Self::Empty => Ok(Empty::<Bytes>::new().map_err(Into::into).boxed()),
            Self::Data(data) => Ok(Full::new(data).map_err(Into::into).boxed()),
            Self::Stream(body) => Ok(body),
            Self::Consumed => Err(ClientError::StreamConsumed),
        }
    }
}

impl From<Bytes> for ByteStream {
    fn from(data: Bytes) -> Self {
        Self::Data(data)
    }
}

impl From<Vec<u8>> for ByteStream {
    fn from(data: Vec<u8>) -> Self {
        Self::Data(Bytes::from(data))
    }
}

impl From<String> for ByteStream {
    fn from(data: String) -> Self {
        Self::Data(Bytes::from(data))
    }
}

impl From<&'static str> for ByteStream {
    fn from(data: &'static str) -> Self {
        Self::Data(Bytes::from_static(data.as_bytes()))
    }
}
