//! Error types for operation invocation.
//!
//! Every failure that can surface from an operation stack is a [`ClientError`]. Middlewares
//! pass errors through untouched; nothing in the stack converts an error into a default
//! value.

use std::fmt;

use rustack_client_xml::XmlError;

/// Boxed error used for transport and body I/O failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced to the caller of an operation.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The transport failed to produce a response (connection failure, timeout, ...).
    #[error("transport error: {0}")]
    Transport(#[source] BoxError),

    /// The input could not be serialized; no request was sent.
    #[error("serialization error: {0}")]
    Serialization(#[from] XmlError),

    /// The service answered with a non-2xx status and the body decoded into this error.
    #[error("service error: {0}")]
    Service(ServiceError),

    /// Buffering an error response body failed before protocol decoding could start.
    #[error("failed to read response body: {0}")]
    BodyMaterialization(#[source] BoxError),

    /// A single-use body stream was read a second time.
    #[error("response body stream has already been consumed")]
    StreamConsumed,

    /// A successful response body could not be decoded into the operation output.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// The stack completed without any step populating the operation output.
    #[error("operation completed without producing an output")]
    MissingOutput,

    /// A URL could not be parsed into an endpoint.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// A request could not be converted to its wire form.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Relative middleware insertion named a step id that is not registered.
    #[error("no middleware with id `{0}` in this step")]
    UnknownStep(String),

    /// A middleware id was registered twice in the same step.
    #[error("middleware with id `{0}` is already registered in this step")]
    DuplicateStep(String),
}

impl ClientError {
    /// Wrap a transport failure.
    pub fn transport(err: impl Into<BoxError>) -> Self {
        Self::Transport(err.into())
    }

    /// Wrap a decoded service error.
    pub fn service(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Service(ServiceError::new(err))
    }

    /// The service error, if this is one.
    #[must_use]
    pub fn as_service(&self) -> Option<&ServiceError> {
        match self {
            Self::Service(err) => Some(err),
            _ => None,
        }
    }
}

/// A structured error decoded from a non-2xx response.
///
/// The concrete type is chosen by the operation's error closure; callers recover it with
/// [`ServiceError::downcast_ref`].
pub struct ServiceError {
    inner: BoxError,
}

impl ServiceError {
    /// Box a decoded error.
    pub fn new(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self {
            inner: Box::new(err),
        }
    }

    /// Borrow the decoded error as a concrete type.
    #[must_use]
    pub fn downcast_ref<E: std::error::Error + 'static>(&self) -> Option<&E> {
        self.inner.downcast_ref::<E>()
    }

    /// Take the decoded error back out of the box.
    ///
    /// # Errors
    ///
    /// Returns `self` unchanged if the error is not an `E`.
    pub fn downcast<E: std::error::Error + 'static>(self) -> Result<E, Self> {
        match self.inner.downcast::<E>() {
            Ok(err) => Ok(*err),
            Err(inner) => Err(Self { inner }),
        }
    }
}

impl fmt::Debug for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.inner, f)
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}
