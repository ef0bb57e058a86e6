//! Per-invocation context threaded through every middleware.

use http::{Extensions, Method};
use parking_lot::Mutex;
use typed_builder::TypedBuilder;
use uuid::Uuid;

use crate::config::ClientLogMode;
use crate::endpoint::Endpoint;

/// Ambient state for one operation invocation.
///
/// A context is created per call and shared by reference with every middleware. Middlewares
/// that need to hand data to later steps use the typed attribute bag.
#[derive(Debug, TypedBuilder)]
pub struct HttpContext {
    #[builder(setter(into))]
    service: String,
    #[builder(setter(into))]
    operation: String,
    #[builder(default = String::from("us-east-1"), setter(into))]
    region: String,
    #[builder(default)]
    method: Method,
    #[builder(default, setter(strip_option))]
    endpoint: Option<Endpoint>,
    #[builder(default, setter(strip_option, into))]
    host_prefix: Option<String>,
    #[builder(default)]
    log_mode: ClientLogMode,
    #[builder(default)]
    max_error_body_size: Option<usize>,
    #[builder(default = Uuid::new_v4())]
    invocation_id: Uuid,
    #[builder(default)]
    attributes: Mutex<Extensions>,
}

impl HttpContext {
    /// Service name, e.g. `S3`.
    #[must_use]
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Operation name, e.g. `GetObject`.
    #[must_use]
    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Signing/target region.
    #[must_use]
    pub fn region(&self) -> &str {
        &self.region
    }

    /// HTTP method of the operation; seeds the request the serialize step receives.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Resolved endpoint, if one was supplied.
    #[must_use]
    pub fn endpoint(&self) -> Option<&Endpoint> {
        self.endpoint.as_ref()
    }

    /// Host prefix for operations with an endpoint trait, e.g. `{AccountId}.`.
    #[must_use]
    pub fn host_prefix(&self) -> Option<&str> {
        self.host_prefix.as_deref()
    }

    /// What the logger middleware records.
    #[must_use]
    pub fn log_mode(&self) -> ClientLogMode {
        self.log_mode
    }

    /// Cap on buffered error body bytes; `None` means unbounded.
    #[must_use]
    pub fn max_error_body_size(&self) -> Option<usize> {
        self.max_error_body_size
    }

    /// Unique id of this invocation, attached to log lines.
    #[must_use]
    pub fn invocation_id(&self) -> Uuid {
        self.invocation_id
    }

    /// Replace the HTTP method.
    #[must_use]
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Replace the endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    /// Replace the host prefix.
    #[must_use]
    pub fn with_host_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.host_prefix = Some(prefix.into());
        self
    }

    /// Store a typed attribute, returning the previous value of that type.
    pub fn insert_attribute<T: Clone + Send + Sync + 'static>(&self, value: T) -> Option<T> {
        self.attributes.lock().insert(value)
    }

    /// A copy of the attribute of type `T`, if set.
    #[must_use]
    pub fn attribute<T: Clone + Send + Sync + 'static>(&self) -> Option<T> {
        self.attributes.lock().get::<T>().cloned()
    }
}
