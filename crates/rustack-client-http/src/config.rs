//! Client runtime configuration.
//!
//! Provides [`ClientConfig`] for the policies the operation stack consults at run time.
//! Values are loaded from environment variables, falling back to defaults.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::context::HttpContext;

/// What the [`LoggerMiddleware`](crate::middlewares::LoggerMiddleware) records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientLogMode {
    /// Log nothing.
    None,
    /// Log the request line and headers.
    Request,
    /// Log the request including a buffered body.
    RequestWithBody,
    /// Log the response status and headers.
    Response,
    /// Log the response including a buffered body.
    ResponseWithBody,
    /// Log both request and response without bodies.
    #[default]
    RequestAndResponse,
    /// Log both request and response including buffered bodies.
    RequestAndResponseWithBody,
}

impl ClientLogMode {
    /// Whether requests are logged.
    #[must_use]
    pub fn logs_request(self) -> bool {
        matches!(
            self,
            Self::Request
                | Self::RequestWithBody
                | Self::RequestAndResponse
                | Self::RequestAndResponseWithBody
        )
    }

    /// Whether request bodies are logged.
    #[must_use]
    pub fn logs_request_body(self) -> bool {
        matches!(self, Self::RequestWithBody | Self::RequestAndResponseWithBody)
    }

    /// Whether responses are logged.
    #[must_use]
    pub fn logs_response(self) -> bool {
        matches!(
            self,
            Self::Response
                | Self::ResponseWithBody
                | Self::RequestAndResponse
                | Self::RequestAndResponseWithBody
        )
    }

    /// Whether response bodies are logged.
    #[must_use]
    pub fn logs_response_body(self) -> bool {
        matches!(
            self,
            Self::ResponseWithBody | Self::RequestAndResponseWithBody
        )
    }
}

impl FromStr for ClientLogMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "request" => Ok(Self::Request),
            "request_with_body" => Ok(Self::RequestWithBody),
            "response" => Ok(Self::Response),
            "response_with_body" => Ok(Self::ResponseWithBody),
            "request_and_response" => Ok(Self::RequestAndResponse),
            "request_and_response_with_body" => Ok(Self::RequestAndResponseWithBody),
            other => Err(format!("unknown client log mode: {other}")),
        }
    }
}

impl fmt::Display for ClientLogMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "none",
            Self::Request => "request",
            Self::RequestWithBody => "request_with_body",
            Self::Response => "response",
            Self::ResponseWithBody => "response_with_body",
            Self::RequestAndResponse => "request_and_response",
            Self::RequestAndResponseWithBody => "request_and_response_with_body",
        })
    }
}

/// Client runtime configuration.
///
/// # Examples
///
/// ```
/// use rustack_client_http::config::{ClientConfig, ClientLogMode};
///
/// let config = ClientConfig::default();
/// assert_eq!(config.log_mode, ClientLogMode::RequestAndResponse);
/// assert!(config.max_error_body_size.is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    /// What the logger middleware records.
    #[builder(default)]
    pub log_mode: ClientLogMode,

    /// Upper bound on bytes buffered from an error response body; `None` buffers all of it.
    #[builder(default, setter(strip_option))]
    pub max_error_body_size: Option<usize>,

    /// Default AWS region for requests built from this configuration.
    #[builder(default = String::from("us-east-1"))]
    pub default_region: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            log_mode: ClientLogMode::default(),
            max_error_body_size: None,
            default_region: String::from("us-east-1"),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `CLIENT_LOG_MODE` | `request_and_response` |
    /// | `CLIENT_MAX_ERROR_BODY_SIZE` | *(unset = unbounded)* |
    /// | `DEFAULT_REGION` | `us-east-1` |
    ///
    /// Unparseable values are ignored with a warning.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from any variable source, with the rules of [`from_env`](Self::from_env).
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(v) = lookup("CLIENT_LOG_MODE") {
            match v.parse() {
                Ok(mode) => config.log_mode = mode,
                Err(e) => tracing::warn!(error = %e, "ignoring CLIENT_LOG_MODE"),
            }
        }
        if let Some(v) = lookup("CLIENT_MAX_ERROR_BODY_SIZE") {
            match v.parse::<usize>() {
                Ok(n) => config.max_error_body_size = Some(n),
                Err(e) => tracing::warn!(error = %e, value = %v, "ignoring CLIENT_MAX_ERROR_BODY_SIZE"),
            }
        }
        if let Some(v) = lookup("DEFAULT_REGION") {
            config.default_region = v;
        }

        config
    }

    /// Create the per-invocation context for one operation call.
    #[must_use]
    pub fn context(
        &self,
        service: impl Into<String>,
        operation: impl Into<String>,
    ) -> HttpContext {
        HttpContext::builder()
            .service(service.into())
            .operation(operation.into())
            .region(self.default_region.clone())
            .log_mode(self.log_mode)
            .max_error_body_size(self.max_error_body_size)
            .build()
    }
}
