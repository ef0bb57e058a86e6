//! Wire-level request type.
//!
//! [`HttpRequest`] is what the serialize, build and finalize steps mutate. It keeps the URL
//! in parts (scheme, host, port, path, ordered query items) so that middlewares can edit one
//! piece without reparsing the others; [`HttpRequest::to_http`] joins them back together when
//! the request is handed to a transport.

use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use http_body_util::combinators::BoxBody;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

use crate::body::ByteStream;
use crate::endpoint::ProtocolType;
use crate::error::{BoxError, ClientError};

/// Characters left unencoded in query names and values: the RFC 3986 unreserved set.
const QUERY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Path label encoding: everything but unreserved characters.
const LABEL_ENCODE_SET: &AsciiSet = QUERY_ENCODE_SET;

/// Greedy path label encoding: like [`LABEL_ENCODE_SET`] but `/` is kept.
const GREEDY_LABEL_ENCODE_SET: &AsciiSet = &LABEL_ENCODE_SET.remove(b'/');

/// A single query parameter. Values are stored decoded.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryItem {
    /// Parameter name.
    pub name: String,
    /// Parameter value; `None` renders as a bare `name` with no `=`.
    pub value: Option<String>,
}

impl QueryItem {
    /// Create a `name=value` item.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
        }
    }

    /// Create a value-less item such as `?uploads`.
    pub fn flag(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }

    pub(crate) fn encoded(&self) -> String {
        let name = utf8_percent_encode(&self.name, QUERY_ENCODE_SET);
        match &self.value {
            Some(value) => format!("{name}={}", utf8_percent_encode(value, QUERY_ENCODE_SET)),
            None => name.to_string(),
        }
    }
}

/// Parse a raw query string into decoded items, preserving order.
pub(crate) fn parse_query(query: &str) -> Vec<QueryItem> {
    query
        .split('&')
        .filter(|s| !s.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((name, value)) => QueryItem::new(decode_component(name), decode_component(value)),
            None => QueryItem::flag(decode_component(pair)),
        })
        .collect()
}

fn decode_component(s: &str) -> String {
    percent_decode_str(s).decode_utf8_lossy().into_owned()
}

fn encode_query(items: &[QueryItem]) -> String {
    items
        .iter()
        .map(QueryItem::encoded)
        .collect::<Vec<_>>()
        .join("&")
}

/// Percent-encode a value bound to a URI path label.
///
/// A greedy label (`{Key+}`) keeps `/` so that the value may span several path segments.
#[must_use]
pub fn encode_label(value: &str, greedy: bool) -> String {
    let set = if greedy {
        GREEDY_LABEL_ENCODE_SET
    } else {
        LABEL_ENCODE_SET
    };
    utf8_percent_encode(value, set).to_string()
}

/// A mutable request in the process of being built.
#[derive(Debug)]
pub struct HttpRequest {
    /// HTTP method.
    pub method: Method,
    /// URL scheme.
    pub protocol: ProtocolType,
    /// Target host; filled in by the build step.
    pub host: String,
    /// Explicit port, if any.
    pub port: Option<u16>,
    /// Already-encoded path, starting with `/`.
    pub path: String,
    /// Query items in the order they will be sent.
    pub query_items: Vec<QueryItem>,
    /// Request headers.
    pub headers: HeaderMap,
    /// Request body.
    pub body: ByteStream,
}

impl Default for HttpRequest {
    fn default() -> Self {
        Self::new(Method::GET)
    }
}

impl HttpRequest {
    /// Create an empty request with the given method and path `/`.
    #[must_use]
    pub fn new(method: Method) -> Self {
        Self {
            method,
            protocol: ProtocolType::Https,
            host: String::new(),
            port: None,
            path: "/".to_owned(),
            query_items: Vec::new(),
            headers: HeaderMap::new(),
            body: ByteStream::Empty,
        }
    }

    /// Set a header, replacing any existing values.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidRequest` if the name or value is not valid in a header.
    pub fn set_header(&mut self, name: &str, value: &str) -> Result<(), ClientError> {
        let (name, value) = header_pair(name, value)?;
        self.headers.insert(name, value);
        Ok(())
    }

    /// Append a header value, keeping existing values for the same name.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidRequest` if the name or value is not valid in a header.
    pub fn append_header(&mut self, name: &str, value: &str) -> Result<(), ClientError> {
        let (name, value) = header_pair(name, value)?;
        self.headers.append(name, value);
        Ok(())
    }

    /// The first value of a header as a string.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Render the full request URL.
    #[must_use]
    pub fn url(&self) -> String {
        let mut url = format!("{}://{}", self.protocol, self.host);
        if let Some(port) = self.port {
            url.push_str(&format!(":{port}"));
        }
        if !self.path.starts_with('/') {
            url.push('/');
        }
        url.push_str(&self.path);
        if !self.query_items.is_empty() {
            url.push('?');
            url.push_str(&encode_query(&self.query_items));
        }
        url
    }

    /// Convert into an `http::Request` for a transport.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidRequest` if no host was set or the URL does not parse, and
    /// `ClientError::StreamConsumed` if the body stream was already taken.
    pub fn to_http(self) -> Result<http::Request<BoxBody<Bytes, BoxError>>, ClientError> {
        if self.host.is_empty() {
            return Err(ClientError::InvalidRequest(
                "request has no host; is an endpoint configured?".to_owned(),
            ));
        }
        let uri: http::Uri = self
            .url()
            .parse()
            .map_err(|e: http::uri::InvalidUri| ClientError::InvalidRequest(e.to_string()))?;

        let mut request = http::Request::new(self.body.into_body()?);
        *request.method_mut() = self.method;
        *request.uri_mut() = uri;
        *request.headers_mut() = self.headers;
        Ok(request)
    }
}

fn header_pair(name: &str, value: &str) -> Result<(HeaderName, HeaderValue), ClientError> {
    let name = HeaderName::from_bytes(name.as_bytes())
        .map_err(|e| ClientError::InvalidRequest(format!("header name `{name}`: {e}")))?;
    let value = HeaderValue::from_str(value)
        .map_err(|e| ClientError::InvalidRequest(format!("header `{name}` value: {e}")))?;
    Ok((name, value))
}
