//! Service endpoint value type.

use std::fmt;

use crate::error::ClientError;
use crate::request::{QueryItem, parse_query};

/// URL scheme of an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProtocolType {
    /// Plain HTTP.
    Http,
    /// HTTP over TLS.
    #[default]
    Https,
}

impl ProtocolType {
    /// The scheme string, `http` or `https`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }
}

impl fmt::Display for ProtocolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where requests for a service are sent.
///
/// Equality and hashing cover every field. Query items compare in order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    /// Host name without port.
    pub host: String,
    /// Base path, kept exactly as given.
    pub path: String,
    /// Explicit port.
    pub port: Option<u16>,
    /// Scheme.
    pub protocol: ProtocolType,
    /// Query items sent with every request, decoded.
    pub query_items: Vec<QueryItem>,
}

impl Endpoint {
    /// Create an HTTPS endpoint for `host` with an empty base path.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            path: String::new(),
            port: None,
            protocol: ProtocolType::Https,
            query_items: Vec::new(),
        }
    }

    /// Parse an absolute URL.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidEndpoint` if the URL does not parse, has no host, or uses a
    /// scheme other than `http`/`https`.
    pub fn from_url(url: &str) -> Result<Self, ClientError> {
        let uri: http::Uri = url
            .parse()
            .map_err(|e: http::uri::InvalidUri| {
                ClientError::InvalidEndpoint(format!("{url}: {e}"))
            })?;

        let protocol = match uri.scheme_str() {
            Some("http") => ProtocolType::Http,
            Some("https") | None => ProtocolType::Https,
            Some(other) => {
                return Err(ClientError::InvalidEndpoint(format!(
                    "{url}: unsupported scheme `{other}`"
                )));
            }
        };
        let host = uri
            .host()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| ClientError::InvalidEndpoint(format!("{url}: missing host")))?;

        Ok(Self {
            host: host.to_owned(),
            path: raw_path(url).to_owned(),
            port: uri.port_u16(),
            protocol,
            query_items: uri.query().map(parse_query).unwrap_or_default(),
        })
    }

    /// Render the endpoint back to a URL.
    ///
    /// The path is emitted verbatim; query items are percent-encoded.
    #[must_use]
    pub fn url(&self) -> String {
        let mut url = format!(
            "{}://{}{}{}",
            self.protocol,
            self.host,
            port_suffix(self.port),
            self.path
        );
        if !self.query_items.is_empty() {
            url.push('?');
            let encoded: Vec<String> = self.query_items.iter().map(QueryItem::encoded).collect();
            url.push_str(&encoded.join("&"));
        }
        url
    }
}

/// The path exactly as written in `url`. `http::Uri` reports `/` for an absent path.
fn raw_path(url: &str) -> &str {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    let rest = rest.split(['?', '#']).next().unwrap_or_default();
    rest.find('/').map_or("", |i| &rest[i..])
}

fn port_suffix(port: Option<u16>) -> String {
    port.map(|p| format!(":{p}")).unwrap_or_default()
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url())
    }
}
