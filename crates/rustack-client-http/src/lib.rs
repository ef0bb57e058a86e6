//! Operation pipeline for the Rustack client runtime.
//!
//! Every generated operation runs the same way: a typed input is pushed through an ordered
//! chain of middlewares that build an HTTP request, a transport sends it, and the response
//! travels back out through the same chain to become a typed output or a typed error. This
//! crate holds that chain and the wire types it passes around.
//!
//! - **Handlers and middlewares** ([`handler`], [`middleware`]): the [`Handler`] trait, onion
//!   composition of [`Middleware`]s, and id-addressed insertion within a [`MiddlewareStep`].
//!
//! - **Operation stack** ([`stack`]): the five fixed steps (`initialize`, `serialize`, `build`,
//!   `finalize`, `deserialize`) of an [`OperationStack`].
//!
//! - **Built-in steps** ([`middlewares`]): XML body rendering, URI/query/header bindings,
//!   endpoint resolution, body framing, logging, and response decoding with two-pass error
//!   parsing.
//!
//! - **Wire types** ([`request`], [`response`], [`body`], [`endpoint`]): [`HttpRequest`],
//!   [`HttpResponse`], the single-use [`ByteStream`] body, and [`Endpoint`].
//!
//! - **Context and configuration** ([`context`], [`config`]): per-invocation [`HttpContext`] and
//!   environment-driven [`ClientConfig`].
//!
//! # Architecture
//!
//! ```text
//! operation input
//!   -> initialize
//!   -> serialize     (XmlBody, UrlPath, QueryItems, Headers)
//!   -> build         (Endpoint)
//!   -> finalize      (ContentLength)
//!   -> deserialize   (Deserialize -> Logger)
//!     -> transport (Handler<HttpRequest, HttpResponse>)
//!   <- OperationOutput { response, output }
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use rustack_client_http::middlewares::{DeserializeMiddleware, add_default_middlewares};
//! use rustack_client_http::{ClientConfig, ClientError, Endpoint, OperationStack};
//!
//! # fn main() -> Result<(), ClientError> {
//! let mut stack = OperationStack::<(), String>::new("ListBuckets");
//! add_default_middlewares(
//!     &mut stack,
//!     DeserializeMiddleware::new(
//!         |resp| Box::pin(async move { Ok(String::from_utf8_lossy(&resp.body.read_data().await?).into_owned()) }),
//!         |_resp| Box::pin(async { ClientError::MissingOutput }),
//!     ),
//! )?;
//! let ctx = ClientConfig::default()
//!     .context("S3", "ListBuckets")
//!     .with_endpoint(Endpoint::from_url("http://localhost:4566")?);
//! // stack.execute(&ctx, (), &transport).await
//! # let _ = ctx;
//! # Ok(())
//! # }
//! ```

pub mod body;
pub mod config;
pub mod context;
pub mod endpoint;
pub mod error;
pub mod handler;
pub mod middleware;
pub mod middlewares;
pub mod request;
pub mod response;
pub mod stack;

pub use body::ByteStream;
pub use config::{ClientConfig, ClientLogMode};
pub use context::HttpContext;
pub use endpoint::{Endpoint, ProtocolType};
pub use error::{BoxError, ClientError, ServiceError};
pub use handler::{Handler, HandlerFn, HandlerFuture, handler_fn};
pub use middleware::{Chain, ClosureMiddleware, Middleware, MiddlewareStep, Position};
pub use request::{HttpRequest, QueryItem};
pub use response::{HttpResponse, OperationOutput};
pub use stack::{OperationStack, SerializeStepInput};
