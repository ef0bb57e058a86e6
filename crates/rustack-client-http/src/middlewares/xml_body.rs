//! Serialize step: render the operation input as an XML request body.

use http::HeaderValue;
use http::header::CONTENT_TYPE;
use rustack_client_xml::{NodeInfo, Writer, XmlError, write_document};

use crate::body::ByteStream;
use crate::context::HttpContext;
use crate::handler::{Handler, HandlerFuture};
use crate::middleware::Middleware;
use crate::response::OperationOutput;
use crate::stack::SerializeStepInput;

type WriteFn<I> = Box<dyn Fn(&I, &mut Writer<'_>) -> Result<(), XmlError> + Send + Sync>;

/// Builds a fresh document rooted at a fixed node, lets a generated closure populate it, and
/// stores the rendered bytes as the request body with `Content-Type: application/xml`.
///
/// The closure runs exactly once per invocation. If it fails, the error is returned and the
/// rest of the chain is never called. If the closure detaches the root, the document renders
/// to nothing and the request keeps an empty body.
pub struct XmlBodyMiddleware<I> {
    root: NodeInfo,
    write: WriteFn<I>,
}

impl<I> std::fmt::Debug for XmlBodyMiddleware<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XmlBodyMiddleware")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl<I> XmlBodyMiddleware<I> {
    /// Create the middleware for documents rooted at `root`.
    pub fn new<F>(root: impl Into<NodeInfo>, write: F) -> Self
    where
        F: Fn(&I, &mut Writer<'_>) -> Result<(), XmlError> + Send + Sync + 'static,
    {
        Self {
            root: root.into(),
            write: Box::new(write),
        }
    }
}

impl<I, O> Middleware<SerializeStepInput<I>, OperationOutput<O>> for XmlBodyMiddleware<I>
where
    I: Send + 'static,
    O: Send + 'static,
{
    fn id(&self) -> &str {
        "XmlBody"
    }

    fn handle<'a>(
        &'a self,
        ctx: &'a HttpContext,
        mut input: SerializeStepInput<I>,
        next: &'a dyn Handler<SerializeStepInput<I>, OperationOutput<O>>,
    ) -> HandlerFuture<'a, OperationOutput<O>> {
        Box::pin(async move {
            let xml = write_document(self.root.clone(), &input.operation_input, |value, w| {
                (self.write)(value, w)
            })?;
            if xml.is_empty() {
                tracing::trace!(operation = ctx.operation(), "XML payload omitted");
            } else {
                input.request.body = ByteStream::from(xml);
                input
                    .request
                    .headers
                    .insert(CONTENT_TYPE, HeaderValue::from_static("application/xml"));
            }
            next.handle(ctx, input).await
        })
    }
}
