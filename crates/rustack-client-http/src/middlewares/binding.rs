//! Serialize step: bind input members to the URI path, query string, and headers.

use crate::context::HttpContext;
use crate::error::ClientError;
use crate::handler::{Handler, HandlerFuture};
use crate::middleware::Middleware;
use crate::request::QueryItem;
use crate::response::OperationOutput;
use crate::stack::SerializeStepInput;

type PathFn<I> = Box<dyn Fn(&I) -> Result<String, ClientError> + Send + Sync>;
type QueryFn<I> = Box<dyn Fn(&I) -> Vec<QueryItem> + Send + Sync>;
type HeaderFn<I> = Box<dyn Fn(&I) -> Vec<(String, String)> + Send + Sync>;

/// Sets the request path from the input, typically by expanding `{Label}` segments with
/// [`encode_label`](crate::request::encode_label).
pub struct UrlPathMiddleware<I> {
    path: PathFn<I>,
}

impl<I> std::fmt::Debug for UrlPathMiddleware<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UrlPathMiddleware").finish_non_exhaustive()
    }
}

impl<I> UrlPathMiddleware<I> {
    /// Create the middleware. The closure fails when a required label is missing.
    pub fn new<F>(path: F) -> Self
    where
        F: Fn(&I) -> Result<String, ClientError> + Send + Sync + 'static,
    {
        Self {
            path: Box::new(path),
        }
    }
}

impl<I, O> Middleware<SerializeStepInput<I>, OperationOutput<O>> for UrlPathMiddleware<I>
where
    I: Send + 'static,
    O: Send + 'static,
{
    fn id(&self) -> &str {
        "UrlPath"
    }

    fn handle<'a>(
        &'a self,
        ctx: &'a HttpContext,
        mut input: SerializeStepInput<I>,
        next: &'a dyn Handler<SerializeStepInput<I>, OperationOutput<O>>,
    ) -> HandlerFuture<'a, OperationOutput<O>> {
        match (self.path)(&input.operation_input) {
            Ok(path) => {
                input.request.path = path;
                next.handle(ctx, input)
            }
            Err(err) => Box::pin(async move { Err(err) }),
        }
    }
}

/// Appends query items derived from the input, in the order the closure returns them.
pub struct QueryItemMiddleware<I> {
    items: QueryFn<I>,
}

impl<I> std::fmt::Debug for QueryItemMiddleware<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryItemMiddleware").finish_non_exhaustive()
    }
}

impl<I> QueryItemMiddleware<I> {
    /// Create the middleware.
    pub fn new<F>(items: F) -> Self
    where
        F: Fn(&I) -> Vec<QueryItem> + Send + Sync + 'static,
    {
        Self {
            items: Box::new(items),
        }
    }
}

impl<I, O> Middleware<SerializeStepInput<I>, OperationOutput<O>> for QueryItemMiddleware<I>
where
    I: Send + 'static,
    O: Send + 'static,
{
    fn id(&self) -> &str {
        "QueryItems"
    }

    fn handle<'a>(
        &'a self,
        ctx: &'a HttpContext,
        mut input: SerializeStepInput<I>,
        next: &'a dyn Handler<SerializeStepInput<I>, OperationOutput<O>>,
    ) -> HandlerFuture<'a, OperationOutput<O>> {
        let items = (self.items)(&input.operation_input);
        input.request.query_items.extend(items);
        next.handle(ctx, input)
    }
}

/// Adds headers derived from the input. Repeated names are appended, not replaced.
pub struct HeaderMiddleware<I> {
    headers: HeaderFn<I>,
}

impl<I> std::fmt::Debug for HeaderMiddleware<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeaderMiddleware").finish_non_exhaustive()
    }
}

impl<I> HeaderMiddleware<I> {
    /// Create the middleware.
    pub fn new<F>(headers: F) -> Self
    where
        F: Fn(&I) -> Vec<(String, String)> + Send + Sync + 'static,
    {
        Self {
            headers: Box::new(headers),
        }
    }
}

impl<I, O> Middleware<SerializeStepInput<I>, OperationOutput<O>> for HeaderMiddleware<I>
where
    I: Send + 'static,
    O: Send + 'static,
{
    fn id(&self) -> &str {
        "Headers"
    }

    fn handle<'a>(
        &'a self,
        ctx: &'a HttpContext,
        mut input: SerializeStepInput<I>,
        next: &'a dyn Handler<SerializeStepInput<I>, OperationOutput<O>>,
    ) -> HandlerFuture<'a, OperationOutput<O>> {
        for (name, value) in (self.headers)(&input.operation_input) {
            if let Err(err) = input.request.append_header(&name, &value) {
                return Box::pin(async move { Err(err) });
            }
        }
        next.handle(ctx, input)
    }
}
