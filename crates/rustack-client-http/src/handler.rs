//! The handler abstraction every step of an operation is built from.
//!
//! A [`Handler`] turns an input into an output asynchronously. Transports are handlers from
//! [`HttpRequest`] to [`HttpResponse`]; a composed middleware chain is a handler too. The trait
//! returns boxed futures so that handlers can be used as `dyn Handler` and nested to any depth.

use std::marker::PhantomData;

use futures::future::BoxFuture;

use crate::context::HttpContext;
use crate::error::ClientError;
use crate::request::HttpRequest;
use crate::response::{HttpResponse, OperationOutput};

/// The future returned by [`Handler::handle`].
pub type HandlerFuture<'a, O> = BoxFuture<'a, Result<O, ClientError>>;

/// Something that produces an `O` from an `I` within an invocation context.
pub trait Handler<I, O>: Send + Sync {
    /// Handle one input.
    fn handle<'a>(&'a self, ctx: &'a HttpContext, input: I) -> HandlerFuture<'a, O>;
}

impl<I, O, H> Handler<I, O> for &H
where
    H: Handler<I, O> + ?Sized,
{
    fn handle<'a>(&'a self, ctx: &'a HttpContext, input: I) -> HandlerFuture<'a, O> {
        (**self).handle(ctx, input)
    }
}

impl<I, O, H> Handler<I, O> for std::sync::Arc<H>
where
    H: Handler<I, O> + ?Sized,
{
    fn handle<'a>(&'a self, ctx: &'a HttpContext, input: I) -> HandlerFuture<'a, O> {
        (**self).handle(ctx, input)
    }
}

/// A handler backed by a closure returning a boxed future.
///
/// Convenient for transports in tests and for one-off terminals.
pub struct HandlerFn<F> {
    f: F,
}

impl<F> std::fmt::Debug for HandlerFn<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerFn").finish_non_exhaustive()
    }
}

/// Create a [`HandlerFn`].
pub fn handler_fn<I, O, F>(f: F) -> HandlerFn<F>
where
    F: for<'a> Fn(&'a HttpContext, I) -> HandlerFuture<'a, O> + Send + Sync,
{
    HandlerFn { f }
}

impl<I, O, F> Handler<I, O> for HandlerFn<F>
where
    F: for<'a> Fn(&'a HttpContext, I) -> HandlerFuture<'a, O> + Send + Sync,
{
    fn handle<'a>(&'a self, ctx: &'a HttpContext, input: I) -> HandlerFuture<'a, O> {
        (self.f)(ctx, input)
    }
}

/// Adapts a handler of `B` into a handler of `A` by converting each input.
///
/// The conversion sees the context, so it can seed per-invocation state such as the method.
///
/// This is the glue between two steps whose inputs differ, e.g. the serialize step hands
/// only the built request on to the build step.
pub(crate) struct MapInput<'h, A, B, O, M> {
    inner: &'h (dyn Handler<B, O> + 'h),
    map: M,
    _marker: PhantomData<fn(A) -> O>,
}

impl<'h, A, B, O, M> MapInput<'h, A, B, O, M>
where
    M: Fn(&HttpContext, A) -> B + Send + Sync,
{
    pub(crate) fn new(inner: &'h (dyn Handler<B, O> + 'h), map: M) -> Self {
        Self {
            inner,
            map,
            _marker: PhantomData,
        }
    }
}

impl<A, B, O, M> Handler<A, O> for MapInput<'_, A, B, O, M>
where
    M: Fn(&HttpContext, A) -> B + Send + Sync,
{
    fn handle<'a>(&'a self, ctx: &'a HttpContext, input: A) -> HandlerFuture<'a, O> {
        self.inner.handle(ctx, (self.map)(ctx, input))
    }
}

/// Terminal handler that hands the request to the transport and wraps the response.
pub(crate) struct TransportTerminal<'t, O> {
    transport: &'t (dyn Handler<HttpRequest, HttpResponse> + 't),
    _marker: PhantomData<fn() -> O>,
}

impl<'t, O> TransportTerminal<'t, O> {
    pub(crate) fn new(transport: &'t (dyn Handler<HttpRequest, HttpResponse> + 't)) -> Self {
        Self {
            transport,
            _marker: PhantomData,
        }
    }
}

impl<O: Send> Handler<HttpRequest, OperationOutput<O>> for TransportTerminal<'_, O> {
    fn handle<'a>(
        &'a self,
        ctx: &'a HttpContext,
        input: HttpRequest,
    ) -> HandlerFuture<'a, OperationOutput<O>> {
        Box::pin(async move {
            tracing::debug!(
                service = ctx.service(),
                operation = ctx.operation(),
                method = %input.method,
                host = %input.host,
                "sending request"
            );
            let response = self.transport.handle(ctx, input).await?;
            Ok(OperationOutput::new(response))
        })
    }
}
