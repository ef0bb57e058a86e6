//! The five-step operation stack.
//!
//! Every operation runs through the same steps in a fixed order:
//!
//! | Step | Input | Typical middlewares |
//! |------|-------|---------------------|
//! | `initialize` | operation input | input validation, idempotency tokens |
//! | `serialize` | [`SerializeStepInput`] | path/query/header bindings, XML body |
//! | `build` | [`HttpRequest`] | endpoint, host prefix |
//! | `finalize` | [`HttpRequest`] | content length, retry, signing |
//! | `deserialize` | [`HttpRequest`] | logging, response decoding |
//!
//! The transport sits inside the deserialize step, so deserialize middlewares see the request
//! on the way in and the response on the way out.

use tracing::{debug, warn};

use crate::context::HttpContext;
use crate::error::ClientError;
use crate::handler::{Handler, MapInput, TransportTerminal};
use crate::middleware::MiddlewareStep;
use crate::request::HttpRequest;
use crate::response::{HttpResponse, OperationOutput};

/// What serialize middlewares receive: the typed input and the request they populate.
#[derive(Debug)]
pub struct SerializeStepInput<I> {
    /// The caller's operation input.
    pub operation_input: I,
    /// The request under construction.
    pub request: HttpRequest,
}

/// Middleware steps for one operation.
#[derive(Debug)]
pub struct OperationStack<I, O> {
    id: String,
    /// Runs first, on the typed input.
    pub initialize: MiddlewareStep<I, OperationOutput<O>>,
    /// Turns the typed input into a request.
    pub serialize: MiddlewareStep<SerializeStepInput<I>, OperationOutput<O>>,
    /// Completes the request (endpoint, host).
    pub build: MiddlewareStep<HttpRequest, OperationOutput<O>>,
    /// Last changes before sending (length, retry, signing).
    pub finalize: MiddlewareStep<HttpRequest, OperationOutput<O>>,
    /// Wraps the transport and decodes its response.
    pub deserialize: MiddlewareStep<HttpRequest, OperationOutput<O>>,
}

impl<I, O> OperationStack<I, O>
where
    I: Send + 'static,
    O: Send + 'static,
{
    /// Create a stack with empty steps.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            initialize: MiddlewareStep::new("initialize"),
            serialize: MiddlewareStep::new("serialize"),
            build: MiddlewareStep::new("build"),
            finalize: MiddlewareStep::new("finalize"),
            deserialize: MiddlewareStep::new("deserialize"),
        }
    }

    /// The stack id, usually the operation name.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Run every step around `transport` and return the response with its decoded output.
    ///
    /// # Errors
    ///
    /// The first error raised by any middleware, closure, or the transport, unchanged.
    pub async fn handle_middleware<T>(
        &self,
        ctx: &HttpContext,
        input: I,
        transport: &T,
    ) -> Result<OperationOutput<O>, ClientError>
    where
        T: Handler<HttpRequest, HttpResponse>,
    {
        // Build inside-out: each step's chain is the terminal of the step before it.
        let terminal = TransportTerminal::new(transport);
        let deserialize = self.deserialize.compose(&terminal);
        let finalize = self.finalize.compose(&deserialize);
        let build = self.build.compose(&finalize);
        let request_only =
            MapInput::new(&build, |_ctx: &HttpContext, step: SerializeStepInput<I>| step.request);
        let serialize = self.serialize.compose(&request_only);
        let seed_request = MapInput::new(&serialize, |ctx: &HttpContext, operation_input: I| {
            SerializeStepInput {
                operation_input,
                request: HttpRequest::new(ctx.method().clone()),
            }
        });
        let initialize = self.initialize.compose(&seed_request);

        initialize.handle(ctx, input).await
    }

    /// Run the stack and return the decoded output.
    ///
    /// # Errors
    ///
    /// Any error from [`handle_middleware`](Self::handle_middleware), or `MissingOutput` if no
    /// deserialize middleware produced an output.
    pub async fn execute<T>(
        &self,
        ctx: &HttpContext,
        input: I,
        transport: &T,
    ) -> Result<O, ClientError>
    where
        T: Handler<HttpRequest, HttpResponse>,
    {
        debug!(
            stack = %self.id,
            service = ctx.service(),
            operation = ctx.operation(),
            invocation_id = %ctx.invocation_id(),
            "executing operation"
        );
        let result = self.handle_middleware(ctx, input, transport).await;
        match result {
            Ok(OperationOutput {
                output: Some(output),
                ..
            }) => Ok(output),
            Ok(OperationOutput { response, .. }) => {
                warn!(
                    operation = ctx.operation(),
                    invocation_id = %ctx.invocation_id(),
                    status = %response.status,
                    "operation finished without output"
                );
                Err(ClientError::MissingOutput)
            }
            Err(err) => {
                debug!(
                    operation = ctx.operation(),
                    invocation_id = %ctx.invocation_id(),
                    error = %err,
                    "operation failed"
                );
                Err(err)
            }
        }
    }
}
