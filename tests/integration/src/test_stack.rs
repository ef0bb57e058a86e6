//! Custom middlewares interposed around the built-in steps.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use http::StatusCode;
    use parking_lot::Mutex;
    use rustack_client_http::{
        ClientConfig, ClientError, ClosureMiddleware, Endpoint, Handler, HandlerFuture,
        HttpContext, HttpRequest, HttpResponse, Middleware, OperationOutput, Position,
    };

    use crate::init_tracing;
    use crate::operations::{GetBucketTaggingInput, GetBucketTaggingOutput, get_bucket_tagging};
    use crate::transport::{MemoryTransport, Reply};

    type Output = OperationOutput<GetBucketTaggingOutput>;
    type Log = Arc<Mutex<Vec<String>>>;

    /// Records the host it sees on the way in and the status on the way out.
    struct Probe {
        id: &'static str,
        log: Log,
    }

    impl Middleware<HttpRequest, Output> for Probe {
        fn id(&self) -> &str {
            self.id
        }

        fn handle<'a>(
            &'a self,
            ctx: &'a HttpContext,
            request: HttpRequest,
            next: &'a dyn Handler<HttpRequest, Output>,
        ) -> HandlerFuture<'a, Output> {
            Box::pin(async move {
                self.log
                    .lock()
                    .push(format!("{} before host={:?}", self.id, request.host));
                let result = next.handle(ctx, request).await;
                let outcome = match &result {
                    Ok(out) => out.response.status.as_u16().to_string(),
                    Err(_) => "error".to_owned(),
                };
                self.log.lock().push(format!("{} after {outcome}", self.id));
                result
            })
        }
    }

    fn probe(id: &'static str, log: &Log) -> Probe {
        Probe {
            id,
            log: Arc::clone(log),
        }
    }

    fn context() -> HttpContext {
        ClientConfig::default()
            .context("S3", "GetBucketTagging")
            .with_endpoint(Endpoint::new("s3.local"))
    }

    fn input() -> GetBucketTaggingInput {
        GetBucketTaggingInput {
            bucket: "photos".to_owned(),
        }
    }

    #[tokio::test]
    async fn test_should_order_probes_around_endpoint_step() {
        init_tracing();
        let log = Log::default();
        let mut stack = get_bucket_tagging().unwrap();
        stack
            .build
            .intercept(Position::before("Endpoint"), probe("pre", &log))
            .unwrap();
        stack
            .build
            .intercept(Position::after("Endpoint"), probe("post", &log))
            .unwrap();
        assert_eq!(stack.build.ids(), vec!["pre", "Endpoint", "post"]);

        let transport = MemoryTransport::new(Reply::Buffered(StatusCode::OK, "<Tagging/>"));
        stack.execute(&context(), input(), &transport).await.unwrap();

        assert_eq!(
            *log.lock(),
            vec![
                "pre before host=\"\"",
                "post before host=\"s3.local\"",
                "post after 200",
                "pre after 200",
            ]
        );
    }

    #[tokio::test]
    async fn test_should_unwind_probes_on_service_error() {
        init_tracing();
        let log = Log::default();
        let mut stack = get_bucket_tagging().unwrap();
        stack
            .finalize
            .intercept(Position::First, probe("finalize", &log))
            .unwrap();

        let transport = MemoryTransport::new(Reply::Buffered(
            StatusCode::NOT_FOUND,
            "<Error><Code>NoSuchBucket</Code></Error>",
        ));
        let err = stack.execute(&context(), input(), &transport).await.unwrap_err();
        assert!(matches!(err, ClientError::Service(_)));
        assert_eq!(
            *log.lock(),
            vec!["finalize before host=\"s3.local\"", "finalize after error"]
        );
    }

    #[tokio::test]
    async fn test_should_short_circuit_before_transport() {
        init_tracing();
        let mut stack = get_bucket_tagging().unwrap();
        stack
            .finalize
            .intercept(
                Position::First,
                ClosureMiddleware::new::<HttpRequest, Output>("Cache", |_ctx, _request, _next| {
                    Box::pin(async {
                        let mut out = OperationOutput::new(HttpResponse::new(StatusCode::OK, ""));
                        out.output = Some(GetBucketTaggingOutput { tags: Vec::new() });
                        Ok(out)
                    })
                }),
            )
            .unwrap();

        let transport = MemoryTransport::default();
        let output = stack.execute(&context(), input(), &transport).await.unwrap();
        assert!(output.tags.is_empty());
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_should_share_attributes_between_steps() {
        #[derive(Debug, Clone, PartialEq)]
        struct Attempt(u32);

        init_tracing();
        let mut stack = get_bucket_tagging().unwrap();
        stack
            .build
            .intercept(
                Position::First,
                ClosureMiddleware::new::<HttpRequest, Output>("Stamp", |ctx, request, next| {
                    ctx.insert_attribute(Attempt(1));
                    next.handle(ctx, request)
                }),
            )
            .unwrap();
        stack
            .finalize
            .intercept(
                Position::Last,
                ClosureMiddleware::new::<HttpRequest, Output>("Header", |ctx, mut request, next| {
                    let attempt = ctx.attribute::<Attempt>().map_or(0, |a| a.0);
                    if let Err(err) = request.set_header("x-attempt", &attempt.to_string()) {
                        return Box::pin(async move { Err(err) });
                    }
                    next.handle(ctx, request)
                }),
            )
            .unwrap();

        let transport = MemoryTransport::new(Reply::Buffered(StatusCode::OK, "<Tagging/>"));
        let ctx = context();
        stack.execute(&ctx, input(), &transport).await.unwrap();

        assert_eq!(ctx.attribute::<Attempt>(), Some(Attempt(1)));
        assert_eq!(transport.requests()[0].header("x-attempt"), Some("1"));
    }
}
