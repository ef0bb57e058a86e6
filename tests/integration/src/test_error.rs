//! Error propagation and typed error decoding.

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use http::{Method, StatusCode};
    use rustack_client_http::middlewares::UnknownServiceError;
    use rustack_client_http::{ClientConfig, ClientError, Endpoint, HttpContext};
    use rustack_client_xml::XmlError;

    use crate::init_tracing;
    use crate::operations::{
        GetBucketTaggingInput, NoSuchBucket, NoSuchTagSet, PutBucketTaggingInput, Tag,
        get_bucket_tagging, put_bucket_tagging,
    };
    use crate::transport::{MemoryTransport, Reply};

    fn context() -> HttpContext {
        ClientConfig::default()
            .context("S3", "GetBucketTagging")
            .with_endpoint(Endpoint::from_url("http://localhost:4566").unwrap())
    }

    fn input() -> GetBucketTaggingInput {
        GetBucketTaggingInput {
            bucket: "ghost".to_owned(),
        }
    }

    #[tokio::test]
    async fn test_should_decode_typed_error_from_streamed_body() {
        init_tracing();
        let transport = MemoryTransport::new(Reply::Streamed(
            StatusCode::NOT_FOUND,
            vec![
                "<Error><Code>NoSuchBucket</Code>",
                "<Message>The specified bucket does not exist</Message>",
                "<BucketName>ghost</BucketName><RequestId>r-42</RequestId></Error>",
            ],
        ));
        let stack = get_bucket_tagging().unwrap();

        let err = stack.execute(&context(), input(), &transport).await.unwrap_err();

        let service = match err {
            ClientError::Service(service) => service,
            other => panic!("expected a service error, got {other:?}"),
        };
        let decoded = service.downcast::<NoSuchBucket>().unwrap();
        assert_eq!(
            decoded,
            NoSuchBucket {
                message: "The specified bucket does not exist".to_owned(),
                bucket_name: Some("ghost".to_owned()),
                request_id: Some("r-42".to_owned()),
            }
        );
    }

    #[tokio::test]
    async fn test_should_decode_wrapped_error_envelope() {
        init_tracing();
        let transport = MemoryTransport::new(Reply::Buffered(
            StatusCode::NOT_FOUND,
            "<ErrorResponse><Error><Code>NoSuchTagSet</Code>\
             <Message>There is no tag set</Message></Error>\
             <RequestId>r-7</RequestId></ErrorResponse>",
        ));
        let stack = get_bucket_tagging().unwrap();

        let err = stack.execute(&context(), input(), &transport).await.unwrap_err();
        let decoded = err
            .as_service()
            .and_then(|s| s.downcast_ref::<NoSuchTagSet>())
            .unwrap();
        assert_eq!(decoded.message, "There is no tag set");
    }

    #[tokio::test]
    async fn test_should_fall_back_to_unknown_service_error() {
        init_tracing();
        let transport = MemoryTransport::new(Reply::Buffered(
            StatusCode::FORBIDDEN,
            "<Error><Code>AccessDenied</Code><Message>Access Denied</Message></Error>",
        ));
        let stack = get_bucket_tagging().unwrap();

        let err = stack.execute(&context(), input(), &transport).await.unwrap_err();
        let unknown = err
            .as_service()
            .and_then(|s| s.downcast_ref::<UnknownServiceError>())
            .unwrap();
        assert_eq!(unknown.status, StatusCode::FORBIDDEN);
        assert_eq!(unknown.code.as_deref(), Some("AccessDenied"));
        assert_eq!(unknown.request_id.as_deref(), Some("memory-0001"));
    }

    #[tokio::test]
    async fn test_should_propagate_transport_timeout_unchanged() {
        init_tracing();
        let transport = MemoryTransport::new(Reply::Timeout(Duration::from_millis(10)));
        let stack = get_bucket_tagging().unwrap();

        let err = stack.execute(&context(), input(), &transport).await.unwrap_err();
        let source = match err {
            ClientError::Transport(source) => source,
            other => panic!("expected a transport error, got {other:?}"),
        };
        let io = source.downcast_ref::<std::io::Error>().unwrap();
        assert_eq!(io.kind(), std::io::ErrorKind::TimedOut);
    }

    #[tokio::test]
    async fn test_should_report_broken_error_body_as_materialization_failure() {
        init_tracing();
        let transport = MemoryTransport::new(Reply::Broken(
            StatusCode::INTERNAL_SERVER_ERROR,
            vec!["<Error><Code>Internal"],
        ));
        let stack = get_bucket_tagging().unwrap();

        let err = stack.execute(&context(), input(), &transport).await.unwrap_err();
        assert!(matches!(err, ClientError::BodyMaterialization(_)));
    }

    #[tokio::test]
    async fn test_should_cap_error_body_from_config() {
        init_tracing();
        let transport = MemoryTransport::new(Reply::Streamed(
            StatusCode::INTERNAL_SERVER_ERROR,
            vec!["<Error><Code>InternalError</Code>", "<Message>boom</Message></Error>"],
        ));
        let stack = get_bucket_tagging().unwrap();
        let config = ClientConfig::builder().max_error_body_size(16).build();
        let ctx = config
            .context("S3", "GetBucketTagging")
            .with_endpoint(Endpoint::new("localhost"));

        let err = stack.execute(&ctx, input(), &transport).await.unwrap_err();
        assert!(matches!(err, ClientError::BodyMaterialization(_)));
    }

    #[tokio::test]
    async fn test_should_not_send_when_serialization_fails() {
        init_tracing();
        let transport = MemoryTransport::new(Reply::Buffered(StatusCode::OK, ""));
        let stack = put_bucket_tagging().unwrap();
        let ctx = ClientConfig::default()
            .context("S3", "PutBucketTagging")
            .with_method(Method::PUT)
            .with_endpoint(Endpoint::new("localhost"));
        let input = PutBucketTaggingInput {
            bucket: "photos".to_owned(),
            tags: vec![Tag::new("", "orphan")],
            expected_bucket_owner: None,
        };

        let err = stack.execute(&ctx, input, &transport).await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::Serialization(XmlError::InvalidValue { .. })
        ));
        assert!(transport.requests().is_empty());
    }
}
