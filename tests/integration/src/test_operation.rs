//! Successful round trips through full operation stacks.

#[cfg(test)]
mod tests {
    use http::{Method, StatusCode};
    use rustack_client_http::{ClientConfig, ClientError, Endpoint, HttpContext};

    use crate::init_tracing;
    use crate::operations::{
        GetBucketTaggingInput, PutBucketTaggingInput, Tag, get_bucket_tagging, put_bucket_tagging,
    };
    use crate::transport::{MemoryTransport, Reply};

    fn context(operation: &str, method: Method) -> HttpContext {
        ClientConfig::default()
            .context("S3", operation)
            .with_method(method)
            .with_endpoint(Endpoint::from_url("http://localhost:4566").unwrap())
    }

    #[tokio::test]
    async fn test_should_send_serialized_put_bucket_tagging() {
        init_tracing();
        let transport = MemoryTransport::new(Reply::Buffered(StatusCode::NO_CONTENT, ""));
        let stack = put_bucket_tagging().unwrap();
        let input = PutBucketTaggingInput {
            bucket: "photos".to_owned(),
            tags: vec![Tag::new("team", "R&D"), Tag::new("cost-center", "<42>")],
            expected_bucket_owner: Some("123456789012".to_owned()),
        };

        let output = stack
            .execute(&context("PutBucketTagging", Method::PUT), input, &transport)
            .await
            .unwrap();
        assert_eq!(output.request_id.as_deref(), Some("memory-0001"));

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        let sent = &requests[0];
        assert_eq!(sent.method, Method::PUT);
        assert_eq!(sent.uri, "http://localhost:4566/photos?tagging");
        assert_eq!(sent.header("content-type"), Some("application/xml"));
        assert_eq!(sent.header("x-amz-expected-bucket-owner"), Some("123456789012"));
        assert_eq!(
            sent.body_text(),
            "<Tagging xmlns=\"http://s3.amazonaws.com/doc/2006-03-01/\"><TagSet>\
             <Tag><Key>team</Key><Value>R&amp;D</Value></Tag>\
             <Tag><Key>cost-center</Key><Value>&lt;42&gt;</Value></Tag>\
             </TagSet></Tagging>"
        );
        assert_eq!(
            sent.header("content-length"),
            Some(sent.body.len().to_string().as_str())
        );
    }

    #[tokio::test]
    async fn test_should_decode_streamed_get_bucket_tagging() {
        init_tracing();
        let transport = MemoryTransport::new(Reply::Streamed(
            StatusCode::OK,
            vec![
                "<Tagging><TagSet><Tag><Key>team</Key>",
                "<Value>R&amp;D</Value></Tag><Tag><Key>env</Key>",
                "<Value>prod</Value></Tag></TagSet></Tagging>",
            ],
        ));
        let stack = get_bucket_tagging().unwrap();

        let output = stack
            .execute(
                &context("GetBucketTagging", Method::GET),
                GetBucketTaggingInput {
                    bucket: "photos".to_owned(),
                },
                &transport,
            )
            .await
            .unwrap();

        assert_eq!(
            output.tags,
            vec![Tag::new("team", "R&D"), Tag::new("env", "prod")]
        );
        let sent = &transport.requests()[0];
        assert_eq!(sent.uri, "http://localhost:4566/photos?tagging");
        assert!(sent.body.is_empty());
        assert_eq!(sent.header("content-length"), Some("0"));
    }

    #[tokio::test]
    async fn test_should_keep_raw_response_next_to_output() {
        init_tracing();
        let transport = MemoryTransport::new(Reply::Buffered(
            StatusCode::OK,
            "<Tagging><TagSet/></Tagging>",
        ));
        let stack = get_bucket_tagging().unwrap();

        let out = stack
            .handle_middleware(
                &context("GetBucketTagging", Method::GET),
                GetBucketTaggingInput {
                    bucket: "photos".to_owned(),
                },
                &transport,
            )
            .await
            .unwrap();
        assert_eq!(out.response.status, StatusCode::OK);
        assert_eq!(out.response.header("x-amz-request-id"), Some("memory-0001"));
        assert!(out.output.unwrap().tags.is_empty());
    }

    #[tokio::test]
    async fn test_should_fail_without_endpoint_before_sending() {
        init_tracing();
        let transport = MemoryTransport::new(Reply::Buffered(StatusCode::OK, ""));
        let stack = get_bucket_tagging().unwrap();
        let ctx = ClientConfig::default().context("S3", "GetBucketTagging");

        let err = stack
            .execute(
                &ctx,
                GetBucketTaggingInput {
                    bucket: "photos".to_owned(),
                },
                &transport,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidEndpoint(_)));
        assert!(transport.requests().is_empty());
    }
}
