//! End-to-end tests for the invocation loop over byte streams.

use std::io::Write;

use base64::{Engine, engine::general_purpose::STANDARD};
use http::{HeaderValue, header::CONTENT_TYPE};
use lambdaframe::{
    LambdaServer,
    Router,
    handler_fn,
    request::proxy_metadata,
};
use lambdaframe_testing::{
    LoggerHandle,
    drive_with_bytes,
    drive_with_chunks,
    logger,
    proxy_event,
    proxy_event_json,
};
use log::Level;
use rstest::{fixture, rstest};

fn foo_router() -> Router {
    let router = Router::new();
    router
        .handle_fn("/foo", |_request, response| {
            response.set_status(http::StatusCode::OK);
            response
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static("text/html"));
            write!(response, "foo")?;
            Ok(())
        })
        .expect("register /foo");
    router
}

#[fixture]
fn echo_server() -> LambdaServer {
    LambdaServer::new(handler_fn(|request, response| {
        let header = request
            .headers()
            .get("x-forwarded-proto")
            .map_or("-", |value| value.to_str().unwrap_or("?"));
        write!(
            response,
            "{} {} proto={header} body=",
            request.method(),
            request.uri()
        )?;
        response.write_all(request.body())?;
        Ok(())
    }))
}

#[tokio::test]
async fn routed_handler_output_is_written_verbatim() {
    let server = LambdaServer::new(foo_router());
    let mut output = Vec::new();

    server
        .serve(proxy_event("GET", "/foo", "").as_bytes(), &mut output)
        .await
        .expect("serve");

    assert_eq!(
        String::from_utf8(output).expect("utf8"),
        "{\"statusCode\":200,\"headers\":{\"Content-Type\":\"text/html\"},\"body\":\"foo\"}\n"
    );
}

#[tokio::test]
async fn unmatched_path_is_not_found() {
    let server = LambdaServer::new(foo_router());
    let outputs = drive_with_bytes(&server, proxy_event("GET", "/bar", "").as_bytes())
        .await
        .expect("drive");

    assert_eq!(outputs.len(), 1);
    assert_eq!(outputs[0].status_code, 404);
    assert_eq!(outputs[0].body, "404 page not found\n");
}

#[tokio::test]
async fn outputs_follow_input_order() {
    let server = LambdaServer::new(foo_router());
    let input = ["/foo", "/bar", "/foo", "/baz"]
        .iter()
        .map(|path| proxy_event("GET", path, ""))
        .collect::<String>();

    let outputs = drive_with_bytes(&server, input.as_bytes())
        .await
        .expect("drive");

    let statuses: Vec<u16> = outputs.iter().map(|out| out.status_code).collect();
    assert_eq!(statuses, [200, 404, 200, 404]);
}

#[rstest]
#[tokio::test]
async fn empty_input_ends_without_output(echo_server: LambdaServer) {
    let outputs = drive_with_bytes(&echo_server, b"  \n").await.expect("drive");
    assert!(outputs.is_empty());
}

#[rstest]
#[tokio::test]
async fn query_parameters_are_sorted_and_encoded(echo_server: LambdaServer) {
    let mut event = proxy_event_json("GET", "/search", "");
    event["event"]["queryStringParameters"] = serde_json::json!({"q": "a b", "page": "2"});

    let outputs = drive_with_bytes(&echo_server, event.to_string().as_bytes())
        .await
        .expect("drive");

    assert_eq!(
        outputs[0].body,
        "GET /search?page=2&q=a+b proto=https body="
    );
}

#[rstest]
#[tokio::test]
async fn envelopes_split_across_reads_are_reassembled(echo_server: LambdaServer) {
    let first = proxy_event("POST", "/one", "payload");
    let second = proxy_event("PUT", "/two", "");
    let joined = format!("{first}{second}");
    let chunks: Vec<&[u8]> = joined.as_bytes().chunks(7).collect();

    let outputs = drive_with_chunks(&echo_server, &chunks, 16)
        .await
        .expect("drive");

    assert_eq!(outputs.len(), 2);
    assert!(outputs[0].body.starts_with("POST /one?foo=bar"));
    assert!(outputs[0].body.ends_with("body=payload"));
    assert!(outputs[1].body.starts_with("PUT /two?foo=bar"));
}

#[rstest]
#[tokio::test]
async fn truncated_input_is_answered_then_ends(echo_server: LambdaServer) {
    let event = proxy_event("GET", "/", "");
    let input = format!("{event}{}", &event[..40]);

    let outputs = drive_with_bytes(&echo_server, input.as_bytes())
        .await
        .expect("drive");

    assert_eq!(outputs.len(), 2);
    assert_eq!(outputs[0].status_code, 200);
    assert_eq!(outputs[1].status_code, 500);
    assert_eq!(
        outputs[1].body,
        "unexpected end of input: 40 bytes of an incomplete envelope"
    );
}

#[rstest]
#[tokio::test]
async fn malformed_envelope_does_not_poison_the_stream(echo_server: LambdaServer) {
    let input = format!(
        "{{\"event\": {{\"httpMethod\": 7}}}}{}",
        proxy_event("GET", "/after", "")
    );

    let outputs = drive_with_bytes(&echo_server, input.as_bytes())
        .await
        .expect("drive");

    assert_eq!(outputs.len(), 2);
    assert_eq!(outputs[0].status_code, 500);
    assert!(outputs[0].headers.is_empty());
    assert!(outputs[1].body.starts_with("GET /after"));
}

#[rstest]
#[tokio::test]
async fn oversized_envelope_is_rejected(echo_server: LambdaServer) {
    let server = echo_server.max_envelope_bytes(2048);
    let big = proxy_event("POST", "/big", &"x".repeat(4096));
    let input = format!("{big}{}", proxy_event("GET", "/small", ""));

    let outputs = drive_with_bytes(&server, input.as_bytes())
        .await
        .expect("drive");

    assert_eq!(outputs.len(), 2);
    assert_eq!(outputs[0].status_code, 500);
    assert!(outputs[0].body.starts_with("envelope exceeds max length"));
    assert!(outputs[1].body.starts_with("GET /small"));
}

#[rstest]
#[case(true, "body=hello")]
#[case(false, "body=aGVsbG8=")]
#[tokio::test]
async fn base64_bodies_follow_configuration(
    echo_server: LambdaServer,
    #[case] decode: bool,
    #[case] expected_suffix: &str,
) {
    let server = echo_server.decode_base64_bodies(decode);
    let mut event = proxy_event_json("POST", "/upload", &STANDARD.encode("hello"));
    event["event"]["isBase64Encoded"] = serde_json::Value::Bool(true);

    let outputs = drive_with_bytes(&server, event.to_string().as_bytes())
        .await
        .expect("drive");

    assert_eq!(outputs[0].status_code, 200);
    assert!(outputs[0].body.ends_with(expected_suffix), "{}", outputs[0].body);
}

#[rstest]
#[tokio::test]
async fn invalid_base64_body_is_an_error(echo_server: LambdaServer) {
    let mut event = proxy_event_json("POST", "/upload", "not base64!");
    event["event"]["isBase64Encoded"] = serde_json::Value::Bool(true);

    let outputs = drive_with_bytes(&echo_server, event.to_string().as_bytes())
        .await
        .expect("drive");

    assert_eq!(outputs[0].status_code, 500);
    assert!(outputs[0].body.starts_with("invalid base64 body"));
}

#[rstest]
#[case(true, "proto=https")]
#[case(false, "proto=-")]
#[tokio::test]
async fn headers_follow_configuration(
    echo_server: LambdaServer,
    #[case] propagate: bool,
    #[case] expected: &str,
) {
    let server = echo_server.propagate_headers(propagate);
    let outputs = drive_with_bytes(&server, proxy_event("GET", "/", "").as_bytes())
        .await
        .expect("drive");

    assert!(outputs[0].body.contains(expected), "{}", outputs[0].body);
}

#[tokio::test]
async fn proxy_metadata_reaches_the_handler() {
    let server = LambdaServer::new(handler_fn(|request, response| {
        let metadata = proxy_metadata(request).ok_or("metadata missing")?;
        write!(
            response,
            "{} {} {} {}",
            metadata.resource,
            metadata.path_parameters["proxy"],
            metadata.stage_variables["baz"],
            metadata.request_context.stage
        )?;
        Ok(())
    }));

    let outputs = drive_with_bytes(&server, proxy_event("GET", "/", "").as_bytes())
        .await
        .expect("drive");

    assert_eq!(outputs[0].body, "/{proxy+} path/to/resource qux prod");
}

#[rstest]
#[tokio::test]
async fn panicking_handler_is_logged_and_contained(mut logger: LoggerHandle) {
    let server = LambdaServer::new(handler_fn(|request, response| {
        if request.uri().path() == "/panic" {
            panic!("index out of bounds");
        }
        write!(response, "ok")?;
        Ok(())
    }));
    let input = format!(
        "{}{}",
        proxy_event("GET", "/panic", ""),
        proxy_event("GET", "/next", "")
    );
    logger.clear();

    let outputs = drive_with_bytes(&server, input.as_bytes())
        .await
        .expect("drive");

    assert_eq!(outputs.len(), 2);
    assert_eq!(outputs[0].status_code, 500);
    assert!(outputs[0].body.starts_with("panic: index out of bounds"));
    assert_eq!(outputs[1].body, "ok");
    assert!(logger.contains(Level::Error, "kind=fault"));
}

#[rstest]
#[case("/hello world", "/hello%20world")]
#[case("/a?b", "/a%3Fb")]
#[case("foo", "/foo")]
#[tokio::test]
async fn decoded_gateway_paths_reach_the_handler(#[case] path: &str, #[case] encoded: &str) {
    let server = LambdaServer::new(handler_fn(|request, response| {
        let metadata = proxy_metadata(request).ok_or("metadata missing")?;
        write!(response, "{} {}", request.uri().path(), metadata.path)?;
        Ok(())
    }));

    let outputs = drive_with_bytes(&server, proxy_event("GET", path, "").as_bytes())
        .await
        .expect("drive");

    assert_eq!(outputs[0].status_code, 200);
    assert_eq!(outputs[0].body, format!("{encoded} {path}"));
}

#[rstest]
#[case("/hello world", 200, "spaced")]
#[case("/a?b", 404, "404 page not found\n")]
#[case("/a", 200, "a")]
#[tokio::test]
async fn routes_match_the_decoded_path(
    #[case] path: &str,
    #[case] status: u16,
    #[case] body: &str,
) {
    let router = Router::new();
    router
        .handle_fn("/hello world", |_request, response| {
            write!(response, "spaced")?;
            Ok(())
        })
        .expect("register spaced route");
    router
        .handle_fn("/a", |_request, response| {
            write!(response, "a")?;
            Ok(())
        })
        .expect("register /a");
    let server = LambdaServer::new(router);

    let outputs = drive_with_bytes(&server, proxy_event("GET", path, "").as_bytes())
        .await
        .expect("drive");

    assert_eq!(outputs[0].status_code, status);
    assert_eq!(outputs[0].body, body);
}
