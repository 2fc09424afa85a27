//! Tests for path-pattern routing.

use std::io::Write;

use bytes::Bytes;
use http::StatusCode;
use lambdaframe::{
    Handler,
    LambdaServer,
    Request,
    ResponseWriter,
    Router,
    RouterError,
    response::CapturedResponse,
};
use lambdaframe_testing::{drive_with_bytes, proxy_event};
use rstest::{fixture, rstest};

fn request(target: &str) -> Request {
    http::Request::builder()
        .uri(target)
        .body(Bytes::new())
        .expect("valid request")
}

fn serve(router: &Router, target: &str) -> CapturedResponse {
    let mut response = CapturedResponse::new();
    router
        .serve(&request(target), &mut response)
        .expect("router serve");
    response
}

fn register_named(router: &Router, pattern: &'static str) {
    router
        .handle_fn(pattern, move |_request, response| {
            write!(response, "{pattern}")?;
            Ok(())
        })
        .expect("register pattern");
}

#[fixture]
fn router() -> Router {
    let router = Router::new();
    for pattern in ["/", "/images/", "/images/thumbnails/", "/about"] {
        register_named(&router, pattern);
    }
    router
}

#[rstest]
#[case("/about", "/about")]
#[case("/about/team", "/")]
#[case("/images/cat.png", "/images/")]
#[case("/images/thumbnails/cat.png", "/images/thumbnails/")]
#[case("/elsewhere", "/")]
fn longest_pattern_wins(router: Router, #[case] target: &str, #[case] expected: &str) {
    let response = serve(&router, target);
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.body(), expected.as_bytes());
}

#[rstest]
#[case("/images", "/images/")]
#[case("/images?size=large", "/images/?size=large")]
fn subtree_root_redirects(router: Router, #[case] target: &str, #[case] location: &str) {
    let response = serve(&router, target);
    assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(
        response.headers().get(http::header::LOCATION).expect("location"),
        location
    );
}

#[test]
fn unmatched_path_answers_not_found() {
    let router = Router::new();
    register_named(&router, "/foo");

    let response = serve(&router, "/bar");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response.body(), b"404 page not found\n");
    let output = response.into_output();
    assert_eq!(output.headers["Content-Type"], "text/plain; charset=utf-8");
    assert_eq!(output.headers["X-Content-Type-Options"], "nosniff");
}

#[test]
fn duplicate_patterns_are_rejected() {
    let router = Router::new();
    register_named(&router, "/foo");

    let err = router
        .handle_fn("/foo", |_request, _response| Ok(()))
        .expect_err("duplicate");

    assert_eq!(err, RouterError::DuplicatePattern("/foo".into()));
    assert_eq!(router.patterns(), ["/foo"]);
}

#[rstest]
#[case("")]
#[case("foo")]
fn relative_patterns_are_rejected(#[case] pattern: &str) {
    let router = Router::new();
    let err = router
        .handle_fn(pattern, |_request, _response| Ok(()))
        .expect_err("invalid");
    assert_eq!(err, RouterError::InvalidPattern(pattern.into()));
}

#[test]
fn handlers_may_register_routes_while_serving() {
    let router = std::sync::Arc::new(Router::new());
    let inner = std::sync::Arc::clone(&router);
    router
        .handle_fn("/install", move |_request, _response| {
            inner.handle_fn("/installed", |_request, response| {
                write!(response, "installed")?;
                Ok(())
            })?;
            Ok(())
        })
        .expect("register");

    serve(&router, "/install");

    assert_eq!(serve(&router, "/installed").body(), b"installed");
}

#[tokio::test]
async fn default_router_serves_registered_routes() {
    lambdaframe::handle_fn("/default-router-probe", |_request, response| {
        write!(response, "probe")?;
        Ok(())
    })
    .expect("register on default router");

    let server = LambdaServer::with_default_router();
    let outputs = drive_with_bytes(
        &server,
        proxy_event("GET", "/default-router-probe", "").as_bytes(),
    )
    .await
    .expect("drive");

    assert_eq!(outputs[0].status_code, 200);
    assert_eq!(outputs[0].body, "probe");
    assert!(
        lambdaframe::default_router()
            .patterns()
            .contains(&"/default-router-probe".to_owned())
    );
}
