mod common;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use movie_store::routes::create_router;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

fn app() -> Router {
    create_router(common::lazy_state())
}

async fn send(req: Request<Body>) -> (StatusCode, Value) {
    let res = app().oneshot(req).await.expect("response");
    let status = res.status();
    let bytes = res.into_body().collect().await.expect("body").to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).expect("request")
}

fn json_request(method: Method, uri: &str, auth: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    builder.body(Body::from(body.to_string())).expect("request")
}

#[tokio::test]
async fn signup_form_is_public() {
    let (status, body) = send(get("/signup/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["min_password_length"], 8);
}

#[tokio::test]
async fn unknown_path_is_not_found() {
    let (status, body) = send(get("/no-such-page/")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["data"]["path"], "/no-such-page/");
}

#[tokio::test]
async fn cart_requires_a_bearer_token() {
    let (status, _) = send(get("/cart/")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let req = Request::builder()
        .uri("/cart/")
        .header(header::AUTHORIZATION, "Bearer not-a-jwt")
        .body(Body::empty())
        .expect("request");
    let (status, _) = send(req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let req = Request::builder()
        .uri("/cart/count/")
        .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
        .body(Body::empty())
        .expect("request");
    let (status, _) = send(req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn checkout_and_orders_require_login() {
    for uri in ["/checkout/", "/orders/", "/cart/clear/"] {
        let (status, _) = send(get(uri)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
    }

    let add = format!("/cart/add/{}/", Uuid::new_v4());
    let (status, _) = send(get(&add)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn posting_a_review_requires_login() {
    let uri = format!("/movies/{}/", Uuid::new_v4());
    let (status, _) = send(json_request(
        Method::POST,
        &uri,
        None,
        json!({ "comment": "Loved it" }),
    ))
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let uri = format!("/review/{}/report/", Uuid::new_v4());
    let (status, _) = send(json_request(Method::POST, &uri, None, json!({}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn invalid_signup_reports_field_errors() {
    let (status, body) = send(json_request(
        Method::POST,
        "/signup/",
        None,
        json!({
            "username": "bad name",
            "email": "nope",
            "password1": "s3cret-pass",
            "password2": "different-pass"
        }),
    ))
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let fields = &body["data"]["fields"];
    assert!(fields.get("username").is_some());
    assert!(fields.get("email").is_some());
    assert!(fields.get("password2").is_some());
}
