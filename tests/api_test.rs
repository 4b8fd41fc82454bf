mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    middleware::from_fn_with_state,
    routing::get,
    Router,
};
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;

use common::{send, test_app};
use jobboard_backend::{
    middleware::rate_limit::{rps_middleware, RateLimiter},
    models::user::UserType,
    utils::token::issue_jwt,
};

fn json_request(method: Method, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn health_reports_ok_in_envelope() {
    let (response, body) = send(test_app(), empty_request(Method::GET, "/health")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["status"], json!("ok"));
}

#[tokio::test]
async fn openapi_document_is_served() {
    let (response, body) = send(
        test_app(),
        empty_request(Method::GET, "/api/docs/openapi.json"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body["paths"]["/api/applications"].is_object());
    assert!(body["paths"]["/api/payments/services"].is_object());
    assert!(body["paths"]["/api/auth/update-password"]["patch"].is_object());
}

#[tokio::test]
async fn unknown_route_gets_404_envelope() {
    let (response, body) = send(test_app(), empty_request(Method::GET, "/api/nope")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["message"], json!("Route not found"));
}

#[tokio::test]
async fn protected_routes_require_a_token() {
    for (method, uri) in [
        (Method::GET, "/api/auth/me"),
        (Method::PATCH, "/api/auth/update-password"),
        (Method::GET, "/api/users/profile"),
        (Method::GET, "/api/vacancies/mine"),
        (Method::GET, "/api/companies/mine"),
        (Method::POST, "/api/applications"),
        (Method::GET, "/api/payments/history"),
        (Method::GET, "/api/analytics/platform"),
    ] {
        let (response, body) = send(test_app(), empty_request(method.clone(), uri)).await;
        assert_eq!(
            response.status(),
            StatusCode::UNAUTHORIZED,
            "{} {}",
            method,
            uri
        );
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["message"], json!("Authentication required"));
    }
}

#[tokio::test]
async fn writes_on_public_paths_still_require_a_token() {
    let id = Uuid::new_v4();
    let uri = format!("/api/vacancies/{}", id);
    let (response, _) = send(test_app(), empty_request(Method::DELETE, &uri)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let uri = format!("/api/companies/{}", id);
    let (response, _) = send(
        test_app(),
        json_request(Method::PATCH, &uri, json!({ "name": "Acme" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_signed_with_another_secret_is_rejected() {
    let app = test_app();
    let forged = issue_jwt(Uuid::new_v4(), UserType::Admin, "not-the-secret", 1).unwrap();
    let request = Request::builder()
        .uri("/api/auth/me")
        .header(header::AUTHORIZATION, format!("Bearer {}", forged))
        .body(Body::empty())
        .unwrap();
    let (response, body) = send(app, request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn garbage_cookie_token_is_rejected() {
    let request = Request::builder()
        .uri("/api/users/stats")
        .header(header::COOKIE, "token=definitely.not.ajwt")
        .body(Body::empty())
        .unwrap();
    let (response, _) = send(test_app(), request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn register_validation_reports_each_field() {
    let (response, body) = send(
        test_app(),
        json_request(
            Method::POST,
            "/api/auth/register",
            json!({
                "email": "not-an-email",
                "password": "123",
                "first_name": "",
                "last_name": "Doe"
            }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["message"], json!("Validation failed"));

    let fields: Vec<&str> = body["errors"]
        .as_array()
        .expect("errors array")
        .iter()
        .filter_map(|e| e["field"].as_str())
        .collect();
    assert_eq!(fields, vec!["email", "first_name", "password"]);
}

#[tokio::test]
async fn malformed_json_is_an_envelope_400() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"email\": "))
        .unwrap();
    let (response, body) = send(test_app(), request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn non_uuid_path_is_an_envelope_400() {
    let (response, body) = send(
        test_app(),
        empty_request(Method::GET, "/api/vacancies/not-a-uuid"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn logout_expires_the_session_cookie() {
    let (response, body) = send(test_app(), empty_request(Method::POST, "/api/auth/logout")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body["message"], json!("Logged out"));
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(cookie.starts_with("token=;"));
    assert!(cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn limiter_answers_429_once_the_window_is_spent() {
    let app = Router::new()
        .route("/ping", get(|| async { "pong" }))
        .layer(from_fn_with_state(RateLimiter::new(1), rps_middleware));

    let first = app
        .clone()
        .oneshot(empty_request(Method::GET, "/ping"))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let (second, body) = send(app, empty_request(Method::GET, "/ping")).await;
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["success"], json!(false));
}
