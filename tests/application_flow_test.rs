//! End-to-end flows against a real Postgres. Skipped when `DATABASE_URL` is unset.

use std::env;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{DateTime, Utc};
use serde_json::{json, Value as JsonValue};
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

use jobboard_backend::{
    config::init_config,
    database::pool::create_pool,
    error::Error,
    routes::build_router,
    services::vacancy_service::slug_conflict,
    AppState,
};

const RESUME_TEXT: &str = "Backend engineer with four years of Rust and Postgres experience. \
    Built HTTP services on axum, wrote migrations, tuned queries and ran them in production.";

async fn setup() -> Option<(Router, PgPool)> {
    dotenvy::dotenv().ok();
    if env::var("DATABASE_URL").is_err() {
        eprintln!("DATABASE_URL is not set, skipping database-backed flow");
        return None;
    }
    env::set_var("SERVER_ADDRESS", "127.0.0.1:0");
    env::set_var("JWT_SECRET", "test_secret_key");
    env::set_var("PUBLIC_RPS", "1000");
    env::set_var("API_RPS", "1000");
    let _ = init_config();

    let pool = create_pool().await.expect("pool");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations");
    Some((build_router(AppState::new(pool.clone())), pool))
}

async fn call(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<JsonValue>,
) -> (StatusCode, JsonValue) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let json = serde_json::from_slice(&bytes).unwrap_or(JsonValue::Null);
    (status, json)
}

/// Registers a fresh account and returns `(token, user id)`.
async fn register(app: &Router, user_type: &str) -> (String, Uuid) {
    let email = format!("{}_{}@example.com", user_type, Uuid::new_v4().simple());
    let (status, body) = call(
        app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({
            "email": email,
            "password": "secret123",
            "first_name": "Test",
            "last_name": "User",
            "type": user_type,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register: {}", body);
    let token = body["data"]["token"].as_str().expect("token").to_string();
    let id = body["data"]["user"]["id"].as_str().expect("user id");
    (token, Uuid::parse_str(id).expect("uuid"))
}

fn company_body(name: &str) -> JsonValue {
    json!({
        "name": name,
        "description": "We build logistics software for regional carriers and their dispatch teams.",
        "industry": "it",
        "size": "11-50",
    })
}

fn vacancy_body(title: &str) -> JsonValue {
    json!({
        "title": title,
        "description": "Own the routing API, its Postgres schema and the on-call rotation for it.",
        "experience": "0-1 year",
        "salary": { "min": 100000, "max": 150000 },
        "location": { "city": "Tashkent" },
        "employment_type": "full-time",
        "schedule": "remote",
        "category": "it",
    })
}

/// Employer with a company and one active vacancy: `(token, vacancy id)`.
async fn employer_with_vacancy(app: &Router) -> (String, Uuid) {
    let (token, _) = register(app, "employer").await;
    let name = format!("Acme {}", Uuid::new_v4().simple());
    let (status, body) = call(
        app,
        Method::POST,
        "/api/companies",
        Some(&token),
        Some(company_body(&name)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "company: {}", body);

    let (status, body) = call(
        app,
        Method::POST,
        "/api/vacancies",
        Some(&token),
        Some(vacancy_body("Rust Backend Engineer")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "vacancy: {}", body);
    let id = body["data"]["id"].as_str().expect("vacancy id");
    (token, Uuid::parse_str(id).expect("uuid"))
}

async fn candidate_with_resume(app: &Router) -> (String, Uuid) {
    let (token, id) = register(app, "candidate").await;
    let (status, body) = call(
        app,
        Method::POST,
        "/api/users/resume",
        Some(&token),
        Some(json!({ "text": RESUME_TEXT })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "resume: {}", body);
    (token, id)
}

#[tokio::test]
async fn submit_counts_once_and_rejects_a_second_application() {
    let Some((app, pool)) = setup().await else {
        return;
    };
    let (_, vacancy_id) = employer_with_vacancy(&app).await;
    let (candidate, candidate_id) = candidate_with_resume(&app).await;

    let payload = json!({ "vacancy": vacancy_id });
    let (status, body) = call(
        &app,
        Method::POST,
        "/api/applications",
        Some(&candidate),
        Some(payload.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "submit: {}", body);
    assert_eq!(body["data"]["status"], json!("applied"));

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/applications",
        Some(&candidate),
        Some(payload),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert_eq!(
        body["message"],
        json!("You have already applied to this vacancy")
    );

    let applications: i64 = sqlx::query_scalar("SELECT applications FROM vacancies WHERE id = $1")
        .bind(vacancy_id)
        .fetch_one(&pool)
        .await
        .expect("vacancy counter");
    assert_eq!(applications, 1);

    let rows: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM applications WHERE vacancy_id = $1 AND candidate_id = $2",
    )
    .bind(vacancy_id)
    .bind(candidate_id)
    .fetch_one(&pool)
    .await
    .expect("application rows");
    assert_eq!(rows, 1);
}

#[tokio::test]
async fn submit_without_resume_is_rejected() {
    let Some((app, _pool)) = setup().await else {
        return;
    };
    let (_, vacancy_id) = employer_with_vacancy(&app).await;
    let (candidate, _) = register(&app, "candidate").await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/applications",
        Some(&candidate),
        Some(json!({ "vacancy": vacancy_id })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        json!("Upload a resume to your profile before applying")
    );
}

#[tokio::test]
async fn first_employer_message_marks_the_application_viewed() {
    let Some((app, pool)) = setup().await else {
        return;
    };
    let (employer, vacancy_id) = employer_with_vacancy(&app).await;
    let (candidate, _) = candidate_with_resume(&app).await;

    let (_, body) = call(
        &app,
        Method::POST,
        "/api/applications",
        Some(&candidate),
        Some(json!({ "vacancy": vacancy_id })),
    )
    .await;
    let application_id = Uuid::parse_str(body["data"]["id"].as_str().expect("id")).expect("uuid");

    let uri = format!("/api/applications/{}/messages", application_id);
    let (status, body) = call(
        &app,
        Method::POST,
        &uri,
        Some(&employer),
        Some(json!({ "type": "employer", "message": "Thanks, we would like to talk." })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "message: {}", body);

    let (status, viewed_at): (String, Option<DateTime<Utc>>) = sqlx::query_as(
        "SELECT status::text, viewed_at FROM applications WHERE id = $1",
    )
    .bind(application_id)
    .fetch_one(&pool)
    .await
    .expect("application row");
    assert_eq!(status, "viewed");
    assert!(viewed_at.is_some());
}

#[tokio::test]
async fn company_names_are_unique() {
    let Some((app, _pool)) = setup().await else {
        return;
    };
    let name = format!("Globex {}", Uuid::new_v4().simple());
    let (first, _) = register(&app, "employer").await;
    let (second, _) = register(&app, "employer").await;

    let (status, _) = call(
        &app,
        Method::POST,
        "/api/companies",
        Some(&first),
        Some(company_body(&name)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/companies",
        Some(&second),
        Some(company_body(&name.to_uppercase())),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], json!("Company with this name already exists"));
}

#[tokio::test]
async fn subscription_payment_is_stored_as_completed() {
    let Some((app, pool)) = setup().await else {
        return;
    };
    let (token, user_id) = register(&app, "employer").await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/payments/subscription",
        Some(&token),
        Some(json!({ "plan": "basic" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "subscribe: {}", body);
    let payment_id =
        Uuid::parse_str(body["data"]["payment"]["id"].as_str().expect("id")).expect("uuid");

    let (status, paid_at): (String, Option<DateTime<Utc>>) =
        sqlx::query_as("SELECT status::text, paid_at FROM payments WHERE id = $1 AND user_id = $2")
            .bind(payment_id)
            .bind(user_id)
            .fetch_one(&pool)
            .await
            .expect("payment row");
    assert_eq!(status, "completed");
    assert!(paid_at.is_some());
}

#[tokio::test]
async fn password_change_checks_the_current_password() {
    let Some((app, _pool)) = setup().await else {
        return;
    };
    let email = format!("pw_{}@example.com", Uuid::new_v4().simple());
    let (status, body) = call(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({
            "email": email,
            "password": "secret123",
            "first_name": "Pat",
            "last_name": "Lee",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let token = body["data"]["token"].as_str().expect("token").to_string();

    let (status, body) = call(
        &app,
        Method::PATCH,
        "/api/auth/update-password",
        Some(&token),
        Some(json!({ "current_password": "wrong-one", "new_password": "changed456" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], json!("Current password is incorrect"));

    let (status, body) = call(
        &app,
        Method::PATCH,
        "/api/auth/update-password",
        Some(&token),
        Some(json!({ "current_password": "secret123", "new_password": "changed456" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "update: {}", body);
    assert!(body["data"]["token"].is_string());

    let login = |password: &str| {
        json!({ "email": email, "password": password })
    };
    let (status, _) = call(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(login("secret123")),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = call(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(login("changed456")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn renaming_onto_a_taken_slug_is_a_conflict() {
    let Some((app, pool)) = setup().await else {
        return;
    };
    let (_, first) = employer_with_vacancy(&app).await;
    let (_, second) = employer_with_vacancy(&app).await;

    let taken: String = sqlx::query_scalar("SELECT slug FROM vacancies WHERE id = $1")
        .bind(first)
        .fetch_one(&pool)
        .await
        .expect("slug");
    let err = sqlx::query("UPDATE vacancies SET slug = $1 WHERE id = $2")
        .bind(&taken)
        .bind(second)
        .execute(&pool)
        .await
        .map_err(slug_conflict)
        .unwrap_err();
    assert!(matches!(err, Error::Conflict(_)), "got {:?}", err);
}
