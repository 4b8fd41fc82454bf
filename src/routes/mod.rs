pub mod analytics;
pub mod applications;
pub mod auth;
pub mod companies;
pub mod docs;
pub mod health;
pub mod payments;
pub mod users;
pub mod vacancies;

use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{delete, get, patch, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::{
    config::get_config,
    error::Error,
    middleware::{
        auth::require_auth,
        cors::api_cors,
        rate_limit::{rps_middleware, RateLimiter},
    },
    AppState,
};

const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

async fn route_not_found() -> Error {
    Error::NotFound("Route not found".to_string())
}

pub fn build_router(state: AppState) -> Router {
    let config = get_config();

    let public_api = Router::new()
        .route("/health", get(health::health))
        .route("/api/docs/openapi.json", get(docs::openapi_json))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/vacancies", get(vacancies::search_vacancies))
        .route("/api/vacancies/:id", get(vacancies::get_vacancy))
        .route("/api/vacancies/:id/view", post(vacancies::record_view))
        .route("/api/companies", get(companies::list_companies))
        .route("/api/companies/:id", get(companies::get_company))
        .layer(from_fn_with_state(
            RateLimiter::new(config.public_rps),
            rps_middleware,
        ));

    let private_api = Router::new()
        .route("/api/auth/me", get(auth::me))
        .route("/api/auth/update-password", patch(auth::update_password))
        .route(
            "/api/users/profile",
            get(users::get_profile).patch(users::update_profile),
        )
        .route(
            "/api/users/candidate-profile",
            patch(users::update_candidate_profile),
        )
        .route("/api/users/skills", post(users::add_skills))
        .route("/api/users/skills/:skill", delete(users::remove_skill))
        .route("/api/users/resume", post(users::update_resume))
        .route("/api/users/stats", get(users::stats))
        .route("/api/users/account", delete(users::delete_account))
        .route("/api/users", get(users::list_users))
        .route("/api/users/:id/status", patch(users::set_user_status))
        .route("/api/companies", post(companies::create_company))
        .route("/api/companies/mine", get(companies::my_companies))
        .route("/api/companies/:id", patch(companies::update_company))
        .route("/api/companies/:id/verify", patch(companies::verify_company))
        .route("/api/companies/:id/documents", post(companies::add_documents))
        .route("/api/companies/:id/stats", get(companies::company_stats))
        .route("/api/vacancies", post(vacancies::create_vacancy))
        .route("/api/vacancies/mine", get(vacancies::my_vacancies))
        .route(
            "/api/vacancies/:id",
            patch(vacancies::update_vacancy).delete(vacancies::delete_vacancy),
        )
        .route(
            "/api/vacancies/:id/status",
            patch(vacancies::set_vacancy_status),
        )
        .route("/api/vacancies/:id/boost", post(vacancies::boost_vacancy))
        .route("/api/vacancies/:id/refresh", post(vacancies::refresh_vacancy))
        .route("/api/applications", post(applications::submit_application))
        .route("/api/applications/my", get(applications::my_applications))
        .route(
            "/api/applications/company",
            get(applications::company_applications),
        )
        .route(
            "/api/applications/company/stats",
            get(applications::company_application_stats),
        )
        .route(
            "/api/applications/:id",
            get(applications::get_application).delete(applications::delete_application),
        )
        .route(
            "/api/applications/:id/status",
            patch(applications::change_status),
        )
        .route(
            "/api/applications/:id/messages",
            post(applications::add_message),
        )
        .route(
            "/api/applications/:id/messages/read",
            post(applications::mark_messages_read),
        )
        .route(
            "/api/applications/:id/interviews",
            post(applications::schedule_interview),
        )
        .route(
            "/api/applications/:id/interviews/:interview_id",
            patch(applications::update_interview),
        )
        .route(
            "/api/applications/:id/feedback",
            post(applications::submit_feedback),
        )
        .route(
            "/api/applications/:id/withdraw",
            post(applications::withdraw),
        )
        .route(
            "/api/payments/subscription",
            post(payments::subscribe),
        )
        .route("/api/payments/services", post(payments::purchase_services))
        .route("/api/payments/history", get(payments::history))
        .route("/api/payments/:id/receipt", get(payments::receipt))
        .route("/api/payments/:id/refund", post(payments::refund))
        .route("/api/analytics/platform", get(analytics::platform))
        .route("/api/analytics/employer", get(analytics::employer))
        .route("/api/analytics/candidate", get(analytics::candidate))
        .route("/api/analytics/revenue", get(analytics::revenue))
        .layer(from_fn_with_state(state.clone(), require_auth))
        .layer(from_fn_with_state(
            RateLimiter::new(config.api_rps),
            rps_middleware,
        ));

    public_api
        .merge(private_api)
        .fallback(route_not_found)
        .with_state(state)
        .layer(api_cors())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
}
