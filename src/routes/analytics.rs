use axum::{extract::State, response::IntoResponse};

use crate::{
    dto::{
        analytics_dto::{CandidateAnalytics, EmployerAnalytics, PlatformAnalytics},
        envelope::ApiResponse,
        payment_dto::RevenueQuery,
    },
    error::Result,
    middleware::auth::CurrentUser,
    models::user::UserType,
    utils::validation::ListQuery,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/analytics/platform",
    responses(
        (status = 200, description = "Platform-wide counters", body = PlatformAnalytics),
        (status = 403, description = "Administrators only")
    )
)]
#[axum::debug_handler]
pub async fn platform(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<impl IntoResponse> {
    current.require_role(&[UserType::Admin])?;
    let analytics: PlatformAnalytics = state.analytics_service.platform().await?;
    Ok(ApiResponse::ok(analytics))
}

#[utoipa::path(
    get,
    path = "/api/analytics/employer",
    responses(
        (status = 200, description = "Company dashboard", body = EmployerAnalytics),
        (status = 400, description = "No company profile yet"),
        (status = 403, description = "Employers only")
    )
)]
#[axum::debug_handler]
pub async fn employer(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<impl IntoResponse> {
    current.require_role(&[UserType::Employer])?;
    let company_id = current.require_company()?;
    let analytics: EmployerAnalytics = state.analytics_service.employer(company_id).await?;
    Ok(ApiResponse::ok(analytics))
}

#[utoipa::path(
    get,
    path = "/api/analytics/candidate",
    responses(
        (status = 200, description = "Application outcomes for the caller", body = CandidateAnalytics),
        (status = 403, description = "Candidates only")
    )
)]
#[axum::debug_handler]
pub async fn candidate(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<impl IntoResponse> {
    current.require_role(&[UserType::Candidate])?;
    let analytics: CandidateAnalytics = state.analytics_service.candidate(current.id).await?;
    Ok(ApiResponse::ok(analytics))
}

#[utoipa::path(
    get,
    path = "/api/analytics/revenue",
    params(
        ("from" = Option<String>, Query, description = "First day, YYYY-MM-DD"),
        ("to" = Option<String>, Query, description = "Last day, YYYY-MM-DD")
    ),
    responses(
        (status = 200, description = "Completed payment totals per month and type"),
        (status = 403, description = "Administrators only")
    )
)]
#[axum::debug_handler]
pub async fn revenue(
    State(state): State<AppState>,
    current: CurrentUser,
    ListQuery(query): ListQuery<RevenueQuery>,
) -> Result<impl IntoResponse> {
    current.require_role(&[UserType::Admin])?;
    let rows = state.analytics_service.revenue(query).await?;
    Ok(ApiResponse::ok(rows))
}
