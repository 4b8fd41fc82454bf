use axum::{extract::State, http::StatusCode, response::IntoResponse};
use uuid::Uuid;

use crate::{
    dto::{
        company_dto::{
            CompanyDetailResponse, CompanyListQuery, CreateCompanyPayload, DocumentsPayload,
            UpdateCompanyPayload, VerifyCompanyPayload,
        },
        envelope::ApiResponse,
    },
    error::Result,
    middleware::auth::CurrentUser,
    models::{
        company::{Company, CompanyStats},
        user::UserType,
    },
    utils::validation::{ApiPath, ListQuery, ValidatedJson},
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/companies",
    params(
        ("page" = Option<i64>, Query, description = "Page number"),
        ("limit" = Option<i64>, Query, description = "Items per page"),
        ("industry" = Option<String>, Query, description = "Industry filter"),
        ("size" = Option<String>, Query, description = "Headcount band, e.g. 11-50"),
        ("location" = Option<String>, Query, description = "City substring"),
        ("verified" = Option<bool>, Query, description = "Only verified companies"),
        ("search" = Option<String>, Query, description = "Full-text search")
    ),
    responses(
        (status = 200, description = "Paginated companies, verified first")
    )
)]
#[axum::debug_handler]
pub async fn list_companies(
    State(state): State<AppState>,
    ListQuery(query): ListQuery<CompanyListQuery>,
) -> Result<impl IntoResponse> {
    let companies = state.company_service.list(query).await?;
    Ok(ApiResponse::ok(companies))
}

#[utoipa::path(
    get,
    path = "/api/companies/{id}",
    params(
        ("id" = Uuid, Path, description = "Company ID")
    ),
    responses(
        (status = 200, description = "Company with its open vacancies", body = CompanyDetailResponse),
        (status = 404, description = "Company not found")
    )
)]
#[axum::debug_handler]
pub async fn get_company(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse> {
    let detail: CompanyDetailResponse = state.company_service.get_public(id).await?;
    Ok(ApiResponse::ok(detail))
}

#[utoipa::path(
    post,
    path = "/api/companies",
    request_body = CreateCompanyPayload,
    responses(
        (status = 201, description = "Company created", body = Company),
        (status = 400, description = "Invalid payload, duplicate name or company already exists"),
        (status = 403, description = "Employers only")
    )
)]
#[axum::debug_handler]
pub async fn create_company(
    State(state): State<AppState>,
    current: CurrentUser,
    ValidatedJson(payload): ValidatedJson<CreateCompanyPayload>,
) -> Result<impl IntoResponse> {
    current.require_role(&[UserType::Employer])?;
    let company: Company = state.company_service.create(current.id, payload).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message(company, "Company created"),
    ))
}

#[utoipa::path(
    patch,
    path = "/api/companies/{id}",
    params(
        ("id" = Uuid, Path, description = "Company ID")
    ),
    request_body = UpdateCompanyPayload,
    responses(
        (status = 200, description = "Company updated", body = Company),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Company not found")
    )
)]
#[axum::debug_handler]
pub async fn update_company(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateCompanyPayload>,
) -> Result<impl IntoResponse> {
    let company = state.company_service.update(id, &current, payload).await?;
    Ok(ApiResponse::with_message(company, "Company updated"))
}

#[utoipa::path(
    get,
    path = "/api/companies/mine",
    responses(
        (status = 200, description = "Companies created by the caller")
    )
)]
#[axum::debug_handler]
pub async fn my_companies(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<impl IntoResponse> {
    let companies = state.company_service.mine(current.id).await?;
    Ok(ApiResponse::ok(companies))
}

#[utoipa::path(
    patch,
    path = "/api/companies/{id}/verify",
    params(
        ("id" = Uuid, Path, description = "Company ID")
    ),
    request_body = VerifyCompanyPayload,
    responses(
        (status = 200, description = "Verification flag updated", body = Company),
        (status = 403, description = "Administrators only")
    )
)]
#[axum::debug_handler]
pub async fn verify_company(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<VerifyCompanyPayload>,
) -> Result<impl IntoResponse> {
    current.require_role(&[UserType::Admin])?;
    let company = state
        .company_service
        .verify(id, current.id, payload.is_verified)
        .await?;
    Ok(ApiResponse::ok(company))
}

#[utoipa::path(
    post,
    path = "/api/companies/{id}/documents",
    params(
        ("id" = Uuid, Path, description = "Company ID")
    ),
    request_body = DocumentsPayload,
    responses(
        (status = 200, description = "Documents attached", body = Company),
        (status = 403, description = "Not the owner")
    )
)]
#[axum::debug_handler]
pub async fn add_documents(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<DocumentsPayload>,
) -> Result<impl IntoResponse> {
    let company = state
        .company_service
        .add_documents(id, &current, payload)
        .await?;
    Ok(ApiResponse::with_message(company, "Documents uploaded"))
}

#[utoipa::path(
    get,
    path = "/api/companies/{id}/stats",
    params(
        ("id" = Uuid, Path, description = "Company ID")
    ),
    responses(
        (status = 200, description = "Freshly recomputed stats", body = CompanyStats),
        (status = 403, description = "Not the owner")
    )
)]
#[axum::debug_handler]
pub async fn company_stats(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse> {
    let stats: CompanyStats = state.company_service.refresh_stats(id, &current).await?;
    Ok(ApiResponse::ok(stats))
}
