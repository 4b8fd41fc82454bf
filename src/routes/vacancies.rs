use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;
use uuid::Uuid;

use crate::{
    dto::{
        envelope::ApiResponse,
        vacancy_dto::{
            BoostPayload, BoostResponse, CreateVacancyPayload, MyVacanciesQuery,
            UpdateVacancyPayload, VacancySearchQuery, VacancyStatusPayload,
        },
    },
    error::Result,
    middleware::auth::CurrentUser,
    models::{user::UserType, vacancy::Vacancy},
    utils::validation::{ApiPath, ListQuery, ValidatedJson},
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/vacancies",
    params(
        ("page" = Option<i64>, Query, description = "Page number"),
        ("limit" = Option<i64>, Query, description = "Items per page, at most 100"),
        ("search" = Option<String>, Query, description = "Full-text search over title, description and tags"),
        ("location" = Option<String>, Query, description = "City substring"),
        ("category" = Option<String>, Query, description = "Vacancy category"),
        ("experience" = Option<String>, Query, description = "Required experience"),
        ("salary_min" = Option<String>, Query, description = "Lower salary bound"),
        ("salary_max" = Option<String>, Query, description = "Upper salary bound"),
        ("employment_type" = Option<String>, Query, description = "full-time, part-time, ..."),
        ("is_remote" = Option<bool>, Query, description = "Remote-friendly only")
    ),
    responses(
        (status = 200, description = "Live vacancies, boosted first")
    )
)]
#[axum::debug_handler]
pub async fn search_vacancies(
    State(state): State<AppState>,
    ListQuery(query): ListQuery<VacancySearchQuery>,
) -> Result<impl IntoResponse> {
    let vacancies = state.vacancy_service.search(query).await?;
    Ok(ApiResponse::ok(vacancies))
}

#[utoipa::path(
    get,
    path = "/api/vacancies/{id}",
    params(
        ("id" = Uuid, Path, description = "Vacancy ID")
    ),
    responses(
        (status = 200, description = "Vacancy found", body = Vacancy),
        (status = 404, description = "Vacancy not found")
    )
)]
#[axum::debug_handler]
pub async fn get_vacancy(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse> {
    let vacancy: Vacancy = state.vacancy_service.get_public(id).await?;
    Ok(ApiResponse::ok(vacancy))
}

#[utoipa::path(
    post,
    path = "/api/vacancies/{id}/view",
    params(
        ("id" = Uuid, Path, description = "Vacancy ID")
    ),
    responses(
        (status = 200, description = "View counted"),
        (status = 404, description = "Vacancy not found")
    )
)]
#[axum::debug_handler]
pub async fn record_view(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse> {
    let views = state.vacancy_service.record_view(id).await?;
    Ok(ApiResponse::ok(json!({ "views": views })))
}

#[utoipa::path(
    post,
    path = "/api/vacancies",
    request_body = CreateVacancyPayload,
    responses(
        (status = 201, description = "Vacancy created", body = Vacancy),
        (status = 400, description = "Invalid payload or no company profile"),
        (status = 403, description = "Employers only")
    )
)]
#[axum::debug_handler]
pub async fn create_vacancy(
    State(state): State<AppState>,
    current: CurrentUser,
    ValidatedJson(payload): ValidatedJson<CreateVacancyPayload>,
) -> Result<impl IntoResponse> {
    current.require_role(&[UserType::Employer])?;
    let company_id = current.require_company()?;
    let vacancy = state
        .vacancy_service
        .create(current.id, company_id, payload)
        .await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message(vacancy, "Vacancy created"),
    ))
}

#[utoipa::path(
    patch,
    path = "/api/vacancies/{id}",
    params(
        ("id" = Uuid, Path, description = "Vacancy ID")
    ),
    request_body = UpdateVacancyPayload,
    responses(
        (status = 200, description = "Vacancy updated", body = Vacancy),
        (status = 400, description = "Invalid payload"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Vacancy not found")
    )
)]
#[axum::debug_handler]
pub async fn update_vacancy(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateVacancyPayload>,
) -> Result<impl IntoResponse> {
    let vacancy = state.vacancy_service.update(id, &current, payload).await?;
    Ok(ApiResponse::with_message(vacancy, "Vacancy updated"))
}

#[utoipa::path(
    delete,
    path = "/api/vacancies/{id}",
    params(
        ("id" = Uuid, Path, description = "Vacancy ID")
    ),
    responses(
        (status = 200, description = "Vacancy closed and hidden"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Vacancy not found")
    )
)]
#[axum::debug_handler]
pub async fn delete_vacancy(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse> {
    state.vacancy_service.delete(id, &current).await?;
    Ok(ApiResponse::message("Vacancy deleted"))
}

#[utoipa::path(
    get,
    path = "/api/vacancies/mine",
    params(
        ("page" = Option<i64>, Query, description = "Page number"),
        ("limit" = Option<i64>, Query, description = "Items per page"),
        ("status" = Option<String>, Query, description = "Filter by status")
    ),
    responses(
        (status = 200, description = "The caller's vacancies")
    )
)]
#[axum::debug_handler]
pub async fn my_vacancies(
    State(state): State<AppState>,
    current: CurrentUser,
    ListQuery(query): ListQuery<MyVacanciesQuery>,
) -> Result<impl IntoResponse> {
    current.require_role(&[UserType::Employer])?;
    let vacancies = state.vacancy_service.mine(current.id, query).await?;
    Ok(ApiResponse::ok(vacancies))
}

#[utoipa::path(
    patch,
    path = "/api/vacancies/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Vacancy ID")
    ),
    request_body = VacancyStatusPayload,
    responses(
        (status = 200, description = "Status changed", body = Vacancy),
        (status = 403, description = "Not the owner")
    )
)]
#[axum::debug_handler]
pub async fn set_vacancy_status(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<VacancyStatusPayload>,
) -> Result<impl IntoResponse> {
    let vacancy = state
        .vacancy_service
        .set_status(id, &current, payload.status)
        .await?;
    Ok(ApiResponse::ok(vacancy))
}

#[utoipa::path(
    post,
    path = "/api/vacancies/{id}/boost",
    params(
        ("id" = Uuid, Path, description = "Vacancy ID")
    ),
    request_body = BoostPayload,
    responses(
        (status = 200, description = "Boost applied", body = BoostResponse),
        (status = 403, description = "Not the owner")
    )
)]
#[axum::debug_handler]
pub async fn boost_vacancy(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<BoostPayload>,
) -> Result<impl IntoResponse> {
    let boost: BoostResponse = state
        .vacancy_service
        .boost(id, current.id, payload.kind, payload.days())
        .await?;
    Ok(ApiResponse::with_message(boost, "Boost applied"))
}

#[utoipa::path(
    post,
    path = "/api/vacancies/{id}/refresh",
    params(
        ("id" = Uuid, Path, description = "Vacancy ID")
    ),
    responses(
        (status = 200, description = "Refresh time stamped", body = Vacancy),
        (status = 403, description = "Not the owner")
    )
)]
#[axum::debug_handler]
pub async fn refresh_vacancy(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse> {
    let vacancy = state.vacancy_service.refresh(id, current.id).await?;
    Ok(ApiResponse::ok(vacancy))
}
