use axum::{extract::State, response::IntoResponse};
use uuid::Uuid;

use crate::{
    dto::{
        envelope::ApiResponse,
        user_dto::{
            ResumePayload, SkillsPayload, SkillsResponse, UpdateCandidateProfilePayload,
            UpdateProfilePayload, UserListQuery, UserStatsResponse, UserStatusPayload,
        },
    },
    error::Result,
    middleware::auth::CurrentUser,
    models::user::{User, UserType},
    utils::validation::{ApiPath, ListQuery, ValidatedJson},
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/users/profile",
    responses(
        (status = 200, description = "Own profile", body = User),
        (status = 401, description = "Not authenticated")
    )
)]
#[axum::debug_handler]
pub async fn get_profile(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<impl IntoResponse> {
    let user: User = state.user_service.find_by_id(current.id).await?;
    Ok(ApiResponse::ok(user))
}

#[utoipa::path(
    patch,
    path = "/api/users/profile",
    request_body = UpdateProfilePayload,
    responses(
        (status = 200, description = "Profile updated", body = User),
        (status = 400, description = "Invalid payload")
    )
)]
#[axum::debug_handler]
pub async fn update_profile(
    State(state): State<AppState>,
    current: CurrentUser,
    ValidatedJson(payload): ValidatedJson<UpdateProfilePayload>,
) -> Result<impl IntoResponse> {
    let user = state.user_service.update_profile(current.id, payload).await?;
    Ok(ApiResponse::with_message(user, "Profile updated"))
}

#[utoipa::path(
    patch,
    path = "/api/users/candidate-profile",
    request_body = UpdateCandidateProfilePayload,
    responses(
        (status = 200, description = "Candidate profile updated", body = User),
        (status = 403, description = "Candidates only")
    )
)]
#[axum::debug_handler]
pub async fn update_candidate_profile(
    State(state): State<AppState>,
    current: CurrentUser,
    ValidatedJson(payload): ValidatedJson<UpdateCandidateProfilePayload>,
) -> Result<impl IntoResponse> {
    current.require_role(&[UserType::Candidate])?;
    let user = state
        .user_service
        .update_candidate_profile(current.id, payload)
        .await?;
    Ok(ApiResponse::with_message(user, "Candidate profile updated"))
}

#[utoipa::path(
    post,
    path = "/api/users/skills",
    request_body = SkillsPayload,
    responses(
        (status = 200, description = "Skills merged into the profile", body = SkillsResponse),
        (status = 403, description = "Candidates only")
    )
)]
#[axum::debug_handler]
pub async fn add_skills(
    State(state): State<AppState>,
    current: CurrentUser,
    ValidatedJson(payload): ValidatedJson<SkillsPayload>,
) -> Result<impl IntoResponse> {
    current.require_role(&[UserType::Candidate])?;
    let result: SkillsResponse = state
        .user_service
        .add_skills(current.id, payload.skills)
        .await?;
    Ok(ApiResponse::ok(result))
}

#[utoipa::path(
    delete,
    path = "/api/users/skills/{skill}",
    params(
        ("skill" = String, Path, description = "Skill to remove")
    ),
    responses(
        (status = 200, description = "Remaining skills"),
        (status = 403, description = "Candidates only")
    )
)]
#[axum::debug_handler]
pub async fn remove_skill(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiPath(skill): ApiPath<String>,
) -> Result<impl IntoResponse> {
    current.require_role(&[UserType::Candidate])?;
    let skills = state.user_service.remove_skill(current.id, &skill).await?;
    Ok(ApiResponse::ok(skills))
}

#[utoipa::path(
    post,
    path = "/api/users/resume",
    request_body = ResumePayload,
    responses(
        (status = 200, description = "Resume stored"),
        (status = 400, description = "Neither text nor file given")
    )
)]
#[axum::debug_handler]
pub async fn update_resume(
    State(state): State<AppState>,
    current: CurrentUser,
    ValidatedJson(payload): ValidatedJson<ResumePayload>,
) -> Result<impl IntoResponse> {
    current.require_role(&[UserType::Candidate])?;
    let resume = state
        .user_service
        .update_resume(current.id, payload.text, payload.file)
        .await?;
    Ok(ApiResponse::with_message(resume, "Resume updated"))
}

#[utoipa::path(
    get,
    path = "/api/users",
    params(
        ("page" = Option<i64>, Query, description = "Page number"),
        ("limit" = Option<i64>, Query, description = "Items per page"),
        ("type" = Option<String>, Query, description = "candidate, employer or admin"),
        ("is_active" = Option<bool>, Query, description = "Filter by account state"),
        ("search" = Option<String>, Query, description = "Name or email substring")
    ),
    responses(
        (status = 200, description = "Paginated users"),
        (status = 403, description = "Administrators only")
    )
)]
#[axum::debug_handler]
pub async fn list_users(
    State(state): State<AppState>,
    current: CurrentUser,
    ListQuery(query): ListQuery<UserListQuery>,
) -> Result<impl IntoResponse> {
    current.require_role(&[UserType::Admin])?;
    let users = state.user_service.list(query).await?;
    Ok(ApiResponse::ok(users))
}

#[utoipa::path(
    patch,
    path = "/api/users/{id}/status",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    request_body = UserStatusPayload,
    responses(
        (status = 200, description = "Account state changed", body = User),
        (status = 404, description = "User not found")
    )
)]
#[axum::debug_handler]
pub async fn set_user_status(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<UserStatusPayload>,
) -> Result<impl IntoResponse> {
    current.require_role(&[UserType::Admin])?;
    let user = state.user_service.set_active(id, payload.is_active).await?;
    let message = if payload.is_active {
        "User activated"
    } else {
        "User blocked"
    };
    Ok(ApiResponse::with_message(user, message))
}

#[utoipa::path(
    get,
    path = "/api/users/stats",
    responses(
        (status = 200, description = "Activity counters for the caller", body = UserStatsResponse)
    )
)]
#[axum::debug_handler]
pub async fn stats(State(state): State<AppState>, current: CurrentUser) -> Result<impl IntoResponse> {
    let stats: UserStatsResponse = state.user_service.stats(current.id).await?;
    Ok(ApiResponse::ok(stats))
}

#[utoipa::path(
    delete,
    path = "/api/users/account",
    responses(
        (status = 200, description = "Account deactivated and email released")
    )
)]
#[axum::debug_handler]
pub async fn delete_account(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<impl IntoResponse> {
    state.user_service.delete_account(current.id).await?;
    Ok(ApiResponse::message("Account deleted"))
}
