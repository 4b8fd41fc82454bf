use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
};
use uuid::Uuid;

use crate::{
    dto::{
        application_dto::{
            ChangeStatusPayload, CompanyApplicationsQuery, FeedbackPayload,
            InterviewUpdatePayload, MessagePayload, MyApplicationsQuery, ReadReceipt,
            ScheduleInterviewPayload, SubmitApplicationPayload, WithdrawPayload,
        },
        envelope::ApiResponse,
    },
    error::Result,
    middleware::auth::CurrentUser,
    models::{
        application::{Application, Interview},
        user::UserType,
    },
    services::application_service::{client_ip, SubmissionMeta},
    utils::validation::{ApiPath, ListQuery, ValidatedJson},
    AppState,
};

fn submission_meta(headers: &HeaderMap, peer: Option<SocketAddr>) -> SubmissionMeta {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok());
    SubmissionMeta {
        ip_address: client_ip(forwarded, peer),
        user_agent: headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    }
}

#[utoipa::path(
    post,
    path = "/api/applications",
    request_body = SubmitApplicationPayload,
    responses(
        (status = 201, description = "Application submitted", body = Application),
        (status = 400, description = "Already applied or no resume on file"),
        (status = 404, description = "Vacancy not accepting applications")
    )
)]
#[axum::debug_handler]
pub async fn submit_application(
    State(state): State<AppState>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    current: CurrentUser,
    ValidatedJson(payload): ValidatedJson<SubmitApplicationPayload>,
) -> Result<impl IntoResponse> {
    current.require_role(&[UserType::Candidate])?;
    let meta = submission_meta(&headers, peer.map(|ConnectInfo(addr)| addr));
    let application: Application = state
        .application_service
        .submit(current.id, payload, meta)
        .await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message(application, "Application submitted"),
    ))
}

#[utoipa::path(
    get,
    path = "/api/applications/my",
    params(
        ("page" = Option<i64>, Query, description = "Page number"),
        ("limit" = Option<i64>, Query, description = "Items per page"),
        ("status" = Option<String>, Query, description = "Filter by status")
    ),
    responses(
        (status = 200, description = "The caller's applications")
    )
)]
#[axum::debug_handler]
pub async fn my_applications(
    State(state): State<AppState>,
    current: CurrentUser,
    ListQuery(query): ListQuery<MyApplicationsQuery>,
) -> Result<impl IntoResponse> {
    current.require_role(&[UserType::Candidate])?;
    let applications = state
        .application_service
        .list_mine(current.id, query)
        .await?;
    Ok(ApiResponse::ok(applications))
}

#[utoipa::path(
    get,
    path = "/api/applications/company",
    params(
        ("page" = Option<i64>, Query, description = "Page number"),
        ("limit" = Option<i64>, Query, description = "Items per page"),
        ("status" = Option<String>, Query, description = "Filter by status"),
        ("vacancy" = Option<Uuid>, Query, description = "Filter by vacancy"),
        ("recent" = Option<bool>, Query, description = "Only the last 7 days")
    ),
    responses(
        (status = 200, description = "Applications to the caller's company")
    )
)]
#[axum::debug_handler]
pub async fn company_applications(
    State(state): State<AppState>,
    current: CurrentUser,
    ListQuery(query): ListQuery<CompanyApplicationsQuery>,
) -> Result<impl IntoResponse> {
    current.require_role(&[UserType::Employer])?;
    let company_id = current.require_company()?;
    let applications = state
        .application_service
        .list_company(company_id, query)
        .await?;
    Ok(ApiResponse::ok(applications))
}

#[utoipa::path(
    get,
    path = "/api/applications/company/stats",
    responses(
        (status = 200, description = "Per-status counts and mean response time")
    )
)]
#[axum::debug_handler]
pub async fn company_application_stats(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<impl IntoResponse> {
    current.require_role(&[UserType::Employer])?;
    let company_id = current.require_company()?;
    let stats = state.application_service.company_stats(company_id).await?;
    Ok(ApiResponse::ok(stats))
}

#[utoipa::path(
    get,
    path = "/api/applications/{id}",
    params(
        ("id" = Uuid, Path, description = "Application ID")
    ),
    responses(
        (status = 200, description = "Application found", body = Application),
        (status = 403, description = "Not a participant"),
        (status = 404, description = "Application not found")
    )
)]
#[axum::debug_handler]
pub async fn get_application(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse> {
    let application = state.application_service.get(id, &current).await?;
    Ok(ApiResponse::ok(application))
}

#[utoipa::path(
    patch,
    path = "/api/applications/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Application ID")
    ),
    request_body = ChangeStatusPayload,
    responses(
        (status = 200, description = "Status changed", body = Application),
        (status = 400, description = "Application already closed"),
        (status = 403, description = "Not allowed to make this change")
    )
)]
#[axum::debug_handler]
pub async fn change_status(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<ChangeStatusPayload>,
) -> Result<impl IntoResponse> {
    let application = state
        .application_service
        .change_status(id, &current, payload)
        .await?;
    Ok(ApiResponse::with_message(application, "Status updated"))
}

#[utoipa::path(
    post,
    path = "/api/applications/{id}/messages",
    params(
        ("id" = Uuid, Path, description = "Application ID")
    ),
    request_body = MessagePayload,
    responses(
        (status = 201, description = "Message appended", body = Application),
        (status = 400, description = "Message type does not match the sender"),
        (status = 403, description = "Not a participant")
    )
)]
#[axum::debug_handler]
pub async fn add_message(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<MessagePayload>,
) -> Result<impl IntoResponse> {
    let (application, _message) = state
        .application_service
        .add_message(id, &current, payload)
        .await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message(application, "Message sent"),
    ))
}

#[utoipa::path(
    post,
    path = "/api/applications/{id}/messages/read",
    params(
        ("id" = Uuid, Path, description = "Application ID")
    ),
    responses(
        (status = 200, description = "Messages from the other side marked read", body = ReadReceipt)
    )
)]
#[axum::debug_handler]
pub async fn mark_messages_read(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse> {
    let receipt: ReadReceipt = state.application_service.mark_read(id, &current).await?;
    Ok(ApiResponse::ok(receipt))
}

#[utoipa::path(
    post,
    path = "/api/applications/{id}/interviews",
    params(
        ("id" = Uuid, Path, description = "Application ID")
    ),
    request_body = ScheduleInterviewPayload,
    responses(
        (status = 201, description = "Interview scheduled", body = Interview),
        (status = 400, description = "Application already closed"),
        (status = 403, description = "Hiring company only")
    )
)]
#[axum::debug_handler]
pub async fn schedule_interview(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<ScheduleInterviewPayload>,
) -> Result<impl IntoResponse> {
    let interview: Interview = state
        .application_service
        .schedule_interview(id, &current, payload)
        .await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message(interview, "Interview scheduled"),
    ))
}

#[utoipa::path(
    patch,
    path = "/api/applications/{id}/interviews/{interview_id}",
    params(
        ("id" = Uuid, Path, description = "Application ID"),
        ("interview_id" = Uuid, Path, description = "Interview ID")
    ),
    request_body = InterviewUpdatePayload,
    responses(
        (status = 200, description = "Interview updated", body = Interview),
        (status = 404, description = "Interview not found")
    )
)]
#[axum::debug_handler]
pub async fn update_interview(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiPath((id, interview_id)): ApiPath<(Uuid, Uuid)>,
    ValidatedJson(payload): ValidatedJson<InterviewUpdatePayload>,
) -> Result<impl IntoResponse> {
    let interview = state
        .application_service
        .update_interview(id, interview_id, &current, payload)
        .await?;
    Ok(ApiResponse::ok(interview))
}

#[utoipa::path(
    post,
    path = "/api/applications/{id}/feedback",
    params(
        ("id" = Uuid, Path, description = "Application ID")
    ),
    request_body = FeedbackPayload,
    responses(
        (status = 200, description = "Rating stored", body = Application)
    )
)]
#[axum::debug_handler]
pub async fn submit_feedback(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<FeedbackPayload>,
) -> Result<impl IntoResponse> {
    let application = state
        .application_service
        .submit_feedback(id, &current, payload)
        .await?;
    Ok(ApiResponse::with_message(application, "Feedback submitted"))
}

#[utoipa::path(
    post,
    path = "/api/applications/{id}/withdraw",
    params(
        ("id" = Uuid, Path, description = "Application ID")
    ),
    request_body = WithdrawPayload,
    responses(
        (status = 200, description = "Application withdrawn", body = Application),
        (status = 403, description = "Candidate only")
    )
)]
#[axum::debug_handler]
pub async fn withdraw(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    payload: Option<ValidatedJson<WithdrawPayload>>,
) -> Result<impl IntoResponse> {
    let reason = payload.and_then(|ValidatedJson(p)| p.reason);
    let application = state
        .application_service
        .withdraw(id, &current, reason)
        .await?;
    Ok(ApiResponse::with_message(application, "Application withdrawn"))
}

#[utoipa::path(
    delete,
    path = "/api/applications/{id}",
    params(
        ("id" = Uuid, Path, description = "Application ID")
    ),
    responses(
        (status = 200, description = "Application hidden"),
        (status = 403, description = "Candidate or administrator only")
    )
)]
#[axum::debug_handler]
pub async fn delete_application(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse> {
    state.application_service.soft_delete(id, &current).await?;
    Ok(ApiResponse::message("Application deleted"))
}
