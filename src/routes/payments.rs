use axum::{extract::State, http::StatusCode, response::IntoResponse};
use uuid::Uuid;

use crate::{
    dto::{
        envelope::ApiResponse,
        payment_dto::{
            HistoryQuery, RefundPayload, ServicesPayload, SubscriptionPayload,
            SubscriptionResponse,
        },
    },
    error::Result,
    middleware::auth::CurrentUser,
    models::{
        payment::{Payment, Receipt},
        user::UserType,
    },
    utils::validation::{ApiPath, ListQuery, ValidatedJson},
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/payments/subscription",
    request_body = SubscriptionPayload,
    responses(
        (status = 200, description = "Subscription paid and activated", body = SubscriptionResponse),
        (status = 400, description = "Unknown or free plan")
    )
)]
#[axum::debug_handler]
pub async fn subscribe(
    State(state): State<AppState>,
    current: CurrentUser,
    ValidatedJson(payload): ValidatedJson<SubscriptionPayload>,
) -> Result<impl IntoResponse> {
    let result: SubscriptionResponse = state
        .payment_service
        .subscribe(current.id, payload)
        .await?;
    Ok(ApiResponse::with_message(result, "Subscription activated"))
}

#[utoipa::path(
    post,
    path = "/api/payments/services",
    request_body = ServicesPayload,
    responses(
        (status = 201, description = "Services paid and applied", body = Payment),
        (status = 400, description = "Empty list or boost without a target"),
        (status = 403, description = "Boost target is not the caller's vacancy")
    )
)]
#[axum::debug_handler]
pub async fn purchase_services(
    State(state): State<AppState>,
    current: CurrentUser,
    ValidatedJson(payload): ValidatedJson<ServicesPayload>,
) -> Result<impl IntoResponse> {
    let payment: Payment = state
        .payment_service
        .purchase_services(current.id, payload)
        .await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message(payment, "Services purchased"),
    ))
}

#[utoipa::path(
    get,
    path = "/api/payments/history",
    params(
        ("limit" = Option<i64>, Query, description = "How many payments, default 10")
    ),
    responses(
        (status = 200, description = "The caller's payments, newest first")
    )
)]
#[axum::debug_handler]
pub async fn history(
    State(state): State<AppState>,
    current: CurrentUser,
    ListQuery(query): ListQuery<HistoryQuery>,
) -> Result<impl IntoResponse> {
    let payments = state.payment_service.history(current.id, query).await?;
    Ok(ApiResponse::ok(payments))
}

#[utoipa::path(
    get,
    path = "/api/payments/{id}/receipt",
    params(
        ("id" = Uuid, Path, description = "Payment ID")
    ),
    responses(
        (status = 200, description = "Printable receipt", body = Receipt),
        (status = 403, description = "Not the payer"),
        (status = 404, description = "Payment not found")
    )
)]
#[axum::debug_handler]
pub async fn receipt(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse> {
    let receipt: Receipt = state.payment_service.receipt(id, &current).await?;
    Ok(ApiResponse::ok(receipt))
}

#[utoipa::path(
    post,
    path = "/api/payments/{id}/refund",
    params(
        ("id" = Uuid, Path, description = "Payment ID")
    ),
    request_body = RefundPayload,
    responses(
        (status = 200, description = "Payment refunded", body = Payment),
        (status = 400, description = "Payment is not refundable"),
        (status = 403, description = "Administrators only")
    )
)]
#[axum::debug_handler]
pub async fn refund(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    payload: Option<ValidatedJson<RefundPayload>>,
) -> Result<impl IntoResponse> {
    current.require_role(&[UserType::Admin])?;
    let reason = payload.and_then(|ValidatedJson(p)| p.reason);
    let payment = state.payment_service.refund(id, reason).await?;
    Ok(ApiResponse::with_message(payment, "Payment refunded"))
}
