use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
};

use crate::{
    config::get_config,
    dto::{
        auth_dto::{AuthResponse, LoginPayload, RegisterPayload, UpdatePasswordPayload},
        envelope::ApiResponse,
    },
    error::Result,
    middleware::auth::{CurrentUser, TOKEN_COOKIE},
    models::user::User,
    utils::validation::ValidatedJson,
    AppState,
};

fn session_cookie(token: &str) -> String {
    let max_age = get_config().jwt_expires_in_hours.max(0) * 3600;
    format!(
        "{}={}; HttpOnly; Path=/; SameSite=Lax; Max-Age={}",
        TOKEN_COOKIE, token, max_age
    )
}

fn expired_cookie() -> String {
    format!("{}=; HttpOnly; Path=/; SameSite=Lax; Max-Age=0", TOKEN_COOKIE)
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterPayload,
    responses(
        (status = 201, description = "Account created, session cookie set", body = AuthResponse),
        (status = 400, description = "Invalid payload or email already registered")
    )
)]
#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterPayload>,
) -> Result<impl IntoResponse> {
    let auth: AuthResponse = state.auth_service.register(payload).await?;
    let cookie = session_cookie(&auth.token);
    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, cookie)],
        ApiResponse::with_message(auth, "Registration successful"),
    ))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Logged in, session cookie set", body = AuthResponse),
        (status = 401, description = "Invalid credentials or blocked account")
    )
)]
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginPayload>,
) -> Result<impl IntoResponse> {
    let auth: AuthResponse = state.auth_service.login(payload).await?;
    let cookie = session_cookie(&auth.token);
    Ok((
        [(header::SET_COOKIE, cookie)],
        ApiResponse::with_message(auth, "Login successful"),
    ))
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Session cookie cleared")
    )
)]
#[axum::debug_handler]
pub async fn logout() -> impl IntoResponse {
    (
        [(header::SET_COOKIE, expired_cookie())],
        ApiResponse::message("Logged out"),
    )
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "Not authenticated")
    )
)]
#[axum::debug_handler]
pub async fn me(State(state): State<AppState>, current: CurrentUser) -> Result<impl IntoResponse> {
    let user: User = state.user_service.find_by_id(current.id).await?;
    Ok(ApiResponse::ok(user))
}

#[utoipa::path(
    patch,
    path = "/api/auth/update-password",
    request_body = UpdatePasswordPayload,
    responses(
        (status = 200, description = "Password changed, fresh session cookie set", body = AuthResponse),
        (status = 400, description = "New password too short"),
        (status = 401, description = "Current password is incorrect")
    )
)]
#[axum::debug_handler]
pub async fn update_password(
    State(state): State<AppState>,
    current: CurrentUser,
    ValidatedJson(payload): ValidatedJson<UpdatePasswordPayload>,
) -> Result<impl IntoResponse> {
    let auth: AuthResponse = state
        .auth_service
        .update_password(current.id, payload)
        .await?;
    let cookie = session_cookie(&auth.token);
    Ok((
        [(header::SET_COOKIE, cookie)],
        ApiResponse::with_message(auth, "Password updated"),
    ))
}
