use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{
    error::{Error, Result},
    models::user::UserType,
    utils::token::verify_jwt,
    AppState,
};

pub const TOKEN_COOKIE: &str = "token";

/// Authenticated caller, resolved from the database on every request.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
    pub user_type: UserType,
    pub company_id: Option<Uuid>,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.user_type == UserType::Admin
    }

    pub fn require_role(&self, allowed: &[UserType]) -> Result<()> {
        if allowed.contains(&self.user_type) {
            Ok(())
        } else {
            Err(Error::Forbidden(
                "You do not have permission to perform this action".to_string(),
            ))
        }
    }

    pub fn require_company(&self) -> Result<Uuid> {
        self.company_id
            .ok_or_else(|| Error::BadRequest("Create a company profile first".to_string()))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(|| Error::Unauthorized("Authentication required".to_string()))
    }
}

/// Bearer header first, then the `token` cookie.
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
    {
        if let Some(token) = value.strip_prefix("Bearer ") {
            let token = token.trim();
            if !token.is_empty() {
                return Some(token.to_string());
            }
        }
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == TOKEN_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response> {
    let token = extract_token(req.headers())
        .ok_or_else(|| Error::Unauthorized("Authentication required".to_string()))?;

    let config = crate::config::get_config();
    let claims = verify_jwt(&token, &config.jwt_secret)?;
    let user_id = claims.user_id()?;

    let user = state
        .user_service
        .find_by_id(user_id)
        .await
        .map_err(|e| match e {
            Error::NotFound(_) => Error::Unauthorized("User no longer exists".to_string()),
            other => other,
        })?;
    if !user.is_active {
        tracing::warn!(user_id = %user.id, "blocked account attempted access");
        return Err(Error::Unauthorized("Account is blocked".to_string()));
    }

    req.extensions_mut().insert(CurrentUser {
        id: user.id,
        email: user.email,
        user_type: user.user_type,
        company_id: user.employer_company_id,
    });
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_header_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        headers.insert(header::COOKIE, HeaderValue::from_static("token=xyz"));
        assert_eq!(extract_token(&headers).as_deref(), Some("abc"));
    }

    #[test]
    fn cookie_token_is_found_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; token=xyz; lang=en"),
        );
        assert_eq!(extract_token(&headers).as_deref(), Some("xyz"));
    }

    #[test]
    fn missing_or_empty_tokens() {
        let mut headers = HeaderMap::new();
        assert!(extract_token(&headers).is_none());
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic Zm9v"));
        headers.insert(header::COOKIE, HeaderValue::from_static("token="));
        assert!(extract_token(&headers).is_none());
    }

    #[test]
    fn role_gate() {
        let user = CurrentUser {
            id: Uuid::new_v4(),
            email: "a@b.c".into(),
            user_type: UserType::Candidate,
            company_id: None,
        };
        assert!(user.require_role(&[UserType::Candidate]).is_ok());
        assert!(matches!(
            user.require_role(&[UserType::Employer, UserType::Admin]),
            Err(Error::Forbidden(_))
        ));
        assert!(user.require_company().is_err());
    }
}
