use tracing::{info, warn};

use crate::config::get_config;
use crate::dto::auth_dto::{AuthResponse, LoginPayload, RegisterPayload, UpdatePasswordPayload};
use crate::error::{Error, Result};
use crate::models::user::{User, UserType};
use crate::services::user_service::{NewUser, UserService};
use crate::utils::crypto::{hash_password, verify_password};
use crate::utils::token::issue_jwt;
use uuid::Uuid;

#[derive(Clone)]
pub struct AuthService {
    users: UserService,
}

impl AuthService {
    pub fn new(users: UserService) -> Self {
        Self { users }
    }

    pub async fn register(&self, payload: RegisterPayload) -> Result<AuthResponse> {
        let user_type = payload.user_type.unwrap_or(UserType::Candidate);
        if user_type == UserType::Admin {
            return Err(Error::BadRequest(
                "Account type must be candidate or employer".to_string(),
            ));
        }

        let email = payload.email.trim().to_lowercase();
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(Error::Conflict(
                "User with this email already exists".to_string(),
            ));
        }

        let password_hash = hash_password(&payload.password)?;

        let user = self
            .users
            .create(NewUser {
                email,
                password_hash,
                first_name: payload.first_name,
                last_name: payload.last_name,
                user_type,
            })
            .await?;

        self.respond(user)
    }

    pub async fn login(&self, payload: LoginPayload) -> Result<AuthResponse> {
        let invalid = || Error::Unauthorized("Invalid email or password".to_string());

        let user = self
            .users
            .find_by_email(&payload.email.trim().to_lowercase())
            .await?
            .ok_or_else(invalid)?;

        if !verify_password(&payload.password, &user.password_hash)? {
            warn!(user_id = %user.id, "failed login attempt");
            return Err(invalid());
        }
        if !user.is_active {
            return Err(Error::Unauthorized("Account is blocked".to_string()));
        }

        self.users.touch_last_active(user.id).await?;
        info!(user_id = %user.id, "user logged in");
        self.respond(user)
    }

    pub async fn update_password(
        &self,
        user_id: Uuid,
        payload: UpdatePasswordPayload,
    ) -> Result<AuthResponse> {
        let user = self.users.find_by_id(user_id).await?;
        if !verify_password(&payload.current_password, &user.password_hash)? {
            warn!(user_id = %user.id, "password change with wrong current password");
            return Err(Error::Unauthorized(
                "Current password is incorrect".to_string(),
            ));
        }

        let password_hash = hash_password(&payload.new_password)?;
        let user = self.users.set_password_hash(user.id, &password_hash).await?;
        info!(user_id = %user.id, "password changed");
        self.respond(user)
    }

    fn respond(&self, user: User) -> Result<AuthResponse> {
        let config = get_config();
        let token = issue_jwt(
            user.id,
            user.user_type,
            &config.jwt_secret,
            config.jwt_expires_in_hours,
        )?;
        Ok(AuthResponse { token, user })
    }
}
