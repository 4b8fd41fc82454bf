use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::dto::envelope::{PageParams, Paginated};
use crate::dto::user_dto::{
    SkillsResponse, UpdateCandidateProfilePayload, UpdateProfilePayload, UserListQuery,
    UserStatsResponse,
};
use crate::error::{unique_violation, Error, Result};
use crate::models::company::Company;
use crate::models::user::{Resume, SubscriptionPlan, User, UserType};
use crate::services::filters::{like_pattern, wire_name, Filters};
use crate::utils::time;

#[derive(Clone)]
pub struct UserService {
    pool: PgPool,
}

pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub user_type: UserType,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<User> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("User not found".to_string()))
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(email) = LOWER($1)")
            .bind(email.trim())
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn create(&self, new: NewUser) -> Result<User> {
        let result = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash, first_name, last_name, user_type)
            VALUES (LOWER($1), $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(new.email.trim())
        .bind(&new.password_hash)
        .bind(new.first_name.trim())
        .bind(new.last_name.trim())
        .bind(new.user_type)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(user) => {
                info!(user_id = %user.id, user_type = user.user_type.as_str(), "user registered");
                Ok(user)
            }
            Err(e) if unique_violation(&e).is_some() => Err(Error::Conflict(
                "User with this email already exists".to_string(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn touch_last_active(&self, id: Uuid) -> Result<()> {
        sqlx::query("UPDATE users SET last_active_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn set_password_hash(&self, id: Uuid, password_hash: &str) -> Result<User> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(password_hash)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("User not found".to_string()))
    }

    pub async fn update_profile(&self, id: Uuid, payload: UpdateProfilePayload) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET
                first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                phone = COALESCE($4, phone),
                avatar = COALESCE($5, avatar),
                bio = COALESCE($6, bio),
                city = COALESCE($7, city),
                country = COALESCE($8, country),
                preferences = COALESCE($9, preferences),
                last_active_at = NOW(),
                updated_at = NOW()
            WHERE id = $1 AND is_active
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(payload.first_name)
        .bind(payload.last_name)
        .bind(payload.phone)
        .bind(payload.avatar)
        .bind(payload.bio)
        .bind(payload.city)
        .bind(payload.country)
        .bind(payload.preferences.map(Json))
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("User not found".to_string()))?;
        Ok(user)
    }

    pub async fn update_candidate_profile(
        &self,
        id: Uuid,
        payload: UpdateCandidateProfilePayload,
    ) -> Result<User> {
        let user = self.find_by_id(id).await?;
        let mut profile = user.candidate_profile.0;
        if let Some(profession) = payload.profession {
            profile.profession = Some(profession);
        }
        if let Some(experience) = payload.experience {
            profile.experience = Some(experience);
        }
        if let Some(education) = payload.education {
            profile.education = education;
        }
        if let Some(salary) = payload.expected_salary {
            profile.expected_salary = Some(salary);
        }
        if let Some(prefs) = payload.work_preferences {
            profile.work_preferences = Some(prefs);
        }
        self.save_profile(id, profile).await
    }

    pub async fn add_skills(&self, id: Uuid, skills: Vec<String>) -> Result<SkillsResponse> {
        let user = self.find_by_id(id).await?;
        let mut profile = user.candidate_profile.0;
        let added = profile.add_skills(skills);
        let user = self.save_profile(id, profile).await?;
        Ok(SkillsResponse {
            skills: user.candidate_profile.0.skills,
            added,
        })
    }

    pub async fn remove_skill(&self, id: Uuid, skill: &str) -> Result<Vec<String>> {
        let user = self.find_by_id(id).await?;
        let mut profile = user.candidate_profile.0;
        if !profile.remove_skill(skill) {
            return Ok(profile.skills);
        }
        let user = self.save_profile(id, profile).await?;
        Ok(user.candidate_profile.0.skills)
    }

    pub async fn update_resume(
        &self,
        id: Uuid,
        text: Option<String>,
        file: Option<String>,
    ) -> Result<Resume> {
        let user = self.find_by_id(id).await?;
        let mut profile = user.candidate_profile.0;
        profile.update_resume(text, file, time::now());
        let user = self.save_profile(id, profile).await?;
        user.candidate_profile
            .0
            .resume
            .ok_or_else(|| Error::Internal("resume missing after update".to_string()))
    }

    async fn save_profile(
        &self,
        id: Uuid,
        profile: crate::models::user::CandidateProfile,
    ) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET candidate_profile = $2, last_active_at = NOW(), updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(Json(profile))
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn list(&self, query: UserListQuery) -> Result<Paginated<User>> {
        let page = PageParams::new(query.page, query.limit);

        let mut filters = Filters::new();
        if let Some(user_type) = query.user_type {
            filters.push("user_type = {}::user_type", wire_name(&user_type));
        }
        if let Some(is_active) = query.is_active {
            filters.push("is_active = {}::boolean", is_active.to_string());
        }
        if let Some(search) = query.search.filter(|s| !s.trim().is_empty()) {
            filters.push(
                "(first_name ILIKE {} OR last_name ILIKE {} OR email ILIKE {})",
                like_pattern(&search),
            );
        }
        let where_clause = filters.where_clause();
        let next = filters.next_index();

        let items_query = format!(
            "SELECT * FROM users {} ORDER BY created_at DESC LIMIT ${} OFFSET ${}",
            where_clause,
            next,
            next + 1
        );
        let mut items_statement = sqlx::query_as::<_, User>(&items_query);
        for value in filters.args() {
            items_statement = items_statement.bind(value);
        }
        let items = items_statement
            .bind(page.limit)
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        let total_query = format!("SELECT COUNT(*) FROM users {}", where_clause);
        let mut total_statement = sqlx::query_scalar::<_, i64>(&total_query);
        for value in filters.args() {
            total_statement = total_statement.bind(value);
        }
        let total = total_statement.fetch_one(&self.pool).await?;

        Ok(Paginated::new(items, page, total))
    }

    pub async fn set_active(&self, id: Uuid, is_active: bool) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            "UPDATE users SET is_active = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(is_active)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("User not found".to_string()))?;
        info!(user_id = %id, is_active, "user status changed");
        Ok(user)
    }

    pub async fn stats(&self, id: Uuid) -> Result<UserStatsResponse> {
        let user = self.find_by_id(id).await?;
        let mut stats = UserStatsResponse {
            applications_count: user.applications_count,
            views_count: user.views_count,
            last_active_at: user.last_active_at,
            applications_by_status: None,
            total_applications: None,
            company_stats: None,
        };

        match user.user_type {
            UserType::Candidate => {
                let rows: Vec<(String, i64)> = sqlx::query_as(
                    r#"
                    SELECT status::text, COUNT(*)
                    FROM applications
                    WHERE candidate_id = $1
                    GROUP BY status
                    "#,
                )
                .bind(id)
                .fetch_all(&self.pool)
                .await?;
                let by_status: BTreeMap<String, i64> = rows.into_iter().collect();
                stats.total_applications = Some(by_status.values().sum());
                stats.applications_by_status = Some(by_status);
            }
            UserType::Employer => {
                if let Some(company_id) = user.employer_company_id {
                    let company = sqlx::query_as::<_, Company>(
                        "SELECT * FROM companies WHERE id = $1",
                    )
                    .bind(company_id)
                    .fetch_optional(&self.pool)
                    .await?;
                    stats.company_stats = company.map(|c| c.stats());
                }
            }
            UserType::Admin => {}
        }
        Ok(stats)
    }

    /// Soft delete; the email is released for re-registration.
    pub async fn delete_account(&self, id: Uuid) -> Result<()> {
        let released = deleted_email(time::now());
        let result = sqlx::query(
            "UPDATE users SET is_active = FALSE, email = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(&released)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound("User not found".to_string()));
        }
        info!(user_id = %id, "account deleted");
        Ok(())
    }

    pub async fn activate_subscription(
        &self,
        id: Uuid,
        plan: SubscriptionPlan,
        expires_at: DateTime<Utc>,
        features: &[String],
        auto_renew: bool,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET subscription_plan = $2,
                subscription_expires_at = $3,
                subscription_features = $4,
                subscription_active = TRUE,
                subscription_auto_renew = $5,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(plan)
        .bind(expires_at)
        .bind(features)
        .bind(auto_renew)
        .execute(&self.pool)
        .await?;
        info!(user_id = %id, plan = plan.as_str(), "subscription activated");
        Ok(())
    }
}

pub fn deleted_email(now: DateTime<Utc>) -> String {
    format!("deleted_{}@deleted.local", now.timestamp_millis())
}
