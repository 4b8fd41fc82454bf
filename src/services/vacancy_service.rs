use sqlx::types::Json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;
use validator::ValidationErrors;

use crate::dto::envelope::{PageParams, Paginated};
use crate::dto::vacancy_dto::{
    check_salary_range, BoostResponse, CreateVacancyPayload, MyVacanciesQuery,
    UpdateVacancyPayload, VacancySearchQuery,
};
use crate::error::{unique_violation, Error, Result};
use crate::middleware::auth::CurrentUser;
use crate::models::vacancy::{BoostKind, Currency, Vacancy, VacancyStatus, DEFAULT_LIFETIME_DAYS};
use crate::services::filters::{like_pattern, wire_name, Filters};
use crate::utils::{slug::vacancy_slug, time};

/// Effective boosts first; a flag whose expiry has passed ranks like no flag.
const RANKING: &str = "COALESCE(is_featured AND feature_expires > NOW(), FALSE) DESC, \
                       COALESCE(is_urgent AND urgent_expires > NOW(), FALSE) DESC, \
                       created_at DESC";

#[derive(Clone)]
pub struct VacancyService {
    pool: PgPool,
}

impl VacancyService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn search(&self, query: VacancySearchQuery) -> Result<Paginated<Vacancy>> {
        let page = PageParams::new(query.page, query.limit);

        let mut filters = Filters::new();
        filters
            .raw("is_active")
            .raw("status = 'active'")
            .raw("expires_at > NOW()");
        if let Some(search) = query.search.filter(|s| !s.trim().is_empty()) {
            filters.push(
                "to_tsvector('simple', title || ' ' || description || ' ' || array_to_string(tags, ' ')) \
                 @@ plainto_tsquery('simple', {})",
                search.trim(),
            );
        }
        if let Some(location) = query.location.filter(|s| !s.trim().is_empty()) {
            filters.push("city ILIKE {}", like_pattern(&location));
        }
        if let Some(category) = query.category {
            filters.push("category = {}::vacancy_category", wire_name(&category));
        }
        if let Some(experience) = query.experience {
            filters.push("experience = {}::experience_level", wire_name(&experience));
        }
        if let Some(min) = query.salary_min {
            filters.push("salary_min >= {}::numeric", min.to_string());
        }
        if let Some(max) = query.salary_max {
            filters.push("salary_max <= {}::numeric", max.to_string());
        }
        if let Some(employment_type) = query.employment_type {
            filters.push(
                "employment_type = {}::employment_type",
                wire_name(&employment_type),
            );
        }
        if let Some(is_remote) = query.is_remote {
            filters.push("is_remote = {}::boolean", is_remote.to_string());
        }

        self.paginate(&filters, RANKING, page).await
    }

    pub async fn mine(&self, employer_id: Uuid, query: MyVacanciesQuery) -> Result<Paginated<Vacancy>> {
        let page = PageParams::new(query.page, query.limit);

        let mut filters = Filters::new();
        filters
            .raw("is_active")
            .push("employer_id = {}::uuid", employer_id.to_string());
        if let Some(status) = query.status {
            filters.push("status = {}::vacancy_status", wire_name(&status));
        }

        self.paginate(&filters, "created_at DESC", page).await
    }

    async fn paginate(
        &self,
        filters: &Filters,
        order_by: &str,
        page: PageParams,
    ) -> Result<Paginated<Vacancy>> {
        let where_clause = filters.where_clause();
        let next = filters.next_index();

        let items_query = format!(
            "SELECT * FROM vacancies {} ORDER BY {} LIMIT ${} OFFSET ${}",
            where_clause,
            order_by,
            next,
            next + 1
        );
        let mut items_statement = sqlx::query_as::<_, Vacancy>(&items_query);
        for value in filters.args() {
            items_statement = items_statement.bind(value);
        }
        let items = items_statement
            .bind(page.limit)
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        let total_query = format!("SELECT COUNT(*) FROM vacancies {}", where_clause);
        let mut total_statement = sqlx::query_scalar::<_, i64>(&total_query);
        for value in filters.args() {
            total_statement = total_statement.bind(value);
        }
        let total = total_statement.fetch_one(&self.pool).await?;

        Ok(Paginated::new(items, page, total))
    }

    pub async fn find_active(&self, id: Uuid) -> Result<Vacancy> {
        sqlx::query_as::<_, Vacancy>("SELECT * FROM vacancies WHERE id = $1 AND is_active")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Vacancy not found".to_string()))
    }

    /// Public detail read; counts as a view.
    pub async fn get_public(&self, id: Uuid) -> Result<Vacancy> {
        sqlx::query_as::<_, Vacancy>(
            "UPDATE vacancies SET views = views + 1 WHERE id = $1 AND is_active RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Vacancy not found".to_string()))
    }

    pub async fn record_view(&self, id: Uuid) -> Result<i64> {
        sqlx::query_scalar::<_, i64>(
            "UPDATE vacancies SET views = views + 1 WHERE id = $1 AND is_active RETURNING views",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Vacancy not found".to_string()))
    }

    pub async fn create(
        &self,
        employer_id: Uuid,
        company_id: Uuid,
        payload: CreateVacancyPayload,
    ) -> Result<Vacancy> {
        let now = time::now();
        let status = payload.status.unwrap_or(VacancyStatus::Active);
        let title = payload.title.trim().to_string();

        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query_as::<_, Vacancy>(
            r#"
            INSERT INTO vacancies (
                title, slug, employer_id, company_id, description, experience, skills,
                education, salary_min, salary_max, currency, salary_is_gross,
                city, address, lat, lng, is_remote,
                employment_type, schedule, category, tags, status, settings,
                last_refreshed_at, expires_at
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7,
                $8, $9, $10, $11, $12,
                $13, $14, $15, $16, $17,
                $18, $19, $20, $21, $22, $23,
                $24, $25
            )
            RETURNING *
            "#,
        )
        .bind(&title)
        .bind(vacancy_slug(&title, now))
        .bind(employer_id)
        .bind(company_id)
        .bind(&payload.description)
        .bind(payload.experience)
        .bind(&payload.skills)
        .bind(payload.education)
        .bind(payload.salary.min)
        .bind(payload.salary.max)
        .bind(payload.salary.currency.unwrap_or(Currency::Rub))
        .bind(payload.salary.is_gross.unwrap_or(true))
        .bind(payload.location.city.trim())
        .bind(&payload.location.address)
        .bind(payload.location.lat)
        .bind(payload.location.lng)
        .bind(payload.location.is_remote.unwrap_or(false))
        .bind(payload.employment_type)
        .bind(payload.schedule)
        .bind(payload.category)
        .bind(&payload.tags)
        .bind(status)
        .bind(Json(payload.settings.unwrap_or_default()))
        .bind(now)
        .bind(now + chrono::Duration::days(DEFAULT_LIFETIME_DAYS))
        .fetch_one(&mut *tx)
        .await;

        let vacancy = inserted.map_err(slug_conflict)?;

        sqlx::query(
            r#"
            UPDATE companies
            SET total_vacancies = total_vacancies + 1,
                active_vacancies = active_vacancies + $2
            WHERE id = $1
            "#,
        )
        .bind(company_id)
        .bind(i32::from(status == VacancyStatus::Active))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        info!(vacancy_id = %vacancy.id, company_id = %company_id, "vacancy created");
        Ok(vacancy)
    }

    pub async fn update(
        &self,
        id: Uuid,
        caller: &CurrentUser,
        payload: UpdateVacancyPayload,
    ) -> Result<Vacancy> {
        let vacancy = self.find_active(id).await?;
        ensure_manager(&vacancy, caller)?;

        let salary_min = payload.salary.as_ref().map(|s| s.min).unwrap_or(vacancy.salary_min);
        let salary_max = payload.salary.as_ref().map(|s| s.max).unwrap_or(vacancy.salary_max);
        if let Err(err) = check_salary_range(salary_min, salary_max) {
            let mut errors = ValidationErrors::new();
            errors.add("salary", err);
            return Err(Error::Validation(errors));
        }

        let title = payload
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| *t != vacancy.title)
            .map(str::to_string);
        let slug = title.as_deref().map(|t| vacancy_slug(t, time::now()));
        let salary = payload.salary;
        let location = payload.location;

        let updated = sqlx::query_as::<_, Vacancy>(
            r#"
            UPDATE vacancies
            SET
                title = COALESCE($2, title),
                slug = COALESCE($3, slug),
                description = COALESCE($4, description),
                experience = COALESCE($5, experience),
                skills = COALESCE($6, skills),
                education = COALESCE($7, education),
                salary_min = $8,
                salary_max = $9,
                currency = COALESCE($10, currency),
                salary_is_gross = COALESCE($11, salary_is_gross),
                city = COALESCE($12, city),
                address = COALESCE($13, address),
                lat = COALESCE($14, lat),
                lng = COALESCE($15, lng),
                is_remote = COALESCE($16, is_remote),
                employment_type = COALESCE($17, employment_type),
                schedule = COALESCE($18, schedule),
                category = COALESCE($19, category),
                tags = COALESCE($20, tags),
                settings = COALESCE($21, settings),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(title)
        .bind(slug)
        .bind(payload.description)
        .bind(payload.experience)
        .bind(payload.skills)
        .bind(payload.education)
        .bind(salary_min)
        .bind(salary_max)
        .bind(salary.as_ref().and_then(|s| s.currency))
        .bind(salary.as_ref().and_then(|s| s.is_gross))
        .bind(location.as_ref().map(|l| l.city.trim().to_string()))
        .bind(location.as_ref().and_then(|l| l.address.clone()))
        .bind(location.as_ref().and_then(|l| l.lat))
        .bind(location.as_ref().and_then(|l| l.lng))
        .bind(location.as_ref().and_then(|l| l.is_remote))
        .bind(payload.employment_type)
        .bind(payload.schedule)
        .bind(payload.category)
        .bind(payload.tags)
        .bind(payload.settings.map(Json))
        .fetch_one(&self.pool)
        .await
        .map_err(slug_conflict)?;

        Ok(updated)
    }

    /// Soft delete: the row stays for applications that reference it.
    pub async fn delete(&self, id: Uuid, caller: &CurrentUser) -> Result<()> {
        let vacancy = self.find_active(id).await?;
        ensure_manager(&vacancy, caller)?;

        let mut tx = self.pool.begin().await?;
        sqlx::query(
            r#"
            UPDATE vacancies
            SET is_active = FALSE, status = 'closed', updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if vacancy.status == VacancyStatus::Active {
            adjust_active_count(&mut tx, vacancy.company_id, -1).await?;
        }
        tx.commit().await?;

        info!(vacancy_id = %id, user_id = %caller.id, "vacancy deleted");
        Ok(())
    }

    pub async fn set_status(
        &self,
        id: Uuid,
        caller: &CurrentUser,
        status: VacancyStatus,
    ) -> Result<Vacancy> {
        let vacancy = self.find_active(id).await?;
        ensure_manager(&vacancy, caller)?;

        let mut tx = self.pool.begin().await?;
        let updated = sqlx::query_as::<_, Vacancy>(
            "UPDATE vacancies SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_one(&mut *tx)
        .await?;

        let was_active = vacancy.status == VacancyStatus::Active;
        let is_active = status == VacancyStatus::Active;
        if was_active != is_active {
            let delta = if is_active { 1 } else { -1 };
            adjust_active_count(&mut tx, vacancy.company_id, delta).await?;
        }
        tx.commit().await?;

        Ok(updated)
    }

    /// Vacancy that exists and belongs to `employer_id`.
    pub async fn owned_by(&self, id: Uuid, employer_id: Uuid) -> Result<Vacancy> {
        let vacancy = self.find_active(id).await?;
        if vacancy.employer_id != employer_id {
            return Err(Error::Forbidden(
                "You can only manage your own vacancies".to_string(),
            ));
        }
        Ok(vacancy)
    }

    pub async fn boost(
        &self,
        id: Uuid,
        employer_id: Uuid,
        kind: BoostKind,
        days: i64,
    ) -> Result<BoostResponse> {
        let mut vacancy = self.owned_by(id, employer_id).await?;
        let expires_at = vacancy.apply_boost(kind, days, time::now());

        sqlx::query(
            r#"
            UPDATE vacancies
            SET
                is_highlighted = $2, highlight_expires = $3,
                is_urgent = $4, urgent_expires = $5,
                is_featured = $6, feature_expires = $7,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(vacancy.is_highlighted)
        .bind(vacancy.highlight_expires)
        .bind(vacancy.is_urgent)
        .bind(vacancy.urgent_expires)
        .bind(vacancy.is_featured)
        .bind(vacancy.feature_expires)
        .execute(&self.pool)
        .await?;

        info!(vacancy_id = %id, boost = ?kind, days, "vacancy boosted");
        Ok(BoostResponse { kind, expires_at })
    }

    pub async fn refresh(&self, id: Uuid, employer_id: Uuid) -> Result<Vacancy> {
        self.owned_by(id, employer_id).await?;
        let vacancy = sqlx::query_as::<_, Vacancy>(
            r#"
            UPDATE vacancies
            SET last_refreshed_at = NOW(), updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(vacancy)
    }

    /// Drops boost flags whose expiry has passed. Returns the number of rows touched.
    pub async fn clear_expired_boosts(&self) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE vacancies
            SET
                is_highlighted = is_highlighted AND COALESCE(highlight_expires > NOW(), FALSE),
                is_urgent = is_urgent AND COALESCE(urgent_expires > NOW(), FALSE),
                is_featured = is_featured AND COALESCE(feature_expires > NOW(), FALSE)
            WHERE (is_highlighted AND COALESCE(highlight_expires <= NOW(), TRUE))
               OR (is_urgent AND COALESCE(urgent_expires <= NOW(), TRUE))
               OR (is_featured AND COALESCE(feature_expires <= NOW(), TRUE))
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}

/// Unique violations on insert or rename come from the clock-suffixed slug.
pub fn slug_conflict(err: sqlx::Error) -> Error {
    if unique_violation(&err).is_some() {
        Error::Conflict("A vacancy with this title was just created, try again".to_string())
    } else {
        err.into()
    }
}

fn ensure_manager(vacancy: &Vacancy, caller: &CurrentUser) -> Result<()> {
    if vacancy.employer_id == caller.id || caller.is_admin() {
        Ok(())
    } else {
        Err(Error::Forbidden(
            "You can only manage your own vacancies".to_string(),
        ))
    }
}

async fn adjust_active_count(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    company_id: Uuid,
    delta: i32,
) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE companies
        SET active_vacancies = GREATEST(active_vacancies + $2, 0)
        WHERE id = $1
        "#,
    )
    .bind(company_id)
    .bind(delta)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_conflict_passes_other_errors_through() {
        assert!(matches!(
            slug_conflict(sqlx::Error::RowNotFound),
            Error::NotFound(_)
        ));
        assert!(matches!(
            slug_conflict(sqlx::Error::PoolTimedOut),
            Error::Database(_)
        ));
    }
}
