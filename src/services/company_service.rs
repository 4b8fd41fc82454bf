use sqlx::types::Json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::dto::company_dto::{
    CompanyDetailResponse, CompanyListQuery, CreateCompanyPayload, DocumentsPayload,
    UpdateCompanyPayload,
};
use crate::dto::envelope::{PageParams, Paginated};
use crate::error::{unique_violation, Error, Result};
use crate::middleware::auth::CurrentUser;
use crate::models::company::{
    company_slug, default_meta_description, default_meta_title, response_rate, Company,
    CompanyStats, VerificationDocument,
};
use crate::models::vacancy::Vacancy;
use crate::services::filters::{like_pattern, wire_name, Filters};
use crate::utils::time;

const DUPLICATE_NAME: &str = "Company with this name already exists";

#[derive(Clone)]
pub struct CompanyService {
    pool: PgPool,
}

impl CompanyService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, query: CompanyListQuery) -> Result<Paginated<Company>> {
        let page = PageParams::new(query.page, query.limit);

        let mut filters = Filters::new();
        filters.raw("is_active");
        if let Some(industry) = query.industry {
            filters.push("industry = {}::industry", wire_name(&industry));
        }
        if let Some(size) = query.size {
            filters.push("size = {}::company_size", wire_name(&size));
        }
        if let Some(location) = query.location.filter(|s| !s.trim().is_empty()) {
            filters.push(
                "(contact -> 'address' ->> 'city') ILIKE {}",
                like_pattern(&location),
            );
        }
        if let Some(verified) = query.verified {
            filters.push("is_verified = {}::boolean", verified.to_string());
        }
        if let Some(search) = query.search.filter(|s| !s.trim().is_empty()) {
            filters.push(
                "to_tsvector('simple', name || ' ' || description) @@ plainto_tsquery('simple', {})",
                search.trim(),
            );
        }
        let where_clause = filters.where_clause();
        let next = filters.next_index();

        let items_query = format!(
            "SELECT * FROM companies {} \
             ORDER BY is_verified DESC, total_vacancies DESC, created_at DESC \
             LIMIT ${} OFFSET ${}",
            where_clause,
            next,
            next + 1
        );
        let mut items_statement = sqlx::query_as::<_, Company>(&items_query);
        for value in filters.args() {
            items_statement = items_statement.bind(value);
        }
        let items = items_statement
            .bind(page.limit)
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        let total_query = format!("SELECT COUNT(*) FROM companies {}", where_clause);
        let mut total_statement = sqlx::query_scalar::<_, i64>(&total_query);
        for value in filters.args() {
            total_statement = total_statement.bind(value);
        }
        let total = total_statement.fetch_one(&self.pool).await?;

        Ok(Paginated::new(items, page, total))
    }

    pub async fn find_active(&self, id: Uuid) -> Result<Company> {
        sqlx::query_as::<_, Company>("SELECT * FROM companies WHERE id = $1 AND is_active")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Company not found".to_string()))
    }

    /// Counts the visit and returns the company with its live vacancies.
    pub async fn get_public(&self, id: Uuid) -> Result<CompanyDetailResponse> {
        let company = sqlx::query_as::<_, Company>(
            r#"
            UPDATE companies
            SET total_views = total_views + 1
            WHERE id = $1 AND is_active
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Company not found".to_string()))?;

        let vacancies = sqlx::query_as::<_, Vacancy>(
            r#"
            SELECT * FROM vacancies
            WHERE company_id = $1 AND is_active AND status = 'active' AND expires_at > NOW()
            ORDER BY created_at DESC
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(CompanyDetailResponse { company, vacancies })
    }

    pub async fn mine(&self, user_id: Uuid) -> Result<Vec<Company>> {
        let companies = sqlx::query_as::<_, Company>(
            "SELECT * FROM companies WHERE created_by = $1 AND is_active ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(companies)
    }

    pub async fn create(&self, user_id: Uuid, payload: CreateCompanyPayload) -> Result<Company> {
        let existing: Option<Uuid> = sqlx::query_scalar(
            "SELECT id FROM companies WHERE created_by = $1 AND is_active LIMIT 1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        if existing.is_some() {
            return Err(Error::BadRequest(
                "You already have a company profile".to_string(),
            ));
        }

        let name = payload.name.trim().to_string();
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query_as::<_, Company>(
            r#"
            INSERT INTO companies (
                name, slug, description, logo, cover_image, industry, size, website,
                founded_year, founded_month, contact, social, culture, settings,
                meta_title, meta_description, created_by
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8,
                $9, $10, $11, $12, $13, $14,
                $15, $16, $17
            )
            RETURNING *
            "#,
        )
        .bind(&name)
        .bind(company_slug(&name))
        .bind(&payload.description)
        .bind(&payload.logo)
        .bind(&payload.cover_image)
        .bind(payload.industry)
        .bind(payload.size)
        .bind(&payload.website)
        .bind(payload.founded_year)
        .bind(payload.founded_month)
        .bind(Json(payload.contact.unwrap_or_default()))
        .bind(Json(payload.social.unwrap_or_default()))
        .bind(Json(payload.culture.unwrap_or_default()))
        .bind(Json(payload.settings.unwrap_or_default()))
        .bind(default_meta_title(&name))
        .bind(default_meta_description(&name, &payload.description))
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await;

        let company = match inserted {
            Ok(company) => company,
            Err(e) if unique_violation(&e).is_some() => {
                return Err(Error::Conflict(DUPLICATE_NAME.to_string()))
            }
            Err(e) => return Err(e.into()),
        };

        sqlx::query("UPDATE users SET employer_company_id = $2, updated_at = NOW() WHERE id = $1")
            .bind(user_id)
            .bind(company.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        info!(company_id = %company.id, user_id = %user_id, "company created");
        Ok(company)
    }

    pub async fn update(
        &self,
        id: Uuid,
        caller: &CurrentUser,
        payload: UpdateCompanyPayload,
    ) -> Result<Company> {
        let company = self.find_active(id).await?;
        ensure_manager(&company, caller)?;

        let renamed = payload
            .name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.eq_ignore_ascii_case(&company.name))
            .map(str::to_string);

        let (slug, meta_title, meta_description) = match &renamed {
            Some(name) => {
                let description = payload.description.as_deref().unwrap_or(&company.description);
                (
                    Some(company_slug(name)),
                    Some(default_meta_title(name)),
                    Some(default_meta_description(name, description)),
                )
            }
            None => (None, None, None),
        };

        let result = sqlx::query_as::<_, Company>(
            r#"
            UPDATE companies
            SET
                name = COALESCE($2, name),
                slug = COALESCE($3, slug),
                description = COALESCE($4, description),
                logo = COALESCE($5, logo),
                cover_image = COALESCE($6, cover_image),
                industry = COALESCE($7, industry),
                size = COALESCE($8, size),
                website = COALESCE($9, website),
                founded_year = COALESCE($10, founded_year),
                founded_month = COALESCE($11, founded_month),
                contact = COALESCE($12, contact),
                social = COALESCE($13, social),
                culture = COALESCE($14, culture),
                settings = COALESCE($15, settings),
                meta_title = COALESCE($16, meta_title),
                meta_description = COALESCE($17, meta_description),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(renamed.or(payload.name.map(|n| n.trim().to_string())))
        .bind(slug)
        .bind(payload.description)
        .bind(payload.logo)
        .bind(payload.cover_image)
        .bind(payload.industry)
        .bind(payload.size)
        .bind(payload.website)
        .bind(payload.founded_year)
        .bind(payload.founded_month)
        .bind(payload.contact.map(Json))
        .bind(payload.social.map(Json))
        .bind(payload.culture.map(Json))
        .bind(payload.settings.map(Json))
        .bind(meta_title)
        .bind(meta_description)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(company) => Ok(company),
            Err(e) if unique_violation(&e).is_some() => {
                Err(Error::Conflict(DUPLICATE_NAME.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn verify(&self, id: Uuid, admin_id: Uuid, is_verified: bool) -> Result<Company> {
        let company = sqlx::query_as::<_, Company>(
            r#"
            UPDATE companies
            SET
                is_verified = $2,
                verified_at = CASE WHEN $2 THEN NOW() ELSE NULL END,
                verified_by = CASE WHEN $2 THEN $3 ELSE NULL END,
                updated_at = NOW()
            WHERE id = $1 AND is_active
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(is_verified)
        .bind(admin_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Company not found".to_string()))?;
        info!(company_id = %id, is_verified, "company verification changed");
        Ok(company)
    }

    pub async fn add_documents(
        &self,
        id: Uuid,
        caller: &CurrentUser,
        payload: DocumentsPayload,
    ) -> Result<Company> {
        let company = self.find_active(id).await?;
        ensure_manager(&company, caller)?;

        let now = time::now();
        let mut documents = company.verification_documents.0;
        documents.extend(payload.documents.into_iter().map(|d| VerificationDocument {
            doc_type: d.doc_type,
            url: d.url,
            description: d.description,
            uploaded_at: now,
        }));

        let company = sqlx::query_as::<_, Company>(
            r#"
            UPDATE companies
            SET verification_documents = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(Json(documents))
        .fetch_one(&self.pool)
        .await?;
        Ok(company)
    }

    /// Recomputes the cached stats block from vacancies and applications.
    pub async fn refresh_stats(&self, id: Uuid, caller: &CurrentUser) -> Result<CompanyStats> {
        let company = self.find_active(id).await?;
        ensure_manager(&company, caller)?;

        let (total_vacancies, active_vacancies): (i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*),
                COUNT(*) FILTER (WHERE is_active AND status = 'active')
            FROM vacancies
            WHERE company_id = $1
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        let (total_applications, responded, avg_response): (i64, i64, Option<f64>) =
            sqlx::query_as(
                r#"
                SELECT
                    COUNT(*),
                    COUNT(*) FILTER (WHERE status <> 'applied'),
                    (AVG(EXTRACT(EPOCH FROM (responded_at - applied_at)))
                        FILTER (WHERE responded_at IS NOT NULL))::FLOAT8
                FROM applications
                WHERE company_id = $1 AND is_active
                "#,
            )
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        let company = sqlx::query_as::<_, Company>(
            r#"
            UPDATE companies
            SET
                total_vacancies = $2,
                active_vacancies = $3,
                total_applications = $4,
                response_rate = $5,
                avg_response_time_secs = $6,
                stats_refreshed_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(clamp_i32(total_vacancies))
        .bind(clamp_i32(active_vacancies))
        .bind(total_applications)
        .bind(response_rate(responded, total_applications))
        .bind(avg_response.unwrap_or(0.0))
        .fetch_one(&self.pool)
        .await?;

        Ok(company.stats())
    }
}

fn ensure_manager(company: &Company, caller: &CurrentUser) -> Result<()> {
    if company.created_by == caller.id || caller.is_admin() {
        Ok(())
    } else {
        Err(Error::Forbidden(
            "Only the company owner can manage this company".to_string(),
        ))
    }
}

fn clamp_i32(value: i64) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}
