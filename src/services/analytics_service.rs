use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::analytics_dto::{
    success_rate, CandidateAnalytics, DailyCount, EmployerAnalytics, IndustryCount,
    PlatformAnalytics, PlatformOverview, StatusCount, TopVacancy, UserTypeCount,
    VacancyStatusStats,
};
use crate::dto::application_dto::StatusAggregate;
use crate::dto::payment_dto::{RevenueQuery, RevenueRow};
use crate::error::{Error, Result};
use crate::models::company::Company;
use crate::services::application_service::STATUS_AGGREGATES;
use crate::utils::time;

const TREND_DAYS: i64 = 30;
const RECENT_USER_DAYS: i64 = 30;
const REVENUE_DEFAULT_DAYS: i64 = 365;

#[derive(Clone)]
pub struct AnalyticsService {
    pool: PgPool,
}

impl AnalyticsService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn platform(&self) -> Result<PlatformAnalytics> {
        let (
            total_users,
            total_companies,
            total_vacancies,
            total_applications,
            active_vacancies,
            recent_users,
        ): (i64, i64, i64, i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM users),
                (SELECT COUNT(*) FROM companies WHERE is_active),
                (SELECT COUNT(*) FROM vacancies),
                (SELECT COUNT(*) FROM applications),
                (SELECT COUNT(*) FROM vacancies
                    WHERE is_active AND status = 'active' AND expires_at > NOW()),
                (SELECT COUNT(*) FROM users WHERE created_at >= $1)
            "#,
        )
        .bind(time::days_ago(RECENT_USER_DAYS))
        .fetch_one(&self.pool)
        .await?;

        let user_types = sqlx::query_as::<_, UserTypeCount>(
            r#"
            SELECT user_type, COUNT(*) AS count
            FROM users
            GROUP BY user_type
            ORDER BY count DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let company_industries = sqlx::query_as::<_, IndustryCount>(
            r#"
            SELECT industry, COUNT(*) AS count
            FROM companies
            WHERE is_active
            GROUP BY industry
            ORDER BY count DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(PlatformAnalytics {
            overview: PlatformOverview {
                total_users,
                total_companies,
                total_vacancies,
                total_applications,
                active_vacancies,
                recent_users,
            },
            user_types,
            company_industries,
        })
    }

    pub async fn employer(&self, company_id: Uuid) -> Result<EmployerAnalytics> {
        let company = sqlx::query_as::<_, Company>("SELECT * FROM companies WHERE id = $1")
            .bind(company_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Company not found".to_string()))?;

        let vacancy_stats = sqlx::query_as::<_, VacancyStatusStats>(
            r#"
            SELECT
                status,
                COUNT(*) AS count,
                COALESCE(SUM(views), 0)::BIGINT AS total_views,
                COALESCE(SUM(applications), 0)::BIGINT AS total_applications,
                COALESCE(AVG(applications), 0)::FLOAT8 AS avg_applications
            FROM vacancies
            WHERE company_id = $1 AND is_active
            GROUP BY status
            ORDER BY status
            "#,
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;

        let application_trends = sqlx::query_as::<_, DailyCount>(
            r#"
            SELECT to_char(date_trunc('day', applied_at), 'YYYY-MM-DD') AS day, COUNT(*) AS count
            FROM applications
            WHERE company_id = $1 AND applied_at >= $2
            GROUP BY 1
            ORDER BY 1
            "#,
        )
        .bind(company_id)
        .bind(time::days_ago(TREND_DAYS))
        .fetch_all(&self.pool)
        .await?;

        let top_vacancies = sqlx::query_as::<_, TopVacancy>(
            r#"
            SELECT id, title, views, applications, created_at
            FROM vacancies
            WHERE company_id = $1 AND is_active
            ORDER BY views DESC, created_at DESC
            LIMIT 5
            "#,
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;

        let application_stats = sqlx::query_as::<_, StatusAggregate>(STATUS_AGGREGATES)
            .bind(company_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(EmployerAnalytics {
            company_stats: company.stats(),
            vacancy_stats,
            application_trends,
            top_vacancies,
            application_stats,
        })
    }

    pub async fn candidate(&self, candidate_id: Uuid) -> Result<CandidateAnalytics> {
        let application_stats = sqlx::query_as::<_, StatusCount>(
            r#"
            SELECT status, COUNT(*) AS count
            FROM applications
            WHERE candidate_id = $1 AND is_active
            GROUP BY status
            ORDER BY status
            "#,
        )
        .bind(candidate_id)
        .fetch_all(&self.pool)
        .await?;

        let industry_trends = sqlx::query_as::<_, IndustryCount>(
            r#"
            SELECT c.industry, COUNT(*) AS count
            FROM applications a
            JOIN companies c ON c.id = a.company_id
            WHERE a.candidate_id = $1 AND a.is_active
            GROUP BY c.industry
            ORDER BY count DESC
            LIMIT 5
            "#,
        )
        .bind(candidate_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(CandidateAnalytics {
            total_applications: application_stats.iter().map(|s| s.count).sum(),
            success_rate: success_rate(&application_stats),
            application_stats,
            industry_trends,
        })
    }

    pub async fn revenue(&self, query: RevenueQuery) -> Result<Vec<RevenueRow>> {
        let from = query
            .from
            .map(time::start_of_day)
            .unwrap_or_else(|| time::days_ago(REVENUE_DEFAULT_DAYS));
        let to = query.to.map(time::end_of_day).unwrap_or_else(time::now);
        if to < from {
            return Err(Error::BadRequest(
                "`to` must not be earlier than `from`".to_string(),
            ));
        }

        let rows = sqlx::query_as::<_, RevenueRow>(
            r#"
            SELECT
                EXTRACT(YEAR FROM created_at)::INT AS year,
                EXTRACT(MONTH FROM created_at)::INT AS month,
                payment_type,
                COALESCE(SUM(amount_total), 0)::BIGINT AS total_amount,
                COUNT(*) AS count
            FROM payments
            WHERE status = 'completed' AND created_at BETWEEN $1 AND $2
            GROUP BY 1, 2, payment_type
            ORDER BY 1 DESC, 2 DESC, payment_type
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
