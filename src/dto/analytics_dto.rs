use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::dto::application_dto::StatusAggregate;
use crate::models::application::ApplicationStatus;
use crate::models::company::{CompanyStats, Industry};
use crate::models::user::UserType;
use crate::models::vacancy::VacancyStatus;

#[derive(Debug, Clone, Serialize)]
pub struct PlatformOverview {
    pub total_users: i64,
    pub total_companies: i64,
    pub total_vacancies: i64,
    pub total_applications: i64,
    pub active_vacancies: i64,
    pub recent_users: i64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UserTypeCount {
    pub user_type: UserType,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct IndustryCount {
    pub industry: Industry,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlatformAnalytics {
    pub overview: PlatformOverview,
    pub user_types: Vec<UserTypeCount>,
    pub company_industries: Vec<IndustryCount>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct VacancyStatusStats {
    pub status: VacancyStatus,
    pub count: i64,
    pub total_views: i64,
    pub total_applications: i64,
    pub avg_applications: f64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct DailyCount {
    pub day: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TopVacancy {
    pub id: Uuid,
    pub title: String,
    pub views: i64,
    pub applications: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmployerAnalytics {
    pub company_stats: CompanyStats,
    pub vacancy_stats: Vec<VacancyStatusStats>,
    pub application_trends: Vec<DailyCount>,
    pub top_vacancies: Vec<TopVacancy>,
    pub application_stats: Vec<StatusAggregate>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct StatusCount {
    pub status: ApplicationStatus,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CandidateAnalytics {
    pub application_stats: Vec<StatusCount>,
    pub total_applications: i64,
    pub success_rate: i64,
    pub industry_trends: Vec<IndustryCount>,
}

/// Share of applications that reached interview, offer or hire, as a rounded percent.
pub fn success_rate(stats: &[StatusCount]) -> i64 {
    let total: i64 = stats.iter().map(|s| s.count).sum();
    if total == 0 {
        return 0;
    }
    let successful: i64 = stats
        .iter()
        .filter(|s| s.status.is_success())
        .map(|s| s.count)
        .sum();
    ((successful as f64 / total as f64) * 100.0).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(status: ApplicationStatus, count: i64) -> StatusCount {
        StatusCount { status, count }
    }

    #[test]
    fn success_rate_counts_interview_offer_hired() {
        let stats = vec![
            count(ApplicationStatus::Applied, 4),
            count(ApplicationStatus::Interview, 1),
            count(ApplicationStatus::Offer, 1),
            count(ApplicationStatus::Rejected, 3),
        ];
        assert_eq!(success_rate(&stats), 22);
        assert_eq!(success_rate(&[]), 0);
        assert_eq!(success_rate(&[count(ApplicationStatus::Hired, 2)]), 100);
    }
}
