use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::utils::slug::slugify;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "industry", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Industry {
    It,
    Finance,
    Healthcare,
    Education,
    Retail,
    Manufacturing,
    Transportation,
    Construction,
    Entertainment,
    Telecom,
    Energy,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "company_size")]
pub enum CompanySize {
    #[sqlx(rename = "1-10")]
    #[serde(rename = "1-10")]
    Micro,
    #[sqlx(rename = "11-50")]
    #[serde(rename = "11-50")]
    Small,
    #[sqlx(rename = "51-200")]
    #[serde(rename = "51-200")]
    Medium,
    #[sqlx(rename = "201-500")]
    #[serde(rename = "201-500")]
    Large,
    #[sqlx(rename = "501-1000")]
    #[serde(rename = "501-1000")]
    XLarge,
    #[sqlx(rename = "1000+")]
    #[serde(rename = "1000+")]
    Enterprise,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanyAddress {
    pub country: Option<String>,
    pub city: Option<String>,
    pub street: Option<String>,
    pub building: Option<String>,
    pub postal_code: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanyContact {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<CompanyAddress>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanySocial {
    pub linkedin: Option<String>,
    pub facebook: Option<String>,
    pub twitter: Option<String>,
    pub instagram: Option<String>,
    pub telegram: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanyCulture {
    pub values: Vec<String>,
    pub benefits: Vec<String>,
    pub work_environment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanySettings {
    pub allow_reviews: bool,
    pub show_salary: bool,
    pub auto_publish_vacancies: bool,
}

impl Default for CompanySettings {
    fn default() -> Self {
        Self {
            allow_reviews: true,
            show_salary: true,
            auto_publish_vacancies: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationDocument {
    #[serde(rename = "type")]
    pub doc_type: String,
    pub url: Option<String>,
    pub description: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}

/// Cached aggregate block; refreshed explicitly from vacancy/application data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyStats {
    pub total_vacancies: i32,
    pub active_vacancies: i32,
    pub total_views: i64,
    pub total_applications: i64,
    pub response_rate: f64,
    pub avg_response_time_secs: f64,
    pub refreshed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub logo: Option<String>,
    pub cover_image: Option<String>,
    pub industry: Industry,
    pub size: CompanySize,
    pub website: Option<String>,
    pub founded_year: Option<i32>,
    pub founded_month: Option<i32>,
    pub contact: Json<CompanyContact>,
    pub social: Json<CompanySocial>,
    pub culture: Json<CompanyCulture>,
    pub settings: Json<CompanySettings>,
    pub total_vacancies: i32,
    pub active_vacancies: i32,
    pub total_views: i64,
    pub total_applications: i64,
    pub response_rate: f64,
    pub avg_response_time_secs: f64,
    pub stats_refreshed_at: Option<DateTime<Utc>>,
    pub is_verified: bool,
    pub verified_at: Option<DateTime<Utc>>,
    pub verified_by: Option<Uuid>,
    pub verification_documents: Json<Vec<VerificationDocument>>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub is_active: bool,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Company {
    pub fn stats(&self) -> CompanyStats {
        CompanyStats {
            total_vacancies: self.total_vacancies,
            active_vacancies: self.active_vacancies,
            total_views: self.total_views,
            total_applications: self.total_applications,
            response_rate: self.response_rate,
            avg_response_time_secs: self.avg_response_time_secs,
            refreshed_at: self.stats_refreshed_at,
        }
    }
}

pub fn company_slug(name: &str) -> String {
    slugify(name)
}

pub fn default_meta_title(name: &str) -> String {
    format!("{} - Careers and vacancies", name)
}

pub fn default_meta_description(name: &str, description: &str) -> String {
    let excerpt: String = description.chars().take(150).collect();
    format!("Join the {} team. {}...", name, excerpt)
}

/// Response rate as a percentage of all applications that got any reaction.
pub fn response_rate(responded: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    (responded as f64 / total as f64 * 100.0 * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_drops_punctuation_and_collapses_dashes() {
        assert_eq!(company_slug("Acme & Sons -- Ltd."), "acme-sons-ltd");
        assert_eq!(company_slug("  Big   Data Co "), "big-data-co");
    }

    #[test]
    fn meta_defaults_are_derived_from_name() {
        assert_eq!(default_meta_title("Acme"), "Acme - Careers and vacancies");
        let long = "x".repeat(400);
        let meta = default_meta_description("Acme", &long);
        assert!(meta.starts_with("Join the Acme team. "));
        assert_eq!(meta.len(), "Join the Acme team. ".len() + 150 + 3);
    }

    #[test]
    fn response_rate_handles_empty_totals() {
        assert_eq!(response_rate(0, 0), 0.0);
        assert_eq!(response_rate(1, 3), 33.33);
        assert_eq!(response_rate(4, 4), 100.0);
    }

    #[test]
    fn company_size_uses_range_labels() {
        assert_eq!(serde_json::to_value(CompanySize::Enterprise).unwrap(), "1000+");
        assert_eq!(
            serde_json::from_value::<CompanySize>("11-50".into()).unwrap(),
            CompanySize::Small
        );
    }
}
