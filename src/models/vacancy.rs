use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

pub const DEFAULT_LIFETIME_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "experience_level")]
pub enum ExperienceLevel {
    #[sqlx(rename = "no experience")]
    #[serde(rename = "no experience")]
    NoExperience,
    #[sqlx(rename = "0-1 year")]
    #[serde(rename = "0-1 year")]
    UpToOneYear,
    #[sqlx(rename = "1-3 years")]
    #[serde(rename = "1-3 years")]
    OneToThreeYears,
    #[sqlx(rename = "3-5 years")]
    #[serde(rename = "3-5 years")]
    ThreeToFiveYears,
    #[sqlx(rename = "5+ years")]
    #[serde(rename = "5+ years")]
    FivePlusYears,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "education_level", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EducationLevel {
    None,
    Secondary,
    Bachelor,
    Master,
    Phd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "currency", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Rub,
    Usd,
    Eur,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "employment_type", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum EmploymentType {
    FullTime,
    PartTime,
    Contract,
    Freelance,
    Internship,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "work_schedule", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum WorkSchedule {
    Office,
    Remote,
    Hybrid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "vacancy_category", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum VacancyCategory {
    It,
    Marketing,
    Sales,
    Design,
    Finance,
    Hr,
    Management,
    Support,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "vacancy_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum VacancyStatus {
    Active,
    Paused,
    Closed,
    Draft,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoostKind {
    Highlight,
    Urgent,
    Feature,
}

impl BoostKind {
    /// Duration used when a paid service does not specify one.
    pub fn default_days(&self) -> i64 {
        match self {
            BoostKind::Highlight | BoostKind::Feature => 7,
            BoostKind::Urgent => 3,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VacancySettings {
    pub application_method: Option<String>,
    pub external_url: Option<String>,
    pub requires_resume: Option<bool>,
    pub requires_cover_letter: Option<bool>,
    pub auto_reply: Option<bool>,
    pub auto_reply_message: Option<String>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Vacancy {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub employer_id: Uuid,
    pub company_id: Uuid,
    pub description: String,
    pub experience: ExperienceLevel,
    pub skills: Vec<String>,
    pub education: Option<EducationLevel>,
    pub salary_min: Decimal,
    pub salary_max: Decimal,
    pub currency: Currency,
    pub salary_is_gross: bool,
    pub city: String,
    pub address: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub is_remote: bool,
    pub employment_type: EmploymentType,
    pub schedule: WorkSchedule,
    pub category: VacancyCategory,
    pub tags: Vec<String>,
    pub status: VacancyStatus,
    pub is_highlighted: bool,
    pub highlight_expires: Option<DateTime<Utc>>,
    pub is_urgent: bool,
    pub urgent_expires: Option<DateTime<Utc>>,
    pub is_featured: bool,
    pub feature_expires: Option<DateTime<Utc>>,
    pub views: i64,
    pub applications: i64,
    pub saves: i64,
    pub shares: i64,
    pub settings: Json<VacancySettings>,
    pub last_application_at: Option<DateTime<Utc>>,
    pub last_refreshed_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Vacancy {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }

    pub fn is_boosted(&self) -> bool {
        self.is_highlighted || self.is_urgent || self.is_featured
    }

    /// Only live postings take applications.
    pub fn accepts_applications(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.status == VacancyStatus::Active && !self.is_expired(now)
    }

    pub fn apply_boost(&mut self, kind: BoostKind, days: i64, now: DateTime<Utc>) -> DateTime<Utc> {
        let expires = now + Duration::days(days);
        match kind {
            BoostKind::Highlight => {
                self.is_highlighted = true;
                self.highlight_expires = Some(expires);
            }
            BoostKind::Urgent => {
                self.is_urgent = true;
                self.urgent_expires = Some(expires);
            }
            BoostKind::Feature => {
                self.is_featured = true;
                self.feature_expires = Some(expires);
            }
        }
        expires
    }

    /// Boost flags that are set and whose expiry is still in the future.
    pub fn active_boosts(&self, now: DateTime<Utc>) -> Vec<BoostKind> {
        let live = |flag: bool, expires: Option<DateTime<Utc>>| {
            flag && expires.map(|e| e > now).unwrap_or(false)
        };
        let mut boosts = Vec::new();
        if live(self.is_highlighted, self.highlight_expires) {
            boosts.push(BoostKind::Highlight);
        }
        if live(self.is_urgent, self.urgent_expires) {
            boosts.push(BoostKind::Urgent);
        }
        if live(self.is_featured, self.feature_expires) {
            boosts.push(BoostKind::Feature);
        }
        boosts
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_vacancy(now: DateTime<Utc>) -> Vacancy {
        Vacancy {
            id: Uuid::new_v4(),
            title: "Senior Rust Engineer".into(),
            slug: "senior-rust-engineer-123456".into(),
            employer_id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            description: "Build and operate backend services.".into(),
            experience: ExperienceLevel::ThreeToFiveYears,
            skills: vec!["rust".into()],
            education: None,
            salary_min: Decimal::new(200_000, 0),
            salary_max: Decimal::new(300_000, 0),
            currency: Currency::Rub,
            salary_is_gross: true,
            city: "Moscow".into(),
            address: None,
            lat: None,
            lng: None,
            is_remote: true,
            employment_type: EmploymentType::FullTime,
            schedule: WorkSchedule::Remote,
            category: VacancyCategory::It,
            tags: vec![],
            status: VacancyStatus::Active,
            is_highlighted: false,
            highlight_expires: None,
            is_urgent: false,
            urgent_expires: None,
            is_featured: false,
            feature_expires: None,
            views: 0,
            applications: 0,
            saves: 0,
            shares: 0,
            settings: Json(VacancySettings::default()),
            last_application_at: None,
            last_refreshed_at: now,
            expires_at: now + Duration::days(DEFAULT_LIFETIME_DAYS),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn boost_sets_flag_and_expiry() {
        let now = Utc::now();
        let mut v = sample_vacancy(now);
        let expires = v.apply_boost(BoostKind::Urgent, 5, now);
        assert!(v.is_urgent);
        assert_eq!(expires, now + Duration::days(5));
        assert_eq!(v.urgent_expires, Some(expires));
        assert!(!v.is_featured);
        assert!(v.is_boosted());
    }

    #[test]
    fn expired_boost_stays_flagged_but_is_not_live() {
        let now = Utc::now();
        let mut v = sample_vacancy(now);
        v.apply_boost(BoostKind::Feature, 1, now - Duration::days(3));
        v.apply_boost(BoostKind::Highlight, 7, now);
        assert!(v.is_featured);
        assert_eq!(v.active_boosts(now), vec![BoostKind::Highlight]);
    }

    #[test]
    fn only_active_unexpired_vacancies_accept_applications() {
        let now = Utc::now();
        let mut v = sample_vacancy(now);
        assert!(v.accepts_applications(now));

        v.status = VacancyStatus::Paused;
        assert!(!v.accepts_applications(now));

        v.status = VacancyStatus::Active;
        v.expires_at = now - Duration::seconds(1);
        assert!(v.is_expired(now));
        assert!(!v.accepts_applications(now));

        v.expires_at = now + Duration::days(1);
        v.is_active = false;
        assert!(!v.accepts_applications(now));
    }

    #[test]
    fn hyphenated_enums_use_wire_names() {
        assert_eq!(
            serde_json::to_value(EmploymentType::FullTime).unwrap(),
            "full-time"
        );
        assert_eq!(
            serde_json::from_value::<ExperienceLevel>("5+ years".into()).unwrap(),
            ExperienceLevel::FivePlusYears
        );
        assert_eq!(serde_json::to_value(Currency::Eur).unwrap(), "EUR");
    }
}
