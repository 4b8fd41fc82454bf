use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::vacancy::{Currency, EmploymentType, ExperienceLevel, WorkSchedule};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum UserType {
    Candidate,
    Employer,
    Admin,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Candidate => "candidate",
            UserType::Employer => "employer",
            UserType::Admin => "admin",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "candidate" => Some(UserType::Candidate),
            "employer" => Some(UserType::Employer),
            "admin" => Some(UserType::Admin),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "subscription_plan", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionPlan {
    Free,
    Basic,
    Standard,
    Premium,
}

impl SubscriptionPlan {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionPlan::Free => "free",
            SubscriptionPlan::Basic => "basic",
            SubscriptionPlan::Standard => "standard",
            SubscriptionPlan::Premium => "premium",
        }
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub avatar: Option<String>,
    pub bio: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub user_type: UserType,
    pub candidate_profile: Json<CandidateProfile>,
    pub employer_company_id: Option<Uuid>,
    pub employer_position: Option<String>,
    pub employer_verified: bool,
    pub subscription_plan: SubscriptionPlan,
    pub subscription_expires_at: Option<DateTime<Utc>>,
    pub subscription_features: Vec<String>,
    pub subscription_active: bool,
    pub subscription_auto_renew: bool,
    pub preferences: Json<Preferences>,
    pub applications_count: i32,
    pub views_count: i32,
    pub last_active_at: DateTime<Utc>,
    pub email_verified: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn resume(&self) -> Option<&Resume> {
        self.candidate_profile
            .resume
            .as_ref()
            .filter(|r| r.is_on_file())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateProfile {
    pub profession: Option<String>,
    pub experience: Option<ExperienceLevel>,
    pub skills: Vec<String>,
    pub education: Vec<EducationEntry>,
    pub resume: Option<Resume>,
    pub expected_salary: Option<ExpectedSalary>,
    pub work_preferences: Option<WorkPreferences>,
}

impl CandidateProfile {
    /// Adds lowercased skills that are not already present; returns how many were new.
    pub fn add_skills<I, S>(&mut self, skills: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut added = 0;
        for skill in skills {
            let normalized = skill.as_ref().trim().to_lowercase();
            if normalized.is_empty() || self.skills.contains(&normalized) {
                continue;
            }
            self.skills.push(normalized);
            added += 1;
        }
        added
    }

    pub fn remove_skill(&mut self, skill: &str) -> bool {
        let normalized = skill.trim().to_lowercase();
        let before = self.skills.len();
        self.skills.retain(|s| *s != normalized);
        self.skills.len() != before
    }

    /// Replaces the resume, keeping whichever of text/file the update leaves out.
    pub fn update_resume(&mut self, text: Option<String>, file: Option<String>, now: DateTime<Utc>) {
        let previous = self.resume.take().unwrap_or_default();
        self.resume = Some(Resume {
            text: text.or(previous.text),
            file: file.or(previous.file),
            last_updated: Some(now),
        });
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Resume {
    pub file: Option<String>,
    pub text: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl Resume {
    pub fn is_on_file(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().map(|s| !s.trim().is_empty()).unwrap_or(false);
        present(&self.file) || present(&self.text)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EducationEntry {
    pub institution: Option<String>,
    pub degree: Option<String>,
    pub field: Option<String>,
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpectedSalary {
    pub min: Option<i64>,
    pub max: Option<i64>,
    #[serde(default = "default_currency")]
    pub currency: Currency,
}

fn default_currency() -> Currency {
    Currency::Rub
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkPreferences {
    pub employment_type: Vec<EmploymentType>,
    pub location_type: Vec<WorkSchedule>,
    pub relocation: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub email_notifications: bool,
    pub push_notifications: bool,
    pub profile_visible: bool,
    pub resume_visible: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            email_notifications: true,
            push_notifications: true,
            profile_visible: true,
            resume_visible: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skills_are_lowercased_and_deduplicated() {
        let mut profile = CandidateProfile::default();
        let added = profile.add_skills(["Rust", "rust", "  SQL ", ""]);
        assert_eq!(added, 2);
        assert_eq!(profile.skills, vec!["rust", "sql"]);

        assert_eq!(profile.add_skills(["RUST"]), 0);
        assert!(profile.remove_skill("Sql"));
        assert!(!profile.remove_skill("go"));
        assert_eq!(profile.skills, vec!["rust"]);
    }

    #[test]
    fn resume_update_keeps_missing_parts() {
        let mut profile = CandidateProfile::default();
        let now = Utc::now();
        profile.update_resume(None, Some("cv.pdf".into()), now);
        profile.update_resume(Some("Experienced engineer".into()), None, now);

        let resume = profile.resume.unwrap();
        assert_eq!(resume.file.as_deref(), Some("cv.pdf"));
        assert_eq!(resume.text.as_deref(), Some("Experienced engineer"));
        assert_eq!(resume.last_updated, Some(now));
    }

    #[test]
    fn blank_resume_is_not_on_file() {
        let blank = Resume {
            file: Some("  ".into()),
            text: None,
            last_updated: None,
        };
        assert!(!blank.is_on_file());
        assert!(Resume {
            text: Some("text".into()),
            ..Default::default()
        }
        .is_on_file());
    }

    #[test]
    fn user_type_round_trips_through_str() {
        for t in [UserType::Candidate, UserType::Employer, UserType::Admin] {
            assert_eq!(UserType::parse(t.as_str()), Some(t));
        }
        assert_eq!(UserType::parse("hr"), None);
    }
}
