use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::models::company::CompanyStats;
use crate::models::user::{
    EducationEntry, ExpectedSalary, Preferences, UserType, WorkPreferences,
};
use crate::models::vacancy::ExperienceLevel;

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateProfilePayload {
    #[validate(length(min = 1, max = 50))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub last_name: Option<String>,
    #[validate(length(max = 30))]
    pub phone: Option<String>,
    #[validate(url)]
    pub avatar: Option<String>,
    #[validate(length(max = 500, message = "Bio must be at most 500 characters"))]
    pub bio: Option<String>,
    #[validate(length(max = 100))]
    pub city: Option<String>,
    #[validate(length(max = 100))]
    pub country: Option<String>,
    pub preferences: Option<Preferences>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_expected_salary"))]
pub struct UpdateCandidateProfilePayload {
    #[validate(length(max = 100))]
    pub profession: Option<String>,
    pub experience: Option<ExperienceLevel>,
    pub education: Option<Vec<EducationEntry>>,
    pub expected_salary: Option<ExpectedSalary>,
    pub work_preferences: Option<WorkPreferences>,
}

fn validate_expected_salary(
    payload: &UpdateCandidateProfilePayload,
) -> Result<(), ValidationError> {
    if let Some(salary) = &payload.expected_salary {
        if let (Some(min), Some(max)) = (salary.min, salary.max) {
            if min < 0 || max < min {
                let mut err = ValidationError::new("salary_range");
                err.message = Some("Expected salary max must not be below min".into());
                return Err(err);
            }
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SkillsPayload {
    #[validate(
        length(min = 1, message = "Provide at least one skill"),
        custom(function = "validate_skill_names")
    )]
    pub skills: Vec<String>,
}

fn validate_skill_names(skills: &[String]) -> Result<(), ValidationError> {
    for skill in skills {
        let len = skill.trim().chars().count();
        if len == 0 || len > 50 {
            let mut err = ValidationError::new("skill_length");
            err.message = Some("Each skill must be 1-50 characters".into());
            return Err(err);
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_resume_parts"))]
pub struct ResumePayload {
    #[validate(length(min = 100, max = 10000, message = "Resume text must be 100-10000 characters"))]
    pub text: Option<String>,
    #[validate(url)]
    pub file: Option<String>,
}

fn validate_resume_parts(payload: &ResumePayload) -> Result<(), ValidationError> {
    if payload.text.is_none() && payload.file.is_none() {
        let mut err = ValidationError::new("resume_empty");
        err.message = Some("Provide resume text or a file".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UserListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    #[serde(rename = "type")]
    pub user_type: Option<UserType>,
    pub is_active: Option<bool>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UserStatusPayload {
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkillsResponse {
    pub skills: Vec<String>,
    pub added: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserStatsResponse {
    pub applications_count: i32,
    pub views_count: i32,
    pub last_active_at: chrono::DateTime<chrono::Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applications_by_status: Option<BTreeMap<String, i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_applications: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_stats: Option<CompanyStats>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::vacancy::Currency;

    #[test]
    fn resume_requires_text_or_file() {
        let empty = ResumePayload {
            text: None,
            file: None,
        };
        assert!(empty.validate().is_err());

        let short = ResumePayload {
            text: Some("too short".into()),
            file: None,
        };
        assert!(short.validate().is_err());

        let file = ResumePayload {
            text: None,
            file: Some("https://cdn.example.com/cv.pdf".into()),
        };
        assert!(file.validate().is_ok());
    }

    #[test]
    fn skills_must_be_short_and_non_empty() {
        assert!(SkillsPayload { skills: vec![] }.validate().is_err());
        assert!(SkillsPayload {
            skills: vec!["  ".into()]
        }
        .validate()
        .is_err());
        assert!(SkillsPayload {
            skills: vec!["rust".into(), "postgres".into()]
        }
        .validate()
        .is_ok());
    }

    #[test]
    fn expected_salary_range_is_checked() {
        let payload = UpdateCandidateProfilePayload {
            expected_salary: Some(ExpectedSalary {
                min: Some(200),
                max: Some(100),
                currency: Currency::Usd,
            }),
            ..Default::default()
        };
        assert!(payload.validate().is_err());
    }
}
