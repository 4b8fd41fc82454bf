use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::models::vacancy::{
    BoostKind, Currency, EducationLevel, EmploymentType, ExperienceLevel, VacancyCategory,
    VacancySettings, VacancyStatus, WorkSchedule,
};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SalaryInput {
    #[validate(custom(function = "validate_non_negative"))]
    pub min: Decimal,
    #[validate(custom(function = "validate_non_negative"))]
    pub max: Decimal,
    pub currency: Option<Currency>,
    pub is_gross: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LocationInput {
    #[validate(length(min = 1, max = 100, message = "City is required"))]
    pub city: String,
    #[validate(length(max = 200))]
    pub address: Option<String>,
    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub lng: Option<f64>,
    pub is_remote: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_create_salary"))]
pub struct CreateVacancyPayload {
    #[validate(length(min = 5, max = 100, message = "Title must be 5-100 characters"))]
    pub title: String,
    #[validate(length(min = 50, max = 5000, message = "Description must be 50-5000 characters"))]
    pub description: String,
    pub experience: ExperienceLevel,
    #[serde(default)]
    pub skills: Vec<String>,
    pub education: Option<EducationLevel>,
    #[validate(nested)]
    pub salary: SalaryInput,
    #[validate(nested)]
    pub location: LocationInput,
    pub employment_type: EmploymentType,
    pub schedule: WorkSchedule,
    pub category: VacancyCategory,
    #[serde(default)]
    pub tags: Vec<String>,
    pub status: Option<VacancyStatus>,
    pub settings: Option<VacancySettings>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateVacancyPayload {
    #[validate(length(min = 5, max = 100, message = "Title must be 5-100 characters"))]
    pub title: Option<String>,
    #[validate(length(min = 50, max = 5000, message = "Description must be 50-5000 characters"))]
    pub description: Option<String>,
    pub experience: Option<ExperienceLevel>,
    pub skills: Option<Vec<String>>,
    pub education: Option<EducationLevel>,
    #[validate(nested)]
    pub salary: Option<SalaryInput>,
    #[validate(nested)]
    pub location: Option<LocationInput>,
    pub employment_type: Option<EmploymentType>,
    pub schedule: Option<WorkSchedule>,
    pub category: Option<VacancyCategory>,
    pub tags: Option<Vec<String>>,
    pub settings: Option<VacancySettings>,
}

fn validate_non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        let mut err = ValidationError::new("negative");
        err.message = Some("Salary cannot be negative".into());
        return Err(err);
    }
    Ok(())
}

fn validate_create_salary(payload: &CreateVacancyPayload) -> Result<(), ValidationError> {
    check_salary_range(payload.salary.min, payload.salary.max)
}

/// `max >= min`; also re-run by the service against merged values on update.
pub fn check_salary_range(min: Decimal, max: Decimal) -> Result<(), ValidationError> {
    if max < min {
        let mut err = ValidationError::new("salary_range");
        err.message = Some("Maximum salary must not be below minimum salary".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VacancySearchQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub location: Option<String>,
    pub category: Option<VacancyCategory>,
    pub experience: Option<ExperienceLevel>,
    pub salary_min: Option<Decimal>,
    pub salary_max: Option<Decimal>,
    pub employment_type: Option<EmploymentType>,
    pub is_remote: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MyVacanciesQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<VacancyStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct VacancyStatusPayload {
    pub status: VacancyStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BoostPayload {
    #[serde(rename = "type")]
    pub kind: BoostKind,
    #[validate(range(min = 1, max = 30, message = "Boost duration must be 1-30 days"))]
    pub duration: Option<i64>,
}

impl BoostPayload {
    pub fn days(&self) -> i64 {
        self.duration.unwrap_or(7)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BoostResponse {
    #[serde(rename = "type")]
    pub kind: BoostKind,
    pub expires_at: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(min: i64, max: i64) -> CreateVacancyPayload {
        CreateVacancyPayload {
            title: "Backend Engineer".into(),
            description: "d".repeat(60),
            experience: ExperienceLevel::OneToThreeYears,
            skills: vec![],
            education: None,
            salary: SalaryInput {
                min: Decimal::new(min, 0),
                max: Decimal::new(max, 0),
                currency: None,
                is_gross: None,
            },
            location: LocationInput {
                city: "Kazan".into(),
                address: None,
                lat: None,
                lng: None,
                is_remote: None,
            },
            employment_type: EmploymentType::FullTime,
            schedule: WorkSchedule::Office,
            category: VacancyCategory::It,
            tags: vec![],
            status: None,
            settings: None,
        }
    }

    #[test]
    fn salary_max_below_min_is_rejected() {
        assert!(payload(100, 200).validate().is_ok());
        assert!(payload(200, 200).validate().is_ok());
        let err = payload(300, 200).validate().unwrap_err();
        assert!(err.errors().contains_key("__all__"));
    }

    #[test]
    fn negative_salary_is_rejected() {
        assert!(payload(-1, 200).validate().is_err());
    }

    #[test]
    fn boost_duration_bounds() {
        let ok = BoostPayload {
            kind: BoostKind::Highlight,
            duration: None,
        };
        assert!(ok.validate().is_ok());
        assert_eq!(ok.days(), 7);
        let too_long = BoostPayload {
            kind: BoostKind::Urgent,
            duration: Some(31),
        };
        assert!(too_long.validate().is_err());
    }
}
