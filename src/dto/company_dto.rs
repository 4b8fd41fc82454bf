use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::company::{
    Company, CompanyContact, CompanyCulture, CompanySettings, CompanySize, CompanySocial,
    Industry,
};
use crate::models::vacancy::Vacancy;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateCompanyPayload {
    #[validate(length(min = 2, max = 100, message = "Company name must be 2-100 characters"))]
    pub name: String,
    #[validate(length(min = 50, max = 2000, message = "Description must be 50-2000 characters"))]
    pub description: String,
    pub industry: Industry,
    pub size: CompanySize,
    #[validate(url(message = "Enter a valid website URL"))]
    pub website: Option<String>,
    #[validate(url)]
    pub logo: Option<String>,
    #[validate(url)]
    pub cover_image: Option<String>,
    #[validate(range(min = 1800, max = 2100))]
    pub founded_year: Option<i32>,
    #[validate(range(min = 1, max = 12))]
    pub founded_month: Option<i32>,
    pub contact: Option<CompanyContact>,
    pub social: Option<CompanySocial>,
    pub culture: Option<CompanyCulture>,
    pub settings: Option<CompanySettings>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateCompanyPayload {
    #[validate(length(min = 2, max = 100, message = "Company name must be 2-100 characters"))]
    pub name: Option<String>,
    #[validate(length(min = 50, max = 2000, message = "Description must be 50-2000 characters"))]
    pub description: Option<String>,
    pub industry: Option<Industry>,
    pub size: Option<CompanySize>,
    #[validate(url(message = "Enter a valid website URL"))]
    pub website: Option<String>,
    #[validate(url)]
    pub logo: Option<String>,
    #[validate(url)]
    pub cover_image: Option<String>,
    #[validate(range(min = 1800, max = 2100))]
    pub founded_year: Option<i32>,
    #[validate(range(min = 1, max = 12))]
    pub founded_month: Option<i32>,
    pub contact: Option<CompanyContact>,
    pub social: Option<CompanySocial>,
    pub culture: Option<CompanyCulture>,
    pub settings: Option<CompanySettings>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanyListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub industry: Option<Industry>,
    pub size: Option<CompanySize>,
    pub location: Option<String>,
    pub verified: Option<bool>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct VerifyCompanyPayload {
    #[serde(default = "default_verified")]
    pub is_verified: bool,
}

fn default_verified() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewDocument {
    #[serde(rename = "type")]
    #[validate(length(min = 1, max = 50))]
    pub doc_type: String,
    #[validate(url)]
    pub url: Option<String>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DocumentsPayload {
    #[validate(length(min = 1, message = "Attach at least one document"), nested)]
    pub documents: Vec<NewDocument>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompanyDetailResponse {
    pub company: Company,
    pub vacancies: Vec<Vacancy>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_description_is_rejected() {
        let payload = CreateCompanyPayload {
            name: "Acme".into(),
            description: "too short".into(),
            industry: Industry::It,
            size: CompanySize::Small,
            website: Some("not a url".into()),
            logo: None,
            cover_image: None,
            founded_year: None,
            founded_month: Some(13),
            contact: None,
            social: None,
            culture: None,
            settings: None,
        };
        let err = payload.validate().unwrap_err();
        let fields = err.field_errors();
        assert!(fields.contains_key("description"));
        assert!(fields.contains_key("website"));
        assert!(fields.contains_key("founded_month"));
    }

    #[test]
    fn documents_are_validated_individually() {
        let payload = DocumentsPayload {
            documents: vec![NewDocument {
                doc_type: String::new(),
                url: None,
                description: None,
            }],
        };
        assert!(payload.validate().is_err());
        assert!(DocumentsPayload { documents: vec![] }.validate().is_err());
    }
}
