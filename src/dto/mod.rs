pub mod analytics_dto;
pub mod application_dto;
pub mod auth_dto;
pub mod company_dto;
pub mod envelope;
pub mod payment_dto;
pub mod user_dto;
pub mod vacancy_dto;
