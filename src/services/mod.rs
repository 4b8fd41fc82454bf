pub mod analytics_service;
pub mod application_service;
pub mod auth_service;
pub mod company_service;
pub mod filters;
pub mod payment_service;
pub mod user_service;
pub mod vacancy_service;
