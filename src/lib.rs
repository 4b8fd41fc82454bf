pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use crate::services::{
    analytics_service::AnalyticsService, application_service::ApplicationService,
    auth_service::AuthService, company_service::CompanyService,
    payment_service::PaymentService, user_service::UserService,
    vacancy_service::VacancyService,
};
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub user_service: UserService,
    pub auth_service: AuthService,
    pub company_service: CompanyService,
    pub vacancy_service: VacancyService,
    pub application_service: ApplicationService,
    pub payment_service: PaymentService,
    pub analytics_service: AnalyticsService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let user_service = UserService::new(pool.clone());
        let auth_service = AuthService::new(user_service.clone());
        let company_service = CompanyService::new(pool.clone());
        let vacancy_service = VacancyService::new(pool.clone());
        let application_service = ApplicationService::new(pool.clone());
        let payment_service = PaymentService::new(
            pool.clone(),
            user_service.clone(),
            vacancy_service.clone(),
        );
        let analytics_service = AnalyticsService::new(pool.clone());

        Self {
            pool,
            user_service,
            auth_service,
            company_service,
            vacancy_service,
            application_service,
            payment_service,
            analytics_service,
        }
    }
}
