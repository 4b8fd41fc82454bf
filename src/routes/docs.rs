use axum::Json;
use utoipa::OpenApi;

use super::{analytics, applications, auth, companies, health, payments, users, vacancies};

#[derive(OpenApi)]
#[openapi(
    info(title = "Job Board API", description = "Vacancies, companies, applications and billing"),
    paths(
        health::health,
        openapi_json,
        auth::register,
        auth::login,
        auth::logout,
        auth::me,
        auth::update_password,
        users::get_profile,
        users::update_profile,
        users::update_candidate_profile,
        users::add_skills,
        users::remove_skill,
        users::update_resume,
        users::list_users,
        users::set_user_status,
        users::stats,
        users::delete_account,
        companies::list_companies,
        companies::get_company,
        companies::create_company,
        companies::update_company,
        companies::my_companies,
        companies::verify_company,
        companies::add_documents,
        companies::company_stats,
        vacancies::search_vacancies,
        vacancies::get_vacancy,
        vacancies::record_view,
        vacancies::create_vacancy,
        vacancies::update_vacancy,
        vacancies::delete_vacancy,
        vacancies::my_vacancies,
        vacancies::set_vacancy_status,
        vacancies::boost_vacancy,
        vacancies::refresh_vacancy,
        applications::submit_application,
        applications::my_applications,
        applications::company_applications,
        applications::company_application_stats,
        applications::get_application,
        applications::change_status,
        applications::add_message,
        applications::mark_messages_read,
        applications::schedule_interview,
        applications::update_interview,
        applications::submit_feedback,
        applications::withdraw,
        applications::delete_application,
        payments::subscribe,
        payments::purchase_services,
        payments::history,
        payments::receipt,
        payments::refund,
        analytics::platform,
        analytics::employer,
        analytics::candidate,
        analytics::revenue,
    )
)]
pub struct ApiDoc;

#[utoipa::path(
    get,
    path = "/api/docs/openapi.json",
    responses(
        (status = 200, description = "OpenAPI document")
    )
)]
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route_group() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;
        for path in [
            "/health",
            "/api/auth/register",
            "/api/users/profile",
            "/api/companies/{id}",
            "/api/vacancies/{id}/boost",
            "/api/applications/{id}/interviews/{interview_id}",
            "/api/payments/{id}/receipt",
            "/api/analytics/revenue",
        ] {
            assert!(paths.contains_key(path), "missing {}", path);
        }
    }
}
