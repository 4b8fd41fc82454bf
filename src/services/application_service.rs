use sqlx::types::Json;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::dto::application_dto::{
    ChangeStatusPayload, CompanyApplicationsQuery, FeedbackPayload, InterviewUpdatePayload,
    MessagePayload, MyApplicationsQuery, ReadReceipt, ScheduleInterviewPayload, StatusAggregate,
    SubmitApplicationPayload,
};
use crate::dto::envelope::{PageParams, Paginated};
use crate::error::{unique_violation, Error, Result};
use crate::middleware::auth::CurrentUser;
use crate::models::application::{
    Answer, Application, ApplicationMessage, ApplicationSource, CoverLetter, Interview,
    InterviewPlan, Party, ResumeSnapshot,
};
use crate::models::user::{User, UserType};
use crate::models::vacancy::Vacancy;
use crate::services::filters::{wire_name, Filters};
use crate::utils::time;

/// Per-status counts with mean `viewed_at - applied_at`; `$1` is the company.
pub(crate) const STATUS_AGGREGATES: &str = r#"
    SELECT
        status,
        COUNT(*) AS count,
        (AVG(EXTRACT(EPOCH FROM (viewed_at - applied_at)))
            FILTER (WHERE viewed_at IS NOT NULL))::FLOAT8 AS avg_response_time_secs
    FROM applications
    WHERE company_id = $1 AND is_active
    GROUP BY status
    ORDER BY status
"#;

/// Request origin recorded with a submission.
#[derive(Debug, Clone, Default)]
pub struct SubmissionMeta {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Clone)]
pub struct ApplicationService {
    pool: PgPool,
}

impl ApplicationService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn submit(
        &self,
        candidate_id: Uuid,
        payload: SubmitApplicationPayload,
        meta: SubmissionMeta,
    ) -> Result<Application> {
        let now = time::now();

        let vacancy = sqlx::query_as::<_, Vacancy>("SELECT * FROM vacancies WHERE id = $1")
            .bind(payload.vacancy)
            .fetch_optional(&self.pool)
            .await?
            .filter(|v| v.accepts_applications(now))
            .ok_or(Error::VacancyUnavailable)?;

        let already_applied: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM applications
                WHERE vacancy_id = $1 AND candidate_id = $2 AND is_active
            )
            "#,
        )
        .bind(vacancy.id)
        .bind(candidate_id)
        .fetch_one(&self.pool)
        .await?;
        if already_applied {
            return Err(Error::DuplicateApplication);
        }

        let candidate = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(candidate_id)
            .fetch_one(&self.pool)
            .await?;
        let resume = candidate.resume().ok_or(Error::MissingResume)?;

        let answers: Vec<Answer> = payload.answers.into_iter().map(Into::into).collect();
        let cover_letter: Option<CoverLetter> = payload.cover_letter.map(Into::into);

        let inserted = sqlx::query_as::<_, Application>(
            r#"
            INSERT INTO applications (
                vacancy_id, candidate_id, company_id, resume, cover_letter, answers,
                source, ip_address, user_agent, referral, applied_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(vacancy.id)
        .bind(candidate_id)
        .bind(vacancy.company_id)
        .bind(Json(ResumeSnapshot::from_resume(resume)))
        .bind(cover_letter.map(Json))
        .bind(Json(answers))
        .bind(ApplicationSource::Website)
        .bind(meta.ip_address)
        .bind(meta.user_agent)
        .bind(payload.referral)
        .bind(now)
        .fetch_one(&self.pool)
        .await;

        let application = match inserted {
            Ok(application) => application,
            Err(e) if unique_violation(&e).is_some() => return Err(Error::DuplicateApplication),
            Err(e) => return Err(e.into()),
        };

        // Counters trail the insert; a failure here leaves them one behind.
        sqlx::query(
            r#"
            UPDATE vacancies
            SET applications = applications + 1, last_application_at = $2
            WHERE id = $1
            "#,
        )
        .bind(vacancy.id)
        .bind(now)
        .execute(&self.pool)
        .await?;
        sqlx::query("UPDATE users SET applications_count = applications_count + 1 WHERE id = $1")
            .bind(candidate_id)
            .execute(&self.pool)
            .await?;

        info!(
            application_id = %application.id,
            vacancy_id = %vacancy.id,
            candidate_id = %candidate_id,
            "application submitted"
        );
        Ok(application)
    }

    async fn find_active(&self, id: Uuid) -> Result<Application> {
        sqlx::query_as::<_, Application>("SELECT * FROM applications WHERE id = $1 AND is_active")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Application not found".to_string()))
    }

    /// Loads the application and resolves which side the caller acts for.
    async fn load_for(&self, id: Uuid, caller: &CurrentUser) -> Result<(Application, Party)> {
        let application = self.find_active(id).await?;
        let party = application
            .party_for(caller.id, caller.user_type, caller.company_id)
            .ok_or_else(|| {
                Error::Forbidden("You do not have access to this application".to_string())
            })?;
        Ok((application, party))
    }

    pub async fn get(&self, id: Uuid, caller: &CurrentUser) -> Result<Application> {
        let (application, _) = self.load_for(id, caller).await?;
        Ok(application)
    }

    pub async fn list_mine(
        &self,
        candidate_id: Uuid,
        query: MyApplicationsQuery,
    ) -> Result<Paginated<Application>> {
        let page = PageParams::new(query.page, query.limit);
        let mut filters = Filters::new();
        filters
            .raw("is_active")
            .push("candidate_id = {}::uuid", candidate_id.to_string());
        if let Some(status) = query.status {
            filters.push("status = {}::application_status", wire_name(&status));
        }
        self.paginate(&filters, page).await
    }

    pub async fn list_company(
        &self,
        company_id: Uuid,
        query: CompanyApplicationsQuery,
    ) -> Result<Paginated<Application>> {
        let page = PageParams::new(query.page, query.limit);
        let mut filters = Filters::new();
        filters
            .raw("is_active")
            .push("company_id = {}::uuid", company_id.to_string());
        if let Some(status) = query.status {
            filters.push("status = {}::application_status", wire_name(&status));
        }
        if let Some(vacancy) = query.vacancy {
            filters.push("vacancy_id = {}::uuid", vacancy.to_string());
        }
        if query.recent.unwrap_or(false) {
            filters.raw("applied_at >= NOW() - INTERVAL '7 days'");
        }
        self.paginate(&filters, page).await
    }

    async fn paginate(&self, filters: &Filters, page: PageParams) -> Result<Paginated<Application>> {
        let where_clause = filters.where_clause();
        let next = filters.next_index();

        let items_query = format!(
            "SELECT * FROM applications {} ORDER BY applied_at DESC LIMIT ${} OFFSET ${}",
            where_clause,
            next,
            next + 1
        );
        let mut items_statement = sqlx::query_as::<_, Application>(&items_query);
        for value in filters.args() {
            items_statement = items_statement.bind(value);
        }
        let items = items_statement
            .bind(page.limit)
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        let total_query = format!("SELECT COUNT(*) FROM applications {}", where_clause);
        let mut total_statement = sqlx::query_scalar::<_, i64>(&total_query);
        for value in filters.args() {
            total_statement = total_statement.bind(value);
        }
        let total = total_statement.fetch_one(&self.pool).await?;

        Ok(Paginated::new(items, page, total))
    }

    pub async fn change_status(
        &self,
        id: Uuid,
        caller: &CurrentUser,
        payload: ChangeStatusPayload,
    ) -> Result<Application> {
        let (mut application, party) = self.load_for(id, caller).await?;
        let previous = application.status;
        application.change_status(
            payload.status,
            party,
            caller.id,
            payload.reason,
            payload.note,
            time::now(),
        )?;
        let application = self.persist(&application).await?;
        info!(
            application_id = %id,
            from = %previous,
            to = %application.status,
            "application status changed"
        );
        Ok(application)
    }

    pub async fn withdraw(
        &self,
        id: Uuid,
        caller: &CurrentUser,
        reason: Option<String>,
    ) -> Result<Application> {
        let (mut application, party) = self.load_for(id, caller).await?;
        if party != Party::Candidate {
            return Err(Error::Forbidden(
                "Only the candidate can withdraw an application".to_string(),
            ));
        }
        application.withdraw(caller.id, reason, time::now())?;
        self.persist(&application).await
    }

    pub async fn add_message(
        &self,
        id: Uuid,
        caller: &CurrentUser,
        payload: MessagePayload,
    ) -> Result<(Application, ApplicationMessage)> {
        let (mut application, party) = self.load_for(id, caller).await?;
        let message = application.add_message(
            party,
            payload.kind,
            caller.id,
            payload.message,
            payload.attachments.into_iter().map(Into::into).collect(),
            time::now(),
        )?;
        let application = self.persist(&application).await?;
        Ok((application, message))
    }

    pub async fn mark_read(&self, id: Uuid, caller: &CurrentUser) -> Result<ReadReceipt> {
        let (mut application, party) = self.load_for(id, caller).await?;
        let marked = application.mark_messages_read(party, time::now());
        if marked > 0 {
            self.persist(&application).await?;
        }
        Ok(ReadReceipt { marked })
    }

    pub async fn schedule_interview(
        &self,
        id: Uuid,
        caller: &CurrentUser,
        payload: ScheduleInterviewPayload,
    ) -> Result<Interview> {
        let (mut application, party) = self.load_for(id, caller).await?;
        ensure_employer(party)?;

        let plan = InterviewPlan {
            kind: payload.kind,
            scheduled_at: payload.scheduled_at,
            duration: payload.duration,
            location: payload.location,
            participants: payload.participants.into_iter().map(Into::into).collect(),
            description: payload.description,
        };
        let interview = application.schedule_interview(plan, caller.id, time::now())?;
        self.persist(&application).await?;
        info!(application_id = %id, interview_id = %interview.id, "interview scheduled");
        Ok(interview)
    }

    pub async fn update_interview(
        &self,
        id: Uuid,
        interview_id: Uuid,
        caller: &CurrentUser,
        payload: InterviewUpdatePayload,
    ) -> Result<Interview> {
        let (mut application, party) = self.load_for(id, caller).await?;
        ensure_employer(party)?;

        let interview = application.update_interview(
            interview_id,
            payload.status,
            payload.rating,
            payload.comment,
            caller.id,
            time::now(),
        )?;
        self.persist(&application).await?;
        Ok(interview)
    }

    pub async fn submit_feedback(
        &self,
        id: Uuid,
        caller: &CurrentUser,
        payload: FeedbackPayload,
    ) -> Result<Application> {
        let (mut application, party) = self.load_for(id, caller).await?;
        application.submit_rating(party, payload.rating, payload.comment, time::now())?;
        self.persist(&application).await
    }

    /// Hides the application; rows are never hard-deleted.
    pub async fn soft_delete(&self, id: Uuid, caller: &CurrentUser) -> Result<()> {
        let (application, party) = self.load_for(id, caller).await?;
        if !matches!(party, Party::Candidate | Party::Admin) {
            return Err(Error::Forbidden(
                "Only the candidate or an administrator can delete an application".to_string(),
            ));
        }
        sqlx::query("UPDATE applications SET is_active = FALSE, updated_at = NOW() WHERE id = $1")
            .bind(application.id)
            .execute(&self.pool)
            .await?;
        if caller.user_type == UserType::Admin {
            warn!(application_id = %id, admin_id = %caller.id, "application removed by admin");
        }
        Ok(())
    }

    pub async fn company_stats(&self, company_id: Uuid) -> Result<Vec<StatusAggregate>> {
        let rows = sqlx::query_as::<_, StatusAggregate>(STATUS_AGGREGATES)
            .bind(company_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Writes the lifecycle state back in a single statement.
    async fn persist(&self, application: &Application) -> Result<Application> {
        let saved = sqlx::query_as::<_, Application>(
            r#"
            UPDATE applications
            SET
                status = $2,
                status_history = $3,
                messages = $4,
                interviews = $5,
                ratings = $6,
                viewed_at = $7,
                responded_at = $8,
                closed_at = $9,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(application.id)
        .bind(application.status)
        .bind(&application.status_history)
        .bind(&application.messages)
        .bind(&application.interviews)
        .bind(&application.ratings)
        .bind(application.viewed_at)
        .bind(application.responded_at)
        .bind(application.closed_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(saved)
    }
}

fn ensure_employer(party: Party) -> Result<()> {
    if party == Party::Employer {
        Ok(())
    } else {
        Err(Error::Forbidden(
            "Only the hiring company can manage interviews".to_string(),
        ))
    }
}

/// First `X-Forwarded-For` hop, falling back to the peer address.
pub fn client_ip(forwarded_for: Option<&str>, peer: Option<std::net::SocketAddr>) -> Option<String> {
    forwarded_for
        .and_then(|raw| raw.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(str::to_string)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
}
