use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::user::{Resume, UserType};

pub const MIN_INTERVIEW_MINUTES: i32 = 15;
pub const MAX_INTERVIEW_MINUTES: i32 = 480;
pub const DEFAULT_INTERVIEW_MINUTES: i32 = 60;
pub const FIRST_EMPLOYER_MESSAGE: &str = "first employer message";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "application_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Applied,
    Viewed,
    InReview,
    Interview,
    Offer,
    Rejected,
    Withdrawn,
    Hired,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "applied",
            ApplicationStatus::Viewed => "viewed",
            ApplicationStatus::InReview => "in_review",
            ApplicationStatus::Interview => "interview",
            ApplicationStatus::Offer => "offer",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Withdrawn => "withdrawn",
            ApplicationStatus::Hired => "hired",
        }
    }

    /// Closed applications accept no further status changes.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ApplicationStatus::Rejected | ApplicationStatus::Withdrawn | ApplicationStatus::Hired
        )
    }

    /// Statuses that count towards a candidate's success rate.
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            ApplicationStatus::Interview | ApplicationStatus::Offer | ApplicationStatus::Hired
        )
    }
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "application_source", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ApplicationSource {
    Website,
    Email,
    Api,
    Import,
}

/// Which side of an application a caller acts for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Party {
    Candidate,
    Employer,
    Admin,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResumeSnapshot {
    pub file: Option<String>,
    pub text: Option<String>,
    pub version: String,
}

impl ResumeSnapshot {
    pub fn from_resume(resume: &Resume) -> Self {
        Self {
            file: resume.file.clone(),
            text: resume.text.clone(),
            version: "current".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CoverLetter {
    pub text: Option<String>,
    pub file: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusChange {
    pub status: ApplicationStatus,
    pub changed_by: Uuid,
    pub reason: Option<String>,
    pub note: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Employer,
    Candidate,
    System,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    pub filename: String,
    pub url: String,
    pub size: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationMessage {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub sender: Uuid,
    pub message: String,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    pub is_read: bool,
    pub sent_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewType {
    Phone,
    Video,
    InPerson,
    Technical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewStatus {
    Scheduled,
    Completed,
    Cancelled,
    NoShow,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    pub user: Uuid,
    pub role: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewFeedback {
    pub rating: Option<i32>,
    pub comment: Option<String>,
    pub submitted_by: Uuid,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interview {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: InterviewType,
    pub scheduled_at: DateTime<Utc>,
    pub duration: i32,
    pub location: Option<String>,
    pub participants: Vec<Participant>,
    pub description: Option<String>,
    pub feedback: Option<InterviewFeedback>,
    pub status: InterviewStatus,
}

/// Input for a new interview before it is attached to an application.
#[derive(Debug, Clone)]
pub struct InterviewPlan {
    pub kind: InterviewType,
    pub scheduled_at: DateTime<Utc>,
    pub duration: Option<i32>,
    pub location: Option<String>,
    pub participants: Vec<Participant>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rating {
    pub rating: i32,
    pub comment: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Ratings {
    pub candidate: Option<Rating>,
    pub employer: Option<Rating>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Application {
    pub id: Uuid,
    pub vacancy_id: Uuid,
    pub candidate_id: Uuid,
    pub company_id: Uuid,
    pub resume: Json<ResumeSnapshot>,
    pub cover_letter: Option<Json<CoverLetter>>,
    pub answers: Json<Vec<Answer>>,
    pub status: ApplicationStatus,
    pub status_history: Json<Vec<StatusChange>>,
    pub messages: Json<Vec<ApplicationMessage>>,
    pub interviews: Json<Vec<Interview>>,
    pub ratings: Json<Ratings>,
    pub source: ApplicationSource,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub referral: Option<String>,
    pub applied_at: DateTime<Utc>,
    pub viewed_at: Option<DateTime<Utc>>,
    pub responded_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Application {
    /// Resolves the caller's side; `None` means the caller has no business here.
    pub fn party_for(
        &self,
        user_id: Uuid,
        user_type: UserType,
        company_id: Option<Uuid>,
    ) -> Option<Party> {
        match user_type {
            UserType::Admin => Some(Party::Admin),
            UserType::Candidate if self.candidate_id == user_id => Some(Party::Candidate),
            UserType::Employer if company_id == Some(self.company_id) => Some(Party::Employer),
            _ => None,
        }
    }

    pub fn change_status(
        &mut self,
        next: ApplicationStatus,
        party: Party,
        changed_by: Uuid,
        reason: Option<String>,
        note: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<()> {
        if party == Party::Candidate && next != ApplicationStatus::Withdrawn {
            return Err(Error::Forbidden(
                "Candidates can only withdraw their applications".to_string(),
            ));
        }
        self.ensure_open()?;
        self.record_status(next, changed_by, reason, note, now);
        if party != Party::Candidate {
            self.responded_at.get_or_insert(now);
        }
        Ok(())
    }

    pub fn withdraw(&mut self, candidate_id: Uuid, reason: Option<String>, now: DateTime<Utc>) -> Result<()> {
        self.change_status(
            ApplicationStatus::Withdrawn,
            Party::Candidate,
            candidate_id,
            reason,
            None,
            now,
        )
    }

    /// The employer's first message moves a fresh application to `viewed`.
    /// Returns whether the transition happened.
    pub fn mark_viewed_by_employer(&mut self, employer_id: Uuid, now: DateTime<Utc>) -> bool {
        if self.status != ApplicationStatus::Applied {
            return false;
        }
        self.record_status(
            ApplicationStatus::Viewed,
            employer_id,
            Some(FIRST_EMPLOYER_MESSAGE.to_string()),
            None,
            now,
        );
        self.responded_at.get_or_insert(now);
        true
    }

    pub fn add_message(
        &mut self,
        party: Party,
        kind: MessageKind,
        sender: Uuid,
        message: String,
        attachments: Vec<Attachment>,
        now: DateTime<Utc>,
    ) -> Result<ApplicationMessage> {
        let expected = match party {
            Party::Employer => MessageKind::Employer,
            Party::Candidate => MessageKind::Candidate,
            Party::Admin => {
                return Err(Error::Forbidden(
                    "Only the candidate and the employer can exchange messages".to_string(),
                ))
            }
        };
        if kind != expected {
            return Err(Error::BadRequest(
                "Message type does not match your role".to_string(),
            ));
        }

        let entry = ApplicationMessage {
            id: Uuid::new_v4(),
            kind,
            sender,
            message,
            attachments,
            is_read: false,
            sent_at: now,
        };
        self.messages.0.push(entry.clone());
        if party == Party::Employer {
            self.mark_viewed_by_employer(sender, now);
        }
        self.updated_at = now;
        Ok(entry)
    }

    /// Marks the other side's messages as read; returns how many changed.
    pub fn mark_messages_read(&mut self, party: Party, now: DateTime<Utc>) -> usize {
        let own = match party {
            Party::Employer => MessageKind::Employer,
            Party::Candidate => MessageKind::Candidate,
            Party::Admin => return 0,
        };
        let mut changed = 0;
        for msg in self.messages.0.iter_mut() {
            if msg.kind != own && !msg.is_read {
                msg.is_read = true;
                changed += 1;
            }
        }
        if changed > 0 {
            self.updated_at = now;
        }
        changed
    }

    pub fn schedule_interview(
        &mut self,
        plan: InterviewPlan,
        scheduled_by: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Interview> {
        self.ensure_open()?;
        let duration = plan.duration.unwrap_or(DEFAULT_INTERVIEW_MINUTES);
        if !(MIN_INTERVIEW_MINUTES..=MAX_INTERVIEW_MINUTES).contains(&duration) {
            return Err(Error::BadRequest(format!(
                "Interview duration must be between {} and {} minutes",
                MIN_INTERVIEW_MINUTES, MAX_INTERVIEW_MINUTES
            )));
        }
        if plan.participants.is_empty() {
            return Err(Error::BadRequest(
                "At least one interview participant is required".to_string(),
            ));
        }

        let interview = Interview {
            id: Uuid::new_v4(),
            kind: plan.kind,
            scheduled_at: plan.scheduled_at,
            duration,
            location: plan.location,
            participants: plan.participants,
            description: plan.description,
            feedback: None,
            status: InterviewStatus::Scheduled,
        };
        self.interviews.0.push(interview.clone());
        if self.status != ApplicationStatus::Interview {
            self.record_status(
                ApplicationStatus::Interview,
                scheduled_by,
                Some("interview scheduled".to_string()),
                None,
                now,
            );
        }
        self.responded_at.get_or_insert(now);
        self.updated_at = now;
        Ok(interview)
    }

    pub fn update_interview(
        &mut self,
        interview_id: Uuid,
        status: Option<InterviewStatus>,
        rating: Option<i32>,
        comment: Option<String>,
        submitted_by: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Interview> {
        if let Some(r) = rating {
            check_rating(r)?;
        }
        let interview = self
            .interviews
            .0
            .iter_mut()
            .find(|i| i.id == interview_id)
            .ok_or_else(|| Error::NotFound("Interview not found".to_string()))?;

        if let Some(status) = status {
            interview.status = status;
        }
        if rating.is_some() || comment.is_some() {
            interview.feedback = Some(InterviewFeedback {
                rating,
                comment,
                submitted_by,
                submitted_at: now,
            });
        }
        let updated = interview.clone();
        self.updated_at = now;
        Ok(updated)
    }

    pub fn submit_rating(
        &mut self,
        party: Party,
        rating: i32,
        comment: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<()> {
        check_rating(rating)?;
        let entry = Some(Rating {
            rating,
            comment,
            submitted_at: now,
        });
        match party {
            Party::Candidate => self.ratings.0.candidate = entry,
            Party::Employer => self.ratings.0.employer = entry,
            Party::Admin => {
                return Err(Error::Forbidden(
                    "Only the candidate and the employer can leave feedback".to_string(),
                ))
            }
        }
        self.updated_at = now;
        Ok(())
    }

    fn ensure_open(&self) -> Result<()> {
        if self.status.is_terminal() {
            return Err(Error::InvalidTransition(format!(
                "application is already {}",
                self.status
            )));
        }
        Ok(())
    }

    fn record_status(
        &mut self,
        next: ApplicationStatus,
        changed_by: Uuid,
        reason: Option<String>,
        note: Option<String>,
        now: DateTime<Utc>,
    ) {
        self.status_history.0.push(StatusChange {
            status: next,
            changed_by,
            reason,
            note,
            timestamp: now,
        });
        self.status = next;
        if next == ApplicationStatus::Viewed {
            self.viewed_at.get_or_insert(now);
        }
        if next.is_terminal() {
            self.closed_at = Some(now);
        }
        self.updated_at = now;
    }
}

fn check_rating(rating: i32) -> Result<()> {
    if !(1..=5).contains(&rating) {
        return Err(Error::BadRequest(
            "Rating must be between 1 and 5".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn fresh(now: DateTime<Utc>) -> Application {
        Application {
            id: Uuid::new_v4(),
            vacancy_id: Uuid::new_v4(),
            candidate_id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            resume: Json(ResumeSnapshot {
                file: None,
                text: Some("Ten years of backend work".into()),
                version: "current".into(),
            }),
            cover_letter: None,
            answers: Json(vec![]),
            status: ApplicationStatus::Applied,
            status_history: Json(vec![]),
            messages: Json(vec![]),
            interviews: Json(vec![]),
            ratings: Json(Ratings::default()),
            source: ApplicationSource::Website,
            ip_address: None,
            user_agent: None,
            referral: None,
            applied_at: now,
            viewed_at: None,
            responded_at: None,
            closed_at: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn plan(duration: Option<i32>, participants: usize) -> InterviewPlan {
        InterviewPlan {
            kind: InterviewType::Video,
            scheduled_at: Utc::now() + Duration::days(2),
            duration,
            location: None,
            participants: (0..participants)
                .map(|_| Participant {
                    user: Uuid::new_v4(),
                    role: "interviewer".into(),
                })
                .collect(),
            description: None,
        }
    }

    #[test]
    fn first_view_sets_viewed_at_once() {
        let now = Utc::now();
        let mut app = fresh(now);
        let hr = Uuid::new_v4();

        app.change_status(ApplicationStatus::Viewed, Party::Employer, hr, None, None, now)
            .unwrap();
        let first = app.viewed_at;
        assert!(first.is_some());

        let later = now + Duration::hours(3);
        app.change_status(ApplicationStatus::InReview, Party::Employer, hr, None, None, later)
            .unwrap();
        app.change_status(ApplicationStatus::Viewed, Party::Employer, hr, None, None, later)
            .unwrap();
        assert_eq!(app.viewed_at, first);
        assert_eq!(app.status_history.0.len(), 3);
        assert_eq!(app.responded_at, Some(now));
    }

    #[test]
    fn terminal_states_close_and_stay_closed() {
        for terminal in [
            ApplicationStatus::Rejected,
            ApplicationStatus::Hired,
            ApplicationStatus::Withdrawn,
        ] {
            let now = Utc::now();
            let mut app = fresh(now);
            app.change_status(terminal, Party::Admin, Uuid::new_v4(), None, None, now)
                .unwrap();
            assert_eq!(app.closed_at, Some(now));

            let err = app
                .change_status(
                    ApplicationStatus::Applied,
                    Party::Admin,
                    Uuid::new_v4(),
                    None,
                    None,
                    now,
                )
                .unwrap_err();
            assert!(matches!(err, Error::InvalidTransition(_)));
            assert_eq!(app.status, terminal);
        }
    }

    #[test]
    fn candidate_may_only_withdraw() {
        let now = Utc::now();
        let mut app = fresh(now);
        let me = app.candidate_id;

        let err = app
            .change_status(ApplicationStatus::Hired, Party::Candidate, me, None, None, now)
            .unwrap_err();
        assert!(matches!(err, Error::Forbidden(_)));
        assert_eq!(app.status, ApplicationStatus::Applied);
        assert!(app.status_history.0.is_empty());

        app.withdraw(me, Some("found another job".into()), now).unwrap();
        assert_eq!(app.status, ApplicationStatus::Withdrawn);
        assert_eq!(app.closed_at, Some(now));
        assert!(app.responded_at.is_none());
        assert_eq!(app.status_history.0[0].changed_by, me);
    }

    #[test]
    fn employer_first_message_marks_viewed() {
        let now = Utc::now();
        let mut app = fresh(now);
        let hr = Uuid::new_v4();

        let msg = app
            .add_message(Party::Employer, MessageKind::Employer, hr, "Hi!".into(), vec![], now)
            .unwrap();
        assert_eq!(msg.kind, MessageKind::Employer);
        assert_eq!(app.status, ApplicationStatus::Viewed);
        assert_eq!(app.viewed_at, Some(now));
        let entry = &app.status_history.0[0];
        assert_eq!(entry.reason.as_deref(), Some(FIRST_EMPLOYER_MESSAGE));
        assert_eq!(entry.changed_by, hr);

        app.add_message(Party::Employer, MessageKind::Employer, hr, "Again".into(), vec![], now)
            .unwrap();
        assert_eq!(app.status_history.0.len(), 1);
        assert_eq!(app.messages.0.len(), 2);
    }

    #[test]
    fn candidate_message_does_not_change_status() {
        let now = Utc::now();
        let mut app = fresh(now);
        let me = app.candidate_id;
        app.add_message(Party::Candidate, MessageKind::Candidate, me, "Hello".into(), vec![], now)
            .unwrap();
        assert_eq!(app.status, ApplicationStatus::Applied);
        assert!(app.viewed_at.is_none());
    }

    #[test]
    fn message_type_must_match_caller() {
        let now = Utc::now();
        let mut app = fresh(now);
        let me = app.candidate_id;
        let err = app
            .add_message(Party::Candidate, MessageKind::Employer, me, "x".into(), vec![], now)
            .unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));
        let err = app
            .add_message(Party::Candidate, MessageKind::System, me, "x".into(), vec![], now)
            .unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));
        assert!(app.messages.0.is_empty());
    }

    #[test]
    fn reading_marks_only_the_other_side() {
        let now = Utc::now();
        let mut app = fresh(now);
        let me = app.candidate_id;
        let hr = Uuid::new_v4();
        app.add_message(Party::Employer, MessageKind::Employer, hr, "a".into(), vec![], now)
            .unwrap();
        app.add_message(Party::Candidate, MessageKind::Candidate, me, "b".into(), vec![], now)
            .unwrap();

        assert_eq!(app.mark_messages_read(Party::Candidate, now), 1);
        assert_eq!(app.mark_messages_read(Party::Candidate, now), 0);
        assert!(app.messages.0[0].is_read);
        assert!(!app.messages.0[1].is_read);
    }

    #[test]
    fn scheduling_interview_forces_status() {
        let now = Utc::now();
        let mut app = fresh(now);
        let hr = Uuid::new_v4();
        app.change_status(ApplicationStatus::Offer, Party::Employer, hr, None, None, now)
            .unwrap();

        let interview = app.schedule_interview(plan(None, 1), hr, now).unwrap();
        assert_eq!(interview.duration, DEFAULT_INTERVIEW_MINUTES);
        assert_eq!(interview.status, InterviewStatus::Scheduled);
        assert_eq!(app.status, ApplicationStatus::Interview);
        assert_eq!(app.interviews.0.len(), 1);

        app.schedule_interview(plan(Some(90), 2), hr, now).unwrap();
        assert_eq!(app.interviews.0.len(), 2);
        assert_eq!(app.status_history.0.len(), 2);
    }

    #[test]
    fn interview_input_is_checked() {
        let now = Utc::now();
        let mut app = fresh(now);
        let hr = Uuid::new_v4();
        assert!(app.schedule_interview(plan(Some(10), 1), hr, now).is_err());
        assert!(app.schedule_interview(plan(Some(481), 1), hr, now).is_err());
        assert!(app.schedule_interview(plan(Some(30), 0), hr, now).is_err());
        assert!(app.interviews.0.is_empty());
        assert_eq!(app.status, ApplicationStatus::Applied);
    }

    #[test]
    fn closed_application_rejects_interviews() {
        let now = Utc::now();
        let mut app = fresh(now);
        app.change_status(ApplicationStatus::Rejected, Party::Admin, Uuid::new_v4(), None, None, now)
            .unwrap();
        let err = app
            .schedule_interview(plan(None, 1), Uuid::new_v4(), now)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidTransition(_)));
    }

    #[test]
    fn interview_feedback_is_stamped() {
        let now = Utc::now();
        let mut app = fresh(now);
        let hr = Uuid::new_v4();
        let interview = app.schedule_interview(plan(None, 1), hr, now).unwrap();

        let updated = app
            .update_interview(
                interview.id,
                Some(InterviewStatus::Completed),
                Some(4),
                Some("solid".into()),
                hr,
                now,
            )
            .unwrap();
        assert_eq!(updated.status, InterviewStatus::Completed);
        let feedback = updated.feedback.unwrap();
        assert_eq!(feedback.rating, Some(4));
        assert_eq!(feedback.submitted_by, hr);

        assert!(app
            .update_interview(Uuid::new_v4(), None, None, None, hr, now)
            .is_err());
        assert!(app
            .update_interview(interview.id, None, Some(6), None, hr, now)
            .is_err());
    }

    #[test]
    fn ratings_go_to_the_callers_side() {
        let now = Utc::now();
        let mut app = fresh(now);
        app.submit_rating(Party::Candidate, 5, Some("fast replies".into()), now)
            .unwrap();
        app.submit_rating(Party::Employer, 3, None, now).unwrap();
        assert_eq!(app.ratings.0.candidate.as_ref().unwrap().rating, 5);
        assert_eq!(app.ratings.0.employer.as_ref().unwrap().submitted_at, now);
        assert!(app.submit_rating(Party::Candidate, 0, None, now).is_err());
        assert!(app.submit_rating(Party::Admin, 3, None, now).is_err());
    }

    #[test]
    fn party_resolution_checks_ownership() {
        let now = Utc::now();
        let app = fresh(now);
        assert_eq!(
            app.party_for(app.candidate_id, UserType::Candidate, None),
            Some(Party::Candidate)
        );
        assert_eq!(app.party_for(Uuid::new_v4(), UserType::Candidate, None), None);
        assert_eq!(
            app.party_for(Uuid::new_v4(), UserType::Employer, Some(app.company_id)),
            Some(Party::Employer)
        );
        assert_eq!(
            app.party_for(Uuid::new_v4(), UserType::Employer, Some(Uuid::new_v4())),
            None
        );
        assert_eq!(
            app.party_for(Uuid::new_v4(), UserType::Admin, None),
            Some(Party::Admin)
        );
    }

    #[test]
    fn resume_snapshot_is_tagged_current() {
        let resume = Resume {
            file: Some("cv.pdf".into()),
            text: None,
            last_updated: None,
        };
        let snap = ResumeSnapshot::from_resume(&resume);
        assert_eq!(snap.version, "current");
        assert_eq!(snap.file.as_deref(), Some("cv.pdf"));
    }
}
