use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::application::{
    Answer, ApplicationStatus, Attachment, CoverLetter, InterviewStatus, InterviewType,
    MessageKind, Participant,
};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CoverLetterInput {
    #[validate(length(max = 2000, message = "Cover letter must be at most 2000 characters"))]
    pub text: Option<String>,
    #[validate(url)]
    pub file: Option<String>,
}

impl From<CoverLetterInput> for CoverLetter {
    fn from(value: CoverLetterInput) -> Self {
        Self {
            text: value.text,
            file: value.file,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AnswerInput {
    #[validate(length(min = 1, max = 500))]
    pub question: String,
    #[validate(length(max = 2000))]
    pub answer: String,
}

impl From<AnswerInput> for Answer {
    fn from(value: AnswerInput) -> Self {
        Self {
            question: value.question,
            answer: value.answer,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubmitApplicationPayload {
    #[serde(alias = "vacancy_id")]
    pub vacancy: Uuid,
    #[validate(nested)]
    pub cover_letter: Option<CoverLetterInput>,
    #[serde(default)]
    #[validate(nested)]
    pub answers: Vec<AnswerInput>,
    pub referral: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ChangeStatusPayload {
    pub status: ApplicationStatus,
    #[validate(length(max = 500, message = "Reason must be at most 500 characters"))]
    pub reason: Option<String>,
    #[validate(length(max = 1000))]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AttachmentInput {
    #[validate(length(min = 1, max = 255))]
    pub filename: String,
    #[validate(url)]
    pub url: String,
    #[validate(range(min = 0))]
    pub size: Option<i64>,
}

impl From<AttachmentInput> for Attachment {
    fn from(value: AttachmentInput) -> Self {
        Self {
            filename: value.filename,
            url: value.url,
            size: value.size,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MessagePayload {
    #[serde(rename = "type")]
    pub kind: MessageKind,
    #[validate(length(min = 1, max = 2000, message = "Message must be 1-2000 characters"))]
    pub message: String,
    #[serde(default)]
    #[validate(nested)]
    pub attachments: Vec<AttachmentInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ParticipantInput {
    pub user: Uuid,
    #[validate(length(min = 1, max = 50))]
    pub role: String,
}

impl From<ParticipantInput> for Participant {
    fn from(value: ParticipantInput) -> Self {
        Self {
            user: value.user,
            role: value.role,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ScheduleInterviewPayload {
    #[serde(rename = "type")]
    pub kind: InterviewType,
    pub scheduled_at: DateTime<Utc>,
    #[validate(range(min = 15, max = 480, message = "Interview duration must be 15-480 minutes"))]
    pub duration: Option<i32>,
    #[validate(length(min = 1, message = "Add at least one participant"), nested)]
    pub participants: Vec<ParticipantInput>,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    #[validate(length(max = 200))]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct InterviewUpdatePayload {
    pub status: Option<InterviewStatus>,
    #[validate(range(min = 1, max = 5, message = "Rating must be 1-5"))]
    pub rating: Option<i32>,
    #[validate(length(max = 1000))]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FeedbackPayload {
    #[validate(range(min = 1, max = 5, message = "Rating must be 1-5"))]
    pub rating: i32,
    #[validate(length(max = 1000))]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct WithdrawPayload {
    #[validate(length(max = 500))]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MyApplicationsQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<ApplicationStatus>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanyApplicationsQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<ApplicationStatus>,
    pub vacancy: Option<Uuid>,
    pub recent: Option<bool>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct StatusAggregate {
    pub status: ApplicationStatus,
    pub count: i64,
    pub avg_response_time_secs: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReadReceipt {
    pub marked: usize,
}
