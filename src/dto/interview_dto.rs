use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::interview::{EvaluationScores, Interview, InterviewStatus, InterviewType};

pub const DEFAULT_INTERVIEW_MINUTES: i32 = 60;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ScheduleInterviewPayload {
    pub stage_id: Option<i64>,
    pub interviewer_id: Option<i64>,
    pub scheduled_at: DateTime<Utc>,
    pub interview_type: InterviewType,
    #[validate(length(min = 1, max = 255))]
    pub location: Option<String>,
    #[validate(url)]
    pub meeting_link: Option<String>,
    #[validate(range(min = 5, max = 480))]
    pub duration_minutes: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RescheduleInterviewPayload {
    pub scheduled_at: DateTime<Utc>,
    #[validate(length(min = 1, max = 1000))]
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CompleteInterviewPayload {
    pub overall_score: Option<Decimal>,
    pub technical_score: Option<Decimal>,
    pub communication_score: Option<Decimal>,
    pub personality_score: Option<Decimal>,
    #[validate(length(max = 5000))]
    pub remarks: Option<String>,
}

impl CompleteInterviewPayload {
    pub fn scores(&self) -> EvaluationScores {
        EvaluationScores {
            overall: self.overall_score,
            technical: self.technical_score,
            communication: self.communication_score,
            personality: self.personality_score,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CancelInterviewPayload {
    #[validate(length(max = 1000))]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateInterviewPayload {
    pub interviewer_id: Option<i64>,
    #[validate(length(min = 1, max = 255))]
    pub location: Option<String>,
    #[validate(url)]
    pub meeting_link: Option<String>,
    #[validate(range(min = 5, max = 480))]
    pub duration_minutes: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpcomingInterviewsQuery {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InterviewResponse {
    pub id: i64,
    pub application_id: i64,
    pub stage_id: Option<i64>,
    pub interviewer_id: Option<i64>,
    pub scheduled_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub duration_minutes: i32,
    pub interview_type: InterviewType,
    pub status: InterviewStatus,
    pub location: Option<String>,
    pub meeting_link: Option<String>,
    pub scores: EvaluationScores,
    pub average_score: Decimal,
    pub has_scores: bool,
    pub remarks: Option<String>,
    pub reschedule_reason: Option<String>,
    pub cancel_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Interview> for InterviewResponse {
    fn from(interview: Interview) -> Self {
        Self {
            scores: interview.scores(),
            average_score: interview.average_score(),
            has_scores: interview.has_scores(),
            id: interview.id,
            application_id: interview.application_id,
            stage_id: interview.stage_id,
            interviewer_id: interview.interviewer_id,
            scheduled_at: interview.scheduled_at,
            ended_at: interview.ended_at,
            duration_minutes: interview.duration_minutes,
            interview_type: interview.interview_type,
            status: interview.status,
            location: interview.location,
            meeting_link: interview.meeting_link,
            remarks: interview.remarks,
            reschedule_reason: interview.reschedule_reason,
            cancel_reason: interview.cancel_reason,
            created_at: interview.created_at,
            updated_at: interview.updated_at,
        }
    }
}
