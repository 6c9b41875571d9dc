use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "interview_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum InterviewType {
    Online,
    Onsite,
    Hybrid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "interview_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum InterviewStatus {
    Scheduled,
    Completed,
    Rescheduled,
    Cancelled,
    NoShow,
}

impl InterviewStatus {
    /// Completed, cancelled and no-show interviews accept no further mutation.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            InterviewStatus::Completed | InterviewStatus::Cancelled | InterviewStatus::NoShow
        )
    }
}

/// Evaluation captured when an interview completes. Each dimension is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationScores {
    pub overall: Option<Decimal>,
    pub technical: Option<Decimal>,
    pub communication: Option<Decimal>,
    pub personality: Option<Decimal>,
}

impl EvaluationScores {
    pub fn validate(&self) -> Result<()> {
        let hundred = Decimal::from(100);
        let fields = [
            ("overall", self.overall),
            ("technical", self.technical),
            ("communication", self.communication),
            ("personality", self.personality),
        ];
        for (name, value) in fields {
            if let Some(score) = value {
                if score < Decimal::ZERO || score > hundred {
                    return Err(Error::Validation(format!(
                        "{} score must be between 0 and 100, got {}",
                        name, score
                    )));
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Interview {
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
    pub overall_score: Option<Decimal>,
    pub technical_score: Option<Decimal>,
    pub communication_score: Option<Decimal>,
    pub personality_score: Option<Decimal>,
    pub remarks: Option<String>,
    pub reschedule_reason: Option<String>,
    pub cancel_reason: Option<String>,
    pub reminder_sent_at: Option<DateTime<Utc>>,
    /// Bumped on every write; a save carrying an older value is a conflict.
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Interview {
    pub fn scores(&self) -> EvaluationScores {
        EvaluationScores {
            overall: self.overall_score,
            technical: self.technical_score,
            communication: self.communication_score,
            personality: self.personality_score,
        }
    }

    /// Mean of the technical, communication and personality scores that are
    /// present. `overall_score` is not part of the mean. Zero when none is set.
    pub fn average_score(&self) -> Decimal {
        let present: Vec<Decimal> = [
            self.technical_score,
            self.communication_score,
            self.personality_score,
        ]
        .into_iter()
        .flatten()
        .collect();

        if present.is_empty() {
            return Decimal::ZERO;
        }
        let total: Decimal = present.iter().copied().sum();
        total / Decimal::from(present.len() as i64)
    }

    pub fn has_scores(&self) -> bool {
        self.overall_score.is_some()
            || self.technical_score.is_some()
            || self.communication_score.is_some()
            || self.personality_score.is_some()
    }
}
