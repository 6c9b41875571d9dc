use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

/// Position of an application in the hiring pipeline.
///
/// The same enumeration names both `Application.status` and `Stage.stage_name`,
/// so the legal-edge table below is the only place the pipeline is defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "application_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Applied,
    Screening,
    Shortlisted,
    Interview,
    Offered,
    Hired,
    Rejected,
    Withdrawn,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 8] = [
        ApplicationStatus::Applied,
        ApplicationStatus::Screening,
        ApplicationStatus::Shortlisted,
        ApplicationStatus::Interview,
        ApplicationStatus::Offered,
        ApplicationStatus::Hired,
        ApplicationStatus::Rejected,
        ApplicationStatus::Withdrawn,
    ];

    /// Forward path of the pipeline, in funnel order.
    pub const FUNNEL: [ApplicationStatus; 6] = [
        ApplicationStatus::Applied,
        ApplicationStatus::Screening,
        ApplicationStatus::Shortlisted,
        ApplicationStatus::Interview,
        ApplicationStatus::Offered,
        ApplicationStatus::Hired,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "applied",
            ApplicationStatus::Screening => "screening",
            ApplicationStatus::Shortlisted => "shortlisted",
            ApplicationStatus::Interview => "interview",
            ApplicationStatus::Offered => "offered",
            ApplicationStatus::Hired => "hired",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Withdrawn => "withdrawn",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ApplicationStatus::Hired | ApplicationStatus::Rejected | ApplicationStatus::Withdrawn
        )
    }

    /// The single forward successor along the funnel, if any.
    pub fn next(&self) -> Option<ApplicationStatus> {
        match self {
            ApplicationStatus::Applied => Some(ApplicationStatus::Screening),
            ApplicationStatus::Screening => Some(ApplicationStatus::Shortlisted),
            ApplicationStatus::Shortlisted => Some(ApplicationStatus::Interview),
            ApplicationStatus::Interview => Some(ApplicationStatus::Offered),
            ApplicationStatus::Offered => Some(ApplicationStatus::Hired),
            _ => None,
        }
    }

    /// Legal-edge table. Withdrawal is structurally legal from any
    /// non-terminal status; the owner check happens in the engine.
    pub fn can_transition_to(&self, target: ApplicationStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        match target {
            ApplicationStatus::Rejected | ApplicationStatus::Withdrawn => true,
            other => self.next() == Some(other),
        }
    }

    /// Index in the funnel, `None` for rejected/withdrawn.
    pub fn funnel_position(&self) -> Option<usize> {
        Self::FUNNEL.iter().position(|s| s == self)
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == s.trim().to_ascii_lowercase())
            .ok_or_else(|| crate::error::Error::Validation(format!("Unknown application status: {}", s)))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Application {
    pub id: i64,
    pub job_id: i64,
    pub user_id: i64,
    pub company_id: Option<i64>,
    pub status: ApplicationStatus,
    pub match_score: Decimal,
    pub source: String,
    pub viewed_by_employer: bool,
    pub is_bookmarked: bool,
    pub applied_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Application {
    pub fn can_withdraw(&self) -> bool {
        !self.status.is_terminal()
    }

    pub fn is_owner(&self, user_id: i64) -> bool {
        self.user_id == user_id
    }
}
