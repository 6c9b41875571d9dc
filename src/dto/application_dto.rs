use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::database::store::{ApplicationFilter, ApplicationSort, PageRequest};
use crate::dto::document_dto::AttachDocumentPayload;
use crate::error::Error;
use crate::models::application::{Application, ApplicationStatus};
use crate::models::document::Document;
use crate::models::stage::Stage;

pub const MAX_BULK_IDS: usize = 500;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubmitApplicationPayload {
    pub job_id: i64,
    pub company_id: Option<i64>,
    #[serde(default)]
    pub match_score: Decimal,
    #[validate(length(min = 1, max = 64))]
    pub source: Option<String>,
    #[serde(default)]
    #[validate(length(max = 10))]
    pub documents: Vec<AttachDocumentPayload>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TransitionPayload {
    pub status: ApplicationStatus,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct WithdrawPayload {
    #[validate(length(max = 2000))]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BulkStatusPayload {
    #[validate(length(min = 1, max = 500))]
    pub application_ids: Vec<i64>,
    pub status: ApplicationStatus,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BulkRejectPayload {
    #[validate(length(min = 1, max = 500))]
    pub application_ids: Vec<i64>,
    #[validate(length(max = 2000))]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BulkDeletePayload {
    #[validate(length(min = 1, max = 500))]
    pub application_ids: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookmarkPayload {
    pub bookmarked: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CompleteStagePayload {
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApplicationListQuery {
    pub job_id: Option<i64>,
    pub company_id: Option<i64>,
    pub user_id: Option<i64>,
    pub status: Option<ApplicationStatus>,
    pub source: Option<String>,
    pub is_bookmarked: Option<bool>,
    pub viewed_by_employer: Option<bool>,
    pub min_match_score: Option<Decimal>,
    pub applied_from: Option<DateTime<Utc>>,
    pub applied_to: Option<DateTime<Utc>>,
    #[serde(default)]
    pub sort: ApplicationSort,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl ApplicationListQuery {
    pub fn into_parts(self) -> (ApplicationFilter, ApplicationSort, PageRequest) {
        let filter = ApplicationFilter {
            job_id: self.job_id,
            company_id: self.company_id,
            user_id: self.user_id,
            status: self.status,
            source: self.source,
            is_bookmarked: self.is_bookmarked,
            viewed_by_employer: self.viewed_by_employer,
            min_match_score: self.min_match_score,
            applied_from: self.applied_from,
            applied_to: self.applied_to,
        };
        (filter, self.sort, PageRequest::new(self.page, self.limit))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmittedApplication {
    pub application: Application,
    pub stage: Stage,
    pub documents: Vec<Document>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransitionOutcome {
    pub previous_status: ApplicationStatus,
    pub application: Application,
    pub stage: Stage,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BulkFailure {
    pub application_id: i64,
    pub kind: String,
    pub message: String,
}

impl BulkFailure {
    pub fn new(application_id: i64, err: &Error) -> Self {
        Self {
            application_id,
            kind: err.kind().to_string(),
            message: err.to_string(),
        }
    }
}

/// Per-item result of a fan-out operation; nothing in it is ever rolled back.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BulkOutcome {
    pub succeeded: Vec<i64>,
    pub failed: Vec<BulkFailure>,
}

impl BulkOutcome {
    pub fn attempted(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BulkDeleteResponse {
    pub requested: usize,
    pub deleted: u64,
}
