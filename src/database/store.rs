//! Persistence contract consumed by the lifecycle services.
//!
//! Every method that writes more than one row is atomic: implementations
//! either commit all of it or none of it. Compare-and-swap style methods
//! (`rotate_stage`, `save_interview`) take the state the caller observed and
//! fail with [`Error::Conflict`](crate::error::Error::Conflict) when another
//! writer got there first.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::application::{Application, ApplicationStatus};
use crate::models::document::{Document, DocumentType};
use crate::models::interview::{Interview, InterviewStatus, InterviewType};
use crate::models::note::{Note, NoteSentiment, NoteType, NoteVisibility};
use crate::models::stage::Stage;

pub const DEFAULT_PAGE_LIMIT: i64 = 20;
pub const MAX_PAGE_LIMIT: i64 = 100;
pub const MAX_PAGE: i64 = 1_000_000;

#[derive(Debug, Clone)]
pub struct NewApplication {
    pub job_id: i64,
    pub user_id: i64,
    pub company_id: Option<i64>,
    pub match_score: Decimal,
    pub source: String,
    pub applied_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewDocument {
    pub application_id: i64,
    pub uploaded_by: i64,
    pub document_type: DocumentType,
    pub file_name: String,
    pub file_url: String,
    pub file_type: Option<String>,
    pub file_size: i64,
}

#[derive(Debug, Clone)]
pub struct NewInterview {
    pub application_id: i64,
    pub stage_id: Option<i64>,
    pub interviewer_id: Option<i64>,
    pub scheduled_at: DateTime<Utc>,
    pub duration_minutes: i32,
    pub interview_type: InterviewType,
    pub location: Option<String>,
    pub meeting_link: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewNote {
    pub application_id: i64,
    pub stage_id: Option<i64>,
    pub author_id: i64,
    pub content: String,
    pub note_type: NoteType,
    pub visibility: NoteVisibility,
    pub sentiment: NoteSentiment,
    pub is_pinned: bool,
}

/// One status change: close the open stage, open `target`, set the status.
#[derive(Debug, Clone)]
pub struct StageRotation {
    pub application_id: i64,
    /// Status the caller validated the edge against.
    pub expected_status: ApplicationStatus,
    pub target: ApplicationStatus,
    pub actor_id: Option<i64>,
    pub notes: Option<String>,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApplicationFilter {
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
}

impl ApplicationFilter {
    pub fn matches(&self, app: &Application) -> bool {
        self.job_id.map_or(true, |v| app.job_id == v)
            && self.company_id.map_or(true, |v| app.company_id == Some(v))
            && self.user_id.map_or(true, |v| app.user_id == v)
            && self.status.map_or(true, |v| app.status == v)
            && self.source.as_deref().map_or(true, |v| app.source == v)
            && self.is_bookmarked.map_or(true, |v| app.is_bookmarked == v)
            && self.viewed_by_employer.map_or(true, |v| app.viewed_by_employer == v)
            && self.min_match_score.map_or(true, |v| app.match_score >= v)
            && self.applied_from.map_or(true, |v| app.applied_at >= v)
            && self.applied_to.map_or(true, |v| app.applied_at < v)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationSort {
    #[default]
    NewestFirst,
    /// Highest match score first, earliest `applied_at` breaking ties.
    BestMatch,
}

#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl PageRequest {
    /// Clamps to `1..=MAX_PAGE` and `1..=MAX_PAGE_LIMIT`.
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1).clamp(1, MAX_PAGE),
            limit: limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT),
        }
    }

    pub fn offset(&self) -> i64 {
        self.page.saturating_sub(1).saturating_mul(self.limit).max(0)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

/// Company and/or job restriction applied to read-side aggregates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsScope {
    pub company_id: Option<i64>,
    pub job_id: Option<i64>,
}

impl AnalyticsScope {
    pub fn for_job(job_id: i64) -> Self {
        Self {
            company_id: None,
            job_id: Some(job_id),
        }
    }

    pub fn as_filter(&self) -> ApplicationFilter {
        ApplicationFilter {
            job_id: self.job_id,
            company_id: self.company_id,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoteFilter {
    pub stage_id: Option<i64>,
    pub pinned_only: bool,
    pub visibility: Option<NoteVisibility>,
}

/// A stage name an application has entered at some point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageVisit {
    pub application_id: i64,
    pub stage_name: ApplicationStatus,
}

#[async_trait]
pub trait ApplicationStore: Send + Sync {
    // applications

    /// Inserts the application, its open `applied` stage and any documents.
    /// Fails with `DuplicateApplication` when the (job, user) pair exists.
    async fn create_application(
        &self,
        new: NewApplication,
        documents: Vec<NewDocument>,
    ) -> Result<(Application, Stage, Vec<Document>)>;

    async fn get_application(&self, id: i64) -> Result<Option<Application>>;

    async fn list_applications(
        &self,
        filter: &ApplicationFilter,
        sort: ApplicationSort,
        page: PageRequest,
    ) -> Result<Page<Application>>;

    /// Unpaged scan used by the analytics read side.
    async fn scan_applications(&self, filter: &ApplicationFilter) -> Result<Vec<Application>>;

    async fn mark_viewed(&self, id: i64) -> Result<Application>;

    async fn set_bookmark(&self, id: i64, bookmarked: bool) -> Result<Application>;

    /// Sets the status, closes the open stage and opens the next one as one
    /// unit. `Conflict` if the stored status is no longer `expected_status`.
    async fn rotate_stage(&self, rotation: StageRotation) -> Result<(Application, Stage)>;

    /// Hard delete with cascade; returns the number of applications removed.
    async fn delete_applications(&self, ids: &[i64]) -> Result<u64>;

    // stages

    async fn get_stage(&self, id: i64) -> Result<Option<Stage>>;

    async fn current_stage(&self, application_id: i64) -> Result<Option<Stage>>;

    /// All stages of one application, oldest first.
    async fn stage_history(&self, application_id: i64) -> Result<Vec<Stage>>;

    /// Closes an open stage. `InvalidTransition` if it is already closed.
    async fn complete_stage(&self, stage_id: i64, notes: Option<String>, at: DateTime<Utc>) -> Result<Stage>;

    /// Removes a closed stage and clears note/interview references to it.
    async fn delete_stage(&self, stage_id: i64) -> Result<()>;

    async fn completed_stages(&self, scope: AnalyticsScope) -> Result<Vec<Stage>>;

    async fn stage_visits(&self, scope: AnalyticsScope) -> Result<Vec<StageVisit>>;

    // interviews

    async fn create_interview(&self, new: NewInterview) -> Result<Interview>;

    async fn get_interview(&self, id: i64) -> Result<Option<Interview>>;

    async fn list_interviews(&self, application_id: i64) -> Result<Vec<Interview>>;

    async fn interviews_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        status: Option<InterviewStatus>,
    ) -> Result<Vec<Interview>>;

    /// Writes `interview` if the stored status still equals `expected` and the
    /// stored `version` still equals `interview.version`. `stage_id` is never
    /// rewritten. The returned row carries the bumped version.
    async fn save_interview(&self, interview: &Interview, expected: InterviewStatus) -> Result<Interview>;

    async fn delete_interview(&self, id: i64) -> Result<()>;

    // notes

    async fn create_note(&self, new: NewNote) -> Result<Note>;

    async fn get_note(&self, id: i64) -> Result<Option<Note>>;

    /// Pinned notes first, then newest first.
    async fn list_notes(&self, application_id: i64, filter: NoteFilter) -> Result<Vec<Note>>;

    /// Updates content, type, visibility, sentiment and pin state only.
    async fn save_note(&self, note: &Note) -> Result<Note>;

    async fn delete_note(&self, id: i64) -> Result<()>;

    // documents

    async fn create_document(&self, new: NewDocument) -> Result<Document>;

    async fn get_document(&self, id: i64) -> Result<Option<Document>>;

    async fn list_documents(&self, application_id: i64) -> Result<Vec<Document>>;

    async fn save_document(&self, document: &Document) -> Result<Document>;

    async fn delete_document(&self, id: i64) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_request_clamps_inputs() {
        let page = PageRequest::new(Some(0), Some(1000));
        assert_eq!(page.page, 1);
        assert_eq!(page.limit, MAX_PAGE_LIMIT);
        assert_eq!(page.offset(), 0);

        let page = PageRequest::new(Some(3), None);
        assert_eq!(page.limit, DEFAULT_PAGE_LIMIT);
        assert_eq!(page.offset(), 40);
    }

    #[test]
    fn huge_page_numbers_do_not_overflow_the_offset() {
        let page = PageRequest::new(Some(i64::MAX / 50), Some(100));
        assert_eq!(page.page, MAX_PAGE);
        assert_eq!(page.offset(), (MAX_PAGE - 1) * 100);

        let raw = PageRequest { page: i64::MAX, limit: MAX_PAGE_LIMIT };
        assert_eq!(raw.offset(), i64::MAX);

        let negative = PageRequest { page: i64::MIN, limit: MAX_PAGE_LIMIT };
        assert_eq!(negative.offset(), 0);
    }
}
