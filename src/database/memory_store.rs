//! In-process [`ApplicationStore`] guarded by a single async mutex.
//!
//! Every call takes the lock once, validates, then mutates, so multi-row
//! operations are all-or-nothing and concurrent rotations on the same
//! application are serialized.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use super::store::{
    AnalyticsScope, ApplicationFilter, ApplicationSort, ApplicationStore, NewApplication,
    NewDocument, NewInterview, NewNote, NoteFilter, Page, PageRequest, StageRotation, StageVisit,
};
use crate::error::{Error, Result};
use crate::models::application::{Application, ApplicationStatus};
use crate::models::document::Document;
use crate::models::interview::{Interview, InterviewStatus};
use crate::models::note::Note;
use crate::models::stage::{merge_notes, Stage};

#[derive(Debug, Default)]
struct Tables {
    applications: BTreeMap<i64, Application>,
    stages: BTreeMap<i64, Stage>,
    interviews: BTreeMap<i64, Interview>,
    notes: BTreeMap<i64, Note>,
    documents: BTreeMap<i64, Document>,
    last_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn application(&self, id: i64) -> Result<&Application> {
        self.applications
            .get(&id)
            .ok_or_else(|| Error::NotFound(format!("Application {} not found", id)))
    }

    fn open_stage_id(&self, application_id: i64) -> Option<i64> {
        self.stages
            .values()
            .find(|s| s.application_id == application_id && s.is_open())
            .map(|s| s.id)
    }

    fn in_scope(&self, application_id: i64, scope: &AnalyticsScope) -> bool {
        self.applications
            .get(&application_id)
            .map_or(false, |app| scope.as_filter().matches(app))
    }

    fn insert_document(&mut self, new: NewDocument) -> Document {
        let document = Document {
            id: self.next_id(),
            application_id: new.application_id,
            uploaded_by: new.uploaded_by,
            document_type: new.document_type,
            file_name: new.file_name,
            file_url: new.file_url,
            file_type: new.file_type,
            file_size: new.file_size,
            is_verified: false,
            verified_by: None,
            verified_at: None,
            created_at: Utc::now(),
        };
        self.documents.insert(document.id, document.clone());
        document
    }
}

#[derive(Debug, Default)]
pub struct MemoryApplicationStore {
    tables: Mutex<Tables>,
}

impl MemoryApplicationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn sort_applications(apps: &mut [Application], sort: ApplicationSort) {
    match sort {
        ApplicationSort::NewestFirst => {
            apps.sort_by(|a, b| b.applied_at.cmp(&a.applied_at).then(b.id.cmp(&a.id)))
        }
        ApplicationSort::BestMatch => apps.sort_by(|a, b| {
            b.match_score
                .cmp(&a.match_score)
                .then(a.applied_at.cmp(&b.applied_at))
                .then(a.id.cmp(&b.id))
        }),
    }
}

#[async_trait]
impl ApplicationStore for MemoryApplicationStore {
    async fn create_application(
        &self,
        new: NewApplication,
        documents: Vec<NewDocument>,
    ) -> Result<(Application, Stage, Vec<Document>)> {
        let mut t = self.tables.lock().await;
        if t
            .applications
            .values()
            .any(|a| a.job_id == new.job_id && a.user_id == new.user_id)
        {
            return Err(Error::DuplicateApplication {
                job_id: new.job_id,
                user_id: new.user_id,
            });
        }

        let now = Utc::now();
        let application = Application {
            id: t.next_id(),
            job_id: new.job_id,
            user_id: new.user_id,
            company_id: new.company_id,
            status: ApplicationStatus::Applied,
            match_score: new.match_score,
            source: new.source,
            viewed_by_employer: false,
            is_bookmarked: false,
            applied_at: new.applied_at,
            created_at: now,
            updated_at: now,
        };
        let stage = Stage {
            id: t.next_id(),
            application_id: application.id,
            stage_name: ApplicationStatus::Applied,
            started_at: new.applied_at,
            completed_at: None,
            duration_seconds: None,
            handled_by: None,
            notes: None,
        };
        t.applications.insert(application.id, application.clone());
        t.stages.insert(stage.id, stage.clone());

        let docs = documents
            .into_iter()
            .map(|mut d| {
                d.application_id = application.id;
                t.insert_document(d)
            })
            .collect();

        Ok((application, stage, docs))
    }

    async fn get_application(&self, id: i64) -> Result<Option<Application>> {
        Ok(self.tables.lock().await.applications.get(&id).cloned())
    }

    async fn list_applications(
        &self,
        filter: &ApplicationFilter,
        sort: ApplicationSort,
        page: PageRequest,
    ) -> Result<Page<Application>> {
        let mut matching = self.scan_applications(filter).await?;
        sort_applications(&mut matching, sort);
        let total = matching.len() as i64;
        let items = matching
            .into_iter()
            .skip(usize::try_from(page.offset()).unwrap_or(usize::MAX))
            .take(page.limit as usize)
            .collect();
        Ok(Page {
            items,
            total,
            page: page.page,
            limit: page.limit,
        })
    }

    async fn scan_applications(&self, filter: &ApplicationFilter) -> Result<Vec<Application>> {
        let t = self.tables.lock().await;
        Ok(t
            .applications
            .values()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect())
    }

    async fn mark_viewed(&self, id: i64) -> Result<Application> {
        let mut t = self.tables.lock().await;
        let app = t
            .applications
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound(format!("Application {} not found", id)))?;
        if !app.viewed_by_employer {
            app.viewed_by_employer = true;
            app.updated_at = Utc::now();
        }
        Ok(app.clone())
    }

    async fn set_bookmark(&self, id: i64, bookmarked: bool) -> Result<Application> {
        let mut t = self.tables.lock().await;
        let app = t
            .applications
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound(format!("Application {} not found", id)))?;
        app.is_bookmarked = bookmarked;
        app.updated_at = Utc::now();
        Ok(app.clone())
    }

    async fn rotate_stage(&self, rotation: StageRotation) -> Result<(Application, Stage)> {
        let mut t = self.tables.lock().await;
        let current = t.application(rotation.application_id)?.status;
        if current != rotation.expected_status {
            return Err(Error::Conflict(format!(
                "Application {} moved to {} while changing from {}",
                rotation.application_id, current, rotation.expected_status
            )));
        }

        let open_id = t.open_stage_id(rotation.application_id);
        if let Some(stage) = open_id.and_then(|id| t.stages.get_mut(&id)) {
            stage.close(rotation.at, None);
        }

        let stage = Stage {
            id: t.next_id(),
            application_id: rotation.application_id,
            stage_name: rotation.target,
            started_at: rotation.at,
            completed_at: None,
            duration_seconds: None,
            handled_by: rotation.actor_id,
            notes: merge_notes(None, rotation.notes.as_deref()),
        };
        t.stages.insert(stage.id, stage.clone());

        let app = t
            .applications
            .get_mut(&rotation.application_id)
            .ok_or_else(|| Error::NotFound(format!("Application {} not found", rotation.application_id)))?;
        app.status = rotation.target;
        app.updated_at = rotation.at;
        Ok((app.clone(), stage))
    }

    async fn delete_applications(&self, ids: &[i64]) -> Result<u64> {
        let mut t = self.tables.lock().await;
        let mut removed = 0;
        for id in ids {
            if t.applications.remove(id).is_some() {
                removed += 1;
            }
        }
        t.stages.retain(|_, s| !ids.contains(&s.application_id));
        t.interviews.retain(|_, i| !ids.contains(&i.application_id));
        t.notes.retain(|_, n| !ids.contains(&n.application_id));
        t.documents.retain(|_, d| !ids.contains(&d.application_id));
        Ok(removed)
    }

    async fn get_stage(&self, id: i64) -> Result<Option<Stage>> {
        Ok(self.tables.lock().await.stages.get(&id).cloned())
    }

    async fn current_stage(&self, application_id: i64) -> Result<Option<Stage>> {
        let t = self.tables.lock().await;
        Ok(t.open_stage_id(application_id)
            .and_then(|id| t.stages.get(&id))
            .cloned())
    }

    async fn stage_history(&self, application_id: i64) -> Result<Vec<Stage>> {
        let t = self.tables.lock().await;
        let mut stages: Vec<Stage> = t
            .stages
            .values()
            .filter(|s| s.application_id == application_id)
            .cloned()
            .collect();
        stages.sort_by(|a, b| a.started_at.cmp(&b.started_at).then(a.id.cmp(&b.id)));
        Ok(stages)
    }

    async fn complete_stage(&self, stage_id: i64, notes: Option<String>, at: DateTime<Utc>) -> Result<Stage> {
        let mut t = self.tables.lock().await;
        let stage = t
            .stages
            .get_mut(&stage_id)
            .ok_or_else(|| Error::NotFound(format!("Stage {} not found", stage_id)))?;
        if !stage.is_open() {
            return Err(Error::InvalidTransition(format!(
                "Stage {} is already completed",
                stage_id
            )));
        }
        stage.close(at, notes.as_deref());
        Ok(stage.clone())
    }

    async fn delete_stage(&self, stage_id: i64) -> Result<()> {
        let mut t = self.tables.lock().await;
        let stage = t
            .stages
            .get(&stage_id)
            .ok_or_else(|| Error::NotFound(format!("Stage {} not found", stage_id)))?;
        if stage.is_open() {
            return Err(Error::InvalidTransition(format!(
                "Stage {} is the current stage and cannot be deleted",
                stage_id
            )));
        }
        t.stages.remove(&stage_id);
        for note in t.notes.values_mut().filter(|n| n.stage_id == Some(stage_id)) {
            note.stage_id = None;
        }
        for interview in t.interviews.values_mut().filter(|i| i.stage_id == Some(stage_id)) {
            interview.stage_id = None;
        }
        Ok(())
    }

    async fn completed_stages(&self, scope: AnalyticsScope) -> Result<Vec<Stage>> {
        let t = self.tables.lock().await;
        Ok(t
            .stages
            .values()
            .filter(|s| !s.is_open() && t.in_scope(s.application_id, &scope))
            .cloned()
            .collect())
    }

    async fn stage_visits(&self, scope: AnalyticsScope) -> Result<Vec<StageVisit>> {
        let t = self.tables.lock().await;
        Ok(t
            .stages
            .values()
            .filter(|s| t.in_scope(s.application_id, &scope))
            .map(|s| StageVisit {
                application_id: s.application_id,
                stage_name: s.stage_name,
            })
            .collect())
    }

    async fn create_interview(&self, new: NewInterview) -> Result<Interview> {
        let mut t = self.tables.lock().await;
        t.application(new.application_id)?;
        let now = Utc::now();
        let interview = Interview {
            id: t.next_id(),
            application_id: new.application_id,
            stage_id: new.stage_id,
            interviewer_id: new.interviewer_id,
            scheduled_at: new.scheduled_at,
            ended_at: None,
            duration_minutes: new.duration_minutes,
            interview_type: new.interview_type,
            status: InterviewStatus::Scheduled,
            location: new.location,
            meeting_link: new.meeting_link,
            overall_score: None,
            technical_score: None,
            communication_score: None,
            personality_score: None,
            remarks: None,
            reschedule_reason: None,
            cancel_reason: None,
            reminder_sent_at: None,
            version: 0,
            created_at: now,
            updated_at: now,
        };
        t.interviews.insert(interview.id, interview.clone());
        Ok(interview)
    }

    async fn get_interview(&self, id: i64) -> Result<Option<Interview>> {
        Ok(self.tables.lock().await.interviews.get(&id).cloned())
    }

    async fn list_interviews(&self, application_id: i64) -> Result<Vec<Interview>> {
        let t = self.tables.lock().await;
        let mut interviews: Vec<Interview> = t
            .interviews
            .values()
            .filter(|i| i.application_id == application_id)
            .cloned()
            .collect();
        interviews.sort_by(|a, b| a.scheduled_at.cmp(&b.scheduled_at).then(a.id.cmp(&b.id)));
        Ok(interviews)
    }

    async fn interviews_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        status: Option<InterviewStatus>,
    ) -> Result<Vec<Interview>> {
        let t = self.tables.lock().await;
        let mut interviews: Vec<Interview> = t
            .interviews
            .values()
            .filter(|i| i.scheduled_at >= from && i.scheduled_at < to)
            .filter(|i| status.map_or(true, |s| i.status == s))
            .cloned()
            .collect();
        interviews.sort_by(|a, b| a.scheduled_at.cmp(&b.scheduled_at).then(a.id.cmp(&b.id)));
        Ok(interviews)
    }

    async fn save_interview(&self, interview: &Interview, expected: InterviewStatus) -> Result<Interview> {
        let mut t = self.tables.lock().await;
        let stored = t
            .interviews
            .get_mut(&interview.id)
            .ok_or_else(|| Error::NotFound(format!("Interview {} not found", interview.id)))?;
        if stored.status != expected || stored.version != interview.version {
            return Err(Error::Conflict(format!(
                "Interview {} changed to {:?} concurrently",
                interview.id, stored.status
            )));
        }
        let mut updated = interview.clone();
        updated.stage_id = stored.stage_id;
        updated.version = stored.version + 1;
        updated.updated_at = Utc::now();
        *stored = updated.clone();
        Ok(updated)
    }

    async fn delete_interview(&self, id: i64) -> Result<()> {
        let mut t = self.tables.lock().await;
        t.interviews
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| Error::NotFound(format!("Interview {} not found", id)))
    }

    async fn create_note(&self, new: NewNote) -> Result<Note> {
        let mut t = self.tables.lock().await;
        t.application(new.application_id)?;
        let now = Utc::now();
        let note = Note {
            id: t.next_id(),
            application_id: new.application_id,
            stage_id: new.stage_id,
            author_id: new.author_id,
            content: new.content,
            note_type: new.note_type,
            visibility: new.visibility,
            sentiment: new.sentiment,
            is_pinned: new.is_pinned,
            created_at: now,
            updated_at: now,
        };
        t.notes.insert(note.id, note.clone());
        Ok(note)
    }

    async fn get_note(&self, id: i64) -> Result<Option<Note>> {
        Ok(self.tables.lock().await.notes.get(&id).cloned())
    }

    async fn list_notes(&self, application_id: i64, filter: NoteFilter) -> Result<Vec<Note>> {
        let t = self.tables.lock().await;
        let mut notes: Vec<Note> = t
            .notes
            .values()
            .filter(|n| n.application_id == application_id)
            .filter(|n| filter.stage_id.map_or(true, |s| n.stage_id == Some(s)))
            .filter(|n| !filter.pinned_only || n.is_pinned)
            .filter(|n| filter.visibility.map_or(true, |v| n.visibility == v))
            .cloned()
            .collect();
        notes.sort_by(|a, b| {
            b.is_pinned
                .cmp(&a.is_pinned)
                .then(b.created_at.cmp(&a.created_at))
                .then(b.id.cmp(&a.id))
        });
        Ok(notes)
    }

    async fn save_note(&self, note: &Note) -> Result<Note> {
        let mut t = self.tables.lock().await;
        let stored = t
            .notes
            .get_mut(&note.id)
            .ok_or_else(|| Error::NotFound(format!("Note {} not found", note.id)))?;
        stored.content = note.content.clone();
        stored.note_type = note.note_type;
        stored.visibility = note.visibility;
        stored.sentiment = note.sentiment;
        stored.is_pinned = note.is_pinned;
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn delete_note(&self, id: i64) -> Result<()> {
        let mut t = self.tables.lock().await;
        t.notes
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| Error::NotFound(format!("Note {} not found", id)))
    }

    async fn create_document(&self, new: NewDocument) -> Result<Document> {
        let mut t = self.tables.lock().await;
        t.application(new.application_id)?;
        Ok(t.insert_document(new))
    }

    async fn get_document(&self, id: i64) -> Result<Option<Document>> {
        Ok(self.tables.lock().await.documents.get(&id).cloned())
    }

    async fn list_documents(&self, application_id: i64) -> Result<Vec<Document>> {
        let t = self.tables.lock().await;
        Ok(t
            .documents
            .values()
            .filter(|d| d.application_id == application_id)
            .cloned()
            .collect())
    }

    async fn save_document(&self, document: &Document) -> Result<Document> {
        let mut t = self.tables.lock().await;
        let stored = t
            .documents
            .get_mut(&document.id)
            .ok_or_else(|| Error::NotFound(format!("Document {} not found", document.id)))?;
        *stored = document.clone();
        Ok(document.clone())
    }

    async fn delete_document(&self, id: i64) -> Result<()> {
        let mut t = self.tables.lock().await;
        t.documents
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| Error::NotFound(format!("Document {} not found", id)))
    }
}
