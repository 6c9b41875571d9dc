use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};

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

const APPLICATION_COLUMNS: &str = "id, job_id, user_id, company_id, status, match_score, source, \
     viewed_by_employer, is_bookmarked, applied_at, created_at, updated_at";

const STAGE_COLUMNS: &str =
    "id, application_id, stage_name, started_at, completed_at, duration_seconds, handled_by, notes";

const INTERVIEW_COLUMNS: &str = "id, application_id, stage_id, interviewer_id, scheduled_at, ended_at, \
     duration_minutes, interview_type, status, location, meeting_link, overall_score, technical_score, \
     communication_score, personality_score, remarks, reschedule_reason, cancel_reason, reminder_sent_at, \
     version, created_at, updated_at";

const NOTE_COLUMNS: &str = "id, application_id, stage_id, author_id, content, note_type, visibility, \
     sentiment, is_pinned, created_at, updated_at";

const DOCUMENT_COLUMNS: &str = "id, application_id, uploaded_by, document_type, file_name, file_url, \
     file_type, file_size, is_verified, verified_by, verified_at, created_at";

const APPLICATION_FILTER: &str = r#"
    ($1::bigint IS NULL OR job_id = $1)
    AND ($2::bigint IS NULL OR company_id = $2)
    AND ($3::bigint IS NULL OR user_id = $3)
    AND ($4::application_status IS NULL OR status = $4)
    AND ($5::text IS NULL OR source = $5)
    AND ($6::boolean IS NULL OR is_bookmarked = $6)
    AND ($7::boolean IS NULL OR viewed_by_employer = $7)
    AND ($8::numeric IS NULL OR match_score >= $8)
    AND ($9::timestamptz IS NULL OR applied_at >= $9)
    AND ($10::timestamptz IS NULL OR applied_at < $10)
"#;

const SCOPE_FILTER: &str =
    "($1::bigint IS NULL OR a.company_id = $1) AND ($2::bigint IS NULL OR a.job_id = $2)";

#[derive(Clone)]
pub struct PgApplicationStore {
    pool: PgPool,
}

impl PgApplicationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert_document(tx: &mut Transaction<'_, Postgres>, new: &NewDocument) -> Result<Document> {
        let sql = format!(
            r#"
            INSERT INTO application_documents
                (application_id, uploaded_by, document_type, file_name, file_url, file_type, file_size)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            DOCUMENT_COLUMNS
        );
        let document = sqlx::query_as::<_, Document>(&sql)
            .bind(new.application_id)
            .bind(new.uploaded_by)
            .bind(new.document_type)
            .bind(&new.file_name)
            .bind(&new.file_url)
            .bind(&new.file_type)
            .bind(new.file_size)
            .fetch_one(&mut **tx)
            .await?;
        Ok(document)
    }
}

fn bind_filter<'q, O>(
    query: sqlx::query::QueryAs<'q, Postgres, O, sqlx::postgres::PgArguments>,
    filter: &'q ApplicationFilter,
) -> sqlx::query::QueryAs<'q, Postgres, O, sqlx::postgres::PgArguments> {
    query
        .bind(filter.job_id)
        .bind(filter.company_id)
        .bind(filter.user_id)
        .bind(filter.status)
        .bind(filter.source.as_deref())
        .bind(filter.is_bookmarked)
        .bind(filter.viewed_by_employer)
        .bind(filter.min_match_score)
        .bind(filter.applied_from)
        .bind(filter.applied_to)
}

fn map_write_error(err: sqlx::Error, new: &NewApplication) -> Error {
    if let sqlx::Error::Database(db) = &err {
        match db.constraint() {
            Some("applications_job_user_key") => {
                return Error::DuplicateApplication {
                    job_id: new.job_id,
                    user_id: new.user_id,
                }
            }
            Some("idx_application_stages_open") => {
                return Error::Conflict("Application already has an open stage".to_string())
            }
            _ => {}
        }
    }
    err.into()
}

fn map_stage_error(err: sqlx::Error) -> Error {
    if let sqlx::Error::Database(db) = &err {
        if db.constraint() == Some("idx_application_stages_open") {
            return Error::Conflict("Application already has an open stage".to_string());
        }
    }
    err.into()
}

#[async_trait]
impl ApplicationStore for PgApplicationStore {
    async fn create_application(
        &self,
        new: NewApplication,
        documents: Vec<NewDocument>,
    ) -> Result<(Application, Stage, Vec<Document>)> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            r#"
            INSERT INTO applications (job_id, user_id, company_id, status, match_score, source, applied_at)
            VALUES ($1, $2, $3, 'applied', $4, $5, $6)
            RETURNING {}
            "#,
            APPLICATION_COLUMNS
        );
        let application = sqlx::query_as::<_, Application>(&sql)
            .bind(new.job_id)
            .bind(new.user_id)
            .bind(new.company_id)
            .bind(new.match_score)
            .bind(&new.source)
            .bind(new.applied_at)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| map_write_error(e, &new))?;

        let sql = format!(
            r#"
            INSERT INTO application_stages (application_id, stage_name, started_at)
            VALUES ($1, 'applied', $2)
            RETURNING {}
            "#,
            STAGE_COLUMNS
        );
        let stage = sqlx::query_as::<_, Stage>(&sql)
            .bind(application.id)
            .bind(new.applied_at)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| map_write_error(e, &new))?;

        let mut docs = Vec::with_capacity(documents.len());
        for mut document in documents {
            document.application_id = application.id;
            docs.push(Self::insert_document(&mut tx, &document).await?);
        }

        tx.commit().await?;
        Ok((application, stage, docs))
    }

    async fn get_application(&self, id: i64) -> Result<Option<Application>> {
        let sql = format!("SELECT {} FROM applications WHERE id = $1", APPLICATION_COLUMNS);
        let app = sqlx::query_as::<_, Application>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(app)
    }

    async fn list_applications(
        &self,
        filter: &ApplicationFilter,
        sort: ApplicationSort,
        page: PageRequest,
    ) -> Result<Page<Application>> {
        let order = match sort {
            ApplicationSort::NewestFirst => "applied_at DESC, id DESC",
            ApplicationSort::BestMatch => "match_score DESC, applied_at ASC, id ASC",
        };
        let sql = format!(
            "SELECT {} FROM applications WHERE {} ORDER BY {} LIMIT $11 OFFSET $12",
            APPLICATION_COLUMNS, APPLICATION_FILTER, order
        );
        let items = bind_filter(sqlx::query_as::<_, Application>(&sql), filter)
            .bind(page.limit)
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        let count_sql = format!("SELECT COUNT(*) FROM applications WHERE {}", APPLICATION_FILTER);
        let (total,): (i64,) = bind_filter(sqlx::query_as::<_, (i64,)>(&count_sql), filter)
            .fetch_one(&self.pool)
            .await?;

        Ok(Page {
            items,
            total,
            page: page.page,
            limit: page.limit,
        })
    }

    async fn scan_applications(&self, filter: &ApplicationFilter) -> Result<Vec<Application>> {
        let sql = format!(
            "SELECT {} FROM applications WHERE {} ORDER BY applied_at ASC, id ASC",
            APPLICATION_COLUMNS, APPLICATION_FILTER
        );
        let apps = bind_filter(sqlx::query_as::<_, Application>(&sql), filter)
            .fetch_all(&self.pool)
            .await?;
        Ok(apps)
    }

    async fn mark_viewed(&self, id: i64) -> Result<Application> {
        let sql = format!(
            r#"
            UPDATE applications
            SET viewed_by_employer = TRUE,
                updated_at = CASE WHEN viewed_by_employer THEN updated_at ELSE NOW() END
            WHERE id = $1
            RETURNING {}
            "#,
            APPLICATION_COLUMNS
        );
        sqlx::query_as::<_, Application>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Application {} not found", id)))
    }

    async fn set_bookmark(&self, id: i64, bookmarked: bool) -> Result<Application> {
        let sql = format!(
            "UPDATE applications SET is_bookmarked = $1, updated_at = NOW() WHERE id = $2 RETURNING {}",
            APPLICATION_COLUMNS
        );
        sqlx::query_as::<_, Application>(&sql)
            .bind(bookmarked)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Application {} not found", id)))
    }

    async fn rotate_stage(&self, rotation: StageRotation) -> Result<(Application, Stage)> {
        let mut tx = self.pool.begin().await?;

        let current: Option<ApplicationStatus> =
            sqlx::query_scalar("SELECT status FROM applications WHERE id = $1 FOR UPDATE")
                .bind(rotation.application_id)
                .fetch_optional(&mut *tx)
                .await?;
        let current = current.ok_or_else(|| {
            Error::NotFound(format!("Application {} not found", rotation.application_id))
        })?;
        if current != rotation.expected_status {
            return Err(Error::Conflict(format!(
                "Application {} moved to {} while changing from {}",
                rotation.application_id, current, rotation.expected_status
            )));
        }

        sqlx::query(
            r#"
            UPDATE application_stages
            SET completed_at = GREATEST($2, started_at),
                duration_seconds = EXTRACT(EPOCH FROM (GREATEST($2, started_at) - started_at))::bigint
            WHERE application_id = $1 AND completed_at IS NULL
            "#,
        )
        .bind(rotation.application_id)
        .bind(rotation.at)
        .execute(&mut *tx)
        .await?;

        let sql = format!(
            r#"
            INSERT INTO application_stages (application_id, stage_name, started_at, handled_by, notes)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            STAGE_COLUMNS
        );
        let stage = sqlx::query_as::<_, Stage>(&sql)
            .bind(rotation.application_id)
            .bind(rotation.target)
            .bind(rotation.at)
            .bind(rotation.actor_id)
            .bind(merge_notes(None, rotation.notes.as_deref()))
            .fetch_one(&mut *tx)
            .await
            .map_err(map_stage_error)?;

        let sql = format!(
            "UPDATE applications SET status = $1, updated_at = $2 WHERE id = $3 RETURNING {}",
            APPLICATION_COLUMNS
        );
        let application = sqlx::query_as::<_, Application>(&sql)
            .bind(rotation.target)
            .bind(rotation.at)
            .bind(rotation.application_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok((application, stage))
    }

    async fn delete_applications(&self, ids: &[i64]) -> Result<u64> {
        let result = sqlx::query("DELETE FROM applications WHERE id = ANY($1)")
            .bind(ids.to_vec())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn get_stage(&self, id: i64) -> Result<Option<Stage>> {
        let sql = format!("SELECT {} FROM application_stages WHERE id = $1", STAGE_COLUMNS);
        let stage = sqlx::query_as::<_, Stage>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(stage)
    }

    async fn current_stage(&self, application_id: i64) -> Result<Option<Stage>> {
        let sql = format!(
            "SELECT {} FROM application_stages WHERE application_id = $1 AND completed_at IS NULL",
            STAGE_COLUMNS
        );
        let stage = sqlx::query_as::<_, Stage>(&sql)
            .bind(application_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(stage)
    }

    async fn stage_history(&self, application_id: i64) -> Result<Vec<Stage>> {
        let sql = format!(
            "SELECT {} FROM application_stages WHERE application_id = $1 ORDER BY started_at ASC, id ASC",
            STAGE_COLUMNS
        );
        let stages = sqlx::query_as::<_, Stage>(&sql)
            .bind(application_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(stages)
    }

    async fn complete_stage(&self, stage_id: i64, notes: Option<String>, at: DateTime<Utc>) -> Result<Stage> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "SELECT {} FROM application_stages WHERE id = $1 FOR UPDATE",
            STAGE_COLUMNS
        );
        let mut stage = sqlx::query_as::<_, Stage>(&sql)
            .bind(stage_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Stage {} not found", stage_id)))?;
        if !stage.is_open() {
            return Err(Error::InvalidTransition(format!(
                "Stage {} is already completed",
                stage_id
            )));
        }
        stage.close(at, notes.as_deref());

        sqlx::query(
            "UPDATE application_stages SET completed_at = $1, duration_seconds = $2, notes = $3 WHERE id = $4",
        )
        .bind(stage.completed_at)
        .bind(stage.duration_seconds)
        .bind(&stage.notes)
        .bind(stage.id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(stage)
    }

    async fn delete_stage(&self, stage_id: i64) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let completed_at: Option<Option<DateTime<Utc>>> =
            sqlx::query_scalar("SELECT completed_at FROM application_stages WHERE id = $1 FOR UPDATE")
                .bind(stage_id)
                .fetch_optional(&mut *tx)
                .await?;
        match completed_at {
            None => return Err(Error::NotFound(format!("Stage {} not found", stage_id))),
            Some(None) => {
                return Err(Error::InvalidTransition(format!(
                    "Stage {} is the current stage and cannot be deleted",
                    stage_id
                )))
            }
            Some(Some(_)) => {}
        }

        // stage_id foreign keys are ON DELETE SET NULL
        sqlx::query("DELETE FROM application_stages WHERE id = $1")
            .bind(stage_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn completed_stages(&self, scope: AnalyticsScope) -> Result<Vec<Stage>> {
        let sql = format!(
            r#"
            SELECT s.id, s.application_id, s.stage_name, s.started_at, s.completed_at,
                   s.duration_seconds, s.handled_by, s.notes
            FROM application_stages s
            JOIN applications a ON a.id = s.application_id
            WHERE s.completed_at IS NOT NULL AND {}
            "#,
            SCOPE_FILTER
        );
        let stages = sqlx::query_as::<_, Stage>(&sql)
            .bind(scope.company_id)
            .bind(scope.job_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(stages)
    }

    async fn stage_visits(&self, scope: AnalyticsScope) -> Result<Vec<StageVisit>> {
        let sql = format!(
            r#"
            SELECT DISTINCT s.application_id, s.stage_name
            FROM application_stages s
            JOIN applications a ON a.id = s.application_id
            WHERE {}
            "#,
            SCOPE_FILTER
        );
        let rows = sqlx::query_as::<_, (i64, ApplicationStatus)>(&sql)
            .bind(scope.company_id)
            .bind(scope.job_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(|(application_id, stage_name)| StageVisit {
                application_id,
                stage_name,
            })
            .collect())
    }

    async fn create_interview(&self, new: NewInterview) -> Result<Interview> {
        let sql = format!(
            r#"
            INSERT INTO interviews
                (application_id, stage_id, interviewer_id, scheduled_at, duration_minutes,
                 interview_type, status, location, meeting_link)
            VALUES ($1, $2, $3, $4, $5, $6, 'scheduled', $7, $8)
            RETURNING {}
            "#,
            INTERVIEW_COLUMNS
        );
        let interview = sqlx::query_as::<_, Interview>(&sql)
            .bind(new.application_id)
            .bind(new.stage_id)
            .bind(new.interviewer_id)
            .bind(new.scheduled_at)
            .bind(new.duration_minutes)
            .bind(new.interview_type)
            .bind(&new.location)
            .bind(&new.meeting_link)
            .fetch_one(&self.pool)
            .await?;
        Ok(interview)
    }

    async fn get_interview(&self, id: i64) -> Result<Option<Interview>> {
        let sql = format!("SELECT {} FROM interviews WHERE id = $1", INTERVIEW_COLUMNS);
        let interview = sqlx::query_as::<_, Interview>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(interview)
    }

    async fn list_interviews(&self, application_id: i64) -> Result<Vec<Interview>> {
        let sql = format!(
            "SELECT {} FROM interviews WHERE application_id = $1 ORDER BY scheduled_at ASC, id ASC",
            INTERVIEW_COLUMNS
        );
        let interviews = sqlx::query_as::<_, Interview>(&sql)
            .bind(application_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(interviews)
    }

    async fn interviews_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        status: Option<InterviewStatus>,
    ) -> Result<Vec<Interview>> {
        let sql = format!(
            r#"
            SELECT {} FROM interviews
            WHERE scheduled_at >= $1 AND scheduled_at < $2
              AND ($3::interview_status IS NULL OR status = $3)
            ORDER BY scheduled_at ASC, id ASC
            "#,
            INTERVIEW_COLUMNS
        );
        let interviews = sqlx::query_as::<_, Interview>(&sql)
            .bind(from)
            .bind(to)
            .bind(status)
            .fetch_all(&self.pool)
            .await?;
        Ok(interviews)
    }

    async fn save_interview(&self, interview: &Interview, expected: InterviewStatus) -> Result<Interview> {
        let sql = format!(
            r#"
            UPDATE interviews SET
                interviewer_id = $4, scheduled_at = $5, ended_at = $6,
                duration_minutes = $7, interview_type = $8, status = $9, location = $10,
                meeting_link = $11, overall_score = $12, technical_score = $13,
                communication_score = $14, personality_score = $15, remarks = $16,
                reschedule_reason = $17, cancel_reason = $18, reminder_sent_at = $19,
                version = version + 1, updated_at = NOW()
            WHERE id = $1 AND status = $2 AND version = $3
            RETURNING {}
            "#,
            INTERVIEW_COLUMNS
        );
        let saved = sqlx::query_as::<_, Interview>(&sql)
            .bind(interview.id)
            .bind(expected)
            .bind(interview.version)
            .bind(interview.interviewer_id)
            .bind(interview.scheduled_at)
            .bind(interview.ended_at)
            .bind(interview.duration_minutes)
            .bind(interview.interview_type)
            .bind(interview.status)
            .bind(&interview.location)
            .bind(&interview.meeting_link)
            .bind(interview.overall_score)
            .bind(interview.technical_score)
            .bind(interview.communication_score)
            .bind(interview.personality_score)
            .bind(&interview.remarks)
            .bind(&interview.reschedule_reason)
            .bind(&interview.cancel_reason)
            .bind(interview.reminder_sent_at)
            .fetch_optional(&self.pool)
            .await?;

        match saved {
            Some(row) => Ok(row),
            None => match self.get_interview(interview.id).await? {
                Some(current) => Err(Error::Conflict(format!(
                    "Interview {} changed to {:?} concurrently",
                    interview.id, current.status
                ))),
                None => Err(Error::NotFound(format!("Interview {} not found", interview.id))),
            },
        }
    }

    async fn delete_interview(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM interviews WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Interview {} not found", id)));
        }
        Ok(())
    }

    async fn create_note(&self, new: NewNote) -> Result<Note> {
        let sql = format!(
            r#"
            INSERT INTO application_notes
                (application_id, stage_id, author_id, content, note_type, visibility, sentiment, is_pinned)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            NOTE_COLUMNS
        );
        let note = sqlx::query_as::<_, Note>(&sql)
            .bind(new.application_id)
            .bind(new.stage_id)
            .bind(new.author_id)
            .bind(&new.content)
            .bind(new.note_type)
            .bind(new.visibility)
            .bind(new.sentiment)
            .bind(new.is_pinned)
            .fetch_one(&self.pool)
            .await?;
        Ok(note)
    }

    async fn get_note(&self, id: i64) -> Result<Option<Note>> {
        let sql = format!("SELECT {} FROM application_notes WHERE id = $1", NOTE_COLUMNS);
        let note = sqlx::query_as::<_, Note>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(note)
    }

    async fn list_notes(&self, application_id: i64, filter: NoteFilter) -> Result<Vec<Note>> {
        let sql = format!(
            r#"
            SELECT {} FROM application_notes
            WHERE application_id = $1
              AND ($2::bigint IS NULL OR stage_id = $2)
              AND (NOT $3 OR is_pinned)
              AND ($4::note_visibility IS NULL OR visibility = $4)
            ORDER BY is_pinned DESC, created_at DESC, id DESC
            "#,
            NOTE_COLUMNS
        );
        let notes = sqlx::query_as::<_, Note>(&sql)
            .bind(application_id)
            .bind(filter.stage_id)
            .bind(filter.pinned_only)
            .bind(filter.visibility)
            .fetch_all(&self.pool)
            .await?;
        Ok(notes)
    }

    async fn save_note(&self, note: &Note) -> Result<Note> {
        let sql = format!(
            r#"
            UPDATE application_notes
            SET content = $2, note_type = $3, visibility = $4, sentiment = $5,
                is_pinned = $6, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            NOTE_COLUMNS
        );
        sqlx::query_as::<_, Note>(&sql)
            .bind(note.id)
            .bind(&note.content)
            .bind(note.note_type)
            .bind(note.visibility)
            .bind(note.sentiment)
            .bind(note.is_pinned)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Note {} not found", note.id)))
    }

    async fn delete_note(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM application_notes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Note {} not found", id)));
        }
        Ok(())
    }

    async fn create_document(&self, new: NewDocument) -> Result<Document> {
        let mut tx = self.pool.begin().await?;
        let document = Self::insert_document(&mut tx, &new).await?;
        tx.commit().await?;
        Ok(document)
    }

    async fn get_document(&self, id: i64) -> Result<Option<Document>> {
        let sql = format!("SELECT {} FROM application_documents WHERE id = $1", DOCUMENT_COLUMNS);
        let document = sqlx::query_as::<_, Document>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(document)
    }

    async fn list_documents(&self, application_id: i64) -> Result<Vec<Document>> {
        let sql = format!(
            "SELECT {} FROM application_documents WHERE application_id = $1 ORDER BY created_at ASC, id ASC",
            DOCUMENT_COLUMNS
        );
        let documents = sqlx::query_as::<_, Document>(&sql)
            .bind(application_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(documents)
    }

    async fn save_document(&self, document: &Document) -> Result<Document> {
        let sql = format!(
            r#"
            UPDATE application_documents
            SET document_type = $2, file_name = $3, file_url = $4, file_type = $5, file_size = $6,
                is_verified = $7, verified_by = $8, verified_at = $9
            WHERE id = $1
            RETURNING {}
            "#,
            DOCUMENT_COLUMNS
        );
        sqlx::query_as::<_, Document>(&sql)
            .bind(document.id)
            .bind(document.document_type)
            .bind(&document.file_name)
            .bind(&document.file_url)
            .bind(&document.file_type)
            .bind(document.file_size)
            .bind(document.is_verified)
            .bind(document.verified_by)
            .bind(document.verified_at)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Document {} not found", document.id)))
    }

    async fn delete_document(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM application_documents WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Document {} not found", id)));
        }
        Ok(())
    }
}
