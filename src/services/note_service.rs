use std::sync::Arc;

use tracing::info;
use validator::Validate;

use crate::database::store::{ApplicationStore, NewNote, NoteFilter};
use crate::dto::note_dto::{CreateNotePayload, UpdateNotePayload};
use crate::error::{Error, Result};
use crate::models::note::{Note, NoteSentiment, NoteType, NoteVisibility};
use crate::services::transition_service::require_application;

#[derive(Clone)]
pub struct NoteService {
    store: Arc<dyn ApplicationStore>,
}

impl NoteService {
    pub fn new(store: Arc<dyn ApplicationStore>) -> Self {
        Self { store }
    }

    fn clean_content(content: &str) -> Result<String> {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Err(Error::Validation("Note content must not be empty".to_string()));
        }
        Ok(trimmed.to_string())
    }

    async fn load(&self, note_id: i64) -> Result<Note> {
        self.store
            .get_note(note_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Note {} not found", note_id)))
    }

    pub async fn create(&self, application_id: i64, author_id: i64, payload: CreateNotePayload) -> Result<Note> {
        payload.validate()?;
        let content = Self::clean_content(&payload.content)?;
        require_application(self.store.as_ref(), application_id).await?;
        if let Some(stage_id) = payload.stage_id {
            let belongs = self
                .store
                .get_stage(stage_id)
                .await?
                .map_or(false, |s| s.application_id == application_id);
            if !belongs {
                return Err(Error::Validation(format!(
                    "Stage {} does not belong to application {}",
                    stage_id, application_id
                )));
            }
        }

        let note = self
            .store
            .create_note(NewNote {
                application_id,
                stage_id: payload.stage_id,
                author_id,
                content,
                note_type: payload.note_type.unwrap_or(NoteType::Internal),
                visibility: payload.visibility.unwrap_or(NoteVisibility::Internal),
                sentiment: payload.sentiment.unwrap_or(NoteSentiment::Neutral),
                is_pinned: payload.is_pinned,
            })
            .await?;
        info!(note_id = note.id, application_id, author_id, "note created");
        Ok(note)
    }

    pub async fn get(&self, note_id: i64) -> Result<Note> {
        self.load(note_id).await
    }

    pub async fn update(&self, note_id: i64, payload: UpdateNotePayload) -> Result<Note> {
        payload.validate()?;
        let mut note = self.load(note_id).await?;
        if let Some(content) = payload.content.as_deref() {
            note.content = Self::clean_content(content)?;
        }
        if let Some(note_type) = payload.note_type {
            note.note_type = note_type;
        }
        if let Some(visibility) = payload.visibility {
            note.visibility = visibility;
        }
        if let Some(sentiment) = payload.sentiment {
            note.sentiment = sentiment;
        }
        self.store.save_note(&note).await
    }

    pub async fn delete(&self, note_id: i64) -> Result<()> {
        self.store.delete_note(note_id).await?;
        info!(note_id, "note deleted");
        Ok(())
    }

    pub async fn list_for_application(&self, application_id: i64, filter: NoteFilter) -> Result<Vec<Note>> {
        require_application(self.store.as_ref(), application_id).await?;
        self.store.list_notes(application_id, filter).await
    }

    pub async fn pin(&self, note_id: i64) -> Result<Note> {
        self.set_pinned(note_id, true).await
    }

    pub async fn unpin(&self, note_id: i64) -> Result<Note> {
        self.set_pinned(note_id, false).await
    }

    async fn set_pinned(&self, note_id: i64, pinned: bool) -> Result<Note> {
        let mut note = self.load(note_id).await?;
        if note.is_pinned == pinned {
            return Ok(note);
        }
        note.is_pinned = pinned;
        self.store.save_note(&note).await
    }
}
