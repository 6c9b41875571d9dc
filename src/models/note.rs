use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "note_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum NoteType {
    Evaluation,
    Feedback,
    Reminder,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "note_visibility", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum NoteVisibility {
    Internal,
    Public,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "note_sentiment", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum NoteSentiment {
    Positive,
    Neutral,
    Negative,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Note {
    pub id: i64,
    pub application_id: i64,
    /// Weak reference; cleared when the stage is deleted.
    pub stage_id: Option<i64>,
    pub author_id: i64,
    pub content: String,
    pub note_type: NoteType,
    pub visibility: NoteVisibility,
    pub sentiment: NoteSentiment,
    pub is_pinned: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
