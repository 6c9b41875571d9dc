use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::database::store::NoteFilter;
use crate::models::note::{NoteSentiment, NoteType, NoteVisibility};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateNotePayload {
    pub stage_id: Option<i64>,
    #[validate(length(min = 1, max = 5000))]
    pub content: String,
    pub note_type: Option<NoteType>,
    pub visibility: Option<NoteVisibility>,
    pub sentiment: Option<NoteSentiment>,
    #[serde(default)]
    pub is_pinned: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateNotePayload {
    #[validate(length(min = 1, max = 5000))]
    pub content: Option<String>,
    pub note_type: Option<NoteType>,
    pub visibility: Option<NoteVisibility>,
    pub sentiment: Option<NoteSentiment>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NoteListQuery {
    pub stage_id: Option<i64>,
    #[serde(default)]
    pub pinned_only: bool,
    pub visibility: Option<NoteVisibility>,
}

impl From<NoteListQuery> for NoteFilter {
    fn from(q: NoteListQuery) -> Self {
        NoteFilter {
            stage_id: q.stage_id,
            pinned_only: q.pinned_only,
            visibility: q.visibility,
        }
    }
}
