use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "document_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    Cv,
    CoverLetter,
    Portfolio,
    Certificate,
    Transcript,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Document {
    pub id: i64,
    pub application_id: i64,
    pub uploaded_by: i64,
    pub document_type: DocumentType,
    pub file_name: String,
    pub file_url: String,
    pub file_type: Option<String>,
    pub file_size: i64,
    pub is_verified: bool,
    pub verified_by: Option<i64>,
    pub verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
