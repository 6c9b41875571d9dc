use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::document::DocumentType;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AttachDocumentPayload {
    pub document_type: DocumentType,
    #[validate(length(min = 1, max = 255))]
    pub file_name: String,
    #[validate(url)]
    pub file_url: String,
    #[validate(length(max = 127))]
    pub file_type: Option<String>,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub file_size: i64,
}
