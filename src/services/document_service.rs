use std::sync::Arc;

use tracing::info;
use validator::Validate;

use crate::database::store::{ApplicationStore, NewDocument};
use crate::dto::document_dto::AttachDocumentPayload;
use crate::error::{Error, Result};
use crate::models::document::Document;
use crate::services::transition_service::require_application;
use crate::utils::time::now;

/// Metadata for files stored elsewhere; only names and URLs pass through here.
#[derive(Clone)]
pub struct DocumentService {
    store: Arc<dyn ApplicationStore>,
}

impl DocumentService {
    pub fn new(store: Arc<dyn ApplicationStore>) -> Self {
        Self { store }
    }

    pub async fn attach(
        &self,
        application_id: i64,
        uploaded_by: i64,
        payload: AttachDocumentPayload,
    ) -> Result<Document> {
        payload.validate()?;
        require_application(self.store.as_ref(), application_id).await?;
        let document = self
            .store
            .create_document(NewDocument {
                application_id,
                uploaded_by,
                document_type: payload.document_type,
                file_name: payload.file_name.trim().to_string(),
                file_url: payload.file_url,
                file_type: payload.file_type,
                file_size: payload.file_size,
            })
            .await?;
        info!(document_id = document.id, application_id, "document attached");
        Ok(document)
    }

    pub async fn list_for_application(&self, application_id: i64) -> Result<Vec<Document>> {
        require_application(self.store.as_ref(), application_id).await?;
        self.store.list_documents(application_id).await
    }

    /// Idempotent: an already verified document keeps its original verifier.
    pub async fn verify(&self, document_id: i64, verifier_id: i64) -> Result<Document> {
        let mut document = self
            .store
            .get_document(document_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Document {} not found", document_id)))?;
        if document.is_verified {
            return Ok(document);
        }
        document.is_verified = true;
        document.verified_by = Some(verifier_id);
        document.verified_at = Some(now());
        let saved = self.store.save_document(&document).await?;
        info!(document_id, verifier_id, "document verified");
        Ok(saved)
    }

    pub async fn delete(&self, document_id: i64) -> Result<()> {
        self.store.delete_document(document_id).await
    }
}
