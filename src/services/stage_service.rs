use std::sync::Arc;

use tracing::info;

use crate::config::EngineSettings;
use crate::database::store::ApplicationStore;
use crate::error::{Error, Result};
use crate::models::stage::Stage;
use crate::services::transition_service::{clean_text, require_application};
use crate::utils::time::{now, with_deadline};

/// Read access to the stage history plus the administrative corrections
/// that sit outside the status graph.
#[derive(Clone)]
pub struct StageService {
    store: Arc<dyn ApplicationStore>,
    settings: EngineSettings,
}

impl StageService {
    pub fn new(store: Arc<dyn ApplicationStore>, settings: EngineSettings) -> Self {
        Self { store, settings }
    }

    pub async fn current_stage(&self, application_id: i64) -> Result<Stage> {
        self.store
            .current_stage(application_id)
            .await?
            .ok_or_else(|| {
                Error::NotFound(format!("Application {} has no open stage", application_id))
            })
    }

    pub async fn stage_history(&self, application_id: i64) -> Result<Vec<Stage>> {
        require_application(self.store.as_ref(), application_id).await?;
        self.store.stage_history(application_id).await
    }

    pub async fn get(&self, stage_id: i64) -> Result<Stage> {
        self.store
            .get_stage(stage_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Stage {} not found", stage_id)))
    }

    /// Manual close of an open stage. Fails if the stage is already closed.
    pub async fn complete_stage(&self, stage_id: i64, notes: Option<String>) -> Result<Stage> {
        let stage = with_deadline(
            self.settings.request_timeout,
            self.store.complete_stage(stage_id, clean_text(notes), now()),
        )
        .await?;
        info!(
            stage_id,
            application_id = stage.application_id,
            stage = %stage.stage_name,
            duration_seconds = ?stage.duration_seconds,
            "stage completed manually"
        );
        Ok(stage)
    }

    pub async fn delete_stage(&self, stage_id: i64) -> Result<()> {
        with_deadline(self.settings.request_timeout, self.store.delete_stage(stage_id)).await?;
        info!(stage_id, "stage deleted");
        Ok(())
    }
}
