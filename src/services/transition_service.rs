//! Status state machine for applications.
//!
//! This service is the only writer of `Application.status`; every status
//! change goes through [`TransitionService::transition`], which rotates the
//! stage history in the same atomic store call.

use std::collections::HashSet;
use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{info, warn};
use validator::Validate;

use crate::config::EngineSettings;
use crate::database::store::{
    ApplicationFilter, ApplicationSort, ApplicationStore, NewApplication, NewDocument, Page,
    PageRequest, StageRotation,
};
use crate::dto::application_dto::{
    BulkFailure, BulkOutcome, SubmitApplicationPayload, SubmittedApplication, TransitionOutcome,
    MAX_BULK_IDS,
};
use crate::error::{Error, Result};
use crate::models::application::{Application, ApplicationStatus};
use crate::services::notification_service::{NotificationEvent, NotificationService};
use crate::utils::time::{now, with_deadline};

pub const DEFAULT_SOURCE: &str = "direct";

pub(crate) async fn require_application(store: &dyn ApplicationStore, id: i64) -> Result<Application> {
    store
        .get_application(id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Application {} not found", id)))
}

pub(crate) fn clean_text(text: Option<String>) -> Option<String> {
    text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}

/// Checks the legal-edge table plus the owner rule for withdrawal.
pub fn check_transition(
    app: &Application,
    target: ApplicationStatus,
    actor_id: Option<i64>,
) -> Result<()> {
    if !app.status.can_transition_to(target) {
        return Err(Error::InvalidTransition(format!(
            "Application {} cannot move from {} to {}",
            app.id, app.status, target
        )));
    }
    if target == ApplicationStatus::Withdrawn {
        if !app.can_withdraw() {
            return Err(Error::InvalidTransition(format!(
                "Application {} can no longer be withdrawn",
                app.id
            )));
        }
        if !actor_id.map_or(false, |actor| app.is_owner(actor)) {
            return Err(Error::PermissionDenied(
                "Only the applicant can withdraw an application".to_string(),
            ));
        }
    }
    Ok(())
}

fn validate_match_score(score: Decimal) -> Result<()> {
    if score < Decimal::ZERO || score > Decimal::from(100) {
        return Err(Error::Validation(format!(
            "match_score must be between 0 and 100, got {}",
            score
        )));
    }
    Ok(())
}

fn dedup_ids(ids: &[i64]) -> Result<Vec<i64>> {
    if ids.is_empty() {
        return Err(Error::Validation("application_ids must not be empty".to_string()));
    }
    if ids.len() > MAX_BULK_IDS {
        return Err(Error::Validation(format!(
            "At most {} applications can be processed at once",
            MAX_BULK_IDS
        )));
    }
    let mut seen = HashSet::with_capacity(ids.len());
    Ok(ids.iter().copied().filter(|id| seen.insert(*id)).collect())
}

#[derive(Clone)]
pub struct TransitionService {
    store: Arc<dyn ApplicationStore>,
    notifications: NotificationService,
    settings: EngineSettings,
}

impl TransitionService {
    pub fn new(
        store: Arc<dyn ApplicationStore>,
        notifications: NotificationService,
        settings: EngineSettings,
    ) -> Self {
        Self {
            store,
            notifications,
            settings,
        }
    }

    pub async fn submit(&self, user_id: i64, payload: SubmitApplicationPayload) -> Result<SubmittedApplication> {
        payload.validate()?;
        for document in &payload.documents {
            document.validate()?;
        }
        validate_match_score(payload.match_score)?;

        let applied_at = now();
        let new = NewApplication {
            job_id: payload.job_id,
            user_id,
            company_id: payload.company_id,
            match_score: payload.match_score,
            source: clean_text(payload.source).unwrap_or_else(|| DEFAULT_SOURCE.to_string()),
            applied_at,
        };
        let documents = payload
            .documents
            .into_iter()
            .map(|d| NewDocument {
                application_id: 0,
                uploaded_by: user_id,
                document_type: d.document_type,
                file_name: d.file_name.trim().to_string(),
                file_url: d.file_url,
                file_type: d.file_type,
                file_size: d.file_size,
            })
            .collect();

        let (application, stage, documents) = with_deadline(
            self.settings.request_timeout,
            self.store.create_application(new, documents),
        )
        .await?;

        info!(
            application_id = application.id,
            job_id = application.job_id,
            user_id = application.user_id,
            source = %application.source,
            "application submitted"
        );
        self.notifications
            .notify(NotificationEvent::ApplicationReceived {
                application_id: application.id,
                job_id: application.job_id,
                user_id: application.user_id,
            })
            .await;

        Ok(SubmittedApplication {
            application,
            stage,
            documents,
        })
    }

    pub async fn get(&self, id: i64) -> Result<Application> {
        require_application(self.store.as_ref(), id).await
    }

    pub async fn list(
        &self,
        filter: &ApplicationFilter,
        sort: ApplicationSort,
        page: PageRequest,
    ) -> Result<Page<Application>> {
        self.store.list_applications(filter, sort, page).await
    }

    /// Moves the application to `target`, closing the open stage and opening
    /// a new one handled by `actor_id`. Nothing is written when the edge is
    /// not legal.
    pub async fn transition(
        &self,
        application_id: i64,
        target: ApplicationStatus,
        actor_id: Option<i64>,
        notes: Option<String>,
    ) -> Result<TransitionOutcome> {
        let app = require_application(self.store.as_ref(), application_id).await?;
        check_transition(&app, target, actor_id)?;

        let rotation = StageRotation {
            application_id,
            expected_status: app.status,
            target,
            actor_id,
            notes: clean_text(notes),
            at: now(),
        };
        let (application, stage) =
            with_deadline(self.settings.request_timeout, self.store.rotate_stage(rotation)).await?;

        info!(
            application_id,
            from = %app.status,
            to = %target,
            actor_id = ?actor_id,
            stage_id = stage.id,
            "application status changed"
        );
        self.notifications
            .notify(NotificationEvent::StatusChanged {
                application_id,
                user_id: application.user_id,
                from: app.status,
                to: target,
            })
            .await;

        Ok(TransitionOutcome {
            previous_status: app.status,
            application,
            stage,
        })
    }

    pub async fn withdraw(
        &self,
        application_id: i64,
        actor_id: i64,
        reason: Option<String>,
    ) -> Result<TransitionOutcome> {
        self.transition(application_id, ApplicationStatus::Withdrawn, Some(actor_id), reason)
            .await
    }

    pub async fn mark_viewed(&self, application_id: i64) -> Result<Application> {
        self.store.mark_viewed(application_id).await
    }

    pub async fn set_bookmark(&self, application_id: i64, bookmarked: bool) -> Result<Application> {
        self.store.set_bookmark(application_id, bookmarked).await
    }

    /// Applies `target` to each id independently. Failures are collected,
    /// never rolled back across ids.
    pub async fn bulk_update_status(
        &self,
        ids: &[i64],
        target: ApplicationStatus,
        actor_id: Option<i64>,
        notes: Option<String>,
    ) -> Result<BulkOutcome> {
        let ids = dedup_ids(ids)?;
        let mut outcome = BulkOutcome::default();
        for id in ids {
            match self.transition(id, target, actor_id, notes.clone()).await {
                Ok(_) => outcome.succeeded.push(id),
                Err(e) => {
                    warn!(application_id = id, target = %target, error = %e, "bulk transition item failed");
                    outcome.failed.push(BulkFailure::new(id, &e));
                }
            }
        }
        info!(
            target = %target,
            succeeded = outcome.succeeded.len(),
            failed = outcome.failed.len(),
            "bulk status update finished"
        );
        Ok(outcome)
    }

    /// Stage names and statuses share one enumeration, so moving to a stage
    /// is a status transition to the same name.
    pub async fn bulk_move_to_stage(
        &self,
        ids: &[i64],
        stage: ApplicationStatus,
        actor_id: Option<i64>,
        notes: Option<String>,
    ) -> Result<BulkOutcome> {
        self.bulk_update_status(ids, stage, actor_id, notes).await
    }

    pub async fn bulk_reject(
        &self,
        ids: &[i64],
        actor_id: Option<i64>,
        reason: Option<String>,
    ) -> Result<BulkOutcome> {
        self.bulk_update_status(ids, ApplicationStatus::Rejected, actor_id, reason)
            .await
    }

    /// Administrative hard delete; stages, interviews, notes and documents go with it.
    pub async fn bulk_delete(&self, ids: &[i64]) -> Result<u64> {
        let ids = dedup_ids(ids)?;
        let deleted = with_deadline(
            self.settings.request_timeout,
            self.store.delete_applications(&ids),
        )
        .await?;
        info!(requested = ids.len(), deleted, "applications deleted");
        Ok(deleted)
    }
}
