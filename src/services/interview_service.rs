//! Interview scheduling and evaluation.
//!
//! Interviews follow their own small state machine, independent of the
//! application status: `scheduled` moves to `completed`, `cancelled` or
//! `no_show` exactly once. A reschedule keeps the interview's identity and
//! returns it to `scheduled`. Every write is a compare-and-swap on the status
//! the service read.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};
use validator::Validate;

use crate::config::EngineSettings;
use crate::database::store::{ApplicationStore, NewInterview};
use crate::dto::interview_dto::{
    CompleteInterviewPayload, RescheduleInterviewPayload, ScheduleInterviewPayload,
    UpdateInterviewPayload, DEFAULT_INTERVIEW_MINUTES,
};
use crate::error::{Error, Result};
use crate::models::interview::{Interview, InterviewStatus};
use crate::models::stage::merge_notes;
use crate::services::notification_service::{NotificationEvent, NotificationService};
use crate::services::transition_service::{clean_text, require_application};
use crate::utils::time::{now, with_deadline};

#[derive(Clone)]
pub struct InterviewService {
    store: Arc<dyn ApplicationStore>,
    notifications: NotificationService,
    settings: EngineSettings,
}

impl InterviewService {
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

    fn check_schedule_time(&self, scheduled_at: DateTime<Utc>, at: DateTime<Utc>) -> Result<()> {
        if scheduled_at <= at - self.settings.reschedule_grace {
            return Err(Error::Validation(format!(
                "Interview time {} is in the past",
                scheduled_at.to_rfc3339()
            )));
        }
        Ok(())
    }

    async fn load(&self, interview_id: i64) -> Result<Interview> {
        self.store
            .get_interview(interview_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Interview {} not found", interview_id)))
    }

    async fn load_open(&self, interview_id: i64) -> Result<Interview> {
        let interview = self.load(interview_id).await?;
        if interview.status.is_terminal() {
            return Err(Error::InvalidTransition(format!(
                "Interview {} is already {:?}",
                interview_id, interview.status
            )));
        }
        Ok(interview)
    }

    async fn save(&self, interview: &Interview, expected: InterviewStatus) -> Result<Interview> {
        with_deadline(
            self.settings.request_timeout,
            self.store.save_interview(interview, expected),
        )
        .await
    }

    pub async fn schedule(&self, application_id: i64, payload: ScheduleInterviewPayload) -> Result<Interview> {
        payload.validate()?;
        let app = require_application(self.store.as_ref(), application_id).await?;
        if app.status.is_terminal() {
            return Err(Error::InvalidTransition(format!(
                "Application {} is {} and cannot be interviewed",
                application_id, app.status
            )));
        }
        if let Some(stage_id) = payload.stage_id {
            let stage = self
                .store
                .get_stage(stage_id)
                .await?
                .ok_or_else(|| Error::NotFound(format!("Stage {} not found", stage_id)))?;
            if stage.application_id != application_id {
                return Err(Error::Validation(format!(
                    "Stage {} does not belong to application {}",
                    stage_id, application_id
                )));
            }
        }
        self.check_schedule_time(payload.scheduled_at, now())?;

        let new = NewInterview {
            application_id,
            stage_id: payload.stage_id,
            interviewer_id: payload.interviewer_id,
            scheduled_at: payload.scheduled_at,
            duration_minutes: payload.duration_minutes.unwrap_or(DEFAULT_INTERVIEW_MINUTES),
            interview_type: payload.interview_type,
            location: clean_text(payload.location),
            meeting_link: clean_text(payload.meeting_link),
        };
        let interview = with_deadline(self.settings.request_timeout, self.store.create_interview(new)).await?;

        info!(
            interview_id = interview.id,
            application_id,
            scheduled_at = %interview.scheduled_at,
            "interview scheduled"
        );
        self.notifications
            .notify(NotificationEvent::InterviewScheduled {
                interview_id: interview.id,
                application_id,
                scheduled_at: interview.scheduled_at,
            })
            .await;
        Ok(interview)
    }

    pub async fn reschedule(&self, interview_id: i64, payload: RescheduleInterviewPayload) -> Result<Interview> {
        payload.validate()?;
        let reason = payload.reason.trim();
        if reason.is_empty() {
            return Err(Error::Validation("A reschedule reason is required".to_string()));
        }
        let current = self.load_open(interview_id).await?;
        self.check_schedule_time(payload.scheduled_at, now())?;

        let mut updated = current.clone();
        updated.scheduled_at = payload.scheduled_at;
        updated.reschedule_reason = merge_notes(current.reschedule_reason.clone(), Some(reason));
        updated.reminder_sent_at = None;
        updated.status = InterviewStatus::Scheduled;
        let saved = self.save(&updated, current.status).await?;

        info!(
            interview_id,
            from = %current.scheduled_at,
            to = %saved.scheduled_at,
            "interview rescheduled"
        );
        self.notifications
            .notify(NotificationEvent::InterviewScheduled {
                interview_id,
                application_id: saved.application_id,
                scheduled_at: saved.scheduled_at,
            })
            .await;
        Ok(saved)
    }

    pub async fn complete(&self, interview_id: i64, payload: CompleteInterviewPayload) -> Result<Interview> {
        payload.validate()?;
        let scores = payload.scores();
        scores.validate()?;
        let current = self.load_open(interview_id).await?;

        let mut updated = current.clone();
        updated.status = InterviewStatus::Completed;
        updated.ended_at = Some(now());
        updated.overall_score = scores.overall;
        updated.technical_score = scores.technical;
        updated.communication_score = scores.communication;
        updated.personality_score = scores.personality;
        updated.remarks = clean_text(payload.remarks);
        let saved = self.save(&updated, current.status).await?;

        info!(
            interview_id,
            application_id = saved.application_id,
            average_score = %saved.average_score(),
            "interview completed"
        );
        Ok(saved)
    }

    pub async fn cancel(&self, interview_id: i64, reason: Option<String>) -> Result<Interview> {
        let current = self.load_open(interview_id).await?;
        let mut updated = current.clone();
        updated.status = InterviewStatus::Cancelled;
        updated.cancel_reason = clean_text(reason);
        let saved = self.save(&updated, current.status).await?;
        info!(interview_id, application_id = saved.application_id, "interview cancelled");
        Ok(saved)
    }

    pub async fn mark_no_show(&self, interview_id: i64) -> Result<Interview> {
        let current = self.load_open(interview_id).await?;
        let mut updated = current.clone();
        updated.status = InterviewStatus::NoShow;
        let saved = self.save(&updated, current.status).await?;
        info!(interview_id, application_id = saved.application_id, "interview marked as no-show");
        Ok(saved)
    }

    pub async fn update_details(&self, interview_id: i64, payload: UpdateInterviewPayload) -> Result<Interview> {
        payload.validate()?;
        let current = self.load_open(interview_id).await?;
        let mut updated = current.clone();
        if let Some(interviewer_id) = payload.interviewer_id {
            updated.interviewer_id = Some(interviewer_id);
        }
        if let Some(location) = clean_text(payload.location) {
            updated.location = Some(location);
        }
        if let Some(link) = clean_text(payload.meeting_link) {
            updated.meeting_link = Some(link);
        }
        if let Some(minutes) = payload.duration_minutes {
            updated.duration_minutes = minutes;
        }
        self.save(&updated, current.status).await
    }

    pub async fn get(&self, interview_id: i64) -> Result<Interview> {
        self.load(interview_id).await
    }

    pub async fn list_for_application(&self, application_id: i64) -> Result<Vec<Interview>> {
        require_application(self.store.as_ref(), application_id).await?;
        self.store.list_interviews(application_id).await
    }

    /// Scheduled interviews in `[from, to)`; defaults to the next seven days.
    pub async fn upcoming(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<Interview>> {
        let from = from.unwrap_or_else(now);
        let to = to.unwrap_or(from + Duration::days(7));
        if to <= from {
            return Err(Error::Validation("`to` must be after `from`".to_string()));
        }
        self.store
            .interviews_between(from, to, Some(InterviewStatus::Scheduled))
            .await
    }

    pub async fn delete(&self, interview_id: i64) -> Result<()> {
        self.store.delete_interview(interview_id).await?;
        info!(interview_id, "interview deleted");
        Ok(())
    }

    /// Emits one reminder per scheduled interview starting within the lead
    /// window of `at`. Returns how many reminders were sent.
    pub async fn send_due_reminders(&self, at: DateTime<Utc>) -> Result<usize> {
        let due = self
            .store
            .interviews_between(at, at + self.settings.reminder_lead, Some(InterviewStatus::Scheduled))
            .await?;

        let mut sent = 0;
        for interview in due.into_iter().filter(|i| i.reminder_sent_at.is_none()) {
            let mut marked = interview.clone();
            marked.reminder_sent_at = Some(at);
            match self.save(&marked, InterviewStatus::Scheduled).await {
                Ok(saved) => {
                    self.notifications
                        .notify(NotificationEvent::InterviewReminder {
                            interview_id: saved.id,
                            application_id: saved.application_id,
                            scheduled_at: saved.scheduled_at,
                        })
                        .await;
                    sent += 1;
                }
                Err(e) => {
                    warn!(interview_id = interview.id, error = %e, "skipping interview reminder");
                }
            }
        }
        if sent > 0 {
            info!(sent, "interview reminders sent");
        }
        Ok(sent)
    }
}
