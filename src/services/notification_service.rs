use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::models::application::ApplicationStatus;

/// Signals handed to the external delivery subsystem (email/push).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum NotificationEvent {
    ApplicationReceived {
        application_id: i64,
        job_id: i64,
        user_id: i64,
    },
    StatusChanged {
        application_id: i64,
        user_id: i64,
        from: ApplicationStatus,
        to: ApplicationStatus,
    },
    InterviewScheduled {
        interview_id: i64,
        application_id: i64,
        scheduled_at: DateTime<Utc>,
    },
    InterviewReminder {
        interview_id: i64,
        application_id: i64,
        scheduled_at: DateTime<Utc>,
    },
}

impl NotificationEvent {
    pub fn name(&self) -> &'static str {
        match self {
            NotificationEvent::ApplicationReceived { .. } => "application_received",
            NotificationEvent::StatusChanged { .. } => "status_changed",
            NotificationEvent::InterviewScheduled { .. } => "interview_scheduled",
            NotificationEvent::InterviewReminder { .. } => "interview_reminder",
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn publish(&self, event: &NotificationEvent) -> Result<()>;
}

/// POSTs each event as JSON to the delivery subsystem. `publish` hands the
/// request to a background task and returns at once; failures are logged there.
#[derive(Clone)]
pub struct WebhookNotifier {
    client: Client,
    target_url: String,
    secret: Option<String>,
}

impl WebhookNotifier {
    pub fn new(client: Client, target_url: String, secret: Option<String>) -> Self {
        Self {
            client,
            target_url,
            secret,
        }
    }

    pub async fn deliver(&self, event: &NotificationEvent) -> Result<()> {
        let mut request = self.client.post(&self.target_url).json(event);
        if let Some(secret) = &self.secret {
            request = request.header("X-Webhook-Secret", secret);
        }
        let resp = request.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Internal(format!(
                "Notification webhook returned {}: {}",
                status.as_u16(),
                body
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl EventSink for WebhookNotifier {
    async fn publish(&self, event: &NotificationEvent) -> Result<()> {
        let notifier = self.clone();
        let event = event.clone();
        tokio::spawn(async move {
            if let Err(e) = notifier.deliver(&event).await {
                tracing::warn!(event = event.name(), error = %e, "webhook delivery failed");
            }
        });
        Ok(())
    }
}

/// Used when no webhook is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl EventSink for LogNotifier {
    async fn publish(&self, event: &NotificationEvent) -> Result<()> {
        tracing::info!(event = event.name(), payload = ?event, "notification (no webhook configured)");
        Ok(())
    }
}

/// Keeps every published event in memory.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<NotificationEvent>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<NotificationEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl EventSink for RecordingNotifier {
    async fn publish(&self, event: &NotificationEvent) -> Result<()> {
        self.events
            .lock()
            .map_err(|_| Error::Internal("recording notifier poisoned".to_string()))?
            .push(event.clone());
        Ok(())
    }
}

#[derive(Clone)]
pub struct NotificationService {
    sink: Arc<dyn EventSink>,
}

impl NotificationService {
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self { sink }
    }

    /// Delivery failures are logged and dropped; they never undo the state
    /// change that produced the event.
    pub async fn notify(&self, event: NotificationEvent) {
        if let Err(e) = self.sink.publish(&event).await {
            tracing::warn!(event = event.name(), error = %e, "notification delivery failed");
        }
    }
}
