pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;

use crate::config::EngineSettings;
use crate::database::store::ApplicationStore;
use crate::services::{
    analytics_service::AnalyticsService, document_service::DocumentService,
    interview_service::InterviewService, note_service::NoteService,
    notification_service::{EventSink, NotificationService}, stage_service::StageService,
    transition_service::TransitionService,
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ApplicationStore>,
    pub jwt_secret: Arc<str>,
    pub transition_service: TransitionService,
    pub stage_service: StageService,
    pub interview_service: InterviewService,
    pub note_service: NoteService,
    pub document_service: DocumentService,
    pub analytics_service: AnalyticsService,
    pub notification_service: NotificationService,
}

impl AppState {
    pub fn new(
        store: Arc<dyn ApplicationStore>,
        sink: Arc<dyn EventSink>,
        settings: EngineSettings,
        jwt_secret: &str,
    ) -> Self {
        let notification_service = NotificationService::new(sink);
        let transition_service =
            TransitionService::new(store.clone(), notification_service.clone(), settings);
        let stage_service = StageService::new(store.clone(), settings);
        let interview_service =
            InterviewService::new(store.clone(), notification_service.clone(), settings);
        let note_service = NoteService::new(store.clone());
        let document_service = DocumentService::new(store.clone());
        let analytics_service = AnalyticsService::new(store.clone());

        Self {
            store,
            jwt_secret: Arc::from(jwt_secret),
            transition_service,
            stage_service,
            interview_service,
            note_service,
            document_service,
            analytics_service,
            notification_service,
        }
    }
}
