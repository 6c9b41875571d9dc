pub mod analytics_service;
pub mod document_service;
pub mod interview_service;
pub mod note_service;
pub mod notification_service;
pub mod stage_service;
pub mod transition_service;
